// models/src/medical/room.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::errors::{require, ValidationError, ValidationResult};
use crate::identifiers::new_id;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    #[default]
    Available,
    Occupied,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub room_number: u32,
    #[serde(default)]
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub name: String,
    pub room_number: u32,
    #[serde(default)]
    pub status: RoomStatus,
}

impl Room {
    pub fn from_request(request: NewRoom) -> ValidationResult<Self> {
        let now = Utc::now();
        let mut room = Room {
            id: new_id(),
            name: request.name,
            room_number: request.room_number,
            status: request.status,
            created_at: now,
            updated_at: now,
        };
        room.normalize();
        room.validate()?;
        Ok(room)
    }
}

impl Document for Room {
    const COLLECTION: &'static str = "rooms";
    const UNIQUE_FIELDS: &'static [&'static str] = &["roomNumber"];

    fn id(&self) -> &str {
        &self.id
    }

    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
    }

    fn validate(&self) -> ValidationResult<()> {
        require("name", &self.name)?;
        if self.room_number == 0 {
            return Err(ValidationError::invalid("roomNumber", "must be positive"));
        }
        Ok(())
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

/// Availability counts across all rooms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoomSummary {
    pub total: usize,
    pub available: usize,
    pub occupied: usize,
}

impl RoomSummary {
    pub fn of(rooms: &[Room]) -> Self {
        rooms.iter().fold(RoomSummary::default(), |mut acc, room| {
            acc.total += 1;
            match room.status {
                RoomStatus::Available => acc.available += 1,
                RoomStatus::Occupied => acc.occupied += 1,
            }
            acc
        })
    }
}
