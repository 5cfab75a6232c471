// models/src/medical/announcement.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::errors::{ValidationError, ValidationResult};
use crate::identifiers::new_id;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Normal,
    Urgent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub urgency: Urgency,
}

impl Announcement {
    pub fn from_request(request: NewAnnouncement, author: Option<String>) -> ValidationResult<Self> {
        let now = Utc::now();
        let mut announcement = Announcement {
            id: new_id(),
            title: request.title,
            content: request.content,
            date: request.date.unwrap_or(now),
            urgency: request.urgency,
            author,
            created_at: now,
            updated_at: now,
        };
        announcement.normalize();
        announcement.validate()?;
        Ok(announcement)
    }
}

impl Document for Announcement {
    const COLLECTION: &'static str = "announcements";

    fn id(&self) -> &str {
        &self.id
    }

    fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.content = self.content.trim().to_string();
    }

    fn validate(&self) -> ValidationResult<()> {
        if self.title.is_empty() && self.content.is_empty() {
            return Err(ValidationError::invalid("announcement", "title or content is required"));
        }
        Ok(())
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}
