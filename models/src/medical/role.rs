// models/src/medical/role.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

/// Staff role. Chosen at registration and asserted again at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Receptionist,
    Nurse,
    Doctor,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Receptionist, Role::Nurse, Role::Doctor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Receptionist => "receptionist",
            Role::Nurse => "nurse",
            Role::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "receptionist" => Ok(Role::Receptionist),
            "nurse" => Ok(Role::Nurse),
            "doctor" => Ok(Role::Doctor),
            _ => Err(ValidationError::UnknownVariant {
                kind: "role",
                value: s.to_string(),
                expected: "receptionist, nurse, doctor",
            }),
        }
    }
}
