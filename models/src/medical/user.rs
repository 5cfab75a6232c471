// models/src/medical/user.rs
// Stored users carry only the password hash. Hashing lives in the security
// crate; this module only shapes and validates the record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::errors::{require, ValidationResult};
use crate::identifiers::{new_id, normalize_email};
use crate::medical::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Builds a new user from an already hashed password.
    pub fn new(name: &str, email: &str, password_hash: String, role: Role) -> ValidationResult<Self> {
        let now = Utc::now();
        let user = User {
            id: new_id(),
            name: name.trim().to_string(),
            email: normalize_email(email)?,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
            last_login: None,
        };
        user.validate()?;
        Ok(user)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];

    fn id(&self) -> &str {
        &self.id
    }

    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
    }

    fn validate(&self) -> ValidationResult<()> {
        require("name", &self.name)?;
        normalize_email(&self.email)?;
        require("passwordHash", &self.password_hash)
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

/// Public view of a user. This is what API responses carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}
