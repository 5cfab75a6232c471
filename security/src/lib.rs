// security/src/lib.rs
//! Authentication (Argon2 password hashes, HS256 session tokens) and the
//! role-based access policy enforced by the API's axum middleware.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use lib::{Collection, StorageError};
use log::{info, warn};
use models::medical::{Role, User, UserProfile};
use models::ValidationError;
use serde::{Deserialize, Serialize};

pub mod middleware;
pub mod password;
pub mod roles;
pub mod tokens;

pub use middleware::{authorize, bearer_token, Guard};
pub use password::{hash_password, verify_password};
pub use roles::{AccessPolicy, Action, Resource};
pub use tokens::{Claims, TokenIssuer, DEFAULT_TOKEN_TTL_HOURS};

/// User registration data transfer object (DTO).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserRegistration {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// User login data transfer object (DTO).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLogin {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "role")]
    pub selected_role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserProfile,
}

/// The caller resolved from a bearer token, attached to the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        AuthUser {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Custom authentication errors.
#[derive(Debug)]
pub enum AuthError {
    UserExists,
    InvalidCredentials,
    RoleMismatch { expected: Role, selected: String },
    MissingToken,
    InvalidToken(String),
    Validation(ValidationError),
    PasswordHashError(String),
    JwtError(String),
    Storage(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::UserExists => write!(f, "User already exists"),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::RoleMismatch { expected, selected } => write!(
                f,
                "Role mismatch: this account is registered as {}, not {}",
                expected, selected
            ),
            AuthError::MissingToken => write!(f, "No token provided"),
            AuthError::InvalidToken(msg) => write!(f, "Invalid or expired token: {}", msg),
            AuthError::Validation(e) => write!(f, "{}", e),
            AuthError::PasswordHashError(msg) => write!(f, "Password hashing error: {}", msg),
            AuthError::JwtError(msg) => write!(f, "JWT error: {}", msg),
            AuthError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<ValidationError> for AuthError {
    fn from(e: ValidationError) -> Self {
        AuthError::Validation(e)
    }
}

impl From<StorageError> for AuthError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Duplicate { .. } => AuthError::UserExists,
            StorageError::Validation(v) => AuthError::Validation(v),
            other => AuthError::Storage(other.to_string()),
        }
    }
}

/// Registration, login and token resolution over the users collection.
pub struct AuthService {
    users: Collection<User>,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(users: Collection<User>, tokens: TokenIssuer) -> Self {
        AuthService { users, tokens }
    }

    pub fn users(&self) -> &Collection<User> {
        &self.users
    }

    /// Registers a new user. The email must not be taken.
    pub async fn register_user(&self, registration: UserRegistration) -> Result<UserProfile, AuthError> {
        let role = Role::from_str(&registration.role)?;
        models::errors::require("name", &registration.name)?;
        models::errors::require("email", &registration.email)?;
        models::errors::require("password", &registration.password)?;

        let password_hash = hash_password(&registration.password)?;
        let user = User::new(&registration.name, &registration.email, password_hash, role)?;
        let user = self.users.insert(user).await?;
        info!("Registered {} {}", user.role, user.email);
        Ok(user.profile())
    }

    /// Checks credentials and issues a session token.
    pub async fn login_user(&self, login: UserLogin) -> Result<LoginOutcome, AuthError> {
        let email = login.email.trim().to_lowercase();
        let Some(mut user) = self.users.find_one_by("email", &email).await? else {
            warn!("Login attempt for unknown email {}", email);
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(&login.password, &user.password_hash)? {
            warn!("Login attempt with wrong password for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        if let Some(selected) = login.selected_role.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let matches = Role::from_str(selected).map_or(false, |role| role == user.role);
            if !matches {
                return Err(AuthError::RoleMismatch {
                    expected: user.role,
                    selected: selected.to_string(),
                });
            }
        }

        let token = self.tokens.issue(&user.id, user.role)?;
        user.last_login = Some(Utc::now());
        let user = self.users.replace(user.clone()).await?.unwrap_or(user);
        info!("User {} logged in", user.email);
        Ok(LoginOutcome { token, user: user.profile() })
    }

    /// Resolves a bearer token to the user it names.
    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.tokens.verify(token)?;
        match self.users.find(&claims.sub).await? {
            Some(user) => Ok(AuthUser::from(&user)),
            None => Err(AuthError::InvalidToken("user no longer exists".to_string())),
        }
    }
}
