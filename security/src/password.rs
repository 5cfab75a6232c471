// security/src/password.rs
use argon2::{
    password_hash::{rand_core::OsRng, Error as PasswordHashError, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};

use crate::AuthError;

/// Hashes a password using Argon2 with a fresh random salt. The result is a
/// PHC string carrying its own parameters and salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHashError(format!("Failed to hash password with Argon2: {}", e)))
}

/// Verifies a password against an Argon2 PHC string. A mismatch is `Ok(false)`;
/// only a malformed hash is an error.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AuthError> {
    let password_hash = PasswordHash::new(hashed_password)
        .map_err(|e| AuthError::PasswordHashError(format!("Failed to parse Argon2 password hash: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &password_hash) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(AuthError::PasswordHashError(format!("Failed to verify Argon2 password: {}", e))),
    }
}
