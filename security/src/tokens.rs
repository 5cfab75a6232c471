// security/src/tokens.rs
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use models::medical::Role;
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Lifetime of a session token unless configured otherwise.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Claims for JWT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user id)
    pub role: Role,
    pub iat: i64, // Issued at
    pub exp: i64, // Expiration time
}

/// Issues and verifies HS256 session tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        TokenIssuer {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generates a JWT token.
    pub fn issue(&self, user_id: &str, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::JwtError(format!("Failed to encode JWT: {}", e)))
    }

    /// Decodes and validates a JWT token.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::InvalidToken("token expired".to_string()),
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-that-is-long-enough-for-hs256";

    #[test]
    fn issued_token_verifies_to_same_subject() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(DEFAULT_TOKEN_TTL_HOURS));
        let token = issuer.issue("user-1", Role::Doctor).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, Role::Doctor);
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the library's default 60s leeway.
        let issuer = TokenIssuer::new(SECRET, Duration::minutes(-10));
        let token = issuer.issue("user-1", Role::Nurse).unwrap();
        assert!(matches!(issuer.verify(&token), Err(AuthError::InvalidToken(msg)) if msg == "token expired"));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = TokenIssuer::new(b"another-secret-another-secret-another", Duration::hours(1));
        let token = other.issue("user-1", Role::Nurse).unwrap();
        let issuer = TokenIssuer::new(SECRET, Duration::hours(1));
        assert!(matches!(issuer.verify(&token), Err(AuthError::InvalidToken(_))));
        assert!(matches!(issuer.verify("not-a-jwt"), Err(AuthError::InvalidToken(_))));
    }
}
