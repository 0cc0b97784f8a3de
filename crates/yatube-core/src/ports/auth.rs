//! Authentication and authorization ports.

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::User;

/// What a valid session token says about its bearer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: i64,
    pub username: String,
    pub is_staff: bool,
    pub expires_at: DateTime<Utc>,
}

/// Issues and reads the tokens behind the session cookie and bearer header.
pub trait TokenService: Send + Sync {
    /// Sign a token for `user`.
    fn issue(&self, user: &User) -> Result<String, AuthError>;

    /// Check the signature and expiry of `token`.
    fn parse(&self, token: &str) -> Result<SessionClaims, AuthError>;

    /// How long an issued token stays valid.
    fn lifetime(&self) -> TimeDelta;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing credentials")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
