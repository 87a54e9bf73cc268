//! Authentication ports.
//!
//! The domain never parses credentials itself; it consumes a resolver that
//! turns a bearer token into claims, or fails with one of the
//! [`AuthError`] kinds.

use uuid::Uuid;

use crate::domain::Role;

/// Claims carried inside a signed token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
    pub exp: i64,
}

/// Token service trait for credential issuance and verification.
pub trait TokenService: Send + Sync {
    /// Issue a signed token for a user.
    fn generate_token(&self, user_id: Uuid, name: &str, role: Role) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of freshly issued tokens, in seconds.
    fn expiration_seconds(&self) -> i64;
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
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    /// The credential verified but the account it references no longer
    /// exists.
    #[error("Identity no longer exists")]
    IdentityNotFound,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
