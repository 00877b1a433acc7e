// Domain error types - one enum for the whole service, with client-safe messages

use thiserror::Error;

/// Main error type for the account service
#[derive(Error, Debug)]
pub enum AccountError {
    /// Malformed request body or path (HTTP 400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// No matching account (HTTP 400)
    #[error("{0}")]
    NotFound(String),

    /// Password hashing or verification failure (HTTP 400)
    #[error("Credential error: {0}")]
    Credential(String),

    /// Token signature, structure, algorithm or expiry mismatch (HTTP 403)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Store connectivity or constraint failure (HTTP 400)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Token holder does not own the requested account (HTTP 403)
    #[error("Permission denied")]
    Unauthorized,

    /// Account number already assigned to another row
    #[error("Account number {0} already taken")]
    NumberTaken(i64),

    /// Token signing failure (HTTP 400)
    #[error("Signing error: {0}")]
    Signing(String),

    /// Configuration error (fatal at startup)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AccountError {
    /// Get HTTP status code for this error
    ///
    /// Auth-layer failures are 403; everything a handler can hit is 400.
    pub fn status_code(&self) -> u16 {
        match self {
            AccountError::InvalidToken(_) | AccountError::Unauthorized => 403,
            AccountError::Configuration(_) => 500,
            _ => 400,
        }
    }

    /// Get user-facing error message (no storage or key material details)
    pub fn user_message(&self) -> String {
        match self {
            AccountError::InvalidToken(_) | AccountError::Unauthorized => {
                "permission denied".to_string()
            }
            AccountError::Persistence(_) => "storage error".to_string(),
            AccountError::Signing(_) | AccountError::Configuration(_) => {
                "internal error".to_string()
            }
            AccountError::NumberTaken(_) => "could not assign an account number".to_string(),
            AccountError::Validation(msg)
            | AccountError::NotFound(msg)
            | AccountError::Credential(msg) => msg.clone(),
        }
    }
}

impl From<sqlx::Error> for AccountError {
    fn from(err: sqlx::Error) -> Self {
        AccountError::Persistence(err.to_string())
    }
}
