// Account record and request/response payloads

use crate::core::errors::AccountError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest first/last name the `account` table accepts
pub const MAX_NAME_LEN: usize = 50;

/// Account record
///
/// `encrypted_password` is never serialized; it only travels between the
/// store and the credential model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    #[serde(skip_serializing)]
    pub encrypted_password: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

/// Parse the `{id}` path segment of an account route
pub fn parse_account_id(raw: &str) -> Result<i32, AccountError> {
    raw.parse::<i32>().map_err(|_| invalid_account_id())
}

pub fn invalid_account_id() -> AccountError {
    AccountError::Validation("invalid id given".to_string())
}

/// POST /account body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl CreateAccountRequest {
    /// Reject names the schema cannot hold
    pub fn validate(&self) -> Result<(), AccountError> {
        for (field, value) in [("firstName", &self.first_name), ("lastName", &self.last_name)] {
            if value.trim().is_empty() {
                return Err(AccountError::Validation(format!("{} is required", field)));
            }
            if value.chars().count() > MAX_NAME_LEN {
                return Err(AccountError::Validation(format!(
                    "{} must be at most {} characters",
                    field, MAX_NAME_LEN
                )));
            }
        }
        Ok(())
    }
}

/// POST /login body
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub number: i64,
    pub password: String,
}

/// POST /login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub number: i64,
}

/// POST /update/{id} body
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}
