// Session token issuance and validation (HMAC-signed JWT)

use crate::core::errors::AccountError;
use crate::core::models::Account;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Claims embedded in every session token
///
/// `expiresAt` is a unix timestamp in seconds and is enforced on validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub account_number: i64,
    pub expires_at: i64,
}

/// Issues and validates stateless session tokens
///
/// Tokens are signed with HS256 using a symmetric secret from configuration.
/// Only the HMAC family is accepted on the way back in, so a token that
/// names `none` or an asymmetric algorithm never reaches signature checking.
pub struct TokenService {
    secret: Secret<String>,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service; an empty secret is a configuration error
    pub fn new(secret: Secret<String>, ttl: Duration) -> Result<Self, AccountError> {
        if secret.expose_secret().is_empty() {
            return Err(AccountError::Configuration(
                "JWT signing secret is empty".to_string(),
            ));
        }
        if ttl.is_zero() {
            return Err(AccountError::Configuration(
                "token lifetime must be greater than 0".to_string(),
            ));
        }
        if ttl.as_secs() > MAX_TOKEN_TTL_SECS {
            return Err(AccountError::Configuration(format!(
                "token lifetime must be at most {} seconds",
                MAX_TOKEN_TTL_SECS
            )));
        }
        Ok(Self { secret, ttl })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for the given account
    pub fn issue_token(&self, account: &Account) -> Result<String, AccountError> {
        let expires_at = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|ttl| Utc::now().timestamp().checked_add(ttl))
            .ok_or_else(|| AccountError::Signing("token expiry out of range".to_string()))?;

        let claims = TokenClaims {
            account_number: account.number,
            expires_at,
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims with the service secret
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, AccountError> {
        let key = EncodingKey::from_secret(self.secret.expose_secret().as_bytes());
        encode(&Header::new(Algorithm::HS256), claims, &key)
            .map_err(|e| AccountError::Signing(e.to_string()))
    }

    /// Verify signature, algorithm and expiry, returning the decoded claims
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, AccountError> {
        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // Expiry lives in our own `expiresAt` claim, checked below
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<TokenClaims>(token, &key, &validation)
            .map_err(|e| AccountError::InvalidToken(e.to_string()))?;

        if data.claims.expires_at <= Utc::now().timestamp() {
            return Err(AccountError::InvalidToken("token expired".to_string()));
        }

        Ok(data.claims)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<REDACTED>")
            .field("ttl", &self.ttl)
            .finish()
    }
}
