// Password hashing (bcrypt) and account-number generation

use crate::core::errors::AccountError;
use crate::core::models::Account;
use chrono::{SubsecRound, Utc};
use rand::Rng;

/// Account numbers are drawn uniformly from `0..ACCOUNT_NUMBER_SPACE`
pub const ACCOUNT_NUMBER_SPACE: i64 = 10_000;

/// bcrypt only looks at the first 72 bytes of its input
pub const MAX_PASSWORD_BYTES: usize = 72;

pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;
pub const DEFAULT_COST: u32 = 10;

/// Plaintext hashed when a login names an account that does not exist
const UNKNOWN_ACCOUNT_PASSWORD: &str = "unknown-account-placeholder";

/// bcrypt password hasher with a tunable cost factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    /// Create a hasher with an explicit cost (log2 of the round count)
    pub fn new(cost: u32) -> Result<Self, AccountError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(AccountError::Configuration(format!(
                "bcrypt cost must be between {} and {}, got {}",
                MIN_COST, MAX_COST, cost
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh salt
    ///
    /// Passwords bcrypt would silently truncate are rejected instead.
    pub fn hash(&self, password: &str) -> Result<String, AccountError> {
        if password.is_empty() {
            return Err(AccountError::Credential("password is required".to_string()));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AccountError::Credential(format!(
                "password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        bcrypt::hash(password, self.cost)
            .map_err(|e| AccountError::Credential(format!("hashing failed: {}", e)))
    }

    /// Reject a login for an account that does not exist
    ///
    /// Burns one bcrypt round of the configured cost so the response takes
    /// as long as a wrong password against a real account. Always false.
    pub fn verify_unknown(&self, _candidate: &str) -> bool {
        let _ = bcrypt::hash(UNKNOWN_ACCOUNT_PASSWORD, self.cost);
        false
    }
}

/// Verify a candidate against a stored bcrypt hash
///
/// A mismatch is a negative result, not an error. Unparseable hashes are
/// treated as a mismatch. Candidates longer than bcrypt's input window never
/// match, otherwise any suffix of a 72-byte password would be accepted.
pub fn verify_password(candidate: &str, hash: &str) -> bool {
    if candidate.len() > MAX_PASSWORD_BYTES {
        return false;
    }
    bcrypt::verify(candidate, hash).unwrap_or(false)
}

/// Draw a public account number in `[0, ACCOUNT_NUMBER_SPACE)`
pub fn generate_account_number() -> i64 {
    rand::thread_rng().gen_range(0..ACCOUNT_NUMBER_SPACE)
}

impl Account {
    /// Build a not-yet-persisted account
    ///
    /// `id` stays 0 until the store assigns one. `created_at` is truncated
    /// to microseconds so it survives a round trip through Postgres.
    pub fn new(
        first_name: &str,
        last_name: &str,
        password: &str,
        hasher: &PasswordHasher,
    ) -> Result<Self, AccountError> {
        let encrypted_password = hasher.hash(password)?;

        Ok(Self {
            id: 0,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            number: generate_account_number(),
            encrypted_password,
            balance: 0,
            created_at: Utc::now().trunc_subsecs(6),
        })
    }

    pub fn valid_password(&self, candidate: &str) -> bool {
        verify_password(candidate, &self.encrypted_password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(MIN_COST).unwrap()
    }

    #[test]
    fn test_new_account_password_roundtrip() {
        let account = Account::new("a", "b", "dummypass", &fast_hasher()).unwrap();

        assert!(account.valid_password("dummypass"));
        assert!(!account.valid_password("dummypass "));
        assert!(!account.valid_password("DUMMYPASS"));
        assert!(!account.valid_password(""));
    }

    #[test]
    fn test_new_account_defaults() {
        let account = Account::new("first", "last", "secret", &fast_hasher()).unwrap();

        assert_eq!(account.id, 0);
        assert_eq!(account.balance, 0);
        assert_eq!(account.first_name, "first");
        assert_eq!(account.last_name, "last");
        assert!((0..ACCOUNT_NUMBER_SPACE).contains(&account.number));
        assert_ne!(account.encrypted_password, "secret");
        assert!(account.encrypted_password.starts_with("$2"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = fast_hasher();
        let first = hasher.hash("same-password").unwrap();
        let second = hasher.hash("same-password").unwrap();

        assert_ne!(first, second, "Each hash should carry its own salt");
        assert!(verify_password("same-password", &first));
        assert!(verify_password("same-password", &second));
    }

    #[test]
    fn test_overlong_password_rejected() {
        let password = "x".repeat(MAX_PASSWORD_BYTES + 1);
        let result = Account::new("a", "b", &password, &fast_hasher());

        assert!(matches!(result, Err(AccountError::Credential(_))));
    }

    #[test]
    fn test_password_at_limit_accepted() {
        let password = "y".repeat(MAX_PASSWORD_BYTES);
        let account = Account::new("a", "b", &password, &fast_hasher()).unwrap();
        assert!(account.valid_password(&password));
    }

    #[test]
    fn test_password_at_limit_rejects_longer_candidates() {
        let password = "y".repeat(MAX_PASSWORD_BYTES);
        let account = Account::new("a", "b", &password, &fast_hasher()).unwrap();

        assert!(!account.valid_password(&format!("{}x", password)));
        assert!(!account.valid_password(&format!("{}-a-different-suffix", password)));
    }

    #[test]
    fn test_verify_unknown_never_matches() {
        let hasher = fast_hasher();
        assert!(!hasher.verify_unknown("32bhatoia"));
        assert!(!hasher.verify_unknown(UNKNOWN_ACCOUNT_PASSWORD));
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(
            fast_hasher().hash(""),
            Err(AccountError::Credential(_))
        ));
    }

    #[test]
    fn test_malformed_hash_is_mismatch() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn test_cost_bounds() {
        assert!(PasswordHasher::new(MIN_COST - 1).is_err());
        assert!(PasswordHasher::new(MAX_COST + 1).is_err());
        assert_eq!(PasswordHasher::new(12).unwrap().cost(), 12);
        assert_eq!(PasswordHasher::default().cost(), DEFAULT_COST);
    }

    #[test]
    fn test_account_numbers_in_range() {
        for _ in 0..1000 {
            let n = generate_account_number();
            assert!((0..ACCOUNT_NUMBER_SPACE).contains(&n));
        }
    }
}
