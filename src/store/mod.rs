// Account persistence contract and backends

pub mod memory;
pub mod postgres;
pub mod seed;

use crate::core::credentials::generate_account_number;
use crate::core::errors::AccountError;
use crate::core::models::Account;
use async_trait::async_trait;
use tracing::warn;

pub use memory::InMemoryAccountStore;
pub use postgres::PgAccountStore;

/// How many fresh account numbers to try before giving up on registration
pub const MAX_NUMBER_ATTEMPTS: usize = 5;

/// Persistence operations over account records
///
/// Every operation maps to a single atomic statement in the backing store.
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create the account table if it does not exist. Idempotent.
    async fn init(&self) -> Result<(), AccountError>;

    /// Insert a new account and return its assigned id
    ///
    /// Fails with `NumberTaken` if another row already holds `account.number`.
    async fn create_account(&self, account: &Account) -> Result<i32, AccountError>;

    /// All accounts, in no particular order
    async fn get_accounts(&self) -> Result<Vec<Account>, AccountError>;

    async fn get_account_by_id(&self, id: i32) -> Result<Account, AccountError>;

    async fn get_account_by_number(&self, number: i64) -> Result<Account, AccountError>;

    /// Replace the stored password hash. Zero matched rows is not an error.
    async fn update_password(&self, id: i32, new_hash: &str) -> Result<(), AccountError>;

    /// Remove the account. Zero matched rows is not an error.
    async fn delete_account(&self, id: i32) -> Result<(), AccountError>;
}

/// Persist a freshly built account, drawing a new number on collision
///
/// Returns the account with its store-assigned id filled in.
pub async fn register_account(
    store: &dyn AccountStore,
    mut account: Account,
) -> Result<Account, AccountError> {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match store.create_account(&account).await {
            Ok(id) => {
                account.id = id;
                return Ok(account);
            }
            Err(AccountError::NumberTaken(number)) if attempts < MAX_NUMBER_ATTEMPTS => {
                warn!(number, attempts, "Account number collision, drawing a new one");
                account.number = generate_account_number();
            }
            Err(e) => return Err(e),
        }
    }
}

pub(crate) fn not_found_by_id(id: i32) -> AccountError {
    AccountError::NotFound(format!("account {} not found", id))
}

pub(crate) fn not_found_by_number(number: i64) -> AccountError {
    AccountError::NotFound(format!("account {} not found", number))
}
