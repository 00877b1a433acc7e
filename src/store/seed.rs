// Demo data for `--seed`

use crate::core::credentials::PasswordHasher;
use crate::core::errors::AccountError;
use crate::core::models::Account;
use crate::store::{register_account, AccountStore};
use tracing::info;

/// Accounts created by `--seed`: (first name, last name, password)
pub const SEED_ACCOUNTS: [(&str, &str, &str); 2] = [
    ("dummy", "account", "32bhatoia"),
    ("dummy2", "account2", "32bhatoia"),
];

/// Create the demo accounts and return them with their assigned ids
pub async fn seed_accounts(
    store: &dyn AccountStore,
    hasher: &PasswordHasher,
) -> Result<Vec<Account>, AccountError> {
    let mut seeded = Vec::with_capacity(SEED_ACCOUNTS.len());
    for (first_name, last_name, password) in SEED_ACCOUNTS {
        let account = Account::new(first_name, last_name, password, hasher)?;
        let account = register_account(store, account).await?;
        info!(id = account.id, number = account.number, "Seeded account");
        seeded.push(account);
    }
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryAccountStore;

    #[tokio::test]
    async fn test_seed_creates_demo_accounts() {
        let store = InMemoryAccountStore::new();
        let hasher = PasswordHasher::new(4).unwrap();

        let seeded = seed_accounts(&store, &hasher).await.unwrap();

        assert_eq!(seeded.len(), 2);
        assert_eq!(store.len().await, 2);
        for account in &seeded {
            let stored = store.get_account_by_id(account.id).await.unwrap();
            assert!(stored.valid_password("32bhatoia"));
        }
    }
}
