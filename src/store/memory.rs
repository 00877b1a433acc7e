// In-process account store (tests and local experiments)

use crate::core::errors::AccountError;
use crate::core::models::Account;
use crate::store::{not_found_by_id, not_found_by_number, AccountStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Rows {
    accounts: BTreeMap<i32, Account>,
    last_id: i32,
}

/// Account store kept in a `BTreeMap`, with ids assigned like a `SERIAL` column
#[derive(Default)]
pub struct InMemoryAccountStore {
    rows: RwLock<Rows>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.accounts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn init(&self) -> Result<(), AccountError> {
        Ok(())
    }

    async fn create_account(&self, account: &Account) -> Result<i32, AccountError> {
        let mut rows = self.rows.write().await;
        if rows.accounts.values().any(|a| a.number == account.number) {
            return Err(AccountError::NumberTaken(account.number));
        }

        rows.last_id += 1;
        let id = rows.last_id;
        let mut stored = account.clone();
        stored.id = id;
        rows.accounts.insert(id, stored);
        Ok(id)
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, AccountError> {
        Ok(self.rows.read().await.accounts.values().cloned().collect())
    }

    async fn get_account_by_id(&self, id: i32) -> Result<Account, AccountError> {
        self.rows
            .read()
            .await
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found_by_id(id))
    }

    async fn get_account_by_number(&self, number: i64) -> Result<Account, AccountError> {
        self.rows
            .read()
            .await
            .accounts
            .values()
            .find(|a| a.number == number)
            .cloned()
            .ok_or_else(|| not_found_by_number(number))
    }

    async fn update_password(&self, id: i32, new_hash: &str) -> Result<(), AccountError> {
        if let Some(account) = self.rows.write().await.accounts.get_mut(&id) {
            account.encrypted_password = new_hash.to_string();
        }
        Ok(())
    }

    async fn delete_account(&self, id: i32) -> Result<(), AccountError> {
        self.rows.write().await.accounts.remove(&id);
        Ok(())
    }
}
