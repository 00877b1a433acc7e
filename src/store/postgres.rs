// PostgreSQL-backed account store

use crate::core::errors::AccountError;
use crate::core::models::Account;
use crate::store::{not_found_by_id, not_found_by_number, AccountStore};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::{debug, info};

const CREATE_ACCOUNT_TABLE: &str = "CREATE TABLE IF NOT EXISTS account (
    id                 SERIAL PRIMARY KEY,
    first_name         VARCHAR(50) NOT NULL,
    last_name          VARCHAR(50) NOT NULL,
    number             BIGINT NOT NULL UNIQUE,
    encrypted_password VARCHAR(100) NOT NULL,
    balance            BIGINT NOT NULL DEFAULT 0,
    created_at         TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

const ACCOUNT_COLUMNS: &str =
    "id, first_name, last_name, number, encrypted_password, balance, created_at";

/// Account store over a shared sqlx connection pool
#[derive(Clone)]
pub struct PgAccountStore {
    db_pool: PgPool,
}

impl PgAccountStore {
    /// Wrap an existing pool
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Open a pool with the given options and verify connectivity
    pub async fn connect(
        options: PgConnectOptions,
        max_connections: u32,
    ) -> Result<Self, AccountError> {
        let db_pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        info!(max_connections, "Database pool initialized");
        Ok(Self::new(db_pool))
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn init(&self) -> Result<(), AccountError> {
        sqlx::query(CREATE_ACCOUNT_TABLE)
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }

    async fn create_account(&self, account: &Account) -> Result<i32, AccountError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO account
                (first_name, last_name, number, encrypted_password, balance, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.number)
        .bind(&account.encrypted_password)
        .bind(account.balance)
        .bind(account.created_at)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AccountError::NumberTaken(account.number)
            }
            other => other.into(),
        })?;

        debug!(id, number = account.number, "Account inserted");
        Ok(id)
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, AccountError> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM account",
            ACCOUNT_COLUMNS
        ))
        .fetch_all(&self.db_pool)
        .await?;

        Ok(accounts)
    }

    async fn get_account_by_id(&self, id: i32) -> Result<Account, AccountError> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM account WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| not_found_by_id(id))
    }

    async fn get_account_by_number(&self, number: i64) -> Result<Account, AccountError> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM account WHERE number = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(number)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| not_found_by_number(number))
    }

    async fn update_password(&self, id: i32, new_hash: &str) -> Result<(), AccountError> {
        let result = sqlx::query("UPDATE account SET encrypted_password = $1 WHERE id = $2")
            .bind(new_hash)
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        info!(id, rows_affected = result.rows_affected(), "Password update executed");
        Ok(())
    }

    async fn delete_account(&self, id: i32) -> Result<(), AccountError> {
        let result = sqlx::query("DELETE FROM account WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        info!(id, rows_affected = result.rows_affected(), "Account delete executed");
        Ok(())
    }
}
