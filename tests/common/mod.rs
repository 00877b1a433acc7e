// Common test utilities and helpers for all test modules
#![allow(dead_code)]

use account_service::api::{create_router, AppState};
use account_service::auth::audit_logger::AuditLogger;
use account_service::auth::auth_middleware::{AuthState, TOKEN_HEADER};
use account_service::auth::token::TokenService;
use account_service::config::Config;
use account_service::core::credentials::PasswordHasher;
use account_service::core::errors::AccountError;
use account_service::core::models::Account;
use account_service::store::{register_account, AccountStore, InMemoryAccountStore};
use axum::{
    body::{Body, Bytes},
    http::{Request, StatusCode},
    Router,
};
use secrecy::Secret;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Cheapest bcrypt cost, keeps tests fast
pub fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(4).unwrap()
}

pub fn test_token_service() -> Arc<TokenService> {
    Arc::new(
        TokenService::new(
            Secret::new(TEST_SECRET.to_string()),
            Duration::from_secs(900),
        )
        .unwrap(),
    )
}

/// Build app state around any store
pub fn test_app_state(store: Arc<dyn AccountStore>) -> (AppState, Arc<AuthState>) {
    let token_service = test_token_service();

    let auth_state = Arc::new(AuthState {
        store: store.clone(),
        token_service: token_service.clone(),
        audit_logger: Arc::new(AuditLogger::new()),
    });

    let app_state = AppState {
        store,
        token_service,
        hasher: test_hasher(),
        config: Arc::new(Config::test_config()),
    };

    (app_state, auth_state)
}

/// Fully layered router, ready for `oneshot`
pub fn test_router(store: Arc<dyn AccountStore>) -> Router {
    let (app_state, auth_state) = test_app_state(store);
    create_router(&app_state, auth_state).with_state(app_state)
}

/// Insert an account directly through the store
pub async fn seed_account(
    store: &dyn AccountStore,
    first_name: &str,
    last_name: &str,
    password: &str,
) -> Account {
    let account = Account::new(first_name, last_name, password, &test_hasher()).unwrap();
    register_account(store, account).await.unwrap()
}

pub fn token_for(account: &Account) -> String {
    test_token_service().issue_token(account).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request("GET", uri, token, Body::empty())
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    request("DELETE", uri, token, Body::empty())
}

pub fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    request("POST", uri, token, Body::from(body.to_string()))
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header(TOKEN_HEADER, token);
    }
    builder.body(body).unwrap()
}

/// Send one request and collect status plus body
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body)
}

/// Decode an error body, which is always a bare JSON string
pub fn error_message(body: &Bytes) -> String {
    serde_json::from_slice(body).unwrap()
}

/// Store wrapper that counts calls, to prove a request never reached a handler
#[derive(Default)]
pub struct SpyStore {
    pub inner: InMemoryAccountStore,
    pub lookups_by_id: AtomicUsize,
    pub mutations: AtomicUsize,
}

impl SpyStore {
    pub fn lookups_by_id(&self) -> usize {
        self.lookups_by_id.load(Ordering::SeqCst)
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AccountStore for SpyStore {
    async fn init(&self) -> Result<(), AccountError> {
        self.inner.init().await
    }

    async fn create_account(&self, account: &Account) -> Result<i32, AccountError> {
        self.inner.create_account(account).await
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, AccountError> {
        self.inner.get_accounts().await
    }

    async fn get_account_by_id(&self, id: i32) -> Result<Account, AccountError> {
        self.lookups_by_id.fetch_add(1, Ordering::SeqCst);
        self.inner.get_account_by_id(id).await
    }

    async fn get_account_by_number(&self, number: i64) -> Result<Account, AccountError> {
        self.inner.get_account_by_number(number).await
    }

    async fn update_password(&self, id: i32, new_hash: &str) -> Result<(), AccountError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner.update_password(id, new_hash).await
    }

    async fn delete_account(&self, id: i32) -> Result<(), AccountError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_account(id).await
    }
}

/// Store whose backend is always down
pub struct FailingStore;

fn down() -> AccountError {
    AccountError::Persistence("connection refused".to_string())
}

#[async_trait::async_trait]
impl AccountStore for FailingStore {
    async fn init(&self) -> Result<(), AccountError> {
        Err(down())
    }

    async fn create_account(&self, _account: &Account) -> Result<i32, AccountError> {
        Err(down())
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, AccountError> {
        Err(down())
    }

    async fn get_account_by_id(&self, _id: i32) -> Result<Account, AccountError> {
        Err(down())
    }

    async fn get_account_by_number(&self, _number: i64) -> Result<Account, AccountError> {
        Err(down())
    }

    async fn update_password(&self, _id: i32, _new_hash: &str) -> Result<(), AccountError> {
        Err(down())
    }

    async fn delete_account(&self, _id: i32) -> Result<(), AccountError> {
        Err(down())
    }
}
