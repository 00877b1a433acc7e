// Request handlers for API endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{info, warn};

use crate::api::responses::ApiError;
use crate::api::AppState;
use crate::core::errors::AccountError;
use crate::core::models::{
    parse_account_id, Account, CreateAccountRequest, LoginRequest, LoginResponse,
    UpdatePasswordRequest,
};
use crate::store::register_account;

/// Body message for every failed login, whatever the cause
const LOGIN_FAILED: &str = "authentication failed";

/// List all accounts
///
/// GET /account
pub async fn list_accounts_handler(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Account>>, ApiError> {
    let accounts = app_state.store.get_accounts().await?;
    Ok(Json(accounts))
}

/// Register a new account
///
/// POST /account
///
/// The number is drawn at random and redrawn on collision. The response
/// never contains the password or its hash.
pub async fn create_account_handler(
    State(app_state): State<AppState>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<Json<Account>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let hasher = app_state.hasher;
    let account = run_blocking(move || {
        Account::new(
            &request.first_name,
            &request.last_name,
            &request.password,
            &hasher,
        )
    })
    .await?;

    let account = register_account(app_state.store.as_ref(), account).await?;
    info!(id = account.id, number = account.number, "Account created");

    Ok(Json(account))
}

/// Fetch one account
///
/// GET /account/{id} (owner only)
///
/// Also mints a fresh session token for the account. The token itself is
/// not returned or logged; only the issuance is recorded.
pub async fn get_account_handler(
    State(app_state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Account>, ApiError> {
    let id = parse_account_id(&raw_id)?;
    let account = app_state.store.get_account_by_id(id).await?;

    app_state.token_service.issue_token(&account)?;
    info!(
        id = account.id,
        number = account.number,
        ttl_secs = app_state.token_service.ttl().as_secs(),
        "Session token issued"
    );

    Ok(Json(account))
}

/// Delete one account
///
/// DELETE /account/{id} (owner only)
pub async fn delete_account_handler(
    State(app_state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_account_id(&raw_id)?;
    app_state.store.delete_account(id).await?;
    info!(id, "Account deleted");
    Ok(StatusCode::OK)
}

/// Exchange an account number and password for a session token
///
/// POST /login
///
/// Unknown numbers and wrong passwords produce the same 400 response.
pub async fn login_handler(
    State(app_state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;

    let account = match app_state.store.get_account_by_number(request.number).await {
        Ok(account) => account,
        Err(AccountError::NotFound(_)) => {
            // Same bcrypt cost as a wrong password, so timing does not reveal the number
            let hasher = app_state.hasher;
            let password = request.password;
            run_blocking(move || Ok(hasher.verify_unknown(&password))).await?;
            warn!(number = request.number, "Login for unknown account number");
            return Err(AccountError::Credential(LOGIN_FAILED.to_string()).into());
        }
        Err(e) => return Err(e.into()),
    };

    let password = request.password;
    let stored = account.clone();
    let valid = run_blocking(move || Ok(stored.valid_password(&password))).await?;
    if !valid {
        warn!(number = account.number, "Login with wrong password");
        return Err(AccountError::Credential(LOGIN_FAILED.to_string()).into());
    }

    let token = app_state.token_service.issue_token(&account)?;
    info!(number = account.number, "Login succeeded");

    Ok(Json(LoginResponse {
        token,
        number: account.number,
    }))
}

/// Replace an account's password
///
/// POST /update/{id} (owner only)
pub async fn update_password_handler(
    State(app_state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdatePasswordRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_account_id(&raw_id)?;
    let Json(request) = payload?;

    let hasher = app_state.hasher;
    let new_hash = run_blocking(move || hasher.hash(&request.password)).await?;

    app_state.store.update_password(id, &new_hash).await?;
    info!(id, "Password updated");
    Ok(StatusCode::OK)
}

/// Run bcrypt work off the async worker threads
async fn run_blocking<T, F>(f: F) -> Result<T, AccountError>
where
    F: FnOnce() -> Result<T, AccountError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AccountError::Credential(format!("hashing task failed: {}", e)))?
}
