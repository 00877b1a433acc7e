// Axum web server layer

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    BoxError, Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;

pub mod handlers;
pub mod middleware;
pub mod responses;

use crate::auth::auth_middleware::{auth_middleware, AuthState};
use crate::auth::token::TokenService;
use crate::core::credentials::PasswordHasher;
use crate::store::AccountStore;

pub use crate::config::Config;

/// Application state containing all shared dependencies
///
/// Cloned per request by axum, so everything heavy sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
    pub token_service: Arc<TokenService>,
    pub hasher: PasswordHasher,
    pub config: Arc<Config>,
}

/// Create the Axum router with all routes and middleware
///
/// Middleware stack (outermost to innermost):
/// - CORS (tower-http::cors) - single allowed origin
/// - Tracing (tower-http::trace) - one span per request
/// - Request timeout (tower::timeout) - mapped to 408
/// - Body size limit (tower-http::limit) - 413 when exceeded
/// - Auth middleware - per-account routes only
///
/// `GET/POST /account` and `POST /login` are public; they are how a client
/// gets its first token.
pub fn create_router(app_state: &AppState, auth_state: Arc<AuthState>) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/account/:id",
            get(handlers::get_account_handler).delete(handlers::delete_account_handler),
        )
        .route("/update/:id", post(handlers::update_password_handler))
        .route_layer(from_fn_with_state(auth_state, auth_middleware));

    let public = Router::new()
        .route(
            "/account",
            get(handlers::list_accounts_handler).post(handlers::create_account_handler),
        )
        .route("/login", post(handlers::login_handler));

    let config = &app_state.config;
    let timeout_secs = config.request_timeout_secs;

    // HandleErrorLayer must come BEFORE timeout to catch the timeout error
    let timeout_stack = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|e: BoxError| async move {
            let status = if e.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json("request failed".to_string()))
        }))
        .timeout(Duration::from_secs(timeout_secs))
        .into_inner();

    public
        .merge(protected)
        .layer(middleware::body_size_limit_layer(config.body_size_limit_bytes))
        .layer(timeout_stack)
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors_allowed_origin))
}
