// Axum authorization middleware for per-account routes

use axum::{
    extract::{rejection::PathRejection, Path, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;

use crate::api::responses::ApiError;
use crate::auth::audit_logger::{AuditLogger, AuthContext, AuthEvent, AuthFailureReason};
use crate::auth::token::TokenService;
use crate::core::errors::AccountError;
use crate::core::models::{invalid_account_id, parse_account_id};
use crate::store::AccountStore;

/// Header carrying the session token
///
/// Deliberately not `Authorization: Bearer`; existing clients send the raw
/// token under this name.
pub const TOKEN_HEADER: &str = "jwt-token";

/// Authentication state containing all dependencies
#[derive(Clone)]
pub struct AuthState {
    pub store: Arc<dyn AccountStore>,
    pub token_service: Arc<TokenService>,
    pub audit_logger: Arc<AuditLogger>,
}

/// Authorization middleware function
///
/// Validates the `jwt-token` header, resolves the account named by the
/// `{id}` path segment and lets the request through only if the token's
/// account number matches that account. Every rejection is a 403 with the
/// same body, except an unparseable id which is a 400. The request is passed
/// on unmodified.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    raw_id: Result<Path<String>, PathRejection>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let mut ctx = AuthContext {
        path: request.uri().path().to_string(),
        ip_address: extract_ip_address(request.headers()),
        user_agent: extract_user_agent(request.headers()),
        ..Default::default()
    };
    let reject = |reason: AuthFailureReason, ctx: &AuthContext| {
        auth_state
            .audit_logger
            .log_auth_event(&AuthEvent::AuthFailure { reason }, ctx);
    };

    // 1. Extract token
    let Some(token) = extract_token(request.headers()) else {
        reject(AuthFailureReason::MissingToken, &ctx);
        return Err(ApiError::permission_denied());
    };

    // 2. Validate token
    let claims = match auth_state.token_service.validate_token(&token) {
        Ok(claims) => claims,
        Err(_) => {
            reject(AuthFailureReason::InvalidToken, &ctx);
            return Err(ApiError::permission_denied());
        }
    };
    ctx.token_account_number = Some(claims.account_number);

    // 3. Parse resource id (a segment that is not even UTF-8 fails the same way)
    let parsed = match raw_id {
        Ok(Path(raw_id)) => parse_account_id(&raw_id),
        Err(_) => Err(invalid_account_id()),
    };
    let id = match parsed {
        Ok(id) => id,
        Err(e) => {
            reject(AuthFailureReason::InvalidResourceId, &ctx);
            return Err(e.into());
        }
    };
    ctx.resource_id = Some(id);

    // 4. Resolve owner
    let owner = match auth_state.store.get_account_by_id(id).await {
        Ok(account) => account,
        Err(AccountError::NotFound(_)) => {
            reject(AuthFailureReason::OwnerNotFound, &ctx);
            return Err(ApiError::permission_denied());
        }
        Err(e) => {
            error!(error = %e, id, "Owner lookup failed");
            reject(AuthFailureReason::OwnerLookupFailed, &ctx);
            return Err(ApiError::permission_denied());
        }
    };

    // 5. Owner-check
    if owner.number != claims.account_number {
        reject(AuthFailureReason::OwnershipMismatch, &ctx);
        return Err(ApiError::permission_denied());
    }

    auth_state
        .audit_logger
        .log_auth_event(&AuthEvent::AuthSuccess, &ctx);

    // 6. Delegate
    Ok(next.run(request).await)
}

/// Extract the session token from request headers
fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract IP address from request headers
///
/// Checks `X-Forwarded-For` first (for proxied requests), then `X-Real-IP`.
fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    headers
        .get("X-Forwarded-For")
        .or_else(|| headers.get("X-Real-IP"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Extract user agent from request headers
fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
