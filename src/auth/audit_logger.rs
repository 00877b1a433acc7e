// Security event logging

use tracing::{info, warn};

/// Authentication event type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    AuthSuccess,
    AuthFailure { reason: AuthFailureReason },
}

/// Which check rejected the request
///
/// Only ever logged server-side; clients always see "permission denied".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureReason {
    MissingToken,
    InvalidToken,
    InvalidResourceId,
    OwnerNotFound,
    OwnerLookupFailed,
    OwnershipMismatch,
}

impl AuthFailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthFailureReason::MissingToken => "missing token",
            AuthFailureReason::InvalidToken => "invalid token",
            AuthFailureReason::InvalidResourceId => "invalid resource id",
            AuthFailureReason::OwnerNotFound => "owner not found",
            AuthFailureReason::OwnerLookupFailed => "owner lookup failed",
            AuthFailureReason::OwnershipMismatch => "ownership mismatch",
        }
    }
}

/// Request details attached to every audit record
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub path: String,
    pub resource_id: Option<i32>,
    pub token_account_number: Option<i64>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Audit logger for security events
///
/// Emits one structured record per authorization decision under the
/// `audit` target so it can be routed separately from request logs.
#[derive(Debug, Default)]
pub struct AuditLogger;

impl AuditLogger {
    pub fn new() -> Self {
        Self
    }

    /// Log an authentication event
    pub fn log_auth_event(&self, event: &AuthEvent, ctx: &AuthContext) {
        match event {
            AuthEvent::AuthSuccess => {
                info!(
                    target: "audit",
                    path = %ctx.path,
                    resource_id = ?ctx.resource_id,
                    account_number = ?ctx.token_account_number,
                    ip_address = ?ctx.ip_address,
                    user_agent = ?ctx.user_agent,
                    "Authorization granted"
                );
            }
            AuthEvent::AuthFailure { reason } => {
                warn!(
                    target: "audit",
                    path = %ctx.path,
                    resource_id = ?ctx.resource_id,
                    account_number = ?ctx.token_account_number,
                    ip_address = ?ctx.ip_address,
                    user_agent = ?ctx.user_agent,
                    reason = reason.as_str(),
                    "Authorization denied"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_logger_logging() {
        let logger = AuditLogger::new();
        let ctx = AuthContext {
            path: "/account/1".to_string(),
            resource_id: Some(1),
            token_account_number: Some(4242),
            ip_address: Some("127.0.0.1".to_string()),
            user_agent: Some("test-agent".to_string()),
        };

        // Should not panic without a subscriber installed
        logger.log_auth_event(&AuthEvent::AuthSuccess, &ctx);
        logger.log_auth_event(
            &AuthEvent::AuthFailure {
                reason: AuthFailureReason::OwnershipMismatch,
            },
            &ctx,
        );
    }

    #[test]
    fn test_failure_reasons_are_distinct() {
        let reasons = [
            AuthFailureReason::MissingToken,
            AuthFailureReason::InvalidToken,
            AuthFailureReason::InvalidResourceId,
            AuthFailureReason::OwnerNotFound,
            AuthFailureReason::OwnerLookupFailed,
            AuthFailureReason::OwnershipMismatch,
        ];
        let mut labels: Vec<&str> = reasons.iter().map(|r| r.as_str()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), reasons.len());
    }
}
