//! # Gateway Error Types
//!
//! Typed error handling for the lightning-gateway payment engine.
//! All gateway operations return `Result<T, GatewayError>`.
//!
//! A declined payment is *not* an error: it is a settled payment whose
//! status is `failed` and whose `error_code` is [`PAYMENT_FAILED_CODE`].

use thiserror::Error;

/// Error code stored on a payment the simulated bank declined
pub const PAYMENT_FAILED_CODE: &str = "PAYMENT_FAILED";

/// Error description stored on a payment the simulated bank declined
pub const PAYMENT_FAILED_DESCRIPTION: &str = "Payment declined by bank";

/// Core error type for all gateway operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Bad or missing credentials, or the caller does not own the resource
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Malformed input, amount below minimum, unknown payment method
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unknown order or payment id
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// VPA does not match `local@handle`
    #[error("Invalid VPA: {0}")]
    InvalidVpa(String),

    /// Card number fails the Luhn check or the card details are unusable
    #[error("Invalid card: {0}")]
    InvalidCard(String),

    /// Card expiry lies in the past
    #[error("Expired card: {0}")]
    ExpiredCard(String),

    /// A settle was attempted on a payment that already reached a terminal state
    #[error("Invalid transition for payment {payment_id}: already {status}")]
    InvalidTransition { payment_id: String, status: String },

    /// Startup configuration errors (bad env values, unreadable seed file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Store unavailable or an unexpected fault
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Shorthand for a missing order
    pub fn order_not_found(id: impl Into<String>) -> Self {
        GatewayError::NotFound {
            entity: "Order",
            id: id.into(),
        }
    }

    /// Shorthand for a missing payment
    pub fn payment_not_found(id: impl Into<String>) -> Self {
        GatewayError::NotFound {
            entity: "Payment",
            id: id.into(),
        }
    }

    /// Taxonomy code surfaced in the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Authentication(_) => "AUTHENTICATION_ERROR",
            GatewayError::BadRequest(_) => "BAD_REQUEST_ERROR",
            GatewayError::NotFound { .. } => "NOT_FOUND_ERROR",
            GatewayError::InvalidVpa(_) => "INVALID_VPA",
            GatewayError::InvalidCard(_) => "INVALID_CARD",
            GatewayError::ExpiredCard(_) => "EXPIRED_CARD",
            GatewayError::InvalidTransition { .. }
            | GatewayError::Configuration(_)
            | GatewayError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Human readable description surfaced in the error envelope.
    ///
    /// Internal faults are not echoed back to clients.
    pub fn description(&self) -> String {
        match self {
            GatewayError::Authentication(msg)
            | GatewayError::BadRequest(msg)
            | GatewayError::InvalidVpa(msg)
            | GatewayError::InvalidCard(msg)
            | GatewayError::ExpiredCard(msg) => msg.clone(),
            GatewayError::NotFound { entity, .. } => format!("{} not found", entity),
            GatewayError::InvalidTransition { .. }
            | GatewayError::Configuration(_)
            | GatewayError::Internal(_) => "Internal Server Error".to_string(),
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Authentication(_) => 401,
            GatewayError::BadRequest(_)
            | GatewayError::InvalidVpa(_)
            | GatewayError::InvalidCard(_)
            | GatewayError::ExpiredCard(_) => 400,
            GatewayError::NotFound { .. } => 404,
            GatewayError::InvalidTransition { .. }
            | GatewayError::Configuration(_)
            | GatewayError::Internal(_) => 500,
        }
    }

    /// Returns true for input validation failures (detected before any write)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GatewayError::BadRequest(_)
                | GatewayError::InvalidVpa(_)
                | GatewayError::InvalidCard(_)
                | GatewayError::ExpiredCard(_)
        )
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_codes() {
        assert_eq!(
            GatewayError::Authentication("x".into()).code(),
            "AUTHENTICATION_ERROR"
        );
        assert_eq!(GatewayError::order_not_found("order_1").code(), "NOT_FOUND_ERROR");
        assert_eq!(GatewayError::InvalidVpa("x".into()).code(), "INVALID_VPA");
        assert_eq!(GatewayError::ExpiredCard("x".into()).code(), "EXPIRED_CARD");
        assert_eq!(
            GatewayError::InvalidTransition {
                payment_id: "pay_1".into(),
                status: "success".into()
            }
            .code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(GatewayError::Authentication("x".into()).status_code(), 401);
        assert_eq!(GatewayError::InvalidCard("x".into()).status_code(), 400);
        assert_eq!(GatewayError::payment_not_found("pay_1").status_code(), 404);
        assert_eq!(GatewayError::Internal("db down".into()).status_code(), 500);
    }

    #[test]
    fn test_internal_details_are_not_described() {
        let err = GatewayError::Internal("connection refused to 10.0.0.3".into());
        assert_eq!(err.description(), "Internal Server Error");
        assert_eq!(
            GatewayError::order_not_found("order_x").description(),
            "Order not found"
        );
    }
}
