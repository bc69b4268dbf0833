//! # Storefront Error Types
//!
//! Typed error handling for the storefront core.
//! All store, catalog, order and payment operations return `Result<T, ShopError>`.

use thiserror::Error;

/// Core error type for all storefront operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Missing, invalid or expired session token
    #[error("Unauthorized")]
    Unauthenticated,

    /// Entity missing by id, slug or order number
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Malformed or out-of-range input
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The identity provider rejected the one-time session id
    #[error("Invalid session: {0}")]
    IdentityExchange(String),

    /// Payment gateway rejected or failed a request
    #[error("Payment gateway error: {message}")]
    PaymentGateway { message: String },

    /// Payment signature did not verify
    #[error("Payment verification failed: {0}")]
    PaymentVerification(String),

    /// Owner notification could not be delivered
    #[error("Notification failed: {0}")]
    Notification(String),

    /// Document store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Upload storage failure
    #[error("Asset storage error: {0}")]
    AssetStorage(String),

    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Shorthand for a missing entity
    pub fn not_found(entity: &'static str) -> Self {
        ShopError::NotFound { entity }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::Unauthenticated => 401,
            ShopError::NotFound { .. } => 404,
            ShopError::Validation(_) => 400,
            ShopError::IdentityExchange(_) => 400,
            ShopError::PaymentGateway { .. } => 502,
            ShopError::PaymentVerification(_) => 400,
            ShopError::Notification(_) => 500,
            ShopError::Store(_) => 500,
            ShopError::AssetStorage(_) => 500,
            ShopError::Configuration(_) => 500,
            ShopError::Internal(_) => 500,
        }
    }

    /// Returns true for failures on our side rather than the caller's
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

/// Result type alias for storefront operations
pub type ShopResult<T> = Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ShopError::Unauthenticated.status_code(), 401);
        assert_eq!(ShopError::not_found("Product").status_code(), 404);
        assert_eq!(ShopError::Validation("bad".into()).status_code(), 400);
        assert_eq!(
            ShopError::PaymentGateway {
                message: "Authentication failed".into()
            }
            .status_code(),
            502
        );
        assert_eq!(
            ShopError::PaymentVerification("mismatch".into()).status_code(),
            400
        );
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ShopError::not_found("Order").to_string(), "Order not found");
    }

    #[test]
    fn test_server_errors() {
        assert!(ShopError::Store("down".into()).is_server_error());
        assert!(!ShopError::Unauthenticated.is_server_error());
    }
}
