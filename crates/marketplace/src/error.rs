//! Unified error handling.
//!
//! Per-concern error types live next to their modules; `MarketplaceError`
//! unifies them at the application seam so callers can hold one error type.

use thiserror::Error;

use crate::admin::AdminError;
use crate::backend::BackendError;
use crate::checkout::CheckoutError;
use crate::chatbot::GeminiError;
use crate::config::ConfigError;

/// Application-level error type for the marketplace.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// Backend document operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Checkout input was rejected.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Admin operation was rejected or failed.
    #[error("Admin error: {0}")]
    Admin(#[from] AdminError),

    /// Gemini API operation failed.
    #[error("Assistant error: {0}")]
    Assistant(#[from] GeminiError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Convenience alias for marketplace results.
pub type Result<T> = std::result::Result<T, MarketplaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_error_converts() {
        let err = MarketplaceError::from(CheckoutError::EmptyCart);
        assert!(matches!(err, MarketplaceError::Checkout(_)));
        assert_eq!(err.to_string(), "Checkout error: cart is empty");
    }
}
