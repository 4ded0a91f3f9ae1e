//! Marketplace configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `MARKETPLACE_SUPPORT_PHONE` - WhatsApp number orders are relayed to
//!   (default: 255775769177)
//! - `MARKETPLACE_SUPPORT_EMAIL` - Support mailbox shown to users
//!   (default: sokocamp@gmail.com)
//! - `MARKETPLACE_PAGE_SIZE` - Products revealed per "load more" step
//!   (default: 12)
//! - `GEMINI_API_KEY` - Gemini API key; the chat assistant is rule-based
//!   only when absent
//! - `GEMINI_MODEL` - Gemini model name (default: gemini-1.5-flash)

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Marketplace application configuration.
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// WhatsApp number the order relay is sent to
    pub support_phone: String,
    /// Support mailbox the assistant points off-topic questions at
    pub support_email: String,
    /// Products revealed per "load more" step
    pub page_size: usize,
    /// Gemini API configuration; `None` disables the generative assistant
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GeminiConfig {
    /// Gemini API key
    pub api_key: SecretString,
    /// Model name (e.g., gemini-1.5-flash)
    pub model: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

impl MarketplaceConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let support_phone = get_env_or_default("MARKETPLACE_SUPPORT_PHONE", "255775769177");
        let support_email = get_env_or_default("MARKETPLACE_SUPPORT_EMAIL", "sokocamp@gmail.com");
        let page_size = get_env_or_default("MARKETPLACE_PAGE_SIZE", "12")
            .parse::<usize>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("MARKETPLACE_PAGE_SIZE".to_string(), e.to_string())
            })?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "MARKETPLACE_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let gemini = GeminiConfig::from_env();

        Ok(Self {
            support_phone,
            support_email,
            page_size,
            gemini,
        })
    }
}

impl GeminiConfig {
    /// Load the Gemini configuration, returning `None` when no API key is
    /// set.
    fn from_env() -> Option<Self> {
        let api_key = get_optional_env("GEMINI_API_KEY")?;
        Some(Self {
            api_key: SecretString::from(api_key),
            model: get_env_or_default("GEMINI_MODEL", "gemini-1.5-flash"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_config_debug_redacts_api_key() {
        let config = GeminiConfig {
            api_key: SecretString::from("super_secret_api_key"),
            model: "gemini-1.5-flash".to_string(),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("gemini-1.5-flash"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api_key"));
    }

    #[test]
    fn test_marketplace_config_debug_includes_defaults() {
        let config = MarketplaceConfig {
            support_phone: "255775769177".to_string(),
            support_email: "sokocamp@gmail.com".to_string(),
            page_size: 12,
            gemini: None,
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("255775769177"));
        assert!(debug_output.contains("sokocamp@gmail.com"));
    }
}
