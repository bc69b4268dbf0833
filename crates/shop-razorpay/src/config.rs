//! # Razorpay Configuration
//!
//! Configuration management for the Razorpay integration.
//! Credentials come from the `RAZORPAY_*` settings.

use shop_core::ShopError;

/// Default Razorpay REST endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.razorpay.com";

/// Razorpay API configuration
#[derive(Clone)]
pub struct RazorpayConfig {
    /// Key id (rzp_test_... or rzp_live_...)
    pub key_id: String,

    /// Key secret; also the HMAC key for payment signatures
    pub key_secret: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,
}

impl RazorpayConfig {
    /// Load configuration from any key/value source.
    ///
    /// Keys (both default to empty, which leaves the gateway unusable
    /// but lets the rest of the store start):
    /// - `RAZORPAY_KEY_ID`
    /// - `RAZORPAY_KEY_SECRET`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ShopError> {
        let key_id = lookup("RAZORPAY_KEY_ID").unwrap_or_default();
        let key_secret = lookup("RAZORPAY_KEY_SECRET").unwrap_or_default();

        let config = Self::new(key_id, key_secret);
        config.validate()?;
        Ok(config)
    }

    /// Create config with explicit values
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Validate key format when a key is present
    pub fn validate(&self) -> Result<(), ShopError> {
        if !self.key_id.is_empty()
            && !self.key_id.starts_with("rzp_test_")
            && !self.key_id.starts_with("rzp_live_")
        {
            return Err(ShopError::Configuration(
                "RAZORPAY_KEY_ID must start with rzp_test_ or rzp_live_".to_string(),
            ));
        }
        if self.key_id.is_empty() != self.key_secret.is_empty() {
            return Err(ShopError::Configuration(
                "RAZORPAY_KEY_ID and RAZORPAY_KEY_SECRET must be set together".to_string(),
            ));
        }
        Ok(())
    }

    /// Both credentials present
    pub fn is_configured(&self) -> bool {
        !self.key_id.is_empty() && !self.key_secret.is_empty()
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.key_id.starts_with("rzp_test_")
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = RazorpayConfig::new("rzp_test_abc123", "secret");
        assert!(config.validate().is_ok());
        assert!(config.is_configured());
        assert!(config.is_test_mode());

        let live = RazorpayConfig::new("rzp_live_abc123", "secret");
        assert!(!live.is_test_mode());

        let bad = RazorpayConfig::new("sk_test_abc", "secret");
        assert!(matches!(bad.validate(), Err(ShopError::Configuration(_))));

        let half = RazorpayConfig::new("rzp_test_abc", "");
        assert!(half.validate().is_err());
    }

    #[test]
    fn test_from_lookup() {
        let config = RazorpayConfig::from_lookup(|key: &str| match key {
            "RAZORPAY_KEY_ID" => Some("rzp_live_abc".to_string()),
            "RAZORPAY_KEY_SECRET" => Some("secret".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.key_id, "rzp_live_abc");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);

        let unset = RazorpayConfig::from_lookup(|_: &str| None).unwrap();
        assert!(!unset.is_configured());

        let half = RazorpayConfig::from_lookup(|key: &str| {
            (key == "RAZORPAY_KEY_ID").then(|| "rzp_test_abc".to_string())
        });
        assert!(matches!(half, Err(ShopError::Configuration(_))));
    }

    #[test]
    fn test_empty_config_is_allowed() {
        let config = RazorpayConfig::new("", "");
        assert!(config.validate().is_ok());
        assert!(!config.is_configured());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = RazorpayConfig::new("rzp_test_abc", "topsecret");
        let printed = format!("{config:?}");
        assert!(!printed.contains("topsecret"));
        assert!(printed.contains("rzp_test_abc"));
    }
}
