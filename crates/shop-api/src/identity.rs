//! # Identity Provider Client
//!
//! Exchanges the one-time session id from the OAuth redirect for the user's
//! profile and session token.

use async_trait::async_trait;
use reqwest::Client;
use shop_core::{IdentityProfile, IdentityProvider, ShopError, ShopResult};
use tracing::{debug, instrument, warn};

/// Header carrying the one-time session id, inbound and outbound
pub const SESSION_ID_HEADER: &str = "X-Session-ID";

/// Default session-data endpoint
pub const DEFAULT_IDENTITY_SESSION_URL: &str =
    "https://demobackend.emergentagent.com/auth/v1/env/oauth/session-data";

/// HTTP identity provider
pub struct HttpIdentityProvider {
    session_url: String,
    client: Client,
}

impl HttpIdentityProvider {
    pub fn new(session_url: impl Into<String>) -> ShopResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ShopError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            session_url: session_url.into(),
            client,
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(skip(self, session_id))]
    async fn exchange(&self, session_id: &str) -> ShopResult<IdentityProfile> {
        let response = self
            .client
            .get(&self.session_url)
            .header(SESSION_ID_HEADER, session_id)
            .send()
            .await
            .map_err(|e| ShopError::IdentityExchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Identity provider rejected session id: status={}", status);
            return Err(ShopError::IdentityExchange(format!("HTTP {}", status)));
        }

        let profile: IdentityProfile = response
            .json()
            .await
            .map_err(|e| ShopError::IdentityExchange(e.to_string()))?;

        debug!("Identity exchange succeeded for {}", profile.email);
        Ok(profile)
    }
}
