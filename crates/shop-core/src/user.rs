//! # User Types
//!
//! Admin users and the external identity exchange that creates them.

use crate::error::ShopResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user known to the storefront.
///
/// Created on the first successful identity exchange and never modified or
/// deleted afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Identity-provider user id
    pub id: String,

    /// Email address (used to find returning users)
    pub email: String,

    /// Display name
    pub name: String,

    /// Avatar URL
    pub picture: String,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// Profile returned by the identity provider for a one-time session id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: String,
    /// Bearer token minted by the provider; becomes our session token
    pub session_token: String,
}

impl IdentityProfile {
    /// Build the user record for a first-time login
    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            picture: self.picture.clone(),
            created_at: Utc::now(),
        }
    }
}

/// External identity provider.
///
/// Exchanges the one-time session id handed to the browser after an OAuth
/// redirect for the user's profile and a long-lived session token.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange(&self, session_id: &str) -> ShopResult<IdentityProfile>;
}
