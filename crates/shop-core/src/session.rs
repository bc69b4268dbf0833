//! # Sessions & Auth Gate
//!
//! Session issuance, validation and revocation for admin users.
//!
//! A session is a single fixed-lifetime bearer token per login. There is no
//! rotation and no rate limiting. Expired sessions are rejected by `resolve`
//! but only removed by `purge_expired`.

use crate::error::{ShopError, ShopResult};
use crate::store::BoxedStore;
use crate::user::{IdentityProvider, User};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session_token";

/// Lifetime of a session and of its cookie
pub const SESSION_TTL_DAYS: i64 = 7;

/// Session lifetime as a duration
pub fn session_ttl() -> Duration {
    Duration::days(SESSION_TTL_DAYS)
}

/// A persisted login session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Owning user (weak reference)
    pub user_id: String,

    /// Opaque bearer token
    pub session_token: String,

    /// Expiry timestamp
    pub expires_at: DateTime<Utc>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Check if the session has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Where a request may carry its session token
#[derive(Debug, Clone, Default)]
pub struct TokenSource {
    /// Value of the `session_token` cookie
    pub cookie: Option<String>,
    /// Raw `Authorization` header value
    pub authorization: Option<String>,
}

impl TokenSource {
    /// The token to authenticate with: the cookie if present, else a
    /// `Bearer` authorization header.
    pub fn token(&self) -> Option<&str> {
        if let Some(cookie) = self.cookie.as_deref().filter(|c| !c.is_empty()) {
            return Some(cookie);
        }
        self.authorization
            .as_deref()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// Session store and auth gate
#[derive(Clone)]
pub struct SessionService {
    store: BoxedStore,
}

impl SessionService {
    pub fn new(store: BoxedStore) -> Self {
        Self { store }
    }

    /// Persist a session for `user_id` that expires after `ttl`
    #[instrument(skip(self, token))]
    pub async fn issue_session(
        &self,
        user_id: &str,
        token: &str,
        ttl: Duration,
    ) -> ShopResult<Session> {
        if ttl <= Duration::zero() {
            return Err(ShopError::Validation(
                "session lifetime must be positive".to_string(),
            ));
        }
        if token.is_empty() {
            return Err(ShopError::Validation(
                "session token must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let session = Session {
            user_id: user_id.to_string(),
            session_token: token.to_string(),
            expires_at: now + ttl,
            created_at: now,
        };
        self.store.insert_session(&session).await?;

        info!("Issued session for user {}", user_id);
        Ok(session)
    }

    /// Resolve a token to the owning user
    #[instrument(skip(self, token))]
    pub async fn resolve(&self, token: &str) -> ShopResult<User> {
        let session = self
            .store
            .find_session(token)
            .await?
            .ok_or(ShopError::Unauthenticated)?;

        if session.is_expired_at(Utc::now()) {
            debug!("Rejected expired session for user {}", session.user_id);
            return Err(ShopError::Unauthenticated);
        }

        self.store
            .find_user_by_id(&session.user_id)
            .await?
            .ok_or_else(|| {
                debug!("Session points at missing user {}", session.user_id);
                ShopError::Unauthenticated
            })
    }

    /// Authenticate a request from its cookie or bearer header
    pub async fn require_auth(&self, source: &TokenSource) -> ShopResult<User> {
        let token = source.token().ok_or(ShopError::Unauthenticated)?;
        self.resolve(token).await
    }

    /// Delete a session; unknown tokens are ignored
    #[instrument(skip(self, token))]
    pub async fn revoke(&self, token: &str) -> ShopResult<()> {
        self.store.delete_session(token).await
    }

    /// Remove every expired session
    pub async fn purge_expired(&self) -> ShopResult<u64> {
        let removed = self
            .store
            .delete_sessions_expired_before(Utc::now())
            .await?;
        if removed > 0 {
            info!("Purged {} expired sessions", removed);
        }
        Ok(removed)
    }

    /// Exchange a one-time identity-provider session id for a user and a
    /// fresh session. First-time users are created, looked up by email.
    #[instrument(skip(self, identity, session_id))]
    pub async fn login(
        &self,
        identity: &dyn IdentityProvider,
        session_id: &str,
    ) -> ShopResult<(User, Session)> {
        if session_id.trim().is_empty() {
            return Err(ShopError::Validation("Session ID required".to_string()));
        }

        let profile = identity.exchange(session_id).await?;

        let user = match self.store.find_user_by_email(&profile.email).await? {
            Some(existing) => existing,
            None => {
                let user = profile.to_user();
                self.store.insert_user(&user).await?;
                info!("Created user {} ({})", user.id, user.email);
                user
            }
        };

        let session = self
            .issue_session(&user.id, &profile.session_token, session_ttl())
            .await?;

        Ok((user, session))
    }
}
