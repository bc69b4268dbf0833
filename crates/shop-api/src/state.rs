//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the storefront services and the configuration they were built from.

use crate::identity::{HttpIdentityProvider, DEFAULT_IDENTITY_SESSION_URL};
use crate::mailer::SmtpNotifier;
use crate::uploads::DiskAssetStore;
use anyhow::Context;
use shop_core::{
    BoxedAssetStore, BoxedNotifier, BoxedPaymentGateway, BoxedStore, Catalog, IdentityProvider,
    OrderBook, PaymentBridge, SessionService,
};
use shop_razorpay::{RazorpayConfig, RazorpayGateway};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// SMTP relay used for owner notifications
#[derive(Debug, Clone, PartialEq)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Recipient of order notifications
    pub owner_email: String,
}

impl SmtpConfig {
    /// Relay credentials and recipient are all present
    pub fn is_configured(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty() && !self.owner_email.is_empty()
    }
}

/// Allowed CORS origins
#[derive(Debug, Clone, PartialEq)]
pub enum CorsOrigins {
    /// `*`: any origin, reflected back with credentials allowed
    Any,
    /// Explicit allow-list, credentials allowed
    List(Vec<String>),
}

impl CorsOrigins {
    fn parse(value: &str) -> Self {
        let origins: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            CorsOrigins::Any
        } else {
            CorsOrigins::List(origins)
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// MongoDB connection string
    pub mongo_url: String,
    /// MongoDB database name
    pub db_name: String,
    pub cors_origins: CorsOrigins,
    /// Directory product images are written to and served from
    pub upload_dir: PathBuf,
    /// Identity provider session-data endpoint
    pub identity_session_url: String,
    pub smtp: SmtpConfig,
    /// Razorpay credentials; empty keys leave online payments disabled
    pub razorpay: RazorpayConfig,
    /// Emit JSON logs
    pub json_logs: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{} must be set", key))
        };

        let port = var("PORT", "8001")
            .parse::<u16>()
            .context("PORT must be a port number")?;
        let smtp_port = var("SMTP_PORT", "587")
            .parse::<u16>()
            .context("SMTP_PORT must be a port number")?;
        let razorpay = RazorpayConfig::from_lookup(&lookup)
            .map_err(|e| anyhow::anyhow!("Invalid Razorpay settings: {}", e))?;

        Ok(Self {
            host: var("HOST", "127.0.0.1"),
            port,
            environment: var("ENVIRONMENT", "development"),
            mongo_url: required("MONGO_URL")?,
            db_name: required("DB_NAME")?,
            cors_origins: CorsOrigins::parse(&var("CORS_ORIGINS", "*")),
            upload_dir: PathBuf::from(var("UPLOAD_DIR", "uploads")),
            identity_session_url: var("IDENTITY_SESSION_URL", DEFAULT_IDENTITY_SESSION_URL),
            smtp: SmtpConfig {
                server: var("SMTP_SERVER", "smtp.gmail.com"),
                port: smtp_port,
                user: var("SMTP_USER", ""),
                password: var("SMTP_PASSWORD", ""),
                owner_email: var("OWNER_EMAIL", ""),
            },
            razorpay,
            json_logs: var("LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionService,
    pub catalog: Catalog,
    pub orders: OrderBook,
    pub payments: PaymentBridge,
    /// Identity provider for the login exchange
    pub identity: Arc<dyn IdentityProvider>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Wire the services around explicit collaborators
    pub fn new(
        config: AppConfig,
        store: BoxedStore,
        gateway: BoxedPaymentGateway,
        notifier: BoxedNotifier,
        identity: Arc<dyn IdentityProvider>,
        assets: BoxedAssetStore,
    ) -> Self {
        Self {
            sessions: SessionService::new(store.clone()),
            catalog: Catalog::new(store.clone(), assets),
            orders: OrderBook::new(store.clone(), notifier),
            payments: PaymentBridge::new(store, gateway),
            identity,
            config,
        }
    }

    /// Build the production collaborators from `config` around `store`
    pub async fn from_config(config: AppConfig, store: BoxedStore) -> anyhow::Result<Self> {
        let assets = DiskAssetStore::new(&config.upload_dir);
        assets
            .ensure_dir()
            .await
            .context("Failed to create upload directory")?;

        let gateway = RazorpayGateway::new(config.razorpay.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize Razorpay: {}", e))?;

        let notifier = SmtpNotifier::from_config(&config.smtp)
            .map_err(|e| anyhow::anyhow!("Failed to initialize mailer: {}", e))?;

        let identity = HttpIdentityProvider::new(&config.identity_session_url)
            .map_err(|e| anyhow::anyhow!("Failed to initialize identity client: {}", e))?;

        Ok(Self::new(
            config,
            store,
            Arc::new(gateway),
            notifier,
            Arc::new(identity),
            Arc::new(assets),
        ))
    }
}
