//! # Artisan Storefront
//!
//! Backend for a small handmade-goods shop: catalog, checkout, order
//! tracking and Razorpay payments.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export MONGO_URL=mongodb://localhost:27017
//! export DB_NAME=storefront
//! export RAZORPAY_KEY_ID=rzp_test_...
//! export RAZORPAY_KEY_SECRET=...
//!
//! # Run the server
//! storefront
//! ```

use shop_api::{routes, AppConfig, AppState, MongoStore};
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    if config.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Print banner
    print_banner();

    let store = MongoStore::connect(&config.mongo_url, &config.db_name)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to MongoDB: {}", e))?;

    // Initialize application state
    let state = AppState::from_config(config, Arc::new(store.clone())).await?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Uploads: {}", state.config.upload_dir.display());

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("🛍️  Storefront starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: http://{}/api/", addr);
        info!("🛒 Checkout: POST http://{}/api/orders", addr);
        info!("💳 Payment: POST http://{}/api/payment/create-order", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.shutdown().await;
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

fn print_banner() {
    println!(
        r#"
  🛍️  Artisan Storefront
  ━━━━━━━━━━━━━━━━━━━━━━━
  Jewellery & woodwork shop backend
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
