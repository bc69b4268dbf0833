//! # Routes
//!
//! Axum router configuration for the storefront API.

use crate::handlers;
use crate::state::{AppState, CorsOrigins};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use shop_core::ASSET_URL_PREFIX;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

/// Largest accepted multipart upload
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    match origins {
        // Credentialed requests cannot be answered with a literal `*`
        CorsOrigins::Any => CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
        CorsOrigins::List(list) => {
            let origins: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true)
        }
    }
}

/// Create the main application router
///
/// Routes (all JSON routes under `/api`):
/// - GET  /api/ - Health check
/// - Auth:
///   - POST /api/auth/session - Identity exchange, sets the session cookie
///   - GET  /api/auth/me - Current user
///   - POST /api/auth/logout - Revoke session, clear cookie
/// - Products:
///   - GET/POST /api/products
///   - GET/PUT/DELETE /api/products/{id}
///   - GET  /api/products/slug/{slug}
///   - POST /api/products/{id}/upload - Multipart `files`
/// - Orders:
///   - POST /api/orders
///   - GET  /api/orders/{order_number}
///   - GET  /api/admin/orders
///   - PUT  /api/admin/orders/{id}/status
/// - Payment:
///   - POST /api/payment/create-order?amount=
///   - POST /api/payment/verify
/// - Static:
///   - GET /uploads/* - Product images
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let uploads = ServeDir::new(&state.config.upload_dir);

    let auth_routes = Router::new()
        .route("/session", post(handlers::create_session))
        .route("/me", get(handlers::me))
        .route("/logout", post(handlers::logout));

    let admin_routes = Router::new()
        .route("/orders", get(handlers::list_orders))
        .route("/orders/{order_id}/status", put(handlers::update_order_status));

    let payment_routes = Router::new()
        .route("/create-order", post(handlers::create_payment_order))
        .route("/verify", post(handlers::verify_payment));

    let api_routes = Router::new()
        .route("/", get(handlers::health))
        // Products
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/products/slug/{slug}", get(handlers::get_product_by_slug))
        .route(
            "/products/{product_id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route(
            "/products/{product_id}/upload",
            post(handlers::upload_product_images).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // Orders
        .route("/orders", post(handlers::create_order))
        .route("/orders/{order_number}", get(handlers::get_order_by_number))
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .nest("/payment", payment_routes);

    Router::new()
        .route("/api/", get(handlers::health))
        .nest("/api", api_routes)
        .nest_service(ASSET_URL_PREFIX, uploads)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
