//! # Request Handlers
//!
//! Axum request handlers for the storefront API.
//! Admin-only handlers take a [`RequireAuth`] extractor; the rest are public.

use crate::auth::{session_clear_cookie, session_cookie, session_set_cookie, RequireAuth};
use crate::identity::SESSION_ID_HEADER;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use shop_core::{
    Category, GatewayOrder, Order, OrderInput, OrderStatus, PaymentProof, Product, ProductInput,
    ShopError, Upload, User,
};
use tracing::{error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Plain acknowledgement body
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// Login response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub session_token: String,
}

/// Product list filter
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    #[serde(default)]
    pub category: Option<String>,
}

/// Upload response
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub urls: Vec<String>,
}

/// Admin status change
#[derive(Debug, Deserialize)]
pub struct OrderStatusUpdate {
    pub order_status: OrderStatus,
    #[serde(default)]
    pub tracking_link: Option<String>,
}

/// Gateway order request
#[derive(Debug, Deserialize)]
pub struct CreateIntentQuery {
    pub amount: f64,
}

/// Payment verification result
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub status: String,
}

/// Multipart field carrying product images
pub const UPLOAD_FIELD: &str = "files";

pub fn shop_error_to_response(err: ShopError) -> ApiError {
    let code = err.status_code();
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let response = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {}", err);
        ErrorResponse::new("Internal server error", code)
    } else {
        if err.is_server_error() {
            error!("Upstream failure: {}", err);
        }
        ErrorResponse::new(err.to_string(), code)
    };

    (status, Json(response))
}

fn bad_request(error: impl Into<String>, details: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(error, 400).with_details(details)),
    )
}

/// Unwrap a JSON body, reporting malformed payloads as 400
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| bad_request("Invalid request body", rejection.body_text()))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Artisan Storefront API",
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// --- auth --------------------------------------------------------------------

/// Exchange an identity-provider session id for a storefront session
#[instrument(skip(state, headers))]
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = headers
        .get(SESSION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Session ID required", 400)),
            )
        })?;

    let (user, session) = state
        .sessions
        .login(state.identity.as_ref(), session_id)
        .await
        .map_err(shop_error_to_response)?;

    info!("User {} logged in", user.email);

    let cookie = session_set_cookie(&session.session_token);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse {
            user,
            session_token: session.session_token,
        }),
    ))
}

/// Current user
pub async fn me(RequireAuth(user): RequireAuth) -> Json<User> {
    Json(user)
}

/// Revoke the cookie session and clear the cookie
#[instrument(skip(state, headers))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = session_cookie(&headers).filter(|t| !t.is_empty()) {
        state
            .sessions
            .revoke(&token)
            .await
            .map_err(shop_error_to_response)?;
    }

    Ok((
        [(header::SET_COOKIE, session_clear_cookie())],
        MessageResponse::new("Logged out"),
    ))
}

// --- products ----------------------------------------------------------------

#[instrument(skip(state, _user, body))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let input = json_body(body)?;
    let product = state
        .catalog
        .create(input)
        .await
        .map_err(shop_error_to_response)?;
    Ok(Json(product))
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let category = query
        .category
        .filter(|c| !c.is_empty())
        .map(Category::from);
    let products = state
        .catalog
        .list(category.as_ref())
        .await
        .map_err(shop_error_to_response)?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    state
        .catalog
        .get(&product_id)
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

pub async fn get_product_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Product>, ApiError> {
    state
        .catalog
        .get_by_slug(&slug)
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

#[instrument(skip(state, _user, body))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(product_id): Path<String>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let input = json_body(body)?;
    state
        .catalog
        .update(&product_id, input)
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

#[instrument(skip(state, _user))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(product_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .catalog
        .delete(&product_id)
        .await
        .map_err(shop_error_to_response)?;
    Ok(MessageResponse::new("Product deleted"))
}

/// Store every `files` part and append the URLs to the product
#[instrument(skip(state, _user, multipart))]
pub async fn upload_product_images(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(product_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request("Invalid multipart body", e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request("Invalid multipart body", e.body_text()))?;
        uploads.push(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    let urls = state
        .catalog
        .attach_images(&product_id, uploads)
        .await
        .map_err(shop_error_to_response)?;
    Ok(Json(UploadResponse { urls }))
}

// --- orders ------------------------------------------------------------------

#[instrument(skip(state, body))]
pub async fn create_order(
    State(state): State<AppState>,
    body: Result<Json<OrderInput>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    let input = json_body(body)?;
    state
        .orders
        .create(input)
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

pub async fn get_order_by_number(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<Order>, ApiError> {
    state
        .orders
        .get_by_number(&order_number)
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

pub async fn list_orders(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<Json<Vec<Order>>, ApiError> {
    state
        .orders
        .list_all()
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

#[instrument(skip(state, _user, body))]
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(order_id): Path<String>,
    body: Result<Json<OrderStatusUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let update = json_body(body)?;
    state
        .orders
        .set_status(&order_id, update.order_status, update.tracking_link)
        .await
        .map_err(shop_error_to_response)?;
    Ok(MessageResponse::new("Order updated"))
}

// --- payment -----------------------------------------------------------------

/// Create a gateway order for `amount` rupees
#[instrument(skip(state))]
pub async fn create_payment_order(
    State(state): State<AppState>,
    Query(query): Query<CreateIntentQuery>,
) -> Result<Json<GatewayOrder>, ApiError> {
    state
        .payments
        .create_intent(query.amount)
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

/// Verify a checkout callback and record the outcome on the order
#[instrument(skip(state, body))]
pub async fn verify_payment(
    State(state): State<AppState>,
    body: Result<Json<PaymentProof>, JsonRejection>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let proof = json_body(body)?;
    state
        .payments
        .verify(&proof)
        .await
        .map_err(shop_error_to_response)?;
    Ok(Json(VerifyResponse {
        status: "success".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400).with_details("field x");
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
        assert_eq!(err.details.as_deref(), Some("field x"));
    }

    #[test]
    fn test_shop_error_conversion() {
        let (status, _json) = shop_error_to_response(ShopError::Validation("Bad data".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _json) = shop_error_to_response(ShopError::Unauthenticated);
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, Json(body)) = shop_error_to_response(ShopError::PaymentGateway {
            message: "Authentication failed".into(),
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.error.contains("Authentication failed"));
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let (status, Json(body)) =
            shop_error_to_response(ShopError::Store("connection refused to 10.0.0.5".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
    }
}
