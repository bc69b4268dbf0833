//! # Razorpay Orders
//!
//! `PaymentGateway` backed by the Razorpay Orders API. The storefront's
//! checkout widget is opened with the returned order id, and the widget's
//! callback is checked with the key secret.

use crate::config::RazorpayConfig;
use crate::signature::verify_payment_signature;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shop_core::{
    GatewayOrder, IntentRequest, PaymentGateway, PaymentProof, ShopError, ShopResult,
};
use tracing::{debug, error, info, instrument, warn};

/// Message reported when a checkout signature does not match
pub const SIGNATURE_MISMATCH: &str = "Razorpay Signature Verification Failed";

const PROVIDER: &str = "razorpay";

/// Razorpay payment gateway
pub struct RazorpayGateway {
    config: RazorpayConfig,
    client: Client,
}

impl RazorpayGateway {
    /// Create a new gateway
    pub fn new(config: RazorpayConfig) -> ShopResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ShopError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        if !config.is_configured() {
            warn!("RAZORPAY_KEY_ID / RAZORPAY_KEY_SECRET not set; online payments will fail");
        } else if config.is_test_mode() {
            info!("Razorpay gateway using test keys");
        } else {
            info!("Razorpay gateway using live keys");
        }

        Ok(Self { config, client })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    #[instrument(skip(self, request), fields(amount = request.amount))]
    async fn create_order(&self, request: &IntentRequest) -> ShopResult<GatewayOrder> {
        if !self.config.is_configured() {
            return Err(ShopError::PaymentGateway {
                message: "Razorpay credentials are not configured".to_string(),
            });
        }

        let body = RazorpayOrderRequest {
            amount: request.amount,
            currency: &request.currency,
            payment_capture: u8::from(request.payment_capture),
        };

        debug!(
            "Creating Razorpay order: {} {}",
            request.amount, request.currency
        );

        let url = format!("{}/v1/orders", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| ShopError::PaymentGateway {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ShopError::PaymentGateway {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            error!("Razorpay API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<RazorpayErrorResponse>(&body) {
                return Err(ShopError::PaymentGateway {
                    message: error_response.error.description,
                });
            }

            return Err(ShopError::PaymentGateway {
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let order: GatewayOrder = serde_json::from_str(&body).map_err(|e| {
            ShopError::PaymentGateway {
                message: format!("Failed to parse Razorpay response: {}", e),
            }
        })?;

        info!("Created Razorpay order: id={}", order.id);
        Ok(order)
    }

    #[instrument(skip(self, proof), fields(razorpay_order_id = %proof.razorpay_order_id))]
    async fn verify_payment_signature(&self, proof: &PaymentProof) -> ShopResult<()> {
        if self.config.key_secret.is_empty() {
            warn!("Cannot verify payment without RAZORPAY_KEY_SECRET");
            return Err(ShopError::PaymentVerification(SIGNATURE_MISMATCH.to_string()));
        }

        if verify_payment_signature(
            &self.config.key_secret,
            &proof.razorpay_order_id,
            &proof.razorpay_payment_id,
            &proof.razorpay_signature,
        ) {
            debug!("Verified signature for payment {}", proof.razorpay_payment_id);
            Ok(())
        } else {
            Err(ShopError::PaymentVerification(SIGNATURE_MISMATCH.to_string()))
        }
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Razorpay API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct RazorpayOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    payment_capture: u8,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorResponse {
    error: RazorpayError,
}

#[derive(Debug, Deserialize)]
struct RazorpayError {
    description: String,
    #[serde(default)]
    #[allow(dead_code)]
    code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::payment_signature;
    use serde_json::json;
    use wiremock::matchers::{basic_auth, body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn intent(amount: i64) -> IntentRequest {
        IntentRequest {
            amount,
            currency: "INR".to_string(),
            payment_capture: true,
        }
    }

    fn gateway(server: &MockServer) -> RazorpayGateway {
        let config =
            RazorpayConfig::new("rzp_test_key", "rzp_secret").with_api_base_url(server.uri());
        RazorpayGateway::new(config).unwrap()
    }

    fn proof(signature: &str) -> PaymentProof {
        PaymentProof {
            order_id: "our-order".to_string(),
            razorpay_order_id: "order_123".to_string(),
            razorpay_payment_id: "pay_456".to_string(),
            razorpay_signature: signature.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_order_posts_to_orders_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .and(basic_auth("rzp_test_key", "rzp_secret"))
            .and(body_json(json!({
                "amount": 129950,
                "currency": "INR",
                "payment_capture": 1
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "order_EKwxwAgItmmXdp",
                "entity": "order",
                "amount": 129950,
                "currency": "INR",
                "status": "created",
                "attempts": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let order = gateway(&server).create_order(&intent(129950)).await.unwrap();

        assert_eq!(order.id, "order_EKwxwAgItmmXdp");
        assert_eq!(order.amount, 129950);
        assert_eq!(order.status.as_deref(), Some("created"));
        assert_eq!(order.extra.get("entity"), Some(&json!("order")));
    }

    #[tokio::test]
    async fn test_create_order_surfaces_gateway_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": "BAD_REQUEST_ERROR",
                    "description": "The amount must be atleast INR 1.00"
                }
            })))
            .mount(&server)
            .await;

        let err = gateway(&server).create_order(&intent(10)).await.unwrap_err();
        match err {
            ShopError::PaymentGateway { message } => {
                assert_eq!(message, "The amount must be atleast INR 1.00")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_order_with_unparseable_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = gateway(&server).create_order(&intent(100)).await.unwrap_err();
        assert!(matches!(err, ShopError::PaymentGateway { ref message } if message.contains("upstream down")));
    }

    #[tokio::test]
    async fn test_create_order_requires_credentials() {
        let gateway = RazorpayGateway::new(RazorpayConfig::new("", "")).unwrap();
        let err = gateway.create_order(&intent(100)).await.unwrap_err();
        assert!(matches!(err, ShopError::PaymentGateway { .. }));
    }

    #[tokio::test]
    async fn test_verify_payment_signature() {
        let gateway = RazorpayGateway::new(RazorpayConfig::new("rzp_test_key", "rzp_secret")).unwrap();

        let good = payment_signature("rzp_secret", "order_123", "pay_456");
        assert!(gateway.verify_payment_signature(&proof(&good)).await.is_ok());

        let err = gateway
            .verify_payment_signature(&proof("not-a-signature"))
            .await
            .unwrap_err();
        match err {
            ShopError::PaymentVerification(reason) => assert_eq!(reason, SIGNATURE_MISMATCH),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_provider_name() {
        let gateway = RazorpayGateway::new(RazorpayConfig::new("", "")).unwrap();
        assert_eq!(gateway.provider_name(), "razorpay");
    }
}
