//! # Payment Bridge
//!
//! Gateway trait for payment providers and the bridge that ties gateway
//! results to order state.
//!
//! ```text
//!  checkout ──create_intent──▶ PaymentGateway::create_order ──▶ gateway order
//!  callback ──verify─────────▶ PaymentGateway::verify_payment_signature
//!                                   │ ok                  │ err
//!                                   ▼                     ▼
//!                       payment_status=completed   payment_status=failed
//!                       + gateway ids              then PaymentVerification
//! ```

use crate::error::{ShopError, ShopResult};
use crate::order::OrderPatch;
use crate::store::BoxedStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Currency every storefront payment is charged in
pub const CURRENCY: &str = "INR";

/// Convert a rupee amount to paise (smallest unit, no fractional paise).
///
/// Rounds to the nearest paisa rather than truncating: `19.99` is stored as
/// `19.989999...`, which truncation would charge as 1998 paise.
pub fn to_paise(amount: f64) -> ShopResult<i64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ShopError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok((amount * 100.0).round() as i64)
}

/// Request for a gateway-side payment order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentRequest {
    /// Amount in paise
    pub amount: i64,
    /// ISO 4217 code
    pub currency: String,
    /// Capture automatically once authorised
    pub payment_capture: bool,
}

/// Gateway-side payment order, passed back to the storefront's checkout
/// widget as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Remaining provider fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Payment callback data from the checkout widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentProof {
    /// Our order id
    pub order_id: String,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Core trait for payment gateway implementations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment order on the gateway.
    ///
    /// Failures are reported as `ShopError::PaymentGateway` carrying the
    /// gateway's own message.
    async fn create_order(&self, request: &IntentRequest) -> ShopResult<GatewayOrder>;

    /// Check the signature the gateway attached to a completed payment.
    async fn verify_payment_signature(&self, proof: &PaymentProof) -> ShopResult<()>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;

/// Creates payment intents and records verification outcomes on orders
#[derive(Clone)]
pub struct PaymentBridge {
    store: BoxedStore,
    gateway: BoxedPaymentGateway,
}

impl PaymentBridge {
    pub fn new(store: BoxedStore, gateway: BoxedPaymentGateway) -> Self {
        Self { store, gateway }
    }

    /// Create a capture-enabled gateway order for `amount` rupees
    #[instrument(skip(self), fields(provider = self.gateway.provider_name()))]
    pub async fn create_intent(&self, amount: f64) -> ShopResult<GatewayOrder> {
        let request = IntentRequest {
            amount: to_paise(amount)?,
            currency: CURRENCY.to_string(),
            payment_capture: true,
        };

        let order = self.gateway.create_order(&request).await.map_err(|e| match e {
            ShopError::PaymentGateway { .. } => e,
            other => ShopError::PaymentGateway {
                message: other.to_string(),
            },
        })?;

        info!("Created gateway order {} for {} paise", order.id, order.amount);
        Ok(order)
    }

    /// Verify a payment callback and record the outcome on the order.
    ///
    /// The order is written in both branches; a failed verification is
    /// reported only after `payment_status = failed` has been stored.
    #[instrument(
        skip(self, proof),
        fields(order_id = %proof.order_id, gateway_order = %proof.razorpay_order_id)
    )]
    pub async fn verify(&self, proof: &PaymentProof) -> ShopResult<()> {
        match self.gateway.verify_payment_signature(proof).await {
            Ok(()) => {
                let patch = OrderPatch::payment_completed(
                    &proof.razorpay_order_id,
                    &proof.razorpay_payment_id,
                );
                if !self.store.update_order(&proof.order_id, &patch).await? {
                    return Err(ShopError::not_found("Order"));
                }
                info!("Payment {} verified", proof.razorpay_payment_id);
                Ok(())
            }
            Err(err) => {
                let reason = match err {
                    ShopError::PaymentVerification(reason) => reason,
                    other => other.to_string(),
                };
                warn!("Payment verification failed: {}", reason);

                let matched = self
                    .store
                    .update_order(&proof.order_id, &OrderPatch::payment_failed())
                    .await?;
                if !matched {
                    warn!("No order {} to mark as failed", proof.order_id);
                }

                Err(ShopError::PaymentVerification(reason))
            }
        }
    }
}
