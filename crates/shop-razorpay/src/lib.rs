//! # shop-razorpay
//!
//! Razorpay payment gateway for the artisan storefront.
//!
//! Online checkout runs in two steps:
//!
//! 1. **Create** - a Razorpay order is created server-side for the cart
//!    total (in paise) and handed to the checkout widget.
//! 2. **Verify** - the widget returns `razorpay_order_id`,
//!    `razorpay_payment_id` and `razorpay_signature`; the signature is an
//!    HMAC-SHA256 of `order_id|payment_id` under the key secret.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_razorpay::{RazorpayConfig, RazorpayGateway};
//! use shop_core::PaymentBridge;
//!
//! let config = RazorpayConfig::from_lookup(|key| std::env::var(key).ok())?;
//! let gateway = Arc::new(RazorpayGateway::new(config)?);
//! let payments = PaymentBridge::new(store, gateway);
//!
//! let order = payments.create_intent(1299.50).await?;
//! // ... customer pays in the widget ...
//! payments.verify(&proof).await?;
//! ```

pub mod config;
pub mod gateway;
pub mod signature;

// Re-exports
pub use config::{RazorpayConfig, DEFAULT_API_BASE_URL};
pub use gateway::{RazorpayGateway, SIGNATURE_MISMATCH};
pub use signature::{payment_signature, verify_payment_signature};
