//! # Order Types
//!
//! Orders placed through the storefront checkout, their line items and the
//! partial updates applied by the admin and the payment callback.

use crate::error::{ShopError, ShopResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix of every customer-facing order number
pub const ORDER_NUMBER_PREFIX: &str = "ORD-";

/// Generate a short, unguessable order number such as `ORD-9F1C04A7B2E3`.
///
/// The 12 hex digits come from the first 6 bytes of a v4 UUID, which are
/// fully random. The number doubles as the customer's tracking credential.
pub fn generate_order_number() -> String {
    let id = Uuid::new_v4();
    format!(
        "{}{}",
        ORDER_NUMBER_PREFIX,
        hex::encode_upper(&id.as_bytes()[..6])
    )
}

/// How the customer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery
    Cod,
    /// Prepaid through the payment gateway
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Online => "online",
        }
    }
}

/// Payment state, driven only by gateway verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

/// Fulfilment state, driven by the admin.
///
/// The intended flow is processing → shipped → delivered, with cancelled
/// reachable from any non-terminal state. Transitions are not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// A line item in an order.
///
/// Snapshot of the product at checkout time; later catalog edits never
/// touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product ID
    pub product_id: String,

    /// Product name (denormalized for display)
    pub product_name: String,

    /// Quantity
    pub quantity: u32,

    /// Unit price in rupees (`price` is accepted from older clients)
    #[serde(alias = "price")]
    pub unit_price: f64,
}

impl LineItem {
    /// Calculate the total price for this line item
    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }

    fn validate(&self, index: usize) -> ShopResult<()> {
        if self.product_id.trim().is_empty() {
            return Err(ShopError::Validation(format!(
                "items[{index}].product_id must not be empty"
            )));
        }
        if self.product_name.trim().is_empty() {
            return Err(ShopError::Validation(format!(
                "items[{index}].product_name must not be empty"
            )));
        }
        if self.quantity == 0 {
            return Err(ShopError::Validation(format!(
                "items[{index}].quantity must be at least 1"
            )));
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(ShopError::Validation(format!(
                "items[{index}].unit_price must not be negative"
            )));
        }
        Ok(())
    }
}

/// Checkout payload sent by the storefront
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderInput {
    pub customer_name: String,
    pub customer_email: String,
    pub phone: String,
    pub shipping_address: String,
    pub items: Vec<LineItem>,
    pub total_amount: f64,
    pub payment_method: PaymentMethod,
}

impl OrderInput {
    /// Check required fields and line items
    pub fn validate(&self) -> ShopResult<()> {
        let required = [
            ("customer_name", &self.customer_name),
            ("customer_email", &self.customer_email),
            ("phone", &self.phone),
            ("shipping_address", &self.shipping_address),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ShopError::Validation(format!("{field} must not be empty")));
            }
        }
        if !self.customer_email.contains('@') {
            return Err(ShopError::Validation(
                "customer_email is not an email address".to_string(),
            ));
        }
        if self.items.is_empty() {
            return Err(ShopError::Validation("order has no items".to_string()));
        }
        for (index, item) in self.items.iter().enumerate() {
            item.validate(index)?;
        }
        if !self.total_amount.is_finite() || self.total_amount < 0.0 {
            return Err(ShopError::Validation(
                "total_amount must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// A placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Internal order ID (UUID v4)
    pub id: String,

    /// Customer-facing tracking number
    pub order_number: String,

    pub customer_name: String,
    pub customer_email: String,
    pub phone: String,
    pub shipping_address: String,

    /// Line items
    pub items: Vec<LineItem>,

    /// Total as charged, in rupees
    pub total_amount: f64,

    pub payment_method: PaymentMethod,

    #[serde(default)]
    pub payment_status: PaymentStatus,

    /// Gateway order id, set once payment verifies
    #[serde(default)]
    pub razorpay_order_id: Option<String>,

    /// Gateway payment id, set once payment verifies
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,

    #[serde(default)]
    pub order_status: OrderStatus,

    /// Courier tracking URL
    #[serde(default)]
    pub tracking_link: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order with generated ID and number.
    ///
    /// Status fields always start at pending / processing.
    pub fn from_input(input: OrderInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            order_number: generate_order_number(),
            customer_name: input.customer_name,
            customer_email: input.customer_email,
            phone: input.phone,
            shipping_address: input.shipping_address,
            items: input.items,
            total_amount: input.total_amount,
            payment_method: input.payment_method,
            payment_status: PaymentStatus::Pending,
            razorpay_order_id: None,
            razorpay_payment_id: None,
            order_status: OrderStatus::Processing,
            tracking_link: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of line-item subtotals
    pub fn items_total(&self) -> f64 {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Get item count
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Partial update of an order.
///
/// Only `Some` fields are written; `updated_at` is always written.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPatch {
    pub order_status: Option<OrderStatus>,
    pub tracking_link: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl OrderPatch {
    fn empty() -> Self {
        Self {
            order_status: None,
            tracking_link: None,
            payment_status: None,
            razorpay_order_id: None,
            razorpay_payment_id: None,
            updated_at: Utc::now(),
        }
    }

    /// Admin status change. An empty tracking link leaves the stored one alone.
    pub fn status(order_status: OrderStatus, tracking_link: Option<String>) -> Self {
        Self {
            order_status: Some(order_status),
            tracking_link: tracking_link.filter(|link| !link.trim().is_empty()),
            ..Self::empty()
        }
    }

    /// Verified payment
    pub fn payment_completed(
        gateway_order_id: impl Into<String>,
        gateway_payment_id: impl Into<String>,
    ) -> Self {
        Self {
            payment_status: Some(PaymentStatus::Completed),
            razorpay_order_id: Some(gateway_order_id.into()),
            razorpay_payment_id: Some(gateway_payment_id.into()),
            ..Self::empty()
        }
    }

    /// Rejected payment
    pub fn payment_failed() -> Self {
        Self {
            payment_status: Some(PaymentStatus::Failed),
            ..Self::empty()
        }
    }

    /// Apply this patch to an in-memory order
    pub fn apply(&self, order: &mut Order) {
        if let Some(status) = self.order_status {
            order.order_status = status;
        }
        if let Some(link) = &self.tracking_link {
            order.tracking_link = Some(link.clone());
        }
        if let Some(status) = self.payment_status {
            order.payment_status = status;
        }
        if let Some(id) = &self.razorpay_order_id {
            order.razorpay_order_id = Some(id.clone());
        }
        if let Some(id) = &self.razorpay_payment_id {
            order.razorpay_payment_id = Some(id.clone());
        }
        order.updated_at = self.updated_at;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_input() -> OrderInput {
        OrderInput {
            customer_name: "Asha Rao".to_string(),
            customer_email: "asha@example.com".to_string(),
            phone: "+91 98450 00000".to_string(),
            shipping_address: "12 MG Road, Bengaluru".to_string(),
            items: vec![
                LineItem {
                    product_id: "p1".to_string(),
                    product_name: "Silver Anklet".to_string(),
                    quantity: 2,
                    unit_price: 850.0,
                },
                LineItem {
                    product_id: "p2".to_string(),
                    product_name: "Teak Coaster Set".to_string(),
                    quantity: 1,
                    unit_price: 499.5,
                },
            ],
            total_amount: 2199.5,
            payment_method: PaymentMethod::Online,
        }
    }

    fn is_order_number(value: &str) -> bool {
        value.len() == 16
            && value.starts_with(ORDER_NUMBER_PREFIX)
            && value[4..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
    }

    #[test]
    fn test_order_number_format() {
        for _ in 0..50 {
            let number = generate_order_number();
            assert!(is_order_number(&number), "bad order number {number}");
        }
        assert_ne!(generate_order_number(), generate_order_number());
    }

    #[test]
    fn test_new_order_defaults() {
        let order = Order::from_input(sample_input());

        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.order_status, OrderStatus::Processing);
        assert!(order.tracking_link.is_none());
        assert_eq!(order.created_at, order.updated_at);
        assert_eq!(order.item_count(), 3);
        assert!((order.items_total() - 2199.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_line_item_price_alias() {
        let item: LineItem = serde_json::from_str(
            r#"{"product_id":"p1","product_name":"Ring","quantity":2,"price":100.0}"#,
        )
        .unwrap();
        assert_eq!(item.unit_price, 100.0);
        assert_eq!(item.subtotal(), 200.0);
    }

    #[test]
    fn test_validate_order_input() {
        assert!(sample_input().validate().is_ok());

        let mut no_items = sample_input();
        no_items.items.clear();
        assert!(matches!(no_items.validate(), Err(ShopError::Validation(_))));

        let mut zero_qty = sample_input();
        zero_qty.items[0].quantity = 0;
        assert!(zero_qty.validate().is_err());

        let mut bad_email = sample_input();
        bad_email.customer_email = "asha".to_string();
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_status_patch_ignores_empty_tracking_link() {
        let mut order = Order::from_input(sample_input());
        order.tracking_link = Some("https://track.example/1".to_string());

        OrderPatch::status(OrderStatus::Shipped, Some(String::new())).apply(&mut order);
        assert_eq!(order.order_status, OrderStatus::Shipped);
        assert_eq!(
            order.tracking_link.as_deref(),
            Some("https://track.example/1")
        );

        OrderPatch::status(OrderStatus::Delivered, Some("https://track.example/2".into()))
            .apply(&mut order);
        assert_eq!(
            order.tracking_link.as_deref(),
            Some("https://track.example/2")
        );
    }

    #[test]
    fn test_payment_patches() {
        let mut order = Order::from_input(sample_input());

        OrderPatch::payment_failed().apply(&mut order);
        assert_eq!(order.payment_status, PaymentStatus::Failed);
        assert!(order.razorpay_payment_id.is_none());

        OrderPatch::payment_completed("order_abc", "pay_xyz").apply(&mut order);
        assert_eq!(order.payment_status, PaymentStatus::Completed);
        assert_eq!(order.razorpay_order_id.as_deref(), Some("order_abc"));
        assert_eq!(order.razorpay_payment_id.as_deref(), Some("pay_xyz"));
    }
}
