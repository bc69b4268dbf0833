//! # Order Lifecycle
//!
//! Order placement, tracking and admin status updates.

use crate::error::{ShopError, ShopResult};
use crate::order::{Order, OrderInput, OrderPatch, OrderStatus};
use crate::store::{BoxedStore, LIST_LIMIT};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Owner-notification channel for new orders.
///
/// Delivery is best effort: `OrderBook` logs and discards any error.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn order_placed(&self, order: &Order) -> ShopResult<()>;
}

/// Type alias for a shared notifier
pub type BoxedNotifier = Arc<dyn OrderNotifier>;

/// Notifier used when no delivery channel is configured
pub struct DisabledNotifier;

#[async_trait]
impl OrderNotifier for DisabledNotifier {
    async fn order_placed(&self, order: &Order) -> ShopResult<()> {
        warn!(
            "Order notifications not configured, skipping {}",
            order.order_number
        );
        Ok(())
    }
}

/// Order lifecycle service
#[derive(Clone)]
pub struct OrderBook {
    store: BoxedStore,
    notifier: BoxedNotifier,
}

impl OrderBook {
    pub fn new(store: BoxedStore, notifier: BoxedNotifier) -> Self {
        Self { store, notifier }
    }

    /// Place an order, then notify the owner.
    ///
    /// The order is persisted before notification; a notification failure is
    /// logged and never fails the call.
    #[instrument(skip(self, input), fields(items = input.items.len()))]
    pub async fn create(&self, input: OrderInput) -> ShopResult<Order> {
        input.validate()?;
        let order = Order::from_input(input);
        self.store.insert_order(&order).await?;

        info!(
            "Order {} placed: {} items, total={}, payment={}",
            order.order_number,
            order.item_count(),
            order.total_amount,
            order.payment_method.as_str()
        );

        let items_total = order.items_total();
        if (items_total - order.total_amount).abs() >= 0.01 {
            warn!(
                "Order {} total {} differs from its item sum {}",
                order.order_number, order.total_amount, items_total
            );
        }

        if let Err(e) = self.notifier.order_placed(&order).await {
            warn!(
                "Owner notification for {} failed: {}",
                order.order_number, e
            );
        }

        Ok(order)
    }

    /// Customer-facing lookup by order number
    pub async fn get_by_number(&self, order_number: &str) -> ShopResult<Order> {
        self.store
            .find_order_by_number(order_number)
            .await?
            .ok_or_else(|| ShopError::not_found("Order"))
    }

    /// All orders, newest first
    pub async fn list_all(&self) -> ShopResult<Vec<Order>> {
        self.store.list_orders(LIST_LIMIT).await
    }

    /// Admin status change. Any status is accepted from any other status;
    /// an empty tracking link keeps the stored one.
    #[instrument(skip(self, tracking_link))]
    pub async fn set_status(
        &self,
        id: &str,
        order_status: OrderStatus,
        tracking_link: Option<String>,
    ) -> ShopResult<()> {
        let patch = OrderPatch::status(order_status, tracking_link);
        if !self.store.update_order(id, &patch).await? {
            return Err(ShopError::not_found("Order"));
        }

        info!("Order {} is now {}", id, order_status.as_str());
        Ok(())
    }
}
