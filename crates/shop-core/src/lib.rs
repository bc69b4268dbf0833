//! # shop-core
//!
//! Core types, traits and services for the artisan storefront.
//!
//! This crate provides:
//! - `User`, `Session`, `Product` and `Order` records
//! - `Store` trait for the document store, plus `MemoryStore`
//! - `PaymentGateway`, `OrderNotifier`, `IdentityProvider` and `AssetStore`
//!   traits for the external collaborators
//! - `SessionService`, `Catalog`, `OrderBook` and `PaymentBridge` services
//! - `ShopError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{OrderBook, PaymentBridge, MemoryStore, DisabledNotifier};
//!
//! let store = Arc::new(MemoryStore::new());
//! let orders = OrderBook::new(store.clone(), Arc::new(DisabledNotifier));
//!
//! // Customer checkout
//! let order = orders.create(input).await?;
//!
//! // Online payment: create a gateway order, then verify the callback
//! let payments = PaymentBridge::new(store, gateway);
//! let intent = payments.create_intent(order.total_amount).await?;
//! payments.verify(&proof).await?;
//! ```

pub mod catalog;
pub mod error;
pub mod memory;
pub mod order;
pub mod order_book;
pub mod payment;
pub mod product;
pub mod session;
pub mod store;
pub mod user;

// Re-exports for convenience
pub use catalog::{asset_name, asset_url, AssetStore, BoxedAssetStore, Catalog, Upload, ASSET_URL_PREFIX};
pub use error::{ShopError, ShopResult};
pub use memory::MemoryStore;
pub use order::{
    generate_order_number, LineItem, Order, OrderInput, OrderPatch, OrderStatus, PaymentMethod,
    PaymentStatus, ORDER_NUMBER_PREFIX,
};
pub use order_book::{BoxedNotifier, DisabledNotifier, OrderBook, OrderNotifier};
pub use payment::{
    to_paise, BoxedPaymentGateway, GatewayOrder, IntentRequest, PaymentBridge, PaymentGateway,
    PaymentProof, CURRENCY,
};
pub use product::{slugify, Category, Product, ProductInput};
pub use session::{session_ttl, Session, SessionService, TokenSource, SESSION_COOKIE, SESSION_TTL_DAYS};
pub use store::{collections, BoxedStore, Store, LIST_LIMIT};
pub use user::{IdentityProfile, IdentityProvider, User};
