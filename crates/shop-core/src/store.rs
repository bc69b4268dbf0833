//! # Document Store Trait
//!
//! The storefront treats its database as a black-box document store with
//! four collections: `users`, `user_sessions`, `products` and `orders`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Store (trait)                        │
//! │  ├── users          find_user_by_id / _by_email, insert     │
//! │  ├── user_sessions  find / insert / delete / purge          │
//! │  ├── products       CRUD, slug lookup, image list           │
//! │  └── orders         insert, lookup, list, patch             │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!               ┌────────────┴────────────┐
//!       ┌───────┴───────┐         ┌───────┴───────┐
//!       │  MongoStore   │         │  MemoryStore  │
//!       │  (shop-api)   │         │  (tests/dev)  │
//!       └───────────────┘         └───────────────┘
//! ```
//!
//! Every method is a single store round trip. Nothing here is transactional;
//! callers must tolerate a crash between two calls.

use crate::error::ShopResult;
use crate::order::{Order, OrderPatch};
use crate::product::{Category, Product};
use crate::session::Session;
use crate::user::User;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Safety cap on list queries
pub const LIST_LIMIT: usize = 1000;

/// Collection names shared by every implementation
pub mod collections {
    pub const USERS: &str = "users";
    pub const SESSIONS: &str = "user_sessions";
    pub const PRODUCTS: &str = "products";
    pub const ORDERS: &str = "orders";
}

/// Core persistence trait.
///
/// Update and delete methods report whether a record matched so services can
/// raise `NotFound` without a separate read.
#[async_trait]
pub trait Store: Send + Sync {
    // --- users -----------------------------------------------------------

    async fn find_user_by_id(&self, id: &str) -> ShopResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> ShopResult<Option<User>>;

    async fn insert_user(&self, user: &User) -> ShopResult<()>;

    // --- sessions --------------------------------------------------------

    async fn insert_session(&self, session: &Session) -> ShopResult<()>;

    async fn find_session(&self, token: &str) -> ShopResult<Option<Session>>;

    /// Delete by token; absent tokens are not an error
    async fn delete_session(&self, token: &str) -> ShopResult<()>;

    /// Delete every session that expired before `now`, returning the count
    async fn delete_sessions_expired_before(&self, now: DateTime<Utc>) -> ShopResult<u64>;

    // --- products --------------------------------------------------------

    async fn insert_product(&self, product: &Product) -> ShopResult<()>;

    async fn find_product(&self, id: &str) -> ShopResult<Option<Product>>;

    /// First product with this slug, in storage order
    async fn find_product_by_slug(&self, slug: &str) -> ShopResult<Option<Product>>;

    /// Products in storage order, optionally filtered by exact category
    async fn list_products(
        &self,
        category: Option<&Category>,
        limit: usize,
    ) -> ShopResult<Vec<Product>>;

    /// Overwrite the stored product with the same id
    async fn replace_product(&self, product: &Product) -> ShopResult<bool>;

    /// Overwrite only the image list
    async fn set_product_images(&self, id: &str, images: &[String]) -> ShopResult<bool>;

    async fn delete_product(&self, id: &str) -> ShopResult<bool>;

    // --- orders ----------------------------------------------------------

    async fn insert_order(&self, order: &Order) -> ShopResult<()>;

    async fn find_order_by_number(&self, order_number: &str) -> ShopResult<Option<Order>>;

    /// Newest first
    async fn list_orders(&self, limit: usize) -> ShopResult<Vec<Order>>;

    async fn update_order(&self, id: &str, patch: &OrderPatch) -> ShopResult<bool>;
}

/// Type alias for a shared store (dynamic dispatch)
pub type BoxedStore = Arc<dyn Store>;
