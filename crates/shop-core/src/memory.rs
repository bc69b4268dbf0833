//! # In-Memory Store
//!
//! A `Store` kept in process memory, used by the test suites of every crate.
//! Vectors preserve insertion order, which stands in for the document
//! store's natural order.

use crate::error::ShopResult;
use crate::order::{Order, OrderPatch};
use crate::product::{Category, Product};
use crate::session::Session;
use crate::store::Store;
use crate::user::User;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    sessions: Vec<Session>,
    products: Vec<Product>,
    orders: Vec<Order>,
}

/// Process-local document store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Collections> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Collections> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored sessions (all, including expired)
    pub fn session_count(&self) -> usize {
        self.read().sessions.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_id(&self, id: &str) -> ShopResult<Option<User>> {
        Ok(self.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> ShopResult<Option<User>> {
        Ok(self.read().users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &User) -> ShopResult<()> {
        self.write().users.push(user.clone());
        Ok(())
    }

    async fn insert_session(&self, session: &Session) -> ShopResult<()> {
        self.write().sessions.push(session.clone());
        Ok(())
    }

    async fn find_session(&self, token: &str) -> ShopResult<Option<Session>> {
        Ok(self
            .read()
            .sessions
            .iter()
            .find(|s| s.session_token == token)
            .cloned())
    }

    async fn delete_session(&self, token: &str) -> ShopResult<()> {
        let mut collections = self.write();
        if let Some(pos) = collections
            .sessions
            .iter()
            .position(|s| s.session_token == token)
        {
            collections.sessions.remove(pos);
        }
        Ok(())
    }

    async fn delete_sessions_expired_before(&self, now: DateTime<Utc>) -> ShopResult<u64> {
        let mut collections = self.write();
        let before = collections.sessions.len();
        collections.sessions.retain(|s| s.expires_at >= now);
        Ok((before - collections.sessions.len()) as u64)
    }

    async fn insert_product(&self, product: &Product) -> ShopResult<()> {
        self.write().products.push(product.clone());
        Ok(())
    }

    async fn find_product(&self, id: &str) -> ShopResult<Option<Product>> {
        Ok(self.read().products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_product_by_slug(&self, slug: &str) -> ShopResult<Option<Product>> {
        Ok(self.read().products.iter().find(|p| p.slug == slug).cloned())
    }

    async fn list_products(
        &self,
        category: Option<&Category>,
        limit: usize,
    ) -> ShopResult<Vec<Product>> {
        Ok(self
            .read()
            .products
            .iter()
            .filter(|p| category.map_or(true, |c| &p.category == c))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn replace_product(&self, product: &Product) -> ShopResult<bool> {
        let mut collections = self.write();
        match collections.products.iter_mut().find(|p| p.id == product.id) {
            Some(stored) => {
                *stored = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_product_images(&self, id: &str, images: &[String]) -> ShopResult<bool> {
        let mut collections = self.write();
        match collections.products.iter_mut().find(|p| p.id == id) {
            Some(stored) => {
                stored.images = images.to_vec();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_product(&self, id: &str) -> ShopResult<bool> {
        let mut collections = self.write();
        match collections.products.iter().position(|p| p.id == id) {
            Some(pos) => {
                collections.products.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_order(&self, order: &Order) -> ShopResult<()> {
        self.write().orders.push(order.clone());
        Ok(())
    }

    async fn find_order_by_number(&self, order_number: &str) -> ShopResult<Option<Order>> {
        Ok(self
            .read()
            .orders
            .iter()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    async fn list_orders(&self, limit: usize) -> ShopResult<Vec<Order>> {
        let mut orders = self.read().orders.clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(limit);
        Ok(orders)
    }

    async fn update_order(&self, id: &str, patch: &OrderPatch) -> ShopResult<bool> {
        let mut collections = self.write();
        match collections.orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                patch.apply(order);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
