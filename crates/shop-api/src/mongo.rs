//! # MongoDB Store
//!
//! `Store` backed by MongoDB. Records are stored as their serde form, so
//! timestamps land as RFC 3339 strings and `_id` is left to the server.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, to_bson, Bson, Document};
use mongodb::{Client, Collection, Database};
use serde::Serialize;
use shop_core::{
    collections, Category, Order, OrderPatch, Product, Session, ShopError, ShopResult, Store, User,
};
use tracing::{debug, info, instrument};

fn store_err(e: impl std::fmt::Display) -> ShopError {
    ShopError::Store(e.to_string())
}

fn bson_value<T: Serialize>(value: &T) -> ShopResult<Bson> {
    to_bson(value).map_err(store_err)
}

/// `$set` document for an order patch; only present fields are written
fn patch_document(patch: &OrderPatch) -> ShopResult<Document> {
    let mut set = doc! { "updated_at": bson_value(&patch.updated_at)? };

    if let Some(status) = patch.order_status {
        set.insert("order_status", status.as_str());
    }
    if let Some(link) = &patch.tracking_link {
        set.insert("tracking_link", link.as_str());
    }
    if let Some(status) = patch.payment_status {
        set.insert("payment_status", bson_value(&status)?);
    }
    if let Some(id) = &patch.razorpay_order_id {
        set.insert("razorpay_order_id", id.as_str());
    }
    if let Some(id) = &patch.razorpay_payment_id {
        set.insert("razorpay_payment_id", id.as_str());
    }

    Ok(doc! { "$set": set })
}

/// MongoDB-backed store
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    /// Connect to `url` and use database `db_name`
    pub async fn connect(url: &str, db_name: &str) -> ShopResult<Self> {
        let client = Client::with_uri_str(url).await.map_err(store_err)?;
        let db = client.database(db_name);
        info!("Connected to MongoDB database {}", db_name);
        Ok(Self { client, db })
    }

    /// Close the connection pool
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        info!("MongoDB client closed");
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(collections::USERS)
    }

    fn sessions(&self) -> Collection<Session> {
        self.db.collection(collections::SESSIONS)
    }

    fn products(&self) -> Collection<Product> {
        self.db.collection(collections::PRODUCTS)
    }

    fn orders(&self) -> Collection<Order> {
        self.db.collection(collections::ORDERS)
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn find_user_by_id(&self, id: &str) -> ShopResult<Option<User>> {
        self.users().find_one(doc! { "id": id }).await.map_err(store_err)
    }

    async fn find_user_by_email(&self, email: &str) -> ShopResult<Option<User>> {
        self.users()
            .find_one(doc! { "email": email })
            .await
            .map_err(store_err)
    }

    async fn insert_user(&self, user: &User) -> ShopResult<()> {
        self.users().insert_one(user).await.map_err(store_err)?;
        Ok(())
    }

    async fn insert_session(&self, session: &Session) -> ShopResult<()> {
        self.sessions().insert_one(session).await.map_err(store_err)?;
        Ok(())
    }

    async fn find_session(&self, token: &str) -> ShopResult<Option<Session>> {
        self.sessions()
            .find_one(doc! { "session_token": token })
            .await
            .map_err(store_err)
    }

    async fn delete_session(&self, token: &str) -> ShopResult<()> {
        self.sessions()
            .delete_one(doc! { "session_token": token })
            .await
            .map_err(store_err)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_sessions_expired_before(&self, now: DateTime<Utc>) -> ShopResult<u64> {
        let result = self
            .sessions()
            .delete_many(doc! { "expires_at": { "$lt": bson_value(&now)? } })
            .await
            .map_err(store_err)?;
        Ok(result.deleted_count)
    }

    async fn insert_product(&self, product: &Product) -> ShopResult<()> {
        self.products().insert_one(product).await.map_err(store_err)?;
        Ok(())
    }

    async fn find_product(&self, id: &str) -> ShopResult<Option<Product>> {
        self.products()
            .find_one(doc! { "id": id })
            .await
            .map_err(store_err)
    }

    async fn find_product_by_slug(&self, slug: &str) -> ShopResult<Option<Product>> {
        self.products()
            .find_one(doc! { "slug": slug })
            .await
            .map_err(store_err)
    }

    async fn list_products(
        &self,
        category: Option<&Category>,
        limit: usize,
    ) -> ShopResult<Vec<Product>> {
        let filter = match category {
            Some(category) => doc! { "category": category.as_str() },
            None => doc! {},
        };
        debug!("Listing products: {:?}", filter);

        let cursor = self
            .products()
            .find(filter)
            .limit(limit as i64)
            .await
            .map_err(store_err)?;
        cursor.try_collect().await.map_err(store_err)
    }

    async fn replace_product(&self, product: &Product) -> ShopResult<bool> {
        let result = self
            .products()
            .replace_one(doc! { "id": &product.id }, product)
            .await
            .map_err(store_err)?;
        Ok(result.matched_count > 0)
    }

    async fn set_product_images(&self, id: &str, images: &[String]) -> ShopResult<bool> {
        let result = self
            .products()
            .update_one(doc! { "id": id }, doc! { "$set": { "images": images.to_vec() } })
            .await
            .map_err(store_err)?;
        Ok(result.matched_count > 0)
    }

    async fn delete_product(&self, id: &str) -> ShopResult<bool> {
        let result = self
            .products()
            .delete_one(doc! { "id": id })
            .await
            .map_err(store_err)?;
        Ok(result.deleted_count > 0)
    }

    async fn insert_order(&self, order: &Order) -> ShopResult<()> {
        self.orders().insert_one(order).await.map_err(store_err)?;
        Ok(())
    }

    async fn find_order_by_number(&self, order_number: &str) -> ShopResult<Option<Order>> {
        self.orders()
            .find_one(doc! { "order_number": order_number })
            .await
            .map_err(store_err)
    }

    async fn list_orders(&self, limit: usize) -> ShopResult<Vec<Order>> {
        let cursor = self
            .orders()
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .limit(limit as i64)
            .await
            .map_err(store_err)?;
        cursor.try_collect().await.map_err(store_err)
    }

    #[instrument(skip(self, patch))]
    async fn update_order(&self, id: &str, patch: &OrderPatch) -> ShopResult<bool> {
        let result = self
            .orders()
            .update_one(doc! { "id": id }, patch_document(patch)?)
            .await
            .map_err(store_err)?;
        Ok(result.matched_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_core::OrderStatus;

    #[test]
    fn test_status_patch_document() {
        let patch = OrderPatch::status(OrderStatus::Shipped, Some("https://track/1".into()));
        let update = patch_document(&patch).unwrap();
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_str("order_status").unwrap(), "shipped");
        assert_eq!(set.get_str("tracking_link").unwrap(), "https://track/1");
        assert!(set.get_str("updated_at").is_ok());
        assert!(!set.contains_key("payment_status"));
    }

    #[test]
    fn test_status_patch_without_link_leaves_link_alone() {
        let patch = OrderPatch::status(OrderStatus::Delivered, Some(String::new()));
        let update = patch_document(&patch).unwrap();
        let set = update.get_document("$set").unwrap();
        assert!(!set.contains_key("tracking_link"));
    }

    #[test]
    fn test_payment_patch_documents() {
        let completed = patch_document(&OrderPatch::payment_completed("order_1", "pay_1")).unwrap();
        let set = completed.get_document("$set").unwrap();
        assert_eq!(set.get_str("payment_status").unwrap(), "completed");
        assert_eq!(set.get_str("razorpay_order_id").unwrap(), "order_1");
        assert_eq!(set.get_str("razorpay_payment_id").unwrap(), "pay_1");

        let failed = patch_document(&OrderPatch::payment_failed()).unwrap();
        let set = failed.get_document("$set").unwrap();
        assert_eq!(set.get_str("payment_status").unwrap(), "failed");
        assert!(!set.contains_key("razorpay_payment_id"));
    }
}
