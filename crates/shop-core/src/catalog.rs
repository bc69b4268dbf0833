//! # Catalog Manager
//!
//! CRUD over the product catalog plus image attachment. Authentication is
//! checked by the HTTP layer before any mutating call reaches this service.

use crate::error::{ShopError, ShopResult};
use crate::product::{Category, Product, ProductInput};
use crate::store::{BoxedStore, LIST_LIMIT};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// URL prefix under which stored assets are served
pub const ASSET_URL_PREFIX: &str = "/uploads";

/// An uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-side file name; only its extension is kept
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Opaque storage name for an upload: a fresh UUID plus the original
/// extension, if there is one.
pub fn asset_name(original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));

    match ext {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase()),
        None => Uuid::new_v4().to_string(),
    }
}

/// Public URL of a stored asset
pub fn asset_url(name: &str) -> String {
    format!("{ASSET_URL_PREFIX}/{name}")
}

/// Blob storage for product images
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store `bytes` under `name` (as produced by [`asset_name`])
    async fn put(&self, name: &str, bytes: &[u8]) -> ShopResult<()>;
}

/// Type alias for a shared asset store
pub type BoxedAssetStore = Arc<dyn AssetStore>;

/// Product catalog service
#[derive(Clone)]
pub struct Catalog {
    store: BoxedStore,
    assets: BoxedAssetStore,
}

impl Catalog {
    pub fn new(store: BoxedStore, assets: BoxedAssetStore) -> Self {
        Self { store, assets }
    }

    /// Create a product; the slug is derived from the name
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: ProductInput) -> ShopResult<Product> {
        input.validate()?;
        let product = Product::from_input(input);
        self.store.insert_product(&product).await?;

        info!("Created product {} ({})", product.id, product.slug);
        Ok(product)
    }

    /// Replace all editable fields of a product
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: ProductInput) -> ShopResult<Product> {
        input.validate()?;
        let mut product = self.get(id).await?;
        product.apply(input);

        if !self.store.replace_product(&product).await? {
            return Err(ShopError::not_found("Product"));
        }

        info!("Updated product {}", product.id);
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> ShopResult<()> {
        if !self.store.delete_product(id).await? {
            return Err(ShopError::not_found("Product"));
        }
        info!("Deleted product {}", id);
        Ok(())
    }

    pub async fn get(&self, id: &str) -> ShopResult<Product> {
        self.store
            .find_product(id)
            .await?
            .ok_or_else(|| ShopError::not_found("Product"))
    }

    /// Look up by slug. With duplicate slugs the first stored match wins.
    pub async fn get_by_slug(&self, slug: &str) -> ShopResult<Product> {
        self.store
            .find_product_by_slug(slug)
            .await?
            .ok_or_else(|| ShopError::not_found("Product"))
    }

    /// List products, optionally restricted to one category
    pub async fn list(&self, category: Option<&Category>) -> ShopResult<Vec<Product>> {
        self.store.list_products(category, LIST_LIMIT).await
    }

    /// Store uploads and append their URLs to the product's images
    #[instrument(skip(self, uploads), fields(files = uploads.len()))]
    pub async fn attach_images(&self, id: &str, uploads: Vec<Upload>) -> ShopResult<Vec<String>> {
        if uploads.is_empty() {
            return Err(ShopError::Validation("no files uploaded".to_string()));
        }

        let product = self.get(id).await?;

        let mut urls = Vec::with_capacity(uploads.len());
        for upload in &uploads {
            let name = asset_name(&upload.file_name);
            self.assets.put(&name, &upload.bytes).await?;
            urls.push(asset_url(&name));
        }

        let mut images = product.images;
        images.extend(urls.iter().cloned());

        if !self.store.set_product_images(id, &images).await? {
            return Err(ShopError::not_found("Product"));
        }

        info!("Attached {} images to product {}", urls.len(), id);
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingAssets {
        blobs: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl AssetStore for RecordingAssets {
        async fn put(&self, name: &str, bytes: &[u8]) -> ShopResult<()> {
            self.blobs
                .lock()
                .unwrap()
                .insert(name.to_string(), bytes.to_vec());
            Ok(())
        }
    }

    fn catalog() -> (Catalog, Arc<RecordingAssets>) {
        let assets = Arc::new(RecordingAssets::default());
        let catalog = Catalog::new(Arc::new(MemoryStore::new()), assets.clone());
        (catalog, assets)
    }

    fn input(name: &str, category: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            price: 799.0,
            description: "Hand carved".to_string(),
            category: Category::from(category),
            stock: 4,
            images: Vec::new(),
        }
    }

    #[test]
    fn test_asset_name_keeps_extension_only() {
        let name = asset_name("../../etc/My Photo.PNG");
        assert!(name.ends_with(".png"));
        assert!(!name.contains('/'));
        assert_eq!(name.len(), 36 + 4);

        assert_eq!(asset_name("README").len(), 36);
        assert_ne!(asset_name("a.jpg"), asset_name("a.jpg"));
    }

    #[tokio::test]
    async fn test_create_derives_slug() {
        let (catalog, _) = catalog();
        let product = catalog
            .create(input("Gold & Silver Ring", "jewellery"))
            .await
            .unwrap();

        assert_eq!(product.slug, "gold-and-silver-ring");
        let found = catalog.get_by_slug("gold-and-silver-ring").await.unwrap();
        assert_eq!(found.id, product.id);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let (catalog, _) = catalog();
        let mut bad = input("Ring", "jewellery");
        bad.stock = -2;
        assert!(matches!(
            catalog.create(bad).await,
            Err(ShopError::Validation(_))
        ));
        assert!(catalog.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let (catalog, _) = catalog();
        let ring = catalog.create(input("Ring", "jewellery")).await.unwrap();
        catalog.create(input("Bowl", "wooden")).await.unwrap();

        let jewellery = catalog.list(Some(&Category::Jewellery)).await.unwrap();
        assert_eq!(jewellery.len(), 1);
        assert_eq!(jewellery[0].id, ring.id);

        let wooden = catalog.list(Some(&Category::Wooden)).await.unwrap();
        assert!(wooden.iter().all(|p| p.id != ring.id));

        assert_eq!(catalog.list(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_slugs_allowed() {
        let (catalog, _) = catalog();
        let first = catalog.create(input("Teak Box", "wooden")).await.unwrap();
        let second = catalog.create(input("Teak Box", "wooden")).await.unwrap();

        assert_eq!(first.slug, second.slug);
        assert_ne!(first.id, second.id);
        assert!(catalog.get_by_slug("teak-box").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_recomputes_slug_and_replaces_images() {
        let (catalog, _) = catalog();
        let mut original = input("Teak Box", "wooden");
        original.images = vec!["/uploads/old.png".to_string()];
        let product = catalog.create(original).await.unwrap();

        let updated = catalog
            .update(&product.id, input("Rosewood Box", "wooden"))
            .await
            .unwrap();

        assert_eq!(updated.slug, "rosewood-box");
        assert_eq!(updated.created_at, product.created_at);
        assert!(updated.images.is_empty());
        assert_eq!(catalog.get(&product.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_missing_product() {
        let (catalog, _) = catalog();
        assert!(matches!(
            catalog.update("nope", input("X", "wooden")).await,
            Err(ShopError::NotFound { .. })
        ));
        assert!(matches!(
            catalog.delete("nope").await,
            Err(ShopError::NotFound { .. })
        ));
        assert!(matches!(
            catalog.get("nope").await,
            Err(ShopError::NotFound { .. })
        ));
        let upload = Upload {
            file_name: "a.png".to_string(),
            bytes: vec![1],
        };
        assert!(matches!(
            catalog.attach_images("nope", vec![upload]).await,
            Err(ShopError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let (catalog, _) = catalog();
        let product = catalog.create(input("Ring", "jewellery")).await.unwrap();
        catalog.delete(&product.id).await.unwrap();
        assert!(catalog.get(&product.id).await.is_err());
    }

    #[tokio::test]
    async fn test_attach_images_appends_in_order() {
        let (catalog, assets) = catalog();
        let mut with_image = input("Ring", "jewellery");
        with_image.images = vec!["/uploads/existing.jpg".to_string()];
        let product = catalog.create(with_image).await.unwrap();

        let urls = catalog
            .attach_images(
                &product.id,
                vec![
                    Upload {
                        file_name: "front.jpg".to_string(),
                        bytes: b"front".to_vec(),
                    },
                    Upload {
                        file_name: "back.png".to_string(),
                        bytes: b"back".to_vec(),
                    },
                ],
            )
            .await
            .unwrap();

        assert_eq!(urls.len(), 2);
        assert!(urls[0].starts_with("/uploads/") && urls[0].ends_with(".jpg"));
        assert!(urls[1].ends_with(".png"));

        let stored = catalog.get(&product.id).await.unwrap();
        assert_eq!(
            stored.images,
            vec![
                "/uploads/existing.jpg".to_string(),
                urls[0].clone(),
                urls[1].clone()
            ]
        );
        assert_eq!(assets.blobs.lock().unwrap().len(), 2);
    }
}
