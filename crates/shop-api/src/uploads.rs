//! # Upload Storage
//!
//! Product images on local disk. Files are served back by the router under
//! `/uploads`.

use async_trait::async_trait;
use shop_core::{AssetStore, ShopError, ShopResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Asset store writing into a single directory
#[derive(Debug, Clone)]
pub struct DiskAssetStore {
    root: PathBuf,
}

impl DiskAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the directory if it does not exist yet
    pub async fn ensure_dir(&self) -> ShopResult<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ShopError::AssetStorage(format!("{}: {}", self.root.display(), e)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl AssetStore for DiskAssetStore {
    async fn put(&self, name: &str, bytes: &[u8]) -> ShopResult<()> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(ShopError::AssetStorage(format!("invalid asset name: {name}")));
        }

        let path = self.root.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ShopError::AssetStorage(format!("{}: {}", path.display(), e)))?;

        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(())
    }
}
