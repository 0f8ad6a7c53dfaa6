//! Remote asset store: where uploaded project images end up.

pub mod cloudinary;
pub mod uploader;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::upload::UploadedFile;

/// An image accepted by the asset store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAsset {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Upload one image under `key`. The store may prefix the key with its
    /// own folder; the returned `public_id` is what [`AssetStore::delete`]
    /// expects.
    async fn upload(&self, key: &str, file: &UploadedFile) -> Result<StoredAsset, String>;

    async fn delete(&self, public_id: &str) -> Result<(), String>;
}
