use crate::ghs::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version constants for cache invalidation
pub mod versions {
    pub const SDSGRAPH_VERSION: &str = env!("CARGO_PKG_VERSION");
    /// Bump when hierarchy, injection or assembly output changes
    pub const PROCESSING_VERSION: &str = "1.0.0";
    /// Bump when the layout dump format changes
    pub const LAYOUT_INTERFACE_VERSION: &str = "1.0.0";
}

/// Cache key: layout dump + config → document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DocumentCacheKey {
    pub layout_hash: String,
    pub config_hash: String,
    pub sdsgraph_version: String,
    pub processing_version: String,
    pub layout_interface_version: String,
}

impl DocumentCacheKey {
    pub fn new(layout_hash: String, config_hash: String) -> Self {
        Self {
            layout_hash,
            config_hash,
            sdsgraph_version: versions::SDSGRAPH_VERSION.to_string(),
            processing_version: versions::PROCESSING_VERSION.to_string(),
            layout_interface_version: versions::LAYOUT_INTERFACE_VERSION.to_string(),
        }
    }

    /// Compute cache key hash for storage
    pub fn to_cache_hash(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(&self.layout_hash);
        hasher.update(&self.config_hash);
        hasher.update(&self.sdsgraph_version);
        hasher.update(&self.processing_version);
        hasher.update(&self.layout_interface_version);
        format!("{:x}", hasher.finalize())
    }
}

/// Cached document with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentCacheValue {
    pub document: Document,
    pub created_at: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub cache_version: String,
}

impl DocumentCacheValue {
    pub fn new(document: Document, processing_time_ms: u64) -> Self {
        Self {
            document,
            created_at: Utc::now(),
            processing_time_ms,
            cache_version: versions::SDSGRAPH_VERSION.to_string(),
        }
    }
}
