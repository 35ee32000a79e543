use crate::cache::{DocumentCacheKey, DocumentCacheValue};
use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Storage abstraction for caching assembled documents
pub trait DocumentStorage {
    fn get_document(&self, cache_key: &DocumentCacheKey) -> Result<Option<DocumentCacheValue>>;
    fn store_document(&self, cache_key: &DocumentCacheKey, cache_value: &DocumentCacheValue) -> Result<()>;
}

/// File-based storage implementation using local cache directory
pub struct FileStorage {
    cache_dir: String,
}

impl FileStorage {
    pub fn new(cache_dir: &str) -> Result<Self> {
        fs::create_dir_all(format!("{cache_dir}/documents"))?;

        Ok(Self {
            cache_dir: cache_dir.to_string(),
        })
    }

    fn document_path(&self, cache_key: &DocumentCacheKey) -> String {
        format!("{}/documents/{}.json", self.cache_dir, cache_key.to_cache_hash())
    }
}

impl DocumentStorage for FileStorage {
    fn get_document(&self, cache_key: &DocumentCacheKey) -> Result<Option<DocumentCacheValue>> {
        let path = self.document_path(cache_key);
        if Path::new(&path).exists() {
            let json_str = fs::read_to_string(path)?;
            let cache_value: DocumentCacheValue = serde_json::from_str(&json_str)
                .map_err(|e| anyhow!("Failed to deserialize cached DocumentCacheValue: {}", e))?;
            Ok(Some(cache_value))
        } else {
            Ok(None)
        }
    }

    fn store_document(&self, cache_key: &DocumentCacheKey, cache_value: &DocumentCacheValue) -> Result<()> {
        let path = self.document_path(cache_key);
        let json_str = serde_json::to_string_pretty(cache_value)
            .map_err(|e| anyhow!("Failed to serialize DocumentCacheValue: {}", e))?;
        fs::write(path, json_str)?;
        Ok(())
    }
}

/// SHA-256 of the full layout dump
pub fn calculate_layout_hash(layout_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(layout_bytes);
    format!("{:x}", hasher.finalize())
}

/// Calculate hash for configuration data (for the cache key)
pub fn calculate_config_hash<T: serde::Serialize>(config: &T) -> Result<String> {
    let config_json = serde_json::to_string(config)
        .map_err(|e| anyhow!("Failed to serialize config for hashing: {}", e))?;

    let mut hasher = Sha256::new();
    hasher.update(config_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// No-op storage implementation that disables all caching
pub struct NoOpStorage;

impl Default for NoOpStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl NoOpStorage {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentStorage for NoOpStorage {
    fn get_document(&self, _cache_key: &DocumentCacheKey) -> Result<Option<DocumentCacheValue>> {
        Ok(None) // Always cache miss
    }

    fn store_document(&self, _cache_key: &DocumentCacheKey, _cache_value: &DocumentCacheValue) -> Result<()> {
        Ok(()) // No-op
    }
}
