use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use nanoid::nanoid;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data_models::{ResultBundle, SearchQuery};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// On-disk record. `stored_at` is informational; entries never expire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CacheEntry<B = ResultBundle> {
    pub key: String,
    pub stored_at: DateTime<Utc>,
    pub bundle: B,
}

/// One JSON file per query key under `root`.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

/// File name for a cache key: anything that is not a letter, digit, `-` or `_`
/// becomes `_`.
///
/// The name is not shortened. A very long search text can exceed the file
/// system's name limit (usually 255 bytes); `put` then fails and that query is
/// never cached, though searches still succeed.
pub fn file_name_for(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.json")
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_path(&self, query: &SearchQuery) -> PathBuf {
        self.root.join(file_name_for(&query.cache_key()))
    }

    /// Creates the cache directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<(), CacheError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// A missing, unreadable or corrupt entry is a miss.
    pub async fn get(&self, query: &SearchQuery) -> Option<ResultBundle> {
        let key = query.cache_key();
        let path = self.entry_path(query);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("cache miss: {key}");
                return None;
            }
            Err(e) => {
                log::warn!("unreadable cache entry {}: {:#}", path.display(), e);
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("corrupt cache entry {}: {:#}", path.display(), e);
                return None;
            }
        };

        if entry.key != key {
            log::warn!(
                "cache entry {} belongs to {:?}, not {:?}",
                path.display(),
                entry.key,
                key
            );
            return None;
        }

        log::info!("cache hit: {key} (stored {})", entry.stored_at);
        Some(entry.bundle)
    }

    /// Writes the whole entry to a temporary file and renames it into place, so
    /// concurrent readers see either the old entry or the new one. Last writer wins.
    pub async fn put(&self, query: &SearchQuery, bundle: &ResultBundle) -> Result<(), CacheError> {
        self.ensure_root().await?;

        let entry = CacheEntry {
            key: query.cache_key(),
            stored_at: Utc::now(),
            bundle,
        };
        let bytes = serde_json::to_vec_pretty(&entry)?;

        let path = self.entry_path(query);
        let tmp = self.root.join(format!(".{}.{}.tmp", file_name_for(&entry.key), nanoid!(8)));
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        log::info!("cached {} listings under {}", bundle.listings.len(), path.display());
        Ok(())
    }
}
