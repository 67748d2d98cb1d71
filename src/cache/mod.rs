//! Disk-backed cache of fetched pages.
//!
//! One JSON document mirrors an in-memory map from request key (a URL in
//! every current use) to the raw payload fetched for it. The file is
//! rewritten in full on every insert, through a temp file renamed over
//! the final path so a crash mid-write leaves the previous cache intact.
//! Last write wins; there is no TTL and no versioning.

use crate::error::CacheError;
use std::collections::BTreeMap;
use std::fs;
use std::future::Future;
use std::path::PathBuf;
use tracing::{debug, info};

pub struct PageCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl PageCache {
    /// Load the cache at `path`. A missing file yields an empty cache; an
    /// unreadable or corrupt file is an error so the caller can decide
    /// whether to proceed with an empty one.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                entries: BTreeMap::new(),
            });
        }
        let contents = fs::read_to_string(&path).map_err(|source| CacheError::Unreadable {
            path: path.clone(),
            source,
        })?;
        let entries = serde_json::from_str(&contents).map_err(|source| CacheError::Corrupt {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, entries })
    }

    /// An empty cache that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Record `value` under `key` and persist the whole cache.
    pub fn insert(&mut self, key: &str, value: String) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value);
        self.persist()
    }

    /// Return the cached payload for `key`, or run `fetch` and record its
    /// result. The fetch runs only when the key is absent.
    pub async fn get_or_fetch<F, Fut, E>(&mut self, key: &str, fetch: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
        E: From<CacheError>,
    {
        if let Some(hit) = self.entries.get(key) {
            debug!(key, "cache hit");
            return Ok(hit.clone());
        }
        info!(key, "cache miss; fetching");
        let value = fetch().await?;
        self.insert(key, value.clone())?;
        Ok(value)
    }

    /// Whole-file overwrite through a temp file in the same directory, so
    /// the rename is on one filesystem.
    fn persist(&self) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| CacheError::Persist {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| CacheError::Persist {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}
