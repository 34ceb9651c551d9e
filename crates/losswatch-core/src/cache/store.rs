use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::table::EncodedTable;

/// A cached value with the key it was stored under and when it was computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub key: String,
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

pub type CacheEntry = CachedData<EncodedTable>;

impl<T> CachedData<T> {
    pub fn new(key: impl Into<String>, data: T, cached_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            data,
            cached_at,
        }
    }

    pub fn age_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.cached_at
    }

    /// Fresh while the entry is less than `ttl` away from `now`.
    /// Timestamps ahead of `now` (clock skew) count by their distance.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = self.age_at(now);
        let age = if age < chrono::Duration::zero() { -age } else { age };
        age.to_std().map(|age| age < ttl).unwrap_or(false)
    }
}

/// Key/value storage for encoded loss tables.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    fn put(&self, key: &str, value: &EncodedTable, timestamp: DateTime<Utc>) -> Result<()>;
}

/// Distinguishes temporary files of concurrent writers in one process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One JSON file per key under a directory.
///
/// Files are named by the SHA-256 of the key, and writes go through a
/// temporary file plus rename so readers only ever see whole entries.
pub struct FsCacheStore {
    cache_dir: PathBuf,
}

impl FsCacheStore {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir).with_context(|| {
            format!("Failed to create cache directory: {}", cache_dir.display())
        })?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    fn cache_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.cache_dir.join(format!("{}.json", hex::encode(digest)))
    }
}

impl CacheStore for FsCacheStore {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let path = self.cache_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", path.display()))?;

        let cached: CacheEntry = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", path.display()))?;

        if cached.key != key {
            debug!(key, stored = %cached.key, "Cache file belongs to another key");
            return Ok(None);
        }

        Ok(Some(cached))
    }

    fn put(&self, key: &str, value: &EncodedTable, timestamp: DateTime<Utc>) -> Result<()> {
        let cached = CachedData::new(key, value, timestamp);
        let path = self.cache_path(key);
        let contents = serde_json::to_string(&cached)?;

        // The directory may have been removed since startup
        std::fs::create_dir_all(&self.cache_dir)?;

        let tmp = path.with_extension(format!(
            "json.{}-{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write cache file: {}", tmp.display()))?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e)
                .with_context(|| format!("Failed to persist cache file: {}", path.display()));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn table(json: &str) -> EncodedTable {
        EncodedTable::from(json.to_string())
    }

    #[test]
    fn test_cached_data_is_fresh() {
        let now = Utc::now();
        let ttl = Duration::from_secs(60);

        let fresh = CachedData::new("k", 1, now - chrono::Duration::seconds(59));
        assert!(fresh.is_fresh(now, ttl));

        let expired = CachedData::new("k", 1, now - chrono::Duration::seconds(60));
        assert!(!expired.is_fresh(now, ttl));

        let skewed = CachedData::new("k", 1, now + chrono::Duration::seconds(120));
        assert!(!skewed.is_fresh(now, ttl));
    }

    #[test]
    fn test_zero_ttl_is_never_fresh() {
        let now = Utc::now();
        let cached = CachedData::new("k", 1, now);
        assert!(!cached.is_fresh(now, Duration::ZERO));
    }

    #[test]
    fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsCacheStore::new(dir.path().join("cache")).unwrap();
        let now = Utc::now();

        assert!(store.get("https://api.example/a").unwrap().is_none());

        store.put("https://api.example/a", &table(r#"{"a":1}"#), now).unwrap();
        let entry = store.get("https://api.example/a").unwrap().unwrap();
        assert_eq!(entry.data, table(r#"{"a":1}"#));
        assert_eq!(entry.cached_at, now);
        assert!(store.get("https://api.example/b").unwrap().is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsCacheStore::new(dir.path().to_path_buf()).unwrap();
        let now = Utc::now();

        store.put("k", &table("1"), now).unwrap();
        store.put("k", &table("2"), now).unwrap();
        assert_eq!(store.get("k").unwrap().unwrap().data, table("2"));

        let files = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 1, "temporary files must not be left behind");
    }

    #[test]
    fn test_recreates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("cache");
        let store = FsCacheStore::new(cache_dir.clone()).unwrap();
        std::fs::remove_dir_all(&cache_dir).unwrap();

        store.put("k", &table("1"), Utc::now()).unwrap();
        assert!(store.get("k").unwrap().is_some());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsCacheStore::new(dir.path().to_path_buf()).unwrap();
        std::fs::write(store.cache_path("k"), "{ truncated").unwrap();
        assert!(store.get("k").is_err());
    }

    #[test]
    fn test_concurrent_writers_never_expose_partial_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsCacheStore::new(dir.path().to_path_buf()).unwrap();
        let values = [
            table(&format!("[{}]", "1,".repeat(100_000) + "1")),
            table(&format!("[{}]", "2,".repeat(100_000) + "2")),
        ];
        store.put("k", &values[0], Utc::now()).unwrap();

        std::thread::scope(|scope| {
            for writer in 0..4 {
                let (store, values) = (&store, &values);
                scope.spawn(move || {
                    for i in 0..200 {
                        store.put("k", &values[(writer + i) % 2], Utc::now()).unwrap();
                    }
                });
            }
            for _ in 0..4 {
                let (store, values) = (&store, &values);
                scope.spawn(move || {
                    for _ in 0..200 {
                        let entry = store.get("k").unwrap().unwrap();
                        assert!(values.contains(&entry.data), "read a partial entry");
                    }
                });
            }
        });

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_mismatched_key_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsCacheStore::new(dir.path().to_path_buf()).unwrap();
        let other = serde_json::to_string(&CachedData::new("other", table("1"), Utc::now())).unwrap();
        std::fs::write(store.cache_path("k"), other).unwrap();
        assert!(store.get("k").unwrap().is_none());
    }
}
