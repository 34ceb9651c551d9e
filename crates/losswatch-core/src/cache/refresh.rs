use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::store::CacheStore;
use crate::api::FeedFetcher;
use crate::error::FeedError;
use crate::registry::SourceRegistry;
use crate::table::{self, EncodedTable};

/// Memoizes fetch → build per API URI for `ttl`.
#[derive(Clone)]
pub struct RefreshCache {
    registry: Arc<SourceRegistry>,
    fetcher: Arc<dyn FeedFetcher>,
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl RefreshCache {
    pub fn new(
        registry: Arc<SourceRegistry>,
        fetcher: Arc<dyn FeedFetcher>,
        store: Arc<dyn CacheStore>,
        ttl: Duration,
    ) -> Self {
        Self {
            registry,
            fetcher,
            store,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get_or_build(&self, source_key: &str) -> Result<EncodedTable, FeedError> {
        self.get_or_build_at(source_key, Utc::now()).await
    }

    /// Serve the cached table for `source_key` if fresh at `now`, otherwise
    /// fetch, build and store it stamped with `now`.
    ///
    /// Failed fetches or builds are returned as-is and leave the store untouched.
    pub async fn get_or_build_at(
        &self,
        source_key: &str,
        now: DateTime<Utc>,
    ) -> Result<EncodedTable, FeedError> {
        let source = self.registry.resolve(source_key)?;
        let key = source.api_uri.as_str();

        match self.store.get(key) {
            Ok(Some(entry)) if entry.is_fresh(now, self.ttl) => {
                debug!(source = source_key, age_secs = entry.age_at(now).num_seconds(), "Cache hit");
                return Ok(entry.data);
            }
            Ok(Some(_)) => debug!(source = source_key, "Cache entry expired"),
            Ok(None) => debug!(source = source_key, "Cache miss"),
            Err(e) => warn!(source = source_key, error = %e, "Unreadable cache entry, rebuilding"),
        }

        info!(source = source_key, url = key, "Refreshing loss table");
        let raw = self.fetcher.fetch(key).await?;
        let encoded = table::build(&raw)?;

        if let Err(e) = self.store.put(key, &encoded, now) {
            warn!(source = source_key, error = %e, "Failed to store loss table in cache");
        }

        Ok(encoded)
    }
}
