//! Time-bounded caching of encoded loss tables.
//!
//! `FsCacheStore` keeps one JSON file per API URI; `RefreshCache` sits in
//! front of the fetch → build pipeline and serves an entry while it is
//! younger than the configured TTL (60 seconds by default).
//!
//! Concurrent sessions may recompute the same key around expiry; the last
//! write wins and readers never see a partial file.

pub mod refresh;
pub mod store;

pub use refresh::RefreshCache;
pub use store::{CacheEntry, CacheStore, CachedData, FsCacheStore};
