//! Core library for losswatch.
//!
//! Fetches a published loss feed, reshapes it into a typed loss table,
//! memoizes the encoded table on disk for a short TTL, and renders the
//! infantry and equipment stacked-area charts.

pub mod api;
pub mod cache;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod registry;
pub mod table;

pub use api::{FeedClient, FeedFetcher};
pub use cache::{CacheStore, FsCacheStore, RefreshCache};
pub use charts::{ChartSpec, Series};
pub use config::{ConfigError, Settings};
pub use dashboard::{Dashboard, DashboardState};
pub use error::FeedError;
pub use registry::{RegistryError, SourceEntry, SourceRegistry};
pub use table::{EncodedTable, LossColumn, LossRow, LossTable};
