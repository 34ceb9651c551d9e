//! Dashboard shell: source selection → cached table → charts.
//!
//! The hosting UI calls `Dashboard::on_source_changed` whenever its source
//! dropdown changes; nothing here depends on how that UI is wired.
//!
//! `DashboardState` is for hosts that keep the selection server-side. The
//! web host keeps it in the browser's dropdown and calls
//! `on_source_changed` per request instead.

use std::sync::Arc;

use tracing::debug;

use crate::cache::RefreshCache;
use crate::charts::{self, ChartSpec};
use crate::error::FeedError;
use crate::registry::{SourceEntry, SourceRegistry};

#[derive(Clone)]
pub struct Dashboard {
    registry: Arc<SourceRegistry>,
    cache: RefreshCache,
}

impl Dashboard {
    pub fn new(registry: Arc<SourceRegistry>, cache: RefreshCache) -> Self {
        Self { registry, cache }
    }

    pub fn sources(&self) -> &[SourceEntry] {
        self.registry.entries()
    }

    pub fn default_source(&self) -> &str {
        &self.registry.default_entry().key
    }

    /// Infantry and equipment charts for `source_key`.
    pub async fn on_source_changed(
        &self,
        source_key: &str,
    ) -> Result<(ChartSpec, ChartSpec), FeedError> {
        debug!(source = source_key, "Rendering charts");
        let encoded = self.cache.get_or_build(source_key).await?;
        let table = encoded.decode()?;
        Ok(charts::render(&table))
    }

    pub async fn initial_render(&self) -> Result<(ChartSpec, ChartSpec), FeedError> {
        self.on_source_changed(self.default_source()).await
    }
}

/// The single piece of UI state: which source is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    selected_source: String,
}

impl DashboardState {
    /// Starts on the dashboard's default source.
    pub fn new(dashboard: &Dashboard) -> Self {
        Self {
            selected_source: dashboard.default_source().to_string(),
        }
    }

    pub fn selected_source(&self) -> &str {
        &self.selected_source
    }

    /// Switch to `source_key` and render it. Unknown keys leave the state unchanged.
    pub async fn select(
        &mut self,
        dashboard: &Dashboard,
        source_key: &str,
    ) -> Result<(ChartSpec, ChartSpec), FeedError> {
        if !dashboard.registry.contains(source_key) {
            return Err(FeedError::UnknownSource(source_key.to_string()));
        }
        self.selected_source = source_key.to_string();
        dashboard.on_source_changed(source_key).await
    }
}
