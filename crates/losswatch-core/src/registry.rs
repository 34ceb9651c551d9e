//! Source registry: the configured set of feed endpoints.
//!
//! The registry is read once at startup from a JSON object mapping a short
//! source key to its page and API URIs:
//!
//! ```json
//! { "minusrus": { "uri": "https://www.minusrus.com/en", "api": "https://api.storyblok.com/..." } }
//! ```
//!
//! File order is preserved; the first entry is the default selection.

use std::fmt;
use std::path::Path;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::error::FeedError;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read source registry {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse source registry: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Source registry is empty")]
    Empty,

    #[error("Source `{key}` has an invalid {field} URI `{value}`: {reason}")]
    InvalidUri {
        key: String,
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// One selectable feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub key: String,
    pub page_uri: String,
    pub api_uri: String,
}

impl SourceEntry {
    /// Dropdown label: host of the page URI without a leading `www.`.
    pub fn label(&self) -> String {
        Url::parse(&self.page_uri)
            .ok()
            .and_then(|url| url.host_str().map(|h| h.trim_start_matches("www.").to_string()))
            .unwrap_or_else(|| self.key.clone())
    }
}

/// File representation of a single source.
#[derive(Debug, Deserialize)]
struct RawSource {
    uri: String,
    api: String,
}

/// Immutable, ordered set of sources keyed by `SourceEntry::key`.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    entries: Vec<SourceEntry>,
}

impl SourceRegistry {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let OrderedSources(raw) = serde_json::from_str(json)?;
        let entries = raw
            .into_iter()
            .map(|(key, source)| {
                validate_uri(&key, "page", &source.uri)?;
                validate_uri(&key, "api", &source.api)?;
                Ok(SourceEntry {
                    key,
                    page_uri: source.uri,
                    api_uri: source.api,
                })
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;
        Self::new(entries)
    }

    pub fn new(entries: Vec<SourceEntry>) -> Result<Self, RegistryError> {
        if entries.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(Self { entries })
    }

    pub fn resolve(&self, key: &str) -> Result<&SourceEntry, FeedError> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .ok_or_else(|| FeedError::UnknownSource(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    /// The first configured source.
    pub fn default_entry(&self) -> &SourceEntry {
        // non-empty by construction
        &self.entries[0]
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }
}

fn validate_uri(key: &str, field: &'static str, value: &str) -> Result<(), RegistryError> {
    let invalid = |reason: String| RegistryError::InvalidUri {
        key: key.to_string(),
        field,
        value: value.to_string(),
        reason,
    };
    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme `{}`", other))),
    }
}

/// JSON object deserialized in file order, rejecting repeated keys.
struct OrderedSources(Vec<(String, RawSource)>);

impl<'de> Deserialize<'de> for OrderedSources {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SourcesVisitor;

        impl<'de> Visitor<'de> for SourcesVisitor {
            type Value = OrderedSources;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping source keys to {uri, api}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut sources: Vec<(String, RawSource)> = Vec::new();
                while let Some((key, source)) = map.next_entry::<String, RawSource>()? {
                    if sources.iter().any(|(existing, _)| *existing == key) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate source key `{}`",
                            key
                        )));
                    }
                    sources.push((key, source));
                }
                Ok(OrderedSources(sources))
            }
        }

        deserializer.deserialize_map(SourcesVisitor)
    }
}
