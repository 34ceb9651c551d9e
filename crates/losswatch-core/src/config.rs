//! Runtime settings.
//!
//! Settings come from environment variables (a `.env` file is honored by the
//! binary before this runs). Every value has a default, so an empty
//! environment yields a working local setup:
//!
//! | Variable                      | Default                          |
//! |-------------------------------|----------------------------------|
//! | `LOSSWATCH_SOURCES`           | `sources.json`                   |
//! | `LOSSWATCH_CACHE_DIR`         | `<platform cache dir>/losswatch` |
//! | `LOSSWATCH_CACHE_TTL_SECS`    | `60`                             |
//! | `LOSSWATCH_BIND`              | `127.0.0.1:8050`                 |
//! | `LOSSWATCH_HTTP_TIMEOUT_SECS` | `30`                             |
//! | `LOSSWATCH_LOG_DIR`           | unset (stderr only)              |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Application name used for cache directory paths
const APP_NAME: &str = "losswatch";

/// Cache directory used when the platform has none
const FALLBACK_CACHE_DIR: &str = "cache-directory";

const DEFAULT_SOURCES_FILE: &str = "sources.json";

/// Seconds a computed loss table is served before it is rebuilt.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

const DEFAULT_BIND: &str = "127.0.0.1:8050";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got `{value}`")]
    InvalidSeconds { name: &'static str, value: String },

    #[error("{name} must be a socket address like 127.0.0.1:8050, got `{value}`")]
    InvalidBind { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub sources_path: PathBuf,
    pub cache_dir: PathBuf,
    pub cache_ttl: Duration,
    pub bind: SocketAddr,
    pub http_timeout: Duration,
    pub log_dir: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let sources_path = var("LOSSWATCH_SOURCES")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCES_FILE));

        let cache_dir = var("LOSSWATCH_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_cache_dir);

        let cache_ttl = Duration::from_secs(parse_seconds(
            "LOSSWATCH_CACHE_TTL_SECS",
            var("LOSSWATCH_CACHE_TTL_SECS"),
            DEFAULT_CACHE_TTL_SECS,
        )?);

        let http_timeout = Duration::from_secs(parse_seconds(
            "LOSSWATCH_HTTP_TIMEOUT_SECS",
            var("LOSSWATCH_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);

        let bind_value = var("LOSSWATCH_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_value
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBind {
                name: "LOSSWATCH_BIND",
                value: bind_value.clone(),
            })?;

        let log_dir = var("LOSSWATCH_LOG_DIR").map(PathBuf::from);

        Ok(Self {
            sources_path,
            cache_dir,
            cache_ttl,
            bind,
            http_timeout,
            log_dir,
        })
    }
}

fn parse_seconds(
    name: &'static str,
    value: Option<String>,
    default: u64,
) -> Result<u64, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidSeconds { name, value }),
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR))
}
