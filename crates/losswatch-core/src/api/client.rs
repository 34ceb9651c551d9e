//! HTTP client for source feed endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

use crate::error::FeedError;

/// HTTP request timeout in seconds when none is configured.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Retrieves the raw body of a feed endpoint.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, api_uri: &str) -> Result<Vec<u8>, FeedError>;
}

/// Feed client backed by reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new() -> Result<Self, FeedError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("losswatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(
        url: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, FeedError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(FeedError::from_status(url, status, &body))
        }
    }
}

#[async_trait]
impl FeedFetcher for FeedClient {
    async fn fetch(&self, api_uri: &str) -> Result<Vec<u8>, FeedError> {
        debug!(url = api_uri, "Fetching feed");

        let response = self
            .client
            .get(api_uri)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FeedError::Network(format!("GET {} failed: {}", api_uri, e)))?;

        let response = Self::check_response(api_uri, response).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Network(format!("Failed to read body from {}: {}", api_uri, e)))?;

        debug!(url = api_uri, bytes = body.len(), "Fetched feed");
        Ok(body.to_vec())
    }
}
