//! Axum webserver: dashboard page and chart API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use losswatch_core::{Dashboard, FeedError};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::page;

pub struct AppState {
    pub dashboard: Dashboard,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/api/charts/:source", get(charts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn start_server(state: Arc<AppState>, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Webserver stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal, stopping webserver...");
}

async fn index_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let dashboard = &state.dashboard;
    Html(page::render_index(
        dashboard.sources(),
        dashboard.default_source(),
    ))
}

/// Both figures for one source.
async fn charts(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
) -> Result<Json<Value>, ChartError> {
    let (infantry, equipment) = state.dashboard.on_source_changed(&source).await?;
    Ok(Json(json!({
        "source": source,
        "infantry": infantry.to_figure(),
        "equipment": equipment.to_figure(),
    })))
}

/// A failed render cycle, as an HTTP response.
pub struct ChartError(FeedError);

impl From<FeedError> for ChartError {
    fn from(err: FeedError) -> Self {
        ChartError(err)
    }
}

impl IntoResponse for ChartError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            FeedError::UnknownSource(_) => StatusCode::NOT_FOUND,
            FeedError::Network(_) => StatusCode::BAD_GATEWAY,
            FeedError::MalformedFeed(_)
            | FeedError::TypeCoercion { .. }
            | FeedError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(status = status.as_u16(), error = %self.0, "Chart render failed");
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use losswatch_core::{FeedFetcher, FsCacheStore, RefreshCache, SourceRegistry};
    use tower::ServiceExt;

    const SOURCES: &str = r#"{
        "minusrus": { "uri": "https://www.minusrus.com/en", "api": "https://api.example/losses" },
        "down": { "uri": "https://down.example", "api": "https://api.example/down" },
        "garbled": { "uri": "https://garbled.example", "api": "https://api.example/garbled" }
    }"#;

    const FEED: &str = r#"{"stories":[{"content":{"date":"2022-03-01","killed":"100","wounded":"200","artillery":"5","aircraft":"1","helicopters":"2","tanks":"3","armored_combat_vehicles":"4","ships_boats":"0"}}]}"#;

    #[derive(Default)]
    struct StubFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FeedFetcher for StubFetcher {
        async fn fetch(&self, api_uri: &str) -> Result<Vec<u8>, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match api_uri {
                "https://api.example/losses" => Ok(FEED.as_bytes().to_vec()),
                "https://api.example/garbled" => Ok(br#"{"stories":[{"content":{"killed":"N/A"}}]}"#.to_vec()),
                _ => Err(FeedError::Network("connection refused".into())),
            }
        }
    }

    fn app(dir: &tempfile::TempDir) -> (Router, Arc<StubFetcher>) {
        let registry = Arc::new(SourceRegistry::from_json(SOURCES).unwrap());
        let fetcher = Arc::new(StubFetcher::default());
        let cache = RefreshCache::new(
            registry.clone(),
            fetcher.clone(),
            Arc::new(FsCacheStore::new(dir.path().to_path_buf()).unwrap()),
            Duration::from_secs(60),
        );
        let state = Arc::new(AppState {
            dashboard: Dashboard::new(registry, cache),
        });
        (create_router(state), fetcher)
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_index_page() {
        let dir = tempfile::tempdir().unwrap();
        let (router, fetcher) = app(&dir);

        let (status, body) = get(router, "/").await;
        let html = String::from_utf8(body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"<option value="minusrus" selected"#));
        assert!(html.contains(r#"<option value="down""#));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_charts_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let (router, fetcher) = app(&dir);

        let (status, body) = get(router.clone(), "/api/charts/minusrus").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["source"], "minusrus");
        assert_eq!(body["infantry"]["data"][0]["name"], "wounded");
        assert_eq!(body["infantry"]["data"][0]["y"][0], 200);
        assert_eq!(body["equipment"]["data"][5]["name"], "ships");
        assert_eq!(body["equipment"]["layout"]["legend"]["title"]["text"], "Equipment");

        let (status, _) = get(router, "/api/charts/minusrus").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let dir = tempfile::tempdir().unwrap();
        let (router, fetcher) = app(&dir);

        let (status, body) = get(router.clone(), "/api/charts/unknown-key").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Unknown source: unknown-key");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);

        let (status, _) = get(router.clone(), "/api/charts/down").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (status, body) = get(router, "/api/charts/garbled").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(body["error"].as_str().unwrap().contains("date"));
    }
}
