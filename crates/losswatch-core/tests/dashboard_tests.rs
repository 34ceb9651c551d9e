use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use losswatch_core::{
    Dashboard, DashboardState, FeedClient, FeedError, FsCacheStore, RefreshCache, SourceEntry,
    SourceRegistry,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXAMPLE_FEED: &str = r#"{"stories":[{"content":{"date":"2022-03-01","killed":"100","wounded":"200","artillery":"5","aircraft":"1","helicopters":"2","tanks":"3","armored_combat_vehicles":"4","ships_boats":"0"}}]}"#;

async fn dashboard(server: &MockServer, dir: &tempfile::TempDir) -> Dashboard {
    let registry = Arc::new(
        SourceRegistry::new(vec![
            SourceEntry {
                key: "minusrus".into(),
                page_uri: "https://www.minusrus.com/en".into(),
                api_uri: format!("{}/losses", server.uri()),
            },
            SourceEntry {
                key: "broken".into(),
                page_uri: "https://broken.example".into(),
                api_uri: format!("{}/broken", server.uri()),
            },
        ])
        .unwrap(),
    );
    let cache = RefreshCache::new(
        registry.clone(),
        Arc::new(FeedClient::with_timeout(Duration::from_secs(5)).unwrap()),
        Arc::new(FsCacheStore::new(dir.path().to_path_buf()).unwrap()),
        Duration::from_secs(60),
    );
    Dashboard::new(registry, cache)
}

#[tokio::test]
async fn example_feed_renders_both_charts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/losses"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EXAMPLE_FEED))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let dashboard = dashboard(&server, &dir).await;

    let (infantry, equipment) = dashboard.initial_render().await.unwrap();

    let day = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
    let point = |chart: &losswatch_core::ChartSpec, name: &str| {
        let series = chart.series(name).unwrap();
        assert_eq!(series.x, vec![day]);
        series.y[0]
    };
    assert_eq!(point(&infantry, "wounded"), 200);
    assert_eq!(point(&infantry, "killed"), 100);
    assert_eq!(point(&equipment, "artillery"), 5);
    assert_eq!(point(&equipment, "aircraft"), 1);
    assert_eq!(point(&equipment, "helicopters"), 2);
    assert_eq!(point(&equipment, "tanks"), 3);
    assert_eq!(point(&equipment, "armored"), 4);
    assert_eq!(point(&equipment, "ships"), 0);

    // second render within the TTL is served from cache (mock expects one hit)
    dashboard.on_source_changed("minusrus").await.unwrap();
}

#[tokio::test]
async fn upstream_failure_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let dashboard = dashboard(&server, &dir).await;

    let result = dashboard.on_source_changed("broken").await;
    assert!(matches!(result, Err(FeedError::Network(_))));
}

#[tokio::test]
async fn malformed_feed_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/losses"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"cv": 1}"#))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let dashboard = dashboard(&server, &dir).await;

    let result = dashboard.initial_render().await;
    assert!(matches!(result, Err(FeedError::MalformedFeed(_))));
}

#[tokio::test]
async fn state_tracks_the_selected_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EXAMPLE_FEED))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let dashboard = dashboard(&server, &dir).await;

    let mut state = DashboardState::new(&dashboard);
    assert_eq!(state.selected_source(), "minusrus");

    state.select(&dashboard, "broken").await.unwrap();
    assert_eq!(state.selected_source(), "broken");

    let result = state.select(&dashboard, "nope").await;
    assert!(matches!(result, Err(FeedError::UnknownSource(_))));
    assert_eq!(state.selected_source(), "broken");
}
