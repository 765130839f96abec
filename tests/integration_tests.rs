//! Integration tests for the UV proxy

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use uv_advisory::client::terminal::{FixedLocation, StaticPermission, TerminalRenderer};
use uv_advisory::client::{
    ClientError, ClientState, Controller, ControllerSettings, PermissionState, Platform, UvFetcher,
};
use uv_advisory::{AppState, Coordinates, OpenWeatherMapClient, ProxyClient, UvIndexSource, web};

/// Upstream stand-in that answers from a fixed script and counts calls
struct StubSource {
    answer: Result<Option<f64>, String>,
    calls: AtomicUsize,
}

impl StubSource {
    fn new(answer: Result<Option<f64>, String>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl UvIndexSource for StubSource {
    async fn current_uv_index(&self, _coordinates: &Coordinates) -> anyhow::Result<Option<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().map_err(anyhow::Error::msg)
    }
}

async fn get(source: Arc<StubSource>, uri: &str) -> Response {
    let app = web::app(AppState::new(source), None);
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn allows_any_origin(response: &Response) -> bool {
    response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_some_and(|value| value == "*")
}

#[tokio::test]
async fn test_uv_passes_reading_through() {
    let source = StubSource::new(Ok(Some(6.2)));
    let response = get(source.clone(), "/api/uv?lat=46.8&lon=8.2").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(allows_any_origin(&response));
    assert_eq!(json_body(response).await, json!({ "uvIndex": 6.2 }));
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_uv_missing_reading_is_null() {
    let source = StubSource::new(Ok(None));
    let response = get(source, "/api/uv?lat=-33.87&lon=151.21").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "uvIndex": null }));
}

#[tokio::test]
async fn test_missing_coordinates_rejected_without_upstream_call() {
    for uri in ["/api/uv", "/api/uv?lat=46.8", "/api/uv?lon=8.2", "/api/uv?lat=&lon=8.2"] {
        let source = StubSource::new(Ok(Some(1.0)));
        let response = get(source.clone(), uri).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert!(allows_any_origin(&response));
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Missing lat/lon parameters" })
        );
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_invalid_coordinates_rejected_without_upstream_call() {
    let source = StubSource::new(Ok(Some(1.0)));
    let response = get(source.clone(), "/api/uv?lat=north&lon=8.2").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Invalid lat/lon parameters" })
    );
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upstream_failure_is_500() {
    let source = StubSource::new(Err("connection refused".to_string()));
    let response = get(source, "/api/uv?lat=46.8&lon=8.2").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(allows_any_origin(&response));
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Failed to fetch UV data" })
    );
}

#[tokio::test]
async fn test_healthz() {
    let response = get(StubSource::new(Ok(None)), "/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_static_dir_served_outside_api() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>UV</h1>").unwrap();

    let app = web::app(
        AppState::new(StubSource::new(Ok(None))),
        dir.path().to_str(),
    );
    let response = app
        .oneshot(Request::builder().uri("/index.html").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"<h1>UV</h1>");
}

#[tokio::test]
async fn test_proxy_against_mocked_openweathermap() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/onecall"))
        .and(query_param("lat", "46.8"))
        .and(query_param("lon", "8.2"))
        .and(query_param("appid", "integration-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "lat": 46.8, "lon": 8.2, "current": { "uvi": 3.7 } })),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let source = OpenWeatherMapClient::with_base_url(
        "integration-key",
        &upstream.uri(),
        Duration::from_secs(5),
    )
    .unwrap();
    let app = web::app(AppState::new(Arc::new(source)), None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/uv?lat=46.8&lon=8.2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body, json!({ "uvIndex": 3.7 }));
    assert!(!body.to_string().contains("integration-key"));
}

#[tokio::test]
async fn test_client_talks_to_running_proxy() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = web::app(AppState::new(StubSource::new(Ok(Some(8.4)))), None);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ProxyClient::new(&format!("http://{addr}")).unwrap();
    let coordinates = Coordinates::new(46.8, 8.2).unwrap();

    assert_eq!(client.fetch_uv(&coordinates).await, Ok(Some(8.4)));
}

#[tokio::test]
async fn test_controller_shows_unavailable_when_proxy_fails() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = web::app(
        AppState::new(StubSource::new(Err("upstream down".to_string()))),
        None,
    );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let platform = Platform::new(
        StaticPermission(PermissionState::Granted),
        FixedLocation::new(Coordinates::new(46.8, 8.2).unwrap()),
        ProxyClient::new(&format!("http://{addr}")).unwrap(),
    );
    let mut controller = Controller::new(
        platform,
        ControllerSettings::default(),
        TerminalRenderer::new(Vec::new()),
    );

    assert!(controller.start().await);
    assert_eq!(
        controller.state(),
        ClientState::Error(ClientError::Unavailable)
    );
    assert_eq!(controller.view().uv_text, "UV index not available.");
}
