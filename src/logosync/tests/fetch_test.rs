//! Tests for the manifest fetcher
//!
//! Remote behavior is exercised against a loopback stub origin; local-file
//! behavior against a temp directory.

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use logosync::fetch::ManifestFetcher;
use logosync::SyncError;
use std::time::Duration;

const MANIFEST_JSON: &str = r#"{
    "version": "1",
    "lastUpdated": "2026-08-01T12:00:00Z",
    "logos": [
        { "id": "a", "name": "Logo A", "url": "https://x/a.png", "active": true, "priority": 1 }
    ]
}"#;

/// Spawn a stub origin and return its base URL.
async fn spawn_origin(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve stub origin");
    });
    format!("http://{}", addr)
}

fn fetcher() -> ManifestFetcher {
    ManifestFetcher::new(Duration::from_secs(5)).expect("build fetcher")
}

#[tokio::test]
async fn test_fetch_remote_manifest() {
    let app = Router::new().route("/manifest.json", get(|| async { MANIFEST_JSON }));
    let base = spawn_origin(app).await;

    let manifest = fetcher()
        .fetch(&format!("{}/manifest.json", base))
        .await
        .expect("fetch should succeed");

    assert_eq!(manifest.version, "1");
    assert_eq!(manifest.logos.len(), 1);
    assert_eq!(manifest.logos[0].id, "a");
    assert!(manifest.last_updated.is_some());
}

#[tokio::test]
async fn test_fetch_sends_cache_busting_headers() {
    // The origin echoes back whether no-cache headers were present
    let app = Router::new().route(
        "/manifest.json",
        get(|headers: axum::http::HeaderMap| async move {
            let no_cache = headers
                .get("cache-control")
                .map(|v| v.as_bytes() == b"no-cache")
                .unwrap_or(false)
                && headers.contains_key("pragma");
            if no_cache {
                (StatusCode::OK, MANIFEST_JSON)
            } else {
                (StatusCode::BAD_REQUEST, "missing cache busting headers")
            }
        }),
    );
    let base = spawn_origin(app).await;

    fetcher()
        .fetch(&format!("{}/manifest.json", base))
        .await
        .expect("origin saw no-cache headers");
}

#[tokio::test]
async fn test_http_error_status_is_network_error() {
    let app = Router::new().route(
        "/manifest.json",
        get(|| async { (StatusCode::NOT_FOUND, "gone") }),
    );
    let base = spawn_origin(app).await;

    let err = fetcher()
        .fetch(&format!("{}/manifest.json", base))
        .await
        .expect_err("404 must fail");
    assert!(matches!(err, SyncError::Network(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_origin_is_network_error() {
    // Port 1 on loopback refuses connections
    let err = fetcher()
        .fetch("http://127.0.0.1:1/manifest.json")
        .await
        .expect_err("connection refused must fail");
    assert!(matches!(err, SyncError::Network(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_slow_origin_is_timeout_error() {
    let app = Router::new().route(
        "/manifest.json",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            MANIFEST_JSON
        }),
    );
    let base = spawn_origin(app).await;

    let fetcher = ManifestFetcher::new(Duration::from_millis(200)).expect("build fetcher");
    let err = fetcher
        .fetch(&format!("{}/manifest.json", base))
        .await
        .expect_err("slow origin must time out");
    assert!(matches!(err, SyncError::Timeout(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_malformed_json_is_parse_error() {
    let app = Router::new().route("/manifest.json", get(|| async { "{ not json" }));
    let base = spawn_origin(app).await;

    let err = fetcher()
        .fetch(&format!("{}/manifest.json", base))
        .await
        .expect_err("malformed body must fail");
    assert!(matches!(err, SyncError::Parse(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_fetch_local_file_reference() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("manifest.json");
    tokio::fs::write(&path, MANIFEST_JSON).await.expect("write");

    // file:// scheme
    let manifest = fetcher()
        .fetch(&format!("file://{}", path.display()))
        .await
        .expect("file:// fetch");
    assert_eq!(manifest.version, "1");

    // bare filesystem path
    let manifest = fetcher()
        .fetch(&path.display().to_string())
        .await
        .expect("bare path fetch");
    assert_eq!(manifest.logos.len(), 1);
}

#[tokio::test]
async fn test_missing_local_file_is_io_error() {
    let err = fetcher()
        .fetch("file:///definitely/not/here/manifest.json")
        .await
        .expect_err("missing file must fail");
    assert!(matches!(err, SyncError::Io(_)), "got {:?}", err);
}
