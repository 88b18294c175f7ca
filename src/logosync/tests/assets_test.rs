//! Tests for the content-addressed local asset store

use logosync::assets::AssetStore;
use logosync::manifest::LogoEntry;
use sha2::{Digest, Sha256};
use std::time::Duration;

fn entry(id: &str, url: &str) -> LogoEntry {
    LogoEntry {
        id: id.to_string(),
        name: id.to_string(),
        url: url.to_string(),
        active: true,
        priority: 0,
        filename: None,
        size: None,
        content_type: None,
        uploaded_at: None,
    }
}

#[tokio::test]
async fn test_store_names_by_content_digest() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let store = AssetStore::new(dir.path().join("logos")).expect("create store");

    let bytes = b"fake png bytes";
    let path = store
        .store(&entry("a", "https://x/a.png"), bytes)
        .await
        .expect("store asset");

    let expected = format!("{:x}.png", Sha256::digest(bytes));
    assert_eq!(path.file_name().unwrap().to_string_lossy(), expected);
    assert_eq!(std::fs::read(&path).expect("read back"), bytes);

    // No stray temp file left behind
    let names: Vec<_> = std::fs::read_dir(store.base_dir())
        .expect("list dir")
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec![expected]);
}

#[tokio::test]
async fn test_store_is_idempotent_for_same_bytes() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let store = AssetStore::new(dir.path()).expect("create store");

    let bytes = b"same bytes";
    let first = store
        .store(&entry("a", "https://x/a.png"), bytes)
        .await
        .expect("first store");
    // Republished under a different id: same content, same file
    let second = store
        .store(&entry("a-renamed", "https://y/other.png"), bytes)
        .await
        .expect("second store");

    assert_eq!(first, second);
    assert_eq!(std::fs::read_dir(dir.path()).expect("list").count(), 1);
}

#[tokio::test]
async fn test_extension_prefers_filename_over_url() {
    let mut e = entry("a", "https://x/a.png?cache=123");
    assert_eq!(e.extension(), Some("png"));

    e.filename = Some("banner.jpg".to_string());
    assert_eq!(e.extension(), Some("jpg"));

    let no_ext = entry("b", "https://x/logo");
    assert_eq!(no_ext.extension(), None);
}

#[tokio::test]
async fn test_download_from_local_reference() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let src = dir.path().join("source.png");
    tokio::fs::write(&src, b"local image").await.expect("write source");

    let store = AssetStore::new(dir.path().join("logos")).expect("create store");
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .expect("client");

    let path = store
        .download(&client, &entry("a", &format!("file://{}", src.display())))
        .await
        .expect("download local asset");
    assert_eq!(std::fs::read(&path).expect("read back"), b"local image");
}

#[tokio::test]
async fn test_download_all_tolerates_individual_failures() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let src = dir.path().join("good.png");
    tokio::fs::write(&src, b"good image").await.expect("write source");

    let store = AssetStore::new(dir.path().join("logos")).expect("create store");
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .expect("client");

    let entries = vec![
        entry("good", &format!("file://{}", src.display())),
        entry("bad", "file:///definitely/not/here.png"),
    ];

    // One of two succeeds; the bad entry is logged, not fatal
    let stored = store.download_all(&client, &entries).await;
    assert_eq!(stored, 1);
}
