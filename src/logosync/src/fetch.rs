use crate::error::{Result, SyncError};
use crate::manifest::Manifest;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Fetches the manifest document from its configured location.
///
/// Remote URLs go through a single pooled reqwest client with cache-busting
/// headers so a CDN edge never serves a stale manifest. `file://` references
/// (and bare filesystem paths, which the kiosk uses in offline demos) are
/// read directly. The fetcher has no state beyond its client; it never
/// touches the cache.
pub struct ManifestFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl ManifestFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Shared client handle, reused for asset downloads so the connection
    /// pool covers the whole cycle.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `fetch(url) -> Manifest`, failing with `Network`, `Timeout`, `Parse`
    /// or `Io` depending on where the read broke. A parse failure is an
    /// ordinary error, never a panic.
    pub async fn fetch(&self, url: &str) -> Result<Manifest> {
        let bytes = if let Some(path) = local_path(url) {
            debug!(path = %path.display(), "reading manifest from local file");
            tokio::fs::read(path).await?
        } else {
            debug!(url = %url, "fetching manifest");
            let response = self
                .client
                .get(url)
                .header("Cache-Control", "no-cache")
                .header("Pragma", "no-cache")
                .send()
                .await
                .map_err(|e| SyncError::from_request(e, self.timeout))?;

            let status = response.status();
            if !status.is_success() {
                return Err(SyncError::Network(format!(
                    "manifest fetch returned HTTP {} for {}",
                    status, url
                )));
            }

            response
                .bytes()
                .await
                .map_err(|e| SyncError::from_request(e, self.timeout))?
                .to_vec()
        };

        let manifest: Manifest = serde_json::from_slice(&bytes)?;
        Ok(manifest)
    }
}

/// Map a manifest URL to a filesystem path when it is a local reference.
/// Anything without a scheme is treated as a path.
fn local_path(url: &str) -> Option<&Path> {
    if let Some(rest) = url.strip_prefix("file://") {
        return Some(Path::new(rest));
    }
    if url.contains("://") {
        return None;
    }
    Some(Path::new(url))
}
