use crate::error::{Result, SyncError};
use crate::manifest::LogoEntry;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Content-addressed store for logo assets under the configured download
/// directory.
///
/// Assets are named by the SHA-256 of their bytes (extension preserved when
/// known), so republishing an identical image is a no-op and a renamed logo
/// never collides. Writes go through a temp file and a rename so the display
/// never reads a half-written image.
pub struct AssetStore {
    base_dir: PathBuf,
}

impl AssetStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Store asset bytes, returning the path written (or already present).
    pub async fn store(&self, entry: &LogoEntry, bytes: &[u8]) -> Result<PathBuf> {
        let digest = format!("{:x}", Sha256::digest(bytes));
        let name = match entry.extension() {
            Some(ext) => format!("{}.{}", digest, ext),
            None => digest,
        };
        let path = self.base_dir.join(&name);

        if tokio::fs::metadata(&path).await.is_ok() {
            debug!(id = %entry.id, path = %path.display(), "asset already stored");
            return Ok(path);
        }

        let tmp_path = self.base_dir.join(format!("{}.tmp", name));
        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&tmp_path, &path).await?;

        debug!(id = %entry.id, path = %path.display(), size = bytes.len(), "asset stored");
        Ok(path)
    }

    /// Download one logo asset through the shared client and store it.
    /// Local file references are copied from disk.
    pub async fn download(
        &self,
        client: &reqwest::Client,
        entry: &LogoEntry,
    ) -> Result<PathBuf> {
        let bytes = if let Some(rest) = entry.url.strip_prefix("file://") {
            tokio::fs::read(Path::new(rest)).await?
        } else if !entry.url.contains("://") {
            tokio::fs::read(Path::new(&entry.url)).await?
        } else {
            let response = client
                .get(&entry.url)
                .send()
                .await
                .map_err(|e| SyncError::Network(e.to_string()))?;
            if !response.status().is_success() {
                return Err(SyncError::Network(format!(
                    "asset download returned HTTP {} for {}",
                    response.status(),
                    entry.url
                )));
            }
            response
                .bytes()
                .await
                .map_err(|e| SyncError::Network(e.to_string()))?
                .to_vec()
        };

        self.store(entry, &bytes).await
    }

    /// Mirror a batch of entries; individual failures are logged and do not
    /// fail the cycle.
    pub async fn download_all(&self, client: &reqwest::Client, entries: &[LogoEntry]) -> usize {
        let mut stored = 0;
        for entry in entries {
            match self.download(client, entry).await {
                Ok(_) => stored += 1,
                Err(e) => {
                    warn!(id = %entry.id, url = %entry.url, error = %e, "asset download failed");
                }
            }
        }
        stored
    }
}
