use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default poll interval (5 minutes)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

/// Default whole-request timeout for manifest fetches (10 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default per-entry reachability probe timeout (5 seconds)
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Default directory for locally mirrored logo assets
pub const DEFAULT_DOWNLOAD_PATH: &str = "cache/logos";

/// Service configuration, consumed from the billboard's JSON config file.
///
/// Wire names are camelCase to match the rest of the billboard config
/// (`enabled`, `manifestUrl`, `pollInterval`, `downloadPath`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Remote HTTP(S) location or a `file://` reference
    #[serde(rename = "manifestUrl")]
    pub manifest_url: String,

    /// Seconds between manifest polls
    #[serde(rename = "pollInterval", default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Directory where logo assets are mirrored for offline display
    #[serde(rename = "downloadPath", default = "default_download_path")]
    pub download_path: String,

    /// Whole-request timeout for manifest fetches, in seconds
    #[serde(rename = "requestTimeout", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for per-entry reachability probes, in seconds
    #[serde(rename = "probeTimeout", default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Whether usable logo assets are mirrored to `download_path`
    #[serde(rename = "downloadAssets", default = "default_enabled")]
    pub download_assets: bool,

    /// Source label carried in change notifications
    #[serde(rename = "sourceName", default = "default_source_name")]
    pub source_name: String,
}

fn default_enabled() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_download_path() -> String {
    DEFAULT_DOWNLOAD_PATH.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_probe_timeout() -> u64 {
    DEFAULT_PROBE_TIMEOUT_SECS
}

fn default_source_name() -> String {
    "remote".to_string()
}

impl ServiceConfig {
    /// Config pointing at the given manifest location, everything else
    /// defaulted.
    pub fn for_url(manifest_url: impl Into<String>) -> Self {
        ServiceConfig {
            enabled: default_enabled(),
            manifest_url: manifest_url.into(),
            poll_interval_secs: default_poll_interval(),
            download_path: default_download_path(),
            request_timeout_secs: default_request_timeout(),
            probe_timeout_secs: default_probe_timeout(),
            download_assets: default_enabled(),
            source_name: default_source_name(),
        }
    }

    /// Load from a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let config: ServiceConfig = serde_json::from_slice(&bytes)?;
        Ok(config)
    }

    /// Fatal-at-startup validation. Missing or nonsensical settings are
    /// `Config` errors; nothing here is recoverable at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.manifest_url.trim().is_empty() {
            return Err(SyncError::Config("manifestUrl must not be empty".to_string()));
        }
        if self.poll_interval_secs == 0 {
            return Err(SyncError::Config(
                "pollInterval must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(SyncError::Config(
                "requestTimeout must be at least 1 second".to_string(),
            ));
        }
        if self.probe_timeout_secs == 0 {
            // A zero probe timeout fails every reachability check and
            // silently empties the usable manifest
            return Err(SyncError::Config(
                "probeTimeout must be at least 1 second".to_string(),
            ));
        }
        if self.download_assets && self.download_path.trim().is_empty() {
            return Err(SyncError::Config(
                "downloadPath must not be empty when downloadAssets is set".to_string(),
            ));
        }
        Ok(())
    }
}
