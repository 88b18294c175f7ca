use crate::manifest::Manifest;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct CacheState {
    current: Option<Arc<Manifest>>,
    last_fetch: Option<DateTime<Utc>>,
    retry_count: u32,
}

/// In-process holder of the last usable manifest.
///
/// Single writer (the scheduler path), any number of readers (display
/// consumers). A fetch failure never clears the held manifest:
/// stale-but-valid beats empty for a display surface. Nothing is persisted;
/// the remote manifest is the single source of truth across restarts.
#[derive(Default)]
pub struct ManifestCache {
    state: RwLock<CacheState>,
}

impl ManifestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last usable manifest, or `None` before the first successful fetch.
    pub fn get(&self) -> Option<Arc<Manifest>> {
        self.state.read().unwrap().current.clone()
    }

    /// Atomically replace the manifest and reset the failure counter.
    /// Returns the stored handle for the notification payload.
    pub fn update(&self, manifest: Manifest, fetch_time: DateTime<Utc>) -> Arc<Manifest> {
        let manifest = Arc::new(manifest);
        let mut state = self.state.write().unwrap();
        state.current = Some(manifest.clone());
        state.last_fetch = Some(fetch_time);
        state.retry_count = 0;
        manifest
    }

    /// Version-unchanged refresh: the origin responded, nothing to replace.
    /// Resets the failure counter and bumps the fetch time.
    pub fn touch(&self, fetch_time: DateTime<Utc>) {
        let mut state = self.state.write().unwrap();
        state.last_fetch = Some(fetch_time);
        state.retry_count = 0;
    }

    /// Record a failed cycle; returns the consecutive failure count for the
    /// scheduler's logging.
    pub fn record_failure(&self) -> u32 {
        let mut state = self.state.write().unwrap();
        state.retry_count += 1;
        state.retry_count
    }

    pub fn retry_count(&self) -> u32 {
        self.state.read().unwrap().retry_count
    }

    pub fn last_fetch_time(&self) -> Option<DateTime<Utc>> {
        self.state.read().unwrap().last_fetch
    }

    /// Version of the held manifest, if any. Used for the unchanged-version
    /// short-circuit before validation.
    pub fn current_version(&self) -> Option<String> {
        self.state
            .read()
            .unwrap()
            .current
            .as_ref()
            .map(|m| m.version.clone())
    }
}
