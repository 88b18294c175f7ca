use crate::assets::AssetStore;
use crate::cache::ManifestCache;
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::fetch::ManifestFetcher;
use crate::manifest::Manifest;
use crate::notify::{ChangeNotifier, ManifestChange, Subscription};
use crate::validate::{HttpProbe, ManifestValidator, UrlProbe};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The logo manifest synchronization service.
///
/// Explicitly constructed and owned (no global instance); hand a reference
/// to whichever display component needs it. Lifecycle: [`new`], [`start`],
/// [`stop`]; dropping the service stops the scheduler.
///
/// One fetch/validate/update cycle is in flight at a time. A tick that
/// would overlap a still-running cycle is skipped and logged, never queued.
/// `stop()` cancels future ticks but not an already-dispatched fetch; a
/// late result is still applied to the cache (last-fetch-wins).
///
/// [`new`]: LogoManifestService::new
/// [`start`]: LogoManifestService::start
/// [`stop`]: LogoManifestService::stop
pub struct LogoManifestService {
    inner: Arc<ServiceInner>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

struct ServiceInner {
    config: ServiceConfig,
    fetcher: ManifestFetcher,
    validator: ManifestValidator,
    cache: ManifestCache,
    notifier: ChangeNotifier,
    assets: Option<AssetStore>,
    in_flight: AtomicBool,
}

impl LogoManifestService {
    /// Build the service with the production HTTP reachability probe.
    /// Configuration problems are fatal here, not at runtime.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = ManifestFetcher::new(Duration::from_secs(config.request_timeout_secs))?;
        let probe = HttpProbe::new(
            fetcher.client().clone(),
            Duration::from_secs(config.probe_timeout_secs),
        );
        Self::build(config, fetcher, Box::new(probe))
    }

    /// Build with a custom reachability probe (tests stub this seam).
    pub fn with_probe(config: ServiceConfig, probe: Box<dyn UrlProbe>) -> Result<Self> {
        config.validate()?;
        let fetcher = ManifestFetcher::new(Duration::from_secs(config.request_timeout_secs))?;
        Self::build(config, fetcher, probe)
    }

    fn build(
        config: ServiceConfig,
        fetcher: ManifestFetcher,
        probe: Box<dyn UrlProbe>,
    ) -> Result<Self> {
        let assets = if config.download_assets {
            Some(AssetStore::new(&config.download_path)?)
        } else {
            None
        };

        Ok(Self {
            inner: Arc::new(ServiceInner {
                config,
                fetcher,
                validator: ManifestValidator::new(probe),
                cache: ManifestCache::new(),
                notifier: ChangeNotifier::new(),
                assets,
                in_flight: AtomicBool::new(false),
            }),
            ticker: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> &ManifestCache {
        &self.inner.cache
    }

    /// Current usable manifest, if one has been fetched.
    pub fn manifest(&self) -> Option<Arc<Manifest>> {
        self.inner.cache.get()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ManifestChange) + Send + Sync + 'static,
    {
        self.inner.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.inner.notifier.unsubscribe(subscription)
    }

    /// Run one fetch/validate/update cycle now. Returns `true` when the
    /// cache was replaced and listeners notified. Respects the same
    /// single-cycle guard as the scheduler.
    pub async fn sync_once(&self) -> Result<bool> {
        if self.inner.in_flight.swap(true, Ordering::SeqCst) {
            warn!("sync cycle already in flight, skipping");
            return Ok(false);
        }
        let result = self.inner.run_cycle().await;
        self.inner.in_flight.store(false, Ordering::SeqCst);
        result
    }

    /// Start the poll scheduler at the configured interval.
    pub fn start(&self) {
        self.start_with_interval(self.inner.config.poll_interval_secs);
    }

    /// Start (or restart) the poll scheduler. Calling this on a running
    /// service replaces the ticker, which is how interval changes take
    /// effect; an in-flight cycle is allowed to finish and its result is
    /// still applied.
    pub fn start_with_interval(&self, interval_secs: u64) {
        if !self.inner.config.enabled {
            info!("logo manifest sync disabled in configuration, not starting");
            return;
        }

        let mut ticker = self.ticker.lock().unwrap();
        if let Some(handle) = ticker.take() {
            info!("poll scheduler already running, restarting");
            handle.abort();
        }

        let inner = self.inner.clone();
        let interval_secs = interval_secs.max(1);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if inner.in_flight.swap(true, Ordering::SeqCst) {
                    warn!("previous sync cycle still in flight, skipping this tick");
                    continue;
                }
                // The cycle runs in its own task so stop() aborts only the
                // ticker; a dispatched fetch always lands (last-fetch-wins).
                let cycle = inner.clone();
                tokio::spawn(async move {
                    // Failures are logged and counted inside the cycle;
                    // nothing propagates past the scheduler.
                    let _ = cycle.run_cycle().await;
                    cycle.in_flight.store(false, Ordering::SeqCst);
                });
            }
        });
        *ticker = Some(handle);
        info!(interval_secs, "poll scheduler started");
    }

    /// Stop the scheduler. Idempotent; stopping an idle service is a no-op.
    pub fn stop(&self) {
        let mut ticker = self.ticker.lock().unwrap();
        match ticker.take() {
            Some(handle) => {
                handle.abort();
                info!("poll scheduler stopped");
            }
            None => debug!("stop called while idle"),
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker
            .lock()
            .unwrap()
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for LogoManifestService {
    fn drop(&mut self) {
        if let Ok(mut ticker) = self.ticker.lock() {
            if let Some(handle) = ticker.take() {
                handle.abort();
            }
        }
    }
}

impl ServiceInner {
    /// One full cycle: fetch, short-circuit on unchanged version, validate,
    /// update the cache, mirror new assets, notify listeners.
    async fn run_cycle(&self) -> Result<bool> {
        let candidate = match self.fetcher.fetch(&self.config.manifest_url).await {
            Ok(manifest) => manifest,
            Err(e) => {
                let failures = self.cache.record_failure();
                warn!(
                    error = %e,
                    consecutive_failures = failures,
                    "manifest fetch failed, keeping previous manifest"
                );
                return Err(e);
            }
        };
        let fetch_time = Utc::now();

        // Unchanged version: the origin answered, nothing to re-validate.
        if self.cache.current_version().as_deref() == Some(candidate.version.as_str()) {
            debug!(version = %candidate.version, "manifest version unchanged");
            self.cache.touch(fetch_time);
            return Ok(false);
        }

        let previous = self.cache.get();
        let report = self.validator.validate(&candidate, previous.as_deref()).await;
        if !report.broken.is_empty() {
            warn!(
                broken = report.broken.len(),
                version = %candidate.version,
                "excluded broken logo entries from manifest"
            );
        }

        let manifest = self.cache.update(report.usable, fetch_time);

        if let Some(assets) = &self.assets {
            if !report.added.is_empty() {
                let stored = assets.download_all(self.fetcher.client(), &report.added).await;
                debug!(
                    stored,
                    requested = report.added.len(),
                    "mirrored new logo assets"
                );
            }
        }

        info!(
            version = %manifest.version,
            logos = manifest.logo_count(),
            added = report.added.len(),
            removed = report.removed.len(),
            "manifest updated"
        );

        self.notifier.notify(&ManifestChange {
            manifest,
            added: report.added,
            removed: report.removed,
            source: self.config.source_name.clone(),
            timestamp: fetch_time,
        });

        Ok(true)
    }
}
