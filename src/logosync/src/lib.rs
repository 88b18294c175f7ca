pub mod assets;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod notify;
pub mod payload;
pub mod scheduler;
pub mod validate;

pub use cache::ManifestCache;
pub use config::ServiceConfig;
pub use error::{Result, SyncError};
pub use manifest::{LogoEntry, Manifest};
pub use notify::{ManifestChange, Subscription};
pub use scheduler::LogoManifestService;

/// Construct the service, run one immediate sync, and start the poll
/// scheduler at the configured interval.
pub async fn start_service(config: ServiceConfig) -> Result<LogoManifestService> {
    let service = LogoManifestService::new(config)?;
    // First cycle failures are not fatal: the display comes up empty and
    // the scheduler keeps retrying at the fixed interval.
    if let Err(e) = service.sync_once().await {
        tracing::warn!(error = %e, "initial manifest sync failed");
    }
    service.start();
    Ok(service)
}
