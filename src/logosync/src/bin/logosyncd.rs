use logosync::{start_service, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            ServiceConfig::from_file(&path)?
        }
        None => {
            tracing::info!("No config file given, using LOGOSYNC_MANIFEST_URL");
            let url = std::env::var("LOGOSYNC_MANIFEST_URL")
                .map_err(|_| "set LOGOSYNC_MANIFEST_URL or pass a config file path")?;
            ServiceConfig::for_url(url)
        }
    };
    config.validate()?;

    tracing::info!("Manifest URL: {}", config.manifest_url);
    tracing::info!("Poll interval: {}s", config.poll_interval_secs);
    tracing::info!("Download path: {}", config.download_path);
    tracing::info!("Press Ctrl+C to stop.");

    let service = start_service(config).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    service.stop();

    Ok(())
}
