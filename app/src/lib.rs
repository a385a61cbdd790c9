pub mod config;
pub mod services;

use format_catalog::FormatCatalog;

use config::AppConfig;

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Load environment, runtime config and the format catalog.
pub fn init_foundation() -> Result<(AppConfig, FormatCatalog), anyhow::Error> {
    load_dotenv();

    let config = AppConfig::load();
    tracing::info!(
        threshold = config.threshold,
        dither = config.dither,
        max_parallel = config.max_parallel,
        output_dir = %config.output_dir.display(),
        "Configuration loaded"
    );

    let catalog = config.load_catalog()?;
    Ok((config, catalog))
}
