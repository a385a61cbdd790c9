//! Command-line entry point.
//!
//! Usage: `logocraft <SOURCE> [FORMAT_KEY ...]`
//!
//! Renders the listed formats (every catalog format when none are given)
//! and writes them, plus `manifest.json`, to the configured output directory.

use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use logocraft_lib::services::job;

const USAGE: &str = "usage: logocraft <SOURCE> [FORMAT_KEY ...]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let source = args.next().map(PathBuf::from).context(USAGE)?;
    let requested: Vec<String> = args.collect();

    let (config, catalog) = logocraft_lib::init_foundation()?;
    let manifest = job::process_source(&config, &catalog, &source, &requested).await?;

    for image in &manifest.processed_images {
        println!("{}\t{}\t{}", image.name, image.size, image.content_type);
    }
    for failed in &manifest.failed_images {
        eprintln!("{}\tFAILED: {}", failed.name, failed.error);
    }

    tracing::info!(
        processed = manifest.processed_images.len(),
        failed = manifest.failed_images.len(),
        "Done"
    );
    Ok(())
}
