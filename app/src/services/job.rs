//! One end-to-end job: read a source logo, render the requested formats and
//! export them.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use format_catalog::{FormatCatalog, FormatSpec};

use crate::config::AppConfig;
use crate::services::batch::render_batch;
use crate::services::export::{Manifest, export_batch};

/// Specs for the requested keys; every catalog entry when `requested` is empty.
/// Duplicate keys are rendered once.
pub fn resolve_formats(catalog: &FormatCatalog, requested: &[String]) -> Vec<FormatSpec> {
    if requested.is_empty() {
        return catalog.keys().map(|key| catalog.lookup(key)).collect();
    }

    let mut specs: Vec<FormatSpec> = Vec::with_capacity(requested.len());
    for key in requested {
        if specs.iter().any(|s| &s.format_key == key) {
            continue;
        }
        if !catalog.contains(key) {
            tracing::warn!("Format {key:?} is not in the catalog, using default dimensions");
        }
        specs.push(catalog.lookup(key));
    }
    specs
}

/// Render `source_path` into every requested format and export the results
/// to the configured output directory.
pub async fn process_source(
    config: &AppConfig,
    catalog: &FormatCatalog,
    source_path: &Path,
    requested: &[String],
) -> anyhow::Result<Manifest> {
    let bytes = tokio::fs::read(source_path)
        .await
        .with_context(|| format!("failed to read source image {}", source_path.display()))?;
    tracing::info!(
        "Processing {} ({} bytes)",
        source_path.display(),
        bytes.len()
    );

    let source = tokio::task::spawn_blocking(move || logo_processor::decode_source(&bytes))
        .await
        .context("decode task failed")??;

    let specs = resolve_formats(catalog, requested);
    if specs.is_empty() {
        bail!("no formats to render");
    }

    let report = render_batch(
        Arc::new(source),
        specs,
        config.render_options(),
        config.max_parallel,
    )
    .await;

    if report.rendered.is_empty() {
        bail!("none of the {} requested formats could be rendered", report.failed.len());
    }

    export_batch(&config.output_dir, &report).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("logocraft-job-{}", uuid::Uuid::new_v4()))
    }

    fn write_logo(dir: &Path) -> PathBuf {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(80, 40, |x, _| {
            if x < 40 {
                Rgba([20, 20, 20, 255])
            } else {
                Rgba([255, 0, 0, 0])
            }
        }));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join("logo.png");
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_resolve_all_when_none_requested() {
        let catalog = FormatCatalog::builtin();
        assert_eq!(resolve_formats(&catalog, &[]).len(), catalog.len());
    }

    #[test]
    fn test_resolve_dedups_and_falls_back() {
        let catalog = FormatCatalog::builtin();
        let requested = vec![
            "RPTlogo.bmp".to_string(),
            "unknown.png".to_string(),
            "RPTlogo.bmp".to_string(),
        ];
        let specs = resolve_formats(&catalog, &requested);
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[1], FormatSpec::new("unknown.png", 300, 300));
    }

    #[tokio::test]
    async fn test_end_to_end_export() {
        let dir = temp_dir();
        let source = write_logo(&dir);
        let config = AppConfig {
            output_dir: dir.join("out"),
            max_parallel: 2,
            ..AppConfig::default()
        };
        let requested = vec!["RPTlogo.bmp".to_string(), "KDlogo.png".to_string()];

        let manifest = process_source(&config, &FormatCatalog::builtin(), &source, &requested)
            .await
            .unwrap();

        assert_eq!(manifest.processed_images.len(), 2);
        assert!(manifest.failed_images.is_empty());
        let bmp = std::fs::read(dir.join("out").join("RPTlogo.bmp")).unwrap();
        assert_eq!(bmp.len(), 1822);
        assert_eq!(&bmp[..2], b"BM");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_undecodable_source_fails() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let source = dir.join("junk.png");
        std::fs::write(&source, b"not an image").unwrap();
        let config = AppConfig {
            output_dir: dir.join("out"),
            ..AppConfig::default()
        };

        let err = process_source(&config, &FormatCatalog::builtin(), &source, &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("decode"));
        assert!(!dir.join("out").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
