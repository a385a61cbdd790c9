//! Concurrent rendering of many formats from one source image.
//!
//! Each format is rendered independently on the blocking pool; a failure in
//! one format is recorded and never stops the others. Results are keyed by
//! format, so completion order does not matter.

use std::collections::BTreeMap;
use std::sync::Arc;

use format_catalog::FormatSpec;
use image::DynamicImage;
use logo_processor::{ProcessError, RenderOptions, RenderedImage, render_format};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Outcome of a batch: rendered images and per-format failures.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub rendered: BTreeMap<String, RenderedImage>,
    pub failed: BTreeMap<String, String>,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty() && self.failed.is_empty()
    }

    /// Record every key in `keys` that has neither an image nor a failure as
    /// a failed render, so each requested format appears in the report.
    pub fn account_for<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) {
        for key in keys {
            if !self.rendered.contains_key(key) && !self.failed.contains_key(key) {
                tracing::error!("No result for {key}, marking it as failed");
                self.failed
                    .insert(key.to_string(), "render task failed".to_string());
            }
        }
    }
}

/// Render every spec in `specs`, at most `max_parallel` at a time.
pub async fn render_batch(
    source: Arc<DynamicImage>,
    specs: Vec<FormatSpec>,
    options: RenderOptions,
    max_parallel: usize,
) -> BatchReport {
    let semaphore = Arc::new(Semaphore::new(max_parallel.max(1)));
    let mut tasks = JoinSet::new();
    let requested: Vec<String> = specs.iter().map(|s| s.format_key.clone()).collect();

    for spec in specs {
        let source = Arc::clone(&source);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            // The semaphore is never closed, so acquiring cannot fail.
            let _permit = semaphore.acquire_owned().await.ok();
            let key = spec.format_key.clone();
            let result =
                tokio::task::spawn_blocking(move || render_format(&source, &spec, &options)).await;
            (key, result)
        });
    }

    let mut report = BatchReport::default();
    while let Some(joined) = tasks.join_next().await {
        let (key, result) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                // The key is lost with the task; `account_for` below reports it.
                tracing::error!("Render task failed: {e}");
                continue;
            }
        };

        match result {
            Ok(Ok(image)) => {
                tracing::info!(
                    "Rendered {key} ({}, {} bytes)",
                    image.size_label(),
                    image.bytes.len()
                );
                report.rendered.insert(key, image);
            }
            Ok(Err(e)) => {
                if matches!(e, ProcessError::EncodingInvariant { .. }) {
                    tracing::error!("Encoder defect while rendering {key}: {e}");
                } else {
                    tracing::warn!("Skipping {key}: {e}");
                }
                report.failed.insert(key, e.to_string());
            }
            Err(e) => {
                tracing::error!("Render of {key} panicked: {e}");
                report.failed.insert(key, format!("render task failed: {e}"));
            }
        }
    }

    report.account_for(requested.iter().map(String::as_str));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use format_catalog::FormatCatalog;
    use image::{GrayImage, Luma};

    fn source() -> Arc<DynamicImage> {
        Arc::new(DynamicImage::ImageLuma8(GrayImage::from_fn(50, 30, |x, _| {
            Luma([if x < 25 { 0 } else { 255 }])
        })))
    }

    #[tokio::test]
    async fn test_renders_all_requested_formats() {
        let catalog = FormatCatalog::builtin();
        let specs = ["RPTlogo.bmp", "PRINTLOGO.bmp", "Logo.png", "hpns.png"]
            .iter()
            .map(|k| catalog.lookup(k))
            .collect();

        let report = render_batch(source(), specs, RenderOptions::default(), 2).await;

        assert!(report.failed.is_empty());
        let keys: Vec<&str> = report.rendered.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Logo.png", "PRINTLOGO.bmp", "RPTlogo.bmp", "hpns.png"]);
        assert_eq!(report.rendered["RPTlogo.bmp"].bytes.len(), 1822);
        assert_eq!(report.rendered["hpns.png"].content_type(), "image/png");
    }

    #[tokio::test]
    async fn test_failed_format_does_not_stop_others() {
        let specs = vec![
            FormatSpec::new("broken.bmp", 0, 10),
            FormatSpec::new("RPTlogo.bmp", 155, 110),
        ];

        let report = render_batch(source(), specs, RenderOptions::default(), 1).await;

        assert_eq!(report.rendered.len(), 1);
        assert!(report.rendered.contains_key("RPTlogo.bmp"));
        assert!(report.failed["broken.bmp"].contains("Invalid dimensions"));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let report = render_batch(source(), Vec::new(), RenderOptions::default(), 4).await;
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_every_requested_format_is_reported() {
        let specs = vec![
            FormatSpec::new("RPTlogo.bmp", 155, 110),
            FormatSpec::new("huge.bmp", 70_000, 500_000),
            FormatSpec::new("empty.png", 10, 0),
        ];

        let report = render_batch(source(), specs, RenderOptions::default(), 3).await;

        assert_eq!(report.rendered.len() + report.failed.len(), 3);
        assert!(report.rendered.contains_key("RPTlogo.bmp"));
        assert!(report.failed.contains_key("huge.bmp"));
        assert!(report.failed.contains_key("empty.png"));
    }

    #[test]
    fn test_account_for_marks_missing_keys_failed() {
        let mut report = BatchReport::default();
        report.failed.insert("bad.bmp".into(), "Invalid dimensions: 0x1".into());

        report.account_for(["bad.bmp", "lost.png"]);

        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed["bad.bmp"], "Invalid dimensions: 0x1");
        assert_eq!(report.failed["lost.png"], "render task failed");
        assert!(report.rendered.is_empty());
    }
}
