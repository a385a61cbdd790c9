//! Writes a rendered batch to an output directory together with a
//! `manifest.json` describing every produced (and failed) format.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::batch::BatchReport;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Manifest entry for one written image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedImage {
    pub name: String,
    pub content_type: String,
    /// Human-readable size, e.g. `155×110`.
    pub size: String,
    pub dimensions: Dimensions,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedImage {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub processed_images: Vec<ProcessedImage>,
    pub failed_images: Vec<FailedImage>,
}

/// File name for a format key, or `None` if the key cannot be used as a
/// plain file name inside the output directory.
pub fn output_file_name(key: &str) -> Option<String> {
    let name: String = key
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    if name.is_empty() || name.chars().all(|c| c == '.') {
        return None;
    }
    Some(name)
}

/// Write every rendered image into `dir` (created if missing) and a manifest
/// listing them. Returns the manifest.
pub async fn export_batch(dir: &Path, report: &BatchReport) -> anyhow::Result<Manifest> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let mut manifest = Manifest::default();
    let mut used_names = HashSet::from([MANIFEST_FILE.to_string()]);
    for (key, image) in &report.rendered {
        let Some(file_name) = output_file_name(key) else {
            tracing::warn!("Format key {key:?} is not a usable file name, skipping");
            manifest.failed_images.push(FailedImage {
                name: key.clone(),
                error: "format key is not a valid file name".into(),
            });
            continue;
        };
        if !used_names.insert(file_name.clone()) {
            tracing::warn!("Format key {key:?} maps to {file_name}, which is already written");
            manifest.failed_images.push(FailedImage {
                name: key.clone(),
                error: format!("file name {file_name} is already used by another format"),
            });
            continue;
        }

        let path: PathBuf = dir.join(&file_name);
        tokio::fs::write(&path, &image.bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!("Wrote {} ({} bytes)", path.display(), image.bytes.len());

        manifest.processed_images.push(ProcessedImage {
            name: file_name,
            content_type: image.content_type().to_string(),
            size: image.size_label(),
            dimensions: Dimensions {
                width: image.width,
                height: image.height,
            },
            bytes: image.bytes.len(),
        });
    }

    manifest
        .failed_images
        .extend(report.failed.iter().map(|(key, error)| FailedImage {
            name: key.clone(),
            error: error.clone(),
        }));

    let manifest_path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_vec_pretty(&manifest)?;
    tokio::fs::write(&manifest_path, json)
        .await
        .with_context(|| format!("failed to write {}", manifest_path.display()))?;

    tracing::info!(
        "Exported {} images to {} ({} failed)",
        manifest.processed_images.len(),
        dir.display(),
        manifest.failed_images.len()
    );
    Ok(manifest)
}
