//! Runtime application configuration loaded from the environment.

use std::path::PathBuf;

use anyhow::Context;
use format_catalog::FormatCatalog;
use logo_processor::{DEFAULT_THRESHOLD, RenderOptions};

use super::validation::validate_setting;

const DEFAULT_OUTPUT_DIR: &str = "logocraft_exports";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub threshold: u8,
    pub dither: bool,
    pub output_dir: PathBuf,
    /// JSON catalog overriding the built-in one.
    pub catalog_path: Option<PathBuf>,
    pub max_parallel: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            dither: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            catalog_path: None,
            max_parallel: default_parallelism(),
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn load() -> Self {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration through `get`. Invalid values are logged and
    /// replaced by their defaults.
    pub fn load_with(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let g = |key: &str| -> Option<String> {
            let value = get(key)?;
            match validate_setting(key, &value) {
                Ok(()) => Some(value.trim().to_string()),
                Err(e) => {
                    tracing::warn!("Ignoring invalid {key}={value:?}: {e}");
                    None
                }
            }
        };

        Self {
            threshold: g("LOGOCRAFT_THRESHOLD")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.threshold),
            dither: g("LOGOCRAFT_DITHER").map_or(defaults.dither, |v| v == "true"),
            output_dir: g("LOGOCRAFT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            catalog_path: g("LOGOCRAFT_CATALOG").map(PathBuf::from),
            max_parallel: g("LOGOCRAFT_MAX_PARALLEL")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_parallel),
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::new()
            .with_threshold(self.threshold)
            .with_dither(self.dither)
    }

    /// The configured catalog file, or the built-in catalog.
    pub fn load_catalog(&self) -> Result<FormatCatalog, anyhow::Error> {
        let Some(path) = &self.catalog_path else {
            return Ok(FormatCatalog::builtin());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        let catalog = FormatCatalog::from_json(&json)
            .with_context(|| format!("invalid catalog {}", path.display()))?;
        tracing::info!(
            "Loaded {} formats from catalog {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get().min(64))
}
