//! Output format catalog: maps a format key (the output file name) to the
//! pixel dimensions of the variant to render.
//!
//! The catalog is read-only once built and is handed to the renderer, so the
//! processing code never hard-codes any dimensions.

mod builtin;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Dimensions used for keys that are not present in the catalog.
pub const FALLBACK_WIDTH: u32 = 300;
pub const FALLBACK_HEIGHT: u32 = 300;

/// Errors that can occur while building a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to parse catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid catalog entry '{key}': width and height must be non-zero")]
    InvalidEntry { key: String },
}

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Target dimensions for a single output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatSpec {
    pub format_key: String,
    pub width: u32,
    pub height: u32,
}

impl FormatSpec {
    pub fn new(format_key: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            format_key: format_key.into(),
            width,
            height,
        }
    }

    /// Output kind derived from the key's extension.
    pub fn kind(&self) -> OutputKind {
        OutputKind::from_key(&self.format_key)
    }
}

/// Encoded representation of an output variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// 1-bit monochrome Windows bitmap.
    Bmp,
    /// RGBA PNG.
    Png,
}

impl OutputKind {
    /// Keys ending in `.bmp` are bitmaps; everything else is PNG.
    ///
    /// The extension is compared case-insensitively, so `LOGO.BMP` also
    /// renders as a bitmap. A plain case-sensitive `.bmp` suffix check would
    /// send such keys down the PNG path instead.
    pub fn from_key(key: &str) -> Self {
        let is_bmp = key
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("bmp"));
        if is_bmp { Self::Bmp } else { Self::Png }
    }

    /// Content-type tag used to label the produced bytes.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Bmp => "image/bmp",
            Self::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Bmp => "bmp",
            Self::Png => "png",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Dimensions {
    width: u32,
    height: u32,
}

/// Read-only mapping of format key to target dimensions.
#[derive(Debug, Clone, Default)]
pub struct FormatCatalog {
    entries: BTreeMap<String, Dimensions>,
}

impl FormatCatalog {
    /// The catalog shipped with the application.
    pub fn builtin() -> Self {
        let entries = builtin::ENTRIES
            .iter()
            .map(|&(key, width, height)| (key.to_string(), Dimensions { width, height }))
            .collect();
        Self { entries }
    }

    /// Build a catalog from `(key, width, height)` triples.
    pub fn from_entries<I, K>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, u32, u32)>,
        K: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (key, width, height) in entries {
            let key = key.into();
            if width == 0 || height == 0 {
                return Err(CatalogError::InvalidEntry { key });
            }
            map.insert(key, Dimensions { width, height });
        }
        Ok(Self { entries: map })
    }

    /// Parse a catalog from a JSON object of the form
    /// `{"RPTlogo.bmp": {"width": 155, "height": 110}, ...}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Dimensions> = serde_json::from_str(json)?;
        debug!(entries = raw.len(), "Parsed format catalog from JSON");
        Self::from_entries(raw.into_iter().map(|(k, d)| (k, d.width, d.height)))
    }

    /// Look up a key, without fallback.
    pub fn get(&self, key: &str) -> Option<FormatSpec> {
        self.entries
            .get(key)
            .map(|d| FormatSpec::new(key, d.width, d.height))
    }

    /// Look up a key, falling back to 300×300 for unknown keys.
    pub fn lookup(&self, key: &str) -> FormatSpec {
        self.get(key).unwrap_or_else(|| {
            debug!(key, "Unknown format key, using fallback dimensions");
            FormatSpec::new(key, FALLBACK_WIDTH, FALLBACK_HEIGHT)
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
