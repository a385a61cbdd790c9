//! Logo variant rendering.
//!
//! Turns a decoded source logo into the raster variants listed in a
//! [`format_catalog::FormatCatalog`]: 1-bit monochrome BMPs for thermal
//! printers and legacy loaders, and RGBA PNGs for everything else.

pub mod bitmap;
pub mod bmp;
pub mod fit;
pub mod png;
pub mod render;
pub mod threshold;

// Re-exports for convenience
pub use bitmap::GrayscaleBitmap;
pub use bmp::{BmpLayout, encode_monochrome_bmp};
pub use fit::{fit_contain, flatten_onto_white};
pub use png::encode_png;
pub use render::{RenderOptions, RenderedImage, decode_source, render_format};
pub use threshold::{binarize, binarize_dithered, floyd_steinberg_dither, threshold_convert};

/// Luminance cut point used to binarize logos: pixels at or above this value
/// become white, everything below becomes black.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Errors that can occur while rendering a logo variant.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Failed to decode source image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("BMP size mismatch: computed {expected} bytes, wrote {actual}")]
    EncodingInvariant { expected: usize, actual: usize },

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessError>;
