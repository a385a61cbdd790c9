//! PNG path for every non-BMP format.

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba};
use tracing::debug;

use crate::fit::fit_contain;
use crate::{ProcessError, Result};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Fit `source` inside `width × height` on a transparent canvas and encode it
/// as an RGBA PNG.
pub fn encode_png(source: &DynamicImage, width: u32, height: u32) -> Result<Vec<u8>> {
    let canvas = fit_contain(&source.to_rgba8(), width, height, TRANSPARENT)?;

    let mut bytes = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut bytes, CompressionType::Best, FilterType::Adaptive);
    encoder
        .write_image(canvas.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(ProcessError::Encode)?;

    debug!(width, height, size = bytes.len(), "Encoded PNG");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageFormat, RgbImage};

    #[test]
    fn test_png_has_target_dimensions() {
        let src = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 20, image::Rgb([200, 0, 0])));
        let bytes = encode_png(&src, 136, 136).unwrap();

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!(decoded.dimensions(), (136, 136));
    }

    #[test]
    fn test_png_padding_is_transparent() {
        let src = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 10, image::Rgb([0, 0, 255])));
        let bytes = encode_png(&src, 40, 40).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0)[3], 0);
        assert_eq!(*decoded.get_pixel(20, 20), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_png_rejects_zero_dimensions() {
        let src = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        assert!(matches!(
            encode_png(&src, 0, 4),
            Err(ProcessError::InvalidDimensions { .. })
        ));
    }
}
