//! Binarization: converts a source image into a pure black/white
//! [`GrayscaleBitmap`] at the requested size.

use image::{DynamicImage, GrayImage, Luma, imageops};
use tracing::debug;

use crate::bitmap::GrayscaleBitmap;
use crate::fit::{fit_contain_white, flatten_onto_white};
use crate::{ProcessError, Result};

/// Flatten, fit, grayscale and threshold `source` into a
/// `target_width × target_height` bitmap whose pixels are all 0 or 255.
pub fn binarize(
    source: &DynamicImage,
    target_width: u32,
    target_height: u32,
    threshold: u8,
) -> Result<GrayscaleBitmap> {
    let gray = prepare_gray(source, target_width, target_height)?;
    GrayscaleBitmap::from_gray_image(threshold_convert(&gray, threshold))
}

/// Like [`binarize`], but diffuses quantization error instead of cutting hard.
pub fn binarize_dithered(
    source: &DynamicImage,
    target_width: u32,
    target_height: u32,
    threshold: u8,
) -> Result<GrayscaleBitmap> {
    let gray = prepare_gray(source, target_width, target_height)?;
    GrayscaleBitmap::from_gray_image(floyd_steinberg_dither(&gray, threshold))
}

fn prepare_gray(source: &DynamicImage, width: u32, height: u32) -> Result<GrayImage> {
    if width == 0 || height == 0 {
        return Err(ProcessError::InvalidDimensions { width, height });
    }
    let flat = flatten_onto_white(source);
    let fitted = fit_contain_white(&flat, width, height)?;
    Ok(imageops::grayscale(&fitted))
}

/// Pixels with values >= `threshold` become white (255), others become black (0).
pub fn threshold_convert(img: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = img.dimensions();
    debug!(width, height, threshold, "Applying threshold conversion");

    let mut output = img.clone();
    for pixel in output.pixels_mut() {
        pixel.0[0] = if pixel.0[0] >= threshold { 255 } else { 0 };
    }
    output
}

/// Floyd-Steinberg error-diffusion dithering.
///
/// Error distribution pattern:
/// - Right:        7/16
/// - Bottom-left:  3/16
/// - Bottom:       5/16
/// - Bottom-right: 1/16
pub fn floyd_steinberg_dither(img: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = img.dimensions();
    debug!(width, height, threshold, "Applying Floyd-Steinberg dithering");

    let (w, h) = (width as usize, height as usize);
    // i16 so diffused error can leave 0..=255 without wrapping
    let mut buffer: Vec<i16> = img.as_raw().iter().map(|&v| i16::from(v)).collect();

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let old = buffer[idx];
            let new = if old >= i16::from(threshold) { 255 } else { 0 };
            let error = old - new;
            buffer[idx] = new;

            if x + 1 < w {
                buffer[idx + 1] += error * 7 / 16;
            }
            if y + 1 < h {
                let below = idx + w;
                if x > 0 {
                    buffer[below - 1] += error * 3 / 16;
                }
                buffer[below] += error * 5 / 16;
                if x + 1 < w {
                    buffer[below + 1] += error / 16;
                }
            }
        }
    }

    let mut output = GrayImage::new(width, height);
    for (pixel, &val) in output.pixels_mut().zip(&buffer) {
        *pixel = Luma([val.clamp(0, 255) as u8]);
    }
    output
}
