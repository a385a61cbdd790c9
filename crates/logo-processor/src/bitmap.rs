//! Single-channel intermediate buffer handed from the binarize stage to the
//! BMP encoder.

use image::GrayImage;

use crate::{ProcessError, Result};

/// Top-down, row-major 8-bit grayscale pixels, one byte per pixel.
///
/// `pixels.len() == width * height` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl GrayscaleBitmap {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ProcessError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(ProcessError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Bitmap with every pixel set to `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Result<Self> {
        let len = width as usize * height as usize;
        Self::new(width, height, vec![value; len])
    }

    pub fn from_gray_image(img: GrayImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, u8> {
        self.pixels.chunks_exact(self.width as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// True when every pixel is pure black or pure white.
    pub fn is_binary(&self) -> bool {
        self.pixels.iter().all(|&p| p == 0 || p == 255)
    }
}
