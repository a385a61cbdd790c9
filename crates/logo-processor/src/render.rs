//! Per-format rendering entry point.

use format_catalog::{FormatSpec, OutputKind};
use image::DynamicImage;
use tracing::debug;

use crate::bmp::{BmpLayout, encode_monochrome_bmp};
use crate::png::encode_png;
use crate::threshold::{binarize, binarize_dithered};
use crate::{DEFAULT_THRESHOLD, ProcessError, Result};

/// Options applied to every rendered variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Luminance cut point for monochrome output.
    pub threshold: u8,

    /// Use error-diffusion dithering instead of a hard threshold for BMPs.
    pub dither: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            dither: false,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the binarization threshold.
    pub fn with_threshold(mut self, val: u8) -> Self {
        self.threshold = val;
        self
    }

    /// Builder: set dither flag.
    pub fn with_dither(mut self, val: bool) -> Self {
        self.dither = val;
        self
    }
}

/// One encoded output variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub format_key: String,
    pub kind: OutputKind,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl RenderedImage {
    pub fn content_type(&self) -> &'static str {
        self.kind.content_type()
    }

    /// Dimensions as shown to users, e.g. `155×110`.
    pub fn size_label(&self) -> String {
        format!("{}×{}", self.width, self.height)
    }
}

/// Decode uploaded bytes, guessing the format from their content.
pub fn decode_source(bytes: &[u8]) -> Result<DynamicImage> {
    let img = image::load_from_memory(bytes).map_err(ProcessError::Decode)?;
    debug!(
        width = img.width(),
        height = img.height(),
        color = ?img.color(),
        "Decoded source image"
    );
    Ok(img)
}

/// Render `source` for a single catalog entry.
pub fn render_format(
    source: &DynamicImage,
    spec: &FormatSpec,
    options: &RenderOptions,
) -> Result<RenderedImage> {
    let kind = spec.kind();
    debug!(
        format = %spec.format_key,
        width = spec.width,
        height = spec.height,
        ?kind,
        "Rendering format"
    );

    let bytes = match kind {
        OutputKind::Bmp => {
            // Reject sizes the BMP headers cannot hold before allocating a canvas.
            BmpLayout::for_dimensions(spec.width, spec.height)?;
            let bitmap = if options.dither {
                binarize_dithered(source, spec.width, spec.height, options.threshold)?
            } else {
                binarize(source, spec.width, spec.height, options.threshold)?
            };
            encode_monochrome_bmp(&bitmap)?
        }
        OutputKind::Png => encode_png(source, spec.width, spec.height)?,
    };

    Ok(RenderedImage {
        format_key: spec.format_key.clone(),
        kind,
        width: spec.width,
        height: spec.height,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use format_catalog::FormatCatalog;
    use image::{ImageFormat, Luma, Rgba, RgbaImage};
    use std::io::Cursor;

    fn logo() -> DynamicImage {
        // Black disc on transparent background.
        DynamicImage::ImageRgba8(RgbaImage::from_fn(64, 48, |x, y| {
            let (dx, dy) = (x as i32 - 32, y as i32 - 24);
            if dx * dx + dy * dy < 400 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        }))
    }

    #[test]
    fn test_rptlogo_renders_1822_byte_bmp() {
        let catalog = FormatCatalog::builtin();
        let spec = catalog.lookup("RPTlogo.bmp");
        let out = render_format(&logo(), &spec, &RenderOptions::default()).unwrap();

        assert_eq!(out.kind, OutputKind::Bmp);
        assert_eq!(out.content_type(), "image/bmp");
        assert_eq!(out.bytes.len(), 1822);
        assert_eq!(out.size_label(), "155×110");
    }

    #[test]
    fn test_all_white_printlogo_is_all_white() {
        let src = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(300, 128, Luma([255])));
        let spec = FormatCatalog::builtin().lookup("PRINTLOGO.bmp");
        let out = render_format(&src, &spec, &RenderOptions::default()).unwrap();

        let decoded = image::load_from_memory_with_format(&out.bytes, ImageFormat::Bmp)
            .unwrap()
            .to_luma8();
        assert_eq!(decoded.dimensions(), (600, 256));
        assert!(decoded.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_bmp_render_keeps_the_logo_black() {
        let spec = FormatSpec::new("disc.bmp", 64, 48);
        let out = render_format(&logo(), &spec, &RenderOptions::default()).unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap().to_luma8();
        assert_eq!(decoded.get_pixel(32, 24).0[0], 0);
        assert_eq!(decoded.get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn test_png_keys_render_png() {
        let spec = FormatCatalog::builtin().lookup("KDlogo.png");
        let out = render_format(&logo(), &spec, &RenderOptions::default()).unwrap();

        assert_eq!(out.content_type(), "image/png");
        assert_eq!(image::guess_format(&out.bytes).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (140, 112));
    }

    #[test]
    fn test_dithered_render_is_same_size() {
        let spec = FormatSpec::new("RPTlogo.bmp", 155, 110);
        let options = RenderOptions::new().with_dither(true).with_threshold(175);
        let out = render_format(&logo(), &spec, &options).unwrap();
        assert_eq!(out.bytes.len(), 1822);
    }

    #[test]
    fn test_oversize_bmp_spec_is_rejected_before_rendering() {
        let src = DynamicImage::ImageLuma8(image::GrayImage::new(4, 4));
        // 8752-byte rows * 500_000 rows overflows the 32-bit file size field.
        let spec = FormatSpec::new("huge.bmp", 70_000, 500_000);
        assert!(matches!(
            render_format(&src, &spec, &RenderOptions::default()),
            Err(ProcessError::InvalidDimensions {
                width: 70_000,
                height: 500_000
            })
        ));

        let spec = FormatSpec::new("wide.bmp", u32::MAX, 1);
        assert!(matches!(
            render_format(&src, &spec, &RenderOptions::new().with_dither(true)),
            Err(ProcessError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_zero_dimension_spec_is_rejected() {
        let spec = FormatSpec::new("bad.bmp", 0, 10);
        assert!(matches!(
            render_format(&logo(), &spec, &RenderOptions::default()),
            Err(ProcessError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_decode_source_accepts_png() {
        let mut bytes = Vec::new();
        logo()
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        let img = decode_source(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (64, 48));
    }

    #[test]
    fn test_decode_source_rejects_garbage() {
        assert!(matches!(
            decode_source(b"definitely not an image"),
            Err(ProcessError::Decode(_))
        ));
    }

    #[test]
    fn test_options_builder() {
        let opts = RenderOptions::new().with_threshold(175).with_dither(true);
        assert_eq!(opts.threshold, 175);
        assert!(opts.dither);
        assert_eq!(RenderOptions::default().threshold, 128);
    }
}
