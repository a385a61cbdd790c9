//! Alpha flattening and "contain" fitting onto a fixed-size canvas.

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Pixel, Rgb, RgbImage, Rgba};
use tracing::debug;

use crate::{ProcessError, Result};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Composite the image onto an opaque white background.
///
/// Fully transparent pixels become white; partially transparent pixels are
/// blended with white. Images without alpha are only converted to RGB.
pub fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    debug!(width, height, "Flattening alpha onto white");

    let mut output = RgbImage::new(width, height);
    for (x, y, pixel) in rgba.enumerate_pixels() {
        output.put_pixel(x, y, blend_over_white(pixel));
    }
    output
}

fn blend_over_white(fg: &Rgba<u8>) -> Rgb<u8> {
    let alpha = f32::from(fg[3]) / 255.0;
    let inv = 1.0 - alpha;
    let mix = |c: u8| (f32::from(c) * alpha + 255.0 * inv).round() as u8;
    Rgb([mix(fg[0]), mix(fg[1]), mix(fg[2])])
}

/// Size of the source once scaled to fit inside the target box with its
/// aspect ratio preserved. Both sides are at least 1 and never exceed the box.
pub fn contain_dimensions(src: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = src;
    let (box_w, box_h) = target;

    let ratio = f64::min(
        f64::from(box_w) / f64::from(src_w),
        f64::from(box_h) / f64::from(src_h),
    );
    let w = (f64::from(src_w) * ratio).round() as u32;
    let h = (f64::from(src_h) * ratio).round() as u32;
    (w.clamp(1, box_w), h.clamp(1, box_h))
}

/// Scale `img` to fit entirely inside `width × height`, centre it, and fill
/// the remaining canvas with `background`. Nothing is cropped.
pub fn fit_contain<P>(
    img: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
    background: P,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    if width == 0 || height == 0 {
        return Err(ProcessError::InvalidDimensions { width, height });
    }
    let (src_w, src_h) = img.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(ProcessError::InvalidDimensions {
            width: src_w,
            height: src_h,
        });
    }

    let (fit_w, fit_h) = contain_dimensions((src_w, src_h), (width, height));
    debug!(
        src_w,
        src_h,
        fit_w,
        fit_h,
        canvas_w = width,
        canvas_h = height,
        "Fitting image onto canvas"
    );

    let mut canvas = ImageBuffer::from_pixel(width, height, background);
    let x = i64::from((width - fit_w) / 2);
    let y = i64::from((height - fit_h) / 2);

    if (fit_w, fit_h) == (src_w, src_h) {
        debug!("Image already at fitted size, skipping resize");
        imageops::replace(&mut canvas, img, x, y);
    } else {
        let scaled = imageops::resize(img, fit_w, fit_h, FilterType::Lanczos3);
        imageops::replace(&mut canvas, &scaled, x, y);
    }

    Ok(canvas)
}

/// [`fit_contain`] on a white RGB canvas.
pub fn fit_contain_white(img: &RgbImage, width: u32, height: u32) -> Result<RgbImage> {
    fit_contain(img, width, height, WHITE)
}
