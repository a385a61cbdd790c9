//! Monochrome (1 bit per pixel) Windows BMP encoder.
//!
//! File layout:
//!
//! | Offset | Size | Section                                  |
//! |--------|------|------------------------------------------|
//! | 0      | 14   | `BITMAPFILEHEADER`                       |
//! | 14     | 40   | `BITMAPINFOHEADER`                       |
//! | 54     | 8    | palette: black, white (BGRA, alpha 0)    |
//! | 62     | ...  | packed rows, bottom-up, 4-byte aligned   |
//!
//! Bits are packed MSB-first; bit 0 selects palette entry 0 (black) and
//! bit 1 selects entry 1 (white).

use tracing::{debug, error};

use crate::bitmap::GrayscaleBitmap;
use crate::{ProcessError, Result};

pub const FILE_HEADER_SIZE: u32 = 14;
pub const INFO_HEADER_SIZE: u32 = 40;
pub const PALETTE_SIZE: u32 = 8;
pub const PIXEL_DATA_OFFSET: u32 = FILE_HEADER_SIZE + INFO_HEADER_SIZE + PALETTE_SIZE;

/// Resolution the target thermal printers print at.
pub const PRINTER_DPI: u32 = 203;
/// `PRINTER_DPI` converted to pixels per meter, rounded.
pub const PIXELS_PER_METER: i32 = 7992;

/// Source bytes below this become bit 0 (black).
const BIT_CUTOFF: u8 = 128;

const BITS_PER_PIXEL: u16 = 1;
const COMPRESSION_NONE: u32 = 0;
const PALETTE_COLORS: u32 = 2;

/// Pixels-per-meter for a given DPI, rounded to the nearest integer.
pub fn pixels_per_meter(dpi: u32) -> i32 {
    (f64::from(dpi) / 0.0254).round() as i32
}

/// Sizes and strides of a monochrome BMP with the given dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpLayout {
    pub width: u32,
    pub height: u32,
    /// `ceil(width / 8)`
    pub row_stride_unpadded: usize,
    /// `row_stride_unpadded` rounded up to a multiple of 4.
    pub row_stride_padded: usize,
    pub pixel_data_size: usize,
    pub file_size: usize,
}

impl BmpLayout {
    pub fn for_dimensions(width: u32, height: u32) -> Result<Self> {
        // Both sides are written as signed 32-bit header fields.
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(ProcessError::InvalidDimensions { width, height });
        }

        let row_stride_unpadded = (width as usize).div_ceil(8);
        let row_stride_padded = row_stride_unpadded.div_ceil(4) * 4;
        let pixel_data_size = row_stride_padded
            .checked_mul(height as usize)
            .ok_or(ProcessError::InvalidDimensions { width, height })?;
        let file_size = pixel_data_size
            .checked_add(PIXEL_DATA_OFFSET as usize)
            .filter(|&size| u32::try_from(size).is_ok())
            .ok_or(ProcessError::InvalidDimensions { width, height })?;

        Ok(Self {
            width,
            height,
            row_stride_unpadded,
            row_stride_padded,
            pixel_data_size,
            file_size,
        })
    }

    pub fn padding_per_row(&self) -> usize {
        self.row_stride_padded - self.row_stride_unpadded
    }
}

/// `BITMAPFILEHEADER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BmpFileHeader {
    file_size: u32,
    pixel_data_offset: u32,
}

impl BmpFileHeader {
    const SIGNATURE: [u8; 2] = *b"BM";

    fn write_to(&self, w: &mut ByteWriter<'_>) -> Result<()> {
        w.put(&Self::SIGNATURE)?;
        w.put_u32(self.file_size)?;
        w.put_u32(0)?; // reserved
        w.put_u32(self.pixel_data_offset)
    }
}

/// `BITMAPINFOHEADER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BmpInfoHeader {
    width: i32,
    /// Positive: rows are stored bottom-up.
    height: i32,
    image_size: u32,
    x_pixels_per_meter: i32,
    y_pixels_per_meter: i32,
    colors_used: u32,
}

impl BmpInfoHeader {
    fn write_to(&self, w: &mut ByteWriter<'_>) -> Result<()> {
        w.put_u32(INFO_HEADER_SIZE)?;
        w.put_i32(self.width)?;
        w.put_i32(self.height)?;
        w.put_u16(1)?; // planes
        w.put_u16(BITS_PER_PIXEL)?;
        w.put_u32(COMPRESSION_NONE)?;
        w.put_u32(self.image_size)?;
        w.put_i32(self.x_pixels_per_meter)?;
        w.put_i32(self.y_pixels_per_meter)?;
        w.put_u32(self.colors_used)?;
        w.put_u32(0) // important colors: all
    }
}

/// Two-entry color table, stored as little-endian BGRA with alpha unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Palette {
    entries: [[u8; 4]; 2],
}

impl Palette {
    const BLACK_WHITE: Self = Self {
        entries: [[0x00, 0x00, 0x00, 0x00], [0xFF, 0xFF, 0xFF, 0x00]],
    };

    fn write_to(&self, w: &mut ByteWriter<'_>) -> Result<()> {
        for entry in &self.entries {
            w.put(entry)?;
        }
        Ok(())
    }
}

/// Sequential writer over a pre-sized, zeroed buffer. Writing past the end is
/// reported as an encoding invariant violation instead of panicking.
struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self.pos + bytes.len();
        let expected = self.buf.len();
        let dst = self
            .buf
            .get_mut(self.pos..end)
            .ok_or(ProcessError::EncodingInvariant {
                expected,
                actual: end,
            })?;
        dst.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn put_u16(&mut self, v: u16) -> Result<()> {
        self.put(&v.to_le_bytes())
    }

    fn put_u32(&mut self, v: u32) -> Result<()> {
        self.put(&v.to_le_bytes())
    }

    fn put_i32(&mut self, v: i32) -> Result<()> {
        self.put(&v.to_le_bytes())
    }

    /// Advance over bytes that must stay zero.
    fn skip(&mut self, n: usize) -> Result<()> {
        let end = self.pos + n;
        if end > self.buf.len() {
            return Err(ProcessError::EncodingInvariant {
                expected: self.buf.len(),
                actual: end,
            });
        }
        self.pos = end;
        Ok(())
    }
}

/// Pack one source row into `out` (length `ceil(row.len() / 8)`), MSB-first.
fn pack_row(row: &[u8], out: &mut [u8]) {
    for (byte, chunk) in out.iter_mut().zip(row.chunks(8)) {
        *byte = chunk
            .iter()
            .enumerate()
            .filter(|&(_, &px)| px >= BIT_CUTOFF)
            .fold(0u8, |acc, (bit, _)| acc | (1 << (7 - bit)));
    }
}

/// Encode a binarized bitmap as a complete 1-bit BMP file.
pub fn encode_monochrome_bmp(bitmap: &GrayscaleBitmap) -> Result<Vec<u8>> {
    let layout = BmpLayout::for_dimensions(bitmap.width(), bitmap.height())?;
    debug!(
        width = layout.width,
        height = layout.height,
        row_stride = layout.row_stride_padded,
        file_size = layout.file_size,
        "Encoding monochrome BMP"
    );

    // Zeroed, so row padding needs no explicit writes.
    let mut out = vec![0u8; layout.file_size];
    let written = write_bmp(bitmap, &layout, &mut out).and_then(|written| {
        if written == layout.file_size {
            Ok(written)
        } else {
            Err(ProcessError::EncodingInvariant {
                expected: layout.file_size,
                actual: written,
            })
        }
    });

    match written {
        Ok(_) => Ok(out),
        Err(e) => {
            error!(
                width = layout.width,
                height = layout.height,
                "BMP encoding invariant violated: {e}"
            );
            Err(e)
        }
    }
}

fn write_bmp(bitmap: &GrayscaleBitmap, layout: &BmpLayout, out: &mut [u8]) -> Result<usize> {
    // for_dimensions already bounded these to the header field types.
    let file_header = BmpFileHeader {
        file_size: layout.file_size as u32,
        pixel_data_offset: PIXEL_DATA_OFFSET,
    };
    let info_header = BmpInfoHeader {
        width: layout.width as i32,
        height: layout.height as i32,
        image_size: layout.pixel_data_size as u32,
        x_pixels_per_meter: PIXELS_PER_METER,
        y_pixels_per_meter: PIXELS_PER_METER,
        colors_used: PALETTE_COLORS,
    };

    let mut w = ByteWriter::new(out);
    file_header.write_to(&mut w)?;
    info_header.write_to(&mut w)?;
    Palette::BLACK_WHITE.write_to(&mut w)?;

    // First stored row is the bottom of the image: source row y lands in
    // BMP row height-1-y.
    let mut packed = vec![0u8; layout.row_stride_unpadded];
    for row in bitmap.rows().rev() {
        pack_row(row, &mut packed);
        w.put(&packed)?;
        w.skip(layout.padding_per_row())?;
    }

    Ok(w.position())
}
