//! Loader for monochrome Windows bitmaps.
//!
//! Only uncompressed 1 bit images are supported, which is what most image editors write
//! when exporting "1-bit" or "monochrome" BMPs. The pixel data is streamed row by row in
//! small chunks, so images of any size can be loaded from flash or an SD card without a
//! second frame buffer.

use embedded_graphics_core::{geometry::Point, pixelcolor::BinaryColor};
use embedded_io::{Read, Seek, SeekFrom};

use crate::canvas::Canvas;
use crate::error::Error;
use crate::{HEIGHT, WIDTH};

/// Length of the header prefix that is parsed, up to and including the compression field.
pub const HEADER_LEN: usize = 34;

const CHUNK: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeader {
    /// file offset of the pixel data
    pub offset: u32,
    pub width: u32,
    /// positive for bottom-up files, negative for top-down ones
    pub height: i32,
    pub planes: u16,
    pub depth: u16,
    pub compression: u32,
}

#[inline]
fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

#[inline]
fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

impl BmpHeader {
    pub fn parse<E>(bytes: &[u8; HEADER_LEN]) -> Result<Self, Error<E>> {
        if &bytes[0..2] != b"BM" {
            return Err(Error::InvalidHeader);
        }
        Ok(BmpHeader {
            offset: u32_at(bytes, 10),
            width: u32_at(bytes, 18),
            height: u32_at(bytes, 22) as i32,
            planes: u16_at(bytes, 26),
            depth: u16_at(bytes, 28),
            compression: u32_at(bytes, 30),
        })
    }

    pub fn is_supported(&self) -> bool {
        self.planes == 1 && self.depth == 1 && self.compression == 0
    }

    pub fn rows(&self) -> u32 {
        self.height.unsigned_abs()
    }

    pub fn is_top_down(&self) -> bool {
        self.height < 0
    }

    /// bytes per row in the file, padded to 4 bytes
    pub fn stride(&self) -> u64 {
        ((u64::from(self.width) + 31) / 32) * 4
    }

    /// bytes per row holding whole pixels; a partial last byte is dropped
    pub fn row_bytes(&self) -> u32 {
        self.width / 8
    }

    /// Offset of the last pixel byte that is used, plus one.
    ///
    /// `None` if the header describes more data than a file can hold.
    pub fn data_end(&self) -> Option<u64> {
        match self.rows() {
            0 => Some(u64::from(self.offset)),
            rows => self
                .stride()
                .checked_mul(u64::from(rows - 1))?
                .checked_add(u64::from(self.offset))?
                .checked_add(u64::from(self.row_bytes())),
        }
    }

    /// row in the file holding row `row` of the image, counted from the top
    fn file_row(&self, row: u32) -> u32 {
        if self.is_top_down() {
            row
        } else {
            self.rows() - 1 - row
        }
    }
}

/// Decodes a monochrome BMP from `reader` into `canvas` at `origin`.
///
/// The image replaces whatever was under it, clipped to the canvas. With
/// `BinaryColor::On` dark image pixels become set pixels; `Off` keeps the raw bits, which
/// gives a negative. The stream is checked to hold all pixel data before the first pixel
/// is drawn, so the canvas is left alone on any error.
pub fn load<R, E>(
    canvas: &mut Canvas,
    reader: &mut R,
    origin: Point,
    color: BinaryColor,
) -> Result<BmpHeader, Error<E>>
where
    R: Read + Seek,
{
    let mut raw = [0u8; HEADER_LEN];
    reader.read_exact(&mut raw).map_err(Error::<E>::read)?;
    let header = BmpHeader::parse::<E>(&raw)?;

    if !header.is_supported() {
        log::warn!(
            "unsupported bitmap: planes {}, depth {}, compression {}",
            header.planes,
            header.depth,
            header.compression
        );
        return Err(Error::UnsupportedFormat {
            planes: header.planes,
            depth: header.depth,
            compression: header.compression,
        });
    }

    let data_end = header.data_end().ok_or(Error::<E>::InvalidHeader)?;
    let file_len = reader.seek(SeekFrom::End(0)).map_err(Error::<E>::io)?;
    if file_len < data_end {
        log::warn!("bitmap truncated: {} of {} bytes", file_len, data_end);
        return Err(Error::UnexpectedEof);
    }

    log::debug!(
        "loading {}x{} bitmap at ({}, {})",
        header.width,
        header.rows(),
        origin.x,
        origin.y
    );

    // image rows and row bytes that land on the canvas
    let (x0, y0) = (i64::from(origin.x), i64::from(origin.y));
    let first_row = (-y0).max(0);
    let end_row = (i64::from(HEIGHT) - y0).min(i64::from(header.rows()));
    let first_byte = (-x0 / 8).max(0);
    let end_byte = ((i64::from(WIDTH) - x0 + 7) / 8).min(i64::from(header.row_bytes()));
    if first_row >= end_row || first_byte >= end_byte {
        return Ok(header);
    }

    let xor = match color {
        BinaryColor::On => 0xff,
        BinaryColor::Off => 0x00,
    };
    let mut chunk = [0u8; CHUNK];

    for row in first_row..end_row {
        let y = (y0 + row) as i32;
        let file_row = u64::from(header.file_row(row as u32));
        let start =
            u64::from(header.offset) + file_row * header.stride() + first_byte as u64;
        reader
            .seek(SeekFrom::Start(start))
            .map_err(Error::<E>::io)?;

        let mut done = first_byte;
        while done < end_byte {
            let len = (CHUNK as i64).min(end_byte - done) as usize;
            reader
                .read_exact(&mut chunk[..len])
                .map_err(Error::<E>::read)?;
            for (i, byte) in chunk[..len].iter().enumerate() {
                let value = byte ^ xor;
                let x = (x0 + (done + i as i64) * 8) as i32;
                for bit in 0..8 {
                    let color = if value & (0x80 >> bit) != 0 {
                        BinaryColor::On
                    } else {
                        BinaryColor::Off
                    };
                    canvas.set_pixel(x + bit, y, color);
                }
            }
            done += len as i64;
        }
    }
    Ok(header)
}
