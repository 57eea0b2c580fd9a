//! Packed bitmaps, fonts and the routines that draw them into the canvas.
//!
//! Bitmaps use the layout most font converters emit: rows top to bottom, each row
//! `ceil(width / 8)` bytes, bit 7 of a byte is the leftmost pixel. That is independent of
//! the canvas bit order, so the same glyphs work for both rotations.

use embedded_graphics_core::{geometry::Point, pixelcolor::BinaryColor};

use crate::canvas::Canvas;
use crate::error::Error;
use crate::WIDTH;

/// A borrowed 1 bit image, e.g. an icon or a font glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmap<'a> {
    pub data: &'a [u8],
    pub height: u32,
    pub width: u32,
}

impl<'a> Bitmap<'a> {
    pub const fn new(data: &'a [u8], height: u32, width: u32) -> Self {
        Bitmap {
            data,
            height,
            width,
        }
    }

    /// bytes per row
    #[inline]
    pub fn stride(&self) -> usize {
        (self.width as usize + 7) / 8
    }

    /// Returns whether the pixel at `(x, y)` is set. Missing data reads as unset.
    #[inline]
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        let index = y as usize * self.stride() + x as usize / 8;
        match self.data.get(index) {
            Some(byte) => byte & (0x80 >> (x % 8)) != 0,
            None => false,
        }
    }
}

/// Source of glyphs for [`draw_text`].
pub trait Font {
    fn glyph(&self, c: char) -> Bitmap<'_>;
}

/// Colors used for the set and the unset bits of an opaque [`blit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub foreground: BinaryColor,
    pub background: BinaryColor,
}

impl Palette {
    pub const fn new(foreground: BinaryColor, background: BinaryColor) -> Self {
        Palette {
            foreground,
            background,
        }
    }

    /// swaps foreground and background
    pub fn inverted(self) -> Self {
        Palette::new(self.background, self.foreground)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new(BinaryColor::On, BinaryColor::Off)
    }
}

/// Draws only the set bits of `bitmap` with `color`, leaving the rest of the canvas as is.
pub fn draw_bitmap(canvas: &mut Canvas, bitmap: &Bitmap<'_>, origin: Point, color: BinaryColor) {
    for row in 0..bitmap.height {
        for col in 0..bitmap.width {
            if bitmap.is_set(col, row) {
                canvas.set_pixel(origin.x + col as i32, origin.y + row as i32, color);
            }
        }
    }
}

/// Overwrites the whole bitmap area: set bits get the foreground, unset bits the
/// background color.
pub fn blit(canvas: &mut Canvas, bitmap: &Bitmap<'_>, origin: Point, palette: Palette) {
    for row in 0..bitmap.height {
        for col in 0..bitmap.width {
            let color = if bitmap.is_set(col, row) {
                palette.foreground
            } else {
                palette.background
            };
            canvas.set_pixel(origin.x + col as i32, origin.y + row as i32, color);
        }
    }
}

/// Draws `text` glyph by glyph starting at `origin` and returns the position after the
/// last glyph.
///
/// With `wrap` set, a glyph that would cross the right edge starts a new line at
/// `origin.x`, one glyph height further down. `BinaryColor::Off` draws inverse text: the
/// glyph cell is filled and the strokes are cleared.
pub fn draw_text<E>(
    canvas: &mut Canvas,
    font: Option<&dyn Font>,
    text: &str,
    origin: Point,
    color: BinaryColor,
    wrap: bool,
) -> Result<Point, Error<E>> {
    let font = match font {
        Some(font) => font,
        None => {
            log::warn!("draw_text called without a font");
            return Err(Error::MissingFont);
        }
    };

    let mut cursor = origin;
    for c in text.chars() {
        let glyph = font.glyph(c);
        let width = glyph.width as i32;

        if wrap && cursor.x + width > i32::from(WIDTH) {
            cursor = Point::new(origin.x, cursor.y + glyph.height as i32);
        }

        if c != ' ' {
            match color {
                BinaryColor::On => draw_bitmap(canvas, &glyph, cursor, color),
                BinaryColor::Off => blit(canvas, &glyph, cursor, Palette::default().inverted()),
            }
        }
        cursor.x += width;
    }
    Ok(cursor)
}
