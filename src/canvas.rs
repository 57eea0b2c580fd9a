//! In-memory frame for the graphics plane.
//!
//! One bit per pixel, rows of 30 bytes stored top to bottom, which is exactly the layout
//! of the controller's graphics memory. A set bit is a dark pixel.
//!
//! The canvas is a `DrawTarget`, so everything from `embedded_graphics` (lines, rectangles,
//! ellipses, fonts, images) can be drawn into it directly.

use core::convert::Infallible;

use embedded_graphics_core::{pixelcolor::BinaryColor, prelude::*};

use crate::{BUFFER_SIZE, COLUMNS, HEIGHT, WIDTH};

const MAX_X: u32 = WIDTH as u32 - 1;
const MAX_Y: u32 = HEIGHT as u32 - 1;

/// Which bit of a byte holds the leftmost of its 8 pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// bit 7 is the leftmost pixel, the controller's native order
    MsbFirst,
    /// bit 0 is the leftmost pixel, used for the rotated frame
    LsbFirst,
}

impl BitOrder {
    #[inline]
    fn mask(self, x: u32) -> u8 {
        match self {
            BitOrder::MsbFirst => 0x80 >> (x % 8),
            BitOrder::LsbFirst => 0x01 << (x % 8),
        }
    }
}

#[derive(Clone)]
pub struct Canvas {
    buffer: [u8; BUFFER_SIZE],
    order: BitOrder,
}

impl Canvas {
    pub fn new(order: BitOrder) -> Self {
        Canvas {
            buffer: [0x00; BUFFER_SIZE],
            order,
        }
    }

    pub fn bit_order(&self) -> BitOrder {
        self.order
    }

    /// raw frame as it is streamed to the controller (before any rotation)
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    pub fn fill(&mut self, color: BinaryColor) {
        let byte = match color {
            BinaryColor::On => 0xff,
            BinaryColor::Off => 0x00,
        };
        self.buffer = [byte; BUFFER_SIZE];
    }

    /// Sets a single pixel. Coordinates outside the panel are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: BinaryColor) {
        if let Some((index, mask)) = self.locate(x, y) {
            match color {
                BinaryColor::On => self.buffer[index] |= mask,
                BinaryColor::Off => self.buffer[index] &= !mask,
            }
        }
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the panel.
    pub fn pixel(&self, x: i32, y: i32) -> Option<BinaryColor> {
        self.locate(x, y).map(|(index, mask)| {
            if self.buffer[index] & mask != 0 {
                BinaryColor::On
            } else {
                BinaryColor::Off
            }
        })
    }

    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        match (u32::try_from(x), u32::try_from(y)) {
            (Ok(x @ 0..=MAX_X), Ok(y @ 0..=MAX_Y)) => {
                let index = y as usize * COLUMNS as usize + x as usize / 8;
                Some((index, self.order.mask(x)))
            }
            _ => None,
        }
    }
}

impl DrawTarget for Canvas {
    type Error = Infallible;
    type Color = BinaryColor;

    fn clear(&mut self, color: BinaryColor) -> Result<(), Infallible> {
        self.fill(color);
        Ok(())
    }

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            self.set_pixel(coord.x, coord.y, color);
        }
        Ok(())
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(WIDTH.into(), HEIGHT.into())
    }
}
