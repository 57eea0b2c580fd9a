//! Run time configuration of the driver.
//!
//! The panel geometry is fixed (see the constants in the crate root); everything that
//! differs between boards and wiring lives here and is handed to
//! [`LCD240128::new`](crate::display::LCD240128::new).

use crate::canvas::BitOrder;
use crate::error::Error;

/// Orientation of the picture on the glass.
///
/// A 180 degree rotation is done without any coordinate transform: the canvas packs its
/// pixels LSB first and the frame is streamed back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Normal,
    Rotate180,
}

impl Rotation {
    /// bit packing order the canvas has to use for this orientation
    pub fn bit_order(self) -> BitOrder {
        match self {
            Rotation::Normal => BitOrder::MsbFirst,
            Rotation::Rotate180 => BitOrder::LsbFirst,
        }
    }
}

/// Level of the FS pin, selecting the width of the controller's text font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontSize {
    /// FS low, 8x8 pixel character cells
    #[default]
    Font8x8,
    /// FS high, 6x8 pixel character cells
    Font6x8,
}

impl FontSize {
    /// width of a character cell in pixels
    pub fn cell_width(self) -> usize {
        match self {
            FontSize::Font8x8 => 8,
            FontSize::Font6x8 => 6,
        }
    }
}

/// Upper bound for the status polls the controller gets before a byte is sent.
///
/// The controller has no interrupt line, so the driver busy-waits on the status bits.
/// `Unbounded` waits forever when the display is unplugged or broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollLimit {
    Unbounded,
    Attempts(u32),
}

impl Default for PollLimit {
    fn default() -> Self {
        PollLimit::Attempts(100_000)
    }
}

impl PollLimit {
    /// Calls `ready` until it returns `true`, at most as often as this limit allows.
    #[inline]
    pub fn poll<E, F>(self, mut ready: F) -> Result<(), Error<E>>
    where
        F: FnMut() -> Result<bool, Error<E>>,
    {
        match self {
            PollLimit::Unbounded => loop {
                if ready()? {
                    return Ok(());
                }
            },
            PollLimit::Attempts(attempts) => {
                for _ in 0..attempts {
                    if ready()? {
                        return Ok(());
                    }
                }
                log::warn!("controller not ready after {} status polls", attempts);
                Err(Error::DeviceNotResponding)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub rotation: Rotation,
    /// FS level driven at construction
    pub font_size: FontSize,
    pub ready_poll_limit: PollLimit,
}

impl Config {
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_font_size(mut self, font_size: FontSize) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_ready_poll_limit(mut self, limit: PollLimit) -> Self {
        self.ready_poll_limit = limit;
        self
    }
}
