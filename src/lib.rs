//! # Driver for 240x128 graphic LCDs with a T6963C-class controller
//!
//! The display is wired to an 8-bit parallel bus (DB0..DB7) plus the WR, RD, CE and C/D
//! control lines, a RST line and the FS (font select) line. Every byte sent to the
//! controller is preceded by a status poll, so the data lines have to be switched between
//! output and input at run time.
//!
//! The driver keeps a [`Canvas`](canvas::Canvas) in memory. You draw into it with
//! `embedded_graphics` (the driver is a `DrawTarget`), with the bitmap and text helpers, or
//! by loading a monochrome BMP, and then call [`LCD240128::show`] to stream the whole frame
//! into the controller's graphics memory.
//!
//! Two bus backends are available:
//!  - [`GpioBackend`](backend::GpioBackend) toggles every line through `embedded_hal` pins.
//!    It works everywhere but is slow.
//!  - [`PortBackend`](port::PortBackend) writes whole GPIO port registers, using a lookup
//!    table that turns a data byte into a ready-made port word.
//!
//! Text mode (feature "textmode") uses the controller's own character generator instead of
//! the canvas, and implements `core::fmt::Write` so `writeln!()` works on the display.
#![cfg_attr(not(test), no_std)]

extern crate embedded_hal as hal;

pub mod backend;
pub mod bmp;
pub mod canvas;
pub mod config;
pub mod display;
pub mod dummypins;
pub mod error;
pub mod graphics;
pub mod instructions;
pub mod port;
pub mod raster;

#[cfg(feature = "textmode")]
pub mod textmode;

#[cfg(test)]
mod testing;

/// width of the panel in pixels
pub const WIDTH: u8 = 240;
/// height of the panel in pixels
pub const HEIGHT: u8 = 128;
/// number of 8 pixel wide byte columns in a row, also the text area width
pub const COLUMNS: u8 = WIDTH / 8;
/// number of 8 pixel high text rows
pub const TEXT_ROWS: u8 = HEIGHT / 8;
/// size of one full frame in graphics memory
pub const BUFFER_SIZE: usize = WIDTH as usize * HEIGHT as usize / 8;

pub use crate::backend::{Backend, DataPin, Direction, GpioBackend, NoDelay};
pub use crate::bmp::BmpHeader;
pub use crate::canvas::{BitOrder, Canvas};
pub use crate::config::{Config, FontSize, PollLimit, Rotation};
pub use crate::display::LCD240128;
pub use crate::dummypins::DummyOutputPin;
pub use crate::error::Error;
pub use crate::instructions::Command;
pub use crate::port::{GpioPort, MmioPort, PinMap, PortBackend, PortRegisters};
pub use crate::raster::{Bitmap, Font, Palette};

#[cfg(feature = "textmode")]
pub use crate::textmode::TextMode;
