//! # Main driver for the LCD240128
//!
//! This contains the code shared by graphics and text mode: state keeping, the reset
//! sequence and the command protocol of the controller. Drawing and the frame transfer are
//! in [`graphics`](crate::graphics), the character console in
//! [`textmode`](crate::textmode).
//!
//! To use the driver, build a bus backend, make an `LCD240128::new()` and call the methods on
//! that. `new()` resets the controller and sets it up for graphics mode, so a following
//! `show()` puts the canvas on the glass.
//!
//! Every byte to the controller is preceded by a status poll. The number of polls is bounded
//! by [`Config::ready_poll_limit`](crate::config::Config), so a missing or broken display
//! ends in [`Error::DeviceNotResponding`] instead of a hang.
//!
//! Typically you only need these functions from this module:
//!  - `LCD240128::new()` to create a driver instance
//!  - `LCD240128::set_inversion()` for reverse video
//!  - `LCD240128::canvas_mut()` for direct access to the frame
//!
//! The raw command functions are there for instructions the driver doesn't wrap.

use hal::blocking::delay::DelayMs;
use hal::digital::v2::OutputPin;

use crate::{
    backend::Backend,
    canvas::Canvas,
    config::{Config, FontSize},
    error::Error,
    instructions::prelude::*,
    raster::Font,
};

/// main struct for state keeping of the driver, owns the bus, the control pins and the canvas
pub struct LCD240128<B, RST, FS, DELAY> {
    pub(crate) backend: B,
    rst: RST,
    fs: FS,
    delay: DELAY,
    pub(crate) config: Config,
    pub(crate) canvas: Canvas,
    pub(crate) font: Option<&'static dyn Font>,
    pub(crate) text_wrap: bool,
    // output pins can't be read back
    font_size: FontSize,
    #[cfg(feature = "textmode")]
    /// column of the text console cursor, in 0..30
    pub(crate) text_col: u8,
    #[cfg(feature = "textmode")]
    /// row of the text console cursor, in 0..16
    pub(crate) text_row: u8,
}

impl<B, RST, FS, DELAY> LCD240128<B, RST, FS, DELAY>
where
    B: Backend,
    RST: OutputPin<Error = B::Error>,
    FS: OutputPin<Error = B::Error>,
    DELAY: DelayMs<u8>,
{
    /// Create a new instance of the driver
    ///
    /// Arguments:
    ///
    /// - backend: the bus, a [`GpioBackend`](crate::backend::GpioBackend) or a
    ///   [`PortBackend`](crate::port::PortBackend)
    /// - rst: Reset, an OutputPin connected to RST on the display
    /// - fs: Font Select, an OutputPin connected to FS on the display
    /// - delay: used for the reset timing
    /// - config: rotation, initial font size and the ready poll limit
    ///
    /// FS is driven to `config.font_size`, then the display is reset and initialized for
    /// graphics mode.
    pub fn new(
        backend: B,
        rst: RST,
        fs: FS,
        delay: DELAY,
        config: Config,
    ) -> Result<Self, Error<B::Error>> {
        let mut lcd = LCD240128 {
            backend,
            rst,
            fs,
            delay,
            config,
            canvas: Canvas::new(config.rotation.bit_order()),
            font: None,
            text_wrap: false,
            font_size: config.font_size,
            #[cfg(feature = "textmode")]
            text_col: 0,
            #[cfg(feature = "textmode")]
            text_row: 0,
        };

        lcd.set_font_size(config.font_size)?;
        lcd.init_graphics_mode()?;
        Ok(lcd)
    }

    /// Hardware reset through RST: low for 10ms, then 1ms to come up.
    ///
    /// The controller loses its mode settings, call one of the `init_*_mode()` functions
    /// afterwards.
    pub fn reset(&mut self) -> Result<(), Error<B::Error>> {
        log::debug!("resetting display controller");
        Error::pin(self.rst.set_low())?;
        self.delay.delay_ms(10);
        Error::pin(self.rst.set_high())?;
        self.delay.delay_ms(1);
        Ok(())
    }

    /// Polls the status register until STA0 and STA1 are both set.
    pub fn wait_ready(&mut self) -> Result<(), Error<B::Error>> {
        self.backend.wait_ready(self.config.ready_poll_limit)
    }

    /// Writes a single byte without waiting for the controller. C/D high marks a command.
    pub fn write_byte(&mut self, value: u8, command: bool) -> Result<(), Error<B::Error>> {
        self.backend.write_byte(value, command)
    }

    /// Sends an opcode with up to two operands, each byte after a status poll.
    ///
    /// The operands go first, in the order given; the controller executes once the opcode
    /// arrives.
    pub fn send_command(
        &mut self,
        opcode: u8,
        data1: Option<u8>,
        data2: Option<u8>,
    ) -> Result<(), Error<B::Error>> {
        for operand in data1.into_iter().chain(data2) {
            self.wait_ready()?;
            self.write_byte(operand, false)?;
        }
        self.wait_ready()?;
        self.write_byte(opcode, true)
    }

    /// Send a single instruction from the [`Command`](crate::instructions::Command) enum.
    pub fn write_command(&mut self, command: Command) -> Result<(), Error<B::Error>> {
        let (data1, data2) = command.operands();
        self.send_command(command.opcode(), data1, data2)
    }

    /// reads the status register
    pub fn read_status(&mut self) -> Result<u8, Error<B::Error>> {
        self.backend.read_byte(true)
    }

    /// Reads one byte, from the status register if `status` is set, else from the data
    /// register (after a `ReadAndIncrement` or similar).
    pub fn read_data(&mut self, status: bool) -> Result<u8, Error<B::Error>> {
        self.backend.read_byte(status)
    }

    /// Reverse video for the whole display. Only some panels support this.
    pub fn set_inversion(&mut self, on: bool) -> Result<(), Error<B::Error>> {
        self.write_command(SetReverse(on))
    }

    /// Drives FS: high selects the 6x8 font of the character generator, low the 8x8 one.
    pub fn set_font_size(&mut self, size: FontSize) -> Result<(), Error<B::Error>> {
        match size {
            FontSize::Font8x8 => Error::pin(self.fs.set_low())?,
            FontSize::Font6x8 => Error::pin(self.fs.set_high())?,
        }
        self.font_size = size;
        Ok(())
    }

    pub fn font_size(&self) -> FontSize {
        self.font_size
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// gives back the bus, the pins and the delay
    pub fn release(self) -> (B, RST, FS, DELAY) {
        (self.backend, self.rst, self.fs, self.delay)
    }
}
