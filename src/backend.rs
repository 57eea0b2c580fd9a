//! Bus backends: the code that actually wiggles WR, RD, CE, C/D and the data lines.
//!
//! [`Backend`] covers one bus transaction or handshake at a time; the sequencing of
//! commands, operands and frames lives in [`LCD240128`](crate::display::LCD240128).
//! This module has the portable [`GpioBackend`], the register based one is in
//! [`port`](crate::port).

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::digital::v2::OutputPin;

use crate::config::PollLimit;
use crate::error::Error;

/// status bit 0 and 1: ready for a command or data byte
pub const STATUS_READY: u8 = 0b0000_0011;
/// status bit 3: ready for the next auto write byte
pub const STATUS_AUTO_WRITE_READY: u8 = 0b0000_1000;

/// data line carrying STA3 during auto write
pub(crate) const AUTO_WRITE_LINE: usize = 3;

pub trait Backend {
    type Error;

    /// Puts one byte on the bus with a single WR strobe. C/D is high for commands.
    /// There is no handshake here, the caller has to wait for the controller first.
    fn write_byte(&mut self, value: u8, command: bool) -> Result<(), Error<Self::Error>>;

    /// Reads one byte with a single RD strobe; C/D high reads the status register.
    fn read_byte(&mut self, status: bool) -> Result<u8, Error<Self::Error>>;

    /// Polls STA0/STA1 until the controller accepts a command or data byte.
    fn wait_ready(&mut self, limit: PollLimit) -> Result<(), Error<Self::Error>>;

    /// Called once after the `AutoWrite` command, before the first frame byte.
    fn begin_auto_write(&mut self) -> Result<(), Error<Self::Error>>;

    /// Polls STA3, then writes one byte of the auto write window.
    fn auto_write(&mut self, value: u8, limit: PollLimit) -> Result<(), Error<Self::Error>>;

    /// Releases CE after the last frame byte.
    fn end_auto_write(&mut self) -> Result<(), Error<Self::Error>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// A GPIO that can be switched between input and output at run time.
///
/// `embedded_hal` has no trait for this, so implement it for the flex/dynamic pin type of
/// your HAL.
pub trait DataPin {
    type Error;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// drive the pin, only meaningful as output
    fn set_level(&mut self, high: bool) -> Result<(), Self::Error>;

    /// sample the pin, only meaningful as input
    fn is_high(&self) -> Result<bool, Self::Error>;
}

/// Used to run without delay on a slow enough clock speed
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay {}

impl DelayUs<u8> for NoDelay {
    #[inline]
    fn delay_us(&mut self, _us: u8) {}
}

impl DelayMs<u8> for NoDelay {
    #[inline]
    fn delay_ms(&mut self, _ms: u8) {}
}

/// Portable backend driving every line through its own pin.
///
/// Each data byte costs eight separate pin writes, so a full frame takes a while. It works
/// with any HAL though, and it is the reference for [`PortBackend`](crate::port::PortBackend).
pub struct GpioBackend<WR, RD, CE, CD, D, DELAY> {
    wr: WR,
    rd: RD,
    ce: CE,
    cd: CD,
    data: [D; 8],
    delay: DELAY,
}

impl<WR, RD, CE, CD, D, ERR> GpioBackend<WR, RD, CE, CD, D, NoDelay>
where
    WR: OutputPin<Error = ERR>,
    RD: OutputPin<Error = ERR>,
    CE: OutputPin<Error = ERR>,
    CD: OutputPin<Error = ERR>,
    D: DataPin<Error = ERR>,
{
    /// Takes the control lines and DB0..DB7 (in that order) and parks the bus idle:
    /// strobes and CE high, C/D low, data lines driven low.
    pub fn new(wr: WR, rd: RD, ce: CE, cd: CD, data: [D; 8]) -> Result<Self, Error<ERR>> {
        Self::new_with_delay(wr, rd, ce, cd, data, NoDelay {})
    }
}

impl<WR, RD, CE, CD, D, DELAY, ERR> GpioBackend<WR, RD, CE, CD, D, DELAY>
where
    WR: OutputPin<Error = ERR>,
    RD: OutputPin<Error = ERR>,
    CE: OutputPin<Error = ERR>,
    CD: OutputPin<Error = ERR>,
    D: DataPin<Error = ERR>,
    DELAY: DelayUs<u8>,
{
    /// Same as `new`, with a delay of 1µs after the status lines turn around.
    /// Use this on fast MCUs where the controller can't keep up with the pin toggling.
    pub fn new_with_delay(
        mut wr: WR,
        mut rd: RD,
        mut ce: CE,
        mut cd: CD,
        mut data: [D; 8],
        delay: DELAY,
    ) -> Result<Self, Error<ERR>> {
        Error::pin(wr.set_high())?;
        Error::pin(rd.set_high())?;
        Error::pin(ce.set_high())?;
        Error::pin(cd.set_low())?;
        for line in data.iter_mut() {
            Error::pin(line.set_direction(Direction::Output))?;
            Error::pin(line.set_level(false))?;
        }
        Ok(GpioBackend {
            wr,
            rd,
            ce,
            cd,
            data,
            delay,
        })
    }

    /// gives back the pins
    pub fn release(self) -> (WR, RD, CE, CD, [D; 8]) {
        (self.wr, self.rd, self.ce, self.cd, self.data)
    }

    #[inline]
    fn set_cd(&mut self, high: bool) -> Result<(), Error<ERR>> {
        if high {
            Error::pin(self.cd.set_high())
        } else {
            Error::pin(self.cd.set_low())
        }
    }

    #[inline]
    fn put_data(&mut self, value: u8) -> Result<(), Error<ERR>> {
        for (bit, line) in self.data.iter_mut().enumerate() {
            Error::pin(line.set_level(value & (1 << bit) != 0))?;
        }
        Ok(())
    }

    #[inline]
    fn strobe_write(&mut self) -> Result<(), Error<ERR>> {
        Error::pin(self.wr.set_low())?;
        Error::pin(self.wr.set_high())
    }

    fn set_directions(&mut self, lines: u8, direction: Direction) -> Result<(), Error<ERR>> {
        for (bit, line) in self.data.iter_mut().enumerate() {
            if lines & (1 << bit) != 0 {
                Error::pin(line.set_direction(direction))?;
            }
        }
        Ok(())
    }
}

impl<WR, RD, CE, CD, D, DELAY, ERR> Backend for GpioBackend<WR, RD, CE, CD, D, DELAY>
where
    WR: OutputPin<Error = ERR>,
    RD: OutputPin<Error = ERR>,
    CE: OutputPin<Error = ERR>,
    CD: OutputPin<Error = ERR>,
    D: DataPin<Error = ERR>,
    DELAY: DelayUs<u8>,
{
    type Error = ERR;

    fn write_byte(&mut self, value: u8, command: bool) -> Result<(), Error<ERR>> {
        self.set_cd(command)?;
        Error::pin(self.ce.set_low())?;
        self.put_data(value)?;
        self.strobe_write()?;
        Error::pin(self.ce.set_high())
    }

    fn read_byte(&mut self, status: bool) -> Result<u8, Error<ERR>> {
        self.set_directions(0xff, Direction::Input)?;
        self.set_cd(status)?;
        Error::pin(self.ce.set_low())?;
        Error::pin(self.rd.set_low())?;

        let mut value = 0;
        for (bit, line) in self.data.iter().enumerate() {
            if Error::pin(line.is_high())? {
                value |= 1 << bit;
            }
        }

        Error::pin(self.rd.set_high())?;
        Error::pin(self.ce.set_high())?;
        self.set_directions(0xff, Direction::Output)?;
        Ok(value)
    }

    fn wait_ready(&mut self, limit: PollLimit) -> Result<(), Error<ERR>> {
        self.set_directions(STATUS_READY, Direction::Input)?;
        self.set_cd(true)?;
        Error::pin(self.wr.set_high())?;

        let polled: Result<(), Error<ERR>> = {
            let GpioBackend { rd, ce, data, .. } = self;
            limit.poll(|| {
                Error::pin(ce.set_low())?;
                Error::pin(rd.set_low())?;
                let sta0 = Error::pin(data[0].is_high())?;
                let sta1 = Error::pin(data[1].is_high())?;
                Error::pin(rd.set_high())?;
                Error::pin(ce.set_high())?;
                Ok(sta0 && sta1)
            })
        };

        // hand the lines back to the host even when the controller is stuck
        self.set_directions(STATUS_READY, Direction::Output)?;
        polled
    }

    fn begin_auto_write(&mut self) -> Result<(), Error<ERR>> {
        Error::pin(self.ce.set_low())
    }

    fn auto_write(&mut self, value: u8, limit: PollLimit) -> Result<(), Error<ERR>> {
        Error::pin(self.data[AUTO_WRITE_LINE].set_direction(Direction::Input))?;
        self.delay.delay_us(1);
        self.set_cd(true)?;

        let polled: Result<(), Error<ERR>> = {
            let GpioBackend { rd, data, .. } = self;
            limit.poll(|| {
                Error::pin(rd.set_low())?;
                let sta3 = Error::pin(data[AUTO_WRITE_LINE].is_high())?;
                Error::pin(rd.set_high())?;
                Ok(sta3)
            })
        };

        Error::pin(self.data[AUTO_WRITE_LINE].set_direction(Direction::Output))?;
        polled?;

        self.set_cd(false)?;
        self.put_data(value)?;
        self.strobe_write()
    }

    fn end_auto_write(&mut self) -> Result<(), Error<ERR>> {
        Error::pin(self.ce.set_high())
    }
}
