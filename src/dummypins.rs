//! # Stand-in for pins that are hard-wired on the board
//!
//! Many LCD240128 modules come with FS strapped to ground (8x8 font) and RST tied to the
//! supply through a resistor, or to the MCU's own reset. The driver still wants pins for
//! both; hand it a `DummyOutputPin` and it will behave as a working pin that does nothing.
//!
//! Note that without a real RST pin `reset()` only waits, so the controller has to be in a
//! sane state after power up.

use embedded_hal::digital::v2::OutputPin;

/// provides a dummy OutputPin.
///
/// Its error type is `Infallible`, so it fits next to a [`PortBackend`](crate::port::PortBackend)
/// or any HAL whose pins can't fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyOutputPin;

impl OutputPin for DummyOutputPin {
    type Error = core::convert::Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
