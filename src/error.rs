//! Error type shared by the bus backends, the protocol layer and the drawing helpers.
//!
//! `E` is the error type of the pins. Backends that can't fail (register access in
//! [`PortBackend`](crate::port::PortBackend)) use `core::convert::Infallible`.

use embedded_io::{ErrorKind, ReadExactError};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// a GPIO pin operation failed
    #[error("pin error: {0:?}")]
    Pin(E),

    /// the controller never reported ready within the configured poll limit
    #[error("display controller is not responding")]
    DeviceNotResponding,

    /// the BMP is not an uncompressed 1 bit image
    #[error("unsupported bitmap: planes {planes}, depth {depth}, compression {compression}")]
    UnsupportedFormat {
        planes: u16,
        depth: u16,
        compression: u32,
    },

    /// the stream doesn't start with a BMP header
    #[error("not a BMP file")]
    InvalidHeader,

    /// reading from the image stream failed
    #[error("read error: {0:?}")]
    Io(ErrorKind),

    /// the image stream ended in the middle of the header or pixel data
    #[error("unexpected end of image data")]
    UnexpectedEof,

    /// text drawing was requested without a font
    #[error("font not set")]
    MissingFont,

    /// a port pin map with a bit position above 31 or used twice
    #[error("invalid port pin map")]
    InvalidPinMap,
}

impl<E> Error<E> {
    /// wraps the result of a pin operation
    #[inline]
    pub fn pin<T>(result: Result<T, E>) -> Result<T, Error<E>> {
        result.map_err(Error::Pin)
    }

    pub(crate) fn io<IoE: embedded_io::Error>(err: IoE) -> Error<E> {
        Error::Io(err.kind())
    }

    pub(crate) fn read<IoE: embedded_io::Error>(err: ReadExactError<IoE>) -> Error<E> {
        match err {
            ReadExactError::UnexpectedEof => Error::UnexpectedEof,
            ReadExactError::Other(e) => Error::io(e),
        }
    }
}
