use core::convert::Infallible;
use core::fmt::Debug;

use derive_more::Display;

/// Errors produced by DotStar strips and their line drivers.
///
/// `E` is the line driver's own error type. Buffer-only operations never touch
/// a driver and use the default, [`Infallible`].
#[derive(Debug, Display)]
pub enum Error<E = Infallible> {
    /// A pixel index was at or past the end of the strip.
    #[display("pixel index {index} is out of range for a strip of {len} pixels")]
    IndexOutOfBounds {
        /// The rejected index.
        index: usize,
        /// Number of pixels in the strip.
        len: usize,
    },

    /// A brightness value was NaN or outside `0.0..=1.0`.
    #[display("brightness must be between 0.0 and 1.0")]
    BrightnessOutOfRange,

    /// A hex color did not fit in `0xRRGGBB`.
    #[display("color {_0:#x} does not fit in 0xRRGGBB")]
    ColorOutOfRange(u32),

    /// A caller-supplied buffer cannot hold the encoded wire frame.
    #[display("buffer holds {capacity} bytes but the wire frame needs {needed}")]
    BufferTooSmall {
        /// Bytes needed for the full frame.
        needed: usize,
        /// Bytes available.
        capacity: usize,
    },

    /// A byte stream is not a well-formed APA102 wire frame.
    #[display("malformed wire frame at byte {_0}")]
    MalformedFrame(usize),

    /// The line driver failed while transmitting.
    #[display("line driver failed: {_0:?}")]
    LineDriver(E),
}

impl<E: Debug> core::error::Error for Error<E> {}

impl Error {
    /// Lift a buffer-only error into the error type of a line-driver operation.
    #[must_use]
    pub fn widen<E>(self) -> Error<E> {
        match self {
            Self::IndexOutOfBounds { index, len } => Error::IndexOutOfBounds { index, len },
            Self::BrightnessOutOfRange => Error::BrightnessOutOfRange,
            Self::ColorOutOfRange(value) => Error::ColorOutOfRange(value),
            Self::BufferTooSmall { needed, capacity } => Error::BufferTooSmall { needed, capacity },
            Self::MalformedFrame(offset) => Error::MalformedFrame(offset),
            Self::LineDriver(never) => match never {},
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
