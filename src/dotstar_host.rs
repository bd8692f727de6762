#![cfg(feature = "host")]
//! Host-side helpers for checking what a strip would put on the wire.
//!
//! [`RecordingLineDriver`] captures transmissions instead of clocking them out, and
//! [`decode_frame`] turns a captured frame back into per-LED state.

use core::convert::Infallible;

use crate::dotstar::wire::{
    self, BRIGHTNESS_LEVEL_MAX, LED_FRAME_LEN, LED_FRAME_MARKER, START_FRAME_LEN,
};
use crate::dotstar::{AsyncLineDriver, LineDriver, PixelOrder, Rgb};
use crate::{Error, Result};

/// A line driver that records bytes. Each `flush` closes one frame.
///
/// ```
/// use dotstar_envoy::dotstar::{Config, DotStar};
/// use dotstar_envoy::dotstar_host::RecordingLineDriver;
///
/// let mut strip = DotStar::<_, 1>::new(RecordingLineDriver::new(), Config::new())?;
/// strip.set(0, (1, 2, 3))?;
///
/// let frame = strip.line_driver().last_frame().expect("auto_write sent a frame");
/// assert_eq!(frame, &[0, 0, 0, 0, 0xFF, 3, 2, 1, 0]);
/// # Ok::<(), dotstar_envoy::Error>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingLineDriver {
    pending: Vec<u8>,
    frames: Vec<Vec<u8>>,
}

impl RecordingLineDriver {
    /// An empty recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Frames closed by `flush`, oldest first.
    #[must_use]
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    /// The most recent complete frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<&[u8]> {
        self.frames.last().map(Vec::as_slice)
    }

    /// Bytes written since the last `flush`.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Remove and return every recorded frame.
    pub fn take_frames(&mut self) -> Vec<Vec<u8>> {
        core::mem::take(&mut self.frames)
    }

    fn close_frame(&mut self) {
        let frame = core::mem::take(&mut self.pending);
        self.frames.push(frame);
    }
}

impl LineDriver for RecordingLineDriver {
    type Error = Infallible;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.pending.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.close_frame();
        Ok(())
    }
}

impl AsyncLineDriver for RecordingLineDriver {
    type Error = Infallible;

    async fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.pending.extend_from_slice(bytes);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.close_frame();
        Ok(())
    }
}

/// One LED as read back from the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedLed {
    /// Channel bytes, un-permuted to red, green, blue.
    pub color: Rgb,
    /// The 5-bit global brightness field, `0..=31`.
    pub level: u8,
}

impl DecodedLed {
    /// The color as it would appear, with the 5-bit level folded into the channels.
    #[must_use]
    pub fn perceived(&self) -> Rgb {
        let scale = |channel: u8| {
            let scaled =
                u16::from(channel) * u16::from(self.level) / u16::from(BRIGHTNESS_LEVEL_MAX);
            u8::try_from(scaled).unwrap_or(u8::MAX)
        };
        Rgb::new(
            scale(self.color.r),
            scale(self.color.g),
            scale(self.color.b),
        )
    }
}

/// Parse a complete wire frame: start frame, LED frames, zero end frame.
///
/// # Errors
///
/// Returns [`Error::MalformedFrame`] with the offset of the first byte that does not fit,
/// or the length of `bytes` when the frame is cut short.
pub fn decode_frame(bytes: &[u8], pixel_order: PixelOrder) -> Result<Vec<DecodedLed>> {
    let start = bytes
        .get(..START_FRAME_LEN)
        .ok_or(Error::MalformedFrame(bytes.len()))?;
    if let Some(offset) = start.iter().position(|&byte| byte != 0) {
        return Err(Error::MalformedFrame(offset));
    }

    let mut leds = Vec::new();
    let mut offset = START_FRAME_LEN;
    while let Some(&control) = bytes.get(offset) {
        if control & LED_FRAME_MARKER != LED_FRAME_MARKER {
            break;
        }
        let Some(&[_, first, second, third]) = bytes
            .get(offset..offset + LED_FRAME_LEN)
            .and_then(|led| <&[u8; LED_FRAME_LEN]>::try_from(led).ok())
        else {
            return Err(Error::MalformedFrame(bytes.len()));
        };
        leds.push(DecodedLed {
            color: pixel_order.from_wire([first, second, third]),
            level: control & !LED_FRAME_MARKER,
        });
        offset += LED_FRAME_LEN;
    }

    let end = bytes.get(offset..).unwrap_or_default();
    if let Some(position) = end.iter().position(|&byte| byte != 0) {
        return Err(Error::MalformedFrame(offset + position));
    }
    if end.len() != wire::end_frame_len(leds.len()) {
        return Err(Error::MalformedFrame(offset));
    }
    Ok(leds)
}
