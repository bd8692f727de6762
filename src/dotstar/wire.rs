//! The APA102 wire format.
//!
//! A frame for `N` pixels is:
//!
//! | Part        | Bytes            | Content                                          |
//! |-------------|------------------|--------------------------------------------------|
//! | Start frame | 4                | `0x00`                                           |
//! | LED frame   | 4 per pixel      | `0b111` + 5-bit brightness, then 3 color bytes   |
//! | End frame   | `ceil(N / 16)`   | `0x00`                                           |
//!
//! Each LED delays the data line by half a clock, so the end frame supplies one extra
//! clock edge per two pixels. It is all zeros, not ones, so surplus physical pixels past
//! the end of the strip stay dark.

use super::color::{Pixel, Rgb, StoredPixel};

/// Number of zero bytes that open every frame.
pub const START_FRAME_LEN: usize = 4;

/// Bytes per LED: one control byte and three color bytes.
pub const LED_FRAME_LEN: usize = 4;

/// High three bits of every LED control byte.
pub const LED_FRAME_MARKER: u8 = 0b1110_0000;

/// Largest value of the 5-bit global brightness field.
pub const BRIGHTNESS_LEVEL_MAX: u8 = 0b0001_1111;

/// Number of zero bytes that close a frame for `len` pixels.
#[must_use]
pub const fn end_frame_len(len: usize) -> usize {
    len.div_ceil(16)
}

/// Total bytes in a wire frame for `len` pixels.
#[must_use]
pub const fn frame_len(len: usize) -> usize {
    START_FRAME_LEN + len * LED_FRAME_LEN + end_frame_len(len)
}

/// Map a brightness in `0.0..=1.0` to the 5-bit field, rounding up so that any
/// non-zero brightness lights the LED.
#[must_use]
pub fn brightness_level(brightness: f32) -> u8 {
    let scaled = brightness.clamp(0.0, 1.0) * f32::from(BRIGHTNESS_LEVEL_MAX);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "clamped to 0..=31")]
    let truncated = scaled as u8;
    let level = if f32::from(truncated) < scaled {
        truncated + 1
    } else {
        truncated
    };
    level.min(BRIGHTNESS_LEVEL_MAX)
}

/// The first byte of an LED frame for a given brightness level.
#[must_use]
pub const fn control_byte(level: u8) -> u8 {
    LED_FRAME_MARKER | (level & BRIGHTNESS_LEVEL_MAX)
}

// ============================================================================
// Pixel Order
// ============================================================================

/// Which channel goes into each of the three color positions on the wire.
///
/// Strips differ. If you send red and it shows blue or green, change this.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelOrder {
    /// Red, green, blue.
    Rgb,
    /// Red, blue, green.
    Rbg,
    /// Green, red, blue.
    Grb,
    /// Green, blue, red.
    Gbr,
    /// Blue, red, green.
    Brg,
    /// Blue, green, red. Most DotStar strips.
    #[default]
    Bgr,
}

impl PixelOrder {
    /// Arrange a color's channels in wire order.
    #[must_use]
    pub const fn to_wire(self, color: Rgb) -> [u8; 3] {
        let Rgb { r, g, b } = color;
        match self {
            Self::Rgb => [r, g, b],
            Self::Rbg => [r, b, g],
            Self::Grb => [g, r, b],
            Self::Gbr => [g, b, r],
            Self::Brg => [b, r, g],
            Self::Bgr => [b, g, r],
        }
    }

    /// Inverse of [`to_wire`](Self::to_wire).
    #[must_use]
    pub const fn from_wire(self, bytes: [u8; 3]) -> Rgb {
        let [first, second, third] = bytes;
        let (r, g, b) = match self {
            Self::Rgb => (first, second, third),
            Self::Rbg => (first, third, second),
            Self::Grb => (second, first, third),
            Self::Gbr => (third, first, second),
            Self::Brg => (second, third, first),
            Self::Bgr => (third, second, first),
        };
        Rgb::new(r, g, b)
    }
}

// ============================================================================
// Brightness Mode
// ============================================================================

/// Where a pixel's brightness is applied.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BrightnessMode {
    /// Brightness goes into each LED's 5-bit global brightness field and the color
    /// bytes are sent as-is. Keeps full color resolution at low brightness, but the
    /// LED's global PWM runs slowly enough to smear persistence-of-vision images.
    #[default]
    Hardware,
    /// The global brightness field is always full and the color bytes are scaled
    /// (truncating) instead.
    Software,
}

// ============================================================================
// Gamma Correction
// ============================================================================

/// Gamma correction applied to color channels at encode time.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gamma {
    /// Linear gamma (no correction). Gamma = 1.0
    #[default]
    Linear,
    /// Standard gamma 2.2 correction for perceived brightness.
    Gamma2_2,
}

impl Gamma {
    /// Apply this curve to one channel value.
    #[must_use]
    pub const fn correct(self, value: u8) -> u8 {
        match self {
            Self::Linear => value,
            Self::Gamma2_2 => GAMMA_2_2_TABLE[value as usize],
        }
    }
}

/// Gamma 2.2 lookup table for 8-bit values.
/// Pre-computed to avoid floating point math: corrected = (value/255)^2.2 * 255
pub(crate) const GAMMA_2_2_TABLE: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2,
    3, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 7, 7, 7, 8, 8, 8, 9, 9, 9, 10, 10, 11, 11,
    11, 12, 12, 13, 13, 13, 14, 14, 15, 15, 16, 16, 17, 17, 18, 18, 19, 19, 20, 20, 21, 22, 22, 23,
    23, 24, 25, 25, 26, 26, 27, 28, 28, 29, 30, 30, 31, 32, 33, 33, 34, 35, 35, 36, 37, 38, 39, 39,
    40, 41, 42, 43, 43, 44, 45, 46, 47, 48, 49, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61,
    62, 63, 64, 65, 66, 67, 68, 69, 70, 71, 73, 74, 75, 76, 77, 78, 79, 81, 82, 83, 84, 85, 87, 88,
    89, 90, 91, 93, 94, 95, 97, 98, 99, 100, 102, 103, 105, 106, 107, 109, 110, 111, 113, 114, 116,
    117, 119, 120, 121, 123, 124, 126, 127, 129, 130, 132, 133, 135, 137, 138, 140, 141, 143, 145,
    146, 148, 149, 151, 153, 154, 156, 158, 159, 161, 163, 165, 166, 168, 170, 172, 173, 175, 177,
    179, 181, 182, 184, 186, 188, 190, 192, 194, 196, 197, 199, 201, 203, 205, 207, 209, 211, 213,
    215, 217, 219, 221, 223, 225, 227, 229, 231, 234, 236, 238, 240, 242, 244, 246, 248, 251, 253,
    255,
];

// ============================================================================
// Encoding
// ============================================================================

/// The strip-wide settings that turn a [`Pixel`] into an LED frame.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Encoding {
    /// Channel order on the wire.
    pub pixel_order: PixelOrder,
    /// Where brightness is applied.
    pub brightness_mode: BrightnessMode,
    /// Curve applied to each channel.
    pub gamma: Gamma,
}

impl Encoding {
    /// The four bytes sent for one pixel.
    #[must_use]
    pub fn led_frame(&self, pixel: &Pixel) -> [u8; LED_FRAME_LEN] {
        let color = Rgb::new(
            self.gamma.correct(pixel.color.r),
            self.gamma.correct(pixel.color.g),
            self.gamma.correct(pixel.color.b),
        );
        let (control, color) = match self.brightness_mode {
            BrightnessMode::Hardware => (control_byte(brightness_level(pixel.brightness)), color),
            BrightnessMode::Software => (
                control_byte(BRIGHTNESS_LEVEL_MAX),
                Rgb::new(
                    scale_channel(color.r, pixel.brightness),
                    scale_channel(color.g, pixel.brightness),
                    scale_channel(color.b, pixel.brightness),
                ),
            ),
        };
        let [first, second, third] = self.pixel_order.to_wire(color);
        [control, first, second, third]
    }

    /// Iterate over the wire bytes for `pixels`, resolving inherited brightness against
    /// `strip_brightness`.
    pub(crate) const fn frame<'a>(
        &self,
        pixels: &'a [StoredPixel],
        strip_brightness: f32,
    ) -> WireFrame<'a> {
        WireFrame {
            encoding: *self,
            pixels,
            strip_brightness,
            position: 0,
            len: frame_len(pixels.len()),
            led_frame: [0x00; LED_FRAME_LEN],
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "brightness is 0.0..=1.0"
)]
fn scale_channel(value: u8, brightness: f32) -> u8 {
    (f32::from(value) * brightness.clamp(0.0, 1.0)) as u8
}

/// Iterator over the bytes of one wire frame.
///
/// Created by [`StripBuffer::encode`](super::StripBuffer::encode). Borrows the pixels, so
/// it always reflects the buffer at the time it was created.
#[derive(Clone, Debug)]
pub struct WireFrame<'a> {
    encoding: Encoding,
    pixels: &'a [StoredPixel],
    strip_brightness: f32,
    position: usize,
    len: usize,
    // Encoded once at the first byte of each LED frame.
    led_frame: [u8; LED_FRAME_LEN],
}

impl Iterator for WireFrame<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.position >= self.len {
            return None;
        }
        let position = self.position;
        self.position += 1;

        let Some(offset) = position.checked_sub(START_FRAME_LEN) else {
            return Some(0x00);
        };
        let Some(pixel) = self.pixels.get(offset / LED_FRAME_LEN) else {
            return Some(0x00);
        };
        let byte_index = offset % LED_FRAME_LEN;
        if byte_index == 0 {
            self.led_frame = self
                .encoding
                .led_frame(&pixel.resolve(self.strip_brightness));
        }
        self.led_frame.get(byte_index).copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for WireFrame<'_> {}

impl core::iter::FusedIterator for WireFrame<'_> {}
