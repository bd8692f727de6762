//! Color inputs accepted at the assignment boundary and the canonical [`Pixel`].

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::RgbColor;
use smart_leds::RGB8;

use crate::{Error, Result};

/// RGB color representation re-exported from the `smart_leds` crate.
pub type Rgb = RGB8;

/// Largest value accepted by [`ColorInput::Hex`].
pub const HEX_MAX: u32 = 0x00FF_FFFF;

/// A color as supplied by the caller, before normalization.
///
/// Usually you don't name this type: every setter takes `impl Into<ColorInput>`, so
/// tuples, hex integers, and color structs all work directly.
///
/// ```
/// use dotstar_envoy::dotstar::{ColorInput, Rgb};
///
/// assert_eq!(ColorInput::from((16, 32, 48)), ColorInput::Rgb(Rgb::new(16, 32, 48)));
/// assert_eq!(ColorInput::from(0x10_20_30), ColorInput::Hex(0x10_20_30));
/// assert_eq!(
///     ColorInput::from((16, 32, 48, 0.5)),
///     ColorInput::RgbBrightness(Rgb::new(16, 32, 48), 0.5)
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorInput {
    /// Red, green, blue. Brightness comes from the strip default.
    Rgb(Rgb),
    /// Red, green, blue, and an explicit brightness in `0.0..=1.0`.
    RgbBrightness(Rgb, f32),
    /// `0xRRGGBB`. Brightness comes from the strip default.
    Hex(u32),
}

impl From<Rgb> for ColorInput {
    fn from(color: Rgb) -> Self {
        Self::Rgb(color)
    }
}

impl From<(u8, u8, u8)> for ColorInput {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::Rgb(Rgb::new(red, green, blue))
    }
}

impl From<(u8, u8, u8, f32)> for ColorInput {
    fn from((red, green, blue, brightness): (u8, u8, u8, f32)) -> Self {
        Self::RgbBrightness(Rgb::new(red, green, blue), brightness)
    }
}

impl From<(Rgb, f32)> for ColorInput {
    fn from((color, brightness): (Rgb, f32)) -> Self {
        Self::RgbBrightness(color, brightness)
    }
}

impl From<u32> for ColorInput {
    fn from(hex: u32) -> Self {
        Self::Hex(hex)
    }
}

impl From<Rgb888> for ColorInput {
    fn from(color: Rgb888) -> Self {
        Self::Rgb(color.to_rgb8())
    }
}

impl From<Pixel> for ColorInput {
    fn from(pixel: Pixel) -> Self {
        Self::RgbBrightness(pixel.color, pixel.brightness)
    }
}

/// The canonical state of one LED: an 8-bit color and a brightness factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pixel {
    /// Channel intensities.
    pub color: Rgb,
    /// Brightness in `0.0..=1.0`.
    pub brightness: f32,
}

impl Pixel {
    /// Create a pixel, checking that `brightness` is within `0.0..=1.0`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BrightnessOutOfRange`] if `brightness` is NaN or out of range.
    pub fn new(color: Rgb, brightness: f32) -> Result<Self> {
        Ok(Self {
            color,
            brightness: check_brightness(brightness)?,
        })
    }

    /// Normalize a [`ColorInput`], using `default_brightness` when the input carries none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColorOutOfRange`] for hex values above [`HEX_MAX`] and
    /// [`Error::BrightnessOutOfRange`] for a bad explicit or default brightness.
    pub fn from_input(input: impl Into<ColorInput>, default_brightness: f32) -> Result<Self> {
        let default_brightness = check_brightness(default_brightness)?;
        Ok(StoredPixel::from_input(input)?.resolve(default_brightness))
    }
}

/// A pixel as held in a strip buffer. `None` follows the strip brightness, so changing
/// that brightness dims the pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StoredPixel {
    pub(crate) color: Rgb,
    pub(crate) brightness: Option<f32>,
}

impl StoredPixel {
    pub(crate) const BLACK: Self = Self {
        color: Rgb::new(0, 0, 0),
        brightness: None,
    };

    /// Validate `input`, keeping only a brightness the caller gave explicitly.
    pub(crate) fn from_input(input: impl Into<ColorInput>) -> Result<Self> {
        match input.into() {
            ColorInput::Rgb(color) => Ok(Self {
                color,
                brightness: None,
            }),
            ColorInput::RgbBrightness(color, brightness) => Ok(Self {
                color,
                brightness: Some(check_brightness(brightness)?),
            }),
            ColorInput::Hex(hex) => Ok(Self {
                color: hex_to_rgb(hex)?,
                brightness: None,
            }),
        }
    }

    pub(crate) fn resolve(self, strip_brightness: f32) -> Pixel {
        Pixel {
            color: self.color,
            brightness: self.brightness.unwrap_or(strip_brightness),
        }
    }
}

/// Split `0xRRGGBB` into channels.
///
/// # Errors
///
/// Returns [`Error::ColorOutOfRange`] if `hex` is above [`HEX_MAX`].
pub fn hex_to_rgb(hex: u32) -> Result<Rgb> {
    if hex > HEX_MAX {
        return Err(Error::ColorOutOfRange(hex));
    }
    let [_, red, green, blue] = hex.to_be_bytes();
    Ok(Rgb::new(red, green, blue))
}

pub(crate) fn check_brightness(brightness: f32) -> Result<f32> {
    // NaN fails `contains`.
    if (0.0..=1.0).contains(&brightness) {
        Ok(brightness)
    } else {
        Err(Error::BrightnessOutOfRange)
    }
}

/// Convert colors to [`RGB8`] for LED strip rendering.
///
/// # Example
///
/// ```rust
/// use dotstar_envoy::dotstar::{Rgb888, ToRgb8, RGB8};
///
/// let rgb8 = RGB8::new(16, 32, 48).to_rgb8();
/// let rgb888 = Rgb888::new(16, 32, 48);
///
/// assert_eq!(rgb8, rgb888.to_rgb8());
/// ```
pub trait ToRgb8 {
    /// Convert this color to [`RGB8`].
    #[must_use]
    fn to_rgb8(self) -> RGB8;
}

impl ToRgb8 for RGB8 {
    #[inline]
    fn to_rgb8(self) -> RGB8 {
        self
    }
}

impl ToRgb8 for Rgb888 {
    #[inline]
    fn to_rgb8(self) -> RGB8 {
        RGB8::new(self.r(), self.g(), self.b())
    }
}

/// Convert colors to [`Rgb888`] for embedded-graphics rendering.
pub trait ToRgb888 {
    /// Convert this color to [`Rgb888`].
    #[must_use]
    fn to_rgb888(self) -> Rgb888;
}

impl ToRgb888 for RGB8 {
    #[inline]
    fn to_rgb888(self) -> Rgb888 {
        Rgb888::new(self.r, self.g, self.b)
    }
}

impl ToRgb888 for Rgb888 {
    #[inline]
    fn to_rgb888(self) -> Rgb888 {
        self
    }
}
