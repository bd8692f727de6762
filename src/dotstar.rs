//! A device abstraction for APA102-style ("DotStar") LED strips.
//!
//! A [`DotStar`] owns a fixed-length [`StripBuffer`] of [`Pixel`]s and a
//! [`LineDriver`](line_driver::LineDriver) that clocks the encoded bytes out. Pixels are
//! read and written by index; colors can be given as `(r, g, b)`, `(r, g, b, brightness)`,
//! `0xRRGGBB`, or any of the color types in [`ColorInput`].
//!
//! With [`Config::auto_write`] on (the default), every change is sent to the strip at
//! once. Turn it off to batch changes and call [`DotStar::show`] yourself.
//!
//! # Example: Set a Few Pixels
//!
//! ```
//! # use core::convert::Infallible;
//! # struct Spi;
//! # impl embedded_hal::spi::ErrorType for Spi { type Error = Infallible; }
//! # impl embedded_hal::spi::SpiBus for Spi {
//! #     fn read(&mut self, _: &mut [u8]) -> Result<(), Infallible> { Ok(()) }
//! #     fn write(&mut self, _: &[u8]) -> Result<(), Infallible> { Ok(()) }
//! #     fn transfer(&mut self, _: &mut [u8], _: &[u8]) -> Result<(), Infallible> { Ok(()) }
//! #     fn transfer_in_place(&mut self, _: &mut [u8]) -> Result<(), Infallible> { Ok(()) }
//! #     fn flush(&mut self) -> Result<(), Infallible> { Ok(()) }
//! # }
//! # fn main() -> Result<(), dotstar_envoy::Error<Infallible>> {
//! use dotstar_envoy::dotstar::{Config, DotStar, PixelOrder, colors};
//!
//! let config = Config::new()
//!     .with_pixel_order(PixelOrder::Bgr)
//!     .with_brightness(0.2)
//!     .with_auto_write(false);
//! let mut strip = DotStar::<_, 30>::new_spi(Spi, config)?;
//!
//! strip.set(0, (255, 0, 0))?; // red at the strip's brightness (0.2)
//! strip.set(1, (0, 255, 0, 1.0))?; // green at full brightness
//! strip.set(2, 0x00_00_FF)?; // blue
//! strip.set(3, colors::ORANGE)?;
//! strip.show()?;
//!
//! assert_eq!(strip.get(2)?.brightness, 0.2);
//! # Ok(())
//! # }
//! ```

use core::ops::{Deref, DerefMut};

use smart_leds::SmartLedsWrite;

use crate::{Error, Result};
use color::StoredPixel;

pub mod color;
pub mod line_driver;
pub mod wire;

pub use color::{ColorInput, HEX_MAX, Pixel, Rgb, ToRgb8, ToRgb888, hex_to_rgb};
pub use line_driver::{AsyncLineDriver, BitBangLineDriver, LineDriver, PinError, SpiLineDriver};
pub use wire::{BrightnessMode, Encoding, Gamma, PixelOrder, WireFrame};

/// Predefined RGB color constants from the `smart_leds` crate.
///
/// Common colors include `RED`, `GREEN`, `BLUE`, `YELLOW`, `WHITE`, `BLACK`, `CYAN`, `MAGENTA`, `ORANGE`, `PURPLE`.
#[doc(inline)]
pub use smart_leds::colors;

/// 8-bit-per-channel RGB color from `embedded_graphics`.
#[doc(inline)]
pub use embedded_graphics::pixelcolor::Rgb888;

/// RGB color type used by LED strip frames.
pub use smart_leds::RGB8;

// ============================================================================
// Configuration
// ============================================================================

/// Default channel order ([`PixelOrder::Bgr`]).
pub const PIXEL_ORDER_DEFAULT: PixelOrder = PixelOrder::Bgr;

/// Default brightness for pixels assigned without one (full).
pub const BRIGHTNESS_DEFAULT: f32 = 1.0;

/// Whether changes are sent to the strip immediately by default.
pub const AUTO_WRITE_DEFAULT: bool = true;

/// Default brightness mode ([`BrightnessMode::Hardware`]).
pub const BRIGHTNESS_MODE_DEFAULT: BrightnessMode = BrightnessMode::Hardware;

/// Default gamma curve ([`Gamma::Linear`]).
pub const GAMMA_DEFAULT: Gamma = Gamma::Linear;

/// Strip-wide settings, fixed when the strip is created.
///
/// See the [module documentation](mod@crate::dotstar) for usage examples.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Channel order on the wire.
    pub pixel_order: PixelOrder,
    /// Brightness for pixels assigned without one, `0.0..=1.0`.
    pub brightness: f32,
    /// Send every change to the strip immediately.
    pub auto_write: bool,
    /// Where brightness is applied.
    pub brightness_mode: BrightnessMode,
    /// Curve applied to color channels.
    pub gamma: Gamma,
}

impl Config {
    /// All defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pixel_order: PIXEL_ORDER_DEFAULT,
            brightness: BRIGHTNESS_DEFAULT,
            auto_write: AUTO_WRITE_DEFAULT,
            brightness_mode: BRIGHTNESS_MODE_DEFAULT,
            gamma: GAMMA_DEFAULT,
        }
    }

    /// Set [`pixel_order`](Self::pixel_order).
    #[must_use]
    pub const fn with_pixel_order(mut self, pixel_order: PixelOrder) -> Self {
        self.pixel_order = pixel_order;
        self
    }

    /// Set [`brightness`](Self::brightness). Checked when the strip is created.
    #[must_use]
    pub const fn with_brightness(mut self, brightness: f32) -> Self {
        self.brightness = brightness;
        self
    }

    /// Set [`auto_write`](Self::auto_write).
    #[must_use]
    pub const fn with_auto_write(mut self, auto_write: bool) -> Self {
        self.auto_write = auto_write;
        self
    }

    /// Set [`brightness_mode`](Self::brightness_mode).
    #[must_use]
    pub const fn with_brightness_mode(mut self, brightness_mode: BrightnessMode) -> Self {
        self.brightness_mode = brightness_mode;
        self
    }

    /// Set [`gamma`](Self::gamma).
    #[must_use]
    pub const fn with_gamma(mut self, gamma: Gamma) -> Self {
        self.gamma = gamma;
        self
    }

    /// The settings the encoder needs.
    #[must_use]
    pub const fn encoding(&self) -> Encoding {
        Encoding {
            pixel_order: self.pixel_order,
            brightness_mode: self.brightness_mode,
            gamma: self.gamma,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Frame1d
// ============================================================================

/// [`Rgb`] pixel data for a whole strip.
///
/// Frames deref to `[Rgb; N]`, so you can mutate pixels directly before passing them to
/// [`DotStar::write_frame`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Frame1d<const N: usize>(pub [Rgb; N]);

impl<const N: usize> Frame1d<N> {
    /// Number of LEDs in this frame.
    pub const LEN: usize = N;

    /// Create a new blank (all black) frame.
    #[must_use]
    pub const fn new() -> Self {
        Self([Rgb::new(0, 0, 0); N])
    }

    /// Create a frame filled with a single color.
    #[must_use]
    pub const fn filled(color: Rgb) -> Self {
        Self([color; N])
    }
}

impl<const N: usize> Deref for Frame1d<N> {
    type Target = [Rgb; N];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const N: usize> DerefMut for Frame1d<N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<const N: usize> From<[Rgb; N]> for Frame1d<N> {
    fn from(array: [Rgb; N]) -> Self {
        Self(array)
    }
}

impl<const N: usize> From<Frame1d<N>> for [Rgb; N] {
    fn from(frame: Frame1d<N>) -> Self {
        frame.0
    }
}

impl<const N: usize> Default for Frame1d<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Strip Buffer
// ============================================================================

/// The in-memory state of `N` pixels, plus the encoder for the wire format.
///
/// This is the hardware-free half of a [`DotStar`]; every `DotStar` derefs to one for
/// reading. Length is fixed by `N`.
///
/// Pixels assigned without a brightness follow the strip brightness: changing it with
/// [`set_brightness`](Self::set_brightness) dims or brightens them all. Pixels given an
/// explicit brightness keep it.
#[derive(Clone, Debug, PartialEq)]
pub struct StripBuffer<const N: usize> {
    pixels: [StoredPixel; N],
    config: Config,
}

impl<const N: usize> StripBuffer<N> {
    /// Number of pixels.
    pub const LEN: usize = N;

    /// Bytes in one encoded wire frame.
    pub const FRAME_LEN: usize = wire::frame_len(N);

    /// Create an all-black buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BrightnessOutOfRange`] if `config.brightness` is NaN or outside
    /// `0.0..=1.0`.
    pub fn new(config: Config) -> Result<Self> {
        color::check_brightness(config.brightness)?;
        Ok(Self {
            pixels: [StoredPixel::BLACK; N],
            config,
        })
    }

    /// Number of pixels.
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// True for a zero-length strip.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// The settings this buffer was created with (brightness reflects later changes).
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The strip brightness, used by every pixel assigned without one.
    #[must_use]
    pub const fn brightness(&self) -> f32 {
        self.config.brightness
    }

    /// Change the strip brightness, clamped to `0.0..=1.0`.
    ///
    /// Every pixel assigned without an explicit brightness takes the new value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BrightnessOutOfRange`] for NaN.
    pub fn set_brightness(&mut self, brightness: f32) -> Result<()> {
        if brightness.is_nan() {
            return Err(Error::BrightnessOutOfRange);
        }
        self.config.brightness = brightness.clamp(0.0, 1.0);
        Ok(())
    }

    /// Read one pixel, with its effective brightness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index >= N`.
    pub fn get(&self, index: usize) -> Result<Pixel> {
        self.pixels
            .get(index)
            .map(|pixel| pixel.resolve(self.config.brightness))
            .ok_or(Error::IndexOutOfBounds { index, len: N })
    }

    /// Normalize `color` and store it at `index`.
    ///
    /// Nothing changes on error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index >= N`, [`Error::ColorOutOfRange`] for
    /// hex values above [`HEX_MAX`], or [`Error::BrightnessOutOfRange`] for a bad explicit
    /// brightness.
    pub fn set(&mut self, index: usize, color: impl Into<ColorInput>) -> Result<()> {
        let pixel = StoredPixel::from_input(color)?;
        let slot = self
            .pixels
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len: N })?;
        *slot = pixel;
        Ok(())
    }

    /// Normalize `color` once and store it in every pixel.
    ///
    /// # Errors
    ///
    /// Same color errors as [`set`](Self::set); nothing changes.
    pub fn fill(&mut self, color: impl Into<ColorInput>) -> Result<()> {
        let pixel = StoredPixel::from_input(color)?;
        self.pixels.fill(pixel);
        Ok(())
    }

    /// Copy a whole frame in. Every pixel follows the strip brightness.
    pub fn set_frame(&mut self, frame: &Frame1d<N>) {
        for (pixel, &color) in self.pixels.iter_mut().zip(frame.iter()) {
            *pixel = StoredPixel {
                color,
                brightness: None,
            };
        }
    }

    /// All pixels, in strip order, with their effective brightness.
    #[must_use]
    pub fn pixels(&self) -> [Pixel; N] {
        self.pixels
            .map(|pixel| pixel.resolve(self.config.brightness))
    }

    /// Iterate over the pixels in strip order, with their effective brightness.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Pixel> + '_ {
        let brightness = self.config.brightness;
        self.pixels.iter().map(move |pixel| pixel.resolve(brightness))
    }

    /// The colors alone, as a frame.
    #[must_use]
    pub fn to_frame(&self) -> Frame1d<N> {
        Frame1d(self.pixels.map(|pixel| pixel.color))
    }

    /// Iterate over the wire bytes for the current state. Pure: nothing is sent.
    #[must_use]
    pub const fn encode(&self) -> WireFrame<'_> {
        self.config
            .encoding()
            .frame(&self.pixels, self.config.brightness)
    }

    /// Encode into `buffer`, returning the number of bytes written
    /// ([`FRAME_LEN`](Self::FRAME_LEN)).
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`] if `buffer` is shorter than one frame.
    pub fn encode_into(&self, buffer: &mut [u8]) -> Result<usize> {
        let needed = Self::FRAME_LEN;
        let capacity = buffer.len();
        let target = buffer
            .get_mut(..needed)
            .ok_or(Error::BufferTooSmall { needed, capacity })?;
        for (slot, byte) in target.iter_mut().zip(self.encode()) {
            *slot = byte;
        }
        Ok(needed)
    }

    /// Encode into a fixed-capacity `heapless::Vec`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`] if `CAP` is less than one frame.
    pub fn encode_to_vec<const CAP: usize>(&self) -> Result<heapless::Vec<u8, CAP>> {
        if CAP < Self::FRAME_LEN {
            return Err(Error::BufferTooSmall {
                needed: Self::FRAME_LEN,
                capacity: CAP,
            });
        }
        Ok(self.encode().collect())
    }
}

// ============================================================================
// DotStar
// ============================================================================

/// Size of the stack buffer used to stream a frame to the line driver.
const CHUNK_LEN: usize = 64;

/// An APA102 ("DotStar") strip of `N` pixels driven through `D`.
///
/// Derefs to [`StripBuffer`] for reading (`get`, `len`, `encode`, ...). Changes go through
/// the methods here so that `auto_write` can send them.
///
/// `D` may be owned or a `&mut` borrow of a driver.
///
/// See the [module documentation](mod@crate::dotstar) for usage examples.
#[derive(Debug)]
pub struct DotStar<D, const N: usize> {
    buffer: StripBuffer<N>,
    line_driver: D,
}

impl<D, const N: usize> DotStar<D, N> {
    /// Number of pixels.
    pub const LEN: usize = N;

    /// Create a strip that sends through `line_driver`. Nothing is sent yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BrightnessOutOfRange`] if `config.brightness` is NaN or outside
    /// `0.0..=1.0`.
    pub fn new(line_driver: D, config: Config) -> Result<Self> {
        let buffer = StripBuffer::new(config)?;
        info!(
            "DotStar: {} pixels, {} bytes per frame, auto_write {}",
            N,
            StripBuffer::<N>::FRAME_LEN,
            config.auto_write
        );
        Ok(Self {
            buffer,
            line_driver,
        })
    }

    /// The line driver.
    #[must_use]
    pub const fn line_driver(&self) -> &D {
        &self.line_driver
    }

    /// The line driver, mutably. Bytes written here bypass the strip.
    pub const fn line_driver_mut(&mut self) -> &mut D {
        &mut self.line_driver
    }

    /// Split into buffer and line driver without blanking the strip.
    #[must_use]
    pub fn into_parts(self) -> (StripBuffer<N>, D) {
        (self.buffer, self.line_driver)
    }
}

impl<SPI, const N: usize> DotStar<SpiLineDriver<SPI>, N> {
    /// Create a strip on a hardware SPI bus (clock on SCK, data on MOSI).
    ///
    /// # Errors
    ///
    /// Returns [`Error::BrightnessOutOfRange`] for a bad `config.brightness`.
    pub fn new_spi(spi: SPI, config: Config) -> Result<Self, Error<core::convert::Infallible>> {
        Self::new(SpiLineDriver::new(spi), config)
    }
}

impl<CLK, DATA, const N: usize> DotStar<BitBangLineDriver<CLK, DATA>, N>
where
    CLK: embedded_hal::digital::OutputPin,
    DATA: embedded_hal::digital::OutputPin,
{
    /// Create a strip on two GPIO output pins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LineDriver`] if the clock pin cannot be driven low, or
    /// [`Error::BrightnessOutOfRange`] for a bad `config.brightness`.
    pub fn new_bit_bang(
        clock: CLK,
        data: DATA,
        config: Config,
    ) -> Result<Self, Error<PinError<CLK::Error, DATA::Error>>> {
        let buffer = StripBuffer::new(config)
            .map_err(Error::widen::<PinError<CLK::Error, DATA::Error>>)?;
        let line_driver = BitBangLineDriver::new(clock, data).map_err(Error::LineDriver)?;
        Ok(Self {
            buffer,
            line_driver,
        })
    }
}

impl<D, const N: usize> Deref for DotStar<D, N> {
    type Target = StripBuffer<N>;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl<D: LineDriver, const N: usize> DotStar<D, N> {
    /// Send the current buffer to the strip.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LineDriver`] with the driver's error, unchanged. Not retried.
    pub fn show(&mut self) -> Result<(), Error<D::Error>> {
        trace!("DotStar::show: {} bytes", StripBuffer::<N>::FRAME_LEN);
        let mut chunk = [0u8; CHUNK_LEN];
        let mut filled = 0;
        for byte in self.buffer.encode() {
            if let Some(slot) = chunk.get_mut(filled) {
                *slot = byte;
                filled += 1;
            }
            if filled == CHUNK_LEN {
                self.line_driver.write(&chunk).map_err(Error::LineDriver)?;
                filled = 0;
            }
        }
        if let Some(rest) = chunk.get(..filled).filter(|rest| !rest.is_empty()) {
            self.line_driver.write(rest).map_err(Error::LineDriver)?;
        }
        self.line_driver.flush().map_err(Error::LineDriver)
    }

    /// Store `color` at `index`, then send if `auto_write` is on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] or a color error (nothing changes), or
    /// [`Error::LineDriver`] if sending fails.
    pub fn set(
        &mut self,
        index: usize,
        color: impl Into<ColorInput>,
    ) -> Result<(), Error<D::Error>> {
        self.buffer.set(index, color).map_err(Error::widen::<D::Error>)?;
        self.auto_show()
    }

    /// Store `color` in every pixel, then send if `auto_write` is on.
    ///
    /// # Errors
    ///
    /// Returns a color error (nothing changes), or [`Error::LineDriver`] if sending fails.
    pub fn fill(&mut self, color: impl Into<ColorInput>) -> Result<(), Error<D::Error>> {
        self.buffer.fill(color).map_err(Error::widen::<D::Error>)?;
        self.auto_show()
    }

    /// Change the strip brightness (clamped), then send if `auto_write` is on. Pixels without
    /// an explicit brightness follow it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BrightnessOutOfRange`] for NaN, or [`Error::LineDriver`].
    pub fn set_brightness(&mut self, brightness: f32) -> Result<(), Error<D::Error>> {
        self.buffer.set_brightness(brightness).map_err(Error::widen::<D::Error>)?;
        self.auto_show()
    }

    /// Replace every pixel's color (default brightness) and send once, whatever
    /// `auto_write` says.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LineDriver`] if sending fails.
    pub fn write_frame(&mut self, frame: &Frame1d<N>) -> Result<(), Error<D::Error>> {
        self.buffer.set_frame(frame);
        self.show()
    }

    /// Blank the strip and give the line driver back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LineDriver`] if the blank frame cannot be sent.
    pub fn deinit(mut self) -> Result<D, Error<D::Error>> {
        debug!("DotStar::deinit: blanking {} pixels", N);
        self.buffer.set_frame(&Frame1d::new());
        self.show()?;
        Ok(self.line_driver)
    }

    fn auto_show(&mut self) -> Result<(), Error<D::Error>> {
        if self.buffer.config.auto_write {
            self.show()
        } else {
            Ok(())
        }
    }
}

impl<D: AsyncLineDriver, const N: usize> DotStar<D, N> {
    /// Async [`show`](Self::show).
    ///
    /// # Errors
    ///
    /// Returns [`Error::LineDriver`] with the driver's error, unchanged.
    pub async fn show_async(&mut self) -> Result<(), Error<D::Error>> {
        trace!("DotStar::show_async: {} bytes", StripBuffer::<N>::FRAME_LEN);
        let mut chunk = [0u8; CHUNK_LEN];
        let mut filled = 0;
        for byte in self.buffer.encode() {
            if let Some(slot) = chunk.get_mut(filled) {
                *slot = byte;
                filled += 1;
            }
            if filled == CHUNK_LEN {
                self.line_driver
                    .write(&chunk)
                    .await
                    .map_err(Error::LineDriver)?;
                filled = 0;
            }
        }
        if let Some(rest) = chunk.get(..filled).filter(|rest| !rest.is_empty()) {
            self.line_driver.write(rest).await.map_err(Error::LineDriver)?;
        }
        self.line_driver.flush().await.map_err(Error::LineDriver)
    }

    /// Async [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set).
    pub async fn set_async(
        &mut self,
        index: usize,
        color: impl Into<ColorInput>,
    ) -> Result<(), Error<D::Error>> {
        self.buffer.set(index, color).map_err(Error::widen::<D::Error>)?;
        if self.buffer.config.auto_write {
            self.show_async().await?;
        }
        Ok(())
    }

    /// Async [`fill`](Self::fill).
    ///
    /// # Errors
    ///
    /// Same as [`fill`](Self::fill).
    pub async fn fill_async(
        &mut self,
        color: impl Into<ColorInput>,
    ) -> Result<(), Error<D::Error>> {
        self.buffer.fill(color).map_err(Error::widen::<D::Error>)?;
        if self.buffer.config.auto_write {
            self.show_async().await?;
        }
        Ok(())
    }

    /// Async [`write_frame`](Self::write_frame).
    ///
    /// # Errors
    ///
    /// Returns [`Error::LineDriver`] if sending fails.
    pub async fn write_frame_async(&mut self, frame: &Frame1d<N>) -> Result<(), Error<D::Error>> {
        self.buffer.set_frame(frame);
        self.show_async().await
    }
}

impl<D: LineDriver, const N: usize> SmartLedsWrite for DotStar<D, N> {
    type Error = Error<D::Error>;
    type Color = Rgb;

    /// Assign colors from the start of the strip (strip brightness) and send.
    /// Extra colors are ignored; pixels past the end of `iterator` keep their state.
    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        for (pixel, color) in self.buffer.pixels.iter_mut().zip(iterator) {
            *pixel = StoredPixel {
                color: color.into(),
                brightness: None,
            };
        }
        self.show()
    }
}
