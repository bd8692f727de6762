//! Line drivers: the capability that clocks encoded bytes out over the two wires.
//!
//! A [`DotStar`](super::DotStar) only ever hands finished bytes to a driver, so anything
//! implementing [`LineDriver`] (or [`AsyncLineDriver`]) can stand in for real hardware.
//!
//! - [`SpiLineDriver`] uses a hardware SPI bus. Clock is SCK, data is MOSI; no chip
//!   select is involved.
//! - [`BitBangLineDriver`] toggles two GPIO output pins.

use core::fmt::Debug;

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

/// Blocking transmission of encoded bytes.
pub trait LineDriver {
    /// Error reported by the underlying bus or pins.
    type Error: Debug;

    /// Clock `bytes` out, most significant bit first.
    ///
    /// # Errors
    ///
    /// Returns the underlying bus or pin error.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Finish any buffered transmission and leave the lines idle.
    ///
    /// # Errors
    ///
    /// Returns the underlying bus or pin error.
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T: LineDriver + ?Sized> LineDriver for &mut T {
    type Error = T::Error;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write(bytes)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush()
    }
}

/// Async counterpart of [`LineDriver`].
pub trait AsyncLineDriver {
    /// Error reported by the underlying bus.
    type Error: Debug;

    /// Clock `bytes` out, most significant bit first.
    ///
    /// # Errors
    ///
    /// Returns the underlying bus error.
    async fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Finish any buffered transmission.
    ///
    /// # Errors
    ///
    /// Returns the underlying bus error.
    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T: AsyncLineDriver + ?Sized> AsyncLineDriver for &mut T {
    type Error = T::Error;

    async fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write(bytes).await
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush().await
    }
}

// ============================================================================
// SPI
// ============================================================================

/// Sends bytes over an SPI bus (blocking or async).
///
/// APA102 LEDs sample data on the rising clock edge, so use SPI mode 0. Most strips are
/// happy at a few MHz; long strips may need less.
#[derive(Debug)]
pub struct SpiLineDriver<SPI> {
    spi: SPI,
}

impl<SPI> SpiLineDriver<SPI> {
    /// Wrap a configured SPI bus.
    #[must_use]
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Give the bus back.
    #[must_use]
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiBus<u8>> LineDriver for SpiLineDriver<SPI> {
    type Error = SPI::Error;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        SpiBus::write(&mut self.spi, bytes)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        SpiBus::flush(&mut self.spi)
    }
}

impl<SPI: embedded_hal_async::spi::SpiBus<u8>> AsyncLineDriver for SpiLineDriver<SPI> {
    type Error = SPI::Error;

    async fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        embedded_hal_async::spi::SpiBus::write(&mut self.spi, bytes).await
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        embedded_hal_async::spi::SpiBus::flush(&mut self.spi).await
    }
}

// ============================================================================
// Bit-banged GPIO
// ============================================================================

/// A pin failure from [`BitBangLineDriver`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError<C, D> {
    /// The clock pin failed.
    Clock(C),
    /// The data pin failed.
    Data(D),
}

/// Sends bytes by toggling a clock pin and a data pin.
///
/// No delays are inserted; the clock rate is however fast the pins can toggle, which
/// APA102 LEDs tolerate well.
#[derive(Debug)]
pub struct BitBangLineDriver<CLK, DATA> {
    clock: CLK,
    data: DATA,
}

impl<CLK: OutputPin, DATA: OutputPin> BitBangLineDriver<CLK, DATA> {
    /// Take ownership of the two pins and drive the clock low.
    ///
    /// # Errors
    ///
    /// Returns [`PinError::Clock`] if the clock pin cannot be driven.
    pub fn new(clock: CLK, data: DATA) -> Result<Self, PinError<CLK::Error, DATA::Error>> {
        let mut line_driver = Self { clock, data };
        line_driver.set_clock(false)?;
        Ok(line_driver)
    }

    /// Give the pins back, clock first.
    #[must_use]
    pub fn release(self) -> (CLK, DATA) {
        (self.clock, self.data)
    }

    fn set_clock(&mut self, high: bool) -> Result<(), PinError<CLK::Error, DATA::Error>> {
        let result = if high {
            self.clock.set_high()
        } else {
            self.clock.set_low()
        };
        result.map_err(PinError::Clock)
    }

    fn set_data(&mut self, high: bool) -> Result<(), PinError<CLK::Error, DATA::Error>> {
        let result = if high {
            self.data.set_high()
        } else {
            self.data.set_low()
        };
        result.map_err(PinError::Data)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), PinError<CLK::Error, DATA::Error>> {
        for bit in (0..8u8).rev() {
            self.set_data(byte & (1 << bit) != 0)?;
            self.set_clock(true)?;
            self.set_clock(false)?;
        }
        Ok(())
    }
}

impl<CLK: OutputPin, DATA: OutputPin> LineDriver for BitBangLineDriver<CLK, DATA> {
    type Error = PinError<CLK::Error, DATA::Error>;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.set_clock(false)
    }
}
