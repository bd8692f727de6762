//! Device abstractions for APA102-family ("DotStar") addressable LED strips.
//!
//! See the [`dotstar`] module for the strip itself and [`dotstar::line_driver`]
//! for the ways bytes reach the LEDs.
//!
//! # Glossary
//!
//! - **APA102 / DotStar:** An addressable RGB LED with a separate clock line. Each LED
//!   latches 32 bits (a brightness byte and three color bytes) and forwards the rest.
//! - **Line driver:** Whatever clocks the encoded bytes onto the two wires. A hardware
//!   SPI bus (clock = SCK, data = MOSI) or two plain GPIO outputs.
//! - **Global brightness:** The 5-bit field in each LED's first byte. The LED applies it by
//!   PWM at a much lower rate than the color channels, which matters for
//!   persistence-of-vision work. See [`BrightnessMode`](dotstar::BrightnessMode).
#![cfg_attr(not(any(test, feature = "host")), no_std)]
#![allow(async_fn_in_trait, reason = "single-threaded embedded")]

// Must come first so the logging macros are visible to every module below.
#[macro_use]
mod fmt;

pub mod dotstar;
#[cfg(feature = "host")]
pub mod dotstar_host;
mod error;
#[cfg(feature = "host")]
pub mod to_png;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
