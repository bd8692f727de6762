#![allow(missing_docs)]
#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};

use dotstar_envoy::{
    Error,
    dotstar::{Config, DotStar, Frame1d, colors},
};
use embassy_executor::Spawner;
use embassy_rp::spi::{self, Spi};
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let err = inner_main().await.unwrap_err();
    panic!("{err}");
}

async fn inner_main() -> Result<Infallible, Error<spi::Error>> {
    let p = embassy_rp::init(Default::default());

    let mut spi_config = spi::Config::default();
    spi_config.frequency = 4_000_000;
    // Clock on GPIO18 (SCK), data on GPIO19 (MOSI).
    let spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);

    let config = Config::new().with_brightness(0.1);
    let mut dotstar8 =
        DotStar::<_, 8>::new_spi(spi, config).map_err(Error::widen::<spi::Error>)?;

    let palette = [colors::BLUE, colors::LIGHT_GRAY];
    let mut frame0 = Frame1d::new();
    let mut frame1 = frame0;
    for pixel_index in 0..frame0.len() {
        frame0[pixel_index] = palette[pixel_index % 2];
        frame1[pixel_index] = palette[(pixel_index + 1) % 2];
    }

    loop {
        dotstar8.write_frame(&frame0)?;
        Timer::after(Duration::from_millis(150)).await;
        dotstar8.write_frame(&frame1)?;
        Timer::after(Duration::from_millis(150)).await;
    }
}
