#![allow(missing_docs)]
#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};

use dotstar_envoy::{
    Error,
    dotstar::{Config, DotStar, PinError, colors},
};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

const LEN: usize = 30;

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let err = inner_main().await.unwrap_err();
    panic!("{err}");
}

async fn inner_main() -> Result<Infallible, Error<PinError<Infallible, Infallible>>> {
    let p = embassy_rp::init(Default::default());

    let clock = Output::new(p.PIN_2, Level::Low);
    let data = Output::new(p.PIN_3, Level::Low);
    let config = Config::new().with_brightness(0.2).with_auto_write(false);
    let mut dotstar30 = DotStar::<_, LEN>::new_bit_bang(clock, data, config)?;

    let mut head = 0;
    loop {
        dotstar30.fill(colors::BLACK)?;
        dotstar30.set(head, colors::ORANGE)?;
        // A dimmer tail, with its own brightness.
        dotstar30.set((head + LEN - 1) % LEN, (255, 64, 0, 0.05))?;
        dotstar30.show()?;

        head = (head + 1) % LEN;
        Timer::after(Duration::from_millis(40)).await;
    }
}
