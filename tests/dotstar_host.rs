#![cfg(feature = "host")]
#![allow(missing_docs)]
use dotstar_envoy::Error;
use dotstar_envoy::dotstar::{BrightnessMode, Config, DotStar, PixelOrder, Rgb, StripBuffer};
use dotstar_envoy::dotstar_host::{DecodedLed, RecordingLineDriver, decode_frame};
use embassy_futures::block_on;

#[test]
fn each_show_records_one_frame() {
    let config = Config::new().with_auto_write(false);
    let mut strip = DotStar::<_, 20>::new(RecordingLineDriver::new(), config).expect("valid");

    strip.show().expect("infallible");
    strip.set(19, (1, 2, 3)).expect("in range");
    strip.show().expect("infallible");

    let frames = strip.line_driver().frames();
    assert_eq!(frames.len(), 2);
    assert!(frames.iter().all(|frame| frame.len() == StripBuffer::<20>::FRAME_LEN));
    assert_ne!(frames[0], frames[1]);
    assert!(strip.line_driver().pending().is_empty());
}

#[test]
fn set_brightness_dims_a_lit_strip() {
    let mut strip = DotStar::<_, 2>::new(RecordingLineDriver::new(), Config::new()).expect("valid");
    strip.fill((200, 200, 200)).expect("valid");
    strip.set(1, (200, 200, 200, 0.5)).expect("in range");

    strip.set_brightness(0.1).expect("not NaN");

    let frames = strip.line_driver().frames();
    assert_eq!(frames.len(), 3);
    assert_ne!(frames[1], frames[2]);
    let before = decode_frame(&frames[1], PixelOrder::Bgr).expect("well formed");
    let after = decode_frame(&frames[2], PixelOrder::Bgr).expect("well formed");
    assert_eq!(before[0].level, 31);
    assert_eq!(after[0], DecodedLed { color: Rgb::new(200, 200, 200), level: 4 });
    assert_eq!(after[1], before[1]);
    assert_eq!(after[1].level, 16);
}

#[test]
fn decode_reverses_encode() {
    let config = Config::new().with_pixel_order(PixelOrder::Grb);
    let mut strip = StripBuffer::<3>::new(config).expect("valid");
    strip.set(0, (255, 0, 0, 1.0)).expect("in range");
    strip.set(1, (0, 128, 0, 0.5)).expect("in range");
    strip.set(2, 0x00_00_40).expect("in range");
    let bytes: Vec<u8> = strip.encode().collect();

    let leds = decode_frame(&bytes, PixelOrder::Grb).expect("well formed");

    assert_eq!(
        leds,
        [
            DecodedLed { color: Rgb::new(255, 0, 0), level: 31 },
            DecodedLed { color: Rgb::new(0, 128, 0), level: 16 },
            DecodedLed { color: Rgb::new(0, 0, 64), level: 31 },
        ]
    );
}

#[test]
fn software_mode_decodes_at_full_level() {
    let config = Config::new().with_brightness_mode(BrightnessMode::Software);
    let mut strip = StripBuffer::<1>::new(config).expect("valid");
    strip.set(0, (100, 100, 100, 0.5)).expect("in range");
    let bytes: Vec<u8> = strip.encode().collect();

    let leds = decode_frame(&bytes, PixelOrder::Bgr).expect("well formed");

    assert_eq!(leds[0].perceived(), Rgb::new(50, 50, 50));
}

#[test]
fn malformed_frames_are_rejected() {
    // Too short for a start frame.
    assert!(matches!(decode_frame(&[0, 0], PixelOrder::Bgr), Err(Error::MalformedFrame(2))));
    // Non-zero start frame.
    assert!(matches!(
        decode_frame(&[0, 0, 7, 0, 0xFF, 1, 2, 3, 0], PixelOrder::Bgr),
        Err(Error::MalformedFrame(2))
    ));
    // LED frame cut short.
    assert!(matches!(
        decode_frame(&[0, 0, 0, 0, 0xFF, 1], PixelOrder::Bgr),
        Err(Error::MalformedFrame(6))
    ));
    // Missing end frame.
    assert!(matches!(
        decode_frame(&[0, 0, 0, 0, 0xFF, 1, 2, 3], PixelOrder::Bgr),
        Err(Error::MalformedFrame(8))
    ));
    // Garbage after the LEDs.
    assert!(matches!(
        decode_frame(&[0, 0, 0, 0, 0xFF, 1, 2, 3, 0x12], PixelOrder::Bgr),
        Err(Error::MalformedFrame(8))
    ));
}

#[test]
fn empty_strip_decodes_to_nothing() {
    let strip = StripBuffer::<0>::new(Config::new()).expect("valid");
    let bytes: Vec<u8> = strip.encode().collect();

    assert!(decode_frame(&bytes, PixelOrder::Bgr).expect("well formed").is_empty());
}

#[test]
fn async_show_records_frames() {
    let mut strip = DotStar::<_, 2>::new(RecordingLineDriver::new(), Config::new()).expect("valid");

    block_on(strip.set_async(0, (9, 9, 9))).expect("infallible");
    block_on(strip.fill_async((0, 0, 0))).expect("infallible");

    let (_, mut line_driver) = strip.into_parts();
    let frames = line_driver.take_frames();
    assert_eq!(frames.len(), 2);
    assert!(line_driver.frames().is_empty());
}
