#![allow(missing_docs)]
use dotstar_envoy::Error;
use dotstar_envoy::dotstar::{Config, Frame1d, Pixel, Rgb, StripBuffer, colors};

fn buffer<const N: usize>(brightness: f32) -> StripBuffer<N> {
    StripBuffer::new(Config::new().with_brightness(brightness)).expect("valid config")
}

#[test]
fn new_buffer_is_black_at_default_brightness() {
    let strip = buffer::<5>(0.25);

    assert_eq!(strip.len(), 5);
    for pixel in strip.iter() {
        assert_eq!(pixel, Pixel::new(Rgb::new(0, 0, 0), 0.25).expect("valid"));
    }
}

#[test]
fn bad_default_brightness_is_rejected() {
    for brightness in [-0.1, 1.5, f32::NAN] {
        let result = StripBuffer::<3>::new(Config::new().with_brightness(brightness));
        assert!(matches!(result, Err(Error::BrightnessOutOfRange)));
    }
}

#[test]
fn set_then_get_returns_normalized_pixel() {
    let mut strip = buffer::<4>(0.5);

    strip.set(0, (1, 2, 3)).expect("in range");
    strip.set(1, (4, 5, 6, 0.75)).expect("in range");
    strip.set(2, colors::RED).expect("in range");
    strip.set(3, 0x07_08_09).expect("in range");

    assert_eq!(strip.get(0).expect("in range"), Pixel { color: Rgb::new(1, 2, 3), brightness: 0.5 });
    assert_eq!(strip.get(1).expect("in range"), Pixel { color: Rgb::new(4, 5, 6), brightness: 0.75 });
    assert_eq!(strip.get(2).expect("in range"), Pixel { color: Rgb::new(255, 0, 0), brightness: 0.5 });
    assert_eq!(strip.get(3).expect("in range"), Pixel { color: Rgb::new(7, 8, 9), brightness: 0.5 });
}

#[test]
fn hex_matches_tuple_at_default_brightness() {
    let mut from_hex = buffer::<1>(0.3);
    let mut from_tuple = buffer::<1>(0.3);

    from_hex.set(0, 0xAB_CD_EF).expect("in range");
    from_tuple.set(0, (0xAB, 0xCD, 0xEF)).expect("in range");

    assert_eq!(from_hex.get(0).expect("in range"), from_tuple.get(0).expect("in range"));
}

#[test]
fn explicit_brightness_is_kept_exactly() {
    let mut strip = buffer::<1>(1.0);
    for brightness in [0.0, 0.1, 0.333, 1.0] {
        strip.set(0, (9, 9, 9, brightness)).expect("valid");
        assert_eq!(strip.get(0).expect("in range").brightness, brightness);
    }
}

#[test]
fn out_of_range_index_leaves_buffer_unchanged() {
    let mut strip = buffer::<3>(1.0);
    strip.fill((1, 1, 1)).expect("valid");
    let before = strip.clone();

    let result = strip.set(3, (200, 200, 200));

    assert!(matches!(result, Err(Error::IndexOutOfBounds { index: 3, len: 3 })));
    assert_eq!(strip, before);
    assert!(matches!(strip.get(3), Err(Error::IndexOutOfBounds { index: 3, len: 3 })));
}

#[test]
fn invalid_color_leaves_buffer_unchanged() {
    let mut strip = buffer::<2>(1.0);
    strip.fill((5, 6, 7)).expect("valid");
    let before = strip.clone();

    assert!(matches!(strip.set(0, 0x0100_0000), Err(Error::ColorOutOfRange(0x0100_0000))));
    assert!(matches!(strip.set(1, (1, 2, 3, 1.2)), Err(Error::BrightnessOutOfRange)));
    assert!(matches!(strip.fill((1, 2, 3, -0.5)), Err(Error::BrightnessOutOfRange)));

    assert_eq!(strip, before);
}

#[test]
fn fill_sets_every_pixel() {
    let mut strip = buffer::<16>(1.0);

    strip.fill((10, 20, 30, 0.5)).expect("valid");

    for index in 0..strip.len() {
        assert_eq!(
            strip.get(index).expect("in range"),
            Pixel { color: Rgb::new(10, 20, 30), brightness: 0.5 }
        );
    }
}

#[test]
fn set_brightness_clamps() {
    let mut strip = buffer::<1>(1.0);

    strip.set_brightness(2.0).expect("not NaN");
    assert_eq!(strip.brightness(), 1.0);
    strip.set_brightness(-1.0).expect("not NaN");
    assert_eq!(strip.brightness(), 0.0);
    strip.set_brightness(0.4).expect("not NaN");
    assert!(matches!(strip.set_brightness(f32::NAN), Err(Error::BrightnessOutOfRange)));
    assert_eq!(strip.brightness(), 0.4);
}

#[test]
fn set_brightness_rescales_inherited_pixels() {
    let mut strip = buffer::<3>(1.0);
    strip.fill((200, 200, 200)).expect("valid");
    strip.set(1, (200, 200, 200, 0.8)).expect("in range");
    let before: Vec<u8> = strip.encode().collect();

    strip.set_brightness(0.1).expect("not NaN");

    assert_eq!(strip.get(0).expect("in range").brightness, 0.1);
    assert_eq!(strip.get(1).expect("in range").brightness, 0.8);
    assert_eq!(strip.get(2).expect("in range").brightness, 0.1);
    assert_eq!(strip.pixels().map(|pixel| pixel.brightness), [0.1, 0.8, 0.1]);
    let after: Vec<u8> = strip.encode().collect();
    assert_ne!(after, before);
    // Explicit pixel 1 encodes the same before and after.
    assert_eq!(after[8..12], before[8..12]);
}

#[test]
fn set_frame_copies_colors_at_default_brightness() {
    let mut strip = buffer::<3>(0.6);
    let mut frame = Frame1d::<3>::filled(colors::BLUE);
    frame[1] = colors::GREEN;

    strip.set_frame(&frame);

    assert_eq!(strip.to_frame(), frame);
    assert!(strip.iter().all(|pixel| pixel.brightness == 0.6));
}

#[test]
fn zero_length_strip_is_empty() {
    let strip = buffer::<0>(1.0);

    assert!(strip.is_empty());
    assert!(matches!(strip.get(0), Err(Error::IndexOutOfBounds { index: 0, len: 0 })));
}
