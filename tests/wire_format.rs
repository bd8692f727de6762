#![allow(missing_docs)]
use dotstar_envoy::Error;
use dotstar_envoy::dotstar::{
    BrightnessMode, Config, Gamma, PixelOrder, StripBuffer, wire,
};

fn encode<const N: usize>(strip: &StripBuffer<N>) -> Vec<u8> {
    strip.encode().collect()
}

#[test]
fn single_red_pixel_matches_known_bytes() {
    let mut strip = StripBuffer::<1>::new(Config::new()).expect("valid config");

    strip.set(0, (10, 0, 0)).expect("in range");

    assert_eq!(encode(&strip), [0, 0, 0, 0, 0xFF, 0, 0, 10, 0]);
}

#[test]
fn pixel_order_controls_color_bytes() {
    let cases = [
        (PixelOrder::Rgb, [1, 2, 3]),
        (PixelOrder::Rbg, [1, 3, 2]),
        (PixelOrder::Grb, [2, 1, 3]),
        (PixelOrder::Gbr, [2, 3, 1]),
        (PixelOrder::Brg, [3, 1, 2]),
        (PixelOrder::Bgr, [3, 2, 1]),
    ];
    for (pixel_order, expected) in cases {
        let mut strip = StripBuffer::<1>::new(Config::new().with_pixel_order(pixel_order))
            .expect("valid config");
        strip.set(0, (1, 2, 3)).expect("in range");

        let bytes = encode(&strip);

        assert_eq!(bytes[5..8], expected, "{pixel_order:?}");
    }
}

#[test]
fn frame_length_includes_start_and_end_frames() {
    assert_eq!(StripBuffer::<0>::FRAME_LEN, 4);
    assert_eq!(StripBuffer::<1>::FRAME_LEN, 4 + 4 + 1);
    assert_eq!(StripBuffer::<16>::FRAME_LEN, 4 + 64 + 1);
    assert_eq!(StripBuffer::<17>::FRAME_LEN, 4 + 68 + 2);

    let strip = StripBuffer::<17>::new(Config::new()).expect("valid config");
    let bytes = encode(&strip);
    assert_eq!(bytes.len(), StripBuffer::<17>::FRAME_LEN);
    assert_eq!(strip.encode().len(), StripBuffer::<17>::FRAME_LEN);
    assert_eq!(bytes[..4], [0, 0, 0, 0]);
    assert_eq!(bytes[72..], [0, 0]);
}

#[test]
fn encode_is_pure() {
    let mut strip = StripBuffer::<8>::new(Config::new()).expect("valid config");
    strip.set(3, (7, 8, 9, 0.5)).expect("in range");

    assert_eq!(encode(&strip), encode(&strip));
}

#[test]
fn hardware_brightness_rounds_up_into_five_bits() {
    let mut strip = StripBuffer::<4>::new(Config::new()).expect("valid config");
    strip.set(0, (100, 100, 100, 0.0)).expect("in range");
    strip.set(1, (100, 100, 100, 0.01)).expect("in range");
    strip.set(2, (100, 100, 100, 0.5)).expect("in range");
    strip.set(3, (100, 100, 100, 1.0)).expect("in range");

    let bytes = encode(&strip);
    let controls: Vec<u8> = (0..4).map(|index| bytes[4 + index * 4]).collect();

    assert_eq!(controls, [0xE0, 0xE1, 0xE0 | 16, 0xFF]);
    // Color bytes are untouched in hardware mode.
    assert_eq!(bytes[9..12], [100, 100, 100]);
}

#[test]
fn software_brightness_scales_colors() {
    let config = Config::new()
        .with_pixel_order(PixelOrder::Rgb)
        .with_brightness_mode(BrightnessMode::Software);
    let mut strip = StripBuffer::<1>::new(config).expect("valid config");
    strip.set(0, (200, 101, 3, 0.5)).expect("in range");

    assert_eq!(encode(&strip), [0, 0, 0, 0, 0xFF, 100, 50, 1, 0]);
}

#[test]
fn gamma_applies_before_order() {
    let linear = Config::new().with_pixel_order(PixelOrder::Rgb);
    let mut plain = StripBuffer::<1>::new(linear).expect("valid config");
    let mut corrected =
        StripBuffer::<1>::new(linear.with_gamma(Gamma::Gamma2_2)).expect("valid config");
    plain.set(0, (0, 128, 0)).expect("in range");
    corrected.set(0, (0, 128, 0)).expect("in range");

    assert_eq!(encode(&plain)[5..8], [0, 128, 0]);
    assert_eq!(encode(&corrected)[5..8], [0, Gamma::Gamma2_2.correct(128), 0]);
    assert_eq!(encode(&corrected)[5..8], [0, 56, 0]);
}

#[test]
fn software_brightness_scales_gamma_corrected_channels() {
    let config = Config::new()
        .with_pixel_order(PixelOrder::Rgb)
        .with_gamma(Gamma::Gamma2_2)
        .with_brightness_mode(BrightnessMode::Software);
    let mut strip = StripBuffer::<1>::new(config).expect("valid config");
    strip.set(0, (200, 128, 0, 0.5)).expect("in range");

    // floor(gamma(c) * 0.5): 149 -> 74, 56 -> 28.
    assert_eq!(encode(&strip)[4..8], [0xFF, 74, 28, 0]);
}

#[test]
fn encode_into_reports_short_buffers() {
    let mut strip = StripBuffer::<2>::new(Config::new()).expect("valid config");
    strip.fill(0x01_02_03).expect("valid");

    let mut exact = [0xAA; StripBuffer::<2>::FRAME_LEN];
    let written = strip.encode_into(&mut exact).expect("fits");
    assert_eq!(written, exact.len());
    assert_eq!(exact.to_vec(), encode(&strip));

    let mut short = [0u8; 8];
    assert!(matches!(
        strip.encode_into(&mut short),
        Err(Error::BufferTooSmall { needed: 13, capacity: 8 })
    ));
}

#[test]
fn encode_to_vec_checks_capacity() {
    let strip = StripBuffer::<2>::new(Config::new()).expect("valid config");

    let bytes = strip.encode_to_vec::<32>().expect("fits");
    assert_eq!(bytes.as_slice(), encode(&strip).as_slice());
    assert!(matches!(
        strip.encode_to_vec::<12>(),
        Err(Error::BufferTooSmall { needed: 13, capacity: 12 })
    ));
}

#[test]
fn frame_len_helper_matches_buffer() {
    assert_eq!(wire::frame_len(30), StripBuffer::<30>::FRAME_LEN);
    assert_eq!(wire::end_frame_len(32), 2);
}
