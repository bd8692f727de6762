#![cfg(feature = "host")]
//! Render strips as rows of soft LED discs, for previews and docs.

use crate::dotstar::{Frame1d, RGB8, StripBuffer};
use crate::dotstar_host::decode_frame;
use png::{BitDepth, ColorType, Encoder, ScaledFloat};
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const PREVIEW_INVERSE_GAMMA: f32 = 2.2;

/// Render a row of colors into a PNG file sized to the requested maximum dimension.
///
/// # Errors
///
/// Returns an error if the file cannot be written or the strip is empty.
pub fn write_strip_png(
    colors: &[RGB8],
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
) -> Result<(), Box<dyn Error>> {
    write_strip_png_with_gamma(colors, output_path, target_max_dimension, PREVIEW_INVERSE_GAMMA)
}

/// Render a row of colors into a PNG file with a custom preview inverse gamma.
///
/// # Errors
///
/// Returns an error if the file cannot be written, the strip is empty, or the
/// arguments are not positive.
pub fn write_strip_png_with_gamma(
    colors: &[RGB8],
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
    preview_inverse_gamma: f32,
) -> Result<(), Box<dyn Error>> {
    let output_path = output_path.as_ref();
    let layout = Layout::new(colors.len(), target_max_dimension, preview_inverse_gamma)?;
    let pixels = layout.render(colors);

    let mut encoder = encoder_for(output_path, &layout)?;
    encoder.set_source_gamma(ScaledFloat::new(1.0));
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&pixels)?;
    writer.finish()?;
    println!("wrote PNG to {}", output_path.display());
    Ok(())
}

/// Render what the LEDs would actually show: the buffer is encoded, read back, and each
/// LED's 5-bit level folded into its color.
///
/// # Errors
///
/// Returns an error if the file cannot be written or the strip is empty.
pub fn write_dotstar_png<const N: usize>(
    buffer: &StripBuffer<N>,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
) -> Result<(), Box<dyn Error>> {
    let bytes: Vec<u8> = buffer.encode().collect();
    let colors: Vec<RGB8> = decode_frame(&bytes, buffer.config().pixel_order)?
        .iter()
        .map(|led| led.perceived())
        .collect();
    write_strip_png(&colors, output_path, target_max_dimension)
}

/// Render a sequence of frames into a looping APNG file.
///
/// # Errors
///
/// Returns an error if the file cannot be written, `frames` is empty, or
/// `frame_delay_ms` does not fit in a `u16`.
pub fn write_frames_apng<const N: usize>(
    frames: &[Frame1d<N>],
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
    frame_delay_ms: u32,
) -> Result<(), Box<dyn Error>> {
    if frames.is_empty() {
        return Err("frames must not be empty".into());
    }
    if frame_delay_ms == 0 {
        return Err("frame_delay_ms must be positive".into());
    }
    let output_path = output_path.as_ref();
    let layout = Layout::new(N, target_max_dimension, PREVIEW_INVERSE_GAMMA)?;
    let frame_count = u32::try_from(frames.len())?;
    let delay_num = u16::try_from(frame_delay_ms)?;
    let delay_den = 1000u16;

    let mut encoder = encoder_for(output_path, &layout)?;
    encoder.set_source_gamma(ScaledFloat::new(1.0));
    encoder.set_animated(frame_count, 0)?;
    let mut writer = encoder.write_header()?;
    for frame in frames {
        writer.set_frame_delay(delay_num, delay_den)?;
        writer.write_image_data(&layout.render(&frame.0))?;
    }
    writer.finish()?;
    println!("wrote APNG to {}", output_path.display());
    Ok(())
}

fn encoder_for(
    output_path: &Path,
    layout: &Layout,
) -> Result<Encoder<'static, BufWriter<File>>, Box<dyn Error>> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(output_path)?;
    let mut encoder = Encoder::new(BufWriter::new(file), layout.width, layout.height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Sixteen);
    Ok(encoder)
}

/// Geometry of one rendered strip: `len` cells in a row, with a border of one LED radius.
struct Layout {
    len: usize,
    cell_size: u32,
    led_radius: u32,
    fade_width: u32,
    width: u32,
    height: u32,
    preview_inverse_gamma: f32,
}

impl Layout {
    fn new(
        len: usize,
        target_max_dimension: u32,
        preview_inverse_gamma: f32,
    ) -> Result<Self, Box<dyn Error>> {
        if len == 0 {
            return Err("strip must have at least one LED".into());
        }
        if target_max_dimension == 0 {
            return Err("target_max_dimension must be positive".into());
        }
        if preview_inverse_gamma.is_nan() || preview_inverse_gamma <= 0.0 {
            return Err("preview_inverse_gamma must be positive".into());
        }
        let columns = u32::try_from(len)?;
        let mut cell_size = target_max_dimension;
        while cell_size > 4 && columns * cell_size + led_radius(cell_size) * 2 > target_max_dimension
        {
            cell_size -= 1;
        }
        // Below four pixels the disc has no room for a fade.
        let cell_size = cell_size.max(4);
        let led_radius = led_radius(cell_size);
        Ok(Self {
            len,
            cell_size,
            led_radius,
            fade_width: (led_radius / 3).max(1),
            width: columns * cell_size + led_radius * 2,
            height: cell_size + led_radius * 2,
            preview_inverse_gamma,
        })
    }

    /// 16-bit big-endian RGB samples for the whole image.
    fn render(&self, colors: &[RGB8]) -> Vec<u8> {
        let mut bytes = vec![0u8; (self.width * self.height * 3 * 2) as usize];
        let center = (self.cell_size - 1) as i32 / 2;
        let led_radius_f = self.led_radius as f32;
        let inner_radius_f = self.led_radius.saturating_sub(self.fade_width) as f32;
        let radius_sq = (self.led_radius as i32) * (self.led_radius as i32);
        let border = self.led_radius;

        for (column_index, color) in colors.iter().take(self.len).enumerate() {
            let linear = [color.r, color.g, color.b]
                .map(|channel| inverse_gamma_to_linear(channel, self.preview_inverse_gamma));
            let cell_origin_x = (column_index as u32) * self.cell_size;

            for local_y in 0..self.cell_size {
                let delta_y = local_y as i32 - center;
                for local_x in 0..self.cell_size {
                    let delta_x = local_x as i32 - center;
                    let distance_sq = delta_x * delta_x + delta_y * delta_y;
                    if distance_sq > radius_sq {
                        continue;
                    }
                    let distance = (distance_sq as f32).sqrt();
                    let intensity = if distance <= inner_radius_f {
                        1.0
                    } else {
                        let fade_span = led_radius_f - inner_radius_f;
                        (1.0 - (distance - inner_radius_f) / fade_span).max(0.0)
                    };
                    let x = border + cell_origin_x + local_x;
                    let y = border + local_y;
                    let start = ((y * self.width + x) * 3 * 2) as usize;
                    let samples = linear.map(|value| linear_to_u16(value * intensity));
                    if let Some(target) = bytes.get_mut(start..start + 6) {
                        for (pair, sample) in target.chunks_exact_mut(2).zip(samples) {
                            pair.copy_from_slice(&sample.to_be_bytes());
                        }
                    }
                }
            }
        }
        bytes
    }
}

const fn led_radius(cell_size: u32) -> u32 {
    let led_margin = if cell_size / 8 > 1 { cell_size / 8 } else { 1 };
    (cell_size - led_margin * 2) / 2
}

fn inverse_gamma_to_linear(channel: u8, preview_inverse_gamma: f32) -> f32 {
    let normalized = f32::from(channel) / 255.0;
    normalized.powf(preview_inverse_gamma)
}

fn linear_to_u16(value: f32) -> u16 {
    let clamped = value.clamp(0.0, 1.0);
    (clamped * 65535.0).round() as u16
}
