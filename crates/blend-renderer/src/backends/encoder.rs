//! Canvas encoder backed by the `png` and `image` crates

use std::io::Write;

use blend_core::{Palette, PngEncoder};
use image::codecs::jpeg::JpegEncoder;
use image::ColorType;

use super::{CanvasEncoder, EncodeError, PngOptions};
use crate::canvas::Canvas;

/// PNG writer from `png`, JPEG writer from `image`
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEncoder;

/// Map a zlib level onto the coarser presets the `png` crate exposes
fn compression_preset(level: u8) -> png::Compression {
    match level {
        0..=3 => png::Compression::Fast,
        4..=6 => png::Compression::Default,
        _ => png::Compression::Best,
    }
}

fn configure<W: Write>(encoder: &mut png::Encoder<'_, W>, options: &PngOptions) {
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(compression_preset(options.compression));
    match options.encoder {
        PngEncoder::Libpng => {
            encoder.set_adaptive_filter(png::AdaptiveFilterType::Adaptive);
        }
        PngEncoder::Miniz => {
            encoder.set_filter(png::FilterType::Sub);
            encoder.set_adaptive_filter(png::AdaptiveFilterType::NonAdaptive);
        }
    }
}

impl CanvasEncoder for StandardEncoder {
    fn encode_jpeg(&self, canvas: &Canvas, quality: u8) -> Result<Vec<u8>, EncodeError> {
        let rgb = canvas.to_rgb_bytes();
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)).encode(
            &rgb,
            canvas.width(),
            canvas.height(),
            ColorType::Rgb8,
        )?;
        Ok(out)
    }

    fn encode_png(
        &self,
        canvas: &Canvas,
        options: &PngOptions,
        alpha: bool,
    ) -> Result<Vec<u8>, EncodeError> {
        let (color, data) = if alpha {
            (png::ColorType::Rgba, canvas.to_rgba_bytes())
        } else {
            (png::ColorType::Rgb, canvas.to_rgb_bytes())
        };

        let mut out = Vec::new();
        let mut encoder = png::Encoder::new(&mut out, canvas.width(), canvas.height());
        encoder.set_color(color);
        configure(&mut encoder, options);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&data)?;
        writer.finish()?;
        Ok(out)
    }

    fn encode_paletted(
        &self,
        canvas: &Canvas,
        palette: &Palette,
        options: &PngOptions,
    ) -> Result<Vec<u8>, EncodeError> {
        if !palette.is_valid() {
            return Err(EncodeError::new(format!(
                "Palette must hold between 1 and {} colors, got {}",
                Palette::MAX_COLORS,
                palette.len()
            )));
        }

        let indices = palette.lookup().map_pixels(canvas.pixels());

        let mut out = Vec::new();
        let mut encoder = png::Encoder::new(&mut out, canvas.width(), canvas.height());
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_palette(palette.to_plte());
        if let Some(trns) = palette.to_trns() {
            encoder.set_trns(trns);
        }
        configure(&mut encoder, options);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&indices)?;
        writer.finish()?;
        Ok(out)
    }
}
