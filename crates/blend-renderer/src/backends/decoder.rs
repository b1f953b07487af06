//! Layer decoder backed by the `png` and `image` crates
//!
//! PNG and JPEG layers are probed from their headers only. Anything else
//! `image` can sniff is decoded in full to answer a probe.

use std::io::Cursor;

use blend_core::utils::pack_argb;
use image::codecs::jpeg::JpegDecoder;
use image::{ImageDecoder, ImageFormat};

use super::{DecodeError, LayerDecoder, LayerHeader, LayerImage, Warnings};

/// Decoder for every format enabled in the `image` dependency
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDecoder;

impl LayerDecoder for StandardDecoder {
    fn probe(&self, data: &[u8]) -> Result<LayerHeader, DecodeError> {
        match sniff(data)? {
            ImageFormat::Png => {
                let (header, _) = read_png_header(data)?;
                Ok(header)
            }
            ImageFormat::Jpeg => {
                let decoder = JpegDecoder::new(Cursor::new(data))?;
                let (width, height) = decoder.dimensions();
                Ok(LayerHeader {
                    width,
                    height,
                    has_alpha: false,
                })
            }
            _ => {
                let image = self.decode(data)?;
                Ok(LayerHeader {
                    width: image.width,
                    height: image.height,
                    has_alpha: image.has_alpha,
                })
            }
        }
    }

    fn decode(&self, data: &[u8]) -> Result<LayerImage, DecodeError> {
        let warnings = match sniff(data)? {
            ImageFormat::Png => read_png_header(data)?.1,
            _ => Warnings::new(),
        };

        let decoded = image::load_from_memory(data)?;
        let has_alpha = decoded.color().has_alpha();
        let rgba = decoded.into_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba
            .into_raw()
            .chunks_exact(4)
            .map(|p| pack_argb(p[0], p[1], p[2], p[3]))
            .collect();

        Ok(LayerImage {
            width,
            height,
            has_alpha,
            pixels,
            warnings,
        })
    }
}

fn sniff(data: &[u8]) -> Result<ImageFormat, DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::new("Image buffer is empty"));
    }
    image::guess_format(data).map_err(|_| DecodeError::new("Unknown image format"))
}

fn read_png_header(data: &[u8]) -> Result<(LayerHeader, Warnings), DecodeError> {
    let reader = png::Decoder::new(data).read_info()?;
    let info = reader.info();

    let has_alpha = matches!(
        info.color_type,
        png::ColorType::Rgba | png::ColorType::GrayscaleAlpha
    ) || info.trns.is_some();

    let mut warnings = Warnings::new();
    if info.bit_depth == png::BitDepth::Sixteen {
        warnings.push("16-bit channels were reduced to 8 bits".to_string());
    }
    if info.icc_profile.is_some() {
        warnings.push("Embedded ICC profile was ignored".to_string());
    }
    if info.interlaced {
        warnings.push("Interlaced image was deinterlaced".to_string());
    }

    Ok((
        LayerHeader {
            width: info.width,
            height: info.height,
            has_alpha,
        },
        warnings,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(color: png::ColorType, depth: png::BitDepth, data: &[u8], w: u32, h: u32) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, w, h);
            encoder.set_color(color);
            encoder.set_depth(depth);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        out
    }

    #[test]
    fn probe_rgb_png_has_no_alpha() {
        let data = png_bytes(png::ColorType::Rgb, png::BitDepth::Eight, &[0; 2 * 3 * 3], 2, 3);
        let header = StandardDecoder.probe(&data).unwrap();
        assert_eq!(
            header,
            LayerHeader {
                width: 2,
                height: 3,
                has_alpha: false
            }
        );
    }

    #[test]
    fn probe_rgba_png_has_alpha() {
        let data = png_bytes(png::ColorType::Rgba, png::BitDepth::Eight, &[0; 16], 2, 2);
        assert!(StandardDecoder.probe(&data).unwrap().has_alpha);
    }

    #[test]
    fn decode_packs_rgba() {
        let data = png_bytes(
            png::ColorType::Rgba,
            png::BitDepth::Eight,
            &[1, 2, 3, 4, 5, 6, 7, 8],
            2,
            1,
        );
        let image = StandardDecoder.decode(&data).unwrap();
        assert_eq!(image.pixels, vec![0x0403_0201, 0x0807_0605]);
        assert!(image.warnings.is_empty());
    }

    #[test]
    fn sixteen_bit_png_warns() {
        let data = png_bytes(png::ColorType::Grayscale, png::BitDepth::Sixteen, &[0xFF; 4], 2, 1);
        let image = StandardDecoder.decode(&data).unwrap();
        assert_eq!(image.pixels, vec![0xFFFF_FFFF; 2]);
        assert_eq!(image.warnings.len(), 1);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(StandardDecoder.probe(b"definitely not an image").is_err());
        assert!(StandardDecoder.probe(&[]).is_err());
        assert!(StandardDecoder.decode(b"\x89PNG\r\n\x1a\ntruncated").is_err());
    }
}
