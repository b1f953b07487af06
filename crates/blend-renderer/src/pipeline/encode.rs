//! Output path selection and encoding

use blend_core::request::DEFAULT_JPEG_QUALITY;
use blend_core::{BlendError, EncodeOptions, OutputFormat, Palette, QuantizeMode};
use log::debug;

use crate::backends::{Codecs, PngOptions};
use crate::canvas::Canvas;

/// The encoder path chosen for a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodePath<'a> {
    /// JPEG at the given quality
    Jpeg {
        /// Quality, 1-100
        quality: u8,
    },
    /// Paletted PNG with the caller's palette
    FixedPalette(&'a Palette),
    /// Paletted PNG with an adaptive palette
    Quantized {
        /// Palette size
        colors: usize,
        /// Tree strategy
        strategy: QuantizeMode,
    },
    /// True-color PNG
    TrueColor {
        /// Write an alpha channel
        alpha: bool,
    },
}

/// Choose the output path
///
/// Hextree quantization is only used when the canvas may be transparent;
/// otherwise octree is enough.
pub fn select_path(options: &EncodeOptions, possibly_transparent: bool) -> EncodePath<'_> {
    if options.format == OutputFormat::Jpeg {
        let quality = if options.quality == 0 {
            DEFAULT_JPEG_QUALITY
        } else {
            options.quality.min(100)
        };
        return EncodePath::Jpeg {
            quality: quality as u8,
        };
    }

    if let Some(palette) = options.palette.as_deref().filter(|p| p.is_valid()) {
        return EncodePath::FixedPalette(palette);
    }

    if options.quality > 0 {
        let strategy = if possibly_transparent && options.mode == QuantizeMode::Hextree {
            QuantizeMode::Hextree
        } else {
            QuantizeMode::Octree
        };
        return EncodePath::Quantized {
            colors: options.quality as usize,
            strategy,
        };
    }

    EncodePath::TrueColor {
        alpha: possibly_transparent,
    }
}

/// Encode the finished canvas
///
/// # Errors
///
/// `EncodeFailure` carrying the encoder's message.
pub fn encode_canvas(
    canvas: &Canvas,
    possibly_transparent: bool,
    options: &EncodeOptions,
    codecs: &Codecs,
) -> Result<Vec<u8>, BlendError> {
    let path = select_path(options, possibly_transparent);
    let png = PngOptions::from(options);
    debug!(
        "encoding {}x{} canvas via {path:?}",
        canvas.width(),
        canvas.height()
    );

    let encoded = match path {
        EncodePath::Jpeg { quality } => codecs.encoder.encode_jpeg(canvas, quality),
        EncodePath::FixedPalette(palette) => codecs.encoder.encode_paletted(canvas, palette, &png),
        EncodePath::Quantized { colors, strategy } => {
            let palette = codecs.quantizer.build_palette(canvas, colors, strategy);
            codecs.encoder.encode_paletted(canvas, &palette, &png)
        }
        EncodePath::TrueColor { alpha } => codecs.encoder.encode_png(canvas, &png, alpha),
    };
    encoded.map_err(|err| BlendError::EncodeFailure(err.message))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use blend_core::PngEncoder;
    use pretty_assertions::assert_eq;

    #[test]
    fn jpeg_defaults_to_80() {
        let options = EncodeOptions::jpeg(0);
        assert_eq!(select_path(&options, true), EncodePath::Jpeg { quality: 80 });
        let options = EncodeOptions::jpeg(35);
        assert_eq!(select_path(&options, false), EncodePath::Jpeg { quality: 35 });
    }

    #[test]
    fn valid_palette_wins_over_quality() {
        let palette = Arc::new(Palette::new(vec![[0, 0, 0, 255]]));
        let mut options = EncodeOptions::with_palette(Arc::clone(&palette));
        options.quality = 64;
        assert_eq!(select_path(&options, true), EncodePath::FixedPalette(palette.as_ref()));
    }

    #[test]
    fn invalid_palette_is_ignored() {
        let mut options = EncodeOptions::with_palette(Arc::new(Palette::default()));
        options.quality = 16;
        assert_eq!(
            select_path(&options, false),
            EncodePath::Quantized {
                colors: 16,
                strategy: QuantizeMode::Octree
            }
        );
    }

    #[test]
    fn hextree_needs_transparency() {
        let options = EncodeOptions::quantized(128, QuantizeMode::Hextree);
        assert_eq!(
            select_path(&options, true),
            EncodePath::Quantized {
                colors: 128,
                strategy: QuantizeMode::Hextree
            }
        );
        assert_eq!(
            select_path(&options, false),
            EncodePath::Quantized {
                colors: 128,
                strategy: QuantizeMode::Octree
            }
        );
    }

    #[test]
    fn true_color_alpha_follows_transparency() {
        let options = EncodeOptions::default().with_compression(9, PngEncoder::Miniz);
        assert_eq!(select_path(&options, true), EncodePath::TrueColor { alpha: true });
        assert_eq!(select_path(&options, false), EncodePath::TrueColor { alpha: false });
    }
}
