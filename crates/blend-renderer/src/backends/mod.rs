//! Codec seams and their standard implementations
//!
//! The pipeline never touches container formats directly. It talks to three
//! traits: a [`LayerDecoder`] that probes and decodes layers, a
//! [`CanvasEncoder`] that writes the finished canvas, and a [`PaletteBuilder`]
//! that reduces a canvas to an adaptive palette. [`Codecs`] bundles one of each
//! behind `Arc`s so a single set can be shared by every worker.

use std::sync::Arc;

use blend_core::{EncodeOptions, Palette, PngEncoder, QuantizeMode};
use smallvec::SmallVec;
use thiserror::Error;

use crate::canvas::Canvas;

pub mod decoder;
pub mod encoder;
pub mod quantize;

pub use decoder::StandardDecoder;
pub use encoder::StandardEncoder;
pub use quantize::TreeQuantizer;

/// Non-fatal decode diagnostics, usually zero or one per layer
pub type Warnings = SmallVec<[String; 2]>;

/// Result of a cheap header probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerHeader {
    /// Layer width in pixels
    pub width: u32,
    /// Layer height in pixels
    pub height: u32,
    /// The layer may contain non-opaque pixels
    pub has_alpha: bool,
}

/// Fully decoded layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerImage {
    /// Layer width in pixels
    pub width: u32,
    /// Layer height in pixels
    pub height: u32,
    /// The layer may contain non-opaque pixels
    pub has_alpha: bool,
    /// Packed pixels, row-major
    pub pixels: Vec<u32>,
    /// Diagnostics gathered while decoding
    pub warnings: Warnings,
}

/// Layer could not be probed or decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DecodeError {
    /// Decoder diagnostic
    pub message: String,
}

impl DecodeError {
    /// Create a decode error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<image::ImageError> for DecodeError {
    fn from(err: image::ImageError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<png::DecodingError> for DecodeError {
    fn from(err: png::DecodingError) -> Self {
        Self::new(err.to_string())
    }
}

/// Canvas could not be encoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EncodeError {
    /// Encoder diagnostic
    pub message: String,
}

impl EncodeError {
    /// Create an encode error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<image::ImageError> for EncodeError {
    fn from(err: image::ImageError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<png::EncodingError> for EncodeError {
    fn from(err: png::EncodingError) -> Self {
        Self::new(err.to_string())
    }
}

/// PNG writer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngOptions {
    /// zlib level, 1-10
    pub compression: u8,
    /// Writer flavour
    pub encoder: PngEncoder,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self {
            compression: blend_core::request::DEFAULT_COMPRESSION,
            encoder: PngEncoder::Libpng,
        }
    }
}

impl From<&EncodeOptions> for PngOptions {
    fn from(options: &EncodeOptions) -> Self {
        Self {
            compression: options.compression,
            encoder: options.encoder,
        }
    }
}

/// Probes and decodes encoded layers
pub trait LayerDecoder: Send + Sync {
    /// Read dimensions and alpha presence, decoding as little as possible
    fn probe(&self, data: &[u8]) -> Result<LayerHeader, DecodeError>;

    /// Decode the whole layer into packed pixels
    fn decode(&self, data: &[u8]) -> Result<LayerImage, DecodeError>;
}

/// Writes a finished canvas to an output format
pub trait CanvasEncoder: Send + Sync {
    /// JPEG at `quality` (1-100); alpha is discarded
    fn encode_jpeg(&self, canvas: &Canvas, quality: u8) -> Result<Vec<u8>, EncodeError>;

    /// True-color PNG, with an alpha channel only when `alpha` is set
    fn encode_png(
        &self,
        canvas: &Canvas,
        options: &PngOptions,
        alpha: bool,
    ) -> Result<Vec<u8>, EncodeError>;

    /// Paletted PNG mapped onto `palette`
    fn encode_paletted(
        &self,
        canvas: &Canvas,
        palette: &Palette,
        options: &PngOptions,
    ) -> Result<Vec<u8>, EncodeError>;
}

/// Builds an adaptive palette for a canvas
pub trait PaletteBuilder: Send + Sync {
    /// Reduce the canvas to at most `max_colors` entries
    fn build_palette(&self, canvas: &Canvas, max_colors: usize, strategy: QuantizeMode) -> Palette;
}

/// Decoder, encoder and palette builder used by one pipeline run
#[derive(Clone)]
pub struct Codecs {
    /// Layer decoder
    pub decoder: Arc<dyn LayerDecoder>,
    /// Canvas encoder
    pub encoder: Arc<dyn CanvasEncoder>,
    /// Palette builder for quantized output
    pub quantizer: Arc<dyn PaletteBuilder>,
}

impl Codecs {
    /// PNG/JPEG codecs from the `image` and `png` crates with tree quantizers
    pub fn standard() -> Self {
        Self {
            decoder: Arc::new(StandardDecoder),
            encoder: Arc::new(StandardEncoder),
            quantizer: Arc::new(TreeQuantizer),
        }
    }

    /// Replace the decoder
    #[must_use]
    pub fn with_decoder(mut self, decoder: Arc<dyn LayerDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Replace the encoder
    #[must_use]
    pub fn with_encoder(mut self, encoder: Arc<dyn CanvasEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    /// Replace the palette builder
    #[must_use]
    pub fn with_quantizer(mut self, quantizer: Arc<dyn PaletteBuilder>) -> Self {
        self.quantizer = quantizer;
        self
    }
}

impl Default for Codecs {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for Codecs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codecs").finish_non_exhaustive()
    }
}
