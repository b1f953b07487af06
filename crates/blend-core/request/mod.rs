//! Typed blend requests
//!
//! A [`BlendRequest`] is what the compositing pipeline consumes: an ordered
//! list of still-encoded layers (bottom first) together with fully resolved
//! canvas, matte, tint and encoding settings. Requests are either assembled
//! directly with the builder setters or produced from loosely typed caller
//! options by [`BlendRequest::from_options`], which performs every range check
//! up front so the pipeline never sees an out-of-range value.

use std::sync::Arc;

use crate::utils::Palette;

mod options;
mod validation;

pub use options::{BlendOptions, LayerSpec, TintOptions};
pub use validation::{
    validate_compression, validate_dimensions, validate_encoder, validate_format,
    validate_layers, validate_matte, validate_mode, validate_quality, validate_tint,
};

/// Compression level used when the caller does not pick one
pub const DEFAULT_COMPRESSION: u8 = 6;

/// Quality applied to JPEG output when none is requested
pub const DEFAULT_JPEG_QUALITY: u32 = 80;

/// One encoded layer and its placement on the canvas
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayerInput {
    /// Encoded image bytes, decoded lazily by the pipeline
    pub data: Vec<u8>,
    /// Horizontal offset of the layer's left edge, may be negative
    pub x: i32,
    /// Vertical offset of the layer's top edge, may be negative
    pub y: i32,
}

impl LayerInput {
    /// Create a layer placed at the canvas origin
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, x: 0, y: 0 }
    }

    /// Place the layer at `(x, y)`
    #[must_use]
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

/// Container format of the encoded result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum OutputFormat {
    /// PNG, true-color or paletted
    #[default]
    Png,
    /// Baseline JPEG, alpha is discarded
    Jpeg,
}

/// PNG writer flavour
///
/// Both produce standard PNG streams; they differ in the compression range
/// they accept and in how scanlines are filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum PngEncoder {
    /// Adaptive filtering, compression 1-9
    #[default]
    Libpng,
    /// Fixed filtering, compression 1-10
    Miniz,
}

impl PngEncoder {
    /// Highest compression level the variant accepts
    #[must_use]
    pub const fn max_compression(self) -> u8 {
        match self {
            Self::Libpng => 9,
            Self::Miniz => 10,
        }
    }
}

/// Palette-building strategy for quantized PNG output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum QuantizeMode {
    /// RGB tree with binary transparency
    #[default]
    Octree,
    /// RGBA tree, only used when the canvas may be transparent
    Hextree,
}

/// Inclusive `(low, high)` range for one tint component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TintRange {
    /// Lower bound
    pub low: f64,
    /// Upper bound
    pub high: f64,
}

impl TintRange {
    /// Create a range
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

impl Default for TintRange {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// Global HSL tint settings
///
/// The ranges are accepted and carried with the request. The pipeline's tint
/// stage currently performs a plain HSL round trip whenever `identity` is
/// false and does not read them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tint {
    /// Hue range
    pub hue: TintRange,
    /// Saturation range
    pub saturation: TintRange,
    /// Lightness range
    pub lightness: TintRange,
    /// Alpha range
    pub alpha: TintRange,
    /// No tint requested
    pub identity: bool,
}

impl Tint {
    /// Tint that leaves the canvas untouched
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Tint with default ranges that still runs the HSL stage
    #[must_use]
    pub fn round_trip() -> Self {
        Self {
            identity: false,
            ..Self::default()
        }
    }

    /// Check if the tint stage can be skipped
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.identity
    }
}

impl Default for Tint {
    fn default() -> Self {
        Self {
            hue: TintRange::default(),
            saturation: TintRange::default(),
            lightness: TintRange::default(),
            alpha: TintRange::default(),
            identity: true,
        }
    }
}

/// Output encoding settings
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    /// Container format
    pub format: OutputFormat,
    /// JPEG quality (0-100) or PNG palette size (0 or 2-256, 0 disables quantization)
    pub quality: u32,
    /// zlib compression level for PNG output
    pub compression: u8,
    /// PNG writer flavour
    pub encoder: PngEncoder,
    /// Palette strategy for quantized PNG output
    pub mode: QuantizeMode,
    /// Caller-supplied palette, shared read-only across requests
    pub palette: Option<Arc<Palette>>,
}

impl EncodeOptions {
    /// JPEG output at `quality`
    #[must_use]
    pub fn jpeg(quality: u32) -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality,
            ..Self::default()
        }
    }

    /// Quantized PNG output with at most `colors` palette entries
    #[must_use]
    pub fn quantized(colors: u32, mode: QuantizeMode) -> Self {
        Self {
            quality: colors,
            mode,
            ..Self::default()
        }
    }

    /// PNG output mapped onto a fixed palette
    #[must_use]
    pub fn with_palette(palette: Arc<Palette>) -> Self {
        Self {
            palette: Some(palette),
            ..Self::default()
        }
    }

    /// Set compression level and writer flavour
    #[must_use]
    pub fn with_compression(mut self, compression: u8, encoder: PngEncoder) -> Self {
        self.compression = compression;
        self.encoder = encoder;
        self
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            quality: 0,
            compression: DEFAULT_COMPRESSION,
            encoder: PngEncoder::Libpng,
            mode: QuantizeMode::Octree,
            palette: None,
        }
    }
}

/// Validated blend request
#[derive(Debug, Clone, PartialEq)]
pub struct BlendRequest {
    /// Layers in stacking order, bottom first
    pub layers: Vec<LayerInput>,
    /// Canvas width, 0 derives it from the layers
    pub width: u32,
    /// Canvas height, 0 derives it from the layers
    pub height: u32,
    /// Packed pixel used to pre-fill possibly transparent canvases
    pub matte: u32,
    /// Disable the single-layer pass-through
    pub reencode: bool,
    /// Output encoding
    pub encode: EncodeOptions,
    /// Global tint
    pub tint: Tint,
}

impl BlendRequest {
    /// Create a request with derived canvas size and default output settings
    #[must_use]
    pub fn new(layers: Vec<LayerInput>) -> Self {
        Self {
            layers,
            width: 0,
            height: 0,
            matte: 0,
            reencode: false,
            encode: EncodeOptions::default(),
            tint: Tint::identity(),
        }
    }

    /// Set an explicit canvas size
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the matte pixel
    #[must_use]
    pub fn with_matte(mut self, matte: u32) -> Self {
        self.matte = matte;
        self
    }

    /// Set the reencode flag
    #[must_use]
    pub fn with_reencode(mut self, reencode: bool) -> Self {
        self.reencode = reencode;
        self
    }

    /// Replace the encoding settings
    #[must_use]
    pub fn with_encode(mut self, encode: EncodeOptions) -> Self {
        self.encode = encode;
        self
    }

    /// Replace the tint
    #[must_use]
    pub fn with_tint(mut self, tint: Tint) -> Self {
        self.tint = tint;
        self
    }
}
