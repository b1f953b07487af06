//! Loosely typed caller options
//!
//! These mirror the options object accepted by the service front end: every
//! field is optional and numeric fields are wide signed integers so that
//! out-of-range input reaches validation instead of failing deserialization.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::utils::Palette;

/// Caller-supplied blend options
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BlendOptions {
    /// `"png"`, `"jpeg"` or `"jpg"`
    pub format: Option<String>,
    /// JPEG quality or PNG palette size
    pub quality: Option<i64>,
    /// Force decode and recompose even for a single matching layer
    pub reencode: Option<bool>,
    /// Canvas width
    pub width: Option<i64>,
    /// Canvas height
    pub height: Option<i64>,
    /// Matte color as `#rrggbb` or `#rrggbbaa`
    pub matte: Option<String>,
    /// `"octree"`/`"o"` or `"hextree"`/`"h"`
    pub mode: Option<String>,
    /// `"libpng"` or `"miniz"`
    pub encoder: Option<String>,
    /// zlib compression level
    pub compression: Option<i64>,
    /// Tint ranges; presence alone enables the tint stage
    pub tint: Option<TintOptions>,
    /// Fixed output palette, never read from serialized options
    #[cfg_attr(feature = "serde", serde(skip))]
    pub palette: Option<Arc<Palette>>,
}

/// Tint component ranges, each expected to be a `[low, high]` pair
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TintOptions {
    /// Hue
    pub h: Option<Vec<f64>>,
    /// Saturation
    pub s: Option<Vec<f64>>,
    /// Lightness
    pub l: Option<Vec<f64>>,
    /// Alpha
    pub a: Option<Vec<f64>>,
}

/// Caller-supplied layer
///
/// `data` is `None` when the caller handed in something that is not a byte
/// buffer; validation rejects such layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSpec {
    /// Encoded image bytes
    pub data: Option<Vec<u8>>,
    /// Horizontal offset
    pub x: i32,
    /// Vertical offset
    pub y: i32,
}

impl LayerSpec {
    /// Layer at the origin holding `data`
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Some(data.into()),
            x: 0,
            y: 0,
        }
    }

    /// Place the layer at `(x, y)`
    #[must_use]
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}
