//! Fixed color palettes for paletted PNG output
//!
//! A palette is an immutable list of up to 256 RGBA entries. It is either
//! supplied by the caller (shared across requests behind an `Arc`) or built per
//! request by a quantizer. `PaletteLookup` maps pipeline pixels to palette
//! indices with a per-request cache.

use ahash::AHashMap;

use super::color::unpack_argb;
use super::errors::{BlendError, Result};

/// Ordered RGBA color table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    colors: Vec<[u8; 4]>,
}

impl Palette {
    /// Largest palette a PNG PLTE chunk can carry
    pub const MAX_COLORS: usize = 256;

    /// Create a palette from RGBA entries
    #[must_use]
    pub fn new(colors: Vec<[u8; 4]>) -> Self {
        Self { colors }
    }

    /// Create a palette from packed RGB triplets; every entry is opaque
    ///
    /// # Errors
    ///
    /// Returns an error if the byte length is not a multiple of three.
    pub fn from_rgb_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 3 != 0 {
            return Err(BlendError::invalid_request(format!(
                "Palette of {} bytes is not a list of RGB triplets",
                bytes.len()
            )));
        }
        Ok(Self::new(
            bytes
                .chunks_exact(3)
                .map(|rgb| [rgb[0], rgb[1], rgb[2], 0xFF])
                .collect(),
        ))
    }

    /// Create a palette from packed RGBA quadruplets
    ///
    /// # Errors
    ///
    /// Returns an error if the byte length is not a multiple of four.
    pub fn from_rgba_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 4 != 0 {
            return Err(BlendError::invalid_request(format!(
                "Palette of {} bytes is not a list of RGBA quadruplets",
                bytes.len()
            )));
        }
        Ok(Self::new(
            bytes
                .chunks_exact(4)
                .map(|rgba| [rgba[0], rgba[1], rgba[2], rgba[3]])
                .collect(),
        ))
    }

    /// A palette is usable when it has between 1 and 256 entries
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.colors.is_empty() && self.colors.len() <= Self::MAX_COLORS
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the palette has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// RGBA entries in palette order
    #[must_use]
    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    /// Check if any entry is not fully opaque
    #[must_use]
    pub fn has_transparency(&self) -> bool {
        self.colors.iter().any(|c| c[3] != 0xFF)
    }

    /// RGB bytes for a PNG `PLTE` chunk
    #[must_use]
    pub fn to_plte(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| [c[0], c[1], c[2]]).collect()
    }

    /// Alpha bytes for a PNG `tRNS` chunk, trailing opaque entries trimmed
    ///
    /// Returns `None` when every entry is opaque.
    #[must_use]
    pub fn to_trns(&self) -> Option<Vec<u8>> {
        let last = self.colors.iter().rposition(|c| c[3] != 0xFF)?;
        Some(self.colors[..=last].iter().map(|c| c[3]).collect())
    }

    /// Index of the entry closest to `rgba` by squared channel distance
    ///
    /// Ties resolve to the lowest index. An empty palette maps everything to 0.
    #[must_use]
    pub fn nearest_index(&self, rgba: [u8; 4]) -> u8 {
        let mut best = 0;
        let mut best_distance = u32::MAX;
        for (index, color) in self.colors.iter().take(Self::MAX_COLORS).enumerate() {
            let distance: u32 = color
                .iter()
                .zip(rgba.iter())
                .map(|(&a, &b)| {
                    let d = u32::from(a.abs_diff(b));
                    d * d
                })
                .sum();
            if distance < best_distance {
                best = index;
                best_distance = distance;
                if distance == 0 {
                    break;
                }
            }
        }
        best as u8
    }

    /// Create a cached pixel-to-index mapper for this palette
    #[must_use]
    pub fn lookup(&self) -> PaletteLookup<'_> {
        PaletteLookup {
            palette: self,
            cache: AHashMap::new(),
        }
    }
}

/// Caching nearest-color mapper, scoped to one request
#[derive(Debug)]
pub struct PaletteLookup<'a> {
    palette: &'a Palette,
    cache: AHashMap<u32, u8>,
}

impl PaletteLookup<'_> {
    /// Palette index for a pipeline pixel
    pub fn index_of(&mut self, pixel: u32) -> u8 {
        let palette = self.palette;
        *self
            .cache
            .entry(pixel)
            .or_insert_with(|| palette.nearest_index(unpack_argb(pixel)))
    }

    /// Map a row-major pixel buffer to palette indices
    pub fn map_pixels(&mut self, pixels: &[u32]) -> Vec<u8> {
        pixels.iter().map(|&pixel| self.index_of(pixel)).collect()
    }
}
