//! Destination pixel buffer

use blend_core::utils::color::unpack_argb;
use blend_core::BlendError;

/// Row-major buffer of packed pixels, origin top-left
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
}

impl Canvas {
    /// Allocate a `width` x `height` canvas with every pixel set to `fill`
    ///
    /// # Errors
    ///
    /// `InvalidDimensions` when either side is zero or the pixel count
    /// overflows, `AllocationFailure` when the buffer cannot be reserved.
    pub fn allocate(width: u32, height: u32, fill: u32) -> Result<Self, BlendError> {
        let count = pixel_count(width, height)?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(count)
            .map_err(|_| BlendError::AllocationFailure)?;
        pixels.resize(count, fill);
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Wrap an existing pixel buffer
    ///
    /// # Errors
    ///
    /// `InvalidDimensions` when the buffer length does not match the size.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self, BlendError> {
        if pixel_count(width, height)? != pixels.len() {
            return Err(BlendError::InvalidDimensions {
                width: i64::from(width),
                height: i64::from(height),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Get canvas width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get canvas height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get packed pixels
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Get mutable packed pixels
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Take ownership of the pixel buffer
    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }

    /// Pixel at `(x, y)`, `None` outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.pixels.chunks_exact(self.width as usize)
    }

    /// Check if any pixel is not fully opaque
    pub fn has_transparency(&self) -> bool {
        self.pixels.iter().any(|&p| p < 0xFF00_0000)
    }

    /// RGBA bytes, four per pixel
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&p| unpack_argb(p)).collect()
    }

    /// RGB bytes with alpha dropped, three per pixel
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&p| {
                let [r, g, b, _] = unpack_argb(p);
                [r, g, b]
            })
            .collect()
    }
}

fn pixel_count(width: u32, height: u32) -> Result<usize, BlendError> {
    let invalid = || BlendError::InvalidDimensions {
        width: i64::from(width),
        height: i64::from(height),
    };
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    (width as usize)
        .checked_mul(height as usize)
        .filter(|count| count.checked_mul(std::mem::size_of::<u32>()).is_some())
        .ok_or_else(invalid)
}
