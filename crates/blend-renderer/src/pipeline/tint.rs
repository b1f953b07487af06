//! Global tint stage

use blend_core::utils::{hsl_to_rgb, pack_argb, rgb_to_hsl, unpack_argb};
use blend_core::Tint;
use log::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::canvas::Canvas;

/// Send one pixel through RGB -> HSL -> RGB, keeping its alpha
#[inline]
pub fn tint_pixel(pixel: u32) -> u32 {
    let [r, g, b, a] = unpack_argb(pixel);
    let (h, s, l) = rgb_to_hsl(r, g, b);
    let (r, g, b) = hsl_to_rgb(h, s, l);
    pack_argb(r, g, b, a)
}

/// Rewrite every canvas pixel unless the tint is the identity
///
/// The tint's component ranges are not consulted.
pub fn apply_tint(canvas: &mut Canvas, tint: &Tint) {
    if tint.is_identity() {
        return;
    }
    debug!(
        "tinting {}x{} canvas through HSL",
        canvas.width(),
        canvas.height()
    );

    #[cfg(feature = "parallel")]
    canvas
        .pixels_mut()
        .par_iter_mut()
        .for_each(|pixel| *pixel = tint_pixel(*pixel));

    #[cfg(not(feature = "parallel"))]
    for pixel in canvas.pixels_mut() {
        *pixel = tint_pixel(*pixel);
    }
}
