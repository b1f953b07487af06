//! Layer compositing module

use crate::canvas::Canvas;
use crate::pipeline::prepare::PreparedLayer;

/// Blend `source` over `target` (straight alpha, packed pixels)
///
/// Integer-only Porter-Duff "over". A transparent source leaves the target
/// alone; an opaque source or a transparent target is a plain copy. Otherwise
/// with `a0`/`a1` the target/source alpha and `c0 = target_channel * a0`:
///
/// - `A = ((a1 + a0) << 8) - a0 * a1`
/// - `c = (((c1 << 8) - c0) * a1 + (c0 << 8)) / A`
/// - result alpha is `A >> 8`
///
/// Intermediate channel terms wrap like unsigned 32-bit arithmetic; the final
/// numerator is always in range, so results are byte-exact.
#[inline]
pub fn composite_pixel(target: &mut u32, source: u32) {
    if source <= 0x00FF_FFFF {
        return;
    }
    if source >= 0xFF00_0000 || *target <= 0x00FF_FFFF {
        *target = source;
        return;
    }

    let a1 = source >> 24;
    let r1 = source & 0xFF;
    let g1 = (source >> 8) & 0xFF;
    let b1 = (source >> 16) & 0xFF;

    let a0 = *target >> 24;
    let r0 = (*target & 0xFF) * a0;
    let g0 = ((*target >> 8) & 0xFF) * a0;
    let b0 = ((*target >> 16) & 0xFF) * a0;

    let alpha = ((a1 + a0) << 8) - a0 * a1;
    let channel = |c1: u32, c0: u32| {
        (c1 << 8)
            .wrapping_sub(c0)
            .wrapping_mul(a1)
            .wrapping_add(c0 << 8)
            / alpha
    };
    let r = channel(r1, r0);
    let g = channel(g1, g0);
    let b = channel(b1, b0);

    *target = ((alpha >> 8) << 24) | (b << 16) | (g << 8) | r;
}

/// Composite one layer onto the canvas at its offset
///
/// The layer is clipped against both the canvas and its own bounds.
pub fn composite_layer(canvas: &mut Canvas, layer: &PreparedLayer) {
    let canvas_width = i64::from(canvas.width());
    let canvas_height = i64::from(canvas.height());
    let layer_width = i64::from(layer.width);
    let layer_height = i64::from(layer.height);
    let x = i64::from(layer.x);
    let y = i64::from(layer.y);

    let source_x = (-x).max(0);
    let source_y = (-y).max(0);
    let columns = layer_width - source_x - (x + layer_width - canvas_width).max(0);
    let rows = layer_height - source_y - (y + layer_height - canvas_height).max(0);
    if columns <= 0 || rows <= 0 {
        return;
    }

    let target_x = x.max(0) as usize;
    let target_y = y.max(0) as usize;
    let source_x = source_x as usize;
    let columns = columns as usize;

    let target_rows = canvas
        .pixels_mut()
        .chunks_exact_mut(canvas_width as usize)
        .skip(target_y);
    let source_rows = layer
        .pixels
        .chunks_exact(layer.width as usize)
        .skip(source_y as usize);

    for (target_row, source_row) in target_rows.zip(source_rows).take(rows as usize) {
        let targets = &mut target_row[target_x..target_x + columns];
        let sources = &source_row[source_x..source_x + columns];
        for (target, &source) in targets.iter_mut().zip(sources) {
            composite_pixel(target, source);
        }
    }
}

/// Composite layers in bottom-to-top order
pub fn composite(canvas: &mut Canvas, layers: &[PreparedLayer]) {
    for layer in layers {
        composite_layer(canvas, layer);
    }
}
