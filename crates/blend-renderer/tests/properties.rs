//! Property tests for the compositing core

use blend_renderer::pipeline::{composite, composite_layer, composite_pixel, PreparedLayer};
use blend_renderer::Canvas;
use proptest::prelude::*;

fn any_layer() -> impl Strategy<Value = PreparedLayer> {
    (1u32..8, 1u32..8, -10i32..16, -10i32..16).prop_flat_map(|(width, height, x, y)| {
        prop::collection::vec(any::<u32>(), (width * height) as usize).prop_map(move |pixels| {
            PreparedLayer {
                index: 0,
                x,
                y,
                width,
                height,
                pixels,
            }
        })
    })
}

fn any_canvas() -> impl Strategy<Value = Canvas> {
    (1u32..12, 1u32..12).prop_flat_map(|(width, height)| {
        prop::collection::vec(any::<u32>(), (width * height) as usize)
            .prop_map(move |pixels| Canvas::from_pixels(width, height, pixels).unwrap())
    })
}

/// Per-pixel reference with explicit bounds checks
fn naive_composite(canvas: &mut Canvas, layer: &PreparedLayer) {
    let width = i64::from(canvas.width());
    let height = i64::from(canvas.height());
    for ly in 0..i64::from(layer.height) {
        for lx in 0..i64::from(layer.width) {
            let cx = i64::from(layer.x) + lx;
            let cy = i64::from(layer.y) + ly;
            if cx < 0 || cy < 0 || cx >= width || cy >= height {
                continue;
            }
            let source = layer.pixels[(ly * i64::from(layer.width) + lx) as usize];
            composite_pixel(&mut canvas.pixels_mut()[(cy * width + cx) as usize], source);
        }
    }
}

proptest! {
    #[test]
    fn clipping_matches_reference(canvas in any_canvas(), layer in any_layer()) {
        let mut fast = canvas.clone();
        let mut reference = canvas;
        composite_layer(&mut fast, &layer);
        naive_composite(&mut reference, &layer);
        prop_assert_eq!(fast, reference);
    }

    #[test]
    fn stack_is_a_bottom_up_fold(
        canvas in any_canvas(),
        layers in prop::collection::vec(any_layer(), 0..4),
    ) {
        let mut stacked = canvas.clone();
        composite(&mut stacked, &layers);

        let mut folded = canvas;
        for layer in &layers {
            naive_composite(&mut folded, layer);
        }
        prop_assert_eq!(stacked, folded);
    }

    #[test]
    fn opaque_layer_wins_inside_its_extent(canvas in any_canvas(), layer in any_layer()) {
        let mut layer = layer;
        for pixel in &mut layer.pixels {
            *pixel |= 0xFF00_0000;
        }
        let mut result = canvas.clone();
        composite_layer(&mut result, &layer);

        for y in 0..result.height() {
            for x in 0..result.width() {
                let lx = i64::from(x) - i64::from(layer.x);
                let ly = i64::from(y) - i64::from(layer.y);
                let inside = (0..i64::from(layer.width)).contains(&lx)
                    && (0..i64::from(layer.height)).contains(&ly);
                let expected = if inside {
                    layer.pixels[(ly * i64::from(layer.width) + lx) as usize]
                } else {
                    canvas.pixel(x, y).unwrap()
                };
                prop_assert_eq!(result.pixel(x, y), Some(expected));
            }
        }
    }

    #[test]
    fn blending_never_lowers_alpha(target in any::<u32>(), source in any::<u32>()) {
        let mut blended = target;
        composite_pixel(&mut blended, source);
        prop_assert!(blended >> 24 >= (target >> 24).max(source >> 24));
    }

    #[test]
    fn transparent_source_is_a_no_op(target in any::<u32>(), color in 0u32..0x0100_0000) {
        let mut blended = target;
        composite_pixel(&mut blended, color);
        prop_assert_eq!(blended, target);
    }
}
