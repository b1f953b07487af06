//! Layer preparation
//!
//! Walks the layers from the top of the stack down, probing each one, and
//! decodes only those that can still influence the canvas. The walk resolves
//! an implied canvas size, culls layers that fall outside it, detects the
//! single-layer pass-through and stops as soon as an opaque layer covers the
//! whole canvas. The result is either a pass-through or an immutable stack of
//! decoded layers in bottom-to-top order.

use blend_core::{BlendError, BlendRequest};
use log::{debug, warn};

use crate::backends::{LayerDecoder, LayerHeader};

/// Decoded layer that survived culling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedLayer {
    /// Position of the layer in the request
    pub index: usize,
    /// Horizontal offset on the canvas
    pub x: i32,
    /// Vertical offset on the canvas
    pub y: i32,
    /// Layer width
    pub width: u32,
    /// Layer height
    pub height: u32,
    /// Packed pixels, row-major
    pub pixels: Vec<u32>,
}

/// Layers to composite and the canvas they go onto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerStack {
    /// Resolved canvas width
    pub width: u32,
    /// Resolved canvas height
    pub height: u32,
    /// Surviving layers, bottom first
    pub layers: Vec<PreparedLayer>,
    /// No opaque layer covers the whole canvas, so the matte may show
    pub possibly_transparent: bool,
    /// Decode warnings, tagged with their layer, in processing order
    pub warnings: Vec<String>,
}

/// Outcome of layer preparation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preparation {
    /// Return the encoded bytes of this layer unchanged
    PassThrough {
        /// Position of the layer in the request
        layer: usize,
    },
    /// Composite the stack
    Composite(LayerStack),
}

/// Probe, cull and decode the request's layers
///
/// # Errors
///
/// `DecodeFailure` when a layer cannot be probed or decoded or has no pixels;
/// `InvalidDimensions` when the canvas size cannot be resolved.
pub fn prepare_layers(
    request: &BlendRequest,
    decoder: &dyn LayerDecoder,
) -> Result<Preparation, BlendError> {
    let mut width = i64::from(request.width);
    let mut height = i64::from(request.height);
    let mut accepted: Vec<PreparedLayer> = Vec::new();
    let mut warnings = Vec::new();
    let mut possibly_transparent = true;

    for (index, layer) in request.layers.iter().enumerate().rev() {
        let header = decoder
            .probe(&layer.data)
            .map_err(|err| BlendError::decode_failure(index, err.message))?;
        if header.width == 0 || header.height == 0 {
            return Err(BlendError::decode_failure(
                index,
                format!("Layer {index} has no pixels"),
            ));
        }

        let x = i64::from(layer.x);
        let y = i64::from(layer.y);
        let visible_width = i64::from(header.width) + x;
        let visible_height = i64::from(header.height) + y;

        // The first layer reaching into view sets any size left unspecified.
        if width <= 0 {
            width = visible_width.max(0);
        }
        if height <= 0 {
            height = visible_height.max(0);
        }

        if visible_width <= 0 || visible_height <= 0 || x >= width || y >= height {
            debug!("layer {index} lies outside the {width}x{height} canvas, skipped");
            continue;
        }

        if accepted.is_empty() && can_pass_through(request, &header, x, y, width, height) {
            debug!("layer {index} matches the canvas exactly, passing it through");
            return Ok(Preparation::PassThrough { layer: index });
        }

        let image = decoder
            .decode(&layer.data)
            .map_err(|err| BlendError::decode_failure(index, err.message))?;
        if image.width != header.width
            || image.height != header.height
            || image.pixels.len() != image.width as usize * image.height as usize
        {
            return Err(BlendError::decode_failure(
                index,
                format!(
                    "Layer {index} decoded to {}x{} with {} pixels, header said {}x{}",
                    image.width,
                    image.height,
                    image.pixels.len(),
                    header.width,
                    header.height
                ),
            ));
        }

        for warning in &image.warnings {
            warn!("layer {index}: {warning}");
            warnings.push(format!("Layer {index}: {warning}"));
        }

        let covers_width = x <= 0 && visible_width >= width;
        let covers_height = y <= 0 && visible_height >= height;
        let opaque_cover = !image.has_alpha && covers_width && covers_height;

        accepted.push(PreparedLayer {
            index,
            x: layer.x,
            y: layer.y,
            width: image.width,
            height: image.height,
            pixels: image.pixels,
        });

        if opaque_cover {
            debug!("layer {index} is opaque and covers the canvas, layers below are hidden");
            possibly_transparent = false;
            break;
        }
    }

    let (Ok(canvas_width), Ok(canvas_height)) = (u32::try_from(width), u32::try_from(height))
    else {
        return Err(BlendError::InvalidDimensions { width, height });
    };
    if canvas_width == 0 || canvas_height == 0 {
        return Err(BlendError::InvalidDimensions { width, height });
    }

    accepted.reverse();
    Ok(Preparation::Composite(LayerStack {
        width: canvas_width,
        height: canvas_height,
        layers: accepted,
        possibly_transparent,
        warnings,
    }))
}

fn can_pass_through(
    request: &BlendRequest,
    header: &LayerHeader,
    x: i64,
    y: i64,
    width: i64,
    height: i64,
) -> bool {
    !header.has_alpha
        && !request.reencode
        && x == 0
        && y == 0
        && i64::from(header.width) == width
        && i64::from(header.height) == height
}
