//! Compositing pipeline
//!
//! A request flows through four stages:
//!
//! 1. [`prepare`]: probe, cull and decode layers back to front
//! 2. [`compositing`]: fold the surviving layers onto a fresh canvas
//! 3. [`tint`]: optional HSL round trip over the whole canvas
//! 4. [`encode`]: pick an output path and run the encoder
//!
//! Every stage either hands its result to the next one or ends the request
//! with a [`BlendError`]. Buffers are owned by the call and dropped on every
//! exit path.

use blend_core::{BlendError, BlendRequest};
use log::debug;

use crate::backends::Codecs;
use crate::canvas::Canvas;

pub mod compositing;
pub mod encode;
pub mod prepare;
pub mod tint;

pub use compositing::{composite, composite_layer, composite_pixel};
pub use encode::{encode_canvas, select_path, EncodePath};
pub use prepare::{prepare_layers, LayerStack, Preparation, PreparedLayer};
pub use tint::{apply_tint, tint_pixel};

/// Encoded image plus the warnings collected on the way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlendOutput {
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// `"Layer N: ..."` decode warnings, topmost layer first
    pub warnings: Vec<String>,
}

/// Run a request through the whole pipeline on the calling thread
///
/// # Errors
///
/// Any stage's failure ends the request; see [`BlendError`].
pub fn blend(request: BlendRequest, codecs: &Codecs) -> Result<BlendOutput, BlendError> {
    let stack = match prepare_layers(&request, codecs.decoder.as_ref())? {
        Preparation::PassThrough { layer } => {
            let mut layers = request.layers;
            let data = layers.swap_remove(layer).data;
            return Ok(BlendOutput {
                data,
                warnings: Vec::new(),
            });
        }
        Preparation::Composite(stack) => stack,
    };

    debug!(
        "compositing {} of {} layers onto {}x{} canvas",
        stack.layers.len(),
        request.layers.len(),
        stack.width,
        stack.height
    );

    let fill = if stack.possibly_transparent {
        request.matte
    } else {
        0
    };
    let mut canvas = Canvas::allocate(stack.width, stack.height, fill)?;
    composite(&mut canvas, &stack.layers);
    drop(stack.layers);

    apply_tint(&mut canvas, &request.tint);

    let data = encode_canvas(
        &canvas,
        stack.possibly_transparent,
        &request.encode,
        codecs,
    )?;
    Ok(BlendOutput {
        data,
        warnings: stack.warnings,
    })
}
