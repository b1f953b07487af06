//! Layer compositing pipeline with pluggable codecs
//!
//! `blend-renderer` takes a validated [`BlendRequest`] from `blend-core`,
//! composites its layers back to front with integer alpha blending, applies
//! the optional tint and encodes the result as JPEG, true-color PNG or
//! paletted PNG. Codecs sit behind traits in [`backends`]; the standard set is
//! built on the `image` and `png` crates.
//!
//! ```rust
//! use blend_core::{BlendRequest, EncodeOptions};
//! use blend_renderer::{blend, Codecs};
//!
//! // Nothing to composite: a 4x4 opaque red matte encoded as PNG
//! let request = BlendRequest::new(Vec::new())
//!     .with_size(4, 4)
//!     .with_matte(0xFF00_00FF)
//!     .with_encode(EncodeOptions::default());
//! let output = blend(request, &Codecs::standard())?;
//! assert_eq!(&output.data[1..4], b"PNG");
//! # Ok::<(), blend_core::BlendError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod backends;
pub mod canvas;
pub mod pipeline;
#[cfg(feature = "parallel")]
pub mod service;

pub use backends::{
    CanvasEncoder, Codecs, DecodeError, EncodeError, LayerDecoder, LayerHeader, LayerImage,
    PaletteBuilder, PngOptions,
};
pub use canvas::Canvas;
pub use pipeline::{blend, BlendOutput};
#[cfg(feature = "parallel")]
pub use service::{BlendResult, BlendService, ServiceConfig, ServiceError};

pub use blend_core::{BlendError, BlendRequest};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
