//! # blend-core
//!
//! Request model, option validation, color math and shared error types for the
//! layer blending service. A blend request is an ordered stack of encoded image
//! layers, each with an independent offset, plus output options describing the
//! canvas, matte, tint and encoding.
//!
//! The compositing pipeline itself lives in `blend-renderer`; this crate holds
//! everything that must be settled before any pixel work starts.
//!
//! ## Quick Start
//!
//! ```rust
//! use blend_core::{BlendOptions, BlendRequest, LayerSpec, OutputFormat};
//!
//! let options = BlendOptions {
//!     format: Some("jpeg".to_string()),
//!     width: Some(256),
//!     height: Some(256),
//!     ..BlendOptions::default()
//! };
//! let layers = vec![LayerSpec::new(vec![0u8; 16]).at(10, -4)];
//!
//! let request = BlendRequest::from_options(layers, &options)?;
//! assert_eq!(request.encode.format, OutputFormat::Jpeg);
//! assert_eq!(request.encode.quality, 80);
//! # Ok::<(), blend_core::BlendError>(())
//! ```

#![deny(clippy::all)]
#![deny(unsafe_code)]

pub mod request;
pub mod utils;

pub use request::{
    BlendOptions, BlendRequest, EncodeOptions, LayerInput, LayerSpec, OutputFormat, PngEncoder,
    QuantizeMode, Tint, TintOptions, TintRange,
};
pub use utils::{BlendError, Palette, PaletteLookup, Result};

/// Crate version for runtime compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
