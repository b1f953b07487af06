//! Utility types and helper functions shared by the front end and the pipeline
//!
//! Contains the error type, packed-pixel color math and the palette value used
//! for paletted output.

pub mod color;
mod errors;
mod palette;

pub use color::{hsl_to_rgb, pack_argb, parse_hex_color, rgb_to_hsl, unpack_argb};
pub use errors::{BlendError, Result};
pub use palette::{Palette, PaletteLookup};
