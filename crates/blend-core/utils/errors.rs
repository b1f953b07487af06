//! Error types for blend requests
//!
//! Every request ends in exactly one terminal outcome. `BlendError` is the
//! failure half of that outcome; its `Display` output is the message handed
//! back to the caller.

use thiserror::Error;

/// Result alias used throughout the blend crates
pub type Result<T> = core::result::Result<T, BlendError>;

/// Terminal failure of a blend request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlendError {
    /// Options or layers rejected by front-end validation
    #[error("{0}")]
    InvalidRequest(String),

    /// Canvas size could not be resolved to a usable pixel count
    #[error("Image dimensions {width}x{height} are invalid")]
    InvalidDimensions {
        /// Resolved canvas width
        width: i64,
        /// Resolved canvas height
        height: i64,
    },

    /// A layer failed to decode; the message is the decoder's diagnostic
    #[error("{message}")]
    DecodeFailure {
        /// Position of the layer in the request
        layer: usize,
        /// Decoder diagnostic
        message: String,
    },

    /// The canvas buffer could not be allocated
    #[error("Memory allocation failed")]
    AllocationFailure,

    /// The encoder rejected the finished canvas
    #[error("{0}")]
    EncodeFailure(String),
}

impl BlendError {
    /// Create a validation error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a decode failure for the layer at `layer`
    pub fn decode_failure(layer: usize, message: impl Into<String>) -> Self {
        Self::DecodeFailure {
            layer,
            message: message.into(),
        }
    }

    /// Check if the error is attributable to caller input rather than the service
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::InvalidDimensions { .. } | Self::DecodeFailure { .. }
        )
    }

    /// Layer position for decode failures
    #[must_use]
    pub fn layer(&self) -> Option<usize> {
        match self {
            Self::DecodeFailure { layer, .. } => Some(*layer),
            _ => None,
        }
    }
}
