//! Error types for configuration validation, item decoding and the
//! per-image pipeline.
//!
//! All pixel arithmetic in the filters saturates (clamps to 0-255)
//! instead of erroring; the only failure points are invalid
//! configuration, a source that cannot produce a pixel buffer, and
//! cancellation.

use thiserror::Error;

/// A configuration that would produce non-finite or divide-by-zero
/// pixel math. Rejected up front, before any image is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    /// Gamma must be finite and strictly positive.
    #[error("gamma must be finite and > 0, got {0}")]
    InvalidGamma(f32),

    /// The contrast factor `259*(c+255) / (255*(259-c))` requires
    /// contrast strictly inside (-259, 259).
    #[error("contrast must lie strictly between -259 and 259, got {0}")]
    ContrastOutOfRange(i32),
}

/// An image source failed to produce a pixel buffer.
///
/// Reported per batch item; the rest of the batch continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Flat RGBA data does not match the claimed dimensions.
    #[error("pixel data length {actual} does not match {width}x{height} RGBA ({expected} bytes)")]
    ShapeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    /// The external decoder reported a failure.
    #[error("image source failed to decode: {0}")]
    Source(String),
}

impl DecodeError {
    /// Wrap an external decoder's failure message.
    pub fn source(reason: impl Into<String>) -> Self {
        Self::Source(reason.into())
    }
}

/// Errors surfaced by the per-image pipeline and the batch driver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("invalid processing options: {0}")]
    InvalidOptions(#[from] OptionsError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The batch was cancelled before this image finished.
    #[error("processing cancelled")]
    Cancelled,
}
