//! graybatch: batch pixel pipeline for grayscale-aware thresholding,
//! inversion and transparency keying.
//!
//! The crate consumes already-decoded RGBA buffers and a configuration
//! and produces processed buffers — file decoding, display, download
//! packaging and profile storage are caller-side concerns.
//!
//! ## Image Format
//! Pixel buffers are interleaved 8-bit RGBA of shape
//! `(height, width, 4)`, row-major, values 0-255. Filters mutate the
//! buffer in place and never touch alpha; only the final
//! threshold/inversion stage writes the alpha channel.
//!
//! ## Pipeline
//! Per image: capture the grayscale mask and (optionally) an Otsu
//! threshold estimate from the pixels *as decoded*, then run the
//! preprocessing filters — grayscale conversion, box blur,
//! brightness/contrast, gamma, sharpen — in fixed order, then
//! binarize or invert the pixels the mask flagged, with optional
//! transparency keying. The snapshot-before-mutate ordering is
//! load-bearing: the mask and the adaptive threshold describe the
//! source image, not the filtered one.
//!
//! Batches run each image independently on the rayon pool; decode
//! failures and cancellations drop single items, never the batch.

pub mod batch;
pub mod buffer;
pub mod error;
pub mod filters;
pub mod mask;
pub mod options;
pub mod otsu;
pub mod pipeline;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use batch::{
    process_batch, BatchFailure, BatchItem, BatchObserver, BatchReport, ImageSource, NoObserver,
    ProcessedImage,
};
pub use buffer::PixelBuffer;
pub use error::{DecodeError, OptionsError, PipelineError};
pub use mask::{is_grayscale, GrayscaleMask};
pub use options::{AdaptiveMethod, ProcessingOptions, TransparencyColor};
pub use otsu::otsu_threshold;
pub use pipeline::{process_image, CancelToken, Captured, Decoded, Preprocessed};
