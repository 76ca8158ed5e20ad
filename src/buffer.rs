//! Owned RGBA pixel buffer.
//!
//! The pipeline operates on interleaved 8-bit RGBA stored as an
//! `ndarray` of shape `(height, width, 4)`. `PixelBuffer` owns one
//! image's worth of pixels for the duration of its pipeline run;
//! ownership transfers to the caller when the batch emits results.

use ndarray::{Array3, ArrayView3, ArrayViewMut3};

use crate::error::DecodeError;

/// Number of interleaved channels per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// A width x height grid of RGBA pixels, row-major, channel values
/// 0-255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Array3<u8>,
}

impl PixelBuffer {
    /// Create an opaque black buffer of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        let mut data = Array3::<u8>::zeros((height, width, CHANNELS));
        data.slice_mut(ndarray::s![.., .., 3]).fill(255);
        Self { data }
    }

    /// Wrap an existing `(height, width, 4)` array.
    pub fn from_array(data: Array3<u8>) -> Self {
        debug_assert_eq!(data.shape()[2], CHANNELS);
        Self { data }
    }

    /// Build a buffer from flat interleaved RGBA bytes, as handed over
    /// by an external decoder.
    ///
    /// # Errors
    /// Returns [`DecodeError::ShapeMismatch`] if `bytes.len()` is not
    /// `width * height * 4`.
    pub fn from_rgba_bytes(bytes: &[u8], width: usize, height: usize) -> Result<Self, DecodeError> {
        let expected = width * height * CHANNELS;
        if bytes.len() != expected {
            return Err(DecodeError::ShapeMismatch {
                width,
                height,
                expected,
                actual: bytes.len(),
            });
        }
        let data = Array3::from_shape_vec((height, width, CHANNELS), bytes.to_vec())
            .expect("length checked against shape above");
        Ok(Self { data })
    }

    pub fn width(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn height(&self) -> usize {
        self.data.shape()[0]
    }

    /// Total pixel count (`width * height`).
    pub fn pixel_count(&self) -> usize {
        self.width() * self.height()
    }

    /// Read-only view of the underlying `(height, width, 4)` array.
    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    /// Mutable view for in-place filters.
    pub fn view_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        self.data.view_mut()
    }

    /// The underlying array, for filters that take `&mut Array3<u8>`.
    pub fn array_mut(&mut self) -> &mut Array3<u8> {
        &mut self.data
    }

    pub fn array(&self) -> &Array3<u8> {
        &self.data
    }

    /// One pixel as `[r, g, b, a]`.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        [
            self.data[[y, x, 0]],
            self.data[[y, x, 1]],
            self.data[[y, x, 2]],
            self.data[[y, x, 3]],
        ]
    }

    /// Overwrite one pixel with `[r, g, b, a]`.
    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        for (c, &v) in rgba.iter().enumerate() {
            self.data[[y, x, c]] = v;
        }
    }

    /// Consume the buffer, returning flat interleaved RGBA bytes.
    pub fn into_rgba_bytes(self) -> Vec<u8> {
        self.data.into_raw_vec_and_offset().0
    }
}
