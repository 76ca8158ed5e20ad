//! Grayscale conversion filter.
//!
//! Replaces R, G and B with their weighted luma, leaving alpha
//! untouched. The same weights drive the luminance computation in the
//! threshold stage, so a converted image binarizes exactly on its own
//! gray values.

use ndarray::Array3;

/// Luma weights shared by the conversion filter and the threshold
/// stage.
pub const LUMA_R: f32 = 0.3;
pub const LUMA_G: f32 = 0.59;
pub const LUMA_B: f32 = 0.11;

/// Weighted luminance of one pixel, 0.0-255.0.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32
}

/// Convert an RGBA buffer to grayscale in place.
///
/// R, G and B become `round(0.3R + 0.59G + 0.11B)`; alpha is
/// preserved. Idempotent: a second application reproduces the same
/// values.
pub fn convert_to_grayscale(data: &mut Array3<u8>) {
    let (height, width, _) = data.dim();
    for y in 0..height {
        for x in 0..width {
            let gray = luminance(data[[y, x, 0]], data[[y, x, 1]], data[[y, x, 2]]).round() as u8;
            data[[y, x, 0]] = gray;
            data[[y, x, 1]] = gray;
            data[[y, x, 2]] = gray;
        }
    }
}
