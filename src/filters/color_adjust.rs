//! Pixel-wise tone adjustments: brightness/contrast and gamma.
//!
//! Both mutate R, G and B in place, clamp to 0-255 and leave alpha
//! untouched.

use ndarray::Array3;

/// Adjust brightness and contrast in one pass.
///
/// The contrast percentage becomes the slope factor
/// `259*(contrast+255) / (255*(259-contrast))`; each channel is then
/// `clamp(factor*(v-128) + 128 + brightness)`. Contrast must lie
/// strictly inside (-259, 259) — the options validator guarantees
/// this before the pipeline runs.
///
/// # Arguments
/// * `brightness` - additive offset, -100..=100 by UI contract
/// * `contrast` - slope percentage, -100..=100 by UI contract
pub fn adjust_brightness_contrast(data: &mut Array3<u8>, brightness: i32, contrast: i32) {
    let (height, width, _) = data.dim();
    let factor = (259.0 * (contrast as f32 + 255.0)) / (255.0 * (259.0 - contrast as f32));
    let offset = brightness as f32;

    for y in 0..height {
        for x in 0..width {
            for c in 0..3 {
                let v = data[[y, x, c]] as f32;
                let adjusted = factor * (v - 128.0) + 128.0 + offset;
                data[[y, x, c]] = adjusted.clamp(0.0, 255.0).round() as u8;
            }
        }
    }
}

/// Apply gamma correction in place.
///
/// Each channel becomes `clamp(255 * (v/255)^(1/gamma))`. Gamma must
/// be finite and > 0 (validated up front); 1.0 is the identity within
/// rounding.
pub fn apply_gamma(data: &mut Array3<u8>, gamma: f32) {
    let (height, width, _) = data.dim();
    let inv_gamma = 1.0 / gamma;

    for y in 0..height {
        for x in 0..width {
            for c in 0..3 {
                let v = data[[y, x, c]] as f32 / 255.0;
                let corrected = v.powf(inv_gamma) * 255.0;
                data[[y, x, c]] = corrected.clamp(0.0, 255.0).round() as u8;
            }
        }
    }
}
