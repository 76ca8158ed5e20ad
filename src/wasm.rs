//! WebAssembly exports.
//!
//! These functions are exposed to JavaScript via wasm-bindgen and
//! operate on flat interleaved RGBA buffers, one image per call —
//! batch fan-out and download packaging stay on the JavaScript side.

use wasm_bindgen::prelude::*;

use crate::buffer::PixelBuffer;
use crate::options::{AdaptiveMethod, ProcessingOptions, TransparencyColor};
use crate::pipeline::{process_image, CancelToken};

/// Run the full pipeline on one RGBA image.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` / `height` - Image dimensions in pixels
/// * `tolerance` - Grayscale classification slack (0-255)
/// * `use_threshold` - Threshold mode when true, inversion mode when false
/// * `threshold` - Custom threshold (0-255), used unless `use_otsu`
/// * `use_otsu` - Estimate the threshold from the image histogram
/// * `grayscale` - Convert to grayscale before the final stage
/// * `blur_radius` - Box blur radius; 0 disables the blur
/// * `brightness` - Additive brightness, -100..=100
/// * `contrast` - Contrast percentage, -100..=100
/// * `gamma` - Gamma exponent, > 0
/// * `sharpen` - Apply the 3x3 sharpen kernel
/// * `transparent` - Key the configured color to alpha 0
/// * `transparent_white` - Key white instead of black
///
/// # Returns
/// Flat array of processed RGBA bytes
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn process_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    tolerance: u8,
    use_threshold: bool,
    threshold: u8,
    use_otsu: bool,
    grayscale: bool,
    blur_radius: u32,
    brightness: i32,
    contrast: i32,
    gamma: f32,
    sharpen: bool,
    transparent: bool,
    transparent_white: bool,
) -> Result<Vec<u8>, JsError> {
    let buffer = PixelBuffer::from_rgba_bytes(data, width, height)
        .map_err(|e| JsError::new(&e.to_string()))?;

    let options = ProcessingOptions {
        tolerance,
        use_threshold,
        threshold,
        adaptive_method: if use_otsu {
            AdaptiveMethod::Otsu
        } else {
            AdaptiveMethod::Custom
        },
        grayscale,
        blur: blur_radius > 0,
        blur_radius,
        brightness,
        contrast,
        gamma,
        sharpen,
        transparent,
        transparency_color: if transparent_white {
            TransparencyColor::White
        } else {
            TransparencyColor::Black
        },
    };

    let processed = process_image(buffer, &options, &CancelToken::new())
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(processed.into_rgba_bytes())
}
