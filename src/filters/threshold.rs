//! Final threshold/inversion stage.
//!
//! Runs after all preprocessing filters, gated per pixel on the
//! grayscale mask captured from the *original* buffer: pixels that
//! were not grayscale before preprocessing keep their RGB values (and
//! are forced fully opaque), no matter what the filters turned them
//! into.

use ndarray::Array3;

use crate::filters::grayscale::luminance;
use crate::mask::GrayscaleMask;
use crate::options::TransparencyColor;

/// What the stage does to each mask-true pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageMode {
    /// Binarize: 255 where post-filter luminance < threshold, else 0.
    Threshold(u8),
    /// Invert: `round(255 - mean(R,G,B))` of the post-filter pixel.
    Invert,
}

/// Apply the stage in place.
///
/// For mask-true pixels, R=G=B becomes the mode's new value; alpha is
/// 0 when `transparency` matches the new value (black keys 0, white
/// keys 255) and 255 otherwise. Mask-false pixels keep their RGB and
/// get alpha 255.
///
/// The mask must have been captured from this image before any filter
/// ran; its length equals the buffer's pixel count.
pub fn apply_stage(
    data: &mut Array3<u8>,
    mask: &GrayscaleMask,
    mode: StageMode,
    transparency: Option<TransparencyColor>,
) {
    let (height, width, _) = data.dim();
    debug_assert_eq!(mask.len(), height * width);

    for y in 0..height {
        for x in 0..width {
            if !mask.get(x, y) {
                data[[y, x, 3]] = 255;
                continue;
            }

            let (r, g, b) = (data[[y, x, 0]], data[[y, x, 1]], data[[y, x, 2]]);
            let new_val = match mode {
                StageMode::Threshold(threshold) => {
                    if luminance(r, g, b) < threshold as f32 {
                        255
                    } else {
                        0
                    }
                }
                StageMode::Invert => {
                    let avg = (r as f32 + g as f32 + b as f32) / 3.0;
                    (255.0 - avg).round() as u8
                }
            };

            data[[y, x, 0]] = new_val;
            data[[y, x, 1]] = new_val;
            data[[y, x, 2]] = new_val;
            data[[y, x, 3]] = match transparency {
                Some(TransparencyColor::Black) if new_val == 0 => 0,
                Some(TransparencyColor::White) if new_val == 255 => 0,
                _ => 255,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBuffer;

    fn mask_for(buf: &PixelBuffer, tolerance: u8) -> GrayscaleMask {
        GrayscaleMask::capture(buf, tolerance)
    }

    #[test]
    fn threshold_binarizes_around_the_cutoff() {
        let mut buf = PixelBuffer::new(2, 1);
        buf.set_pixel(0, 0, [100, 100, 100, 255]);
        buf.set_pixel(1, 0, [150, 150, 150, 255]);
        let mask = mask_for(&buf, 5);
        apply_stage(buf.array_mut(), &mask, StageMode::Threshold(128), None);
        // 100 < 128 -> white, 150 >= 128 -> black; both opaque.
        assert_eq!(buf.pixel(0, 0), [255, 255, 255, 255]);
        assert_eq!(buf.pixel(1, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn non_grayscale_pixel_keeps_its_color() {
        let mut buf = PixelBuffer::new(1, 1);
        buf.set_pixel(0, 0, [255, 0, 0, 255]);
        let mask = mask_for(&buf, 5);
        apply_stage(buf.array_mut(), &mask, StageMode::Threshold(128), None);
        assert_eq!(buf.pixel(0, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn black_transparency_keys_dark_results() {
        let mut buf = PixelBuffer::new(2, 1);
        buf.set_pixel(0, 0, [200, 200, 200, 255]);
        buf.set_pixel(1, 0, [50, 50, 50, 255]);
        let mask = mask_for(&buf, 5);
        apply_stage(
            buf.array_mut(),
            &mask,
            StageMode::Threshold(128),
            Some(TransparencyColor::Black),
        );
        // 200 -> black -> transparent; 50 -> white -> opaque.
        assert_eq!(buf.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(buf.pixel(1, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn white_transparency_keys_bright_results() {
        let mut buf = PixelBuffer::new(1, 1);
        buf.set_pixel(0, 0, [50, 50, 50, 255]);
        let mask = mask_for(&buf, 5);
        apply_stage(
            buf.array_mut(),
            &mask,
            StageMode::Threshold(128),
            Some(TransparencyColor::White),
        );
        assert_eq!(buf.pixel(0, 0), [255, 255, 255, 0]);
    }

    #[test]
    fn inversion_reflects_around_the_mean() {
        let mut buf = PixelBuffer::new(1, 1);
        buf.set_pixel(0, 0, [100, 100, 100, 255]);
        let mask = mask_for(&buf, 5);
        apply_stage(buf.array_mut(), &mask, StageMode::Invert, None);
        assert_eq!(buf.pixel(0, 0), [155, 155, 155, 255]);
    }

    #[test]
    fn inversion_with_transparency_keys_extremes() {
        let mut buf = PixelBuffer::new(2, 1);
        buf.set_pixel(0, 0, [255, 255, 255, 255]);
        buf.set_pixel(1, 0, [0, 0, 0, 255]);
        let mask = mask_for(&buf, 5);
        apply_stage(
            buf.array_mut(),
            &mask,
            StageMode::Invert,
            Some(TransparencyColor::Black),
        );
        // White inverts to 0 -> keyed out; black inverts to 255 -> opaque.
        assert_eq!(buf.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(buf.pixel(1, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn mask_false_pixels_are_forced_opaque() {
        let mut buf = PixelBuffer::new(1, 1);
        buf.set_pixel(0, 0, [255, 0, 0, 42]);
        let mask = mask_for(&buf, 5);
        apply_stage(buf.array_mut(), &mask, StageMode::Invert, None);
        assert_eq!(buf.pixel(0, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn stage_uses_the_captured_mask_not_current_pixels() {
        // Mask captured while the pixel was colored; the pixel is then
        // turned gray (as a preprocessing filter would) and must still
        // be skipped by the stage.
        let mut buf = PixelBuffer::new(1, 1);
        buf.set_pixel(0, 0, [255, 0, 0, 255]);
        let mask = mask_for(&buf, 5);
        buf.set_pixel(0, 0, [77, 77, 77, 255]);
        apply_stage(buf.array_mut(), &mask, StageMode::Threshold(128), None);
        assert_eq!(buf.pixel(0, 0), [77, 77, 77, 255]);
    }
}
