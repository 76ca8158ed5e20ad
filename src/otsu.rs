//! Otsu's method: estimate a global threshold from the image's own
//! luminance histogram.
//!
//! The histogram is built over channel 0, which assumes luminance has
//! already been reduced to the red channel (true after grayscale
//! conversion, and a documented recommendation when feeding color
//! images). The batch pipeline runs this on the as-decoded buffer so
//! the estimate reflects the source image's distribution, not the
//! filtered one.

use crate::buffer::PixelBuffer;

/// Threshold maximizing between-class variance.
///
/// Scans candidate thresholds 0..=255 with running background and
/// foreground weights; ties resolve to the lowest maximizing index
/// (strict `>` comparison). A solid-color image never produces a
/// positive variance and yields 0. Always returns a value.
pub fn otsu_threshold(buffer: &PixelBuffer) -> u8 {
    let pixels = buffer.view();
    let (height, width) = (buffer.height(), buffer.width());

    let mut hist = [0u64; 256];
    for y in 0..height {
        for x in 0..width {
            hist[pixels[[y, x, 0]] as usize] += 1;
        }
    }
    let total = (width * height) as u64;

    let sum: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut sum_b = 0.0f64;
    let mut w_b = 0u64;
    let mut max_var = 0.0f64;
    let mut threshold = 0u8;

    for (i, &count) in hist.iter().enumerate() {
        w_b += count;
        if w_b == 0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f == 0 {
            break;
        }
        sum_b += i as f64 * count as f64;
        let m_b = sum_b / w_b as f64;
        let m_f = (sum - sum_b) / w_f as f64;
        let var_between = w_b as f64 * w_f as f64 * (m_b - m_f) * (m_b - m_f);
        if var_between > max_var {
            max_var = var_between;
            threshold = i as u8;
        }
    }

    threshold
}
