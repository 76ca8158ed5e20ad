//! Sharpening filter.
//!
//! Fixed 3x3 kernel applied to a snapshot of the pre-sharpen buffer:
//!
//! ```text
//!  0  -1   0
//! -1   5  -1
//!  0  -1   0
//! ```
//!
//! Same interior-only rule as the box blur: the outermost 1-pixel
//! border is never written.

use ndarray::Array3;

/// Sharpen R, G and B in place; alpha is untouched.
pub fn sharpen(data: &mut Array3<u8>) {
    let (height, width, _) = data.dim();
    let snapshot = data.clone();

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            for c in 0..3 {
                let sum = 5 * snapshot[[y, x, c]] as i32
                    - snapshot[[y - 1, x, c]] as i32
                    - snapshot[[y + 1, x, c]] as i32
                    - snapshot[[y, x - 1, c]] as i32
                    - snapshot[[y, x + 1, c]] as i32;
                data[[y, x, c]] = sum.clamp(0, 255) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn solid(v: u8, size: usize) -> Array3<u8> {
        let mut img = Array3::<u8>::zeros((size, size, 4));
        for y in 0..size {
            for x in 0..size {
                for c in 0..3 {
                    img[[y, x, c]] = v;
                }
                img[[y, x, 3]] = 255;
            }
        }
        img
    }

    #[test]
    fn solid_image_is_unchanged() {
        let mut img = solid(80, 4);
        let before = img.clone();
        sharpen(&mut img);
        assert_eq!(img, before);
    }

    #[test]
    fn border_is_never_touched() {
        let mut img = solid(100, 5);
        img[[2, 2, 0]] = 255;
        let before = img.clone();
        sharpen(&mut img);
        for i in 0..5 {
            for c in 0..4 {
                assert_eq!(img[[0, i, c]], before[[0, i, c]]);
                assert_eq!(img[[4, i, c]], before[[4, i, c]]);
                assert_eq!(img[[i, 0, c]], before[[i, 0, c]]);
                assert_eq!(img[[i, 4, c]], before[[i, 4, c]]);
            }
        }
    }

    #[test]
    fn bright_spot_gets_amplified_and_clamped() {
        let mut img = solid(100, 5);
        img[[2, 2, 0]] = 200;
        sharpen(&mut img);
        // center: 5*200 - 4*100 = 600 -> clamped to 255
        assert_eq!(img[[2, 2, 0]], 255);
        // direct neighbor: 5*100 - 200 - 3*100 = 0
        assert_eq!(img[[2, 1, 0]], 0);
        // untouched channel stays flat
        assert_eq!(img[[2, 2, 1]], 100);
    }

    #[test]
    fn reads_come_from_the_snapshot() {
        // Two bright pixels side by side: each sees the other's
        // original value, not the sharpened one.
        let mut img = solid(100, 5);
        img[[2, 2, 0]] = 150;
        img[[2, 3, 0]] = 150;
        sharpen(&mut img);
        // 5*150 - 150 - 3*100 = 300 -> 255 for both, symmetric.
        assert_eq!(img[[2, 2, 0]], img[[2, 3, 0]]);
    }
}
