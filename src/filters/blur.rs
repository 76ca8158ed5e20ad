//! Box blur.
//!
//! Square-kernel mean filter of side `2*radius+1`. Only interior
//! pixels (a 1-pixel border on every edge is left unprocessed) are
//! written, and the kernel reads from a snapshot of the pre-blur
//! buffer so writes never feed back into the window. Window samples
//! that fall outside the image are skipped; the divisor is the count
//! of in-bounds samples.

use ndarray::Array3;

/// Blur R, G and B in place; alpha is untouched.
///
/// `radius == 0` is a no-op. Images narrower or shorter than 3 pixels
/// have no interior and are returned unchanged.
pub fn box_blur(data: &mut Array3<u8>, radius: u32) {
    if radius == 0 {
        return;
    }
    let (height, width, _) = data.dim();
    let r = radius as isize;
    let snapshot = data.clone();

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let mut sum = [0u32; 3];
            let mut count = 0u32;

            for dy in -r..=r {
                let sy = y as isize + dy;
                if sy < 0 || sy >= height as isize {
                    continue;
                }
                for dx in -r..=r {
                    let sx = x as isize + dx;
                    if sx < 0 || sx >= width as isize {
                        continue;
                    }
                    for (c, acc) in sum.iter_mut().enumerate() {
                        *acc += snapshot[[sy as usize, sx as usize, c]] as u32;
                    }
                    count += 1;
                }
            }

            for (c, acc) in sum.iter().enumerate() {
                data[[y, x, c]] = (acc / count) as u8;
            }
        }
    }
}
