// ============================================================================
// IMAGE FILTERS: grayscale
// ============================================================================

use image::RgbaImage;
use rayon::prelude::*;

/// Convert to neutral gray using the unweighted mean of R, G and B.
///
/// The mean is rounded to nearest, so a pixel that is already gray maps to
/// itself and a second application changes nothing. Alpha is untouched.
pub fn grayscale(pixels: &mut RgbaImage) {
    let w = pixels.width() as usize;
    if w == 0 || pixels.height() == 0 {
        return;
    }
    let stride = w * 4;

    // Parallel by row.
    pixels.par_chunks_mut(stride).for_each(|row| {
        for px in row.chunks_exact_mut(4) {
            let avg = channel_mean(px[0], px[1], px[2]);
            px[0] = avg;
            px[1] = avg;
            px[2] = avg;
        }
    });
}

/// Rounded mean of three channels. Sums are never a multiple of 3 plus a
/// half, so `(sum + 1) / 3` is exact round-to-nearest.
#[inline]
fn channel_mean(r: u8, g: u8, b: u8) -> u8 {
    ((r as u16 + g as u16 + b as u16 + 1) / 3) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use pretty_assertions::assert_eq;

    fn sample_image() -> RgbaImage {
        RgbaImage::from_fn(17, 9, |x, y| {
            Rgba([
                (x * 15) as u8,
                (y * 28) as u8,
                ((x * 7 + y * 13) % 256) as u8,
                (255 - x * 3) as u8,
            ])
        })
    }

    #[test]
    fn mean_rounds_to_nearest() {
        assert_eq!(channel_mean(0, 0, 1), 0);
        assert_eq!(channel_mean(0, 0, 2), 1);
        assert_eq!(channel_mean(255, 255, 255), 255);
        assert_eq!(channel_mean(10, 20, 30), 20);
    }

    #[test]
    fn every_pixel_becomes_neutral_and_keeps_alpha() {
        let src = sample_image();
        let mut img = src.clone();
        grayscale(&mut img);
        for (a, b) in src.pixels().zip(img.pixels()) {
            assert_eq!(b[0], b[1]);
            assert_eq!(b[1], b[2]);
            assert_eq!(b[3], a[3]);
            assert_eq!(b[0], channel_mean(a[0], a[1], a[2]));
        }
    }

    #[test]
    fn grayscale_is_idempotent() {
        let mut once = sample_image();
        grayscale(&mut once);
        let mut twice = once.clone();
        grayscale(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_image_is_a_no_op() {
        let mut img = RgbaImage::new(0, 0);
        grayscale(&mut img);
        assert_eq!(img.len(), 0);
    }
}
