use image::RgbaImage;
use rayon::prelude::*;

/// Default per-channel tolerance for [`remove_background`].
pub const DEFAULT_THRESHOLD: u8 = 30;

/// Chroma-key background removal.
///
/// The pixel at (0, 0) is the key color (its alpha is ignored). Every pixel
/// whose R, G and B each differ from the key by strictly less than
/// `threshold` gets alpha 0; all other pixels are left untouched.
///
/// This is a global single-sample match, not a flood fill: interior regions
/// that happen to match the corner color are cleared too, even when they are
/// not connected to the border.
///
/// Returns the number of pixels whose alpha was set to 0.
pub fn remove_background(pixels: &mut RgbaImage, threshold: u8) -> usize {
    let w = pixels.width() as usize;
    if w == 0 || pixels.height() == 0 {
        return 0;
    }
    let key = {
        let p = pixels.get_pixel(0, 0);
        [p[0], p[1], p[2]]
    };
    let stride = w * 4;

    pixels
        .par_chunks_mut(stride)
        .map(|row| {
            let mut cleared = 0usize;
            for px in row.chunks_exact_mut(4) {
                if matches_key(px, &key, threshold) {
                    px[3] = 0;
                    cleared += 1;
                }
            }
            cleared
        })
        .sum()
}

#[inline]
fn matches_key(px: &[u8], key: &[u8; 3], threshold: u8) -> bool {
    px[0].abs_diff(key[0]) < threshold
        && px[1].abs_diff(key[1]) < threshold
        && px[2].abs_diff(key[2]) < threshold
}
