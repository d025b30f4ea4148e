// ============================================================================
// PLACEMENT: scale-to-fit arithmetic for the fixed viewport
// ============================================================================

use crate::canvas::Frame;

/// Where and how large a source image is drawn inside the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub draw_width: f64,
    pub draw_height: f64,
}

/// Uniformly scale `src_w × src_h` to fit inside `vw × vh`, centered.
///
/// Returns `None` for zero-sized sources or viewports. The limiting axis gets
/// exactly the viewport bound so float rounding never pushes the image out.
pub fn fit(src_w: u32, src_h: u32, vw: u32, vh: u32) -> Option<Placement> {
    if src_w == 0 || src_h == 0 || vw == 0 || vh == 0 {
        return None;
    }
    let (sw, sh) = (src_w as f64, src_h as f64);
    let (vw, vh) = (vw as f64, vh as f64);

    let width_ratio = vw / sw;
    let height_ratio = vh / sh;

    let (scale, draw_width, draw_height) = if width_ratio <= height_ratio {
        (width_ratio, vw, (sh * width_ratio).min(vh))
    } else {
        (height_ratio, (sw * height_ratio).min(vw), vh)
    };

    Some(Placement {
        scale,
        offset_x: (vw - draw_width) / 2.0,
        offset_y: (vh - draw_height) / 2.0,
        draw_width,
        draw_height,
    })
}

impl Placement {
    /// Integer rectangle used when rasterizing the resampled image.
    /// Width and height are at least one pixel.
    pub fn pixel_rect(&self) -> Frame {
        let width = (self.draw_width.round() as u32).max(1);
        let height = (self.draw_height.round() as u32).max(1);
        Frame::new(
            self.offset_x.round().max(0.0) as u32,
            self.offset_y.round().max(0.0) as u32,
            width,
            height,
        )
    }
}
