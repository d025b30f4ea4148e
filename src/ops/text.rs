use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};
use image::RgbaImage;

use crate::error::EditorError;

/// Text alignment options, relative to the origin x.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlignment {
    fn offset(&self, line_width: f32) -> f32 {
        match self {
            TextAlignment::Left => 0.0,
            TextAlignment::Center => -line_width * 0.5,
            TextAlignment::Right => -line_width,
        }
    }
}

/// How a text overlay is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: [u8; 4],
    pub alignment: TextAlignment,
    pub anti_alias: bool,
    pub underline: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 32.0,
            color: [0, 0, 0, 255],
            alignment: TextAlignment::Left,
            anti_alias: true,
            underline: false,
        }
    }
}

/// Parse TrueType / OpenType bytes supplied by the host.
pub fn load_font(bytes: Vec<u8>) -> Result<FontArc, EditorError> {
    Ok(FontArc::try_from_vec(bytes)?)
}

/// Lay out a single line of text, returning positioned glyphs and the line
/// width. Glyph y is the baseline (`ascent` below the line top).
pub fn layout_line(font: &FontArc, text: &str, font_size: f32, alignment: TextAlignment) -> (Vec<(GlyphId, f32, f32)>, f32) {
    let scaled = font.as_scaled(font_size);
    let ascent = scaled.ascent();

    let mut glyphs = Vec::new();
    let mut cursor_x = 0.0f32;
    let mut last_glyph: Option<GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = last_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }
        glyphs.push((glyph_id, cursor_x, ascent));
        cursor_x += scaled.h_advance(glyph_id);
        last_glyph = Some(glyph_id);
    }

    let offset = alignment.offset(cursor_x);
    for glyph in &mut glyphs {
        glyph.1 += offset;
    }
    (glyphs, cursor_x)
}

/// RGBA text pixels clipped to the canvas, positioned at `(off_x, off_y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterizedText {
    pub buf: Vec<u8>,
    pub buf_w: u32,
    pub buf_h: u32,
    pub off_x: u32,
    pub off_y: u32,
}

impl RasterizedText {
    pub fn empty() -> Self {
        Self { buf: Vec::new(), buf_w: 0, buf_h: 0, off_x: 0, off_y: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.buf_w == 0 || self.buf_h == 0
    }

    /// Build from a coverage mask (0.0..=1.0 per pixel) and a solid color.
    pub fn from_coverage(coverage: &[f32], buf_w: u32, buf_h: u32, off_x: u32, off_y: u32, color: [u8; 4]) -> Self {
        let mut buf = vec![0u8; buf_w as usize * buf_h as usize * 4];
        for (i, &cov) in coverage.iter().enumerate().take(buf_w as usize * buf_h as usize) {
            if cov > 0.001 {
                let idx = i * 4;
                buf[idx] = color[0];
                buf[idx + 1] = color[1];
                buf[idx + 2] = color[2];
                buf[idx + 3] = (color[3] as f32 * cov.min(1.0)).round() as u8;
            }
        }
        Self { buf, buf_w, buf_h, off_x, off_y }
    }
}

/// Rasterize (possibly multi-line) text. `origin` is the top-left of the
/// first line's box for left alignment; lines are split on `'\n'`.
pub fn rasterize_text(
    font: &FontArc,
    text: &str,
    style: &TextStyle,
    origin_x: f32,
    origin_y: f32,
    canvas_w: u32,
    canvas_h: u32,
) -> RasterizedText {
    let scaled = font.as_scaled(style.size);
    let ascent = scaled.ascent();
    let line_height = scaled.height();

    let mut all_glyphs: Vec<(GlyphId, f32, f32)> = Vec::new();
    let mut line_widths: Vec<f32> = Vec::new();
    for (line_idx, line) in text.split('\n').enumerate() {
        let y_offset = line_idx as f32 * line_height;
        let (mut glyphs, width) = layout_line(font, line, style.size, style.alignment);
        for glyph in &mut glyphs {
            glyph.2 += y_offset;
        }
        all_glyphs.extend(glyphs);
        line_widths.push(width);
    }

    if all_glyphs.is_empty() {
        return RasterizedText::empty();
    }

    // Bounding box in text space
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for &(glyph_id, gx, gy) in &all_glyphs {
        let glyph = glyph_id.with_scale_and_position(style.size, point(gx, gy));
        let bounds = font.glyph_bounds(&glyph);
        min_x = min_x.min(bounds.min.x);
        min_y = min_y.min(bounds.min.y);
        max_x = max_x.max(bounds.max.x);
        max_y = max_y.max(bounds.max.y);
    }
    if style.underline {
        for (line_idx, &line_w) in line_widths.iter().enumerate() {
            let start = style.alignment.offset(line_w);
            min_x = min_x.min(start);
            max_x = max_x.max(start + line_w);
            max_y = max_y.max(line_idx as f32 * line_height + ascent + style.size * 0.2);
        }
    }
    if min_x >= max_x || min_y >= max_y {
        return RasterizedText::empty();
    }

    let pad = 2.0;
    let x0 = ((origin_x + min_x - pad).floor() as i32).max(0);
    let y0 = ((origin_y + min_y - pad).floor() as i32).max(0);
    let x1 = ((origin_x + max_x + pad).ceil() as i32).min(canvas_w as i32);
    let y1 = ((origin_y + max_y + pad).ceil() as i32).min(canvas_h as i32);
    if x1 <= x0 || y1 <= y0 {
        return RasterizedText::empty();
    }
    let buf_w = (x1 - x0) as u32;
    let buf_h = (y1 - y0) as u32;

    let mut coverage = vec![0.0f32; buf_w as usize * buf_h as usize];
    for &(glyph_id, gx, gy) in &all_glyphs {
        let glyph = glyph_id.with_scale_and_position(style.size, point(origin_x + gx, origin_y + gy));
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue; // whitespace
        };
        let b = outlined.px_bounds();
        outlined.draw(|px, py, cov| {
            let ix = b.min.x as i32 + px as i32 - x0;
            let iy = b.min.y as i32 + py as i32 - y0;
            if ix >= 0 && iy >= 0 && (ix as u32) < buf_w && (iy as u32) < buf_h {
                let idx = iy as usize * buf_w as usize + ix as usize;
                let v = if style.anti_alias { cov } else if cov > 0.5 { 1.0 } else { 0.0 };
                coverage[idx] = coverage[idx].max(v);
            }
        });
    }

    if style.underline {
        let thickness = (style.size * 0.06).max(1.0);
        for (line_idx, &line_w) in line_widths.iter().enumerate() {
            if line_w < 0.1 {
                continue;
            }
            let line_y = origin_y + line_idx as f32 * line_height + ascent + style.size * 0.1;
            let start_x = origin_x + style.alignment.offset(line_w);
            let ly0 = ((line_y - thickness * 0.5).floor() as i32 - y0).max(0);
            let ly1 = ((line_y + thickness * 0.5).ceil() as i32 - y0).min(buf_h as i32);
            let lx0 = (start_x.floor() as i32 - x0).max(0);
            let lx1 = ((start_x + line_w).ceil() as i32 - x0).min(buf_w as i32);
            for ly in ly0..ly1 {
                for lx in lx0..lx1 {
                    coverage[ly as usize * buf_w as usize + lx as usize] = 1.0;
                }
            }
        }
    }

    RasterizedText::from_coverage(&coverage, buf_w, buf_h, x0 as u32, y0 as u32, style.color)
}

/// Source-over composite of rasterized text onto `pixels`.
pub fn blend_rasterized(pixels: &mut RgbaImage, text: &RasterizedText) {
    if text.is_empty() {
        return;
    }
    for ty in 0..text.buf_h {
        let y = text.off_y + ty;
        if y >= pixels.height() {
            break;
        }
        for tx in 0..text.buf_w {
            let x = text.off_x + tx;
            if x >= pixels.width() {
                break;
            }
            let si = (ty as usize * text.buf_w as usize + tx as usize) * 4;
            let src = &text.buf[si..si + 4];
            if src[3] == 0 {
                continue;
            }
            let dst = pixels.get_pixel_mut(x, y);
            dst.0 = source_over(src, &dst.0);
        }
    }
}

/// Straight-alpha source-over.
fn source_over(src: &[u8], dst: &[u8; 4]) -> [u8; 4] {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}
