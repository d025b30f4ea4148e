use image::{Rgba, RgbaImage, imageops};
use serde::{Deserialize, Serialize};

use crate::error::EditorError;

/// Fully transparent pixel used to clear the surface.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

// ============================================================================
// FRAME: where the placed image sits on the surface
// ============================================================================

/// Integer rectangle in surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Clamp to a `w × h` surface. Returns `None` when nothing is left.
    pub fn clamp_to(&self, w: u32, h: u32) -> Option<Frame> {
        let x0 = self.x.min(w);
        let y0 = self.y.min(h);
        let x1 = self.x.saturating_add(self.width).min(w);
        let y1 = self.y.saturating_add(self.height).min(h);
        let clamped = Frame::new(x0, y0, x1 - x0, y1 - y0);
        (clamped.area() > 0).then_some(clamped)
    }
}

// ============================================================================
// SURFACE: the single drawing buffer owned by a session
// ============================================================================

/// Fixed-size RGBA8 drawing surface.
///
/// Dimensions never change after construction; geometry edits re-place content
/// inside the same buffer.
#[derive(Clone, Debug)]
pub struct Surface {
    pixels: RgbaImage,
    frame: Option<Frame>,
}

impl Surface {
    /// New, fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        // Sanity: never allocate a zero-sized buffer
        let (width, height) = (width.max(1), height.max(1));
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
            frame: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    /// Rectangle occupied by the placed image, if any.
    pub fn frame(&self) -> Option<Frame> {
        self.frame
    }

    pub fn set_frame(&mut self, frame: Option<Frame>) {
        self.frame = frame;
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    /// Reset every pixel to transparent and forget the frame.
    pub fn clear(&mut self) {
        for p in self.pixels.pixels_mut() {
            *p = TRANSPARENT;
        }
        self.frame = None;
    }

    /// Copy `image` onto the surface with its top-left at `(x, y)`, clipping
    /// anything outside. The new frame is the visible part of `image`.
    pub fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64) {
        imageops::replace(&mut self.pixels, image, x, y);
        let (w, h) = (self.width() as i64, self.height() as i64);
        let x0 = x.clamp(0, w);
        let y0 = y.clamp(0, h);
        let x1 = (x + image.width() as i64).clamp(0, w);
        let y1 = (y + image.height() as i64).clamp(0, h);
        self.frame = if x1 > x0 && y1 > y0 {
            Some(Frame::new(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
        } else {
            None
        };
    }

    /// Copy of the pixels inside `frame` (already clamped by the caller).
    pub fn extract(&self, frame: Frame) -> RgbaImage {
        imageops::crop_imm(&self.pixels, frame.x, frame.y, frame.width, frame.height).to_image()
    }
}

// ============================================================================
// SNAPSHOT: immutable full-surface copy for undo/redo
// ============================================================================

/// A complete copy of a surface at one instant.
///
/// Two snapshots compare equal when their dimensions and every pixel match;
/// the recorded frame does not take part in equality.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    frame: Option<Frame>,
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.pixels == other.pixels
    }
}

impl Eq for Snapshot {}

impl Snapshot {
    pub fn capture(surface: &Surface) -> Self {
        Self {
            width: surface.width(),
            height: surface.height(),
            pixels: surface.pixels.as_raw().clone(),
            frame: surface.frame,
        }
    }

    /// Overwrite `surface` with this snapshot's content.
    pub fn restore_into(&self, surface: &mut Surface) {
        match RgbaImage::from_raw(self.width, self.height, self.pixels.clone()) {
            Some(img) => {
                surface.pixels = img;
                surface.frame = self.frame;
            }
            None => {
                // from_bytes validates the buffer, so this only trips on a
                // hand-built snapshot.
                crate::log_err!(
                    "Snapshot::restore_into: {} bytes do not fit {}x{}",
                    self.pixels.len(),
                    self.width,
                    self.height
                );
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame(&self) -> Option<Frame> {
        self.frame
    }

    pub fn memory_bytes(&self) -> usize {
        self.pixels.len()
    }

    /// Compact binary form of the snapshot.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EditorError> {
        Ok(bincode::serialize(self)?)
    }

    /// Read a snapshot produced by [`Snapshot::to_bytes`].
    pub fn from_bytes(raw: &[u8]) -> Result<Self, EditorError> {
        let snap: Snapshot = bincode::deserialize(raw)?;
        let expected = snap.width as usize * snap.height as usize * 4;
        if snap.pixels.len() != expected {
            return Err(EditorError::Snapshot(format!(
                "pixel buffer is {} bytes, expected {} for {}x{}",
                snap.pixels.len(),
                expected,
                snap.width,
                snap.height
            )));
        }
        Ok(snap)
    }
}
