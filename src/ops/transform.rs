// ============================================================================
// TRANSFORM OPERATIONS: placement, resize and crop on the fixed surface
// ============================================================================

use image::{RgbaImage, imageops};

use crate::canvas::{Frame, Surface};
use crate::error::EditorError;
use crate::ops::placement;

/// Interpolation method for resize operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl Interpolation {
    pub fn label(&self) -> &'static str {
        match self {
            Interpolation::Nearest => "Nearest Neighbor",
            Interpolation::Bilinear => "Bilinear",
            Interpolation::Bicubic => "Bicubic",
            Interpolation::Lanczos3 => "Lanczos3",
        }
    }

    /// Settings-file key.
    pub fn key(&self) -> &'static str {
        match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Bilinear => "bilinear",
            Interpolation::Bicubic => "bicubic",
            Interpolation::Lanczos3 => "lanczos3",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|i| i.key() == key)
    }

    pub fn all() -> &'static [Interpolation] {
        &[
            Interpolation::Nearest,
            Interpolation::Bilinear,
            Interpolation::Bicubic,
            Interpolation::Lanczos3,
        ]
    }

    pub fn to_filter(&self) -> imageops::FilterType {
        match self {
            Interpolation::Nearest => imageops::FilterType::Nearest,
            Interpolation::Bilinear => imageops::FilterType::Triangle,
            Interpolation::Bicubic => imageops::FilterType::CatmullRom,
            Interpolation::Lanczos3 => imageops::FilterType::Lanczos3,
        }
    }
}

/// Clear the surface and draw `source` scaled-to-fit and centered.
///
/// Zero-sized sources leave the surface untouched and return `None`.
pub fn place_fitted(surface: &mut Surface, source: &RgbaImage, interp: Interpolation) -> Option<Frame> {
    let fit = placement::fit(source.width(), source.height(), surface.width(), surface.height())?;
    let rect = fit.pixel_rect();
    let scaled = if (rect.width, rect.height) == source.dimensions() {
        source.clone()
    } else {
        imageops::resize(source, rect.width, rect.height, interp.to_filter())
    };
    surface.clear();
    surface.draw_image(&scaled, rect.x as i64, rect.y as i64);
    surface.frame()
}

/// Largest resize target, per side, as a multiple of the surface side.
/// Anything past the surface is clipped, so larger targets only cost memory.
pub const MAX_RESIZE_FACTOR: u32 = 4;

/// Reject resize targets that are zero or exceed [`MAX_RESIZE_FACTOR`] times
/// the surface on either side.
pub fn check_resize_target(surface: &Surface, new_w: u32, new_h: u32) -> Result<(), EditorError> {
    let max_w = surface.width().saturating_mul(MAX_RESIZE_FACTOR);
    let max_h = surface.height().saturating_mul(MAX_RESIZE_FACTOR);
    if new_w == 0 || new_h == 0 || new_w > max_w || new_h > max_h {
        return Err(EditorError::InvalidDimensions { width: new_w, height: new_h });
    }
    Ok(())
}

/// Resample the placed image to `new_w × new_h` and re-center it. Content
/// larger than the surface is clipped; the frame becomes the visible part.
pub fn resize_image(
    surface: &mut Surface,
    new_w: u32,
    new_h: u32,
    interp: Interpolation,
) -> Result<Frame, EditorError> {
    check_resize_target(surface, new_w, new_h)?;
    let frame = surface.frame().ok_or(EditorError::NoImage)?;
    let content = surface.extract(frame);
    let resized = imageops::resize(&content, new_w, new_h, interp.to_filter());

    let x = (surface.width() as i64 - new_w as i64) / 2;
    let y = (surface.height() as i64 - new_h as i64) / 2;
    surface.clear();
    surface.draw_image(&resized, x, y);
    surface.frame().ok_or(EditorError::NoImage)
}

/// Keep only `rect` (clamped to the surface) and scale it to fit the surface.
pub fn crop_to_rect(surface: &mut Surface, rect: Frame, interp: Interpolation) -> Result<Frame, EditorError> {
    if surface.frame().is_none() {
        return Err(EditorError::NoImage);
    }
    let region = rect
        .clamp_to(surface.width(), surface.height())
        .ok_or(EditorError::InvalidCrop)?;
    let content = surface.extract(region);
    place_fitted(surface, &content, interp).ok_or(EditorError::InvalidCrop)
}
