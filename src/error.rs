use std::fmt;

/// Error type for every fallible editor operation.
///
/// Undo/redo on an empty history is deliberately not represented here: it is
/// a no-op, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Uploaded bytes are not a decodable raster image.
    Decode(String),
    /// The surface could not be encoded for export.
    Encode(String),
    /// A geometry edit was requested before any image was placed.
    NoImage,
    /// Resize target with a zero dimension, or one too large for the surface.
    InvalidDimensions { width: u32, height: u32 },
    /// Crop rectangle has no area inside the surface.
    InvalidCrop,
    /// Font bytes could not be parsed.
    Font(String),
    /// A serialized snapshot could not be read back.
    Snapshot(String),
    /// Malformed settings text.
    Settings(String),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::Decode(e) => write!(f, "Decode error: {}", e),
            EditorError::Encode(e) => write!(f, "Encode error: {}", e),
            EditorError::NoImage => write!(f, "No image loaded"),
            EditorError::InvalidDimensions { width, height } => {
                write!(f, "Invalid dimensions: {}x{}", width, height)
            }
            EditorError::InvalidCrop => write!(f, "Crop rectangle is empty"),
            EditorError::Font(e) => write!(f, "Font error: {}", e),
            EditorError::Snapshot(e) => write!(f, "Snapshot error: {}", e),
            EditorError::Settings(e) => write!(f, "Settings error: {}", e),
        }
    }
}

impl std::error::Error for EditorError {}

/// Codec failures surface through decoding; encode paths map their own errors
/// to [`EditorError::Encode`].
impl From<image::ImageError> for EditorError {
    fn from(e: image::ImageError) -> Self {
        EditorError::Decode(e.to_string())
    }
}

impl From<Box<bincode::ErrorKind>> for EditorError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        EditorError::Snapshot(e.to_string())
    }
}

impl From<ab_glyph::InvalidFont> for EditorError {
    fn from(e: ab_glyph::InvalidFont) -> Self {
        EditorError::Font(e.to_string())
    }
}
