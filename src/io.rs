use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};
use std::sync::mpsc;
use std::time::Duration;

use crate::error::EditorError;

/// Decode any raster format the `image` crate is built with into RGBA8.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, EditorError> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    if img.width() == 0 || img.height() == 0 {
        return Err(EditorError::Decode(format!(
            "image has zero dimension ({}x{})",
            img.width(),
            img.height()
        )));
    }
    Ok(img)
}

/// Encode an image as lossless RGBA8 PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, EditorError> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)
        .map_err(|e| EditorError::Encode(e.to_string()))?;
    Ok(out)
}

// ============================================================================
// BACKGROUND LOADING
// ============================================================================

/// Identifies one load request. Only the ticket with the newest generation
/// issued by a session may replace its surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub(crate) fn new(generation: u64) -> Self {
        Self { generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A finished decode delivered back to the owning thread.
#[derive(Debug)]
pub struct LoadResult {
    pub ticket: LoadTicket,
    pub result: Result<RgbaImage, EditorError>,
}

/// Decodes uploads on the rayon pool and hands results back over a channel,
/// so the session itself is only ever touched by its owning thread.
pub struct ImageLoader {
    sender: mpsc::Sender<LoadResult>,
    receiver: mpsc::Receiver<LoadResult>,
    pending: usize,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver, pending: 0 }
    }

    /// Start decoding `bytes` in the background.
    pub fn spawn(&mut self, ticket: LoadTicket, bytes: Vec<u8>) {
        let sender = self.sender.clone();
        self.pending += 1;
        rayon::spawn(move || {
            let result = decode_image(&bytes);
            let _ = sender.send(LoadResult { ticket, result });
        });
    }

    /// Number of decodes started but not yet collected.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Drain every finished decode without blocking.
    pub fn try_results(&mut self) -> Vec<LoadResult> {
        let mut out = Vec::new();
        while let Ok(result) = self.receiver.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            out.push(result);
        }
        out
    }

    /// Block until one decode finishes or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadResult> {
        let result = self.receiver.recv_timeout(timeout).ok()?;
        self.pending = self.pending.saturating_sub(1);
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use pretty_assertions::assert_eq;

    #[test]
    fn png_export_decodes_back_identically() {
        let img = RgbaImage::from_fn(7, 5, |x, y| Rgba([x as u8 * 30, y as u8 * 50, 7, (x * y) as u8 * 6]));
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert_eq!(decode_image(&bytes).unwrap(), img);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(decode_image(b"definitely not an image"), Err(EditorError::Decode(_))));
        assert!(matches!(decode_image(&[]), Err(EditorError::Decode(_))));
    }

    #[test]
    fn background_decode_reports_its_ticket() {
        let img = RgbaImage::from_pixel(3, 3, Rgba([9, 8, 7, 255]));
        let bytes = encode_png(&img).unwrap();
        let mut loader = ImageLoader::new();
        loader.spawn(LoadTicket::new(4), bytes);
        loader.spawn(LoadTicket::new(5), b"junk".to_vec());
        assert_eq!(loader.pending(), 2);

        let mut results: Vec<LoadResult> = (0..2)
            .map(|_| loader.wait(Duration::from_secs(10)).expect("decode timed out"))
            .collect();
        results.sort_by_key(|r| r.ticket);
        assert_eq!(loader.pending(), 0);
        assert_eq!(results[0].ticket.generation(), 4);
        assert_eq!(results[0].result.as_ref().unwrap(), &img);
        assert!(matches!(results[1].result, Err(EditorError::Decode(_))));
        assert!(loader.try_results().is_empty());
    }
}
