use ab_glyph::FontArc;
use image::RgbaImage;
use uuid::Uuid;

use crate::canvas::{Frame, Surface};
use crate::components::history::HistoryStack;
use crate::error::EditorError;
use crate::io::{self, ImageLoader, LoadTicket};
use crate::ops::text::{self, TextAlignment, TextStyle};
use crate::ops::{color_removal, filters, transform};
use crate::settings::EditorSettings;

/// What happened to a finished load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The image replaced the surface content.
    Applied(Frame),
    /// A newer load was issued after this one; the result was dropped.
    Stale,
    /// The bytes did not decode; the surface was left untouched.
    Rejected(EditorError),
}

/// A single editing session: one fixed-size surface and its history.
///
/// Every mutating operation snapshots the surface first, so `undo` right
/// after it returns to the pre-mutation state.
pub struct EditorSession {
    pub id: Uuid,
    settings: EditorSettings,
    surface: Surface,
    history: HistoryStack,
    /// Generation of the most recently issued load.
    load_generation: u64,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl EditorSession {
    pub fn new(settings: EditorSettings) -> Self {
        let surface = Surface::new(settings.viewport_width, settings.viewport_height);
        let history = HistoryStack::new(settings.max_undo_steps).with_memory_limit(settings.max_history_bytes());
        let id = Uuid::new_v4();
        crate::log_info!(
            "Session {}: {}x{} surface, {} undo steps",
            id,
            surface.width(),
            surface.height(),
            settings.max_undo_steps
        );
        Self { id, settings, surface, history, load_generation: 0 }
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    // ------------------------------------------------------------------
    //  Loading
    // ------------------------------------------------------------------

    /// Issue a ticket for a new load. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        LoadTicket::new(self.load_generation)
    }

    /// Apply a finished decode if `ticket` is still the newest one.
    pub fn finish_load(&mut self, ticket: LoadTicket, decoded: Result<RgbaImage, EditorError>) -> LoadOutcome {
        if ticket.generation() != self.load_generation {
            crate::log_info!(
                "Load #{} discarded: superseded by #{}",
                ticket.generation(),
                self.load_generation
            );
            return LoadOutcome::Stale;
        }
        let image = match decoded {
            Ok(image) if image.width() > 0 && image.height() > 0 => image,
            Ok(image) => {
                let err = EditorError::Decode(format!("image has zero dimension ({}x{})", image.width(), image.height()));
                crate::log_warn!("Load #{} rejected: {}", ticket.generation(), err);
                return LoadOutcome::Rejected(err);
            }
            Err(e) => {
                crate::log_warn!("Load #{} rejected: {}", ticket.generation(), e);
                return LoadOutcome::Rejected(e);
            }
        };
        self.history.snapshot(&self.surface, "Open Image");
        match transform::place_fitted(&mut self.surface, &image, self.settings.interpolation) {
            Some(frame) => {
                crate::log_info!(
                    "Load #{}: {}x{} placed at {:?}",
                    ticket.generation(),
                    image.width(),
                    image.height(),
                    frame
                );
                LoadOutcome::Applied(frame)
            }
            // Both the surface and the image are non-empty, so a fit always exists.
            None => unreachable!("non-empty image always fits a non-empty surface"),
        }
    }

    /// Decode `bytes` synchronously and place the image.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<Frame, EditorError> {
        let ticket = self.begin_load();
        match self.finish_load(ticket, io::decode_image(bytes)) {
            LoadOutcome::Applied(frame) => Ok(frame),
            LoadOutcome::Rejected(e) => Err(e),
            // Nothing can issue a newer ticket between the two calls above.
            LoadOutcome::Stale => Err(EditorError::Decode("load superseded".to_string())),
        }
    }

    /// Start a background decode. The result is applied by [`Self::poll_loader`].
    pub fn load_image_async(&mut self, loader: &mut ImageLoader, bytes: Vec<u8>) -> LoadTicket {
        let ticket = self.begin_load();
        loader.spawn(ticket, bytes);
        ticket
    }

    /// Apply every finished background decode, in arrival order.
    pub fn poll_loader(&mut self, loader: &mut ImageLoader) -> Vec<LoadOutcome> {
        loader
            .try_results()
            .into_iter()
            .map(|r| self.finish_load(r.ticket, r.result))
            .collect()
    }

    // ------------------------------------------------------------------
    //  Mutations
    // ------------------------------------------------------------------

    /// Record the current surface as an undo step.
    pub fn snapshot(&mut self, description: &str) {
        self.history.snapshot(&self.surface, description);
    }

    pub fn apply_grayscale(&mut self) {
        self.history.snapshot(&self.surface, "Grayscale");
        filters::grayscale(self.surface.pixels_mut());
        crate::log_info!("Grayscale applied");
    }

    /// Chroma-key the corner color away. Returns how many pixels were cleared.
    pub fn remove_background(&mut self) -> usize {
        self.history.snapshot(&self.surface, "Remove Background");
        let cleared = color_removal::remove_background(self.surface.pixels_mut(), self.settings.chroma_threshold);
        crate::log_info!("Remove Background: {} pixels cleared", cleared);
        cleared
    }

    /// Resample the placed image to `width × height`, each side at most
    /// [`transform::MAX_RESIZE_FACTOR`] times the surface.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<Frame, EditorError> {
        transform::check_resize_target(&self.surface, width, height)?;
        if self.surface.frame().is_none() {
            return Err(EditorError::NoImage);
        }
        self.history.snapshot(&self.surface, &format!("Resize {}x{}", width, height));
        let frame = transform::resize_image(&mut self.surface, width, height, self.settings.interpolation)?;
        crate::log_info!("Resize to {}x{}: visible {:?}", width, height, frame);
        Ok(frame)
    }

    pub fn crop(&mut self, rect: Frame) -> Result<Frame, EditorError> {
        if self.surface.frame().is_none() {
            return Err(EditorError::NoImage);
        }
        if rect.clamp_to(self.surface.width(), self.surface.height()).is_none() {
            return Err(EditorError::InvalidCrop);
        }
        self.history.snapshot(&self.surface, "Crop");
        let frame = transform::crop_to_rect(&mut self.surface, rect, self.settings.interpolation)?;
        crate::log_info!("Crop {:?}: placed at {:?}", rect, frame);
        Ok(frame)
    }

    /// Text style from the session settings.
    pub fn default_text_style(&self) -> TextStyle {
        TextStyle {
            size: self.settings.text_size,
            color: self.settings.text_color,
            alignment: TextAlignment::Left,
            ..TextStyle::default()
        }
    }

    /// Draw `content` with its first line's top-left at `(x, y)`.
    /// Blank text is a no-op and records nothing. Returns whether anything
    /// was committed.
    pub fn add_text(&mut self, font: &FontArc, content: &str, x: f32, y: f32, style: &TextStyle) -> bool {
        if content.trim().is_empty() {
            return false;
        }
        let rendered = text::rasterize_text(font, content, style, x, y, self.surface.width(), self.surface.height());
        if rendered.is_empty() {
            crate::log_info!("Text at ({}, {}) falls outside the surface", x, y);
            return false;
        }
        self.history.snapshot(&self.surface, "Add Text");
        text::blend_rasterized(self.surface.pixels_mut(), &rendered);
        crate::log_info!("Text committed: {} chars at ({}, {})", content.chars().count(), x, y);
        true
    }

    // ------------------------------------------------------------------
    //  History
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> Option<String> {
        let desc = self.history.undo(&mut self.surface);
        if let Some(d) = &desc {
            crate::log_info!("Undo: {}", d);
        }
        desc
    }

    pub fn redo(&mut self) -> Option<String> {
        let desc = self.history.redo(&mut self.surface);
        if let Some(d) = &desc {
            crate::log_info!("Redo: {}", d);
        }
        desc
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ------------------------------------------------------------------
    //  Export
    // ------------------------------------------------------------------

    pub fn export_png(&self) -> Result<Vec<u8>, EditorError> {
        let bytes = io::encode_png(self.surface.pixels())?;
        crate::log_info!("Exported PNG: {} bytes", bytes.len());
        Ok(bytes)
    }
}
