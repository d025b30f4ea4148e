//! Editify: raster image editing core.
//!
//! A session owns one fixed-size RGBA surface plus a linear undo/redo history
//! of full-surface snapshots. Hosts decode uploads (optionally off-thread),
//! apply filters and geometry edits, and export PNG bytes; rendering and
//! input handling stay on the host side.

#[macro_use]
pub mod logger;

pub mod canvas;
pub mod components;
pub mod error;
pub mod io;
pub mod ops;
pub mod session;
pub mod settings;

pub use canvas::{Frame, Snapshot, Surface};
pub use components::history::HistoryStack;
pub use error::EditorError;
pub use io::{ImageLoader, LoadResult, LoadTicket};
pub use ops::placement::{Placement, fit};
pub use ops::text::{TextAlignment, TextStyle};
pub use session::{EditorSession, LoadOutcome};
pub use settings::EditorSettings;
