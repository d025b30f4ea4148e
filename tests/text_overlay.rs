//! Integration tests: committing text onto a session surface.
//!
//! Text is an ordinary undoable edit; text that would draw nothing records
//! nothing.

use editify::ops::text::load_font;
use editify::{EditorSession, EditorSettings, Snapshot, TextAlignment, TextStyle};
use image::Rgba;
use pretty_assertions::assert_eq;

const FONT_BYTES: &[u8] = include_bytes!("fixtures/DejaVuSansMono.ttf");

fn session() -> EditorSession {
    EditorSession::new(EditorSettings {
        viewport_width: 80,
        viewport_height: 60,
        ..EditorSettings::default()
    })
}

fn style(alignment: TextAlignment) -> TextStyle {
    TextStyle {
        size: 20.0,
        color: [255, 0, 0, 255],
        alignment,
        ..TextStyle::default()
    }
}

/// Coordinates of every pixel that is no longer transparent.
fn inked(session: &EditorSession) -> Vec<(u32, u32)> {
    session
        .surface()
        .pixels()
        .enumerate_pixels()
        .filter(|(_, _, p)| p[3] > 0)
        .map(|(x, y, _)| (x, y))
        .collect()
}

#[test]
fn text_is_drawn_inside_its_box() {
    let font = load_font(FONT_BYTES.to_vec()).unwrap();
    let mut session = session();
    assert!(session.add_text(&font, "Hi", 10.0, 10.0, &style(TextAlignment::Left)));

    let ink = inked(&session);
    assert!(!ink.is_empty());
    // Two monospace cells of 20px type: roughly 24px wide, 24px tall.
    assert!(ink.iter().all(|&(x, y)| (7..40).contains(&x) && (7..40).contains(&y)), "{ink:?}");
    assert!(session.surface().pixels().pixels().all(|p| p[3] == 0 || p.0[..3] == [255, 0, 0]));
}

#[test]
fn add_text_is_undoable() {
    let font = load_font(FONT_BYTES.to_vec()).unwrap();
    let mut session = session();
    let before = Snapshot::capture(session.surface());

    assert!(session.add_text(&font, "Hi", 10.0, 10.0, &style(TextAlignment::Left)));
    let after = Snapshot::capture(session.surface());
    assert_ne!(after, before);
    assert_eq!(session.history().undo_count(), 1);

    assert_eq!(session.undo().as_deref(), Some("Add Text"));
    assert_eq!(Snapshot::capture(session.surface()), before);
    assert_eq!(session.redo().as_deref(), Some("Add Text"));
    assert_eq!(Snapshot::capture(session.surface()), after);
}

#[test]
fn blank_and_off_surface_text_record_nothing() {
    let font = load_font(FONT_BYTES.to_vec()).unwrap();
    let mut session = session();
    let before = Snapshot::capture(session.surface());
    let st = style(TextAlignment::Left);

    assert!(!session.add_text(&font, "", 10.0, 10.0, &st));
    assert!(!session.add_text(&font, "   \n\t", 10.0, 10.0, &st));
    assert!(!session.add_text(&font, "Hi", 500.0, 10.0, &st));
    assert!(!session.add_text(&font, "Hi", 10.0, -500.0, &st));

    assert_eq!(session.history().undo_count(), 0);
    assert_eq!(Snapshot::capture(session.surface()), before);
}

#[test]
fn alignment_moves_text_relative_to_origin() {
    let font = load_font(FONT_BYTES.to_vec()).unwrap();
    let mean_x = |alignment| {
        let mut session = session();
        assert!(session.add_text(&font, "II", 40.0, 10.0, &style(alignment)));
        let ink = inked(&session);
        ink.iter().map(|&(x, _)| x as f32).sum::<f32>() / ink.len() as f32
    };
    let left = mean_x(TextAlignment::Left);
    let center = mean_x(TextAlignment::Center);
    let right = mean_x(TextAlignment::Right);
    assert!(left > 40.0 && center > 30.0 && center < 50.0 && right < 40.0, "{left} {center} {right}");
    assert!(left > center && center > right);
}

#[test]
fn default_style_uses_session_color() {
    let font = load_font(FONT_BYTES.to_vec()).unwrap();
    let mut session = EditorSession::new(EditorSettings {
        viewport_width: 80,
        viewport_height: 60,
        text_size: 24.0,
        text_color: [0, 0, 255, 255],
        ..EditorSettings::default()
    });
    let st = session.default_text_style();
    assert_eq!(st.size, 24.0);
    assert!(session.add_text(&font, "W", 5.0, 5.0, &st));
    assert!(session.surface().pixels().pixels().any(|p| p[2] == 255 && p[3] > 128));
    assert_eq!(session.surface().get_pixel(79, 59), Rgba([0, 0, 0, 0]));
}
