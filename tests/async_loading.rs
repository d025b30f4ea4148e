//! Integration tests: load generations.
//!
//! A decode that finishes after a newer upload was issued must never overwrite
//! the newer image.

use std::time::Duration;

use editify::io::{decode_image, encode_png};
use editify::{EditorError, EditorSession, EditorSettings, ImageLoader, LoadOutcome, Snapshot};
use image::{Rgba, RgbaImage};
use pretty_assertions::assert_eq;

fn settings() -> EditorSettings {
    EditorSettings {
        viewport_width: 32,
        viewport_height: 32,
        ..EditorSettings::default()
    }
}

fn solid_png(color: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(16, 16, Rgba(color))).unwrap()
}

#[test]
fn stale_completion_is_discarded() {
    let mut session = EditorSession::new(settings());
    let first = session.begin_load();
    let second = session.begin_load();

    let newer = session.finish_load(second, decode_image(&solid_png([0, 0, 255, 255])));
    assert!(matches!(newer, LoadOutcome::Applied(_)));
    let after_newer = Snapshot::capture(session.surface());

    let older = session.finish_load(first, decode_image(&solid_png([255, 0, 0, 255])));
    assert_eq!(older, LoadOutcome::Stale);
    assert_eq!(Snapshot::capture(session.surface()), after_newer);
    assert_eq!(session.surface().get_pixel(16, 16), Rgba([0, 0, 255, 255]));
    assert_eq!(session.history().undo_count(), 1);
}

#[test]
fn stale_completion_before_newer_one_is_also_discarded() {
    let mut session = EditorSession::new(settings());
    let first = session.begin_load();
    let second = session.begin_load();

    assert_eq!(
        session.finish_load(first, decode_image(&solid_png([255, 0, 0, 255]))),
        LoadOutcome::Stale
    );
    assert!(!session.can_undo());
    assert!(matches!(
        session.finish_load(second, decode_image(&solid_png([0, 255, 0, 255]))),
        LoadOutcome::Applied(_)
    ));
    assert_eq!(session.surface().get_pixel(0, 0), Rgba([0, 255, 0, 255]));
}

#[test]
fn rejected_current_load_keeps_prior_image() {
    let mut session = EditorSession::new(settings());
    session.load_image(&solid_png([9, 9, 9, 255])).unwrap();
    let before = Snapshot::capture(session.surface());

    let ticket = session.begin_load();
    let outcome = session.finish_load(ticket, decode_image(b"broken"));
    assert!(matches!(outcome, LoadOutcome::Rejected(EditorError::Decode(_))));
    assert_eq!(Snapshot::capture(session.surface()), before);
    assert_eq!(session.history().undo_count(), 1);
}

#[test]
fn background_loader_applies_only_the_latest_upload() {
    let mut session = EditorSession::new(settings());
    let mut loader = ImageLoader::new();

    session.load_image_async(&mut loader, solid_png([255, 0, 0, 255]));
    session.load_image_async(&mut loader, solid_png([0, 255, 0, 255]));
    let latest = session.load_image_async(&mut loader, solid_png([0, 0, 255, 255]));
    assert_eq!(latest.generation(), 3);

    let mut outcomes = Vec::new();
    while loader.pending() > 0 {
        let result = loader.wait(Duration::from_secs(10)).expect("decode timed out");
        outcomes.push(session.finish_load(result.ticket, result.result));
    }

    assert_eq!(outcomes.iter().filter(|o| matches!(o, LoadOutcome::Applied(_))).count(), 1);
    assert_eq!(outcomes.iter().filter(|o| **o == LoadOutcome::Stale).count(), 2);
    assert_eq!(session.surface().get_pixel(16, 16), Rgba([0, 0, 255, 255]));
    assert_eq!(session.history().undo_count(), 1);
}

#[test]
fn poll_loader_drains_finished_decodes() {
    let mut session = EditorSession::new(settings());
    let mut loader = ImageLoader::new();
    session.load_image_async(&mut loader, solid_png([1, 2, 3, 255]));

    let mut outcomes = Vec::new();
    for _ in 0..1000 {
        outcomes.extend(session.poll_loader(&mut loader));
        if !outcomes.is_empty() {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0], LoadOutcome::Applied(_)));
    assert_eq!(loader.pending(), 0);
}
