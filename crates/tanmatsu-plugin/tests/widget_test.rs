//! Integration tests for status widget packing.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tanmatsu_plugin::prelude::*;
use tanmatsu_plugin::{DrawOp, HeaderBounds, RecordingCanvas};

const HEADER: HeaderBounds = HeaderBounds {
    x: 0,
    y: 0,
    width: 200,
    height: 32,
};

fn fixed(width: u32, calls: &Arc<AtomicUsize>) -> Arc<dyn StatusWidget> {
    let calls = calls.clone();
    widget_fn(move |canvas, slot| {
        calls.fetch_add(1, Ordering::SeqCst);
        canvas.fill_rect(slot.region(width), Color::WHITE);
        width
    })
}

#[test]
fn test_widgets_pack_right_to_left() {
    let app = helpers::TestHost::new();
    app.host.admit("a").unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let a = app.host.register_widget("a", fixed(16, &calls)).unwrap();
    let b = app.host.register_widget("a", fixed(16, &calls)).unwrap();

    let mut canvas = RecordingCanvas::new();
    let report = app.host.render_header_in(&mut canvas, HEADER);

    let pa = report.placement(a).unwrap();
    let pb = report.placement(b).unwrap();
    assert_eq!((pa.x, pa.width), (184, 16));
    assert_eq!((pb.x, pb.width), (168, 16));
    assert_eq!(report.cursor, 168);

    assert_eq!(
        canvas.ops(),
        &[
            DrawOp::FillRect {
                rect: Rect::new(184, 0, 16, 32),
                color: Color::WHITE,
            },
            DrawOp::FillRect {
                rect: Rect::new(168, 0, 16, 32),
                color: Color::WHITE,
            },
        ]
    );
}

#[test]
fn test_zero_width_widget_is_still_invoked() {
    let app = helpers::TestHost::new();
    app.host.admit("a").unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let hidden = app.host.register_widget("a", fixed(0, &calls)).unwrap();
    let shown = app.host.register_widget("a", fixed(24, &calls)).unwrap();

    let mut canvas = RecordingCanvas::new();
    let report = app.host.render_header_in(&mut canvas, HEADER);

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(report.placement(hidden).unwrap().width, 0);
    assert_eq!(report.placement(shown).unwrap().x, 176);
}

#[test]
fn test_overflowing_widget_is_clamped() {
    let app = helpers::TestHost::new();
    app.host.admit("a").unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let wide = app.host.register_widget("a", fixed(150, &calls)).unwrap();
    let wider = app.host.register_widget("a", fixed(150, &calls)).unwrap();
    let last = app.host.register_widget("a", fixed(16, &calls)).unwrap();

    let mut canvas = RecordingCanvas::new();
    let report = app.host.render_header_in(&mut canvas, HEADER);

    assert_eq!(report.placement(wide).unwrap().x, 50);
    let clamped = report.placement(wider).unwrap();
    assert_eq!((clamped.x, clamped.width), (0, 50));
    assert_eq!(report.placement(last).unwrap().width, 0);
    assert_eq!(report.cursor, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_header_uses_configured_bounds() {
    let mut config = tanmatsu_core::config::HostConfig::default();
    config.display.header_x = 100;
    config.display.header_width = 300;
    let app = helpers::TestHost::with_config(config);
    app.host.admit("a").unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let id = app.host.register_widget("a", fixed(10, &calls)).unwrap();

    let mut canvas = RecordingCanvas::new();
    let report = app.host.render_header(&mut canvas);
    assert_eq!(report.placement(id).unwrap().x, 390);
}

#[test]
fn test_unregistered_widget_is_not_rendered() {
    let app = helpers::TestHost::new();
    app.host.admit("a").unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let id = app.host.register_widget("a", fixed(16, &calls)).unwrap();
    app.host.unregister_widget("a", id).unwrap();

    let mut canvas = RecordingCanvas::new();
    let report = app.host.render_header_in(&mut canvas, HEADER);
    assert!(report.placements.is_empty());
    assert_eq!(report.cursor, 200);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
