#![cfg(feature = "tracing")]
#![forbid(unsafe_code)]

//! Log levels emitted by the carousel when the `tracing` feature is on.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use swipe_core::{
    CarouselConfig, DragCoordinator, GestureCarousel, InputCapabilities, PointerSample,
    PointerSource, RecordingSurface,
};
use tracing_subscriber::layer::SubscriberExt;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
}

#[derive(Default)]
struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

struct EventCapture(Arc<Mutex<Vec<CapturedEvent>>>);

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

fn with_captured_events<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(EventCapture(Arc::clone(&events)));
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn carousel(count: usize) -> GestureCarousel<RecordingSurface> {
    GestureCarousel::new(
        RecordingSurface::new(300.0, count),
        CarouselConfig::default(),
        &DragCoordinator::new(),
        InputCapabilities::TOUCH,
    )
    .expect("valid config")
}

#[test]
fn clamped_navigation_warns() {
    let events = with_captured_events(|| {
        let mut carousel = carousel(3);
        carousel.goto_index(9, false);
    });
    assert!(
        events
            .iter()
            .any(|e| e.level == tracing::Level::WARN && e.message.contains("out of range"))
    );
}

#[test]
fn cancelled_gesture_logs_at_debug() {
    let events = with_captured_events(|| {
        let mut carousel = carousel(3);
        carousel.gesture_start(
            PointerSource::Touch,
            PointerSample::new(10.0, 10.0),
            Duration::ZERO,
        );
        carousel.gesture_move(PointerSample::new(11.0, 40.0), Duration::from_millis(16));
    });
    assert!(
        events
            .iter()
            .any(|e| e.level == tracing::Level::DEBUG && e.message.contains("cancelled"))
    );
}

#[test]
fn moves_log_at_trace() {
    let events = with_captured_events(|| {
        let mut carousel = carousel(3);
        carousel.gesture_start(
            PointerSource::Touch,
            PointerSample::new(100.0, 10.0),
            Duration::ZERO,
        );
        carousel.gesture_move(PointerSample::new(60.0, 10.0), Duration::from_millis(16));
    });
    assert!(events.iter().any(|e| e.level == tracing::Level::TRACE));
}

#[test]
fn programmatic_move_mid_drag_logs_the_cancel() {
    let events = with_captured_events(|| {
        let mut carousel = carousel(3);
        carousel.gesture_start(
            PointerSource::Touch,
            PointerSample::new(100.0, 10.0),
            Duration::ZERO,
        );
        carousel.gesture_move(PointerSample::new(60.0, 10.0), Duration::from_millis(16));
        carousel.goto_index(2, true);
    });
    assert!(
        events
            .iter()
            .any(|e| e.level == tracing::Level::DEBUG && e.message.contains("gesture cancelled"))
    );
}
