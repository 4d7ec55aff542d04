#![forbid(unsafe_code)]

//! `swipe-web` adapts `swipe-core` carousels to a browser host.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (JS) pushes pointer
//!   events, layout measurements, and time.
//! - **Command output**: surface effects become [`DomCommand`]s the host
//!   drains and applies; nothing here touches the DOM except the optional
//!   `wasm` facade.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.

pub mod css;
pub mod group;

#[cfg(feature = "input-parser")]
pub mod input_parser;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

use core::time::Duration;

use swipe_core::surface::ListenerScope;
use swipe_core::{GestureClock, Listener, SlideSurface, SurfaceEffect, SwipeDirection};

pub use group::{CarouselGroup, GroupDispatch, GroupError, HostEvent};

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time. Earlier values are ignored.
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Set current time from a DOM high-resolution timestamp in milliseconds.
    /// Negative and non-finite values are ignored.
    pub fn set_millis(&mut self, millis: f64) {
        if millis.is_finite() && millis >= 0.0 {
            self.set(Duration::from_secs_f64(millis / 1000.0));
        }
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

impl GestureClock for DeterministicClock {
    fn now_mono(&self) -> Duration {
        self.now
    }
}

/// Element a [`DomCommand`] applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomTarget {
    /// The clipping container around the track.
    Viewport,
    /// The translated element holding every slide.
    Track,
    /// Every direct child of the track.
    Slides,
    /// The document's window.
    Window,
}

/// One DOM mutation for the host to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomCommand {
    SetStyle {
        target: DomTarget,
        property: String,
        value: String,
    },
    AddClass {
        target: DomTarget,
        class: &'static str,
    },
    RemoveClass {
        target: DomTarget,
        class: &'static str,
    },
    AddListener {
        target: DomTarget,
        event: &'static str,
    },
    RemoveListener {
        target: DomTarget,
        event: &'static str,
    },
}

impl DomCommand {
    fn style(target: DomTarget, property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SetStyle {
            target,
            property: property.into(),
            value: value.into(),
        }
    }
}

/// [`SlideSurface`] over a DOM carousel, driven by host measurements.
///
/// Slides are identified by their element id. Effects are translated to
/// [`DomCommand`]s and queued until the host drains them.
#[derive(Debug, Clone, Default)]
pub struct WebSurface {
    viewport_width: f64,
    slide_ids: Vec<String>,
    swipe_class: Option<SwipeDirection>,
    commands: Vec<DomCommand>,
}

impl WebSurface {
    #[must_use]
    pub fn new(viewport_width: f64, slide_ids: Vec<String>) -> Self {
        Self {
            viewport_width,
            slide_ids,
            ..Self::default()
        }
    }

    /// Record a new viewport measurement (call before `resize`).
    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    /// Replace the slide list, in track order.
    pub fn set_slides(&mut self, slide_ids: Vec<String>) {
        self.slide_ids = slide_ids;
    }

    #[must_use]
    pub fn commands(&self) -> &[DomCommand] {
        &self.commands
    }

    /// Take every queued command.
    pub fn drain_commands(&mut self) -> Vec<DomCommand> {
        std::mem::take(&mut self.commands)
    }

    fn push_prefixed(&mut self, property: &str, value: &str) {
        for name in css::prefixed(property) {
            self.commands
                .push(DomCommand::style(DomTarget::Track, name, value));
        }
    }

    fn listener_target(listener: Listener) -> DomTarget {
        match listener.scope() {
            ListenerScope::Container => DomTarget::Track,
            ListenerScope::Window => DomTarget::Window,
        }
    }
}

impl SlideSurface for WebSurface {
    type SlideKey = str;

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn slide_count(&self) -> usize {
        self.slide_ids.len()
    }

    fn slide_index_of(&self, slide: &str) -> Option<usize> {
        self.slide_ids.iter().position(|id| id == slide)
    }

    fn apply(&mut self, effect: SurfaceEffect) {
        match effect {
            SurfaceEffect::PrepareStyles => {
                let rules = [
                    (DomTarget::Viewport, "min-width", "0"),
                    (DomTarget::Viewport, "overflow", "hidden"),
                    (DomTarget::Viewport, "display", "block"),
                    (DomTarget::Track, "display", "block"),
                    (DomTarget::Slides, "float", "left"),
                    (DomTarget::Slides, "display", "block"),
                ];
                self.commands.extend(
                    rules
                        .into_iter()
                        .map(|(target, property, value)| DomCommand::style(target, property, value)),
                );
            }
            SurfaceEffect::SizeTrack { width } => {
                self.commands
                    .push(DomCommand::style(DomTarget::Track, "width", css::px(width)));
            }
            SurfaceEffect::SizeSlides { width } => {
                self.commands
                    .push(DomCommand::style(DomTarget::Slides, "width", css::px(width)));
            }
            SurfaceEffect::Translate { offset } => {
                self.push_prefixed("transform", &css::translate3d(offset));
            }
            SurfaceEffect::Transition { duration, easing } => {
                if duration.is_zero() {
                    self.push_prefixed("transition-duration", &css::duration(duration));
                } else {
                    self.push_prefixed("transition", &css::transition(duration, &easing));
                }
            }
            SurfaceEffect::SwipeClass(direction) => {
                if let Some(previous) = self.swipe_class.take() {
                    self.commands.push(DomCommand::RemoveClass {
                        target: DomTarget::Track,
                        class: previous.class_name(),
                    });
                }
                if let Some(next) = direction {
                    self.commands.push(DomCommand::AddClass {
                        target: DomTarget::Track,
                        class: next.class_name(),
                    });
                }
                self.swipe_class = direction;
            }
            SurfaceEffect::Listen(listener) => self.commands.push(DomCommand::AddListener {
                target: Self::listener_target(listener),
                event: listener.dom_event(),
            }),
            SurfaceEffect::Unlisten(listener) => self.commands.push(DomCommand::RemoveListener {
                target: Self::listener_target(listener),
                event: listener.dom_event(),
            }),
        }
    }
}
