#![forbid(unsafe_code)]

//! The boundary between a carousel and its host document.
//!
//! A [`SlideSurface`] is two things at once:
//! - a **layout oracle** the carousel queries (viewport width, slide count,
//!   slide identity), and
//! - a **visual sink** the carousel writes [`SurfaceEffect`]s to (track
//!   translation, transition timing, sizing, class toggles, and listener
//!   subscriptions).
//!
//! The carousel never inspects what a surface does with an effect. A web host
//! turns them into DOM style writes; tests record them.

use std::time::Duration;

use crate::config::Easing;

/// Host event the carousel subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Listener {
    TouchStart,
    MouseDown,
    Resize,
    OrientationChange,
    TouchMove,
    TouchEnd,
    MouseMove,
    MouseUp,
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerScope {
    /// The carousel's track element.
    Container,
    /// The document's window.
    Window,
}

impl Listener {
    /// Element the listener belongs on.
    #[must_use]
    pub const fn scope(self) -> ListenerScope {
        match self {
            Self::TouchStart | Self::MouseDown => ListenerScope::Container,
            Self::Resize
            | Self::OrientationChange
            | Self::TouchMove
            | Self::TouchEnd
            | Self::MouseMove
            | Self::MouseUp => ListenerScope::Window,
        }
    }

    /// DOM event type name.
    #[must_use]
    pub const fn dom_event(self) -> &'static str {
        match self {
            Self::TouchStart => "touchstart",
            Self::MouseDown => "mousedown",
            Self::Resize => "resize",
            Self::OrientationChange => "orientationchange",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
            Self::MouseMove => "mousemove",
            Self::MouseUp => "mouseup",
        }
    }
}

/// Direction of the transient "swiping" class on the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    /// Pointer moving right-to-left (towards the next slide).
    Left,
    /// Pointer moving left-to-right (towards the previous slide).
    Right,
}

impl SwipeDirection {
    /// Direction implied by a horizontal pointer delta, if any.
    #[must_use]
    pub fn from_delta(dx: f64) -> Option<Self> {
        if dx < 0.0 {
            Some(Self::Left)
        } else if dx > 0.0 {
            Some(Self::Right)
        } else {
            None
        }
    }

    /// Class name toggled on the track.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Left => "swiping-left",
            Self::Right => "swiping-right",
        }
    }
}

/// One side effect written to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEffect {
    /// Apply the base viewport/track/slide styles (clip, block, float).
    PrepareStyles,
    /// Size the track to hold every slide side by side.
    SizeTrack { width: f64 },
    /// Size each slide to the viewport.
    SizeSlides { width: f64 },
    /// Horizontal track offset in pixels.
    Translate { offset: f64 },
    /// Transition applied to subsequent translations. A zero duration makes
    /// the next translation instantaneous.
    Transition { duration: Duration, easing: Easing },
    /// Replace the "swiping" class; `None` removes it.
    SwipeClass(Option<SwipeDirection>),
    Listen(Listener),
    Unlisten(Listener),
}

/// Layout oracle and visual sink for one carousel.
pub trait SlideSurface {
    /// Identity of a slide element, used by `goto_element`.
    type SlideKey: ?Sized;

    /// Width of the clipping viewport in pixels.
    fn viewport_width(&self) -> f64;

    /// Number of slides in the track.
    fn slide_count(&self) -> usize;

    /// Position of `slide` within the track, if it belongs to it.
    fn slide_index_of(&self, slide: &Self::SlideKey) -> Option<usize>;

    /// Write one effect.
    fn apply(&mut self, effect: SurfaceEffect);
}

/// In-memory surface with a fixed layout that records every effect.
///
/// Used by hosts that replay effects later and by tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    slides: Vec<u32>,
    effects: Vec<SurfaceEffect>,
}

impl RecordingSurface {
    /// Surface of `count` slides keyed `0..count`.
    #[must_use]
    pub fn new(width: f64, count: usize) -> Self {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        Self::with_slides(width, (0..count).collect())
    }

    /// Surface with explicit slide keys, in track order.
    #[must_use]
    pub fn with_slides(width: f64, slides: Vec<u32>) -> Self {
        Self {
            width,
            slides,
            effects: Vec::new(),
        }
    }

    /// Change the reported viewport width (simulates a resize).
    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    /// Every effect recorded so far.
    #[must_use]
    pub fn effects(&self) -> &[SurfaceEffect] {
        &self.effects
    }

    /// Take the recorded effects.
    pub fn drain(&mut self) -> Vec<SurfaceEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Last translation written, if any.
    #[must_use]
    pub fn last_offset(&self) -> Option<f64> {
        self.effects.iter().rev().find_map(|effect| match effect {
            SurfaceEffect::Translate { offset } => Some(*offset),
            _ => None,
        })
    }

    /// Listeners currently subscribed, in subscription order.
    #[must_use]
    pub fn active_listeners(&self) -> Vec<Listener> {
        let mut active: Vec<Listener> = Vec::new();
        for effect in &self.effects {
            match effect {
                SurfaceEffect::Listen(listener) => {
                    if !active.contains(listener) {
                        active.push(*listener);
                    }
                }
                SurfaceEffect::Unlisten(listener) => active.retain(|l| l != listener),
                _ => {}
            }
        }
        active
    }
}

impl SlideSurface for RecordingSurface {
    type SlideKey = u32;

    fn viewport_width(&self) -> f64 {
        self.width
    }

    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn slide_index_of(&self, slide: &u32) -> Option<usize> {
        self.slides.iter().position(|key| key == slide)
    }

    fn apply(&mut self, effect: SurfaceEffect) {
        self.effects.push(effect);
    }
}
