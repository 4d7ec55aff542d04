#![forbid(unsafe_code)]

//! Core: swipeable, snapping carousels driven by host pointer events.
//!
//! # Role in swipe-carousel
//! `swipe-core` is the platform-independent half. It owns the gesture state
//! machine, the release/snap math, and the coordination that keeps nested
//! carousels from fighting over one drag. It never touches a DOM: a host
//! implements [`surface::SlideSurface`] and forwards pointer events.
//!
//! # Primary responsibilities
//! - **GestureCarousel**: start/move/end handling, navigation, resize, unload.
//! - **DragCoordinator**: one active drag per document, released on drop.
//! - **Snap math**: flick adjustment, closest-slide snap, one-step clamp.
//! - **SwipeCompletion**: awaitable end-of-transition handles.
//!
//! # How it fits in the system
//! `swipe-web` wraps this crate with a DOM-command surface, vendor-prefixed
//! CSS, a multi-carousel event router, and a `wasm-bindgen` facade.

pub mod capabilities;
pub mod carousel;
pub mod clock;
pub mod completion;
pub mod config;
pub mod coordinator;
pub mod gesture;
pub mod input;
pub mod logging;
pub mod snap;
pub mod surface;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, warn};

pub use capabilities::InputCapabilities;
pub use carousel::{
    CarouselBuilder, CarouselError, CarouselHandle, CarouselSnapshot, GestureCarousel,
    GestureDispatch, GestureLogEntry, GestureOutcome, GesturePhase, IgnoredReason, ParentLink,
};
pub use clock::{GestureClock, MonotonicClock};
pub use completion::{CompletionOutcome, SwipeCompletion};
pub use config::{CarouselConfig, ConfigError, Easing, EdgeResistance};
pub use coordinator::{CarouselId, DragCoordinator, DragToken};
pub use gesture::CancelReason;
pub use input::{PointerSample, PointerSource};
pub use surface::{Listener, RecordingSurface, SlideSurface, SurfaceEffect, SwipeDirection};
