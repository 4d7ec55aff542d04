#![forbid(unsafe_code)]

//! Normalized pointer input delivered by the host.

use crate::surface::Listener;

/// Device family of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PointerSource {
    Touch,
    Mouse,
}

impl PointerSource {
    /// Window listeners that carry the rest of a gesture from this source.
    #[must_use]
    pub const fn gesture_listeners(self) -> [Listener; 2] {
        match self {
            Self::Touch => [Listener::TouchMove, Listener::TouchEnd],
            Self::Mouse => [Listener::MouseMove, Listener::MouseUp],
        }
    }
}

/// One pointer reading in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    /// Fingers on the surface. Always `1` for mouse input.
    pub touches: u8,
}

impl PointerSample {
    /// Single-pointer sample.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, touches: 1 }
    }

    /// Sample with an explicit finger count.
    #[must_use]
    pub const fn with_touches(mut self, touches: u8) -> Self {
        self.touches = touches;
        self
    }

    #[must_use]
    pub const fn is_multi_touch(&self) -> bool {
        self.touches > 1
    }
}
