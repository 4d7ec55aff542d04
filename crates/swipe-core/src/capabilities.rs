#![forbid(unsafe_code)]

//! Host input capabilities and start-event selection.

use bitflags::bitflags;

use crate::surface::Listener;

bitflags! {
    /// Pointer input the host can deliver.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InputCapabilities: u8 {
        const TOUCH = 0b01;
        const MOUSE = 0b10;
    }
}

impl InputCapabilities {
    /// Build capabilities from what the host reports.
    ///
    /// `touch` is typically `"ontouchstart" in window` or
    /// `navigator.maxTouchPoints > 0`; `mouse` reflects a fine pointer.
    #[must_use]
    pub fn detect(touch: bool, mouse: bool) -> Self {
        let mut caps = Self::empty();
        caps.set(Self::TOUCH, touch);
        caps.set(Self::MOUSE, mouse);
        caps
    }

    /// Start listener to bind for these capabilities.
    ///
    /// Touch wins when available; mouse-down is used only when the carousel
    /// opts in. `None` means the carousel stays inert.
    #[must_use]
    pub fn start_listener(self, support_mouse: bool) -> Option<Listener> {
        if self.contains(Self::TOUCH) {
            Some(Listener::TouchStart)
        } else if support_mouse {
            Some(Listener::MouseDown)
        } else {
            None
        }
    }
}
