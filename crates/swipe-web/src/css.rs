#![forbid(unsafe_code)]

//! CSS declaration rendering for track movement.
//!
//! Older mobile engines only honor the vendor-prefixed `transform` and
//! `transition` properties, so every declaration is emitted once per prefix
//! in [`VENDOR_PREFIXES`] and once unprefixed.

use std::time::Duration;

use swipe_core::Easing;

/// Prefixes emitted ahead of the unprefixed property.
pub const VENDOR_PREFIXES: [&str; 4] = ["-webkit-", "-moz-", "-o-", "-ms-"];

/// `property` with every vendor prefix, followed by the bare name.
pub fn prefixed(property: &str) -> impl Iterator<Item = String> + '_ {
    VENDOR_PREFIXES
        .iter()
        .map(move |prefix| format!("{prefix}{property}"))
        .chain(std::iter::once(property.to_string()))
}

/// Pixel length. Negative zero renders as `0px`.
#[must_use]
pub fn px(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value}px")
}

/// `transform` value for a horizontal track offset.
#[must_use]
pub fn translate3d(offset: f64) -> String {
    format!("translate3d({}, 0, 0)", px(offset))
}

/// `transition-duration` value.
#[must_use]
pub fn duration(duration: Duration) -> String {
    format!("{}ms", duration.as_millis())
}

/// `transition` shorthand for a committed move.
#[must_use]
pub fn transition(duration: Duration, easing: &Easing) -> String {
    format!("all {}ms {}", duration.as_millis(), easing.css())
}
