#![forbid(unsafe_code)]

//! Release math: where a track goes when the pointer lets go.
//!
//! Offsets follow the track's translation convention: slide `i` is fully in
//! view when the track is translated by `-i * width`, so offsets are `<= 0`
//! at rest and decrease as the index grows.
//!
//! # Release pipeline
//!
//! 1. **Flick adjustment**: the faster the drag, the further the target is
//!    pushed in the drag direction (see [`velocity_adjustment`]).
//! 2. **Snap**: pick the slide boundary closest to the target, lowest index
//!    on ties ([`closest_slide`]).
//! 3. **One-step clamp**: optionally never move more than one slide.
//! 4. **Edge abort**: a drag past the first/last slide returns to the
//!    committed index.
//!
//! Everything here is pure; [`GestureCarousel`](crate::carousel::GestureCarousel)
//! feeds it and applies the result.

use std::time::Duration;

use crate::config::{CarouselConfig, EdgeResistance};

/// Track offset at which slide `index` is in view.
#[inline]
#[must_use]
pub fn slide_offset(index: usize, width: f64) -> f64 {
    -(index as f64) * width
}

/// Slide whose boundary equals `offset` exactly.
///
/// No nearest-match: any offset between boundaries yields `None`.
#[must_use]
pub fn index_at_offset(offset: f64, width: f64, count: usize) -> Option<usize> {
    if width <= 0.0 || !offset.is_finite() {
        return None;
    }
    let candidate = (-offset / width).round();
    if candidate < 0.0 || candidate >= count as f64 {
        return None;
    }
    let index = candidate as usize;
    (slide_offset(index, width) == offset).then_some(index)
}

/// Flick adjustment added to the release offset.
///
/// `round(strength * (|start| - |current|) / (elapsed_ms * scale))`, where
/// `elapsed_ms` is whole milliseconds. Sub-millisecond gestures get no
/// adjustment.
#[must_use]
pub fn velocity_adjustment(
    start: f64,
    current: f64,
    elapsed: Duration,
    strength: f64,
    scale: f64,
) -> f64 {
    let elapsed_ms = elapsed.as_millis() as f64;
    let divisor = elapsed_ms * scale;
    if divisor <= 0.0 || !divisor.is_finite() {
        return 0.0;
    }
    let adjustment = (strength * (start.abs() - current.abs()) / divisor).round();
    if adjustment.is_finite() { adjustment } else { 0.0 }
}

/// Slide whose boundary is closest to `target`. Ties resolve to the lowest
/// index. `None` when there are no slides.
#[must_use]
pub fn closest_slide(target: f64, width: f64, count: usize) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for index in 0..count {
        let distance = (slide_offset(index, width) - target).abs();
        match best {
            Some((_, min)) if distance >= min => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

/// Edge a drag is pushing against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Dragging right while the first slide is in view.
    Start,
    /// Dragging left while the last slide is in view.
    End,
}

/// Edge `dx` pushes against from `index`, if any.
#[must_use]
pub fn edge_for_drag(index: usize, count: usize, dx: f64) -> Option<Edge> {
    if index == 0 && dx > 0.0 {
        Some(Edge::Start)
    } else if index.saturating_add(1) >= count && dx < 0.0 {
        Some(Edge::End)
    } else {
        None
    }
}

/// Visible displacement for a drag of `dx` past an edge.
///
/// The damped curve `factor * dx / (1 + |dx| / width)` never exceeds
/// `factor * width` in magnitude.
#[must_use]
pub fn damped_edge_offset(dx: f64, width: f64, resistance: EdgeResistance) -> f64 {
    match resistance {
        EdgeResistance::Rigid => 0.0,
        EdgeResistance::Damped { factor } => {
            if width <= 0.0 {
                return 0.0;
            }
            factor * dx / (1.0 + dx.abs() / width)
        }
    }
}

/// Inputs of one release decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Release {
    /// Committed index when the gesture began.
    pub index: usize,
    pub count: usize,
    pub width: f64,
    /// Committed offset when the gesture began.
    pub start: f64,
    /// Offset under the pointer at release.
    pub current: f64,
    /// Horizontal pointer travel.
    pub dx: f64,
    pub elapsed: Duration,
}

/// Where the track settles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Destination {
    /// A slide boundary.
    Slide(usize),
    /// An arbitrary in-range offset (snapping disabled).
    Free(f64),
}

/// Result of [`resolve_release`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseDecision {
    pub adjustment: f64,
    /// `current + adjustment`, before snapping.
    pub target: f64,
    pub destination: Destination,
    /// The one-step clamp changed the snapped slide.
    pub clamped: bool,
    /// The drag pushed past an edge and was sent back.
    pub edge_abort: bool,
}

/// Decide where a released drag settles.
#[must_use]
pub fn resolve_release(release: &Release, config: &CarouselConfig) -> ReleaseDecision {
    let adjustment = velocity_adjustment(
        release.start,
        release.current,
        release.elapsed,
        config.slide_strength,
        config.velocity_scale,
    );
    let target = release.current + adjustment;
    let mut decision = ReleaseDecision {
        adjustment,
        target,
        destination: Destination::Slide(release.index),
        clamped: false,
        edge_abort: false,
    };

    if release.count == 0 {
        return decision;
    }

    if edge_for_drag(release.index, release.count, release.dx).is_some() {
        decision.edge_abort = true;
        return decision;
    }

    if !config.snap {
        let min = slide_offset(release.count - 1, release.width);
        if target > 0.0 || target < min {
            decision.edge_abort = true;
        } else {
            decision.destination = Destination::Free(target);
        }
        return decision;
    }

    let Some(mut closest) = closest_slide(target, release.width, release.count) else {
        return decision;
    };
    if config.only_one_slide_per_gesture && closest.abs_diff(release.index) > 1 {
        let forward = if release.dx != 0.0 {
            release.dx < 0.0
        } else {
            closest > release.index
        };
        closest = if forward {
            (release.index + 1).min(release.count - 1)
        } else {
            release.index.saturating_sub(1)
        };
        decision.clamped = true;
    }
    decision.destination = Destination::Slide(closest);
    decision
}
