#![forbid(unsafe_code)]

//! Drag sessions: from raw pointer samples to horizontal travel.
//!
//! A [`DragSession`] lives from gesture start to gesture end (or cancel). It
//! owns the [`DragToken`] that keeps every other carousel on the document out
//! of the gesture, so dropping the session is what releases the drag.
//!
//! # Axis lock
//!
//! The first move decides whether the gesture belongs to the carousel:
//!
//! - `|dy| > 1` while `|dx| < 5`: the user is scrolling the page. The session
//!   is cancelled and the document keeps the gesture.
//! - anything else locks the session horizontal. The check never runs again
//!   for that session.
//!
//! A move with more than one finger cancels the session at any point.

use std::time::Duration;

use crate::coordinator::DragToken;
use crate::input::{PointerSample, PointerSource};

/// Vertical travel (exclusive) beyond which an unlocked gesture may be a scroll.
pub const VERTICAL_CANCEL_DY: f64 = 1.0;
/// Horizontal travel (exclusive) below which such a gesture is treated as a scroll.
pub const HORIZONTAL_LOCK_DX: f64 = 5.0;

/// Axis state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisLock {
    /// No move seen yet.
    Pending,
    /// The gesture is a horizontal drag.
    Horizontal,
}

/// Why a session ended without a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// More than one finger on the surface.
    MultiTouch,
    /// The first move looked like a vertical scroll.
    VerticalScroll,
    /// The host reported `touchcancel` or lost the pointer.
    Host,
    /// The carousel was unloaded mid-gesture.
    Unloaded,
    /// A programmatic move or resize took a track the drag was moving.
    Interrupted,
}

/// Result of feeding one move to a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveVerdict {
    /// Drop the session.
    Cancel(CancelReason),
    /// Horizontal travel relative to the start sample.
    Track { dx: f64, dy: f64 },
}

/// One in-flight drag.
#[derive(Debug)]
pub struct DragSession {
    source: PointerSource,
    origin: PointerSample,
    start_position: f64,
    started_at: Duration,
    lock: AxisLock,
    dx: f64,
    /// Whether the last move was handed to the parent carousel.
    forwarding: bool,
    token: DragToken,
}

impl DragSession {
    pub fn new(
        source: PointerSource,
        origin: PointerSample,
        start_position: f64,
        started_at: Duration,
        token: DragToken,
    ) -> Self {
        Self {
            source,
            origin,
            start_position,
            started_at,
            lock: AxisLock::Pending,
            dx: 0.0,
            forwarding: false,
            token,
        }
    }

    /// Classify a move and record its travel when it is tracked.
    pub fn classify_move(&mut self, sample: PointerSample) -> MoveVerdict {
        if sample.is_multi_touch() {
            return MoveVerdict::Cancel(CancelReason::MultiTouch);
        }
        let dx = sample.x - self.origin.x;
        let dy = sample.y - self.origin.y;
        if self.lock == AxisLock::Pending {
            if dy.abs() > VERTICAL_CANCEL_DY && dx.abs() < HORIZONTAL_LOCK_DX {
                return MoveVerdict::Cancel(CancelReason::VerticalScroll);
            }
            self.lock = AxisLock::Horizontal;
        }
        self.dx = dx;
        MoveVerdict::Track { dx, dy }
    }

    #[inline]
    #[must_use]
    pub const fn source(&self) -> PointerSource {
        self.source
    }

    /// Committed offset when the session began.
    #[inline]
    #[must_use]
    pub const fn start_position(&self) -> f64 {
        self.start_position
    }

    #[inline]
    #[must_use]
    pub const fn lock(&self) -> AxisLock {
        self.lock
    }

    /// Horizontal travel of the last tracked move.
    #[inline]
    #[must_use]
    pub const fn dx(&self) -> f64 {
        self.dx
    }

    /// Time since the session began, saturating at zero.
    #[must_use]
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started_at)
    }

    #[inline]
    #[must_use]
    pub const fn is_forwarding(&self) -> bool {
        self.forwarding
    }

    pub fn set_forwarding(&mut self, forwarding: bool) {
        self.forwarding = forwarding;
    }

    /// Another carousel took a track this drag was steering.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.token.is_interrupted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::DragCoordinator;

    fn session(coordinator: &DragCoordinator) -> DragSession {
        let id = coordinator.register();
        let token = coordinator.try_acquire(id).expect("free coordinator");
        DragSession::new(
            PointerSource::Touch,
            PointerSample::new(100.0, 100.0),
            -320.0,
            Duration::from_millis(1_000),
            token,
        )
    }

    #[test]
    fn vertical_first_move_cancels() {
        let coordinator = DragCoordinator::new();
        let mut session = session(&coordinator);
        assert_eq!(
            session.classify_move(PointerSample::new(102.0, 110.0)),
            MoveVerdict::Cancel(CancelReason::VerticalScroll)
        );
        assert_eq!(session.lock(), AxisLock::Pending);
    }

    #[test]
    fn horizontal_first_move_locks_for_good() {
        let coordinator = DragCoordinator::new();
        let mut session = session(&coordinator);
        assert_eq!(
            session.classify_move(PointerSample::new(90.0, 100.0)),
            MoveVerdict::Track {
                dx: -10.0,
                dy: 0.0
            }
        );
        assert_eq!(session.lock(), AxisLock::Horizontal);

        // Once locked, vertical drift no longer cancels.
        assert!(matches!(
            session.classify_move(PointerSample::new(98.0, 140.0)),
            MoveVerdict::Track { .. }
        ));
        assert_eq!(session.dx(), -2.0);
    }

    #[test]
    fn small_jitter_locks_horizontal() {
        let coordinator = DragCoordinator::new();
        let mut session = session(&coordinator);
        assert!(matches!(
            session.classify_move(PointerSample::new(100.0, 101.0)),
            MoveVerdict::Track { .. }
        ));
        assert_eq!(session.lock(), AxisLock::Horizontal);
    }

    #[test]
    fn multi_touch_cancels_even_when_locked() {
        let coordinator = DragCoordinator::new();
        let mut session = session(&coordinator);
        session.classify_move(PointerSample::new(80.0, 100.0));
        assert_eq!(
            session.classify_move(PointerSample::new(70.0, 100.0).with_touches(2)),
            MoveVerdict::Cancel(CancelReason::MultiTouch)
        );
    }

    #[test]
    fn dropping_session_releases_drag() {
        let coordinator = DragCoordinator::new();
        let session = session(&coordinator);
        assert!(coordinator.is_dragging());
        drop(session);
        assert!(!coordinator.is_dragging());
    }

    #[test]
    fn elapsed_saturates() {
        let coordinator = DragCoordinator::new();
        let session = session(&coordinator);
        assert_eq!(session.elapsed(Duration::from_millis(500)), Duration::ZERO);
        assert_eq!(
            session.elapsed(Duration::from_millis(1_250)),
            Duration::from_millis(250)
        );
    }
}
