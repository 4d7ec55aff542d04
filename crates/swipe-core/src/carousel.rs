#![forbid(unsafe_code)]

//! The gesture-driven carousel.
//!
//! [`GestureCarousel`] turns a row of slides on a [`SlideSurface`] into a
//! paged, swipeable track. The host feeds it pointer events
//! ([`gesture_start`](GestureCarousel::gesture_start),
//! [`gesture_move`](GestureCarousel::gesture_move),
//! [`gesture_end`](GestureCarousel::gesture_end)) and advances time
//! ([`advance`](GestureCarousel::advance)); the carousel writes
//! [`SurfaceEffect`]s back.
//!
//! # Nesting
//!
//! A carousel may be linked to a parent at construction
//! ([`CarouselBuilder::parent`]). When a drag pushes past the child's first or
//! last slide, the parent's track follows the pointer instead and the parent
//! decides where to settle on release. The child only keeps a weak link; it
//! never owns its parent.
//!
//! # Invariants
//!
//! 1. At most one carousel per [`DragCoordinator`] interprets a gesture.
//! 2. At rest after a snapped move, `position == -index * viewport_width`.
//! 3. A delegated drag never changes the child's index or position.
//! 4. After [`unload`](GestureCarousel::unload) every listener is detached
//!    and every entry point is a no-op.
//! 5. At most one completion is pending; a newer move supersedes it.
//! 6. A programmatic move, resize or unload never leaves a delegated drag
//!    behind; the child owning the gesture cancels on its next event.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::capabilities::InputCapabilities;
use crate::completion::{CompletionOutcome, SwipeCompletion};
use crate::config::{CarouselConfig, ConfigError};
use crate::coordinator::{CarouselId, DragCoordinator};
use crate::gesture::{AxisLock, CancelReason, DragSession, MoveVerdict};
use crate::input::{PointerSample, PointerSource};
use crate::snap::{self, Destination, Release};
use crate::surface::{Listener, SlideSurface, SurfaceEffect, SwipeDirection};

// Import tracing macros (no-op when tracing feature is disabled).
#[cfg(feature = "tracing")]
use crate::logging::{debug, debug_span, trace, warn};
#[cfg(not(feature = "tracing"))]
use crate::{debug, debug_span, trace, warn};

/// Shared, mutable carousel. Hosts keep these; children link to parents
/// through [`ParentLink`].
pub type CarouselHandle<S> = Rc<RefCell<GestureCarousel<S>>>;

/// Non-owning link from a child carousel to its parent.
pub type ParentLink<S> = Weak<RefCell<GestureCarousel<S>>>;

/// Post-swipe callback. Receives the carousel's state after the move.
pub type AfterSwipe = Box<dyn FnMut(&CarouselSnapshot)>;

/// Failure to build a carousel.
#[derive(Debug, Clone, PartialEq)]
pub enum CarouselError {
    Config(ConfigError),
    /// The parent was built against a different [`DragCoordinator`].
    ForeignParent,
    /// The parent handle is dropped or currently borrowed.
    ParentUnavailable,
}

impl core::fmt::Display for CarouselError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid carousel config: {err}"),
            Self::ForeignParent => write!(f, "parent carousel uses a different drag coordinator"),
            Self::ParentUnavailable => write!(f, "parent carousel is unavailable"),
        }
    }
}

impl std::error::Error for CarouselError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for CarouselError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Read-only view handed to the post-swipe callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarouselSnapshot {
    pub id: CarouselId,
    pub index: usize,
    pub position: f64,
    pub slide_count: usize,
    pub viewport_width: f64,
}

/// Gesture lifecycle phase of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Why an incoming gesture event was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoredReason {
    /// No start listener is bound (no touch, mouse support off).
    Inert,
    Unloaded,
    /// The start event's device is not the one this carousel listens to.
    SourceNotBound,
    EmptyCarousel,
    /// Another carousel (or a delegated drag) owns the gesture.
    DragInProgress,
    NoActiveDrag,
}

/// How the track responded to one dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    Started,
    /// The track follows the pointer.
    Tracked { offset: f64 },
    /// The drag is past an edge; the track moved by the damped amount.
    Resisted { offset: f64 },
    /// The drag is past an edge and the parent carousel follows instead.
    Delegated,
    /// The gesture ended and the track settles at `index`/`offset`.
    Committed {
        index: usize,
        offset: f64,
        clamped: bool,
        edge_abort: bool,
    },
    /// The gesture ended on a delegated drag; the parent settles.
    ReleasedToParent,
    /// The gesture ended without ever locking horizontal.
    Released,
    Cancelled(CancelReason),
    Ignored(IgnoredReason),
}

/// Structured record of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureLogEntry {
    pub carousel: CarouselId,
    pub phase: GesturePhase,
    pub index: usize,
    pub outcome: GestureOutcome,
}

/// Result of one gesture dispatch.
#[derive(Debug, Clone)]
pub struct GestureDispatch {
    /// The host should call `preventDefault()` on the DOM event.
    pub prevent_default: bool,
    /// Completion of the move started by this dispatch, if any.
    pub completion: Option<SwipeCompletion>,
    pub log: GestureLogEntry,
}

impl GestureDispatch {
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self.log.outcome, GestureOutcome::Ignored(_))
    }
}

/// A drag the child handed to this carousel.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DelegatedDrag {
    base: f64,
    forwarding: bool,
}

#[derive(Debug)]
enum DragState {
    Idle,
    Own(DragSession),
    Delegated(DelegatedDrag),
}

#[derive(Debug)]
struct PendingSwipe {
    completion: SwipeCompletion,
    deadline: Duration,
}

/// How one follow step moved the tracks.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Follow {
    Tracked(f64),
    Resisted(f64),
    Delegated,
}

/// Builder for [`GestureCarousel`].
pub struct CarouselBuilder<S: SlideSurface> {
    surface: S,
    coordinator: DragCoordinator,
    config: CarouselConfig,
    capabilities: InputCapabilities,
    parent: Option<CarouselHandle<S>>,
    after_swipe: Option<AfterSwipe>,
}

impl<S: SlideSurface> CarouselBuilder<S> {
    #[must_use]
    pub fn config(mut self, config: CarouselConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn capabilities(mut self, capabilities: InputCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Link a parent carousel for edge delegation.
    #[must_use]
    pub fn parent(mut self, parent: &CarouselHandle<S>) -> Self {
        self.parent = Some(Rc::clone(parent));
        self
    }

    #[must_use]
    pub fn on_after_swipe(mut self, callback: impl FnMut(&CarouselSnapshot) + 'static) -> Self {
        self.after_swipe = Some(Box::new(callback));
        self
    }

    /// Validate, size the surface, and bind listeners.
    pub fn build(self) -> Result<GestureCarousel<S>, CarouselError> {
        self.config.validate()?;
        let parent = match self.parent {
            Some(parent) => {
                let linked = parent
                    .try_borrow()
                    .map_err(|_| CarouselError::ParentUnavailable)?;
                if !linked.coordinator.same_as(&self.coordinator) {
                    return Err(CarouselError::ForeignParent);
                }
                drop(linked);
                Some(Rc::downgrade(&parent))
            }
            None => None,
        };

        let start_listener = self
            .capabilities
            .start_listener(self.config.support_mouse);
        let mut carousel = GestureCarousel {
            id: self.coordinator.register(),
            surface: self.surface,
            coordinator: self.coordinator,
            config: self.config,
            start_listener,
            parent,
            after_swipe: self.after_swipe,
            index: 0,
            position: 0.0,
            width: 0.0,
            slide_count: 0,
            drag: DragState::Idle,
            pending: None,
            swipe_class: None,
            now: Duration::ZERO,
            unloaded: false,
        };
        carousel.init();
        Ok(carousel)
    }
}

/// Swipeable, paged track of slides.
pub struct GestureCarousel<S: SlideSurface> {
    id: CarouselId,
    surface: S,
    coordinator: DragCoordinator,
    config: CarouselConfig,
    start_listener: Option<Listener>,
    parent: Option<ParentLink<S>>,
    after_swipe: Option<AfterSwipe>,

    index: usize,
    position: f64,
    width: f64,
    slide_count: usize,

    drag: DragState,
    pending: Option<PendingSwipe>,
    swipe_class: Option<SwipeDirection>,
    /// Latest host time seen by any entry point.
    now: Duration,
    unloaded: bool,
}

impl<S: SlideSurface> std::fmt::Debug for GestureCarousel<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureCarousel")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("position", &self.position)
            .field("slide_count", &self.slide_count)
            .field("dragging", &self.is_dragging())
            .field("unloaded", &self.unloaded)
            .finish()
    }
}

impl<S: SlideSurface> GestureCarousel<S> {
    /// Start building a carousel over `surface`.
    #[must_use]
    pub fn builder(surface: S, coordinator: &DragCoordinator) -> CarouselBuilder<S> {
        CarouselBuilder {
            surface,
            coordinator: coordinator.clone(),
            config: CarouselConfig::default(),
            capabilities: InputCapabilities::TOUCH,
            parent: None,
            after_swipe: None,
        }
    }

    /// Build a carousel without a parent.
    pub fn new(
        surface: S,
        config: CarouselConfig,
        coordinator: &DragCoordinator,
        capabilities: InputCapabilities,
    ) -> Result<Self, CarouselError> {
        Self::builder(surface, coordinator)
            .config(config)
            .capabilities(capabilities)
            .build()
    }

    /// Wrap into a shareable handle.
    #[must_use]
    pub fn into_handle(self) -> CarouselHandle<S> {
        Rc::new(RefCell::new(self))
    }

    fn init(&mut self) {
        if self.config.set_styles {
            self.surface.apply(SurfaceEffect::PrepareStyles);
        }
        self.measure();
        match self.start_listener {
            Some(listener) => {
                self.surface.apply(SurfaceEffect::Listen(listener));
                self.surface.apply(SurfaceEffect::Listen(Listener::Resize));
                self.surface
                    .apply(SurfaceEffect::Listen(Listener::OrientationChange));
            }
            None => {
                debug!(carousel = %self.id, "no touch capability and mouse support off; carousel is inert");
            }
        }
    }

    fn measure(&mut self) {
        self.width = self.surface.viewport_width();
        self.slide_count = self.surface.slide_count();
        if self.config.set_sizes {
            self.surface.apply(SurfaceEffect::SizeTrack {
                width: self.width * self.slide_count as f64,
            });
            self.surface
                .apply(SurfaceEffect::SizeSlides { width: self.width });
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn id(&self) -> CarouselId {
        self.id
    }

    /// Committed slide index.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Current track offset (committed at rest, live during an own drag).
    #[inline]
    #[must_use]
    pub const fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    #[must_use]
    pub const fn slide_count(&self) -> usize {
        self.slide_count
    }

    #[inline]
    #[must_use]
    pub const fn viewport_width(&self) -> f64 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn coordinator(&self) -> &DragCoordinator {
        &self.coordinator
    }

    /// Start listener bound at construction; `None` when inert.
    #[must_use]
    pub const fn start_listener(&self) -> Option<Listener> {
        self.start_listener
    }

    /// Whether this carousel owns the current gesture.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Own(_))
    }

    /// Whether a child is currently steering this carousel's track.
    #[must_use]
    pub fn is_following_child(&self) -> bool {
        matches!(self.drag, DragState::Delegated(_))
    }

    #[must_use]
    pub const fn is_unloaded(&self) -> bool {
        self.unloaded
    }

    /// Completion of the move still in flight, if any.
    #[must_use]
    pub fn pending_completion(&self) -> Option<&SwipeCompletion> {
        self.pending.as_ref().map(|pending| &pending.completion)
    }

    #[must_use]
    pub fn snapshot(&self) -> CarouselSnapshot {
        CarouselSnapshot {
            id: self.id,
            index: self.index,
            position: self.position,
            slide_count: self.slide_count,
            viewport_width: self.width,
        }
    }

    /// Replace the post-swipe callback.
    pub fn set_after_swipe(&mut self, callback: impl FnMut(&CarouselSnapshot) + 'static) {
        self.after_swipe = Some(Box::new(callback));
    }

    // -----------------------------------------------------------------------
    // Gesture entry points
    // -----------------------------------------------------------------------

    /// Handle touch-start / mouse-down on the track.
    pub fn gesture_start(
        &mut self,
        source: PointerSource,
        sample: PointerSample,
        now: Duration,
    ) -> GestureDispatch {
        self.observe(now);
        if let Some(reason) = self.start_blocker(source) {
            debug!(carousel = %self.id, ?reason, "gesture start ignored");
            return self.dispatch(GesturePhase::Start, GestureOutcome::Ignored(reason));
        }
        let Some(token) = self.coordinator.try_acquire(self.id) else {
            debug!(carousel = %self.id, owner = ?self.coordinator.active(), "another carousel owns the gesture");
            return self.dispatch(
                GesturePhase::Start,
                GestureOutcome::Ignored(IgnoredReason::DragInProgress),
            );
        };

        self.supersede_pending();
        self.surface.apply(SurfaceEffect::Transition {
            duration: Duration::ZERO,
            easing: self.config.easing,
        });
        for listener in source.gesture_listeners() {
            self.surface.apply(SurfaceEffect::Listen(listener));
        }
        self.drag = DragState::Own(DragSession::new(
            source,
            sample,
            self.position,
            now,
            token,
        ));
        debug!(carousel = %self.id, index = self.index, "gesture started");
        self.dispatch(GesturePhase::Start, GestureOutcome::Started)
    }

    fn start_blocker(&self, source: PointerSource) -> Option<IgnoredReason> {
        if self.unloaded {
            return Some(IgnoredReason::Unloaded);
        }
        let Some(bound) = self.start_listener else {
            return Some(IgnoredReason::Inert);
        };
        let expected = match bound {
            Listener::MouseDown => PointerSource::Mouse,
            _ => PointerSource::Touch,
        };
        if source != expected {
            return Some(IgnoredReason::SourceNotBound);
        }
        if self.slide_count == 0 {
            return Some(IgnoredReason::EmptyCarousel);
        }
        if !matches!(self.drag, DragState::Idle) {
            return Some(IgnoredReason::DragInProgress);
        }
        None
    }

    /// Handle touch-move / mouse-move while this carousel owns the gesture.
    pub fn gesture_move(&mut self, sample: PointerSample, now: Duration) -> GestureDispatch {
        self.observe(now);
        let DragState::Own(session) = &mut self.drag else {
            return self.dispatch(
                GesturePhase::Move,
                GestureOutcome::Ignored(IgnoredReason::NoActiveDrag),
            );
        };
        if session.is_interrupted() {
            return self.cancel_own(GesturePhase::Move, CancelReason::Interrupted);
        }
        let (dx, start, forwarding) = match session.classify_move(sample) {
            MoveVerdict::Cancel(reason) => return self.cancel_own(GesturePhase::Move, reason),
            MoveVerdict::Track { dx, .. } => {
                (dx, session.start_position(), session.is_forwarding())
            }
        };

        self.set_swipe_class(SwipeDirection::from_delta(dx));
        let follow = self.follow(start, dx, forwarding);
        if let DragState::Own(session) = &mut self.drag {
            session.set_forwarding(follow == Follow::Delegated);
        }
        trace!(carousel = %self.id, dx, ?follow, "gesture move");

        let outcome = match follow {
            Follow::Tracked(offset) => GestureOutcome::Tracked { offset },
            Follow::Resisted(offset) => GestureOutcome::Resisted { offset },
            Follow::Delegated => GestureOutcome::Delegated,
        };
        let mut dispatch = self.dispatch(GesturePhase::Move, outcome);
        dispatch.prevent_default = true;
        dispatch
    }

    /// Handle touch-end / mouse-up.
    pub fn gesture_end(&mut self, now: Duration) -> GestureDispatch {
        self.observe(now);
        let _span = debug_span!("gesture_end", carousel = %self.id).entered();
        if let DragState::Own(session) = &self.drag
            && session.is_interrupted()
        {
            return self.cancel_own(GesturePhase::End, CancelReason::Interrupted);
        }
        let DragState::Own(session) = std::mem::replace(&mut self.drag, DragState::Idle) else {
            return self.dispatch(
                GesturePhase::End,
                GestureOutcome::Ignored(IgnoredReason::NoActiveDrag),
            );
        };
        for listener in session.source().gesture_listeners() {
            self.surface.apply(SurfaceEffect::Unlisten(listener));
        }
        let elapsed = session.elapsed(now);
        let dx = session.dx();
        let start = session.start_position();
        let locked = session.lock() == AxisLock::Horizontal;
        let forwarding = session.is_forwarding();
        // Dropping the session releases the drag for every other carousel.
        drop(session);

        if forwarding {
            self.set_swipe_class(None);
            let completion = self.parent_handle().and_then(|parent| {
                parent
                    .try_borrow_mut()
                    .ok()
                    .and_then(|mut parent| parent.release_delegated(dx, elapsed, now))
            });
            debug!("released to parent");
            let mut dispatch = self.dispatch(GesturePhase::End, GestureOutcome::ReleasedToParent);
            dispatch.completion = completion;
            return dispatch;
        }

        if !locked {
            self.set_swipe_class(None);
            return self.dispatch(GesturePhase::End, GestureOutcome::Released);
        }

        let decision = snap::resolve_release(
            &Release {
                index: self.index,
                count: self.slide_count,
                width: self.width,
                start,
                current: self.position,
                dx,
                elapsed,
            },
            &self.config,
        );
        let completion = self.settle(decision.destination, true);
        debug!(
            index = self.index,
            snap_target = decision.target,
            clamped = decision.clamped,
            edge_abort = decision.edge_abort,
            "gesture committed"
        );
        let mut dispatch = self.dispatch(
            GesturePhase::End,
            GestureOutcome::Committed {
                index: self.index,
                offset: self.position,
                clamped: decision.clamped,
                edge_abort: decision.edge_abort,
            },
        );
        dispatch.completion = Some(completion);
        dispatch
    }

    /// Handle touch-cancel or any host-side interruption of the gesture.
    pub fn gesture_cancel(&mut self, now: Duration) -> GestureDispatch {
        self.observe(now);
        if !self.is_dragging() {
            return self.dispatch(
                GesturePhase::Cancel,
                GestureOutcome::Ignored(IgnoredReason::NoActiveDrag),
            );
        }
        self.cancel_own(GesturePhase::Cancel, CancelReason::Host)
    }

    fn cancel_own(&mut self, phase: GesturePhase, reason: CancelReason) -> GestureDispatch {
        let DragState::Own(session) = std::mem::replace(&mut self.drag, DragState::Idle) else {
            return self.dispatch(phase, GestureOutcome::Ignored(IgnoredReason::NoActiveDrag));
        };
        for listener in session.source().gesture_listeners() {
            self.surface.apply(SurfaceEffect::Unlisten(listener));
        }
        let start = session.start_position();
        let forwarding = session.is_forwarding();
        drop(session);

        if forwarding {
            self.abandon_parent();
        }
        self.set_swipe_class(None);
        if self.position != start {
            self.restore(start, true);
        }
        debug!(carousel = %self.id, ?reason, "gesture cancelled");
        self.dispatch(phase, GestureOutcome::Cancelled(reason))
    }

    /// Advance host time; fires the pending completion once its transition
    /// has run. Returns the outcome of the completion it retired, if any.
    pub fn advance(&mut self, now: Duration) -> Option<CompletionOutcome> {
        self.observe(now);
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| self.now >= pending.deadline);
        if !due {
            return None;
        }
        let pending = self.pending.take()?;
        self.set_swipe_class(None);
        if pending.completion.resolve(CompletionOutcome::Completed) {
            let snapshot = self.snapshot();
            if let Some(callback) = self.after_swipe.as_mut() {
                callback(&snapshot);
            }
        }
        pending.completion.outcome()
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Move to slide `index`, clamped into range.
    ///
    /// Returns `None` when the carousel is empty or unloaded.
    pub fn goto_index(&mut self, index: usize, animate: bool) -> Option<SwipeCompletion> {
        if self.unloaded || self.slide_count == 0 {
            return None;
        }
        self.interrupt_drag();
        let clamped = index.min(self.slide_count - 1);
        if clamped != index {
            warn!(carousel = %self.id, requested = index, clamped, "goto_index out of range");
        }
        Some(self.settle(Destination::Slide(clamped), animate))
    }

    /// Move to the slide identified by `slide`. `None` if it is not a slide
    /// of this carousel.
    pub fn goto_element(&mut self, slide: &S::SlideKey) -> Option<SwipeCompletion> {
        let index = self.surface.slide_index_of(slide)?;
        self.goto_index(index, true)
    }

    /// Move the track to `offset`.
    ///
    /// `index` follows only when `offset` is exactly a slide boundary.
    pub fn goto_position(&mut self, offset: f64, animate: bool) -> Option<SwipeCompletion> {
        if self.unloaded {
            return None;
        }
        self.interrupt_drag();
        Some(self.settle(Destination::Free(offset), animate))
    }

    /// Animate to the next slide; `None` at the last slide.
    pub fn next(&mut self) -> Option<SwipeCompletion> {
        if self.index.saturating_add(1) >= self.slide_count {
            return None;
        }
        self.goto_index(self.index + 1, true)
    }

    /// Animate to the previous slide; `None` at the first slide.
    pub fn previous(&mut self) -> Option<SwipeCompletion> {
        if self.index == 0 {
            return None;
        }
        self.goto_index(self.index - 1, true)
    }

    /// Jump to the first slide without animation.
    pub fn reset(&mut self) -> Option<SwipeCompletion> {
        self.goto_index(0, false)
    }

    /// Update bookkeeping to slide `index` without touching the surface.
    pub fn set_index(&mut self, index: usize) {
        if self.slide_count == 0 {
            return;
        }
        self.interrupt_delegated();
        self.index = index.min(self.slide_count - 1);
        self.position = snap::slide_offset(self.index, self.width);
    }

    /// Re-measure after a resize or orientation change and realign the
    /// committed slide.
    pub fn resize(&mut self) {
        if self.unloaded {
            return;
        }
        self.interrupt_drag();
        self.measure();
        if self.slide_count > 0 {
            self.index = self.index.min(self.slide_count - 1);
        } else {
            self.index = 0;
        }
        let offset = snap::slide_offset(self.index, self.width);
        self.restore(offset, false);
    }

    /// Detach every listener and stop responding.
    pub fn unload(&mut self) {
        if self.unloaded {
            return;
        }
        if self.is_dragging() {
            self.cancel_own(GesturePhase::Cancel, CancelReason::Unloaded);
        }
        self.interrupt_delegated();
        if let Some(pending) = self.pending.take() {
            pending.completion.resolve(CompletionOutcome::Cancelled);
        }
        self.set_swipe_class(None);
        if let Some(listener) = self.start_listener {
            self.surface.apply(SurfaceEffect::Unlisten(listener));
            self.surface.apply(SurfaceEffect::Unlisten(Listener::Resize));
            self.surface
                .apply(SurfaceEffect::Unlisten(Listener::OrientationChange));
        }
        self.unloaded = true;
        debug!(carousel = %self.id, "unloaded");
    }

    // -----------------------------------------------------------------------
    // Delegation (called by a child on its parent)
    // -----------------------------------------------------------------------

    /// End any drag moving this track before a programmatic move takes it.
    fn interrupt_drag(&mut self) {
        if self.is_dragging() {
            self.cancel_own(GesturePhase::Cancel, CancelReason::Interrupted);
        }
        self.interrupt_delegated();
    }

    /// Stop following a child. The track stays where it is; the owning child
    /// is told through the coordinator and cancels on its next event.
    fn interrupt_delegated(&mut self) {
        let DragState::Delegated(delegated) = std::mem::replace(&mut self.drag, DragState::Idle)
        else {
            return;
        };
        if delegated.forwarding {
            self.abandon_parent();
        }
        self.coordinator.interrupt();
        debug!(carousel = %self.id, owner = ?self.coordinator.active(), "delegated drag interrupted");
    }

    fn parent_handle(&self) -> Option<CarouselHandle<S>> {
        if !self.config.delegate_to_parent {
            return None;
        }
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Move tracks for horizontal travel `dx` from `base`.
    ///
    /// At an edge the drag goes to the parent when one is linked; otherwise
    /// the edge resistance applies.
    fn follow(&mut self, base: f64, dx: f64, forwarding: bool) -> Follow {
        let edge = snap::edge_for_drag(self.index, self.slide_count, dx);
        if edge.is_some()
            && let Some(parent) = self.parent_handle()
            && let Ok(mut parent) = parent.try_borrow_mut()
            && !parent.unloaded
            && !parent.is_dragging()
        {
            if !forwarding && self.position != base {
                self.translate(base);
            }
            parent.follow_delegated(dx);
            return Follow::Delegated;
        }

        if forwarding {
            self.abandon_parent();
        }
        if edge.is_some() {
            let offset =
                base + snap::damped_edge_offset(dx, self.width, self.config.edge_resistance);
            self.translate(offset);
            Follow::Resisted(offset)
        } else {
            let offset = base + dx;
            self.translate(offset);
            Follow::Tracked(offset)
        }
    }

    fn follow_delegated(&mut self, dx: f64) {
        let delegated = match self.drag {
            DragState::Delegated(delegated) => delegated,
            DragState::Idle => {
                self.supersede_pending();
                self.surface.apply(SurfaceEffect::Transition {
                    duration: Duration::ZERO,
                    easing: self.config.easing,
                });
                DelegatedDrag {
                    base: self.position,
                    forwarding: false,
                }
            }
            DragState::Own(_) => return,
        };
        let follow = self.follow(delegated.base, dx, delegated.forwarding);
        self.drag = DragState::Delegated(DelegatedDrag {
            base: delegated.base,
            forwarding: follow == Follow::Delegated,
        });
    }

    /// Drop a delegated drag and put the track back where it was.
    fn abandon_delegated(&mut self) {
        let DragState::Delegated(delegated) = std::mem::replace(&mut self.drag, DragState::Idle)
        else {
            return;
        };
        if delegated.forwarding {
            self.abandon_parent();
        }
        if self.position != delegated.base {
            self.translate(delegated.base);
        }
    }

    fn abandon_parent(&mut self) {
        if let Some(parent) = self.parent_handle()
            && let Ok(mut parent) = parent.try_borrow_mut()
        {
            parent.abandon_delegated();
        }
    }

    fn release_delegated(
        &mut self,
        dx: f64,
        elapsed: Duration,
        now: Duration,
    ) -> Option<SwipeCompletion> {
        self.observe(now);
        let DragState::Delegated(delegated) = std::mem::replace(&mut self.drag, DragState::Idle)
        else {
            return None;
        };
        if delegated.forwarding {
            return self.parent_handle().and_then(|parent| {
                parent
                    .try_borrow_mut()
                    .ok()
                    .and_then(|mut parent| parent.release_delegated(dx, elapsed, now))
            });
        }
        let decision = snap::resolve_release(
            &Release {
                index: self.index,
                count: self.slide_count,
                width: self.width,
                start: delegated.base,
                current: self.position,
                dx,
                elapsed,
            },
            &self.config,
        );
        debug!(carousel = %self.id, destination = ?decision.destination, "delegated drag committed");
        Some(self.settle(decision.destination, true))
    }

    // -----------------------------------------------------------------------
    // Surface writes
    // -----------------------------------------------------------------------

    fn observe(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    fn translate(&mut self, offset: f64) {
        self.surface.apply(SurfaceEffect::Translate { offset });
        self.position = offset;
    }

    fn set_swipe_class(&mut self, direction: Option<SwipeDirection>) {
        if self.swipe_class != direction {
            self.swipe_class = direction;
            self.surface.apply(SurfaceEffect::SwipeClass(direction));
        }
    }

    fn supersede_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.completion.resolve(CompletionOutcome::Superseded);
        }
    }

    /// Move the track without scheduling a completion.
    fn restore(&mut self, offset: f64, animate: bool) {
        let duration = if animate {
            self.config.transition
        } else {
            Duration::ZERO
        };
        self.surface.apply(SurfaceEffect::Transition {
            duration,
            easing: self.config.easing,
        });
        self.translate(offset);
    }

    /// Commit the track to `destination`.
    fn settle(&mut self, destination: Destination, animate: bool) -> SwipeCompletion {
        debug_assert!(
            matches!(self.drag, DragState::Idle),
            "settle with a drag in flight"
        );
        self.supersede_pending();
        let offset = match destination {
            Destination::Slide(index) => snap::slide_offset(index, self.width),
            Destination::Free(offset) => offset,
        };
        let animated = animate && !self.config.transition.is_zero();
        self.restore(offset, animated);
        match destination {
            Destination::Slide(index) => self.index = index,
            Destination::Free(offset) => {
                if let Some(index) = snap::index_at_offset(offset, self.width, self.slide_count) {
                    self.index = index;
                }
            }
        }

        if animated {
            let completion = SwipeCompletion::pending();
            self.pending = Some(PendingSwipe {
                completion: completion.clone(),
                deadline: self.now.saturating_add(self.config.transition),
            });
            completion
        } else {
            self.set_swipe_class(None);
            SwipeCompletion::finished(CompletionOutcome::Completed)
        }
    }

    fn dispatch(&self, phase: GesturePhase, outcome: GestureOutcome) -> GestureDispatch {
        GestureDispatch {
            prevent_default: false,
            completion: None,
            log: GestureLogEntry {
                carousel: self.id,
                phase,
                index: self.index,
                outcome,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EdgeResistance;
    use crate::surface::RecordingSurface;
    use std::cell::Cell;

    const WIDTH: f64 = 100.0;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn carousel(count: usize, config: CarouselConfig) -> GestureCarousel<RecordingSurface> {
        GestureCarousel::new(
            RecordingSurface::new(WIDTH, count),
            config,
            &DragCoordinator::new(),
            InputCapabilities::TOUCH,
        )
        .expect("valid config")
    }

    fn swipe(
        carousel: &mut GestureCarousel<RecordingSurface>,
        dx: f64,
        start: u64,
        duration: u64,
    ) -> GestureDispatch {
        carousel.gesture_start(PointerSource::Touch, PointerSample::new(200.0, 50.0), ms(start));
        carousel.gesture_move(PointerSample::new(200.0 + dx, 50.0), ms(start + duration / 2));
        carousel.gesture_end(ms(start + duration))
    }

    #[test]
    fn init_sizes_and_binds_touch() {
        let carousel = carousel(4, CarouselConfig::default());
        let effects = carousel.surface().effects();
        assert_eq!(effects[0], SurfaceEffect::PrepareStyles);
        assert_eq!(effects[1], SurfaceEffect::SizeTrack { width: 400.0 });
        assert_eq!(effects[2], SurfaceEffect::SizeSlides { width: WIDTH });
        assert_eq!(
            carousel.surface().active_listeners(),
            vec![
                Listener::TouchStart,
                Listener::Resize,
                Listener::OrientationChange
            ]
        );
    }

    #[test]
    fn unmanaged_layout_writes_nothing_but_listeners() {
        let carousel = carousel(
            4,
            CarouselConfig::default().with_managed_layout(false, false),
        );
        assert!(
            carousel
                .surface()
                .effects()
                .iter()
                .all(|effect| matches!(effect, SurfaceEffect::Listen(_)))
        );
    }

    #[test]
    fn inert_without_touch_or_mouse_support() {
        let mut carousel = GestureCarousel::new(
            RecordingSurface::new(WIDTH, 3),
            CarouselConfig::default(),
            &DragCoordinator::new(),
            InputCapabilities::MOUSE,
        )
        .expect("valid config");
        assert_eq!(carousel.start_listener(), None);
        assert!(carousel.surface().active_listeners().is_empty());
        let dispatch =
            carousel.gesture_start(PointerSource::Mouse, PointerSample::new(0.0, 0.0), ms(0));
        assert_eq!(
            dispatch.log.outcome,
            GestureOutcome::Ignored(IgnoredReason::Inert)
        );
    }

    #[test]
    fn mouse_support_binds_mouse_down() {
        let mut carousel = GestureCarousel::new(
            RecordingSurface::new(WIDTH, 3),
            CarouselConfig::default().with_mouse_support(true),
            &DragCoordinator::new(),
            InputCapabilities::empty(),
        )
        .expect("valid config");
        assert_eq!(carousel.start_listener(), Some(Listener::MouseDown));
        let touch =
            carousel.gesture_start(PointerSource::Touch, PointerSample::new(0.0, 0.0), ms(0));
        assert_eq!(
            touch.log.outcome,
            GestureOutcome::Ignored(IgnoredReason::SourceNotBound)
        );
        let mouse =
            carousel.gesture_start(PointerSource::Mouse, PointerSample::new(0.0, 0.0), ms(0));
        assert_eq!(mouse.log.outcome, GestureOutcome::Started);
        assert!(
            carousel
                .surface()
                .active_listeners()
                .contains(&Listener::MouseMove)
        );
    }

    #[test]
    fn invalid_config_fails_construction() {
        let result = GestureCarousel::new(
            RecordingSurface::new(WIDTH, 3),
            CarouselConfig::default().with_velocity_scale(-1.0),
            &DragCoordinator::new(),
            InputCapabilities::TOUCH,
        );
        assert!(matches!(result, Err(CarouselError::Config(_))));
    }

    #[test]
    fn start_zeroes_transition_and_binds_gesture_listeners() {
        let mut carousel = carousel(3, CarouselConfig::default());
        carousel.surface_mut().drain();
        let dispatch =
            carousel.gesture_start(PointerSource::Touch, PointerSample::new(10.0, 10.0), ms(5));
        assert_eq!(dispatch.log.outcome, GestureOutcome::Started);
        assert!(carousel.is_dragging());
        assert_eq!(
            carousel.surface().effects(),
            &[
                SurfaceEffect::Transition {
                    duration: Duration::ZERO,
                    easing: crate::config::Easing::Linear
                },
                SurfaceEffect::Listen(Listener::TouchMove),
                SurfaceEffect::Listen(Listener::TouchEnd),
            ]
        );
    }

    #[test]
    fn move_follows_pointer_and_prevents_default() {
        let mut carousel = carousel(3, CarouselConfig::default());
        carousel.gesture_start(PointerSource::Touch, PointerSample::new(200.0, 50.0), ms(0));
        let dispatch = carousel.gesture_move(PointerSample::new(170.0, 52.0), ms(16));
        assert!(dispatch.prevent_default);
        assert_eq!(
            dispatch.log.outcome,
            GestureOutcome::Tracked { offset: -30.0 }
        );
        assert_eq!(carousel.position(), -30.0);
        assert_eq!(carousel.surface().last_offset(), Some(-30.0));
        assert!(
            carousel
                .surface()
                .effects()
                .contains(&SurfaceEffect::SwipeClass(Some(SwipeDirection::Left)))
        );
    }

    #[test]
    fn vertical_scroll_releases_the_gesture() {
        let mut carousel = carousel(3, CarouselConfig::default());
        carousel.gesture_start(PointerSource::Touch, PointerSample::new(200.0, 50.0), ms(0));
        let dispatch = carousel.gesture_move(PointerSample::new(201.0, 70.0), ms(16));
        assert_eq!(
            dispatch.log.outcome,
            GestureOutcome::Cancelled(CancelReason::VerticalScroll)
        );
        assert!(!dispatch.prevent_default);
        assert!(!carousel.is_dragging());
        assert!(!carousel.coordinator().is_dragging());
        assert!(
            !carousel
                .surface()
                .active_listeners()
                .contains(&Listener::TouchMove)
        );
    }

    #[test]
    fn multi_touch_cancels_and_restores() {
        let mut carousel = carousel(3, CarouselConfig::default());
        carousel.gesture_start(PointerSource::Touch, PointerSample::new(200.0, 50.0), ms(0));
        carousel.gesture_move(PointerSample::new(150.0, 50.0), ms(16));
        let dispatch =
            carousel.gesture_move(PointerSample::new(140.0, 50.0).with_touches(2), ms(32));
        assert_eq!(
            dispatch.log.outcome,
            GestureOutcome::Cancelled(CancelReason::MultiTouch)
        );
        assert_eq!(carousel.position(), 0.0);
        assert_eq!(carousel.index(), 0);
    }

    #[test]
    fn slow_drag_past_half_commits_next() {
        let mut carousel = carousel(3, CarouselConfig::default());
        let dispatch = swipe(&mut carousel, -60.0, 0, 2_000);
        // adjustment = round(5000 * (0 - 60) / (2000 * 25)) = -6
        assert_eq!(
            dispatch.log.outcome,
            GestureOutcome::Committed {
                index: 1,
                offset: -100.0,
                clamped: false,
                edge_abort: false
            }
        );
        assert_eq!(carousel.index(), 1);
        assert_eq!(carousel.position(), -100.0);
        assert!(!carousel.coordinator().is_dragging());
    }

    #[test]
    fn short_slow_drag_snaps_back() {
        let mut carousel = carousel(3, CarouselConfig::default());
        swipe(&mut carousel, -20.0, 0, 2_000);
        assert_eq!(carousel.index(), 0);
        assert_eq!(carousel.position(), 0.0);
    }

    #[test]
    fn flick_respects_one_slide_limit() {
        let mut carousel = carousel(6, CarouselConfig::default().with_one_slide_per_gesture(true));
        let dispatch = swipe(&mut carousel, -80.0, 0, 20);
        assert!(matches!(
            dispatch.log.outcome,
            GestureOutcome::Committed {
                index: 1,
                clamped: true,
                ..
            }
        ));
    }

    #[test]
    fn unlimited_flick_skips_slides() {
        let mut carousel = carousel(6, CarouselConfig::default());
        // adjustment = round(5000 * -80 / (20 * 25)) = -800
        swipe(&mut carousel, -80.0, 0, 20);
        assert_eq!(carousel.index(), 5);
    }

    #[test]
    fn edge_drag_without_parent_returns_to_first_slide() {
        let mut carousel = carousel(3, CarouselConfig::default());
        carousel.gesture_start(PointerSource::Touch, PointerSample::new(100.0, 50.0), ms(0));
        let moved = carousel.gesture_move(PointerSample::new(180.0, 50.0), ms(50));
        let GestureOutcome::Resisted { offset } = moved.log.outcome else {
            panic!("expected resisted move, got {:?}", moved.log.outcome);
        };
        assert!(offset > 0.0 && offset < 80.0);
        let dispatch = carousel.gesture_end(ms(60));
        assert!(matches!(
            dispatch.log.outcome,
            GestureOutcome::Committed {
                index: 0,
                edge_abort: true,
                ..
            }
        ));
        assert_eq!(carousel.position(), 0.0);
    }

    #[test]
    fn rigid_edge_does_not_move_track() {
        let mut carousel = carousel(
            3,
            CarouselConfig::default().with_edge_resistance(EdgeResistance::Rigid),
        );
        carousel.gesture_start(PointerSource::Touch, PointerSample::new(100.0, 50.0), ms(0));
        let moved = carousel.gesture_move(PointerSample::new(180.0, 50.0), ms(50));
        assert_eq!(moved.log.outcome, GestureOutcome::Resisted { offset: 0.0 });
    }

    #[test]
    fn tap_without_move_releases_without_commit() {
        let mut carousel = carousel(3, CarouselConfig::default());
        carousel.gesture_start(PointerSource::Touch, PointerSample::new(100.0, 50.0), ms(0));
        let dispatch = carousel.gesture_end(ms(80));
        assert_eq!(dispatch.log.outcome, GestureOutcome::Released);
        assert!(dispatch.completion.is_none());
    }

    #[test]
    fn second_start_is_ignored() {
        let mut carousel = carousel(3, CarouselConfig::default());
        carousel.gesture_start(PointerSource::Touch, PointerSample::new(100.0, 50.0), ms(0));
        let before = carousel.surface().effects().len();
        let dispatch =
            carousel.gesture_start(PointerSource::Touch, PointerSample::new(10.0, 50.0), ms(5));
        assert_eq!(
            dispatch.log.outcome,
            GestureOutcome::Ignored(IgnoredReason::DragInProgress)
        );
        assert_eq!(carousel.surface().effects().len(), before);
    }

    #[test]
    fn end_without_start_is_ignored() {
        let mut carousel = carousel(3, CarouselConfig::default());
        let dispatch = carousel.gesture_end(ms(10));
        assert_eq!(
            dispatch.log.outcome,
            GestureOutcome::Ignored(IgnoredReason::NoActiveDrag)
        );
    }

    #[test]
    fn completion_fires_callback_after_transition() {
        let fired = Rc::new(Cell::new(None));
        let seen = Rc::clone(&fired);
        let mut carousel = GestureCarousel::builder(
            RecordingSurface::new(WIDTH, 3),
            &DragCoordinator::new(),
        )
        .on_after_swipe(move |snapshot| seen.set(Some(snapshot.index)))
        .build()
        .expect("valid config");

        let dispatch = swipe(&mut carousel, -70.0, 1_000, 1_000);
        let completion = dispatch.completion.expect("commit schedules completion");
        assert!(completion.is_pending());

        assert_eq!(carousel.advance(ms(2_100)), None);
        assert_eq!(fired.get(), None);
        assert_eq!(
            carousel.advance(ms(2_250)),
            Some(CompletionOutcome::Completed)
        );
        assert_eq!(fired.get(), Some(1));
        assert_eq!(completion.outcome(), Some(CompletionOutcome::Completed));
        assert!(
            carousel
                .surface()
                .effects()
                .ends_with(&[SurfaceEffect::SwipeClass(None)])
        );
    }

    #[test]
    fn new_gesture_supersedes_pending_completion() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut carousel = GestureCarousel::builder(
            RecordingSurface::new(WIDTH, 3),
            &DragCoordinator::new(),
        )
        .on_after_swipe(move |_| counter.set(counter.get() + 1))
        .build()
        .expect("valid config");

        let first = swipe(&mut carousel, -70.0, 0, 1_000)
            .completion
            .expect("completion");
        carousel.gesture_start(PointerSource::Touch, PointerSample::new(0.0, 0.0), ms(1_100));
        assert_eq!(first.outcome(), Some(CompletionOutcome::Superseded));
        carousel.gesture_end(ms(1_200));
        assert_eq!(carousel.advance(ms(5_000)), None);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn cancelled_completion_skips_callback() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut carousel = GestureCarousel::builder(
            RecordingSurface::new(WIDTH, 3),
            &DragCoordinator::new(),
        )
        .on_after_swipe(move |_| counter.set(counter.get() + 1))
        .build()
        .expect("valid config");

        let completion = carousel.goto_index(2, true).expect("completion");
        assert!(completion.cancel());
        assert_eq!(
            carousel.advance(ms(1_000)),
            Some(CompletionOutcome::Cancelled)
        );
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn goto_index_round_trips() {
        let mut carousel = carousel(5, CarouselConfig::default());
        for index in [3, 0, 4, 1] {
            carousel.goto_index(index, true);
            assert_eq!(carousel.index(), index);
            assert_eq!(carousel.position(), -(index as f64) * WIDTH);
        }
    }

    #[test]
    fn goto_index_clamps_out_of_range() {
        let mut carousel = carousel(3, CarouselConfig::default());
        carousel.goto_index(10, false);
        assert_eq!(carousel.index(), 2);
    }

    #[test]
    fn goto_position_uses_exact_match() {
        let mut carousel = carousel(5, CarouselConfig::default());
        carousel.goto_position(-300.0, false);
        assert_eq!(carousel.index(), 3);
        carousel.goto_position(-250.0, false);
        assert_eq!(carousel.index(), 3);
        assert_eq!(carousel.position(), -250.0);
    }

    #[test]
    fn unanimated_move_completes_immediately_without_callback() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut carousel = GestureCarousel::builder(
            RecordingSurface::new(WIDTH, 3),
            &DragCoordinator::new(),
        )
        .on_after_swipe(move |_| counter.set(counter.get() + 1))
        .build()
        .expect("valid config");
        let completion = carousel.goto_index(1, false).expect("completion");
        assert_eq!(completion.outcome(), Some(CompletionOutcome::Completed));
        assert!(carousel.pending_completion().is_none());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn goto_element_then_back_restores_position() {
        let mut carousel = GestureCarousel::new(
            RecordingSurface::with_slides(WIDTH, vec![10, 20, 30, 40]),
            CarouselConfig::default(),
            &DragCoordinator::new(),
            InputCapabilities::TOUCH,
        )
        .expect("valid config");
        carousel.goto_index(1, false);
        let previous = carousel.index();
        let before = carousel.position();
        assert!(carousel.goto_element(&40).is_some());
        assert_eq!(carousel.index(), 3);
        carousel.goto_index(previous, true);
        assert_eq!(carousel.position(), before);
        assert!(carousel.goto_element(&99).is_none());
    }

    #[test]
    fn next_and_previous_stop_at_edges() {
        let mut carousel = carousel(2, CarouselConfig::default());
        assert!(carousel.previous().is_none());
        assert!(carousel.next().is_some());
        assert_eq!(carousel.index(), 1);
        assert!(carousel.next().is_none());
        assert!(carousel.previous().is_some());
        assert_eq!(carousel.index(), 0);
    }

    #[test]
    fn reset_jumps_without_transition() {
        let mut carousel = carousel(4, CarouselConfig::default());
        carousel.goto_index(3, true);
        carousel.surface_mut().drain();
        carousel.reset();
        assert_eq!(carousel.index(), 0);
        assert_eq!(
            carousel.surface().effects()[0],
            SurfaceEffect::Transition {
                duration: Duration::ZERO,
                easing: crate::config::Easing::Linear
            }
        );
    }

    #[test]
    fn set_index_is_bookkeeping_only() {
        let mut carousel = carousel(4, CarouselConfig::default());
        carousel.surface_mut().drain();
        carousel.set_index(2);
        assert_eq!(carousel.index(), 2);
        assert_eq!(carousel.position(), -200.0);
        assert!(carousel.surface().effects().is_empty());
    }

    #[test]
    fn resize_realigns_committed_slide() {
        let mut carousel = carousel(4, CarouselConfig::default());
        carousel.goto_index(2, false);
        carousel.surface_mut().set_width(250.0);
        carousel.resize();
        assert_eq!(carousel.viewport_width(), 250.0);
        assert_eq!(carousel.position(), -500.0);
        assert!(
            carousel
                .surface()
                .effects()
                .contains(&SurfaceEffect::SizeTrack { width: 1000.0 })
        );
    }

    #[test]
    fn unload_detaches_everything() {
        let mut carousel = carousel(3, CarouselConfig::default());
        carousel.gesture_start(PointerSource::Touch, PointerSample::new(100.0, 50.0), ms(0));
        carousel.unload();
        assert!(carousel.is_unloaded());
        assert!(carousel.surface().active_listeners().is_empty());
        assert!(!carousel.coordinator().is_dragging());
        assert!(carousel.goto_index(1, true).is_none());
        let dispatch =
            carousel.gesture_start(PointerSource::Touch, PointerSample::new(1.0, 1.0), ms(10));
        assert_eq!(
            dispatch.log.outcome,
            GestureOutcome::Ignored(IgnoredReason::Unloaded)
        );
    }

    #[test]
    fn goto_during_drag_cancels_and_releases() {
        let mut carousel = carousel(3, CarouselConfig::default());
        carousel.gesture_start(PointerSource::Touch, PointerSample::new(200.0, 50.0), ms(0));
        carousel.gesture_move(PointerSample::new(170.0, 50.0), ms(16));
        assert!(carousel.coordinator().is_dragging());

        assert!(carousel.goto_index(2, false).is_some());
        assert!(!carousel.is_dragging());
        assert!(!carousel.coordinator().is_dragging());
        assert_eq!(carousel.index(), 2);
        assert_eq!(carousel.position(), -200.0);
        assert_eq!(carousel.surface().last_offset(), Some(-200.0));
        assert!(
            !carousel
                .surface()
                .active_listeners()
                .contains(&Listener::TouchMove)
        );

        let late = carousel.gesture_move(PointerSample::new(150.0, 50.0), ms(32));
        assert_eq!(
            late.log.outcome,
            GestureOutcome::Ignored(IgnoredReason::NoActiveDrag)
        );
        assert_eq!(carousel.position(), -200.0);
    }

    #[test]
    fn resize_during_drag_cancels_and_realigns() {
        let mut carousel = carousel(3, CarouselConfig::default());
        carousel.goto_index(1, false);
        carousel.gesture_start(PointerSource::Touch, PointerSample::new(200.0, 50.0), ms(0));
        carousel.gesture_move(PointerSample::new(230.0, 50.0), ms(16));
        assert_eq!(carousel.position(), -70.0);

        carousel.surface_mut().set_width(80.0);
        carousel.resize();
        assert!(!carousel.is_dragging());
        assert!(!carousel.coordinator().is_dragging());
        assert_eq!(carousel.index(), 1);
        assert_eq!(carousel.viewport_width(), 80.0);
        assert_eq!(carousel.position(), -80.0);
        assert_eq!(carousel.surface().last_offset(), Some(-80.0));

        let end = carousel.gesture_end(ms(40));
        assert_eq!(
            end.log.outcome,
            GestureOutcome::Ignored(IgnoredReason::NoActiveDrag)
        );
    }
}
