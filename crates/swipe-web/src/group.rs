#![forbid(unsafe_code)]

//! Every carousel on one page, behind one event router.
//!
//! A [`CarouselGroup`] owns the page's [`DragCoordinator`] and one
//! [`CarouselHandle`] per carousel. The host forwards raw DOM events as
//! [`HostEvent`]s; the group delivers them the way the DOM would:
//!
//! - **Start** events bubble: the carousel whose track was hit gets the event
//!   first, then its parent, grandparent, and so on. The first one to take
//!   the drag wins; the rest see it as already taken.
//! - **Move/end/cancel** events go to whichever carousel holds the drag.
//! - **Resize** reaches every carousel.
//! - **Tick** advances pending completions.
//!
//! # Invariants
//!
//! 1. A parent is always registered before its children.
//! 2. Removing a carousel unloads it first.

use core::time::Duration;

use swipe_core::{
    CarouselConfig, CarouselError, CarouselHandle, CarouselId, CompletionOutcome,
    DragCoordinator, GestureCarousel, GestureDispatch, GestureLogEntry, InputCapabilities,
    PointerSample, PointerSource, SwipeCompletion,
};

use crate::{DomCommand, WebSurface};

#[cfg(feature = "tracing")]
use tracing::debug;

/// Raw host event, already normalized to page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// `touchstart` / `mousedown` on the track of `target`.
    PointerDown {
        target: CarouselId,
        source: PointerSource,
        sample: PointerSample,
        now: Duration,
    },
    /// `touchmove` / `mousemove` on the window.
    PointerMove { sample: PointerSample, now: Duration },
    /// `touchend` / `mouseup` on the window.
    PointerUp { now: Duration },
    /// `touchcancel`, or the host lost the pointer.
    PointerCancel { now: Duration },
    /// `resize` / `orientationchange`. Measure surfaces before sending.
    Resize,
    /// Animation-frame tick.
    Tick { now: Duration },
}

/// Failure to register or address a carousel.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupError {
    UnknownCarousel(CarouselId),
    UnknownParent(CarouselId),
    Carousel(CarouselError),
}

impl core::fmt::Display for GroupError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownCarousel(id) => write!(f, "unknown carousel: {id}"),
            Self::UnknownParent(id) => write!(f, "unknown parent carousel: {id}"),
            Self::Carousel(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for GroupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Carousel(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CarouselError> for GroupError {
    fn from(err: CarouselError) -> Self {
        Self::Carousel(err)
    }
}

/// Result of routing one [`HostEvent`].
#[derive(Debug, Clone, Default)]
pub struct GroupDispatch {
    /// The host should call `preventDefault()` on the DOM event.
    pub prevent_default: bool,
    /// Carousel that handled the event, if any.
    pub handled_by: Option<CarouselId>,
    /// Completion of the move the event started, if any.
    pub completion: Option<SwipeCompletion>,
    /// One entry per carousel the event reached, in delivery order.
    pub log: Vec<GestureLogEntry>,
    /// Completions retired by a tick.
    pub retired: Vec<(CarouselId, CompletionOutcome)>,
}

impl GroupDispatch {
    fn absorb(&mut self, dispatch: GestureDispatch) {
        let handled = !dispatch.is_ignored();
        if handled && self.handled_by.is_none() {
            self.handled_by = Some(dispatch.log.carousel);
        }
        self.prevent_default |= dispatch.prevent_default;
        if dispatch.completion.is_some() {
            self.completion = dispatch.completion;
        }
        self.log.push(dispatch.log);
    }
}

#[derive(Debug)]
struct Member {
    id: CarouselId,
    parent: Option<CarouselId>,
    handle: CarouselHandle<WebSurface>,
}

/// Router for every carousel on one page.
#[derive(Debug, Default)]
pub struct CarouselGroup {
    coordinator: DragCoordinator,
    capabilities: InputCapabilities,
    members: Vec<Member>,
}

impl CarouselGroup {
    #[must_use]
    pub fn new(capabilities: InputCapabilities) -> Self {
        Self {
            coordinator: DragCoordinator::new(),
            capabilities,
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn coordinator(&self) -> &DragCoordinator {
        &self.coordinator
    }

    /// Build a carousel over `surface`, optionally nested in `parent`.
    pub fn add(
        &mut self,
        surface: WebSurface,
        config: CarouselConfig,
        parent: Option<CarouselId>,
    ) -> Result<CarouselId, GroupError> {
        let mut builder = GestureCarousel::builder(surface, &self.coordinator)
            .config(config)
            .capabilities(self.capabilities);
        if let Some(parent_id) = parent {
            let parent_handle = self
                .get(parent_id)
                .ok_or(GroupError::UnknownParent(parent_id))?;
            builder = builder.parent(parent_handle);
        }
        let handle = builder.build()?.into_handle();
        let id = handle.borrow().id();
        #[cfg(feature = "tracing")]
        debug!(carousel = %id, ?parent, "carousel added");
        self.members.push(Member { id, parent, handle });
        Ok(id)
    }

    /// Unload and forget a carousel. Its children keep working without
    /// delegation.
    pub fn remove(&mut self, id: CarouselId) -> Result<(), GroupError> {
        let position = self
            .members
            .iter()
            .position(|member| member.id == id)
            .ok_or(GroupError::UnknownCarousel(id))?;
        let member = self.members.remove(position);
        member.handle.borrow_mut().unload();
        for child in self.members.iter_mut().filter(|m| m.parent == Some(id)) {
            child.parent = None;
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: CarouselId) -> Option<&CarouselHandle<WebSurface>> {
        self.members
            .iter()
            .find(|member| member.id == id)
            .map(|member| &member.handle)
    }

    /// Ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = CarouselId> + '_ {
        self.members.iter().map(|member| member.id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Take the DOM commands queued by one carousel.
    pub fn drain_commands(&self, id: CarouselId) -> Result<Vec<DomCommand>, GroupError> {
        let handle = self.get(id).ok_or(GroupError::UnknownCarousel(id))?;
        let commands = handle.borrow_mut().surface_mut().drain_commands();
        Ok(commands)
    }

    /// `target`, then each ancestor, innermost first.
    fn bubble_path(&self, target: CarouselId) -> Vec<CarouselId> {
        let mut path = Vec::new();
        let mut next = Some(target);
        while let Some(id) = next {
            let Some(member) = self.members.iter().find(|member| member.id == id) else {
                break;
            };
            if path.contains(&id) {
                break;
            }
            path.push(id);
            next = member.parent;
        }
        path
    }

    fn drag_owner(&self) -> Option<&CarouselHandle<WebSurface>> {
        self.coordinator.active().and_then(|id| self.get(id))
    }

    /// Deliver one host event.
    pub fn dispatch(&self, event: HostEvent) -> Result<GroupDispatch, GroupError> {
        let mut out = GroupDispatch::default();
        match event {
            HostEvent::PointerDown {
                target,
                source,
                sample,
                now,
            } => {
                let path = self.bubble_path(target);
                if path.is_empty() {
                    return Err(GroupError::UnknownCarousel(target));
                }
                for id in path {
                    if let Some(handle) = self.get(id) {
                        let dispatch = handle.borrow_mut().gesture_start(source, sample, now);
                        out.absorb(dispatch);
                    }
                }
            }
            HostEvent::PointerMove { sample, now } => {
                if let Some(handle) = self.drag_owner() {
                    let dispatch = handle.borrow_mut().gesture_move(sample, now);
                    out.absorb(dispatch);
                }
            }
            HostEvent::PointerUp { now } => {
                if let Some(handle) = self.drag_owner() {
                    let dispatch = handle.borrow_mut().gesture_end(now);
                    out.absorb(dispatch);
                }
            }
            HostEvent::PointerCancel { now } => {
                if let Some(handle) = self.drag_owner() {
                    let dispatch = handle.borrow_mut().gesture_cancel(now);
                    out.absorb(dispatch);
                }
            }
            HostEvent::Resize => {
                for member in &self.members {
                    member.handle.borrow_mut().resize();
                }
            }
            HostEvent::Tick { now } => {
                for member in &self.members {
                    if let Some(outcome) = member.handle.borrow_mut().advance(now) {
                        out.retired.push((member.id, outcome));
                    }
                }
            }
        }
        #[cfg(feature = "tracing")]
        if out.handled_by.is_none() && !out.log.is_empty() {
            debug!(?event, "host event not handled by any carousel");
        }
        Ok(out)
    }
}
