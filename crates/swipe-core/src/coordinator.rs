#![forbid(unsafe_code)]

//! Cooperative drag exclusion between carousels sharing one document.
//!
//! Nested carousels receive the same physical gesture (the start event
//! bubbles from the innermost track outwards). A [`DragCoordinator`] is the
//! shared token that decides which one interprets it: the first carousel to
//! call [`try_acquire`](DragCoordinator::try_acquire) wins, everyone else is
//! ignored until the winning [`DragToken`] is dropped.
//!
//! # Invariants
//!
//! 1. At most one [`DragToken`] exists per coordinator at any time.
//! 2. Dropping the token is the only way to release the drag.
//! 3. All clones of a coordinator observe the same state.
//! 4. An interrupt flag only outlives the token it was raised against until
//!    the next acquire.

use std::cell::Cell;
use std::rc::Rc;

/// Identity of a carousel within one coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CarouselId(u32);

impl CarouselId {
    /// Rebuild an id from [`get`](Self::get), e.g. after it crossed a JS
    /// boundary. Lookups with an id no coordinator issued simply miss.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw numeric id.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for CarouselId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "carousel#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct CoordinatorState {
    active: Cell<Option<CarouselId>>,
    interrupted: Cell<bool>,
    next_id: Cell<u32>,
}

/// Shared "someone is dragging" state.
///
/// Cloning is cheap and yields a handle to the same state. Single-threaded
/// by construction: all carousels of a document run on its event turn.
#[derive(Debug, Clone, Default)]
pub struct DragCoordinator {
    state: Rc<CoordinatorState>,
}

impl DragCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh carousel id.
    pub fn register(&self) -> CarouselId {
        let id = self.state.next_id.get();
        self.state.next_id.set(id.saturating_add(1));
        CarouselId(id)
    }

    /// Claim the drag for `owner`. Returns `None` while another token is live.
    #[must_use]
    pub fn try_acquire(&self, owner: CarouselId) -> Option<DragToken> {
        if self.state.active.get().is_some() {
            return None;
        }
        self.state.active.set(Some(owner));
        self.state.interrupted.set(false);
        Some(DragToken {
            owner,
            state: Rc::clone(&self.state),
        })
    }

    /// Carousel currently holding the drag.
    #[must_use]
    pub fn active(&self) -> Option<CarouselId> {
        self.state.active.get()
    }

    /// Whether any carousel is dragging.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.active().is_some()
    }

    /// Ask the current owner to give the gesture up.
    ///
    /// Raised by a carousel whose track was being steered on the owner's
    /// behalf when something else takes that track. The owner sees it on its
    /// next event. Returns `false` when nobody is dragging.
    pub fn interrupt(&self) -> bool {
        if self.state.active.get().is_none() {
            return false;
        }
        self.state.interrupted.set(true);
        true
    }

    /// Whether `other` shares state with `self`.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

/// Proof of drag ownership. Releases the drag on drop.
#[derive(Debug)]
pub struct DragToken {
    owner: CarouselId,
    state: Rc<CoordinatorState>,
}

impl DragToken {
    #[must_use]
    pub const fn owner(&self) -> CarouselId {
        self.owner
    }

    /// Whether [`DragCoordinator::interrupt`] was called during this drag.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.state.active.get() == Some(self.owner) && self.state.interrupted.get()
    }
}

impl Drop for DragToken {
    fn drop(&mut self) {
        if self.state.active.get() == Some(self.owner) {
            self.state.active.set(None);
            self.state.interrupted.set(false);
        }
    }
}
