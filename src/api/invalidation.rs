use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::trace;

use crate::platform::Waker;

/// Per-surface redraw request shared between the draw thread and background
/// callbacks.
///
/// Every mark bumps a monotonic request generation. A draw pass snapshots the
/// generation with [`DirtyFlag::begin_draw`] and, once it succeeded, records it
/// with [`DirtyFlag::complete_draw`]. Marks that land while a draw is in flight
/// therefore keep the surface dirty, and any number of marks between two draws
/// still produce a single redraw.
#[derive(Clone)]
pub struct DirtyFlag {
    inner: Arc<DirtyState>,
}

struct DirtyState {
    requested: AtomicU64,
    drawn: AtomicU64,
    frames: AtomicU64,
    waker: OnceLock<Waker>,
}

/// Generation snapshot taken at the start of a draw pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a draw ticket must be completed to clear the dirty flag"]
pub struct DrawTicket {
    generation: u64,
}

impl Default for DirtyFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl DirtyFlag {
    /// New flags start dirty so a fresh surface gets its first frame.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DirtyState {
                requested: AtomicU64::new(1),
                drawn: AtomicU64::new(0),
                frames: AtomicU64::new(0),
                waker: OnceLock::new(),
            }),
        }
    }

    /// Installs the host wake primitive. Only the first call takes effect.
    pub fn set_waker(&self, waker: Waker) {
        let _ = self.inner.waker.set(waker);
    }

    /// Requests a redraw. Returns `true` when the surface was clean before,
    /// in which case the host is woken.
    pub fn mark(&self) -> bool {
        let previous = self.inner.requested.fetch_add(1, Ordering::AcqRel);
        // Read after the increment: a draw completing in between can only
        // cause a spare wake, never a lost one.
        let drawn = self.inner.drawn.load(Ordering::Acquire);
        let was_clean = previous == drawn;
        if was_clean {
            trace!(generation = previous + 1, "surface marked dirty");
            if let Some(waker) = self.inner.waker.get() {
                waker.wake();
            }
        }
        was_clean
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.inner.requested.load(Ordering::Acquire) != self.inner.drawn.load(Ordering::Acquire)
    }

    pub fn begin_draw(&self) -> DrawTicket {
        DrawTicket {
            generation: self.inner.requested.load(Ordering::Acquire),
        }
    }

    /// Records a successful draw covering every request up to `ticket`.
    pub fn complete_draw(&self, ticket: DrawTicket) {
        self.inner
            .drawn
            .fetch_max(ticket.generation, Ordering::AcqRel);
        self.inner.frames.fetch_add(1, Ordering::AcqRel);
    }

    /// Drops pending requests without drawing.
    pub fn clear(&self) {
        let requested = self.inner.requested.load(Ordering::Acquire);
        self.inner.drawn.fetch_max(requested, Ordering::AcqRel);
    }

    /// Number of completed draw passes.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.inner.frames.load(Ordering::Acquire)
    }

    /// Monotonic request generation, bumped by every mark.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.requested.load(Ordering::Acquire)
    }
}

impl fmt::Debug for DirtyFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirtyFlag")
            .field("dirty", &self.is_dirty())
            .field("generation", &self.generation())
            .field("frames", &self.frame_count())
            .finish()
    }
}
