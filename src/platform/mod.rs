//! Narrow interface to the host windowing/event toolkit.
//!
//! The crate never creates windows itself. A host adapter delivers
//! [`InputEvent`]s tagged with the surface they belong to and exposes a wake
//! primitive that background work uses to make the scheduler re-poll promptly.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::SurfaceId;
use crate::interaction::InputEvent;

/// Thread-safe "post empty event" primitive provided by the host.
#[derive(Clone)]
pub struct Waker(Arc<dyn Fn() + Send + Sync>);

impl Waker {
    #[must_use]
    pub fn new(wake: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(wake))
    }

    #[must_use]
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    pub fn wake(&self) {
        (self.0)();
    }
}

impl fmt::Debug for Waker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Waker").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostEvent {
    pub surface: SurfaceId,
    pub event: InputEvent,
}

impl HostEvent {
    #[must_use]
    pub const fn new(surface: SurfaceId, event: InputEvent) -> Self {
        Self { surface, event }
    }
}

pub trait WindowHost {
    /// Drains pending input without blocking.
    fn poll_events(&mut self) -> Vec<HostEvent>;

    fn waker(&self) -> Waker;
}

/// Queue-backed host for tests and offscreen use.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    queue: Arc<Mutex<VecDeque<HostEvent>>>,
    wakeups: Arc<AtomicU64>,
}

impl HeadlessHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues an event; safe to call from any thread through a clone.
    pub fn push(&self, surface: SurfaceId, event: InputEvent) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(HostEvent::new(surface, event));
        }
        self.wakeups.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of wake requests observed so far.
    #[must_use]
    pub fn wake_count(&self) -> u64 {
        self.wakeups.load(Ordering::Acquire)
    }
}

impl WindowHost for HeadlessHost {
    fn poll_events(&mut self) -> Vec<HostEvent> {
        match self.queue.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn waker(&self) -> Waker {
        let wakeups = Arc::clone(&self.wakeups);
        Waker::new(move || {
            wakeups.fetch_add(1, Ordering::AcqRel);
        })
    }
}
