use std::sync::mpsc::{self, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PlotError, PlotResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodicId(u32);

impl PeriodicId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Invocation details handed to a periodic callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTick {
    /// Zero-based count of invocations so far.
    pub index: u64,
    /// Target instant this invocation stands for.
    pub scheduled: Instant,
    /// How far behind `scheduled` the invocation actually ran.
    pub lateness: Duration,
}

/// Fixed-interval callback running on its own thread.
///
/// Missed targets are caught up in order before the worker sleeps until the
/// next one. Stopping is observed between invocations; the worker is joined
/// on [`PeriodicTask::stop`] or drop.
#[derive(Debug)]
pub struct PeriodicTask {
    interval: Duration,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    pub fn spawn<F>(name: &str, interval: Duration, mut callback: F) -> PlotResult<Self>
    where
        F: FnMut(PeriodicTick) + Send + 'static,
    {
        if interval.is_zero() {
            return Err(PlotError::Config(
                "periodic interval must be > 0".to_owned(),
            ));
        }
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                let mut index = 0_u64;
                let mut next = Instant::now() + interval;
                loop {
                    let now = Instant::now();
                    while next <= now {
                        if stop_requested(&stop_rx) {
                            return;
                        }
                        callback(PeriodicTick {
                            index,
                            scheduled: next,
                            lateness: now.saturating_duration_since(next),
                        });
                        index += 1;
                        next += interval;
                    }
                    match stop_rx.recv_timeout(next.saturating_duration_since(Instant::now())) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
            })
            .map_err(|e| PlotError::Scheduler(format!("failed to spawn `{name}`: {e}")))?;
        debug!(task = name, interval_ms = interval.as_millis(), "periodic task started");

        Ok(Self {
            interval,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Signals the worker and waits for the invocation in flight to return.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("periodic callback panicked");
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.stop();
    }
}

fn stop_requested(stop_rx: &mpsc::Receiver<()>) -> bool {
    matches!(
        stop_rx.try_recv(),
        Ok(()) | Err(TryRecvError::Disconnected)
    )
}
