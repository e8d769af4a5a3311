use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::SurfaceId;
use crate::error::{PlotError, PlotResult};
use crate::interaction::InputEvent;
use crate::platform::WindowHost;
use crate::render::RenderBackend;

use super::Figure;
use super::invalidation::DirtyFlag;
use super::periodic::{PeriodicId, PeriodicTask, PeriodicTick};

/// Something the scheduler can poll, dispatch events to and draw.
pub trait Surface {
    fn dirty_flag(&self) -> &DirtyFlag;

    /// `true` while the surface must redraw every iteration.
    fn has_animated_content(&self) -> bool {
        false
    }

    /// `false` while the surface cannot present (e.g. minimized).
    fn is_drawable(&self) -> bool {
        true
    }

    fn handle_event(&mut self, event: InputEvent) -> PlotResult<()>;

    /// Runs before the draw ticket is taken; pending handoff data lands here.
    fn prepare_draw(&mut self) {}

    fn draw(&mut self, now: Instant) -> PlotResult<()>;

    fn should_close(&self) -> bool;

    /// Draws when dirty or animated. Returns `true` when a frame was drawn.
    ///
    /// A failed draw is logged and leaves the surface dirty.
    fn render_if_needed(&mut self, now: Instant) -> bool {
        if !self.is_drawable() {
            return false;
        }
        self.prepare_draw();
        let flag = self.dirty_flag().clone();
        if !flag.is_dirty() && !self.has_animated_content() {
            return false;
        }
        let ticket = flag.begin_draw();
        match self.draw(now) {
            Ok(()) => {
                flag.complete_draw(ticket);
                true
            }
            Err(err) => {
                warn!(error = %err, "surface draw failed");
                false
            }
        }
    }
}

impl<B: RenderBackend> Surface for Figure<B> {
    fn dirty_flag(&self) -> &DirtyFlag {
        &self.dirty
    }

    fn has_animated_content(&self) -> bool {
        self.animated
    }

    fn is_drawable(&self) -> bool {
        !self.iconified
    }

    fn handle_event(&mut self, event: InputEvent) -> PlotResult<()> {
        Figure::handle_event(self, event)
    }

    fn prepare_draw(&mut self) {
        self.apply_pending_feeds();
    }

    fn draw(&mut self, _now: Instant) -> PlotResult<()> {
        self.render_frame()
    }

    fn should_close(&self) -> bool {
        self.close_requested
    }
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn dirty_flag(&self) -> &DirtyFlag {
        (**self).dirty_flag()
    }

    fn has_animated_content(&self) -> bool {
        (**self).has_animated_content()
    }

    fn is_drawable(&self) -> bool {
        (**self).is_drawable()
    }

    fn handle_event(&mut self, event: InputEvent) -> PlotResult<()> {
        (**self).handle_event(event)
    }

    fn prepare_draw(&mut self) {
        (**self).prepare_draw();
    }

    fn draw(&mut self, now: Instant) -> PlotResult<()> {
        (**self).draw(now)
    }

    fn should_close(&self) -> bool {
        (**self).should_close()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Sleep applied by [`FrameScheduler::run`] after an iteration that drew
    /// nothing.
    #[serde(default = "default_idle_sleep")]
    pub idle_sleep: Duration,
    /// Window over which the FPS estimate is averaged.
    #[serde(default = "default_fps_window")]
    pub fps_window: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_sleep: default_idle_sleep(),
            fps_window: default_fps_window(),
        }
    }
}

impl SchedulerConfig {
    #[must_use]
    pub fn with_idle_sleep(mut self, idle_sleep: Duration) -> Self {
        self.idle_sleep = idle_sleep;
        self
    }

    #[must_use]
    pub fn with_fps_window(mut self, fps_window: Duration) -> Self {
        self.fps_window = fps_window;
        self
    }

    pub fn validate(self) -> PlotResult<Self> {
        if self.fps_window.is_zero() {
            return Err(PlotError::Config("fps window must be > 0".to_owned()));
        }
        Ok(self)
    }
}

fn default_idle_sleep() -> Duration {
    Duration::from_millis(5)
}

fn default_fps_window() -> Duration {
    Duration::from_millis(200)
}

/// Rolling frames-per-second estimate over fixed windows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsEstimator {
    window: Duration,
    window_start: Option<Instant>,
    frames: u64,
    fps: f64,
}

impl FpsEstimator {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            window_start: None,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Adds `frames` drawn at `now`; publishes a new estimate once the window
    /// has elapsed.
    pub fn record(&mut self, now: Instant, frames: u64) {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            self.frames = frames;
            return;
        };
        self.frames += frames;
        let elapsed = now.saturating_duration_since(start);
        if elapsed >= self.window {
            self.fps = self.frames as f64 / elapsed.as_secs_f64();
            self.frames = 0;
            self.window_start = Some(now);
        }
    }

    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }
}

/// Cloneable handle that ends [`FrameScheduler::run`] from anywhere.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IterationReport {
    pub events: usize,
    pub drawn: usize,
    pub closed: usize,
}

/// Single-threaded event/draw loop over a set of surfaces.
///
/// The scheduler owns its surfaces and its periodic tasks; nothing is kept
/// in process globals. Periodic callbacks talk to surfaces only through
/// [`DirtyFlag`] marks and handoff slots.
pub struct FrameScheduler<H: WindowHost, S: Surface> {
    host: H,
    config: SchedulerConfig,
    surfaces: IndexMap<SurfaceId, S>,
    periodic: IndexMap<PeriodicId, PeriodicTask>,
    fps: FpsEstimator,
    stop: StopHandle,
    next_surface_id: u32,
    next_periodic_id: u32,
}

impl<H: WindowHost, S: Surface> FrameScheduler<H, S> {
    pub fn new(host: H, config: SchedulerConfig) -> PlotResult<Self> {
        let config = config.validate()?;
        Ok(Self {
            host,
            config,
            surfaces: IndexMap::new(),
            periodic: IndexMap::new(),
            fps: FpsEstimator::new(config.fps_window),
            stop: StopHandle::default(),
            next_surface_id: 1,
            next_periodic_id: 1,
        })
    }

    #[must_use]
    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Takes ownership of a surface and wires its dirty flag to the host wake
    /// primitive.
    pub fn register_surface(&mut self, surface: S) -> SurfaceId {
        surface.dirty_flag().set_waker(self.host.waker());
        let id = SurfaceId::new(self.next_surface_id);
        self.next_surface_id += 1;
        self.surfaces.insert(id, surface);
        debug!(surface = id.raw(), "surface registered");
        id
    }

    pub fn remove_surface(&mut self, id: SurfaceId) -> Option<S> {
        self.surfaces.shift_remove(&id)
    }

    #[must_use]
    pub fn surface(&self, id: SurfaceId) -> Option<&S> {
        self.surfaces.get(&id)
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> Option<&mut S> {
        self.surfaces.get_mut(&id)
    }

    #[must_use]
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Starts a fixed-interval callback owned by this scheduler.
    pub fn add_periodic<F>(&mut self, interval: Duration, callback: F) -> PlotResult<PeriodicId>
    where
        F: FnMut(PeriodicTick) + Send + 'static,
    {
        let id = PeriodicId::new(self.next_periodic_id);
        let name = format!("gridplot-periodic-{}", id.raw());
        let task = PeriodicTask::spawn(&name, interval, callback)?;
        self.next_periodic_id += 1;
        self.periodic.insert(id, task);
        Ok(id)
    }

    /// Stops and joins a periodic callback. Returns `false` for unknown ids.
    pub fn stop_periodic(&mut self, id: PeriodicId) -> bool {
        match self.periodic.shift_remove(&id) {
            Some(mut task) => {
                task.stop();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn periodic_count(&self) -> usize {
        self.periodic.len()
    }

    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps.fps()
    }

    pub fn run_iteration(&mut self) -> IterationReport {
        self.run_iteration_at(Instant::now())
    }

    /// Polls and dispatches host events, drops surfaces that asked to close
    /// and draws every surface that is dirty or animated.
    pub fn run_iteration_at(&mut self, now: Instant) -> IterationReport {
        let mut report = IterationReport::default();

        let events = self.host.poll_events();
        report.events = events.len();
        for host_event in events {
            let Some(surface) = self.surfaces.get_mut(&host_event.surface) else {
                trace!(surface = host_event.surface.raw(), "event for unknown surface");
                continue;
            };
            if let Err(err) = surface.handle_event(host_event.event) {
                warn!(
                    surface = host_event.surface.raw(),
                    error = %err,
                    "event dispatch failed"
                );
            }
        }

        let before = self.surfaces.len();
        self.surfaces.retain(|id, surface| {
            let keep = !surface.should_close();
            if !keep {
                debug!(surface = id.raw(), "surface closed");
            }
            keep
        });
        report.closed = before - self.surfaces.len();

        for surface in self.surfaces.values_mut() {
            if surface.render_if_needed(now) {
                report.drawn += 1;
            }
        }
        self.fps.record(now, report.drawn as u64);
        report
    }

    /// Loops until every surface closed or the stop handle fired, sleeping
    /// briefly after iterations that drew nothing.
    pub fn run(&mut self) {
        while !self.stop.is_stopped() && !self.surfaces.is_empty() {
            let report = self.run_iteration();
            if report.drawn == 0 {
                thread::sleep(self.config.idle_sleep);
            }
        }
        debug!(remaining = self.surfaces.len(), "frame scheduler stopped");
    }

    /// Stops and joins every periodic callback.
    pub fn shutdown(&mut self) {
        for (_, mut task) in self.periodic.drain(..) {
            task.stop();
        }
    }
}

impl<H: WindowHost, S: Surface> Drop for FrameScheduler<H, S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
