//! gridplot: grid-laid-out 2-D plots with precision-stable panning.
//!
//! Plots live in a [`Figure`], which lays them out on a grid, links shared
//! axes and issues draw calls through a [`render::RenderBackend`]. A
//! [`FrameScheduler`] drives any number of figures off host events and
//! per-surface dirty flags.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod platform;
pub mod render;
pub mod telemetry;

pub use api::{Figure, FigureConfig, FrameScheduler, PlotOptions, SchedulerConfig};
pub use error::{PlotError, PlotResult};
