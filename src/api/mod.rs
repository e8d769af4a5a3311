mod draw_pass;
mod figure;
mod figure_config;
mod handoff;
mod interaction_controller;
mod invalidation;
mod label;
mod periodic;
mod plot;
mod scheduler;
mod shared_axis;
mod view_controller;

pub use figure::{Figure, PointerHit};
pub use figure_config::{
    DEFAULT_ZOOM_TO_FIT_MARGIN, FIGURE_CONFIG_JSON_SCHEMA_V1, FigureConfig, PlotGutter,
    PlotOptions,
};
pub use handoff::SeriesFeed;
pub use invalidation::{DirtyFlag, DrawTicket};
pub use label::{FlexLabel, Label};
pub use periodic::{PeriodicId, PeriodicTask, PeriodicTick};
pub use plot::{DEFAULT_PLOT_LIMITS, DEFAULT_POINT_SIZE, Plot, XLabelSide, YLabelSide};
pub use scheduler::{
    FpsEstimator, FrameScheduler, IterationReport, SchedulerConfig, StopHandle, Surface,
};
pub use shared_axis::{Axis, SharedAxisGroup};
