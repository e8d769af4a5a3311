pub mod aspect;
pub mod layout;
pub mod matrix;
pub mod series;
pub mod ticks;
pub mod transform;
pub mod types;

pub use aspect::AspectPolicy;
pub use layout::{CellSpec, DEFAULT_LAYOUT_PAD, LayoutPadding, grid_bounds};
pub use matrix::AffineMatrix4;
pub use series::{
    Artifact, ArtifactKind, ReferenceLine, ReferenceOrientation, Series, SeriesKind, SeriesStyle,
    data_bounds,
};
pub use ticks::{DEFAULT_MAX_H_TICKS, DEFAULT_MAX_V_TICKS, Tick, TickSet, gen_ticks};
pub use transform::{
    CoordinateTransform, DEFAULT_RENORMALIZATION_BITS, LimitsUpdate, MIN_HALF_EXTENT,
};
pub use types::{
    ArtifactId, DataPoint, LabelId, PixelRect, PlotId, Rect, ScreenPoint, SurfaceId, Viewport,
};
