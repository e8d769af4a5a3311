use serde::{Deserialize, Serialize};

use crate::core::transform::CoordinateTransform;
use crate::core::types::{DataPoint, Rect};
use crate::error::{PlotError, PlotResult};
use crate::render::Color;

/// Drawing style shared by every artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    #[serde(default)]
    pub color: Color,
    /// Polyline width in pixels; `None` draws no connecting line.
    #[serde(default = "default_line_width")]
    pub line_width: Option<f64>,
    /// Marker size in pixels; `None` draws no markers.
    #[serde(default)]
    pub point_size: Option<f64>,
}

fn default_line_width() -> Option<f64> {
    Some(1.0)
}

impl Default for SeriesStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            line_width: default_line_width(),
            point_size: None,
        }
    }
}

impl SeriesStyle {
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_line_width(mut self, width: Option<f64>) -> Self {
        self.line_width = width;
        self
    }

    #[must_use]
    pub fn with_point_size(mut self, size: Option<f64>) -> Self {
        self.point_size = size;
        self
    }

    pub fn validate(self) -> PlotResult<Self> {
        self.color.validate()?;
        for (name, value) in [("line_width", self.line_width), ("point_size", self.point_size)] {
            if let Some(value) = value
                && (!value.is_finite() || value <= 0.0)
            {
                return Err(PlotError::InvalidData(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesKind {
    /// Straight segments between consecutive samples.
    Lines,
    /// Horizontal-then-vertical staircase between consecutive samples.
    Steps,
}

/// A sampled curve whose vertices are cached in renormalized `f32` space.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    kind: SeriesKind,
    points: Vec<DataPoint>,
    style: SeriesStyle,
    renormalized: Vec<[f32; 2]>,
}

impl Series {
    #[must_use]
    pub fn new(kind: SeriesKind, points: Vec<DataPoint>, style: SeriesStyle) -> Self {
        Self {
            kind,
            points,
            style,
            renormalized: Vec::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    #[must_use]
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    #[must_use]
    pub fn style(&self) -> SeriesStyle {
        self.style
    }

    pub fn set_points(&mut self, points: Vec<DataPoint>) {
        self.points = points;
    }

    /// Vertices in renormalized space; non-finite samples become `NaN` breaks.
    #[must_use]
    pub fn renormalized_vertices(&self) -> &[[f32; 2]] {
        &self.renormalized
    }

    pub fn renormalize(&mut self, transform: &CoordinateTransform) {
        let map = |p: DataPoint| -> [f32; 2] {
            if p.is_finite() {
                let (x, y) = transform.renormalize_point(p);
                [x as f32, y as f32]
            } else {
                [f32::NAN, f32::NAN]
            }
        };

        self.renormalized.clear();
        match self.kind {
            SeriesKind::Lines => self.renormalized.extend(self.points.iter().copied().map(map)),
            SeriesKind::Steps => {
                self.renormalized.reserve(self.points.len() * 2);
                for (index, point) in self.points.iter().copied().enumerate() {
                    if index > 0 {
                        let previous = self.points[index - 1];
                        self.renormalized
                            .push(map(DataPoint::new(point.x, previous.y)));
                    }
                    self.renormalized.push(map(point));
                }
            }
        }
    }

    /// Bounding box of all finite coordinates, computed per axis.
    #[must_use]
    pub fn data_bounds(&self) -> Option<Rect> {
        data_bounds(&self.points)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceOrientation {
    Horizontal,
    Vertical,
}

/// Infinite horizontal or vertical line at a fixed data coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLine {
    orientation: ReferenceOrientation,
    value: f64,
    style: SeriesStyle,
}

impl ReferenceLine {
    #[must_use]
    pub fn new(orientation: ReferenceOrientation, value: f64, style: SeriesStyle) -> Self {
        Self {
            orientation,
            value,
            style,
        }
    }

    #[must_use]
    pub fn orientation(&self) -> ReferenceOrientation {
        self.orientation
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn style(&self) -> SeriesStyle {
        self.style
    }

    /// Renormalized endpoints spanning the current view, or `None` when the
    /// line lies outside it.
    #[must_use]
    pub fn renormalized_segment(&self, transform: &CoordinateTransform) -> Option<[[f32; 2]; 2]> {
        let limits = transform.limits();
        let (a, b) = match self.orientation {
            ReferenceOrientation::Horizontal => {
                if self.value < limits.b || self.value > limits.t {
                    return None;
                }
                (
                    DataPoint::new(limits.l, self.value),
                    DataPoint::new(limits.r, self.value),
                )
            }
            ReferenceOrientation::Vertical => {
                if self.value < limits.l || self.value > limits.r {
                    return None;
                }
                (
                    DataPoint::new(self.value, limits.b),
                    DataPoint::new(self.value, limits.t),
                )
            }
        };
        let (ax, ay) = transform.renormalize_point(a);
        let (bx, by) = transform.renormalize_point(b);
        Some([[ax as f32, ay as f32], [bx as f32, by as f32]])
    }
}

/// One drawable item owned by a plot.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactKind {
    Series(Series),
    Reference(ReferenceLine),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub visible: bool,
}

impl Artifact {
    #[must_use]
    pub fn new(kind: ArtifactKind) -> Self {
        Self {
            kind,
            visible: true,
        }
    }

    #[must_use]
    pub fn style(&self) -> SeriesStyle {
        match &self.kind {
            ArtifactKind::Series(series) => series.style(),
            ArtifactKind::Reference(line) => line.style(),
        }
    }

    #[must_use]
    pub fn as_series(&self) -> Option<&Series> {
        match &self.kind {
            ArtifactKind::Series(series) => Some(series),
            ArtifactKind::Reference(_) => None,
        }
    }

    pub fn renormalize(&mut self, transform: &CoordinateTransform) {
        if let ArtifactKind::Series(series) = &mut self.kind {
            series.renormalize(transform);
        }
    }
}

/// Per-axis finite bounds of `points`, `None` when no finite value exists on
/// either axis.
#[must_use]
pub fn data_bounds(points: &[DataPoint]) -> Option<Rect> {
    let (l, r) = finite_extent(points, |p| p.x)?;
    let (b, t) = finite_extent(points, |p| p.y)?;
    Some(Rect::new(l, b, r, t))
}

#[cfg(not(feature = "parallel-bounds"))]
fn finite_extent(points: &[DataPoint], axis: impl Fn(&DataPoint) -> f64) -> Option<(f64, f64)> {
    points
        .iter()
        .map(axis)
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(feature = "parallel-bounds")]
fn finite_extent(
    points: &[DataPoint],
    axis: impl Fn(&DataPoint) -> f64 + Sync + Send,
) -> Option<(f64, f64)> {
    use rayon::prelude::*;

    points
        .par_iter()
        .map(axis)
        .filter(|v| v.is_finite())
        .fold(
            || None,
            |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            },
        )
        .reduce(
            || None,
            |left, right| match (left, right) {
                (None, other) | (other, None) => other,
                (Some((a_lo, a_hi)), Some((b_lo, b_hi))) => {
                    Some((a_lo.min(b_lo), a_hi.max(b_hi)))
                }
            },
        )
}
