use serde::{Deserialize, Serialize};

/// Pixel dimensions of a window or framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

impl DataPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for DataPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Position in container (window) pixels, origin bottom-left, y growing upward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle stored as (left, bottom, right, top).
///
/// The same type is used for fractional layout boxes, pixel boxes and data
/// view limits; the owning field documents which space it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub l: f64,
    pub b: f64,
    pub r: f64,
    pub t: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(l: f64, b: f64, r: f64, t: f64) -> Self {
        Self { l, b, r, t }
    }

    /// Builds a rectangle from the `(l, r, b, t)` argument order used by the
    /// view-limit APIs.
    #[must_use]
    pub const fn from_lrbt(l: f64, r: f64, b: f64, t: f64) -> Self {
        Self { l, b, r, t }
    }

    #[must_use]
    pub fn from_center(center: DataPoint, width: f64, height: f64) -> Self {
        Self {
            l: center.x - width / 2.0,
            b: center.y - height / 2.0,
            r: center.x + width / 2.0,
            t: center.y + height / 2.0,
        }
    }

    #[must_use]
    pub fn width(self) -> f64 {
        self.r - self.l
    }

    #[must_use]
    pub fn height(self) -> f64 {
        self.t - self.b
    }

    #[must_use]
    pub fn center(self) -> DataPoint {
        DataPoint::new((self.l + self.r) / 2.0, (self.b + self.t) / 2.0)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.l.is_finite() && self.b.is_finite() && self.r.is_finite() && self.t.is_finite()
    }

    /// Returns the same rectangle with `l <= r` and `b <= t`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            l: self.l.min(self.r),
            b: self.b.min(self.t),
            r: self.l.max(self.r),
            t: self.b.max(self.t),
        }
    }

    /// Half-open containment test: left/bottom edges inclusive, right/top exclusive.
    #[must_use]
    pub fn contains(self, x: f64, y: f64) -> bool {
        self.l <= x && x < self.r && self.b <= y && y < self.t
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            l: self.l.min(other.l),
            b: self.b.min(other.b),
            r: self.r.max(other.r),
            t: self.t.max(other.t),
        }
    }

    /// Scales width and height by the given factors around the center.
    #[must_use]
    pub fn scaled_about_center(self, factor_x: f64, factor_y: f64) -> Self {
        Self::from_center(
            self.center(),
            self.width() * factor_x,
            self.height() * factor_y,
        )
    }
}

/// Integer pixel rectangle used for backend viewports (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlotId(u32);

impl PlotId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactId(u32);

impl ArtifactId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelId(u32);

impl LabelId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Handle of a surface registered with a frame scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(u32);

impl SurfaceId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}
