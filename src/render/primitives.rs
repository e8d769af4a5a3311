use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    pub fn validate(self) -> PlotResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(PlotError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Single-precision 2-D vertex data handed to the backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexBuffer {
    pub vertices: Vec<[f32; 2]>,
}

impl VertexBuffer {
    #[must_use]
    pub fn new(vertices: Vec<[f32; 2]>) -> Self {
        Self { vertices }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// How the backend should interpret a vertex run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// Connected polyline through every vertex.
    LineStrip { width: f64 },
    /// One marker per vertex.
    Points { size: f64 },
    /// Triangle list produced by text-geometry upload.
    Glyphs,
}

/// Borrowed draw request: one vertex run plus its interpretation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive<'a> {
    pub kind: PrimitiveKind,
    pub vertices: &'a [[f32; 2]],
}

impl<'a> Primitive<'a> {
    #[must_use]
    pub const fn new(kind: PrimitiveKind, vertices: &'a [[f32; 2]]) -> Self {
        Self { kind, vertices }
    }

    pub fn validate(&self) -> PlotResult<()> {
        match self.kind {
            PrimitiveKind::LineStrip { width } if !width.is_finite() || width <= 0.0 => {
                return Err(PlotError::InvalidData(
                    "line width must be finite and > 0".to_owned(),
                ));
            }
            PrimitiveKind::Points { size } if !size.is_finite() || size <= 0.0 => {
                return Err(PlotError::InvalidData(
                    "point size must be finite and > 0".to_owned(),
                ));
            }
            _ => {}
        }
        if self
            .vertices
            .iter()
            .any(|v| !v[0].is_finite() || !v[1].is_finite())
        {
            return Err(PlotError::InvalidData(
                "primitive vertices must be finite".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size_px: f64,
}

impl Font {
    #[must_use]
    pub fn new(family: impl Into<String>, size_px: f64) -> Self {
        Self {
            family: family.into(),
            size_px,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("sans", 12.0)
    }
}

/// Measured size of a shaped string in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TextExtent {
    pub width: f64,
    pub height: f64,
}

impl TextExtent {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Compass anchor naming which point of a label sits on its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Anchor {
    N,
    NE,
    E,
    SE,
    S,
    #[default]
    SW,
    W,
    NW,
    C,
}

impl Anchor {
    /// Fraction of (width, height) to shift left/down so the anchor point
    /// lands on the label position.
    #[must_use]
    pub const fn offset_fractions(self) -> (f64, f64) {
        match self {
            Self::N => (0.5, 1.0),
            Self::NE => (1.0, 1.0),
            Self::E => (1.0, 0.5),
            Self::SE => (1.0, 0.0),
            Self::S => (0.5, 0.0),
            Self::SW => (0.0, 0.0),
            Self::W => (0.0, 0.5),
            Self::NW => (0.0, 1.0),
            Self::C => (0.5, 0.5),
        }
    }
}
