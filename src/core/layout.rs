//! Grid-cell layout: turns a cell specifier into a padded fractional box.

use serde::{Deserialize, Serialize};

use crate::core::types::Rect;
use crate::error::{PlotError, PlotResult};

/// Default padding on each side of the container's flexible area.
///
/// The padding applies independently on opposite sides, so the total
/// horizontal (or vertical) padding is twice this value.
pub const DEFAULT_LAYOUT_PAD: f64 = 0.05;

/// Where a plot sits inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CellSpec {
    /// Grid of `height` rows and `width` columns; `position` is 1-based,
    /// numbered left-to-right then top-to-bottom.
    Cell {
        height: u32,
        width: u32,
        position: u32,
    },
    /// Smallest rectangle enclosing both 1-based cells of the grid.
    Span {
        height: u32,
        width: u32,
        first: u32,
        last: u32,
    },
    /// Explicit fractional rectangle inside `[0, 1]^2`.
    Fraction(Rect),
}

impl CellSpec {
    #[must_use]
    pub const fn cell(height: u32, width: u32, position: u32) -> Self {
        Self::Cell {
            height,
            width,
            position,
        }
    }

    #[must_use]
    pub const fn span(height: u32, width: u32, first: u32, last: u32) -> Self {
        Self::Span {
            height,
            width,
            first,
            last,
        }
    }

    #[must_use]
    pub const fn fraction(l: f64, b: f64, r: f64, t: f64) -> Self {
        Self::Fraction(Rect::new(l, b, r, t))
    }

    /// Decodes the 3-digit `HWP` shorthand: `312` is row count 3, column
    /// count 1, cell 2.
    pub fn from_code(code: u32) -> PlotResult<Self> {
        if !(111..=999).contains(&code) {
            return Err(PlotError::InvalidCellCode(code));
        }
        Ok(Self::Cell {
            height: code / 100,
            width: (code % 100) / 10,
            position: code % 10,
        })
    }

    /// Unpadded fractional rectangle of this cell.
    pub fn unpadded_rect(self) -> PlotResult<Rect> {
        match self {
            Self::Cell {
                height,
                width,
                position,
            } => cell_rect(height, width, position),
            Self::Span {
                height,
                width,
                first,
                last,
            } => {
                let a = cell_rect(height, width, first)?;
                let b = cell_rect(height, width, last)?;
                Ok(a.union(b))
            }
            Self::Fraction(rect) => {
                validate_fraction(rect)?;
                Ok(rect)
            }
        }
    }
}

impl Default for CellSpec {
    fn default() -> Self {
        Self::cell(1, 1, 1)
    }
}

impl TryFrom<u32> for CellSpec {
    type Error = PlotError;

    fn try_from(code: u32) -> PlotResult<Self> {
        Self::from_code(code)
    }
}

impl From<(u32, u32, u32)> for CellSpec {
    fn from((height, width, position): (u32, u32, u32)) -> Self {
        Self::cell(height, width, position)
    }
}

impl From<(u32, u32, (u32, u32))> for CellSpec {
    fn from((height, width, (first, last)): (u32, u32, (u32, u32))) -> Self {
        Self::span(height, width, first, last)
    }
}

impl From<(f64, f64, f64, f64)> for CellSpec {
    fn from((l, b, r, t): (f64, f64, f64, f64)) -> Self {
        Self::fraction(l, b, r, t)
    }
}

/// Per-side padding applied around the grid inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPadding {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Default for LayoutPadding {
    fn default() -> Self {
        Self::uniform(DEFAULT_LAYOUT_PAD)
    }
}

impl LayoutPadding {
    #[must_use]
    pub const fn uniform(pad: f64) -> Self {
        Self {
            left: pad,
            right: pad,
            bottom: pad,
            top: pad,
        }
    }

    pub fn validate(self) -> PlotResult<Self> {
        for (side, value) in [
            ("left", self.left),
            ("right", self.right),
            ("bottom", self.bottom),
            ("top", self.top),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlotError::InvalidBounds(format!(
                    "layout padding `{side}` must be finite and >= 0"
                )));
            }
        }
        if self.left + self.right >= 1.0 || self.bottom + self.top >= 1.0 {
            return Err(PlotError::InvalidBounds(
                "layout padding leaves no room for plots".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Resolves a cell specifier into its padded fractional bounding box.
///
/// The cell rectangle is first computed in `[0, 1]^2`, then shrunk into the
/// area left after padding so the result still lies inside `[0, 1]^2`.
pub fn grid_bounds(spec: CellSpec, padding: LayoutPadding) -> PlotResult<Rect> {
    let padding = padding.validate()?;
    let cell = spec.unpadded_rect()?;
    let sx = 1.0 - (padding.left + padding.right);
    let sy = 1.0 - (padding.bottom + padding.top);
    Ok(Rect::new(
        padding.left + sx * cell.l,
        padding.bottom + sy * cell.b,
        padding.left + sx * cell.r,
        padding.bottom + sy * cell.t,
    ))
}

fn cell_rect(height: u32, width: u32, position: u32) -> PlotResult<Rect> {
    let cells = height.checked_mul(width).unwrap_or(0);
    if height == 0 || width == 0 || position == 0 || position > cells {
        return Err(PlotError::InvalidGridCell {
            height,
            width,
            position,
        });
    }

    let index = position - 1;
    // Row 0 is the visual top, while fractional y grows upward.
    let row_from_bottom = height - (index / width) - 1;
    let column = index % width;

    let w = f64::from(width);
    let h = f64::from(height);
    Ok(Rect::new(
        f64::from(column) / w,
        f64::from(row_from_bottom) / h,
        f64::from(column + 1) / w,
        f64::from(row_from_bottom + 1) / h,
    ))
}

fn validate_fraction(rect: Rect) -> PlotResult<()> {
    if !rect.is_finite() {
        return Err(PlotError::InvalidBounds(
            "fractional bounds must be finite".to_owned(),
        ));
    }
    if rect.l >= rect.r || rect.b >= rect.t {
        return Err(PlotError::InvalidBounds(format!(
            "fractional bounds must satisfy l < r and b < t, got ({}, {}, {}, {})",
            rect.l, rect.b, rect.r, rect.t
        )));
    }
    if rect.l < 0.0 || rect.b < 0.0 || rect.r > 1.0 || rect.t > 1.0 {
        return Err(PlotError::InvalidBounds(
            "fractional bounds must lie inside [0, 1]".to_owned(),
        ));
    }
    Ok(())
}
