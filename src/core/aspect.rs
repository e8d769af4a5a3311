use serde::{Deserialize, Serialize};

/// Data-space aspect policy of a plot.
///
/// Extents are `(width, height)` pairs; `container` is the plot's pixel
/// extent. A container with a non-positive side passes extents through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectPolicy {
    #[default]
    None,
    /// Equal data deltas render as equal pixel deltas on both axes.
    Square,
}

impl AspectPolicy {
    /// Grows the smaller dimension of `extent` until the policy holds.
    #[must_use]
    pub fn apply(self, extent: (f64, f64), container: (f64, f64)) -> (f64, f64) {
        match self {
            Self::None => extent,
            Self::Square => {
                if !is_usable(container) {
                    return extent;
                }
                let container_aspect = container.0 / container.1;
                let extent_aspect = extent.0 / extent.1;
                if container_aspect < extent_aspect {
                    (extent.0, extent.0 / container_aspect)
                } else {
                    (extent.1 * container_aspect, extent.1)
                }
            }
        }
    }

    /// Keeps the width fixed and solves for the height.
    #[must_use]
    pub fn adjust_vertical(self, extent: (f64, f64), container: (f64, f64)) -> (f64, f64) {
        match self {
            Self::None => extent,
            Self::Square => {
                if !is_usable(container) {
                    return extent;
                }
                (extent.0, extent.0 * container.1 / container.0)
            }
        }
    }

    /// Keeps the height fixed and solves for the width.
    #[must_use]
    pub fn adjust_horizontal(self, extent: (f64, f64), container: (f64, f64)) -> (f64, f64) {
        match self {
            Self::None => extent,
            Self::Square => {
                if !is_usable(container) {
                    return extent;
                }
                (extent.1 * container.0 / container.1, extent.1)
            }
        }
    }
}

fn is_usable(container: (f64, f64)) -> bool {
    container.0.is_finite() && container.1.is_finite() && container.0 > 0.0 && container.1 > 0.0
}
