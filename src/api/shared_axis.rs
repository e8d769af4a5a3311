use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::core::PlotId;
use crate::error::PlotResult;

use super::plot::Plot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// Plots constrained to display the same range on one axis.
///
/// Members are handles into the figure's plot registry, so a removed plot
/// only has to be dropped from its groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedAxisGroup {
    axis: Axis,
    members: SmallVec<[PlotId; 4]>,
}

impl SharedAxisGroup {
    #[must_use]
    pub fn new(axis: Axis, first: PlotId, second: PlotId) -> Self {
        let mut group = Self {
            axis,
            members: SmallVec::new(),
        };
        group.insert(first);
        group.insert(second);
        group
    }

    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    #[must_use]
    pub fn members(&self) -> &[PlotId] {
        &self.members
    }

    #[must_use]
    pub fn contains(&self, plot: PlotId) -> bool {
        self.members.contains(&plot)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns `false` when the plot already belonged to the group.
    pub fn insert(&mut self, plot: PlotId) -> bool {
        if self.contains(plot) {
            return false;
        }
        self.members.push(plot);
        true
    }

    pub fn remove(&mut self, plot: PlotId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| *member != plot);
        self.members.len() != before
    }

    /// Moves every member of `other` into this group.
    pub fn absorb(&mut self, other: Self) {
        for member in other.members {
            self.insert(member);
        }
    }

    /// Pushes `[lo, hi]` on this group's axis to every member except
    /// `source`, returning the members whose view actually changed.
    ///
    /// Each member keeps its aspect policy and pixel extent; the other axis
    /// is re-derived around the member's own center. Propagation is a single
    /// hop: changed members do not forward the update to their other groups.
    pub fn propagate(
        &self,
        plots: &mut IndexMap<PlotId, Plot>,
        source: PlotId,
        lo: f64,
        hi: f64,
    ) -> PlotResult<SmallVec<[PlotId; 4]>> {
        let mut changed = SmallVec::new();
        for &member in self.members.iter().filter(|member| **member != source) {
            let Some(plot) = plots.get_mut(&member) else {
                warn!(plot = member.raw(), "shared axis member missing from registry");
                continue;
            };
            let updated = match self.axis {
                Axis::X => plot.set_x_limits_local(lo, hi)?,
                Axis::Y => plot.set_y_limits_local(lo, hi)?,
            };
            if updated {
                changed.push(member);
            }
        }
        if !changed.is_empty() {
            debug!(
                source = source.raw(),
                axis = ?self.axis,
                lo,
                hi,
                updated = changed.len(),
                "propagated shared axis range"
            );
        }
        Ok(changed)
    }
}
