use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::core::{ArtifactId, DataPoint, PlotId};

use super::invalidation::DirtyFlag;

/// Single-slot mailbox carrying recomputed series samples from a background
/// callback to the draw thread.
///
/// Publishing replaces any sample set that was not consumed yet and marks
/// the owning figure dirty. The figure drains the slot at the start of its
/// next draw pass.
#[derive(Debug, Clone)]
pub struct SeriesFeed {
    plot: PlotId,
    artifact: ArtifactId,
    slot: Arc<Mutex<Option<Vec<DataPoint>>>>,
    dirty: DirtyFlag,
}

impl SeriesFeed {
    pub(super) fn new(plot: PlotId, artifact: ArtifactId, dirty: DirtyFlag) -> Self {
        Self {
            plot,
            artifact,
            slot: Arc::new(Mutex::new(None)),
            dirty,
        }
    }

    #[must_use]
    pub fn plot(&self) -> PlotId {
        self.plot
    }

    #[must_use]
    pub fn artifact(&self) -> ArtifactId {
        self.artifact
    }

    /// Returns `true` when an earlier, unconsumed sample set was replaced.
    pub fn publish(&self, points: Vec<DataPoint>) -> bool {
        let replaced = match self.slot.lock() {
            Ok(mut slot) => slot.replace(points).is_some(),
            Err(poisoned) => poisoned.into_inner().replace(points).is_some(),
        };
        trace!(
            plot = self.plot.raw(),
            artifact = self.artifact.raw(),
            replaced,
            "series samples published"
        );
        self.dirty.mark();
        replaced
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        match self.slot.lock() {
            Ok(slot) => slot.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    pub(super) fn take(&self) -> Option<Vec<DataPoint>> {
        match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    /// `true` when no handle outside the figure is left to publish.
    pub(super) fn is_orphaned(&self) -> bool {
        Arc::strong_count(&self.slot) == 1
    }
}
