use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{ArtifactId, CellSpec, DataPoint, LabelId, PlotId, ScreenPoint, Viewport};
use crate::error::{PlotError, PlotResult};
use crate::interaction::InteractionState;
use crate::render::{Anchor, RenderBackend};

use super::figure_config::{FigureConfig, PlotOptions};
use super::handoff::SeriesFeed;
use super::invalidation::DirtyFlag;
use super::label::FlexLabel;
use super::plot::Plot;
use super::shared_axis::{Axis, SharedAxisGroup};

/// Result of a pointer query: the plot under the cursor and the data
/// coordinate the cursor points at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerHit {
    pub plot: PlotId,
    pub data: DataPoint,
}

/// Container owning a set of plots laid out on a grid, free labels and the
/// shared-axis groups linking plots together.
///
/// A figure is driven by a single thread. Background work reaches it only
/// through its [`DirtyFlag`] and [`SeriesFeed`] handles.
pub struct Figure<B: RenderBackend> {
    pub(super) backend: B,
    pub(super) config: FigureConfig,
    pub(super) window: Viewport,
    pub(super) framebuffer: Viewport,
    pub(super) plots: IndexMap<PlotId, Plot>,
    pub(super) labels: IndexMap<LabelId, FlexLabel>,
    pub(super) x_groups: Vec<SharedAxisGroup>,
    pub(super) y_groups: Vec<SharedAxisGroup>,
    pub(super) feeds: Vec<SeriesFeed>,
    pub(super) interaction: InteractionState,
    pub(super) dirty: DirtyFlag,
    pub(super) animated: bool,
    pub(super) iconified: bool,
    pub(super) close_requested: bool,
    next_plot_id: u32,
    next_label_id: u32,
}

impl<B: RenderBackend> Figure<B> {
    pub fn new(config: FigureConfig, backend: B) -> PlotResult<Self> {
        config.validate()?;
        let framebuffer = config.framebuffer_size();
        Ok(Self {
            backend,
            window: config.window,
            framebuffer,
            config,
            plots: IndexMap::new(),
            labels: IndexMap::new(),
            x_groups: Vec::new(),
            y_groups: Vec::new(),
            feeds: Vec::new(),
            interaction: InteractionState::default(),
            dirty: DirtyFlag::new(),
            animated: false,
            iconified: false,
            close_requested: false,
            next_plot_id: 1,
            next_label_id: 1,
        })
    }

    #[must_use]
    pub fn config(&self) -> &FigureConfig {
        &self.config
    }

    #[must_use]
    pub fn window(&self) -> Viewport {
        self.window
    }

    #[must_use]
    pub fn framebuffer(&self) -> Viewport {
        self.framebuffer
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    #[must_use]
    pub fn dirty_flag(&self) -> &DirtyFlag {
        &self.dirty
    }

    #[must_use]
    pub fn interaction(&self) -> InteractionState {
        self.interaction
    }

    /// Keeps the figure redrawing every scheduler iteration while `true`.
    pub fn set_animated(&mut self, animated: bool) {
        self.animated = animated;
        if animated {
            self.dirty.mark();
        }
    }

    #[must_use]
    pub fn is_animated(&self) -> bool {
        self.animated
    }

    #[must_use]
    pub fn is_iconified(&self) -> bool {
        self.iconified
    }

    #[must_use]
    pub fn should_close(&self) -> bool {
        self.close_requested
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    /// Creates a plot in the given grid cell.
    ///
    /// With `share_x` / `share_y` set, the plot joins the partner's group.
    /// Explicit limits are pushed to the group; otherwise the new plot adopts
    /// the partner's range on the shared axis.
    pub fn add_plot(&mut self, cell: CellSpec, options: PlotOptions) -> PlotResult<PlotId> {
        for partner in [options.share_x, options.share_y].into_iter().flatten() {
            if !self.plots.contains_key(&partner) {
                return Err(PlotError::UnknownPlot(partner));
            }
        }

        let id = PlotId::new(self.next_plot_id);
        let plot = Plot::new(
            id,
            cell,
            &options,
            &self.config,
            self.window,
            self.framebuffer,
            self.dirty.clone(),
        )?;
        self.next_plot_id += 1;
        self.plots.insert(id, plot);

        if let Some(partner) = options.share_x {
            self.join_group(Axis::X, id, partner);
        }
        if let Some(partner) = options.share_y {
            self.join_group(Axis::Y, id, partner);
        }

        if options.limits.is_some() {
            let limits = self.plot(id)?.limits();
            self.update_shared_axes(id, limits)?;
        } else {
            self.adopt_partner_ranges(id, options.share_x, options.share_y)?;
        }

        debug!(plot = id.raw(), ?cell, "plot added");
        self.dirty.mark();
        Ok(id)
    }

    /// Removes a plot, its group memberships, feeds and any drag on it.
    pub fn remove_plot(&mut self, id: PlotId) -> PlotResult<Plot> {
        let plot = self
            .plots
            .shift_remove(&id)
            .ok_or(PlotError::UnknownPlot(id))?;
        for groups in [&mut self.x_groups, &mut self.y_groups] {
            for group in groups.iter_mut() {
                group.remove(id);
            }
            groups.retain(|group| group.len() > 1);
        }
        self.feeds.retain(|feed| feed.plot() != id);
        self.interaction.forget_plot(id);
        debug!(plot = id.raw(), "plot removed");
        self.dirty.mark();
        Ok(plot)
    }

    /// Moves a plot to another grid cell.
    pub fn set_plot_bounds(&mut self, id: PlotId, cell: CellSpec) -> PlotResult<()> {
        let plot = self.plots.get_mut(&id).ok_or(PlotError::UnknownPlot(id))?;
        plot.set_cell(cell, &self.config, self.window, self.framebuffer)
    }

    pub fn plot(&self, id: PlotId) -> PlotResult<&Plot> {
        self.plots.get(&id).ok_or(PlotError::UnknownPlot(id))
    }

    /// Mutable access for artifact and label edits. View changes made through
    /// the figure reach shared partners; edits here stay local to the plot.
    pub fn plot_mut(&mut self, id: PlotId) -> PlotResult<&mut Plot> {
        self.plots.get_mut(&id).ok_or(PlotError::UnknownPlot(id))
    }

    #[must_use]
    pub fn plot_ids(&self) -> Vec<PlotId> {
        self.plots.keys().copied().collect()
    }

    #[must_use]
    pub fn plot_count(&self) -> usize {
        self.plots.len()
    }

    pub fn plots(&self) -> impl Iterator<Item = &Plot> {
        self.plots.values()
    }

    /// Members of the group `plot` shares `axis` with, `plot` included.
    #[must_use]
    pub fn shared_with(&self, axis: Axis, plot: PlotId) -> Vec<PlotId> {
        self.groups(axis)
            .iter()
            .find(|group| group.contains(plot))
            .map(|group| group.members().to_vec())
            .unwrap_or_default()
    }

    /// Links two existing plots on `axis`, merging their groups.
    ///
    /// `plot` adopts `partner`'s range on that axis.
    pub fn share_axis(&mut self, axis: Axis, plot: PlotId, partner: PlotId) -> PlotResult<()> {
        for id in [plot, partner] {
            if !self.plots.contains_key(&id) {
                return Err(PlotError::UnknownPlot(id));
            }
        }
        if plot == partner {
            return Ok(());
        }
        self.join_group(axis, plot, partner);
        match axis {
            Axis::X => self.adopt_partner_ranges(plot, Some(partner), None),
            Axis::Y => self.adopt_partner_ranges(plot, None, Some(partner)),
        }
    }

    pub fn resize(&mut self, window: Viewport, framebuffer: Viewport) -> PlotResult<()> {
        for viewport in [window, framebuffer] {
            if !viewport.is_valid() {
                return Err(PlotError::InvalidViewport {
                    width: viewport.width,
                    height: viewport.height,
                });
            }
        }
        if window == self.window && framebuffer == self.framebuffer {
            return Ok(());
        }
        self.window = window;
        self.framebuffer = framebuffer;
        for plot in self.plots.values_mut() {
            plot.resize(window, framebuffer)?;
        }
        for label in self.labels.values_mut() {
            label.relayout(window);
        }
        debug!(
            width = window.width,
            height = window.height,
            fb_width = framebuffer.width,
            fb_height = framebuffer.height,
            "figure resized"
        );
        self.dirty.mark();
        Ok(())
    }

    /// First visible plot, in creation order, whose box contains `point`.
    /// Where cells overlap, the earlier plot takes the pointer.
    #[must_use]
    pub fn find_plot(&self, point: ScreenPoint) -> Option<PlotId> {
        self.plots
            .values()
            .find(|plot| plot.contains(point))
            .map(Plot::id)
    }

    #[must_use]
    pub fn pointer_query(&self, point: ScreenPoint) -> Option<PointerHit> {
        let plot = self.plots.get(&self.find_plot(point)?)?;
        Some(PointerHit {
            plot: plot.id(),
            data: plot.screen_to_data(point),
        })
    }

    /// Adds a free-floating label placed at a fraction of the window.
    pub fn add_label(
        &mut self,
        text: &str,
        fraction_x: f64,
        fraction_y: f64,
        anchor: Anchor,
    ) -> PlotResult<LabelId> {
        let label = FlexLabel::new(
            text,
            fraction_x,
            fraction_y,
            anchor,
            self.config.label_font.clone(),
            self.window,
        )?;
        let id = LabelId::new(self.next_label_id);
        self.next_label_id += 1;
        self.labels.insert(id, label);
        self.dirty.mark();
        Ok(id)
    }

    #[must_use]
    pub fn label(&self, id: LabelId) -> Option<&FlexLabel> {
        self.labels.get(&id)
    }

    /// Replaces a label's text. Returns `true` when it changed.
    pub fn set_label_text(&mut self, id: LabelId, text: &str) -> PlotResult<bool> {
        let label = self.labels.get_mut(&id).ok_or_else(|| {
            PlotError::InvalidData(format!("unknown label: {}", id.raw()))
        })?;
        let changed = label.label_mut().set_text(text);
        if changed {
            self.dirty.mark();
        }
        Ok(changed)
    }

    pub fn remove_label(&mut self, id: LabelId) -> bool {
        let removed = self.labels.shift_remove(&id).is_some();
        if removed {
            self.dirty.mark();
        }
        removed
    }

    /// Returns a handle a background callback uses to replace the samples of
    /// a series. Pending samples are applied at the start of the next draw.
    pub fn series_feed(&mut self, plot: PlotId, artifact: ArtifactId) -> PlotResult<SeriesFeed> {
        let target = self.plot(plot)?.artifact(artifact);
        if target.and_then(|entry| entry.as_series()).is_none() {
            return Err(PlotError::UnknownArtifact(artifact));
        }
        let feed = SeriesFeed::new(plot, artifact, self.dirty.clone());
        self.feeds.push(feed.clone());
        Ok(feed)
    }

    /// Moves published samples into their series. Feeds whose target is gone
    /// or whose publishers were all dropped are released.
    pub(super) fn apply_pending_feeds(&mut self) {
        let plots = &mut self.plots;
        self.feeds.retain(|feed| {
            let Some(points) = feed.take() else {
                return !feed.is_orphaned();
            };
            let Some(plot) = plots.get_mut(&feed.plot()) else {
                return false;
            };
            match plot.set_series_points(feed.artifact(), points) {
                Ok(()) => !feed.is_orphaned(),
                Err(err) => {
                    warn!(
                        plot = feed.plot().raw(),
                        artifact = feed.artifact().raw(),
                        error = %err,
                        "dropping series feed"
                    );
                    false
                }
            }
        });
    }

    pub(super) fn groups(&self, axis: Axis) -> &[SharedAxisGroup] {
        match axis {
            Axis::X => &self.x_groups,
            Axis::Y => &self.y_groups,
        }
    }

    fn join_group(&mut self, axis: Axis, plot: PlotId, partner: PlotId) {
        let groups = match axis {
            Axis::X => &mut self.x_groups,
            Axis::Y => &mut self.y_groups,
        };
        let plot_group = groups.iter().position(|group| group.contains(plot));
        let partner_group = groups.iter().position(|group| group.contains(partner));
        match (plot_group, partner_group) {
            (Some(a), Some(b)) if a == b => {}
            (Some(a), Some(b)) => {
                let absorbed = groups.remove(a.max(b));
                groups[a.min(b)].absorb(absorbed);
            }
            (Some(index), None) => {
                groups[index].insert(partner);
            }
            (None, Some(index)) => {
                groups[index].insert(plot);
            }
            (None, None) => groups.push(SharedAxisGroup::new(axis, partner, plot)),
        }
    }

    fn adopt_partner_ranges(
        &mut self,
        id: PlotId,
        share_x: Option<PlotId>,
        share_y: Option<PlotId>,
    ) -> PlotResult<()> {
        let x_range = share_x
            .and_then(|partner| self.plots.get(&partner))
            .map(|partner| partner.limits());
        let y_range = share_y
            .and_then(|partner| self.plots.get(&partner))
            .map(|partner| partner.limits());
        let plot = self.plots.get_mut(&id).ok_or(PlotError::UnknownPlot(id))?;
        if let Some(limits) = x_range {
            plot.set_x_limits_local(limits.l, limits.r)?;
        }
        if let Some(limits) = y_range {
            plot.set_y_limits_local(limits.b, limits.t)?;
        }
        Ok(())
    }
}
