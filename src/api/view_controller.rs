use crate::core::{DataPoint, PlotId, Rect, ScreenPoint};
use crate::error::{PlotError, PlotResult};
use crate::render::RenderBackend;

use super::Figure;

impl<B: RenderBackend> Figure<B> {
    /// Installs a full view rectangle (aspect applied) and propagates it.
    pub fn set_limits(&mut self, plot: PlotId, limits: Rect) -> PlotResult<()> {
        let target = self.plot_entry(plot)?;
        if target.set_limits_local(limits)? {
            let installed = target.limits();
            self.update_shared_axes(plot, installed)?;
        }
        Ok(())
    }

    /// Installs `[l, r]` on the x axis; y follows the aspect policy.
    pub fn set_x_limits(&mut self, plot: PlotId, l: f64, r: f64) -> PlotResult<()> {
        let target = self.plot_entry(plot)?;
        if target.set_x_limits_local(l, r)? {
            let installed = target.limits();
            self.update_shared_axes(plot, installed)?;
        }
        Ok(())
    }

    /// Installs `[b, t]` on the y axis; x follows the aspect policy.
    pub fn set_y_limits(&mut self, plot: PlotId, b: f64, t: f64) -> PlotResult<()> {
        let target = self.plot_entry(plot)?;
        if target.set_y_limits_local(b, t)? {
            let installed = target.limits();
            self.update_shared_axes(plot, installed)?;
        }
        Ok(())
    }

    /// Moves the view so `data_point` sits under `screen_point`, scaling the
    /// extent by `(scale_x, scale_y)`.
    pub fn pan_to(
        &mut self,
        plot: PlotId,
        data_point: DataPoint,
        screen_point: ScreenPoint,
        scale_x: f64,
        scale_y: f64,
    ) -> PlotResult<()> {
        let target = self.plot_entry(plot)?;
        target.pan_to_local(data_point, screen_point, scale_x, scale_y)?;
        let installed = target.limits();
        self.update_shared_axes(plot, installed)?;
        Ok(())
    }

    /// Zooms about `screen_point`, keeping the data under it fixed. `factor`
    /// below one zooms in.
    pub fn zoom_at(
        &mut self,
        plot: PlotId,
        screen_point: ScreenPoint,
        factor: f64,
    ) -> PlotResult<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(PlotError::InvalidLimits(
                "zoom factor must be finite and > 0".to_owned(),
            ));
        }
        let data_point = self.plot(plot)?.screen_to_data(screen_point);
        self.pan_to(plot, data_point, screen_point, factor, factor)
    }

    /// Fits the view of `plot` around its visible series using the
    /// configured margin. Returns `false` when there was nothing to fit.
    pub fn zoom_to_fit(&mut self, plot: PlotId) -> PlotResult<bool> {
        let margin = self.config.zoom_to_fit_margin;
        self.zoom_to_fit_with_margin(plot, margin)
    }

    pub fn zoom_to_fit_with_margin(&mut self, plot: PlotId, margin: f64) -> PlotResult<bool> {
        let target = self.plot_entry(plot)?;
        if !target.zoom_to_fit_local(margin)? {
            return Ok(false);
        }
        let installed = target.limits();
        self.update_shared_axes(plot, installed)?;
        Ok(true)
    }

    /// Pushes `limits` from `source` to every plot sharing an axis with it.
    /// Returns the number of partner views that changed.
    pub fn update_shared_axes(&mut self, source: PlotId, limits: Rect) -> PlotResult<usize> {
        let mut changed = 0;
        for group in self.x_groups.iter().filter(|group| group.contains(source)) {
            changed += group
                .propagate(&mut self.plots, source, limits.l, limits.r)?
                .len();
        }
        for group in self.y_groups.iter().filter(|group| group.contains(source)) {
            changed += group
                .propagate(&mut self.plots, source, limits.b, limits.t)?
                .len();
        }
        Ok(changed)
    }

    fn plot_entry(&mut self, plot: PlotId) -> PlotResult<&mut super::Plot> {
        self.plots.get_mut(&plot).ok_or(PlotError::UnknownPlot(plot))
    }
}
