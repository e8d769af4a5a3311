use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{
    Artifact, ArtifactId, ArtifactKind, AspectPolicy, CellSpec, CoordinateTransform, DataPoint,
    LimitsUpdate, PixelRect, PlotId, Rect, ReferenceLine, ReferenceOrientation, ScreenPoint,
    Series, SeriesKind, SeriesStyle, TickSet, Viewport, gen_ticks, grid_bounds,
};
use crate::error::{PlotError, PlotResult};
use crate::render::{Anchor, Font};

use super::figure_config::{FigureConfig, PlotGutter, PlotOptions};
use super::invalidation::DirtyFlag;
use super::label::Label;

/// Marker size used by `add_points` when the style leaves it unset.
pub const DEFAULT_POINT_SIZE: f64 = 3.0;

/// Default view installed when a plot is created without explicit limits.
pub const DEFAULT_PLOT_LIMITS: Rect = Rect::new(-1.0, -1.0, 1.0, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum XLabelSide {
    #[default]
    Bottom,
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum YLabelSide {
    #[default]
    Left,
    Right,
}

/// One rectangular plotting area inside a figure.
///
/// A plot owns its coordinate transform, its artifacts and its tick labels.
/// View changes that must reach shared partners go through the owning
/// [`super::Figure`]; the `*_local` methods here only touch this plot.
#[derive(Debug)]
pub struct Plot {
    id: PlotId,
    cell: CellSpec,
    bounds: Rect,
    gutter: PlotGutter,
    pixel_rect: PixelRect,
    framebuffer_rect: PixelRect,
    transform: CoordinateTransform,
    max_h_ticks: usize,
    max_v_ticks: usize,
    h_ticks: TickSet,
    v_ticks: TickSet,
    pub(super) h_tick_labels: Vec<Label>,
    pub(super) v_tick_labels: Vec<Label>,
    pub(super) x_title: Option<(Label, XLabelSide)>,
    pub(super) y_title: Option<(Label, YLabelSide)>,
    font: Font,
    border_width: f64,
    visible: bool,
    pub(super) artifacts: IndexMap<ArtifactId, Artifact>,
    next_artifact_id: u32,
    dirty: DirtyFlag,
}

impl Plot {
    pub(super) fn new(
        id: PlotId,
        cell: CellSpec,
        options: &PlotOptions,
        config: &FigureConfig,
        window: Viewport,
        framebuffer: Viewport,
        dirty: DirtyFlag,
    ) -> PlotResult<Self> {
        options.validate()?;
        let bounds = grid_bounds(cell, config.layout_padding)?;
        let (pixel_rect, framebuffer_rect) =
            layout_rects(bounds, config.plot_gutter, window, framebuffer);
        let limits = options.limits.unwrap_or(DEFAULT_PLOT_LIMITS);
        let transform = CoordinateTransform::new(
            DEFAULT_PLOT_LIMITS,
            data_area(pixel_rect),
            options.aspect,
            config.renormalization_bits,
        )?;

        let mut plot = Self {
            id,
            cell,
            bounds,
            gutter: config.plot_gutter,
            pixel_rect,
            framebuffer_rect,
            transform,
            max_h_ticks: options.max_h_ticks.unwrap_or(config.max_h_ticks),
            max_v_ticks: options.max_v_ticks.unwrap_or(config.max_v_ticks),
            h_ticks: TickSet::default(),
            v_ticks: TickSet::default(),
            h_tick_labels: Vec::new(),
            v_tick_labels: Vec::new(),
            x_title: None,
            y_title: None,
            font: options
                .label_font
                .clone()
                .unwrap_or_else(|| config.label_font.clone()),
            border_width: options.border_width,
            visible: options.visible,
            artifacts: IndexMap::new(),
            next_artifact_id: 1,
            dirty,
        };
        plot.set_limits_local(limits)?;
        plot.regenerate_ticks();
        Ok(plot)
    }

    #[must_use]
    pub fn id(&self) -> PlotId {
        self.id
    }

    #[must_use]
    pub fn cell(&self) -> CellSpec {
        self.cell
    }

    /// Padded fractional bounds inside the container.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Plot box in window pixels, including the one-pixel border.
    #[must_use]
    pub fn pixel_rect(&self) -> PixelRect {
        self.pixel_rect
    }

    /// Data area in framebuffer pixels handed to the backend as viewport.
    #[must_use]
    pub fn framebuffer_rect(&self) -> PixelRect {
        self.framebuffer_rect
    }

    #[must_use]
    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    #[must_use]
    pub fn limits(&self) -> Rect {
        self.transform.limits()
    }

    #[must_use]
    pub fn aspect(&self) -> AspectPolicy {
        self.transform.aspect()
    }

    #[must_use]
    pub fn h_ticks(&self) -> &TickSet {
        &self.h_ticks
    }

    #[must_use]
    pub fn v_ticks(&self) -> &TickSet {
        &self.v_ticks
    }

    #[must_use]
    pub fn h_tick_labels(&self) -> &[Label] {
        &self.h_tick_labels
    }

    #[must_use]
    pub fn v_tick_labels(&self) -> &[Label] {
        &self.v_tick_labels
    }

    #[must_use]
    pub fn x_label(&self) -> Option<&Label> {
        self.x_title.as_ref().map(|(label, _)| label)
    }

    #[must_use]
    pub fn y_label(&self) -> Option<&Label> {
        self.y_title.as_ref().map(|(label, _)| label)
    }

    #[must_use]
    pub fn font(&self) -> &Font {
        &self.font
    }

    #[must_use]
    pub fn border_width(&self) -> f64 {
        self.border_width
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.set_visible(true);
    }

    pub fn hide(&mut self) {
        self.set_visible(false);
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.dirty.mark();
        }
    }

    /// Half-open hit test against the plot box in window pixels. Hidden plots
    /// never match.
    #[must_use]
    pub fn contains(&self, point: ScreenPoint) -> bool {
        self.visible && pixel_rect_as_rect(self.pixel_rect).contains(point.x, point.y)
    }

    #[must_use]
    pub fn data_to_screen(&self, point: DataPoint) -> ScreenPoint {
        self.transform.data_to_screen(point)
    }

    #[must_use]
    pub fn screen_to_data(&self, point: ScreenPoint) -> DataPoint {
        self.transform.screen_to_data(point)
    }

    pub fn set_x_label(&mut self, text: &str, side: XLabelSide) {
        if text.is_empty() {
            if self.x_title.take().is_some() {
                self.dirty.mark();
            }
            return;
        }
        match &mut self.x_title {
            Some((label, current)) => {
                label.set_text(text);
                *current = side;
            }
            None => {
                let origin = ScreenPoint::new(0.0, 0.0);
                let label = Label::new(text, origin, Anchor::N, self.font.clone());
                self.x_title = Some((label, side));
            }
        }
        self.dirty.mark();
    }

    pub fn set_y_label(&mut self, text: &str, side: YLabelSide) {
        if text.is_empty() {
            if self.y_title.take().is_some() {
                self.dirty.mark();
            }
            return;
        }
        // South anchor on both sides: after the quarter turn the text body
        // extends left of its position.
        match &mut self.y_title {
            Some((label, current)) => {
                label.set_text(text);
                *current = side;
            }
            None => {
                let origin = ScreenPoint::new(0.0, 0.0);
                let label = Label::new(text, origin, Anchor::S, self.font.clone())
                    .with_theta(std::f64::consts::FRAC_PI_2);
                self.y_title = Some((label, side));
            }
        }
        self.dirty.mark();
    }

    /// Recomputes pixel bounds after a container resize.
    ///
    /// Under [`AspectPolicy::Square`] the data point at the plot center stays
    /// fixed and the extent scales with the pixel extent, so the data-per-pixel
    /// ratio is preserved.
    pub(super) fn resize(&mut self, window: Viewport, framebuffer: Viewport) -> PlotResult<()> {
        let old_extent = self.transform.pixel_extent();
        let center = self.transform.limits().center();
        self.gen_bounds(window, framebuffer);

        if self.transform.aspect() == AspectPolicy::Square {
            let (w, h) = self.transform.pixel_extent();
            let screen_center = self.transform.screen().center();
            let update = self.transform.pan_to(
                center,
                ScreenPoint::new(screen_center.x, screen_center.y),
                w / old_extent.0,
                h / old_extent.1,
            )?;
            self.after_view_change(update);
        } else {
            self.regenerate_ticks();
            self.dirty.mark();
        }
        Ok(())
    }

    pub(super) fn set_cell(
        &mut self,
        cell: CellSpec,
        config: &FigureConfig,
        window: Viewport,
        framebuffer: Viewport,
    ) -> PlotResult<()> {
        self.bounds = grid_bounds(cell, config.layout_padding)?;
        self.cell = cell;
        self.resize(window, framebuffer)
    }

    fn gen_bounds(&mut self, window: Viewport, framebuffer: Viewport) {
        let (pixel_rect, framebuffer_rect) =
            layout_rects(self.bounds, self.gutter, window, framebuffer);
        self.pixel_rect = pixel_rect;
        self.framebuffer_rect = framebuffer_rect;
        self.transform.set_screen(data_area(pixel_rect));
        trace!(
            plot = self.id.raw(),
            x = pixel_rect.x,
            y = pixel_rect.y,
            width = pixel_rect.width,
            height = pixel_rect.height,
            "plot bounds regenerated"
        );
    }

    /// Installs `rect` with the aspect policy applied around its center.
    pub(super) fn set_limits_local(&mut self, rect: Rect) -> PlotResult<bool> {
        if !rect.is_finite() {
            return Err(PlotError::InvalidLimits(format!(
                "view limits must be finite, got ({}, {}, {}, {})",
                rect.l, rect.b, rect.r, rect.t
            )));
        }
        let rect = rect.normalized();
        let adjusted = self.transform.aspect_adjusted(rect, 1.0, 1.0);
        self.install_limits(adjusted)
    }

    /// Installs `[l, r]` on the x axis, deriving the y extent from the aspect
    /// policy around the current y center.
    pub(super) fn set_x_limits_local(&mut self, l: f64, r: f64) -> PlotResult<bool> {
        let (l, r) = ordered_pair("x", l, r)?;
        let current = self.transform.limits();
        let (_, h) = self.transform.adjust_vertical((r - l, current.height()));
        let (b, t) = if h == current.height() {
            (current.b, current.t)
        } else {
            let center = current.center().y;
            (center - h / 2.0, center + h / 2.0)
        };
        self.install_limits(Rect::new(l, b, r, t))
    }

    /// Installs `[b, t]` on the y axis, deriving the x extent from the aspect
    /// policy around the current x center.
    pub(super) fn set_y_limits_local(&mut self, b: f64, t: f64) -> PlotResult<bool> {
        let (b, t) = ordered_pair("y", b, t)?;
        let current = self.transform.limits();
        let (w, _) = self.transform.adjust_horizontal((current.width(), t - b));
        let (l, r) = if w == current.width() {
            (current.l, current.r)
        } else {
            let center = current.center().x;
            (center - w / 2.0, center + w / 2.0)
        };
        self.install_limits(Rect::new(l, b, r, t))
    }

    pub(super) fn pan_to_local(
        &mut self,
        data_point: DataPoint,
        screen_point: ScreenPoint,
        scale_x: f64,
        scale_y: f64,
    ) -> PlotResult<()> {
        let update = self
            .transform
            .pan_to(data_point, screen_point, scale_x, scale_y)?;
        self.after_view_change(update);
        Ok(())
    }

    /// Fits the view around every visible series. Returns `false` and leaves
    /// the view untouched when no series holds a finite value.
    pub(super) fn zoom_to_fit_local(&mut self, margin: f64) -> PlotResult<bool> {
        if !margin.is_finite() || margin <= 0.0 {
            return Err(PlotError::InvalidLimits(
                "zoom-to-fit margin must be finite and > 0".to_owned(),
            ));
        }
        let Some(bounds) = self.visible_data_bounds() else {
            debug!(plot = self.id.raw(), "zoom to fit skipped: no finite data");
            return Ok(false);
        };
        let (l, r) = fitted_range(bounds.l, bounds.r, margin);
        let (b, t) = fitted_range(bounds.b, bounds.t, margin);
        let fitted = self
            .transform
            .aspect_adjusted(Rect::new(l, b, r, t), 1.0, 1.0);
        self.install_limits(fitted)
    }

    /// Bounding box of all visible series, ignoring non-finite values.
    #[must_use]
    pub fn visible_data_bounds(&self) -> Option<Rect> {
        self.artifacts
            .values()
            .filter(|artifact| artifact.visible)
            .filter_map(Artifact::as_series)
            .filter_map(Series::data_bounds)
            .reduce(Rect::union)
    }

    fn install_limits(&mut self, rect: Rect) -> PlotResult<bool> {
        if rect == self.transform.limits() {
            return Ok(false);
        }
        let update = self.transform.set_limits(rect)?;
        self.after_view_change(update);
        Ok(true)
    }

    fn after_view_change(&mut self, update: LimitsUpdate) {
        if update.renormalized {
            for artifact in self.artifacts.values_mut() {
                artifact.renormalize(&self.transform);
            }
        }
        self.regenerate_ticks();
        self.dirty.mark();
    }

    /// Regenerates tick values and repositions their labels.
    pub fn regenerate_ticks(&mut self) {
        let limits = self.transform.limits();
        self.h_ticks = gen_ticks(limits.l, limits.r, self.max_h_ticks);
        self.v_ticks = gen_ticks(limits.b, limits.t, self.max_v_ticks);

        let x = f64::from(self.pixel_rect.x);
        let y = f64::from(self.pixel_rect.y);
        let w = f64::from(self.pixel_rect.width);
        let h = f64::from(self.pixel_rect.height);

        let h_entries = self.h_ticks.ticks.iter().map(|tick| {
            let px = x + (tick.value - limits.l) * w / limits.width();
            (tick.label.as_str(), ScreenPoint::new(px, y))
        });
        sync_tick_labels(&mut self.h_tick_labels, h_entries, Anchor::N, &self.font);

        let v_entries = self.v_ticks.ticks.iter().map(|tick| {
            let py = y + ((tick.value - limits.b) * h / limits.height()).trunc() + 2.0;
            (tick.label.as_str(), ScreenPoint::new(x - 2.0, py))
        });
        sync_tick_labels(&mut self.v_tick_labels, v_entries, Anchor::E, &self.font);
    }

    pub fn add_lines(
        &mut self,
        points: Vec<DataPoint>,
        style: SeriesStyle,
    ) -> PlotResult<ArtifactId> {
        self.add_series(SeriesKind::Lines, points, style)
    }

    /// Adds unconnected markers.
    pub fn add_points(
        &mut self,
        points: Vec<DataPoint>,
        style: SeriesStyle,
    ) -> PlotResult<ArtifactId> {
        let point_size = style.point_size.or(Some(DEFAULT_POINT_SIZE));
        let style = style.with_line_width(None).with_point_size(point_size);
        self.add_series(SeriesKind::Lines, points, style)
    }

    pub fn add_steps(
        &mut self,
        points: Vec<DataPoint>,
        style: SeriesStyle,
    ) -> PlotResult<ArtifactId> {
        self.add_series(SeriesKind::Steps, points, style)
    }

    pub fn add_hline(&mut self, y: f64, style: SeriesStyle) -> PlotResult<ArtifactId> {
        self.add_reference(ReferenceOrientation::Horizontal, y, style)
    }

    pub fn add_vline(&mut self, x: f64, style: SeriesStyle) -> PlotResult<ArtifactId> {
        self.add_reference(ReferenceOrientation::Vertical, x, style)
    }

    /// Replaces the samples of an existing series.
    pub fn set_series_points(&mut self, id: ArtifactId, points: Vec<DataPoint>) -> PlotResult<()> {
        let artifact = self
            .artifacts
            .get_mut(&id)
            .ok_or(PlotError::UnknownArtifact(id))?;
        let ArtifactKind::Series(series) = &mut artifact.kind else {
            return Err(PlotError::InvalidData(format!(
                "artifact {} is a reference line, not a series",
                id.raw()
            )));
        };
        series.set_points(points);
        series.renormalize(&self.transform);
        self.dirty.mark();
        Ok(())
    }

    pub fn set_artifact_visible(&mut self, id: ArtifactId, visible: bool) -> PlotResult<()> {
        let artifact = self
            .artifacts
            .get_mut(&id)
            .ok_or(PlotError::UnknownArtifact(id))?;
        if artifact.visible != visible {
            artifact.visible = visible;
            self.dirty.mark();
        }
        Ok(())
    }

    pub fn remove_artifact(&mut self, id: ArtifactId) -> PlotResult<Artifact> {
        let artifact = self
            .artifacts
            .shift_remove(&id)
            .ok_or(PlotError::UnknownArtifact(id))?;
        self.dirty.mark();
        Ok(artifact)
    }

    #[must_use]
    pub fn artifact(&self, id: ArtifactId) -> Option<&Artifact> {
        self.artifacts.get(&id)
    }

    #[must_use]
    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Artifact ids in insertion (and drawing) order.
    #[must_use]
    pub fn draw_order(&self) -> Vec<ArtifactId> {
        self.artifacts.keys().copied().collect()
    }

    fn add_series(
        &mut self,
        kind: SeriesKind,
        points: Vec<DataPoint>,
        style: SeriesStyle,
    ) -> PlotResult<ArtifactId> {
        let style = style.validate()?;
        let mut series = Series::new(kind, points, style);
        series.renormalize(&self.transform);
        Ok(self.insert_artifact(ArtifactKind::Series(series)))
    }

    fn add_reference(
        &mut self,
        orientation: ReferenceOrientation,
        value: f64,
        style: SeriesStyle,
    ) -> PlotResult<ArtifactId> {
        if !value.is_finite() {
            return Err(PlotError::InvalidData(
                "reference line position must be finite".to_owned(),
            ));
        }
        let style = style.validate()?;
        let line = ReferenceLine::new(orientation, value, style);
        Ok(self.insert_artifact(ArtifactKind::Reference(line)))
    }

    fn insert_artifact(&mut self, kind: ArtifactKind) -> ArtifactId {
        let id = ArtifactId::new(self.next_artifact_id);
        self.next_artifact_id += 1;
        self.artifacts.insert(id, Artifact::new(kind));
        self.dirty.mark();
        id
    }
}

/// Window-pixel plot box and framebuffer data viewport for a padded cell.
fn layout_rects(
    bounds: Rect,
    gutter: PlotGutter,
    window: Viewport,
    framebuffer: Viewport,
) -> (PixelRect, PixelRect) {
    let ww = f64::from(window.width);
    let wh = f64::from(window.height);
    let x = ((bounds.l + gutter.left) * ww).floor();
    let y = ((bounds.b + gutter.bottom) * wh).floor();
    let w = ((bounds.width() - gutter.left) * ww).floor();
    let h = ((bounds.height() - gutter.bottom) * wh).floor();

    let sx = f64::from(framebuffer.width) / ww;
    let sy = f64::from(framebuffer.height) / wh;
    let pixel_rect = PixelRect::new(x as i32, y as i32, w as i32, h as i32);
    let framebuffer_rect = PixelRect::new(
        ((x + 1.0) * sx).round() as i32,
        ((y + 1.0) * sy).round() as i32,
        ((w - 1.0) * sx).round() as i32,
        ((h - 1.0) * sy).round() as i32,
    );
    (pixel_rect, framebuffer_rect)
}

/// Window-pixel box inside the border where data is drawn.
fn data_area(rect: PixelRect) -> Rect {
    let x = f64::from(rect.x);
    let y = f64::from(rect.y);
    Rect::new(
        x + 1.0,
        y + 1.0,
        x + f64::from(rect.width),
        y + f64::from(rect.height),
    )
}

fn pixel_rect_as_rect(rect: PixelRect) -> Rect {
    let x = f64::from(rect.x);
    let y = f64::from(rect.y);
    Rect::new(
        x,
        y,
        x + f64::from(rect.width),
        y + f64::from(rect.height),
    )
}

fn ordered_pair(axis: &str, lo: f64, hi: f64) -> PlotResult<(f64, f64)> {
    if !lo.is_finite() || !hi.is_finite() {
        return Err(PlotError::InvalidLimits(format!(
            "{axis} limits must be finite, got ({lo}, {hi})"
        )));
    }
    Ok((lo.min(hi), lo.max(hi)))
}

fn fitted_range(lo: f64, hi: f64, margin: f64) -> (f64, f64) {
    if hi - lo <= 0.0 {
        return (lo - 0.5, hi + 0.5);
    }
    let center = (lo + hi) / 2.0;
    let half = (hi - lo) * margin / 2.0;
    (center - half, center + half)
}

fn sync_tick_labels<'a>(
    labels: &mut Vec<Label>,
    entries: impl Iterator<Item = (&'a str, ScreenPoint)>,
    anchor: Anchor,
    font: &Font,
) {
    let mut count = 0;
    for (index, (text, position)) in entries.enumerate() {
        match labels.get_mut(index) {
            Some(label) => {
                label.set_text(text);
                label.set_position(position);
            }
            None => labels.push(Label::new(text, position, anchor, font.clone())),
        }
        count = index + 1;
    }
    labels.truncate(count);
}
