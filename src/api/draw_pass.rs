use tracing::trace;

use crate::core::{AffineMatrix4, ArtifactKind, PixelRect, ScreenPoint, Viewport};
use crate::error::PlotResult;
use crate::render::{Color, Primitive, PrimitiveKind, RenderBackend};

use super::label::full_framebuffer;
use super::plot::{Plot, XLabelSide, YLabelSide};
use super::Figure;

/// Gap in pixels between the tick labels and the x-axis title.
const X_TITLE_GAP: f64 = 6.0;
/// Offset in pixels of a top x-axis title above the plot box.
const X_TITLE_TOP_OFFSET: f64 = 18.0;
/// Extra gap in pixels, on top of the font size, around a y-axis title.
const Y_TITLE_GAP: f64 = 4.0;

impl<B: RenderBackend> Figure<B> {
    /// Applies pending series feeds and draws one frame, clearing the dirty
    /// flag up to the generation seen at the start of the pass.
    ///
    /// An iconified figure skips drawing and stays dirty.
    pub fn draw(&mut self) -> PlotResult<()> {
        self.apply_pending_feeds();
        if self.iconified {
            return Ok(());
        }
        let ticket = self.dirty.begin_draw();
        self.render_frame()?;
        self.dirty.complete_draw(ticket);
        Ok(())
    }

    /// Issues every draw call of one frame without touching the dirty flag.
    pub(super) fn render_frame(&mut self) -> PlotResult<()> {
        let window = self.window;
        let framebuffer = self.framebuffer;
        self.backend.begin_frame(framebuffer)?;
        for plot in self.plots.values_mut() {
            plot.draw(&mut self.backend, window, framebuffer)?;
        }
        for label in self.labels.values_mut() {
            label.label_mut().draw(&mut self.backend, window, framebuffer)?;
        }
        self.backend.end_frame()?;
        trace!(plots = self.plots.len(), labels = self.labels.len(), "frame rendered");
        Ok(())
    }
}

impl Plot {
    /// Draws the border, tick labels, axis titles and then every visible
    /// artifact in insertion order.
    pub(super) fn draw<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        window: Viewport,
        framebuffer: Viewport,
    ) -> PlotResult<()> {
        if !self.is_visible() {
            return Ok(());
        }
        self.draw_border(backend, window, framebuffer)?;
        for label in self
            .h_tick_labels
            .iter_mut()
            .chain(self.v_tick_labels.iter_mut())
        {
            label.draw(backend, window, framebuffer)?;
        }
        self.place_axis_titles(backend);
        if let Some((label, _)) = self.x_title.as_mut() {
            label.draw(backend, window, framebuffer)?;
        }
        if let Some((label, _)) = self.y_title.as_mut() {
            label.draw(backend, window, framebuffer)?;
        }
        self.draw_artifacts(backend)
    }

    fn draw_border<B: RenderBackend>(
        &self,
        backend: &mut B,
        window: Viewport,
        framebuffer: Viewport,
    ) -> PlotResult<()> {
        let PixelRect {
            x,
            y,
            width,
            height,
        } = self.pixel_rect();
        if width <= 0 || height <= 0 {
            return Ok(());
        }
        let l = x as f32 + 0.5;
        let b = y as f32 + 0.5;
        let r = l + width as f32;
        let t = b + height as f32;
        let vertices = [[l, b], [r, b], [r, t], [l, t], [l, b]];
        let mvp = window_projection(window).to_f32();
        backend.draw_primitive(
            Primitive::new(
                PrimitiveKind::LineStrip {
                    width: self.border_width(),
                },
                &vertices,
            ),
            full_framebuffer(framebuffer),
            &mvp,
            Color::BLACK,
        )
    }

    /// Positions the axis titles relative to the measured tick labels.
    fn place_axis_titles<B: RenderBackend>(&mut self, backend: &B) {
        let PixelRect {
            x,
            y,
            width,
            height,
        } = self.pixel_rect();
        let (x, y) = (f64::from(x), f64::from(y));
        let (w, h) = (f64::from(width), f64::from(height));
        let font_size = self.font().size_px;

        if self.x_title.is_some() {
            let tick_height = self
                .h_tick_labels
                .iter_mut()
                .map(|label| label.extent(backend).height)
                .fold(0.0, f64::max);
            if let Some((label, side)) = self.x_title.as_mut() {
                let py = match side {
                    XLabelSide::Bottom => y - tick_height - X_TITLE_GAP,
                    XLabelSide::Top => y + h + X_TITLE_TOP_OFFSET,
                };
                label.set_position(ScreenPoint::new(x + w / 2.0, py));
            }
        }

        if self.y_title.is_some() {
            let tick_width = self
                .v_tick_labels
                .iter_mut()
                .map(|label| label.extent(backend).width)
                .fold(0.0, f64::max);
            if let Some((label, side)) = self.y_title.as_mut() {
                let px = match side {
                    YLabelSide::Left => x - tick_width - (font_size + Y_TITLE_GAP),
                    YLabelSide::Right => x + w + font_size + Y_TITLE_GAP,
                };
                label.set_position(ScreenPoint::new(px, y + h / 2.0));
            }
        }
    }

    fn draw_artifacts<B: RenderBackend>(&self, backend: &mut B) -> PlotResult<()> {
        let viewport = self.framebuffer_rect();
        if !viewport.is_valid() {
            return Ok(());
        }
        let view = self.transform().view_matrix_f32();
        for artifact in self.artifacts.values().filter(|artifact| artifact.visible) {
            let style = artifact.style();
            match &artifact.kind {
                ArtifactKind::Series(series) => {
                    for run in series
                        .renormalized_vertices()
                        .split(|v| !v[0].is_finite() || !v[1].is_finite())
                        .filter(|run| !run.is_empty())
                    {
                        if let Some(width) = style.line_width
                            && run.len() > 1
                        {
                            backend.draw_primitive(
                                Primitive::new(PrimitiveKind::LineStrip { width }, run),
                                viewport,
                                view,
                                style.color,
                            )?;
                        }
                        if let Some(size) = style.point_size {
                            backend.draw_primitive(
                                Primitive::new(PrimitiveKind::Points { size }, run),
                                viewport,
                                view,
                                style.color,
                            )?;
                        }
                    }
                }
                ArtifactKind::Reference(line) => {
                    let Some(segment) = line.renormalized_segment(self.transform()) else {
                        continue;
                    };
                    let width = style.line_width.unwrap_or(1.0);
                    backend.draw_primitive(
                        Primitive::new(PrimitiveKind::LineStrip { width }, &segment),
                        viewport,
                        view,
                        style.color,
                    )?;
                }
            }
        }
        Ok(())
    }
}

fn window_projection(window: Viewport) -> AffineMatrix4 {
    AffineMatrix4::ortho(
        0.0,
        f64::from(window.width),
        0.0,
        f64::from(window.height),
        -1.0,
        1.0,
    )
}
