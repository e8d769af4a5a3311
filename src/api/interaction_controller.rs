use tracing::{debug, trace};

use crate::core::ScreenPoint;
use crate::error::PlotResult;
use crate::interaction::{DragAnchor, InputEvent, InteractionMode, PointerButton, scroll_zoom_factor};
use crate::render::RenderBackend;

use super::Figure;

impl<B: RenderBackend> Figure<B> {
    /// Dispatches one host input event.
    ///
    /// Scrolling zooms about the cursor, a primary-button drag pans while
    /// keeping the grabbed data point under the cursor, and a double click
    /// fits the plot under the cursor to its data.
    pub fn handle_event(&mut self, event: InputEvent) -> PlotResult<()> {
        trace!(?event, "input event");
        match event {
            InputEvent::Resized {
                window,
                framebuffer,
            } => self.resize(window, framebuffer),
            InputEvent::PointerMoved { x, y } => self.on_pointer_moved(x, y),
            InputEvent::PointerPressed { button, x, y } => {
                self.interaction.on_pointer_move(x, y);
                if button == PointerButton::Primary
                    && let Some(hit) = self.pointer_query(ScreenPoint::new(x, y))
                {
                    self.interaction.begin_pan(DragAnchor {
                        plot: hit.plot,
                        data: hit.data,
                    });
                }
                Ok(())
            }
            InputEvent::PointerReleased { button, x, y } => {
                self.interaction.on_pointer_move(x, y);
                if button == PointerButton::Primary {
                    self.interaction.end_pan();
                }
                Ok(())
            }
            InputEvent::Scrolled { x, y, delta } => {
                let point = ScreenPoint::new(x, y);
                let Some(plot) = self.find_plot(point) else {
                    return Ok(());
                };
                let factor = scroll_zoom_factor(self.config.scroll_zoom_base, delta);
                self.zoom_at(plot, point, factor)
            }
            InputEvent::DoubleClicked { x, y } => {
                let Some(plot) = self.find_plot(ScreenPoint::new(x, y)) else {
                    return Ok(());
                };
                self.zoom_to_fit(plot).map(|_| ())
            }
            InputEvent::Iconified(iconified) => {
                self.iconified = iconified;
                if !iconified {
                    self.dirty.mark();
                }
                Ok(())
            }
            InputEvent::Refresh => {
                self.dirty.mark();
                Ok(())
            }
            InputEvent::CloseRequested => {
                debug!("figure close requested");
                self.close_requested = true;
                Ok(())
            }
        }
    }

    fn on_pointer_moved(&mut self, x: f64, y: f64) -> PlotResult<()> {
        self.interaction.on_pointer_move(x, y);
        if self.interaction.mode() != InteractionMode::Panning {
            return Ok(());
        }
        let Some(anchor) = self.interaction.drag_anchor() else {
            return Ok(());
        };
        self.pan_to(anchor.plot, anchor.data, ScreenPoint::new(x, y), 1.0, 1.0)
    }
}
