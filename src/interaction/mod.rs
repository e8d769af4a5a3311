use serde::{Deserialize, Serialize};

use crate::core::{DataPoint, PlotId, ScreenPoint, Viewport};

/// Default per-notch zoom factor applied to the view extent on scroll.
pub const DEFAULT_SCROLL_ZOOM_BASE: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Input delivered by the windowing host, in container coordinates
/// (origin bottom-left, y up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Container resized. `framebuffer` differs from `window` on high-DPI
    /// displays.
    Resized {
        window: Viewport,
        framebuffer: Viewport,
    },
    PointerMoved {
        x: f64,
        y: f64,
    },
    PointerPressed {
        button: PointerButton,
        x: f64,
        y: f64,
    },
    PointerReleased {
        button: PointerButton,
        x: f64,
        y: f64,
    },
    /// Positive `delta` zooms in.
    Scrolled {
        x: f64,
        y: f64,
        delta: f64,
    },
    DoubleClicked {
        x: f64,
        y: f64,
    },
    Iconified(bool),
    /// The host lost the surface contents and needs a repaint.
    Refresh,
    CloseRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionMode {
    Idle,
    Panning,
}

/// Data point grabbed at the start of a drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragAnchor {
    pub plot: PlotId,
    pub data: DataPoint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionState {
    mode: InteractionMode,
    pointer: Option<ScreenPoint>,
    drag: Option<DragAnchor>,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            mode: InteractionMode::Idle,
            pointer: None,
            drag: None,
        }
    }
}

impl InteractionState {
    #[must_use]
    pub fn mode(self) -> InteractionMode {
        self.mode
    }

    #[must_use]
    pub fn pointer(self) -> Option<ScreenPoint> {
        self.pointer
    }

    #[must_use]
    pub fn drag_anchor(self) -> Option<DragAnchor> {
        self.drag
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.pointer = Some(ScreenPoint::new(x, y));
    }

    pub fn begin_pan(&mut self, anchor: DragAnchor) {
        self.mode = InteractionMode::Panning;
        self.drag = Some(anchor);
    }

    pub fn end_pan(&mut self) {
        self.mode = InteractionMode::Idle;
        self.drag = None;
    }

    /// Forgets any drag that referenced `plot`.
    pub fn forget_plot(&mut self, plot: PlotId) {
        if self.drag.is_some_and(|anchor| anchor.plot == plot) {
            self.end_pan();
        }
    }
}

/// Extent multiplier for a scroll of `delta` notches.
#[must_use]
pub fn scroll_zoom_factor(base: f64, delta: f64) -> f64 {
    if !delta.is_finite() || !base.is_finite() || base <= 0.0 {
        return 1.0;
    }
    base.powf(delta)
}
