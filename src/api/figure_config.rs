use serde::{Deserialize, Serialize};

use crate::core::{
    AspectPolicy, DEFAULT_MAX_H_TICKS, DEFAULT_MAX_V_TICKS, DEFAULT_RENORMALIZATION_BITS,
    LayoutPadding, PlotId, Rect, Viewport,
};
use crate::error::{PlotError, PlotResult};
use crate::interaction::DEFAULT_SCROLL_ZOOM_BASE;
use crate::render::Font;

pub const FIGURE_CONFIG_JSON_SCHEMA_V1: u32 = 1;

/// Default expansion applied by zoom-to-fit around the data bounds.
pub const DEFAULT_ZOOM_TO_FIT_MARGIN: f64 = 1.05;

/// Fraction of the container reserved inside each plot cell for tick labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotGutter {
    pub left: f64,
    pub bottom: f64,
}

impl Default for PlotGutter {
    fn default() -> Self {
        Self {
            left: 0.05,
            bottom: 0.025,
        }
    }
}

/// Public figure bootstrap configuration.
///
/// Serializable so host applications can persist and reload their setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureConfig {
    pub window: Viewport,
    /// Framebuffer size; `None` means the same as `window`.
    #[serde(default)]
    pub framebuffer: Option<Viewport>,
    #[serde(default)]
    pub layout_padding: LayoutPadding,
    #[serde(default)]
    pub plot_gutter: PlotGutter,
    #[serde(default = "default_max_h_ticks")]
    pub max_h_ticks: usize,
    #[serde(default = "default_max_v_ticks")]
    pub max_v_ticks: usize,
    /// `log2` of the renormalization threshold `K`.
    #[serde(default = "default_renormalization_bits")]
    pub renormalization_bits: i32,
    #[serde(default)]
    pub label_font: Font,
    #[serde(default = "default_zoom_to_fit_margin")]
    pub zoom_to_fit_margin: f64,
    #[serde(default = "default_scroll_zoom_base")]
    pub scroll_zoom_base: f64,
}

impl FigureConfig {
    /// Creates a config with defaults for everything but the window size.
    #[must_use]
    pub fn new(window: Viewport) -> Self {
        Self {
            window,
            framebuffer: None,
            layout_padding: LayoutPadding::default(),
            plot_gutter: PlotGutter::default(),
            max_h_ticks: default_max_h_ticks(),
            max_v_ticks: default_max_v_ticks(),
            renormalization_bits: default_renormalization_bits(),
            label_font: Font::default(),
            zoom_to_fit_margin: default_zoom_to_fit_margin(),
            scroll_zoom_base: default_scroll_zoom_base(),
        }
    }

    /// Sets a framebuffer size distinct from the window size (high-DPI).
    #[must_use]
    pub fn with_framebuffer(mut self, framebuffer: Viewport) -> Self {
        self.framebuffer = Some(framebuffer);
        self
    }

    #[must_use]
    pub fn with_layout_padding(mut self, padding: LayoutPadding) -> Self {
        self.layout_padding = padding;
        self
    }

    #[must_use]
    pub fn with_plot_gutter(mut self, gutter: PlotGutter) -> Self {
        self.plot_gutter = gutter;
        self
    }

    #[must_use]
    pub fn with_max_ticks(mut self, horizontal: usize, vertical: usize) -> Self {
        self.max_h_ticks = horizontal;
        self.max_v_ticks = vertical;
        self
    }

    #[must_use]
    pub fn with_renormalization_bits(mut self, bits: i32) -> Self {
        self.renormalization_bits = bits;
        self
    }

    #[must_use]
    pub fn with_label_font(mut self, font: Font) -> Self {
        self.label_font = font;
        self
    }

    #[must_use]
    pub fn with_zoom_to_fit_margin(mut self, margin: f64) -> Self {
        self.zoom_to_fit_margin = margin;
        self
    }

    #[must_use]
    pub fn framebuffer_size(&self) -> Viewport {
        self.framebuffer.unwrap_or(self.window)
    }

    pub fn validate(&self) -> PlotResult<()> {
        for viewport in [self.window, self.framebuffer_size()] {
            if !viewport.is_valid() {
                return Err(PlotError::InvalidViewport {
                    width: viewport.width,
                    height: viewport.height,
                });
            }
        }
        self.layout_padding.validate()?;
        let gutter = self.plot_gutter;
        if !(0.0..0.5).contains(&gutter.left) || !(0.0..0.5).contains(&gutter.bottom) {
            return Err(PlotError::Config(
                "plot gutter fractions must be in [0, 0.5)".to_owned(),
            ));
        }
        if !(1..=52).contains(&self.renormalization_bits) {
            return Err(PlotError::Config(
                "renormalization bits must be in 1..=52".to_owned(),
            ));
        }
        if !self.zoom_to_fit_margin.is_finite() || self.zoom_to_fit_margin <= 0.0 {
            return Err(PlotError::Config(
                "zoom-to-fit margin must be finite and > 0".to_owned(),
            ));
        }
        if !self.scroll_zoom_base.is_finite() || self.scroll_zoom_base <= 0.0 {
            return Err(PlotError::Config(
                "scroll zoom base must be finite and > 0".to_owned(),
            ));
        }
        if !self.label_font.size_px.is_finite() || self.label_font.size_px <= 0.0 {
            return Err(PlotError::Config(
                "label font size must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> PlotResult<String> {
        let payload = FigureConfigJsonContractV1 {
            schema_version: FIGURE_CONFIG_JSON_SCHEMA_V1,
            config: self.clone(),
        };
        serde_json::to_string_pretty(&payload)
            .map_err(|e| PlotError::Config(format!("failed to serialize figure config: {e}")))
    }

    /// Parses either a bare config or a versioned payload.
    pub fn from_json_str(input: &str) -> PlotResult<Self> {
        if let Ok(config) = serde_json::from_str::<Self>(input) {
            config.validate()?;
            return Ok(config);
        }
        let payload: FigureConfigJsonContractV1 = serde_json::from_str(input)
            .map_err(|e| PlotError::Config(format!("failed to parse figure config json: {e}")))?;
        if payload.schema_version != FIGURE_CONFIG_JSON_SCHEMA_V1 {
            return Err(PlotError::Config(format!(
                "unsupported figure config schema version: {}",
                payload.schema_version
            )));
        }
        payload.config.validate()?;
        Ok(payload.config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FigureConfigJsonContractV1 {
    schema_version: u32,
    config: FigureConfig,
}

fn default_max_h_ticks() -> usize {
    DEFAULT_MAX_H_TICKS
}

fn default_max_v_ticks() -> usize {
    DEFAULT_MAX_V_TICKS
}

fn default_renormalization_bits() -> i32 {
    DEFAULT_RENORMALIZATION_BITS
}

fn default_zoom_to_fit_margin() -> f64 {
    DEFAULT_ZOOM_TO_FIT_MARGIN
}

fn default_scroll_zoom_base() -> f64 {
    DEFAULT_SCROLL_ZOOM_BASE
}

/// Per-plot creation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotOptions {
    /// Initial data limits; `None` means `(-1, -1, 1, 1)`, or the partner's
    /// range when the plot shares an axis.
    #[serde(default)]
    pub limits: Option<Rect>,
    #[serde(default)]
    pub aspect: AspectPolicy,
    #[serde(default)]
    pub max_h_ticks: Option<usize>,
    #[serde(default)]
    pub max_v_ticks: Option<usize>,
    #[serde(default)]
    pub share_x: Option<PlotId>,
    #[serde(default)]
    pub share_y: Option<PlotId>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default = "default_border_width")]
    pub border_width: f64,
    #[serde(default)]
    pub label_font: Option<Font>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            limits: None,
            aspect: AspectPolicy::None,
            max_h_ticks: None,
            max_v_ticks: None,
            share_x: None,
            share_y: None,
            visible: default_visible(),
            border_width: default_border_width(),
            label_font: None,
        }
    }
}

impl PlotOptions {
    /// Initial limits in `(l, b, r, t)` order.
    #[must_use]
    pub fn with_limits(mut self, l: f64, b: f64, r: f64, t: f64) -> Self {
        self.limits = Some(Rect::new(l, b, r, t));
        self
    }

    #[must_use]
    pub fn with_aspect(mut self, aspect: AspectPolicy) -> Self {
        self.aspect = aspect;
        self
    }

    #[must_use]
    pub fn with_max_ticks(mut self, horizontal: usize, vertical: usize) -> Self {
        self.max_h_ticks = Some(horizontal);
        self.max_v_ticks = Some(vertical);
        self
    }

    #[must_use]
    pub fn sharing_x(mut self, partner: PlotId) -> Self {
        self.share_x = Some(partner);
        self
    }

    #[must_use]
    pub fn sharing_y(mut self, partner: PlotId) -> Self {
        self.share_y = Some(partner);
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    #[must_use]
    pub fn with_border_width(mut self, width: f64) -> Self {
        self.border_width = width;
        self
    }

    #[must_use]
    pub fn with_label_font(mut self, font: Font) -> Self {
        self.label_font = Some(font);
        self
    }

    pub(super) fn validate(&self) -> PlotResult<()> {
        if let Some(limits) = self.limits
            && !limits.is_finite()
        {
            return Err(PlotError::InvalidLimits(
                "initial plot limits must be finite".to_owned(),
            ));
        }
        if !self.border_width.is_finite() || self.border_width <= 0.0 {
            return Err(PlotError::Config(
                "border width must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_visible() -> bool {
    true
}

fn default_border_width() -> f64 {
    1.0
}
