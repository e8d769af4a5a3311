use crate::core::{AffineMatrix4, PixelRect, ScreenPoint, Viewport};
use crate::error::{PlotError, PlotResult};
use crate::render::{
    Anchor, Color, Font, Primitive, PrimitiveKind, RenderBackend, TextExtent, VertexBuffer,
};

/// Text placed in container pixels, rotated by `theta` around its anchor.
///
/// Glyph geometry is uploaded lazily on the first draw after a text or font
/// change and reused until the next change.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    text: String,
    position: ScreenPoint,
    anchor: Anchor,
    theta: f64,
    font: Font,
    color: Color,
    visible: bool,
    geometry: Option<VertexBuffer>,
    extent: Option<TextExtent>,
}

impl Label {
    #[must_use]
    pub fn new(text: impl Into<String>, position: ScreenPoint, anchor: Anchor, font: Font) -> Self {
        Self {
            text: text.into(),
            position,
            anchor,
            theta: 0.0,
            font,
            color: Color::BLACK,
            visible: true,
            geometry: None,
            extent: None,
        }
    }

    #[must_use]
    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn position(&self) -> ScreenPoint {
        self.position
    }

    #[must_use]
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    #[must_use]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    #[must_use]
    pub fn font(&self) -> &Font {
        &self.font
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns `true` when the text actually changed.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text.clear();
        self.text.push_str(text);
        self.invalidate_geometry();
        true
    }

    pub fn set_position(&mut self, position: ScreenPoint) {
        self.position = position;
    }

    pub fn set_anchor(&mut self, anchor: Anchor) {
        self.anchor = anchor;
    }

    pub fn set_theta(&mut self, theta: f64) {
        self.theta = theta;
    }

    pub fn set_font(&mut self, font: Font) {
        if self.font != font {
            self.font = font;
            self.invalidate_geometry();
        }
    }

    pub fn set_color(&mut self, color: Color) -> PlotResult<()> {
        color.validate()?;
        self.color = color;
        Ok(())
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Measured size, cached until the text or font changes.
    pub fn extent<B: RenderBackend>(&mut self, backend: &B) -> TextExtent {
        *self
            .extent
            .get_or_insert_with(|| backend.measure_text(&self.text, &self.font))
    }

    /// Model-view-projection placing the glyph run for a `window`-sized
    /// container.
    pub fn transform<B: RenderBackend>(&mut self, backend: &B, window: Viewport) -> AffineMatrix4 {
        let extent = self.extent(backend);
        let (fx, fy) = self.anchor.offset_fractions();
        let dx = (extent.width * fx).round();
        let dy = (extent.height * fy).round();
        AffineMatrix4::ortho(
            0.0,
            f64::from(window.width),
            0.0,
            f64::from(window.height),
            -1.0,
            1.0,
        ) * AffineMatrix4::translate(self.position.x, self.position.y)
            * AffineMatrix4::rotate(self.theta)
            * AffineMatrix4::translate(-dx, -dy)
    }

    pub fn draw<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        window: Viewport,
        framebuffer: Viewport,
    ) -> PlotResult<()> {
        if !self.visible || self.text.is_empty() {
            return Ok(());
        }
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            return Err(PlotError::InvalidData(format!(
                "label `{}` has a non-finite position",
                self.text
            )));
        }
        if self.geometry.is_none() {
            self.geometry = Some(backend.upload_text_geometry(&self.text, &self.font)?);
        }
        let mvp = self.transform(backend, window).to_f32();
        let Some(geometry) = self.geometry.as_ref() else {
            return Ok(());
        };
        backend.draw_primitive(
            Primitive::new(PrimitiveKind::Glyphs, &geometry.vertices),
            full_framebuffer(framebuffer),
            &mvp,
            self.color,
        )
    }

    fn invalidate_geometry(&mut self) {
        self.geometry = None;
        self.extent = None;
    }
}

/// Free-floating label positioned as a fraction of the window, re-placed on
/// every resize.
#[derive(Debug, Clone, PartialEq)]
pub struct FlexLabel {
    label: Label,
    fraction_x: f64,
    fraction_y: f64,
}

impl FlexLabel {
    pub fn new(
        text: impl Into<String>,
        fraction_x: f64,
        fraction_y: f64,
        anchor: Anchor,
        font: Font,
        window: Viewport,
    ) -> PlotResult<Self> {
        if !fraction_x.is_finite() || !fraction_y.is_finite() {
            return Err(PlotError::InvalidBounds(
                "label fractions must be finite".to_owned(),
            ));
        }
        let mut flex = Self {
            label: Label::new(text, ScreenPoint::new(0.0, 0.0), anchor, font),
            fraction_x,
            fraction_y,
        };
        flex.relayout(window);
        Ok(flex)
    }

    #[must_use]
    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn label_mut(&mut self) -> &mut Label {
        &mut self.label
    }

    #[must_use]
    pub fn fractions(&self) -> (f64, f64) {
        (self.fraction_x, self.fraction_y)
    }

    pub fn relayout(&mut self, window: Viewport) {
        self.label.set_position(ScreenPoint::new(
            (self.fraction_x * f64::from(window.width)).round(),
            (self.fraction_y * f64::from(window.height)).round(),
        ));
    }
}

pub(super) fn full_framebuffer(framebuffer: Viewport) -> PixelRect {
    PixelRect::new(
        0,
        0,
        i32::try_from(framebuffer.width).unwrap_or(i32::MAX),
        i32::try_from(framebuffer.height).unwrap_or(i32::MAX),
    )
}

#[cfg(test)]
mod tests {
    use super::Label;
    use crate::core::{ScreenPoint, Viewport};
    use crate::render::{Anchor, Font, NullRenderer, RenderBackend};

    #[test]
    fn geometry_is_uploaded_once_per_text() {
        let mut backend = NullRenderer::default();
        let window = Viewport::new(200, 100);
        let mut label = Label::new("12", ScreenPoint::new(10.0, 10.0), Anchor::N, Font::default());
        backend.begin_frame(window).expect("begin");
        label.draw(&mut backend, window, window).expect("draw");
        label.draw(&mut backend, window, window).expect("draw");
        assert_eq!(backend.text_uploads, 1);

        assert!(!label.set_text("12"));
        assert!(label.set_text("14"));
        label.draw(&mut backend, window, window).expect("draw");
        assert_eq!(backend.text_uploads, 2);
    }

    #[test]
    fn anchor_offset_is_rounded_to_whole_pixels() {
        let backend = NullRenderer::default();
        let window = Viewport::new(200, 100);
        // "abc" at 10px measures 18 x 10 in the headless backend.
        let mut label = Label::new(
            "abc",
            ScreenPoint::new(50.0, 40.0),
            Anchor::C,
            Font::new("sans", 10.0),
        );
        let mvp = label.transform(&backend, window);
        let ortho = crate::core::AffineMatrix4::ortho(0.0, 200.0, 0.0, 100.0, -1.0, 1.0);
        let (x, y) = mvp.apply(0.0, 0.0);
        let (ex, ey) = ortho.apply(41.0, 35.0);
        assert!((x - ex).abs() < 1e-12);
        assert!((y - ey).abs() < 1e-12);
    }
}
