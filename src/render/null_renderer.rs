use crate::core::{PixelRect, Viewport};
use crate::error::PlotResult;
use crate::render::{
    Color, Font, Primitive, PrimitiveKind, RenderBackend, TextExtent, VertexBuffer,
};

/// Average glyph advance relative to the font size used for headless metrics.
const GLYPH_ADVANCE_RATIO: f64 = 0.6;

/// One draw call captured by [`NullRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPrimitive {
    pub kind: PrimitiveKind,
    pub vertex_count: usize,
    pub viewport: PixelRect,
    pub color: Color,
}

/// Headless renderer used by tests and GPU-less embedding.
///
/// It still validates every primitive so tests catch invalid geometry before
/// a real backend is introduced, and it records draw calls per frame.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_begun: usize,
    pub frames_presented: usize,
    pub text_uploads: usize,
    pub last_framebuffer: Option<Viewport>,
    pub commands: Vec<RecordedPrimitive>,
}

impl NullRenderer {
    #[must_use]
    pub fn count_kind(&self, predicate: impl Fn(PrimitiveKind) -> bool) -> usize {
        self.commands
            .iter()
            .filter(|command| predicate(command.kind))
            .count()
    }
}

impl RenderBackend for NullRenderer {
    fn begin_frame(&mut self, framebuffer: Viewport) -> PlotResult<()> {
        self.frames_begun += 1;
        self.last_framebuffer = Some(framebuffer);
        self.commands.clear();
        Ok(())
    }

    fn draw_primitive(
        &mut self,
        primitive: Primitive<'_>,
        viewport: PixelRect,
        _transform: &[[f32; 4]; 4],
        color: Color,
    ) -> PlotResult<()> {
        primitive.validate()?;
        color.validate()?;
        self.commands.push(RecordedPrimitive {
            kind: primitive.kind,
            vertex_count: primitive.vertices.len(),
            viewport,
            color,
        });
        Ok(())
    }

    fn measure_text(&self, text: &str, font: &Font) -> TextExtent {
        if text.is_empty() {
            return TextExtent::default();
        }
        let glyphs = text.chars().count() as f64;
        TextExtent::new(glyphs * font.size_px * GLYPH_ADVANCE_RATIO, font.size_px)
    }

    fn upload_text_geometry(&mut self, text: &str, font: &Font) -> PlotResult<VertexBuffer> {
        self.text_uploads += 1;
        let extent = self.measure_text(text, font);
        if text.is_empty() {
            return Ok(VertexBuffer::default());
        }
        let (w, h) = (extent.width as f32, extent.height as f32);
        Ok(VertexBuffer::new(vec![
            [0.0, 0.0],
            [w, 0.0],
            [w, h],
            [0.0, 0.0],
            [w, h],
            [0.0, h],
        ]))
    }

    fn end_frame(&mut self) -> PlotResult<()> {
        self.frames_presented += 1;
        Ok(())
    }
}
