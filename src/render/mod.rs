mod null_renderer;
mod primitives;

pub use null_renderer::{NullRenderer, RecordedPrimitive};
pub use primitives::{
    Anchor, Color, Font, Primitive, PrimitiveKind, TextExtent, VertexBuffer,
};

use crate::core::{PixelRect, Viewport};
use crate::error::PlotResult;

/// Contract implemented by any rendering backend.
///
/// Backends only ever see single-precision vertex runs, a framebuffer
/// viewport and a single-precision transform, so buffer and shader management
/// stays isolated from plot geometry and view synchronization.
pub trait RenderBackend {
    /// Called once before a figure issues its draw calls.
    fn begin_frame(&mut self, _framebuffer: Viewport) -> PlotResult<()> {
        Ok(())
    }

    fn draw_primitive(
        &mut self,
        primitive: Primitive<'_>,
        viewport: PixelRect,
        transform: &[[f32; 4]; 4],
        color: Color,
    ) -> PlotResult<()>;

    fn measure_text(&self, text: &str, font: &Font) -> TextExtent;

    /// Shapes `text` into a glyph triangle list anchored at the origin, with
    /// the baseline-left corner at `(0, 0)`.
    fn upload_text_geometry(&mut self, text: &str, font: &Font) -> PlotResult<VertexBuffer>;

    /// Presents the finished frame.
    fn end_frame(&mut self) -> PlotResult<()> {
        Ok(())
    }
}
