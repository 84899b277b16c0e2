// Imports
use piet::RenderContext;

/// Trait for types that can draw themselves on a [piet::RenderContext].
pub trait Drawable {
    /// Draw itself in user coordinates.
    ///
    /// The context transform is expected to map user space to device space, with y pointing up.
    /// `ppu` is the current pixels per unit, needed for everything that is sized in pixels.
    /// The implementors are expected to save/restore the drawing context when they change its state.
    fn draw(&self, cx: &mut impl piet::RenderContext, ppu: f64) -> anyhow::Result<()>;

    /// Draw itself to a [cairo::Context].
    fn draw_to_cairo(&self, cx: &cairo::Context, ppu: f64) -> anyhow::Result<()> {
        let mut piet_cx = piet_cairo::CairoRenderContext::new(cx);
        self.draw(&mut piet_cx, ppu)?;
        piet_cx.finish().map_err(|e| anyhow::anyhow!("{e:?}"))
    }
}
