// Imports
use crate::items::ItemBehaviour;
use crate::{Canvas, CanvasError, Drawable, LayerKey};
use oofcanvas_compose::ext::AabbExt;
use piet::RenderContext;
use tracing::error;

/// Converts a kurbo affine into a cairo matrix, both share the coefficient order.
pub(crate) fn cairo_matrix(affine: kurbo::Affine) -> cairo::Matrix {
    let [xx, yx, xy, yy, x0, y0] = affine.as_coeffs();
    cairo::Matrix::new(xx, yx, xy, yy, x0, y0)
}

impl Canvas {
    /// Draws the items of a layer in user coordinates, without its opacity.
    ///
    /// Items that fail to draw are logged and skipped.
    pub fn render_layer(
        &self,
        key: LayerKey,
        cx: &mut impl piet::RenderContext,
        ppu: f64,
    ) -> anyhow::Result<()> {
        let layer = self
            .layer(key)
            .ok_or_else(|| anyhow::anyhow!("Rendering layer failed, layer does not exist"))?;

        for item_key in layer.item_keys() {
            let Some(item) = self.item(*item_key) else {
                continue;
            };
            if let Err(e) = item.draw(cx, ppu) {
                error!("Drawing item {item} failed, Err: {e:?}");
            }
            if let Some((color, width)) = self.draw_bounds_style(*item_key) {
                if let Some(bounds) = item.bounds(ppu) {
                    cx.stroke(
                        bounds.to_kurbo_rect(),
                        &piet::Color::from(color),
                        width / ppu,
                    );
                }
            }
        }
        Ok(())
    }

    /// Renders a visible, non-empty layer into a group and paints it with the layer opacity.
    pub(crate) fn composite_layer(
        &self,
        cx: &cairo::Context,
        key: LayerKey,
        ppu: f64,
    ) -> Result<(), CanvasError> {
        let Some(layer) = self.layer(key) else {
            return Ok(());
        };
        if !layer.visible() || layer.empty() {
            return Ok(());
        }

        cx.push_group();
        let rendered = {
            let mut piet_cx = piet_cairo::CairoRenderContext::new(cx);
            self.render_layer(key, &mut piet_cx, ppu)
                .and_then(|()| piet_cx.finish().map_err(|e| anyhow::anyhow!("{e:?}")))
        };
        // the group is popped even when rendering failed, to leave the context balanced
        cx.pop_group_to_source()?;
        rendered?;
        cx.paint_with_alpha(layer.opacity())?;
        Ok(())
    }

    /// Paints the background color over the whole target of the context.
    pub(crate) fn paint_background(&self, cx: &cairo::Context) -> Result<(), CanvasError> {
        let color = self.background_color();
        cx.save()?;
        cx.set_source_rgb(color.r, color.g, color.b);
        cx.paint()?;
        cx.restore()?;
        Ok(())
    }

    /// Draws the layers in the given order, with the transform mapping user coordinates to pixels.
    pub(crate) fn draw_layers_to_cairo(
        &self,
        cx: &cairo::Context,
        layers: impl IntoIterator<Item = LayerKey>,
        transform: kurbo::Affine,
        ppu: f64,
        draw_background: bool,
    ) -> Result<(), CanvasError> {
        cx.save()?;
        if draw_background {
            self.paint_background(cx)?;
        }
        cx.set_antialias(if self.antialias() {
            cairo::Antialias::Default
        } else {
            cairo::Antialias::None
        });
        cx.transform(cairo_matrix(transform));
        for key in layers {
            self.composite_layer(cx, key, ppu)?;
        }
        cx.restore()?;
        Ok(())
    }

    /// Draws the background and the visible layers with the current ppu and transform.
    ///
    /// The context is expected to target a bitmap of at least [Canvas::bitmap_size].
    pub fn draw_to_cairo(&self, cx: &cairo::Context, draw_background: bool) -> Result<(), CanvasError> {
        self.draw_layers_to_cairo(
            cx,
            self.layer_keys().to_vec(),
            self.transform(),
            self.ppu(),
            draw_background,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{CanvasCircle, CanvasRectangle, CanvasText};
    use crate::utils::image_surface_to_rgba;
    use oofcanvas_compose::Color;

    fn render(canvas: &Canvas, draw_background: bool) -> image::RgbaImage {
        let size = canvas.bitmap_size();
        let mut surface = cairo::ImageSurface::create(
            cairo::Format::ARgb32,
            size[0].ceil() as i32,
            size[1].ceil() as i32,
        )
        .unwrap();
        {
            let cx = cairo::Context::new(&surface).unwrap();
            canvas.draw_to_cairo(&cx, draw_background).unwrap();
        }
        image_surface_to_rgba(&mut surface).unwrap()
    }

    #[test]
    fn layers_are_drawn_in_order() {
        let mut canvas = Canvas::new(1.0).unwrap();
        let bottom = canvas.new_layer("bottom");
        let top = canvas.new_layer("top");
        let mut rect = CanvasRectangle::new(na::vector![0.0, 0.0], na::vector![20.0, 20.0]);
        rect.style.set_fill_color(Color::RED);
        canvas.add_item(bottom, rect).unwrap();
        let mut small = CanvasRectangle::new(na::vector![0.0, 0.0], na::vector![10.0, 10.0]);
        small.style.set_fill_color(Color::BLUE);
        canvas.add_item(top, small).unwrap();
        canvas.set_ppu(2.0).unwrap();

        let img = render(&canvas, true);
        assert_eq!((img.width(), img.height()), (40, 40));
        // user y points up, so the lower left quarter is blue
        assert_eq!(img.get_pixel(5, 35).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(35, 5).0, [255, 0, 0, 255]);

        canvas.move_layer_to_bottom(top).unwrap();
        let img = render(&canvas, true);
        assert_eq!(img.get_pixel(5, 35).0, [255, 0, 0, 255]);
    }

    #[test]
    fn layer_opacity_and_visibility() {
        let mut canvas = Canvas::new(1.0).unwrap();
        let layer = canvas.new_layer("l");
        let mut circle = CanvasCircle::new(na::vector![0.0, 0.0], 10.0);
        circle.style.set_fill_color(Color::BLACK);
        canvas.add_item(layer, circle).unwrap();
        canvas.set_ppu(1.0).unwrap();

        canvas.layer_mut(layer).unwrap().set_opacity(0.5);
        let img = render(&canvas, true);
        let center = img.get_pixel(10, 10).0;
        assert!((126..=129).contains(&center[0]), "{center:?}");
        assert_eq!(center[3], 255);

        canvas.layer_mut(layer).unwrap().hide();
        let img = render(&canvas, false);
        assert_eq!(img.get_pixel(10, 10).0[3], 0);
    }

    #[test]
    fn dash_gaps_are_painted_in_dash_color() {
        let mut canvas = Canvas::new(1.0).unwrap();
        let layer = canvas.new_layer("l");
        let mut rect = CanvasRectangle::new(na::vector![0.0, 0.0], na::vector![40.0, 40.0]);
        rect.style.set_line_width(4.0);
        rect.style.set_line_color(Color::RED);
        rect.style.set_line_cap(oofcanvas_compose::LineCap::Butt);
        rect.style.set_dash_single(10.0);
        let key = canvas.add_item(layer, rect).unwrap();
        canvas.set_ppu(1.0).unwrap();

        // the outline starts at the lower left corner and runs along the bottom edge
        let img = render(&canvas, true);
        assert_eq!(img.get_pixel(7, 38).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(17, 38).0, [255, 255, 255, 255]);

        canvas
            .update_item(key, |item| {
                if let Some(style) = item.shape_style_mut() {
                    style.set_dash_color(Color::BLUE);
                }
            })
            .unwrap();
        let img = render(&canvas, true);
        assert_eq!(img.get_pixel(7, 38).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(17, 38).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(20, 20).0, [255, 255, 255, 255]);
    }

    #[test]
    fn item_bounds_overlay() {
        let mut canvas = Canvas::new(1.0).unwrap();
        let layer = canvas.new_layer("l");
        // neither lined nor filled, only the overlay is visible
        let key = canvas
            .add_item(
                layer,
                CanvasRectangle::new(na::vector![0.0, 0.0], na::vector![20.0, 20.0]),
            )
            .unwrap();
        canvas.set_margin(0.5);
        canvas.set_ppu(1.0).unwrap();
        assert_eq!(canvas.bitmap_size(), na::vector![40.0, 40.0]);

        let img = render(&canvas, true);
        assert_eq!(img.get_pixel(9, 20).0, [255, 255, 255, 255]);

        canvas
            .set_draw_bounds(key, Some((Color::BLACK, 2.0)))
            .unwrap();
        let img = render(&canvas, true);
        assert_eq!(img.get_pixel(9, 20).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(10, 20).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(20, 20).0, [255, 255, 255, 255]);

        canvas.set_draw_bounds(key, None).unwrap();
        let img = render(&canvas, true);
        assert_eq!(img.get_pixel(9, 20).0, [255, 255, 255, 255]);
    }

    #[test]
    fn text_is_drawn_in_its_color() {
        let mut canvas = Canvas::new(1.0).unwrap();
        let layer = canvas.new_layer("l");
        let mut text = CanvasText::new(na::vector![0.0, 0.0], "HHHH");
        text.set_font_size(20.0, false);
        canvas.add_item(layer, text).unwrap();
        canvas.set_ppu(2.0).unwrap();

        let img = render(&canvas, false);
        let inked = img.pixels().filter(|p| p.0[3] > 0).count();
        assert!(inked > 0);
        assert!(img.pixels().all(|p| p.0[0] == 0 && p.0[1] == 0 && p.0[2] == 0));
    }
}
