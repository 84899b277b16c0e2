// Imports
use oofcanvas::Canvas;
use oofcanvas_compose::ext::AabbExt;
use oofcanvas_compose::Coord;
use std::io::Write;

/// Lists the clicked items, optionally only those on the layer with the given name.
pub(crate) fn run_click(
    w: &mut impl Write,
    canvas: &Canvas,
    pt: Coord,
    layer_name: Option<&str>,
) -> anyhow::Result<()> {
    let only_layer = layer_name.map(|n| canvas.layer_by_name(n)).transpose()?;
    let clicked = canvas
        .clicked_items(pt)
        .into_iter()
        .filter_map(|key| Some((key, canvas.item_layer(key)?)))
        .filter(|(_, layer_key)| only_layer.map_or(true, |l| l == *layer_key))
        .collect::<Vec<_>>();
    if clicked.is_empty() {
        writeln!(w, "No items at ({}, {})", pt[0], pt[1])?;
        return Ok(());
    }
    for (key, layer_key) in clicked {
        let (Some(item), Some(layer)) = (canvas.item(key), canvas.layer(layer_key)) else {
            continue;
        };
        writeln!(w, "{}: {item}", layer.name())?;
    }
    Ok(())
}

pub(crate) fn run_info(
    w: &mut impl Write,
    canvas: &Canvas,
    width: f64,
    height: f64,
) -> anyhow::Result<()> {
    writeln!(w, "layers: {}", canvas.n_layers())?;
    for (i, (key, layer)) in canvas.layers().enumerate() {
        let bounds = canvas
            .layer_bounds(key, canvas.ppu())
            .map(|b| {
                format!(
                    "({}, {}) - ({}, {})",
                    b.mins[0], b.mins[1], b.maxs[0], b.maxs[1]
                )
            })
            .unwrap_or_else(|| String::from("none"));
        writeln!(
            w,
            "  {i}: \"{}\", {} items, visible: {}, clickable: {}, opacity: {}, bounds: {bounds}",
            layer.name(),
            layer.size(),
            layer.visible(),
            layer.clickable(),
            layer.opacity()
        )?;
    }
    writeln!(w, "visible items: {}", canvas.n_visible_items())?;
    match canvas.bounds(canvas.ppu()) {
        Some(bounds) => writeln!(
            w,
            "bounds at ppu {}: ({}, {}) - ({}, {}), {} x {}",
            canvas.ppu(),
            bounds.mins[0],
            bounds.mins[1],
            bounds.maxs[0],
            bounds.maxs[1],
            bounds.width(),
            bounds.height()
        )?,
        None => writeln!(w, "bounds: none")?,
    }
    let size = canvas.bitmap_size();
    writeln!(w, "bitmap size: {} x {}", size[0], size[1])?;
    writeln!(
        w,
        "ppu filling {width} x {height} pixels: {}",
        canvas.filled_ppu(width, height)
    )?;
    Ok(())
}

pub(crate) fn run_dump(w: &mut impl Write, canvas: &Canvas) -> anyhow::Result<()> {
    canvas.datadump(w)?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oofcanvas::items::CanvasRectangle;
    use oofcanvas::CanvasError;
    use oofcanvas_compose::Color;

    fn canvas_with_two_layers() -> Canvas {
        let mut canvas = Canvas::new(1.0).unwrap();
        let lower = canvas.new_layer("lower");
        let upper = canvas.new_layer("upper");
        for (layer, p1) in [(lower, 4.0), (upper, 2.0)] {
            canvas.layer_mut(layer).unwrap().set_clickable(true);
            let mut rect = CanvasRectangle::new(na::vector![0.0, 0.0], na::vector![p1, p1]);
            rect.style.set_fill_color(Color::RED);
            canvas.add_item(layer, rect).unwrap();
        }
        canvas.update_transform().unwrap();
        canvas
    }

    fn output(f: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn click_lists_items_per_layer() {
        let canvas = canvas_with_two_layers();
        let out = output(|w| run_click(w, &canvas, na::vector![1.0, 1.0], None));
        assert_eq!(
            out,
            "lower: CanvasRectangle((0, 0), (4, 4))\nupper: CanvasRectangle((0, 0), (2, 2))\n"
        );

        let out = output(|w| run_click(w, &canvas, na::vector![1.0, 1.0], Some("upper")));
        assert_eq!(out, "upper: CanvasRectangle((0, 0), (2, 2))\n");

        let out = output(|w| run_click(w, &canvas, na::vector![3.0, 3.0], Some("upper")));
        assert_eq!(out, "No items at (3, 3)\n");
    }

    #[test]
    fn click_unknown_layer() {
        let canvas = canvas_with_two_layers();
        let err = run_click(
            &mut Vec::new(),
            &canvas,
            na::vector![1.0, 1.0],
            Some("missing"),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CanvasError>(),
            Some(CanvasError::LayerNotFound(name)) if name == "missing"
        ));
    }

    #[test]
    fn info_and_dump() {
        let canvas = canvas_with_two_layers();
        let out = output(|w| run_info(w, &canvas, 100.0, 100.0));
        assert!(out.starts_with("layers: 2\n"));
        assert!(out.contains("  1: \"upper\", 1 items, visible: true, clickable: true"));
        assert!(out.contains("visible items: 2\n"));
        assert!(out.contains("ppu filling 100 x 100 pixels: 25\n"));

        let out = output(|w| run_dump(w, &canvas));
        assert_eq!(out.lines().count(), 5);
        assert!(out.contains("Layer 0 \"lower\": 1 items"));

        let empty = Canvas::new(1.0).unwrap();
        let out = output(|w| run_info(w, &empty, 100.0, 100.0));
        assert!(out.contains("bounds: none\n"));
    }
}
