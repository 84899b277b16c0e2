// Imports
use super::{fmt_coord, ItemBehaviour, ShapeStyle};
use crate::Drawable;
use oofcanvas_compose::ext::AabbExt;
use oofcanvas_compose::Coord;
use p2d::bounding_volume::Aabb;
use serde::{Deserialize, Serialize};

/// A axis aligned rectangle.
///
/// The outline is drawn inside the corners, so the bounds don't depend on the line width.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename = "canvas_rectangle")]
pub struct CanvasRectangle {
    #[serde(rename = "p0")]
    p0: Coord,
    #[serde(rename = "p1")]
    p1: Coord,
    #[serde(rename = "style")]
    pub style: ShapeStyle,
}

impl Default for CanvasRectangle {
    fn default() -> Self {
        Self::new(Coord::zeros(), Coord::zeros())
    }
}

impl CanvasRectangle {
    pub fn new(p0: Coord, p1: Coord) -> Self {
        Self {
            p0,
            p1,
            style: ShapeStyle::default(),
        }
    }

    /// Moves the corners.
    pub fn update(&mut self, p0: Coord, p1: Coord) {
        self.p0 = p0;
        self.p1 = p1;
    }

    pub fn rect(&self) -> Aabb {
        Aabb::new_positive(self.p0, self.p1)
    }

    pub fn xmin(&self) -> f64 {
        self.p0[0].min(self.p1[0])
    }

    pub fn xmax(&self) -> f64 {
        self.p0[0].max(self.p1[0])
    }

    pub fn ymin(&self) -> f64 {
        self.p0[1].min(self.p1[1])
    }

    pub fn ymax(&self) -> f64 {
        self.p0[1].max(self.p1[1])
    }
}

impl ItemBehaviour for CanvasRectangle {
    fn bare_bounds(&self) -> Option<Aabb> {
        Some(self.rect())
    }

    fn contains_point(&self, pt: Coord, ppu: f64) -> bool {
        if self.style.filled() {
            return true;
        }
        if !self.style.lined() {
            return false;
        }
        let lw = self.style.line_width_in_user_units(ppu);
        let r = self.rect();
        pt[0] - r.mins[0] <= lw
            || r.maxs[0] - pt[0] <= lw
            || pt[1] - r.mins[1] <= lw
            || r.maxs[1] - pt[1] <= lw
    }
}

impl Drawable for CanvasRectangle {
    fn draw(&self, cx: &mut impl piet::RenderContext, ppu: f64) -> anyhow::Result<()> {
        let half_width = 0.5 * self.style.line_width_in_user_units(ppu);
        let r = self.rect();
        let rect = kurbo::Rect::new(
            r.mins[0] + half_width,
            r.mins[1] + half_width,
            r.maxs[0] - half_width,
            r.maxs[1] - half_width,
        )
        .abs();
        self.style.draw_fill_and_stroke(cx, &rect, ppu);
        Ok(())
    }
}

impl std::fmt::Display for CanvasRectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CanvasRectangle({}, {})",
            fmt_coord(&self.p0),
            fmt_coord(&self.p1)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_hit_test() {
        let mut rect = CanvasRectangle::new(na::vector![0.0, 0.0], na::vector![10.0, 4.0]);
        assert!(!rect.contains_point(na::vector![0.1, 2.0], 1.0));
        rect.style.set_line_width(1.0);
        assert!(rect.contains_point(na::vector![0.5, 2.0], 1.0));
        assert!(rect.contains_point(na::vector![5.0, 3.5], 1.0));
        assert!(!rect.contains_point(na::vector![5.0, 2.0], 1.0));
        rect.style.set_fill_color(oofcanvas_compose::Color::RED);
        assert!(rect.contains_point(na::vector![5.0, 2.0], 1.0));
    }

    #[test]
    fn corners_are_ordered() {
        let rect = CanvasRectangle::new(na::vector![3.0, 5.0], na::vector![1.0, -1.0]);
        assert_eq!(rect.xmin(), 1.0);
        assert_eq!(rect.ymax(), 5.0);
        let bounds = rect.bounds(2.0).unwrap();
        assert_eq!(bounds.lower_left(), na::vector![1.0, -1.0]);
    }
}
