// Imports
use super::{fmt_coord, CanvasPolygon, ItemBehaviour, PixelExtents, ShapeStyle};
use crate::Drawable;
use itertools::Itertools;
use oofcanvas_compose::ext::AabbExt;
use oofcanvas_compose::{Coord, Segment};
use p2d::bounding_volume::Aabb;
use serde::{Deserialize, Serialize};

/// A open polyline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename = "canvas_curve")]
pub struct CanvasCurve {
    #[serde(rename = "points")]
    pub points: Vec<Coord>,
    #[serde(rename = "style")]
    pub style: ShapeStyle,
}

impl CanvasCurve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<Coord>) -> Self {
        Self {
            points,
            style: ShapeStyle::default(),
        }
    }

    pub fn add_point(&mut self, point: Coord) {
        self.points.push(point);
    }

    pub fn add_points(&mut self, points: impl IntoIterator<Item = Coord>) {
        self.points.extend(points);
    }

    pub fn size(&self) -> usize {
        self.points.len()
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.points
            .iter()
            .tuple_windows()
            .map(|(p0, p1)| Segment::new(*p0, *p1))
    }
}

impl ItemBehaviour for CanvasCurve {
    fn bare_bounds(&self) -> Option<Aabb> {
        let hw = self.style.half_user_width();
        Aabb::from_coords(&self.points).map(|b| b.expand(hw, hw, hw, hw))
    }

    fn pixel_extents(&self) -> PixelExtents {
        PixelExtents::uniform(self.style.half_pixel_width())
    }

    fn contains_point(&self, pt: Coord, ppu: f64) -> bool {
        let half_width = 0.5 * self.style.line_width_in_user_units(ppu);
        self.segments().any(|s| s.within(pt, half_width))
    }
}

impl Drawable for CanvasCurve {
    fn draw(&self, cx: &mut impl piet::RenderContext, ppu: f64) -> anyhow::Result<()> {
        if self.points.len() < 2 {
            return Ok(());
        }
        let path = CanvasPolygon::kurbo_path(&self.points, false);
        self.style.draw_stroke(cx, &path, ppu);
        Ok(())
    }
}

impl std::fmt::Display for CanvasCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CanvasCurve([{}])",
            self.points.iter().map(fmt_coord).join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_curve_has_no_closing_edge() {
        let mut curve = CanvasCurve::new();
        curve.add_points([
            na::vector![0.0, 0.0],
            na::vector![4.0, 0.0],
            na::vector![4.0, 4.0],
        ]);
        curve.style.set_line_width(0.2);
        assert_eq!(curve.segments().count(), 2);
        assert!(curve.contains_point(na::vector![4.05, 2.0], 1.0));
        assert!(!curve.contains_point(na::vector![2.0, 2.0], 1.0));
    }
}
