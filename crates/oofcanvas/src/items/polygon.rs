// Imports
use super::{fmt_coord, ItemBehaviour, PixelExtents, ShapeStyle};
use crate::Drawable;
use itertools::Itertools;
use oofcanvas_compose::ext::{AabbExt, Vector2Ext};
use oofcanvas_compose::utils::winding_number;
use oofcanvas_compose::{Coord, Segment};
use p2d::bounding_volume::Aabb;
use serde::{Deserialize, Serialize};

/// A closed polygon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename = "canvas_polygon")]
pub struct CanvasPolygon {
    #[serde(rename = "corners")]
    pub corners: Vec<Coord>,
    #[serde(rename = "style")]
    pub style: ShapeStyle,
}

impl CanvasPolygon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_corners(corners: Vec<Coord>) -> Self {
        Self {
            corners,
            style: ShapeStyle::default(),
        }
    }

    pub fn add_point(&mut self, point: Coord) {
        self.corners.push(point);
    }

    pub fn add_points(&mut self, points: impl IntoIterator<Item = Coord>) {
        self.corners.extend(points);
    }

    pub fn size(&self) -> usize {
        self.corners.len()
    }

    /// The edges, including the one closing the polygon.
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        self.corners
            .iter()
            .circular_tuple_windows()
            .map(|(p0, p1)| Segment::new(*p0, *p1))
    }

    pub(crate) fn kurbo_path(points: &[Coord], closed: bool) -> kurbo::BezPath {
        let mut path = kurbo::BezPath::new();
        let mut iter = points.iter();
        if let Some(first) = iter.next() {
            path.move_to(first.to_kurbo_point());
            for p in iter {
                path.line_to(p.to_kurbo_point());
            }
            if closed {
                path.close_path();
            }
        }
        path
    }
}

impl ItemBehaviour for CanvasPolygon {
    fn bare_bounds(&self) -> Option<Aabb> {
        let hw = self.style.half_user_width();
        Aabb::from_coords(&self.corners).map(|b| b.expand(hw, hw, hw, hw))
    }

    fn pixel_extents(&self) -> PixelExtents {
        PixelExtents::uniform(self.style.half_pixel_width())
    }

    fn contains_point(&self, pt: Coord, ppu: f64) -> bool {
        if self.style.filled() && winding_number(pt, &self.corners) != 0 {
            return true;
        }
        if self.style.lined() {
            let half_width = 0.5 * self.style.line_width_in_user_units(ppu);
            return self.edges().any(|edge| edge.within(pt, half_width));
        }
        false
    }
}

impl Drawable for CanvasPolygon {
    fn draw(&self, cx: &mut impl piet::RenderContext, ppu: f64) -> anyhow::Result<()> {
        if self.corners.len() < 2 {
            return Ok(());
        }
        let path = Self::kurbo_path(&self.corners, true);
        self.style.draw_fill_and_stroke(cx, &path, ppu);
        Ok(())
    }
}

impl std::fmt::Display for CanvasPolygon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CanvasPolygon([{}])",
            self.corners.iter().map(fmt_coord).join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use oofcanvas_compose::Color;

    fn triangle() -> CanvasPolygon {
        let mut poly = CanvasPolygon::new();
        poly.add_points([
            na::vector![0.0, 0.0],
            na::vector![4.0, 0.0],
            na::vector![0.0, 4.0],
        ]);
        poly
    }

    #[test]
    fn filled_uses_winding() {
        let mut poly = triangle();
        poly.style.set_fill_color(Color::BLUE);
        assert!(poly.contains_point(na::vector![1.0, 1.0], 1.0));
        assert!(!poly.contains_point(na::vector![3.0, 3.0], 1.0));
    }

    #[test]
    fn outline_includes_closing_edge() {
        let mut poly = triangle();
        poly.style.set_line_width(0.2);
        assert!(poly.contains_point(na::vector![0.05, 2.0], 1.0));
        assert!(poly.contains_point(na::vector![2.0, 2.05], 1.0));
        assert!(!poly.contains_point(na::vector![1.0, 1.0], 1.0));
        let b = poly.bare_bounds().unwrap();
        assert_relative_eq!(b.lower_left(), na::vector![-0.1, -0.1]);
    }

    #[test]
    fn empty_polygon_has_no_bounds() {
        assert!(CanvasPolygon::new().bare_bounds().is_none());
    }
}
