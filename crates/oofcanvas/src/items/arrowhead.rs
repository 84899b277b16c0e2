// Imports
use super::{fmt_coord, CanvasSegment, ItemBehaviour, PixelExtents};
use crate::Drawable;
use oofcanvas_compose::ext::{AabbExt, Vector2Ext};
use oofcanvas_compose::utils::rotate;
use oofcanvas_compose::{Color, Coord, Segment};
use p2d::bounding_volume::Aabb;
use serde::{Deserialize, Serialize};

/// A filled triangle placed on a segment, pointing along it.
///
/// The arrowhead copies the geometry and line color of the segment it is created for,
/// later changes to the segment don't move it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename = "canvas_arrowhead")]
pub struct CanvasArrowhead {
    #[serde(rename = "segment")]
    segment: Segment,
    /// Position of the tip along the segment, 0 at the start and 1 at the end
    #[serde(rename = "position")]
    position: f64,
    /// Points towards the start of the segment instead of the end
    #[serde(rename = "reversed")]
    reversed: bool,
    #[serde(rename = "width")]
    width: f64,
    #[serde(rename = "length")]
    length: f64,
    #[serde(rename = "size_in_pixels")]
    size_in_pixels: bool,
    #[serde(rename = "color")]
    color: Color,
}

impl Default for CanvasArrowhead {
    fn default() -> Self {
        Self {
            segment: Segment::default(),
            position: 1.0,
            reversed: false,
            width: 1.0,
            length: 1.0,
            size_in_pixels: false,
            color: Color::BLACK,
        }
    }
}

impl CanvasArrowhead {
    pub fn new(segment: &CanvasSegment, position: f64, reversed: bool) -> Self {
        Self {
            segment: segment.segment,
            position,
            reversed,
            color: segment.style.line.color,
            ..Default::default()
        }
    }

    /// The size of the triangle in user units.
    pub fn set_size(&mut self, width: f64, length: f64) {
        self.width = width;
        self.length = length;
        self.size_in_pixels = false;
    }

    /// The size of the triangle in pixels.
    pub fn set_size_in_pixels(&mut self, width: f64, length: f64) {
        self.width = width;
        self.length = length;
        self.size_in_pixels = true;
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn tip(&self) -> Coord {
        self.segment.interpolate(self.position)
    }

    fn direction_angle(&self) -> f64 {
        let angle = self.segment.angle();
        if self.reversed {
            angle + std::f64::consts::PI
        } else {
            angle
        }
    }

    /// The corners relative to the tip, in the units the size is given in.
    fn local_corners(&self) -> [Coord; 3] {
        let angle = self.direction_angle();
        [
            Coord::zeros(),
            rotate(na::vector![-self.length, 0.5 * self.width], angle),
            rotate(na::vector![-self.length, -0.5 * self.width], angle),
        ]
    }

    fn user_corners(&self, ppu: f64) -> [Coord; 3] {
        let scale = if self.size_in_pixels { 1.0 / ppu } else { 1.0 };
        let tip = self.tip();
        self.local_corners().map(|c| tip + c * scale)
    }
}

impl ItemBehaviour for CanvasArrowhead {
    fn bare_bounds(&self) -> Option<Aabb> {
        if self.size_in_pixels {
            Some(Aabb::from_point(self.tip()))
        } else {
            Aabb::from_coords(&self.user_corners(1.0))
        }
    }

    fn pixel_extents(&self) -> PixelExtents {
        if !self.size_in_pixels {
            return PixelExtents::default();
        }
        match Aabb::from_coords(&self.local_corners()) {
            Some(b) => PixelExtents {
                left: -b.mins[0],
                right: b.maxs[0],
                up: b.maxs[1],
                down: -b.mins[1],
            },
            None => PixelExtents::default(),
        }
    }

    fn contains_point(&self, _pt: Coord, _ppu: f64) -> bool {
        false
    }
}

impl Drawable for CanvasArrowhead {
    fn draw(&self, cx: &mut impl piet::RenderContext, ppu: f64) -> anyhow::Result<()> {
        let [p0, p1, p2] = self.user_corners(ppu);
        let mut path = kurbo::BezPath::new();
        path.move_to(p0.to_kurbo_point());
        path.line_to(p1.to_kurbo_point());
        path.line_to(p2.to_kurbo_point());
        path.close_path();
        cx.fill(path, &piet::Color::from(self.color));
        Ok(())
    }
}

impl std::fmt::Display for CanvasArrowhead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CanvasArrowhead({}, {}, {})",
            fmt_coord(&self.tip()),
            self.position,
            self.reversed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bounds_follow_segment_direction() {
        let seg = CanvasSegment::new(na::vector![0.0, 0.0], na::vector![0.0, 10.0]);
        let mut arrow = CanvasArrowhead::new(&seg, 0.5, false);
        arrow.set_size(2.0, 3.0);
        let b = arrow.bare_bounds().unwrap();
        assert_relative_eq!(b.lower_left(), na::vector![-1.0, 2.0], epsilon = 1e-12);
        assert_relative_eq!(b.upper_right(), na::vector![1.0, 5.0], epsilon = 1e-12);

        let mut reversed = CanvasArrowhead::new(&seg, 0.5, true);
        reversed.set_size(2.0, 3.0);
        let b = reversed.bare_bounds().unwrap();
        assert_relative_eq!(b.lower_left(), na::vector![-1.0, 5.0], epsilon = 1e-12);
        assert_relative_eq!(b.upper_right(), na::vector![1.0, 8.0], epsilon = 1e-12);
    }

    #[test]
    fn pixel_sized() {
        let seg = CanvasSegment::new(na::vector![0.0, 0.0], na::vector![10.0, 0.0]);
        let mut arrow = CanvasArrowhead::new(&seg, 1.0, false);
        arrow.set_size_in_pixels(10.0, 20.0);
        let ext = arrow.pixel_extents();
        assert_relative_eq!(ext.left, 20.0, epsilon = 1e-12);
        assert_relative_eq!(ext.right, 0.0, epsilon = 1e-12);
        assert_relative_eq!(ext.up, 5.0, epsilon = 1e-12);
        let b = arrow.bounds(10.0).unwrap();
        assert_relative_eq!(b.lower_left(), na::vector![8.0, -0.5], epsilon = 1e-12);
        assert!(!arrow.contains_point(na::vector![9.0, 0.0], 10.0));
    }
}
