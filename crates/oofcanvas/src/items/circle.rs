// Imports
use super::{fmt_coord, ItemBehaviour, ShapeStyle};
use crate::Drawable;
use oofcanvas_compose::ext::Vector2Ext;
use oofcanvas_compose::Coord;
use p2d::bounding_volume::Aabb;
use serde::{Deserialize, Serialize};

/// A circle with a radius in user units.
///
/// The outline is drawn inside the radius.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename = "canvas_circle")]
pub struct CanvasCircle {
    #[serde(rename = "center")]
    pub center: Coord,
    #[serde(rename = "radius")]
    pub radius: f64,
    #[serde(rename = "style")]
    pub style: ShapeStyle,
}

impl Default for CanvasCircle {
    fn default() -> Self {
        Self::new(Coord::zeros(), 1.0)
    }
}

impl CanvasCircle {
    pub fn new(center: Coord, radius: f64) -> Self {
        Self {
            center,
            radius,
            style: ShapeStyle::default(),
        }
    }
}

impl ItemBehaviour for CanvasCircle {
    fn bare_bounds(&self) -> Option<Aabb> {
        Some(Aabb::from_half_extents(
            self.center.into(),
            Coord::repeat(self.radius.abs()),
        ))
    }

    fn contains_point(&self, pt: Coord, ppu: f64) -> bool {
        let d2 = (pt - self.center).magnitude_squared();
        let r2 = self.radius * self.radius;
        if self.style.filled() {
            return d2 <= r2;
        }
        if self.style.lined() {
            let r_inner = (self.radius - self.style.line_width_in_user_units(ppu)).max(0.0);
            return d2 >= r_inner * r_inner && d2 <= r2;
        }
        false
    }
}

impl Drawable for CanvasCircle {
    fn draw(&self, cx: &mut impl piet::RenderContext, ppu: f64) -> anyhow::Result<()> {
        let center = self.center.to_kurbo_point();
        self.style
            .draw_fill(cx, &kurbo::Circle::new(center, self.radius));
        let lw = self.style.line_width_in_user_units(ppu);
        let r = (self.radius - 0.5 * lw).max(0.0);
        self.style
            .draw_stroke(cx, &kurbo::Circle::new(center, r), ppu);
        Ok(())
    }
}

impl std::fmt::Display for CanvasCircle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CanvasCircle({}, {})",
            fmt_coord(&self.center),
            self.radius
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use oofcanvas_compose::ext::AabbExt;
    use oofcanvas_compose::Color;

    #[test]
    fn bounds() {
        let circle = CanvasCircle::new(na::vector![1.0, 2.0], 3.0);
        let b = circle.bounds(10.0).unwrap();
        assert_relative_eq!(b.lower_left(), na::vector![-2.0, -1.0]);
        assert_relative_eq!(b.upper_right(), na::vector![4.0, 5.0]);
    }

    #[test]
    fn ring_hit_test() {
        let mut circle = CanvasCircle::new(na::vector![0.0, 0.0], 2.0);
        circle.style.set_line_width(0.5);
        assert!(circle.contains_point(na::vector![1.8, 0.0], 1.0));
        assert!(!circle.contains_point(na::vector![1.0, 0.0], 1.0));
        // pixel widths shrink in user units as ppu grows
        circle.style.set_line_width_in_pixels(10.0);
        assert!(circle.contains_point(na::vector![1.0, 0.0], 1.0));
        assert!(!circle.contains_point(na::vector![1.0, 0.0], 100.0));
        circle.style.set_fill_color(Color::GREEN);
        assert!(circle.contains_point(na::vector![0.0, 0.0], 100.0));
    }
}
