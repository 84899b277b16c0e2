// Imports
use super::{fmt_coord, ItemBehaviour, PixelExtents, ShapeStyle};
use crate::Drawable;
use oofcanvas_compose::ext::{AabbExt, Vector2Ext};
use oofcanvas_compose::{Coord, Length};
use p2d::bounding_volume::Aabb;
use serde::{Deserialize, Serialize};

/// A filled or outlined disk with a radius in pixels.
///
/// Its on-screen size doesn't change with the ppu. The line width of a dot is always in pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename = "canvas_dot")]
pub struct CanvasDot {
    #[serde(rename = "center")]
    pub center: Coord,
    /// In pixels
    #[serde(rename = "radius")]
    pub radius: f64,
    #[serde(rename = "style")]
    pub style: ShapeStyle,
}

impl Default for CanvasDot {
    fn default() -> Self {
        Self::new(Coord::zeros(), 1.0)
    }
}

impl CanvasDot {
    pub fn new(center: Coord, radius_px: f64) -> Self {
        Self {
            center,
            radius: radius_px,
            style: ShapeStyle::default(),
        }
    }

    /// Sets the outline width in pixels.
    pub fn set_line_width(&mut self, width_px: f64) {
        self.style.set_line_width_in_pixels(width_px);
    }

    fn line_width_px(&self) -> f64 {
        if self.style.lined() {
            match self.style.line.width {
                Length::User(w) | Length::Pixels(w) => w,
            }
        } else {
            0.0
        }
    }
}

impl ItemBehaviour for CanvasDot {
    fn bare_bounds(&self) -> Option<Aabb> {
        Some(Aabb::from_point(self.center))
    }

    fn pixel_extents(&self) -> PixelExtents {
        PixelExtents::uniform(self.radius)
    }

    fn contains_point(&self, pt: Coord, ppu: f64) -> bool {
        let d2 = (pt - self.center).magnitude_squared();
        let r = self.radius / ppu;
        if self.style.filled() {
            return d2 <= r * r;
        }
        if self.style.lined() {
            let r_inner = (r - self.line_width_px() / ppu).max(0.0);
            return d2 >= r_inner * r_inner && d2 <= r * r;
        }
        false
    }
}

impl Drawable for CanvasDot {
    fn draw(&self, cx: &mut impl piet::RenderContext, ppu: f64) -> anyhow::Result<()> {
        let center = self.center.to_kurbo_point();
        let r = self.radius / ppu;
        self.style.draw_fill(cx, &kurbo::Circle::new(center, r));
        if self.style.lined() {
            let lw = self.line_width_px() / ppu;
            let mut style = self.style.clone();
            style.line.width = Length::User(lw);
            style.draw_stroke(cx, &kurbo::Circle::new(center, (r - 0.5 * lw).max(0.0)), ppu);
        }
        Ok(())
    }
}

impl std::fmt::Display for CanvasDot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CanvasDot({}, {})", fmt_coord(&self.center), self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use oofcanvas_compose::Color;

    #[test]
    fn bounds_scale_with_ppu() {
        let dot = CanvasDot::new(na::vector![1.0, 1.0], 5.0);
        let b = dot.bounds(10.0).unwrap();
        assert_relative_eq!(b.lower_left(), na::vector![0.5, 0.5]);
        assert_relative_eq!(b.upper_right(), na::vector![1.5, 1.5]);
        let b = dot.bounds(1.0).unwrap();
        assert_relative_eq!(b.width(), 10.0);
    }

    #[test]
    fn hit_test_in_pixels() {
        let mut dot = CanvasDot::new(na::vector![0.0, 0.0], 5.0);
        dot.style.set_fill_color(Color::BLACK);
        assert!(dot.contains_point(na::vector![0.4, 0.0], 10.0));
        assert!(!dot.contains_point(na::vector![0.6, 0.0], 10.0));

        let mut ring = CanvasDot::new(na::vector![0.0, 0.0], 5.0);
        ring.set_line_width(1.0);
        assert!(ring.contains_point(na::vector![0.45, 0.0], 10.0));
        assert!(!ring.contains_point(na::vector![0.2, 0.0], 10.0));
    }
}
