// Imports
use super::{fmt_coord, ItemBehaviour, ShapeStyle};
use crate::Drawable;
use oofcanvas_compose::ext::Vector2Ext;
use oofcanvas_compose::Coord;
use p2d::bounding_volume::Aabb;
use serde::{Deserialize, Serialize};

/// A ellipse, rotated counterclockwise by a angle given in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename = "canvas_ellipse")]
pub struct CanvasEllipse {
    #[serde(rename = "center")]
    pub center: Coord,
    /// The radii along the ellipse axes before rotation
    #[serde(rename = "radii")]
    pub radii: Coord,
    /// In degrees
    #[serde(rename = "angle")]
    pub angle: f64,
    #[serde(rename = "style")]
    pub style: ShapeStyle,
}

impl Default for CanvasEllipse {
    fn default() -> Self {
        Self::new(Coord::zeros(), Coord::repeat(1.0), 0.0)
    }
}

impl CanvasEllipse {
    pub fn new(center: Coord, radii: Coord, angle_degrees: f64) -> Self {
        Self {
            center,
            radii,
            angle: angle_degrees,
            style: ShapeStyle::default(),
        }
    }

    fn angle_radians(&self) -> f64 {
        self.angle.to_radians()
    }

    /// The point relative to the center, in the frame of the ellipse axes.
    fn local(&self, pt: Coord) -> Coord {
        oofcanvas_compose::utils::rotate(pt - self.center, -self.angle_radians())
    }

    fn inside(local: Coord, radii: Coord) -> bool {
        if radii[0] <= 0.0 || radii[1] <= 0.0 {
            return false;
        }
        let px = local[0] / radii[0];
        let py = local[1] / radii[1];
        px * px + py * py <= 1.0
    }
}

impl ItemBehaviour for CanvasEllipse {
    fn bare_bounds(&self) -> Option<Aabb> {
        let (s, c) = self.angle_radians().sin_cos();
        let (r0, r1) = (self.radii[0], self.radii[1]);
        let dx = (c * c * r0 * r0 + s * s * r1 * r1).sqrt();
        let dy = (c * c * r1 * r1 + s * s * r0 * r0).sqrt();
        Some(Aabb::from_half_extents(self.center.into(), na::vector![dx, dy]))
    }

    fn contains_point(&self, pt: Coord, ppu: f64) -> bool {
        let local = self.local(pt);
        if self.style.filled() {
            return Self::inside(local, self.radii);
        }
        if self.style.lined() {
            let lw = self.style.line_width_in_user_units(ppu);
            return Self::inside(local, self.radii)
                && !Self::inside(local, self.radii - Coord::repeat(lw));
        }
        false
    }
}

impl Drawable for CanvasEllipse {
    fn draw(&self, cx: &mut impl piet::RenderContext, ppu: f64) -> anyhow::Result<()> {
        if self.radii[0] == 0.0 || self.radii[1] == 0.0 {
            return Ok(());
        }
        let center = self.center.to_kurbo_point();
        let rotation = self.angle_radians();
        self.style.draw_fill(
            cx,
            &kurbo::Ellipse::new(center, self.radii.to_kurbo_vec(), rotation),
        );
        let half_width = 0.5 * self.style.line_width_in_user_units(ppu);
        let inner = (self.radii - Coord::repeat(half_width)).map(|r| r.max(0.0));
        self.style.draw_stroke(
            cx,
            &kurbo::Ellipse::new(center, inner.to_kurbo_vec(), rotation),
            ppu,
        );
        Ok(())
    }
}

impl std::fmt::Display for CanvasEllipse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CanvasEllipse({}, {}, {})",
            fmt_coord(&self.center),
            fmt_coord(&self.radii),
            self.angle
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
    fn rotated_bounds() {
        let ellipse = CanvasEllipse::new(na::vector![0.0, 0.0], na::vector![2.0, 1.0], 90.0);
        let b = ellipse.bare_bounds().unwrap();
        assert_relative_eq!(b.width(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(b.height(), 4.0, epsilon = 1e-12);

        let shifted = CanvasEllipse::new(na::vector![3.0, -2.0], na::vector![2.0, 1.0], 0.0);
        let b = shifted.bare_bounds().unwrap();
        assert_relative_eq!(b.lower_left(), na::vector![1.0, -3.0], epsilon = 1e-12);
        assert_relative_eq!(b.upper_right(), na::vector![5.0, -1.0], epsilon = 1e-12);
    }

    #[test]
    fn hit_test() {
        let mut ellipse = CanvasEllipse::new(na::vector![0.0, 0.0], na::vector![4.0, 1.0], 0.0);
        ellipse.style.set_fill_color(Color::RED);
        assert!(ellipse.contains_point(na::vector![3.5, 0.0], 1.0));
        assert!(!ellipse.contains_point(na::vector![0.0, 1.5], 1.0));

        let mut ring = CanvasEllipse::new(na::vector![0.0, 0.0], na::vector![4.0, 2.0], 90.0);
        ring.style.set_line_width(0.5);
        assert!(ring.contains_point(na::vector![0.0, 3.8], 1.0));
        assert!(!ring.contains_point(na::vector![0.0, 0.0], 1.0));
        assert!(!ring.contains_point(na::vector![3.8, 0.0], 1.0));
    }
}
