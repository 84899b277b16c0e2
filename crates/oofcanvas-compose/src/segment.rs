// Imports
use crate::ext::{AabbExt, Vector2Ext};
use crate::Coord;
use p2d::bounding_volume::Aabb;
use serde::{Deserialize, Serialize};

/// A straight line segment between two points in user space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename = "segment")]
pub struct Segment {
    /// The start
    #[serde(rename = "p0")]
    pub p0: Coord,
    /// The end
    #[serde(rename = "p1")]
    pub p1: Coord,
}

impl Default for Segment {
    fn default() -> Self {
        Self {
            p0: Coord::zeros(),
            p1: Coord::zeros(),
        }
    }
}

impl Segment {
    /// A new segment
    pub fn new(p0: Coord, p1: Coord) -> Self {
        Self { p0, p1 }
    }

    /// The vector from p0 to p1
    pub fn direction(&self) -> Coord {
        self.p1 - self.p0
    }

    /// The length
    pub fn length(&self) -> f64 {
        self.direction().magnitude()
    }

    /// The angle of the segment to the x axis in radians, counterclockwise.
    pub fn angle(&self) -> f64 {
        let d = self.direction();
        d[1].atan2(d[0])
    }

    /// The point at the given parameter, p0 for t = 0 and p1 for t = 1.
    pub fn interpolate(&self, t: f64) -> Coord {
        self.p0 + self.direction() * t
    }

    /// Projects the point onto the line through the segment.
    ///
    /// Returns `(alpha, distance2)`, where `alpha` is the parameter of the projected point along the segment
    /// and `distance2` is the squared distance from the point to its projection.
    /// The point projects inside the segment when `0 <= alpha <= 1`.
    pub fn projection(&self, pt: Coord) -> (f64, f64) {
        let d = self.direction();
        let len2 = d.magnitude_squared();
        if len2 == 0.0 {
            return (0.0, (pt - self.p0).magnitude_squared());
        }
        let alpha = (pt - self.p0).dot(&d) / len2;
        let distance2 = (self.interpolate(alpha) - pt).magnitude_squared();
        (alpha, distance2)
    }

    /// Whether the point lies within `half_width` of the segment, measured perpendicular to it.
    ///
    /// Points beyond the end points never match.
    pub fn within(&self, pt: Coord, half_width: f64) -> bool {
        let (alpha, distance2) = self.projection(pt);
        (0.0..=1.0).contains(&alpha) && distance2 <= half_width * half_width
    }

    /// The bounds of the two end points
    pub fn bounds(&self) -> Aabb {
        Aabb::new_positive(self.p0, self.p1)
    }

    /// Converts to a kurbo line
    pub fn to_kurbo(&self) -> kurbo::Line {
        kurbo::Line::new(self.p0.to_kurbo_point(), self.p1.to_kurbo_point())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn projection_inside() {
        let seg = Segment::new(na::vector![0.0, 0.0], na::vector![2.0, 0.0]);
        let (alpha, d2) = seg.projection(na::vector![0.5, 1.0]);
        assert_relative_eq!(alpha, 0.25);
        assert_relative_eq!(d2, 1.0);
    }

    #[test]
    fn projection_outside() {
        let seg = Segment::new(na::vector![0.0, 0.0], na::vector![0.0, 1.0]);
        let (alpha, d2) = seg.projection(na::vector![0.0, -1.0]);
        assert_relative_eq!(alpha, -1.0);
        assert_relative_eq!(d2, 0.0);
        assert!(!seg.within(na::vector![0.0, -1.0], 0.5));
        assert!(seg.within(na::vector![0.2, 0.5], 0.25));
    }

    #[test]
    fn degenerate_segment() {
        let seg = Segment::new(na::vector![1.0, 1.0], na::vector![1.0, 1.0]);
        let (alpha, d2) = seg.projection(na::vector![4.0, 5.0]);
        assert_relative_eq!(alpha, 0.0);
        assert_relative_eq!(d2, 25.0);
    }

    #[test]
    fn angle_and_interpolate() {
        let seg = Segment::new(na::vector![1.0, 1.0], na::vector![1.0, 3.0]);
        assert_relative_eq!(seg.angle(), std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(seg.interpolate(0.5), na::vector![1.0, 2.0]);
        assert_relative_eq!(seg.length(), 2.0);
    }
}
