// Imports
use crate::Coord;
use p2d::bounding_volume::Aabb;

/// Extension trait for [`na::Vector2<f64>`].
pub trait Vector2Ext
where
    Self: Sized,
{
    /// a new vector by taking the mins of each x and y values
    fn mins(&self, other: &Self) -> Self;
    /// a new vector by taking the maxs of each x and y values
    fn maxs(&self, other: &Self) -> Self;
    /// The 2D cross product, the z component of the 3D cross product
    fn perp_dot(&self, other: &Self) -> f64;
    /// Converts to kurbo::Point
    fn to_kurbo_point(&self) -> kurbo::Point;
    /// Converts to kurbo::Vec2
    fn to_kurbo_vec(&self) -> kurbo::Vec2;
    /// Converts from kurbo::Point
    fn from_kurbo_point(kurbo_point: kurbo::Point) -> Self;
    /// Approximate equality
    fn approx_eq(&self, other: &Self) -> bool;
}

impl Vector2Ext for Coord {
    fn mins(&self, other: &Self) -> Self {
        na::vector![self[0].min(other[0]), self[1].min(other[1])]
    }

    fn maxs(&self, other: &Self) -> Self {
        na::vector![self[0].max(other[0]), self[1].max(other[1])]
    }

    fn perp_dot(&self, other: &Self) -> f64 {
        self[0] * other[1] - self[1] * other[0]
    }

    fn to_kurbo_point(&self) -> kurbo::Point {
        kurbo::Point {
            x: self[0],
            y: self[1],
        }
    }

    fn to_kurbo_vec(&self) -> kurbo::Vec2 {
        kurbo::Vec2 {
            x: self[0],
            y: self[1],
        }
    }

    fn from_kurbo_point(kurbo_point: kurbo::Point) -> Self {
        na::vector![kurbo_point.x, kurbo_point.y]
    }

    fn approx_eq(&self, other: &Self) -> bool {
        approx::relative_eq!(self[0], other[0]) && approx::relative_eq!(self[1], other[1])
    }
}

/// Extension trait for [p2d::bounding_volume::Aabb].
///
/// Bounds are in user space with y pointing up, so "upper" is the side with the larger y value.
pub trait AabbExt
where
    Self: Sized,
{
    /// New Aabb, ensuring its mins, maxs are valid (maxs >= mins)
    fn new_positive(start: Coord, end: Coord) -> Self;
    /// New Aabb containing only the given point
    fn from_point(point: Coord) -> Self;
    /// The smallest Aabb that contains all the given points. None if there are no points.
    fn from_coords<'a>(points: impl IntoIterator<Item = &'a Coord>) -> Option<Self>;
    /// Translates the Aabb by a offset
    fn shift(&self, offset: Coord) -> Self;
    /// Scales the coordinates of the Aabb. Negative factors mirror it, the result stays positive.
    fn scale_xy(&self, sx: f64, sy: f64) -> Self;
    /// Extends each side by a individual amount
    fn expand(&self, left: f64, right: f64, up: f64, down: f64) -> Self;
    /// Grows the bounds so that they contain the point
    fn swallow_point(&self, point: Coord) -> Self;
    /// Whether the point is inside or on the border
    fn contains_pt(&self, point: Coord) -> bool;
    /// The width
    fn width(&self) -> f64;
    /// The height
    fn height(&self) -> f64;
    /// The corner with the smallest x and y
    fn lower_left(&self) -> Coord;
    /// The corner with the largest x and smallest y
    fn lower_right(&self) -> Coord;
    /// The corner with the smallest x and largest y
    fn upper_left(&self) -> Coord;
    /// The corner with the largest x and y
    fn upper_right(&self) -> Coord;
    /// Converts a Aabb to a kurbo Rectangle
    fn to_kurbo_rect(&self) -> kurbo::Rect;
    /// Approximate equality
    fn approx_eq(&self, other: &Self) -> bool;
}

impl AabbExt for Aabb {
    fn new_positive(start: Coord, end: Coord) -> Self {
        let mins = start.mins(&end);
        let maxs = start.maxs(&end);
        Aabb::new(mins.into(), maxs.into())
    }

    fn from_point(point: Coord) -> Self {
        Aabb::new(point.into(), point.into())
    }

    fn from_coords<'a>(points: impl IntoIterator<Item = &'a Coord>) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<Aabb>, p| {
            Some(match acc {
                Some(bounds) => bounds.swallow_point(*p),
                None => Aabb::from_point(*p),
            })
        })
    }

    fn shift(&self, offset: Coord) -> Self {
        Aabb::new(self.mins + offset, self.maxs + offset)
    }

    fn scale_xy(&self, sx: f64, sy: f64) -> Self {
        let scale = na::vector![sx, sy];
        Aabb::new_positive(
            self.mins.coords.component_mul(&scale),
            self.maxs.coords.component_mul(&scale),
        )
    }

    fn expand(&self, left: f64, right: f64, up: f64, down: f64) -> Self {
        Aabb::new(
            na::point![self.mins[0] - left, self.mins[1] - down],
            na::point![self.maxs[0] + right, self.maxs[1] + up],
        )
    }

    fn swallow_point(&self, point: Coord) -> Self {
        Aabb::new(
            self.mins.coords.mins(&point).into(),
            self.maxs.coords.maxs(&point).into(),
        )
    }

    fn contains_pt(&self, point: Coord) -> bool {
        point[0] >= self.mins[0]
            && point[0] <= self.maxs[0]
            && point[1] >= self.mins[1]
            && point[1] <= self.maxs[1]
    }

    fn width(&self) -> f64 {
        self.maxs[0] - self.mins[0]
    }

    fn height(&self) -> f64 {
        self.maxs[1] - self.mins[1]
    }

    fn lower_left(&self) -> Coord {
        self.mins.coords
    }

    fn lower_right(&self) -> Coord {
        na::vector![self.maxs[0], self.mins[1]]
    }

    fn upper_left(&self) -> Coord {
        na::vector![self.mins[0], self.maxs[1]]
    }

    fn upper_right(&self) -> Coord {
        self.maxs.coords
    }

    fn to_kurbo_rect(&self) -> kurbo::Rect {
        kurbo::Rect::from_points(
            self.mins.coords.to_kurbo_point(),
            self.maxs.coords.to_kurbo_point(),
        )
    }

    fn approx_eq(&self, other: &Self) -> bool {
        self.mins.coords.approx_eq(&other.mins.coords)
            && self.maxs.coords.approx_eq(&other.maxs.coords)
    }
}

/// Extension trait for optional bounds, where `None` is a uninitialized (empty) bounding box.
pub trait OptionAabbExt {
    /// Grows the bounds to contain the point, initializing them if needed.
    fn swallow_point(&mut self, point: Coord);
    /// Grows the bounds to contain the other bounds. Swallowing `None` is a no-op.
    fn swallow(&mut self, other: Option<Aabb>);
    /// Whether initialized bounds contain the point. Uninitialized bounds contain nothing.
    fn contains_pt(&self, point: Coord) -> bool;
}

impl OptionAabbExt for Option<Aabb> {
    fn swallow_point(&mut self, point: Coord) {
        *self = Some(match self {
            Some(bounds) => bounds.swallow_point(point),
            None => Aabb::from_point(point),
        });
    }

    fn swallow(&mut self, other: Option<Aabb>) {
        let Some(other) = other else {
            return;
        };
        *self = Some(match self {
            Some(bounds) => bounds.swallow_point(other.mins.coords).swallow_point(other.maxs.coords),
            None => other,
        });
    }

    fn contains_pt(&self, point: Coord) -> bool {
        self.map(|b| b.contains_pt(point)).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn aabb_positive_and_corners() {
        let bounds = Aabb::new_positive(na::vector![3.0, -1.0], na::vector![1.0, 2.0]);
        assert_relative_eq!(bounds.lower_left(), na::vector![1.0, -1.0]);
        assert_relative_eq!(bounds.upper_right(), na::vector![3.0, 2.0]);
        assert_relative_eq!(bounds.upper_left(), na::vector![1.0, 2.0]);
        assert_relative_eq!(bounds.lower_right(), na::vector![3.0, -1.0]);
        assert_relative_eq!(bounds.width(), 2.0);
        assert_relative_eq!(bounds.height(), 3.0);
    }

    #[test]
    fn aabb_expand_is_directional() {
        let bounds = Aabb::new_positive(na::vector![0.0, 0.0], na::vector![1.0, 1.0])
            .expand(1.0, 2.0, 3.0, 4.0);
        assert_relative_eq!(bounds.lower_left(), na::vector![-1.0, -4.0]);
        assert_relative_eq!(bounds.upper_right(), na::vector![3.0, 4.0]);
    }

    #[test]
    fn aabb_scale_negative_stays_positive() {
        let bounds =
            Aabb::new_positive(na::vector![1.0, 2.0], na::vector![3.0, 5.0]).scale_xy(1.0, -1.0);
        assert_relative_eq!(bounds.lower_left(), na::vector![1.0, -5.0]);
        assert_relative_eq!(bounds.upper_right(), na::vector![3.0, -2.0]);
    }

    #[test]
    fn uninitialized_bounds() {
        let mut bounds: Option<Aabb> = None;
        assert!(!bounds.contains_pt(na::vector![0.0, 0.0]));
        bounds.swallow(None);
        assert!(bounds.is_none());
        bounds.swallow_point(na::vector![1.0, 1.0]);
        assert!(bounds.contains_pt(na::vector![1.0, 1.0]));
        bounds.swallow(Some(Aabb::new_positive(
            na::vector![-1.0, 0.0],
            na::vector![0.0, 3.0],
        )));
        let bounds = bounds.unwrap();
        assert_relative_eq!(bounds.lower_left(), na::vector![-1.0, 0.0]);
        assert_relative_eq!(bounds.upper_right(), na::vector![1.0, 3.0]);
    }

    #[test]
    fn from_coords() {
        assert!(Aabb::from_coords(&[] as &[Coord]).is_none());
        let pts = [na::vector![0.0, 1.0], na::vector![2.0, -1.0], na::vector![1.0, 5.0]];
        let bounds = Aabb::from_coords(&pts).unwrap();
        assert_relative_eq!(bounds.lower_left(), na::vector![0.0, -1.0]);
        assert_relative_eq!(bounds.upper_right(), na::vector![2.0, 5.0]);
    }
}
