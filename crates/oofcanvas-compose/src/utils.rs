// Imports
use crate::ext::Vector2Ext;
use crate::Coord;

/// The winding number of the closed polygon through `corners` around `point`.
///
/// Zero means the point is outside. The last corner connects back to the first.
pub fn winding_number(point: Coord, corners: &[Coord]) -> i32 {
    let n = corners.len();
    if n < 3 {
        return 0;
    }
    let mut wn = 0;
    for i in 0..n {
        let p0 = corners[i];
        let p1 = corners[(i + 1) % n];
        let is_left = (p1 - p0).perp_dot(&(point - p0));
        if p0[1] <= point[1] {
            if p1[1] > point[1] && is_left > 0.0 {
                wn += 1;
            }
        } else if p1[1] <= point[1] && is_left < 0.0 {
            wn -= 1;
        }
    }
    wn
}

/// Rotates a vector counterclockwise by the angle in radians.
pub fn rotate(v: Coord, angle: f64) -> Coord {
    na::Rotation2::new(angle) * v
}
