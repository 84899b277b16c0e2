// Imports
use crate::CanvasError;
use oofcanvas_compose::ext::{AabbExt, Vector2Ext};
use oofcanvas_compose::Coord;
use p2d::bounding_volume::Aabb;

/// Maps user coordinates (y up) to device pixels (y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Pixels per user unit.
    ppu: f64,
    transform: kurbo::Affine,
    /// The size of a bitmap that holds the whole drawing, including the margin.
    bitmap_size: Coord,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            ppu: 1.0,
            transform: Self::find_transform(1.0, None, Coord::zeros()),
            bitmap_size: Coord::zeros(),
        }
    }
}

impl Camera {
    pub fn new(ppu: f64) -> Result<Self, CanvasError> {
        Self::validate_ppu(ppu)?;
        Ok(Self {
            ppu,
            transform: Self::find_transform(ppu, None, Coord::zeros()),
            ..Default::default()
        })
    }

    pub(crate) fn validate_ppu(ppu: f64) -> Result<(), CanvasError> {
        if ppu.is_finite() && ppu > 0.0 {
            Ok(())
        } else {
            Err(CanvasError::InvalidPpu(ppu))
        }
    }

    pub fn ppu(&self) -> f64 {
        self.ppu
    }

    /// The transform from user coordinates to device pixels.
    pub fn transform(&self) -> kurbo::Affine {
        self.transform
    }

    /// The size of a bitmap that holds the drawing and its margin at the current ppu.
    pub fn bitmap_size(&self) -> Coord {
        self.bitmap_size
    }

    /// Recomputes the transform for a new ppu and the bounds of the drawing at that ppu.
    pub(crate) fn update(&mut self, ppu: f64, bounds: Option<Aabb>, margin: f64) {
        let extents = bounds.map(|b| b.extents()).unwrap_or_else(Coord::zeros);
        self.ppu = ppu;
        self.bitmap_size = extents * ppu * (1.0 + 2.0 * margin);
        self.transform = Self::find_transform(ppu, bounds, self.bitmap_size);
    }

    /// The transform that centers the bounds in a bitmap of the given size, scaled by the ppu and with y flipped.
    ///
    /// Without bounds the user origin maps to the bitmap origin.
    pub fn find_transform(ppu: f64, bounds: Option<Aabb>, bitmap_size: Coord) -> kurbo::Affine {
        let Some(bounds) = bounds else {
            return kurbo::Affine::new([ppu, 0.0, 0.0, -ppu, 0.0, 0.0]);
        };
        let bbw = ppu * bounds.width();
        let bbh = ppu * bounds.height();
        let dx = 0.5 * (bitmap_size[0] - bbw);
        let dy = 0.5 * (bitmap_size[1] - bbh);
        let offset = bounds.lower_left() * ppu + na::vector![-dx, dy];
        kurbo::Affine::new([ppu, 0.0, 0.0, -ppu, -offset[0], bbh + offset[1]])
    }

    pub fn user_to_pixel(&self, pt: Coord) -> Coord {
        Coord::from_kurbo_point(self.transform * pt.to_kurbo_point())
    }

    pub fn pixel_to_user(&self, pt: Coord) -> Coord {
        Coord::from_kurbo_point(self.transform.inverse() * pt.to_kurbo_point())
    }

    pub fn user_to_pixel_dist(&self, d: f64) -> f64 {
        d * self.ppu
    }

    pub fn pixel_to_user_dist(&self, d: f64) -> f64 {
        d / self.ppu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn transform_centers_bounds() {
        let bounds = Aabb::new_positive(na::vector![0.0, 0.0], na::vector![10.0, 5.0]);
        let mut camera = Camera::new(2.0).unwrap();
        camera.update(2.0, Some(bounds), 0.0);
        assert_relative_eq!(camera.bitmap_size(), na::vector![20.0, 10.0]);
        assert_relative_eq!(
            camera.user_to_pixel(na::vector![0.0, 0.0]),
            na::vector![0.0, 10.0]
        );
        assert_relative_eq!(
            camera.user_to_pixel(na::vector![10.0, 5.0]),
            na::vector![20.0, 0.0]
        );
        assert_relative_eq!(
            camera.pixel_to_user(na::vector![10.0, 5.0]),
            na::vector![5.0, 2.5]
        );
    }

    #[test]
    fn margin_offsets_drawing() {
        let bounds = Aabb::new_positive(na::vector![-1.0, 1.0], na::vector![1.0, 3.0]);
        let mut camera = Camera::new(10.0).unwrap();
        camera.update(10.0, Some(bounds), 0.25);
        assert_relative_eq!(camera.bitmap_size(), na::vector![30.0, 30.0]);
        assert_relative_eq!(
            camera.user_to_pixel(na::vector![-1.0, 3.0]),
            na::vector![5.0, 5.0]
        );
        assert_relative_eq!(
            camera.user_to_pixel(na::vector![1.0, 1.0]),
            na::vector![25.0, 25.0]
        );
        assert_relative_eq!(camera.pixel_to_user_dist(5.0), 0.5);
        assert_relative_eq!(camera.user_to_pixel_dist(0.5), 5.0);
    }

    #[test]
    fn invalid_ppu() {
        assert!(matches!(Camera::new(0.0), Err(CanvasError::InvalidPpu(_))));
        assert!(Camera::new(f64::NAN).is_err());
    }
}
