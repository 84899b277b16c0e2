// Imports
use super::{ItemBehaviour, PixelExtents};
use crate::{CanvasError, Drawable};
use oofcanvas_compose::ext::{AabbExt, Vector2Ext};
use oofcanvas_compose::{Color, Coord};
use p2d::bounding_volume::Aabb;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A raster image placed with its lower left corner at a position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename = "canvas_image")]
pub struct CanvasImage {
    #[serde(rename = "position")]
    position: Coord,
    /// Size in user units, or in pixels when `size_in_pixels` is set
    #[serde(rename = "size")]
    size: Coord,
    #[serde(rename = "size_in_pixels")]
    size_in_pixels: bool,
    #[serde(rename = "opacity")]
    opacity: f64,
    #[serde(rename = "draw_individual_pixels")]
    draw_individual_pixels: bool,
    #[serde(rename = "raster", with = "crate::utils::rgba_image_base64")]
    raster: image::RgbaImage,
}

impl Default for CanvasImage {
    fn default() -> Self {
        Self {
            position: Coord::zeros(),
            size: Coord::zeros(),
            size_in_pixels: false,
            opacity: 1.0,
            draw_individual_pixels: false,
            raster: image::RgbaImage::new(0, 0),
        }
    }
}

impl CanvasImage {
    /// A image with every pixel set to the color.
    ///
    /// Its initial size in user units equals the pixel size.
    pub fn new_blank(position: Coord, pixel_width: u32, pixel_height: u32, color: Color) -> Self {
        let raster =
            image::RgbaImage::from_pixel(pixel_width, pixel_height, image::Rgba(color.to_rgba8()));
        Self::from_raster(position, raster)
    }

    /// Reads a image file in any format the `image` crate can decode.
    pub fn new_from_file(position: Coord, path: impl AsRef<Path>) -> Result<Self, CanvasError> {
        let raster = image::open(path.as_ref())?.into_rgba8();
        Ok(Self::from_raster(position, raster))
    }

    /// Decodes a encoded image, guessing its format.
    pub fn new_from_bytes(position: Coord, bytes: &[u8]) -> Result<Self, CanvasError> {
        let raster = image::load_from_memory(bytes)?.into_rgba8();
        Ok(Self::from_raster(position, raster))
    }

    pub fn from_raster(position: Coord, raster: image::RgbaImage) -> Self {
        let size = na::vector![f64::from(raster.width()), f64::from(raster.height())];
        Self {
            position,
            size,
            raster,
            ..Default::default()
        }
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    pub fn size(&self) -> Coord {
        self.size
    }

    pub fn size_in_pixels(&self) -> bool {
        self.size_in_pixels
    }

    pub fn pixel_width(&self) -> u32 {
        self.raster.width()
    }

    pub fn pixel_height(&self) -> u32 {
        self.raster.height()
    }

    pub fn raster(&self) -> &image::RgbaImage {
        &self.raster
    }

    /// The size in user units.
    ///
    /// A non-positive component is inferred from the other one, keeping the pixels square.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.size = self.infer_size(width, height);
        self.size_in_pixels = false;
    }

    /// The size in device pixels, independent of the ppu.
    pub fn set_size_in_pixels(&mut self, width: f64, height: f64) {
        self.size = self.infer_size(width, height);
        self.size_in_pixels = true;
    }

    fn infer_size(&self, width: f64, height: f64) -> Coord {
        let pw = f64::from(self.raster.width());
        let ph = f64::from(self.raster.height());
        match (width > 0.0, height > 0.0) {
            (true, true) => na::vector![width, height],
            (true, false) if pw > 0.0 => na::vector![width, width * ph / pw],
            (false, true) if ph > 0.0 => na::vector![height * pw / ph, height],
            _ => na::vector![pw, ph],
        }
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Draws each pixel as a filled rectangle instead of drawing the scaled raster.
    ///
    /// Keeps the pixels sharp when the image is magnified in vector output.
    pub fn set_draw_individual_pixels(&mut self, draw_individual_pixels: bool) {
        self.draw_individual_pixels = draw_individual_pixels;
    }

    /// The color of a pixel, row 0 being the top of the image.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.raster
            .get_pixel_checked(x, y)
            .map(|p| Color::from_rgba8(p.0))
    }

    /// Sets the color of a pixel, row 0 being the top of the image.
    ///
    /// Returns false if the pixel is outside of the image.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) -> bool {
        match self.raster.get_pixel_mut_checked(x, y) {
            Some(pixel) => {
                *pixel = image::Rgba(color.to_rgba8());
                true
            }
            None => false,
        }
    }

    fn user_size(&self, ppu: f64) -> Coord {
        if self.size_in_pixels {
            self.size / ppu
        } else {
            self.size
        }
    }

    fn rgba_with_opacity(&self) -> Vec<u8> {
        let mut data = self.raster.as_raw().clone();
        if self.opacity < 1.0 {
            for px in data.chunks_exact_mut(4) {
                px[3] = (f64::from(px[3]) * self.opacity).round() as u8;
            }
        }
        data
    }
}

impl ItemBehaviour for CanvasImage {
    fn bare_bounds(&self) -> Option<Aabb> {
        if self.size_in_pixels {
            Some(Aabb::from_point(self.position))
        } else {
            Some(Aabb::new_positive(self.position, self.position + self.size))
        }
    }

    fn pixel_extents(&self) -> PixelExtents {
        if self.size_in_pixels {
            PixelExtents {
                right: self.size[0].max(0.0),
                up: self.size[1].max(0.0),
                ..Default::default()
            }
        } else {
            PixelExtents::default()
        }
    }

    fn contains_point(&self, _pt: Coord, _ppu: f64) -> bool {
        true
    }
}

impl Drawable for CanvasImage {
    fn draw(&self, cx: &mut impl piet::RenderContext, ppu: f64) -> anyhow::Result<()> {
        let (pw, ph) = (self.raster.width(), self.raster.height());
        if pw == 0 || ph == 0 {
            return Ok(());
        }
        let size = self.user_size(ppu);

        cx.save().map_err(|e| anyhow::anyhow!("{e:?}"))?;
        // local frame has its origin at the upper left corner with y pointing down, like the raster rows
        cx.transform(
            kurbo::Affine::translate((self.position + na::vector![0.0, size[1]]).to_kurbo_vec())
                * kurbo::Affine::scale_non_uniform(1.0, -1.0),
        );

        if self.draw_individual_pixels {
            let px_size = na::vector![size[0] / f64::from(pw), size[1] / f64::from(ph)];
            for (x, y, pixel) in self.raster.enumerate_pixels() {
                let color = Color::from_rgba8(pixel.0);
                let color = color.opacity(color.a * self.opacity);
                let x0 = f64::from(x) * px_size[0];
                let y0 = f64::from(y) * px_size[1];
                cx.fill(
                    kurbo::Rect::new(x0, y0, x0 + px_size[0], y0 + px_size[1]),
                    &piet::Color::from(color),
                );
            }
        } else {
            let piet_image = cx
                .make_image(
                    pw as usize,
                    ph as usize,
                    &self.rgba_with_opacity(),
                    piet::ImageFormat::RgbaSeparate,
                )
                .map_err(|e| anyhow::anyhow!("{e:?}"))?;
            cx.draw_image(
                &piet_image,
                kurbo::Rect::new(0.0, 0.0, size[0], size[1]),
                piet::InterpolationMode::NearestNeighbor,
            );
        }

        cx.restore().map_err(|e| anyhow::anyhow!("{e:?}"))?;
        Ok(())
    }
}

impl std::fmt::Display for CanvasImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CanvasImage({}, {}, {}x{} pixels)",
            super::fmt_coord(&self.position),
            super::fmt_coord(&self.size),
            self.raster.width(),
            self.raster.height()
        )
    }
}
