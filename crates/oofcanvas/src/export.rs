// Imports
use crate::{Canvas, CanvasError, ExportFormat, ExportPrefs, LayerKey};
use oofcanvas_compose::ext::AabbExt;
use oofcanvas_compose::Coord;
use p2d::bounding_volume::Aabb;
use std::path::Path;
use tracing::debug;

/// Cairo can't create bitmaps with a side of this size or larger.
pub const MAX_BITMAP_SIZE: u64 = 32768;

/// The pixel geometry of a exported region.
#[derive(Debug, Clone, Copy)]
struct ExportGeometry {
    ppu: f64,
    width: i32,
    height: i32,
    transform: kurbo::Affine,
}

impl ExportGeometry {
    /// Fits the region with its larger side into `max_pixels`.
    fn new(max_pixels: u32, pt0: Coord, pt1: Coord) -> Result<Self, CanvasError> {
        let region = Aabb::new_positive(pt0, pt1);
        let size = region.width().max(region.height());
        if size.is_nan() || size <= 0.0 {
            return Err(CanvasError::NothingToDraw);
        }
        let ppu = f64::from(max_pixels) / size;
        let width = (ppu * region.width()).ceil() as u64;
        let height = (ppu * region.height()).ceil() as u64;
        if width >= MAX_BITMAP_SIZE || height >= MAX_BITMAP_SIZE || width == 0 || height == 0 {
            return Err(CanvasError::BitmapTooLarge { width, height });
        }
        let transform = kurbo::Affine::new([
            ppu,
            0.0,
            0.0,
            -ppu,
            -ppu * region.mins[0],
            ppu * region.maxs[1],
        ]);
        Ok(Self {
            ppu,
            width: width as i32,
            height: height as i32,
            transform,
        })
    }
}

impl Canvas {
    /// The region that a full export covers, at the ppu that fills `max_pixels`.
    fn export_region(&self, max_pixels: u32) -> Option<(Coord, Coord)> {
        let max_pixels = f64::from(max_pixels);
        let mut ppu = self.filled_ppu(max_pixels, max_pixels);
        if !ppu.is_finite() || ppu <= 0.0 {
            ppu = 1.0;
        }
        let bounds = self.bounds(ppu)?;
        Some((bounds.lower_left(), bounds.upper_right()))
    }

    fn draw_region(
        &self,
        cx: &cairo::Context,
        geometry: &ExportGeometry,
        draw_background: bool,
    ) -> Result<(), CanvasError> {
        self.draw_layers_to_cairo(
            cx,
            self.layer_keys().to_vec(),
            geometry.transform,
            geometry.ppu,
            draw_background,
        )
    }

    /// Encodes the region as png. None when no item is visible.
    pub fn export_region_png_bytes(
        &self,
        max_pixels: u32,
        draw_background: bool,
        pt0: Coord,
        pt1: Coord,
    ) -> Result<Option<Vec<u8>>, CanvasError> {
        if self.n_visible_items() == 0 {
            return Ok(None);
        }
        let geometry = ExportGeometry::new(max_pixels, pt0, pt1)?;
        debug!(
            "Exporting region as png of size {}x{} at ppu {}",
            geometry.width, geometry.height, geometry.ppu
        );
        let surface =
            cairo::ImageSurface::create(cairo::Format::ARgb32, geometry.width, geometry.height)?;
        {
            let cx = cairo::Context::new(&surface)?;
            self.draw_region(&cx, &geometry, draw_background)?;
        }
        let mut bytes = Vec::new();
        surface.write_to_png(&mut bytes)?;
        Ok(Some(bytes))
    }

    /// Encodes the region as single page pdf, restricted to pdf version 1.4. None when no item is visible.
    pub fn export_region_pdf_bytes(
        &self,
        max_pixels: u32,
        draw_background: bool,
        pt0: Coord,
        pt1: Coord,
    ) -> Result<Option<Vec<u8>>, CanvasError> {
        if self.n_visible_items() == 0 {
            return Ok(None);
        }
        let geometry = ExportGeometry::new(max_pixels, pt0, pt1)?;
        debug!(
            "Exporting region as pdf of size {}x{} at ppu {}",
            geometry.width, geometry.height, geometry.ppu
        );
        let surface = cairo::PdfSurface::for_stream(
            f64::from(geometry.width),
            f64::from(geometry.height),
            Vec::<u8>::new(),
        )?;
        surface.restrict(cairo::PdfVersion::_1_4)?;
        surface.set_metadata(cairo::PdfMetadata::Creator, "oofcanvas")?;

        // New scope to avoid errors when flushing
        {
            let cx = cairo::Context::new(&surface)?;
            self.draw_region(&cx, &geometry, draw_background)?;
            cx.show_page()?;
        }
        let data = *surface
            .finish_output_stream()
            .map_err(|e| anyhow::anyhow!("Finishing pdf output stream failed, Err: {e:?}"))?
            .downcast::<Vec<u8>>()
            .map_err(|e| anyhow::anyhow!("Downcasting pdf output stream failed, Err: {e:?}"))?;
        Ok(Some(data))
    }

    /// Encodes the region in the format.
    pub fn export_region_bytes(
        &self,
        format: ExportFormat,
        max_pixels: u32,
        draw_background: bool,
        pt0: Coord,
        pt1: Coord,
    ) -> Result<Option<Vec<u8>>, CanvasError> {
        match format {
            ExportFormat::Png => {
                self.export_region_png_bytes(max_pixels, draw_background, pt0, pt1)
            }
            ExportFormat::Pdf => {
                self.export_region_pdf_bytes(max_pixels, draw_background, pt0, pt1)
            }
        }
    }

    /// Encodes the whole drawing as png. None when no item is visible.
    pub fn export_png_bytes(
        &self,
        max_pixels: u32,
        draw_background: bool,
    ) -> Result<Option<Vec<u8>>, CanvasError> {
        self.export_bytes(&ExportPrefs {
            max_pixels,
            draw_background,
            format: ExportFormat::Png,
        })
    }

    /// Encodes the whole drawing as pdf. None when no item is visible.
    pub fn export_pdf_bytes(
        &self,
        max_pixels: u32,
        draw_background: bool,
    ) -> Result<Option<Vec<u8>>, CanvasError> {
        self.export_bytes(&ExportPrefs {
            max_pixels,
            draw_background,
            format: ExportFormat::Pdf,
        })
    }

    /// Encodes the whole drawing with the export preferences. None when no item is visible.
    pub fn export_bytes(&self, prefs: &ExportPrefs) -> Result<Option<Vec<u8>>, CanvasError> {
        if self.n_visible_items() == 0 {
            return Ok(None);
        }
        let Some((pt0, pt1)) = self.export_region(prefs.max_pixels) else {
            return Ok(None);
        };
        self.export_region_bytes(
            prefs.format,
            prefs.max_pixels,
            prefs.draw_background,
            pt0,
            pt1,
        )
    }

    /// Saves the whole drawing as png, with its larger side `max_pixels` long.
    ///
    /// Returns false without writing a file when no item is visible.
    pub fn save_as_png(
        &self,
        path: impl AsRef<Path>,
        max_pixels: u32,
        draw_background: bool,
    ) -> Result<bool, CanvasError> {
        write_if_some(path, self.export_png_bytes(max_pixels, draw_background)?)
    }

    /// Saves the whole drawing as pdf, with its larger side `max_pixels` long.
    ///
    /// Returns false without writing a file when no item is visible.
    pub fn save_as_pdf(
        &self,
        path: impl AsRef<Path>,
        max_pixels: u32,
        draw_background: bool,
    ) -> Result<bool, CanvasError> {
        write_if_some(path, self.export_pdf_bytes(max_pixels, draw_background)?)
    }

    /// Saves the region between the two corners in user coordinates as png.
    pub fn save_region_as_png(
        &self,
        path: impl AsRef<Path>,
        max_pixels: u32,
        draw_background: bool,
        pt0: Coord,
        pt1: Coord,
    ) -> Result<bool, CanvasError> {
        write_if_some(
            path,
            self.export_region_png_bytes(max_pixels, draw_background, pt0, pt1)?,
        )
    }

    /// Saves the region between the two corners in user coordinates as pdf.
    pub fn save_region_as_pdf(
        &self,
        path: impl AsRef<Path>,
        max_pixels: u32,
        draw_background: bool,
        pt0: Coord,
        pt1: Coord,
    ) -> Result<bool, CanvasError> {
        write_if_some(
            path,
            self.export_region_pdf_bytes(max_pixels, draw_background, pt0, pt1)?,
        )
    }

    /// Writes a single layer with a transparent background as png,
    /// at the current ppu and transform, in a bitmap of [Canvas::bitmap_size].
    pub fn write_layer_to_png(
        &self,
        key: LayerKey,
        path: impl AsRef<Path>,
    ) -> Result<(), CanvasError> {
        if self.layer(key).is_none() {
            return Err(CanvasError::InvalidLayerKey);
        }
        let size = self.bitmap_size();
        let width = size[0].ceil().max(1.0) as u64;
        let height = size[1].ceil().max(1.0) as u64;
        if width >= MAX_BITMAP_SIZE || height >= MAX_BITMAP_SIZE {
            return Err(CanvasError::BitmapTooLarge { width, height });
        }
        let surface =
            cairo::ImageSurface::create(cairo::Format::ARgb32, width as i32, height as i32)?;
        {
            let cx = cairo::Context::new(&surface)?;
            self.draw_layers_to_cairo(&cx, [key], self.transform(), self.ppu(), false)?;
        }
        let mut file = std::fs::File::create(path)?;
        surface.write_to_png(&mut file)?;
        Ok(())
    }
}

fn write_if_some(path: impl AsRef<Path>, bytes: Option<Vec<u8>>) -> Result<bool, CanvasError> {
    match bytes {
        Some(bytes) => {
            std::fs::write(path, bytes)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{CanvasDot, CanvasRectangle};
    use oofcanvas_compose::Color;

    fn canvas_with_rect() -> Canvas {
        let mut canvas = Canvas::new(1.0).unwrap();
        let layer = canvas.new_layer("l");
        let mut rect = CanvasRectangle::new(na::vector![0.0, 0.0], na::vector![4.0, 2.0]);
        rect.style.set_fill_color(Color::GREEN);
        canvas.add_item(layer, rect).unwrap();
        canvas
    }

    #[test]
    fn png_fills_max_pixels() {
        let canvas = canvas_with_rect();
        let bytes = canvas.export_png_bytes(100, true).unwrap().unwrap();
        let img = image::load_from_memory(&bytes).unwrap().into_rgba8();
        assert_eq!((img.width(), img.height()), (100, 50));
        assert_eq!(img.get_pixel(50, 25).0, [0, 255, 0, 255]);
    }

    #[test]
    fn region_with_background() {
        let canvas = canvas_with_rect();
        let bytes = canvas
            .export_region_png_bytes(80, true, na::vector![-4.0, -2.0], na::vector![4.0, 2.0])
            .unwrap()
            .unwrap();
        let img = image::load_from_memory(&bytes).unwrap().into_rgba8();
        assert_eq!((img.width(), img.height()), (80, 40));
        assert_eq!(img.get_pixel(20, 15).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(60, 15).0, [0, 255, 0, 255]);
        assert_eq!(img.get_pixel(60, 25).0, [255, 255, 255, 255]);
    }

    #[test]
    fn nothing_visible() {
        let mut canvas = canvas_with_rect();
        assert!(canvas.export_png_bytes(100, true).unwrap().is_some());
        let key = canvas.layer_at(0).unwrap();
        canvas.layer_mut(key).unwrap().hide();
        assert!(canvas.export_png_bytes(100, true).unwrap().is_none());
        assert!(canvas.export_pdf_bytes(100, true).unwrap().is_none());
    }

    #[test]
    fn bitmap_limit() {
        let canvas = canvas_with_rect();
        let res = canvas.export_region_png_bytes(
            40000,
            true,
            na::vector![0.0, 0.0],
            na::vector![4.0, 2.0],
        );
        assert!(matches!(
            res,
            Err(CanvasError::BitmapTooLarge {
                width: 40000,
                height: 20000
            })
        ));
    }

    #[test]
    fn pdf_header() {
        let mut canvas = canvas_with_rect();
        let key = canvas.layer_at(0).unwrap();
        canvas
            .add_item(key, CanvasDot::new(na::vector![4.0, 2.0], 3.0))
            .unwrap();
        let bytes = canvas.export_pdf_bytes(200, false).unwrap().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
    }
}
