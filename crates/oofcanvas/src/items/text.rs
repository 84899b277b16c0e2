// Imports
use super::{fmt_coord, ItemBehaviour, PixelExtents};
use crate::Drawable;
use oofcanvas_compose::ext::{AabbExt, Vector2Ext};
use oofcanvas_compose::utils::rotate;
use oofcanvas_compose::{Color, Coord};
use p2d::bounding_volume::Aabb;
use piet::{Text, TextLayout, TextLayoutBuilder};
use serde::{Deserialize, Serialize};
use tracing::error;

/// A single line of text.
///
/// The location is the left end of the baseline. The text is rotated counterclockwise about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename = "canvas_text")]
pub struct CanvasText {
    #[serde(rename = "location")]
    location: Coord,
    #[serde(rename = "text")]
    text: String,
    /// In degrees
    #[serde(rename = "angle")]
    angle: f64,
    #[serde(rename = "color")]
    color: Color,
    #[serde(rename = "font_family")]
    font_family: String,
    #[serde(rename = "font_size")]
    font_size: f64,
    #[serde(rename = "size_in_pixels")]
    size_in_pixels: bool,
}

impl Default for CanvasText {
    fn default() -> Self {
        Self {
            location: Coord::zeros(),
            text: String::new(),
            angle: 0.0,
            color: Color::BLACK,
            font_family: String::from(Self::FONT_FAMILY_DEFAULT),
            font_size: Self::FONT_SIZE_DEFAULT,
            size_in_pixels: false,
        }
    }
}

/// Layout metrics for a font size of one.
#[derive(Debug, Clone, Copy)]
struct UnitMetrics {
    width: f64,
    height: f64,
    baseline: f64,
}

impl CanvasText {
    pub const FONT_FAMILY_DEFAULT: &'static str = "Sans";
    pub const FONT_SIZE_DEFAULT: f64 = 12.0;
    /// Text is measured at this size and scaled, tiny font sizes give unreliable metrics.
    const MEASURE_FONT_SIZE: f64 = 100.0;

    pub fn new(location: Coord, text: impl Into<String>) -> Self {
        Self {
            location,
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn location(&self) -> Coord {
        self.location
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Rotates the text to the angle in degrees.
    pub fn rotate(&mut self, angle_degrees: f64) {
        self.angle = angle_degrees;
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Sets the font from a description like `"Serif Bold 14"`.
    ///
    /// A trailing number is the size, the rest names the family.
    /// The size is in pixels when `size_in_pixels` is set, else in user units.
    pub fn set_font(&mut self, description: &str, size_in_pixels: bool) {
        let mut words: Vec<&str> = description.split_whitespace().collect();
        if let Some(size) = words.last().and_then(|w| w.parse::<f64>().ok()) {
            self.font_size = size;
            words.pop();
        }
        if !words.is_empty() {
            self.font_family = words.join(" ");
        }
        self.size_in_pixels = size_in_pixels;
    }

    pub fn set_font_size(&mut self, size: f64, size_in_pixels: bool) {
        self.font_size = size;
        self.size_in_pixels = size_in_pixels;
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn size_in_pixels(&self) -> bool {
        self.size_in_pixels
    }

    /// Whether the font family can be resolved by the text backend.
    pub fn font_available(family: &str) -> bool {
        piet_cairo::CairoText::new().font_family(family).is_some()
    }

    fn build_text_layout<T>(&self, piet_text: &mut T, font_size: f64) -> anyhow::Result<T::TextLayout>
    where
        T: piet::Text,
    {
        let font_family = piet_text
            .font_family(&self.font_family)
            .unwrap_or(piet::FontFamily::SANS_SERIF);

        piet_text
            .new_text_layout(self.text.clone())
            .font(font_family, font_size)
            .text_color(self.color.into())
            .build()
            .map_err(|e| anyhow::anyhow!("Building piet text layout failed, Err: {e:?}"))
    }

    fn unit_metrics(&self) -> anyhow::Result<UnitMetrics> {
        let layout =
            self.build_text_layout(&mut piet_cairo::CairoText::new(), Self::MEASURE_FONT_SIZE)?;
        let size = layout.size();
        let baseline = layout
            .line_metric(0)
            .map(|m| m.baseline)
            .unwrap_or(size.height);
        Ok(UnitMetrics {
            width: size.width / Self::MEASURE_FONT_SIZE,
            height: size.height / Self::MEASURE_FONT_SIZE,
            baseline: baseline / Self::MEASURE_FONT_SIZE,
        })
    }

    /// The rotated layout box relative to the location, y up, in the units of the font size.
    fn local_bounds(&self) -> Option<Aabb> {
        let metrics = match self.unit_metrics() {
            Ok(metrics) => metrics,
            Err(e) => {
                error!("Measuring text failed while calculating the bounds, Err: {e:?}");
                return None;
            }
        };
        let s = self.font_size;
        let angle = self.angle.to_radians();
        let corners = [
            na::vector![0.0, -(metrics.height - metrics.baseline) * s],
            na::vector![metrics.width * s, -(metrics.height - metrics.baseline) * s],
            na::vector![metrics.width * s, metrics.baseline * s],
            na::vector![0.0, metrics.baseline * s],
        ]
        .map(|c| rotate(c, angle));
        Aabb::from_coords(&corners)
    }
}

impl ItemBehaviour for CanvasText {
    fn bare_bounds(&self) -> Option<Aabb> {
        if self.size_in_pixels {
            return Some(Aabb::from_point(self.location));
        }
        Some(
            self.local_bounds()
                .map(|b| b.shift(self.location))
                .unwrap_or_else(|| Aabb::from_point(self.location)),
        )
    }

    fn pixel_extents(&self) -> PixelExtents {
        if !self.size_in_pixels {
            return PixelExtents::default();
        }
        match self.local_bounds() {
            Some(b) => PixelExtents {
                left: (-b.mins[0]).max(0.0),
                right: b.maxs[0].max(0.0),
                up: b.maxs[1].max(0.0),
                down: (-b.mins[1]).max(0.0),
            },
            None => PixelExtents::default(),
        }
    }

    fn contains_point(&self, _pt: Coord, _ppu: f64) -> bool {
        false
    }
}

impl Drawable for CanvasText {
    fn draw(&self, cx: &mut impl piet::RenderContext, ppu: f64) -> anyhow::Result<()> {
        // the layout is built in pixels and scaled down, so small user sizes still get hinted properly
        let size_px = if self.size_in_pixels {
            self.font_size
        } else {
            self.font_size * ppu
        };
        if size_px <= 0.0 || self.text.is_empty() {
            return Ok(());
        }
        let layout = self.build_text_layout(cx.text(), size_px)?;
        let baseline = layout
            .line_metric(0)
            .map(|m| m.baseline)
            .unwrap_or(layout.size().height);

        cx.save().map_err(|e| anyhow::anyhow!("{e:?}"))?;
        cx.transform(
            kurbo::Affine::translate(self.location.to_kurbo_vec())
                * kurbo::Affine::rotate(self.angle.to_radians())
                * kurbo::Affine::scale_non_uniform(1.0 / ppu, -1.0 / ppu),
        );
        cx.draw_text(&layout, kurbo::Point::new(0.0, -baseline));
        cx.restore().map_err(|e| anyhow::anyhow!("{e:?}"))?;
        Ok(())
    }
}

impl std::fmt::Display for CanvasText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CanvasText(\"{}\", {})",
            self.text,
            fmt_coord(&self.location)
        )
    }
}
