// Imports
use super::{fmt_coord, ItemBehaviour, PixelExtents, ShapeStyle};
use crate::Drawable;
use itertools::Itertools;
use oofcanvas_compose::ext::{AabbExt, OptionAabbExt};
use oofcanvas_compose::{Coord, Segment};
use p2d::bounding_volume::Aabb;
use serde::{Deserialize, Serialize};

/// A single straight line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename = "canvas_segment")]
pub struct CanvasSegment {
    #[serde(rename = "segment")]
    pub segment: Segment,
    #[serde(rename = "style")]
    pub style: ShapeStyle,
}

impl CanvasSegment {
    pub fn new(p0: Coord, p1: Coord) -> Self {
        Self {
            segment: Segment::new(p0, p1),
            style: ShapeStyle::default(),
        }
    }

    pub fn set_point0(&mut self, p0: Coord) {
        self.segment.p0 = p0;
    }

    pub fn set_point1(&mut self, p1: Coord) {
        self.segment.p1 = p1;
    }
}

impl ItemBehaviour for CanvasSegment {
    fn bare_bounds(&self) -> Option<Aabb> {
        let hw = self.style.half_user_width();
        Some(self.segment.bounds().expand(hw, hw, hw, hw))
    }

    fn pixel_extents(&self) -> PixelExtents {
        PixelExtents::uniform(self.style.half_pixel_width())
    }

    fn contains_point(&self, pt: Coord, ppu: f64) -> bool {
        let half_width = 0.5 * self.style.line_width_in_user_units(ppu);
        self.segment.within(pt, half_width)
    }
}

impl Drawable for CanvasSegment {
    fn draw(&self, cx: &mut impl piet::RenderContext, ppu: f64) -> anyhow::Result<()> {
        self.style.draw_stroke(cx, &self.segment.to_kurbo(), ppu);
        Ok(())
    }
}

impl std::fmt::Display for CanvasSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CanvasSegment({}, {})",
            fmt_coord(&self.segment.p0),
            fmt_coord(&self.segment.p1)
        )
    }
}

/// A set of unconnected segments sharing one style.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename = "canvas_segments")]
pub struct CanvasSegments {
    #[serde(rename = "segments")]
    pub segments: Vec<Segment>,
    #[serde(rename = "style")]
    pub style: ShapeStyle,
}

impl CanvasSegments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_segment(&mut self, p0: Coord, p1: Coord) {
        self.segments.push(Segment::new(p0, p1));
    }

    /// Moves the start point of every segment.
    pub fn set_point0(&mut self, p0: Coord) {
        for segment in self.segments.iter_mut() {
            segment.p0 = p0;
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

impl ItemBehaviour for CanvasSegments {
    fn bare_bounds(&self) -> Option<Aabb> {
        let hw = self.style.half_user_width();
        let mut bounds: Option<Aabb> = None;
        for segment in self.segments.iter() {
            bounds.swallow(Some(segment.bounds()));
        }
        bounds.map(|b| b.expand(hw, hw, hw, hw))
    }

    fn pixel_extents(&self) -> PixelExtents {
        PixelExtents::uniform(self.style.half_pixel_width())
    }

    fn contains_point(&self, pt: Coord, ppu: f64) -> bool {
        let half_width = 0.5 * self.style.line_width_in_user_units(ppu);
        self.segments.iter().any(|s| s.within(pt, half_width))
    }
}

impl Drawable for CanvasSegments {
    fn draw(&self, cx: &mut impl piet::RenderContext, ppu: f64) -> anyhow::Result<()> {
        let mut path = kurbo::BezPath::new();
        for segment in self.segments.iter() {
            path.move_to(kurbo::Point::new(segment.p0[0], segment.p0[1]));
            path.line_to(kurbo::Point::new(segment.p1[0], segment.p1[1]));
        }
        self.style.draw_stroke(cx, &path, ppu);
        Ok(())
    }
}

impl std::fmt::Display for CanvasSegments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CanvasSegments([{}])",
            self.segments
                .iter()
                .map(|s| format!("{}-{}", fmt_coord(&s.p0), fmt_coord(&s.p1)))
                .join(", ")
        )
    }
}
