// Modules
pub mod arrowhead;
pub mod circle;
pub mod curve;
pub mod dot;
pub mod ellipse;
pub mod image;
pub mod polygon;
pub mod rectangle;
pub mod segment;
pub mod shapestyle;
pub mod text;

// Re-exports
pub use arrowhead::CanvasArrowhead;
pub use circle::CanvasCircle;
pub use curve::CanvasCurve;
pub use dot::CanvasDot;
pub use ellipse::CanvasEllipse;
pub use image::CanvasImage;
pub use polygon::CanvasPolygon;
pub use rectangle::CanvasRectangle;
pub use segment::{CanvasSegment, CanvasSegments};
pub use shapestyle::ShapeStyle;
pub use text::CanvasText;

// Imports
use crate::Drawable;
use oofcanvas_compose::ext::AabbExt;
use oofcanvas_compose::Coord;
use p2d::bounding_volume::Aabb;
use serde::{Deserialize, Serialize};

/// How far a item reaches past its bare bounds, in device pixels.
///
/// Parts of a item that have a fixed on-screen size (dots, pixel-wide lines, pixel-sized text)
/// don't scale with the pixels-per-unit, so they can't be part of the bounds in user units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PixelExtents {
    /// Towards negative x
    pub left: f64,
    /// Towards positive x
    pub right: f64,
    /// Towards positive y
    pub up: f64,
    /// Towards negative y
    pub down: f64,
}

impl PixelExtents {
    /// The same extent in every direction.
    pub fn uniform(extent: f64) -> Self {
        Self {
            left: extent,
            right: extent,
            up: extent,
            down: extent,
        }
    }

    /// The largest of the four extents
    pub fn max(&self) -> f64 {
        self.left.max(self.right).max(self.up).max(self.down)
    }

    /// Expands the bounds by the extents, converted to user units with the given ppu.
    pub fn apply(&self, bounds: Aabb, ppu: f64) -> Aabb {
        bounds.expand(
            self.left / ppu,
            self.right / ppu,
            self.up / ppu,
            self.down / ppu,
        )
    }
}

/// Geometric behaviour every canvas item has.
pub trait ItemBehaviour {
    /// The bounds in user units, without the parts that are sized in pixels.
    ///
    /// None when the item has no extent at all, for example a polygon without corners.
    fn bare_bounds(&self) -> Option<Aabb>;

    /// How far the item reaches past its bare bounds in pixels.
    fn pixel_extents(&self) -> PixelExtents {
        PixelExtents::default()
    }

    /// The bounds in user units when drawn at the given pixels-per-unit.
    fn bounds(&self, ppu: f64) -> Option<Aabb> {
        self.bare_bounds()
            .map(|bounds| self.pixel_extents().apply(bounds, ppu))
    }

    /// Whether the point in user units hits the item.
    ///
    /// Only called for points that are already known to be inside `bounds(ppu)`.
    fn contains_point(&self, pt: Coord, ppu: f64) -> bool;
}

/// A item that can be placed on a layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "canvas_item")]
pub enum CanvasItem {
    #[serde(rename = "rectangle")]
    Rectangle(CanvasRectangle),
    #[serde(rename = "circle")]
    Circle(CanvasCircle),
    #[serde(rename = "ellipse")]
    Ellipse(CanvasEllipse),
    #[serde(rename = "dot")]
    Dot(CanvasDot),
    #[serde(rename = "polygon")]
    Polygon(CanvasPolygon),
    #[serde(rename = "segment")]
    Segment(CanvasSegment),
    #[serde(rename = "segments")]
    Segments(CanvasSegments),
    #[serde(rename = "curve")]
    Curve(CanvasCurve),
    #[serde(rename = "arrowhead")]
    Arrowhead(CanvasArrowhead),
    #[serde(rename = "text")]
    Text(CanvasText),
    #[serde(rename = "image")]
    Image(CanvasImage),
}

macro_rules! impl_from_item {
    ($variant:ident, $item:ty) => {
        impl From<$item> for CanvasItem {
            fn from(value: $item) -> Self {
                CanvasItem::$variant(value)
            }
        }
    };
}

impl_from_item!(Rectangle, CanvasRectangle);
impl_from_item!(Circle, CanvasCircle);
impl_from_item!(Ellipse, CanvasEllipse);
impl_from_item!(Dot, CanvasDot);
impl_from_item!(Polygon, CanvasPolygon);
impl_from_item!(Segment, CanvasSegment);
impl_from_item!(Segments, CanvasSegments);
impl_from_item!(Curve, CanvasCurve);
impl_from_item!(Arrowhead, CanvasArrowhead);
impl_from_item!(Text, CanvasText);
impl_from_item!(Image, CanvasImage);

impl CanvasItem {
    /// The name of the item type.
    pub fn classname(&self) -> &'static str {
        match self {
            CanvasItem::Rectangle(_) => "CanvasRectangle",
            CanvasItem::Circle(_) => "CanvasCircle",
            CanvasItem::Ellipse(_) => "CanvasEllipse",
            CanvasItem::Dot(_) => "CanvasDot",
            CanvasItem::Polygon(_) => "CanvasPolygon",
            CanvasItem::Segment(_) => "CanvasSegment",
            CanvasItem::Segments(_) => "CanvasSegments",
            CanvasItem::Curve(_) => "CanvasCurve",
            CanvasItem::Arrowhead(_) => "CanvasArrowhead",
            CanvasItem::Text(_) => "CanvasText",
            CanvasItem::Image(_) => "CanvasImage",
        }
    }

    /// The shape style, for items that have a outline or fill.
    pub fn shape_style(&self) -> Option<&ShapeStyle> {
        match self {
            CanvasItem::Rectangle(i) => Some(&i.style),
            CanvasItem::Circle(i) => Some(&i.style),
            CanvasItem::Ellipse(i) => Some(&i.style),
            CanvasItem::Dot(i) => Some(&i.style),
            CanvasItem::Polygon(i) => Some(&i.style),
            CanvasItem::Segment(i) => Some(&i.style),
            CanvasItem::Segments(i) => Some(&i.style),
            CanvasItem::Curve(i) => Some(&i.style),
            CanvasItem::Arrowhead(_) | CanvasItem::Text(_) | CanvasItem::Image(_) => None,
        }
    }

    /// The mutable shape style, for items that have a outline or fill.
    pub fn shape_style_mut(&mut self) -> Option<&mut ShapeStyle> {
        match self {
            CanvasItem::Rectangle(i) => Some(&mut i.style),
            CanvasItem::Circle(i) => Some(&mut i.style),
            CanvasItem::Ellipse(i) => Some(&mut i.style),
            CanvasItem::Dot(i) => Some(&mut i.style),
            CanvasItem::Polygon(i) => Some(&mut i.style),
            CanvasItem::Segment(i) => Some(&mut i.style),
            CanvasItem::Segments(i) => Some(&mut i.style),
            CanvasItem::Curve(i) => Some(&mut i.style),
            CanvasItem::Arrowhead(_) | CanvasItem::Text(_) | CanvasItem::Image(_) => None,
        }
    }
}

impl ItemBehaviour for CanvasItem {
    fn bare_bounds(&self) -> Option<Aabb> {
        match self {
            CanvasItem::Rectangle(i) => i.bare_bounds(),
            CanvasItem::Circle(i) => i.bare_bounds(),
            CanvasItem::Ellipse(i) => i.bare_bounds(),
            CanvasItem::Dot(i) => i.bare_bounds(),
            CanvasItem::Polygon(i) => i.bare_bounds(),
            CanvasItem::Segment(i) => i.bare_bounds(),
            CanvasItem::Segments(i) => i.bare_bounds(),
            CanvasItem::Curve(i) => i.bare_bounds(),
            CanvasItem::Arrowhead(i) => i.bare_bounds(),
            CanvasItem::Text(i) => i.bare_bounds(),
            CanvasItem::Image(i) => i.bare_bounds(),
        }
    }

    fn pixel_extents(&self) -> PixelExtents {
        match self {
            CanvasItem::Rectangle(i) => i.pixel_extents(),
            CanvasItem::Circle(i) => i.pixel_extents(),
            CanvasItem::Ellipse(i) => i.pixel_extents(),
            CanvasItem::Dot(i) => i.pixel_extents(),
            CanvasItem::Polygon(i) => i.pixel_extents(),
            CanvasItem::Segment(i) => i.pixel_extents(),
            CanvasItem::Segments(i) => i.pixel_extents(),
            CanvasItem::Curve(i) => i.pixel_extents(),
            CanvasItem::Arrowhead(i) => i.pixel_extents(),
            CanvasItem::Text(i) => i.pixel_extents(),
            CanvasItem::Image(i) => i.pixel_extents(),
        }
    }

    fn contains_point(&self, pt: Coord, ppu: f64) -> bool {
        match self {
            CanvasItem::Rectangle(i) => i.contains_point(pt, ppu),
            CanvasItem::Circle(i) => i.contains_point(pt, ppu),
            CanvasItem::Ellipse(i) => i.contains_point(pt, ppu),
            CanvasItem::Dot(i) => i.contains_point(pt, ppu),
            CanvasItem::Polygon(i) => i.contains_point(pt, ppu),
            CanvasItem::Segment(i) => i.contains_point(pt, ppu),
            CanvasItem::Segments(i) => i.contains_point(pt, ppu),
            CanvasItem::Curve(i) => i.contains_point(pt, ppu),
            CanvasItem::Arrowhead(i) => i.contains_point(pt, ppu),
            CanvasItem::Text(i) => i.contains_point(pt, ppu),
            CanvasItem::Image(i) => i.contains_point(pt, ppu),
        }
    }
}

impl Drawable for CanvasItem {
    fn draw(&self, cx: &mut impl piet::RenderContext, ppu: f64) -> anyhow::Result<()> {
        match self {
            CanvasItem::Rectangle(i) => i.draw(cx, ppu),
            CanvasItem::Circle(i) => i.draw(cx, ppu),
            CanvasItem::Ellipse(i) => i.draw(cx, ppu),
            CanvasItem::Dot(i) => i.draw(cx, ppu),
            CanvasItem::Polygon(i) => i.draw(cx, ppu),
            CanvasItem::Segment(i) => i.draw(cx, ppu),
            CanvasItem::Segments(i) => i.draw(cx, ppu),
            CanvasItem::Curve(i) => i.draw(cx, ppu),
            CanvasItem::Arrowhead(i) => i.draw(cx, ppu),
            CanvasItem::Text(i) => i.draw(cx, ppu),
            CanvasItem::Image(i) => i.draw(cx, ppu),
        }
    }
}

impl std::fmt::Display for CanvasItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CanvasItem::Rectangle(i) => std::fmt::Display::fmt(i, f),
            CanvasItem::Circle(i) => std::fmt::Display::fmt(i, f),
            CanvasItem::Ellipse(i) => std::fmt::Display::fmt(i, f),
            CanvasItem::Dot(i) => std::fmt::Display::fmt(i, f),
            CanvasItem::Polygon(i) => std::fmt::Display::fmt(i, f),
            CanvasItem::Segment(i) => std::fmt::Display::fmt(i, f),
            CanvasItem::Segments(i) => std::fmt::Display::fmt(i, f),
            CanvasItem::Curve(i) => std::fmt::Display::fmt(i, f),
            CanvasItem::Arrowhead(i) => std::fmt::Display::fmt(i, f),
            CanvasItem::Text(i) => std::fmt::Display::fmt(i, f),
            CanvasItem::Image(i) => std::fmt::Display::fmt(i, f),
        }
    }
}

/// Formats a coordinate the way items print them.
pub(crate) fn fmt_coord(c: &Coord) -> String {
    format!("({}, {})", c[0], c[1])
}
