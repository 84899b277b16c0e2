// Imports
use crate::items::{
    CanvasCircle, CanvasEllipse, CanvasRectangle, CanvasSegment, CanvasSegments, ShapeStyle,
};
use crate::{Canvas, CanvasError, CanvasItem, ItemKey, LayerKey};
use oofcanvas_compose::{Color, Coord};
use serde::{Deserialize, Serialize};

/// The look of a rubberband.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename = "rubberband_style")]
pub struct RubberBandStyle {
    /// In pixels
    #[serde(rename = "line_width")]
    pub line_width: f64,
    #[serde(rename = "color")]
    pub color: Color,
    /// Fills the gaps between the dashes when `colored_dashes` is set
    #[serde(rename = "dash_color")]
    pub dash_color: Color,
    /// In pixels
    #[serde(rename = "dash_length")]
    pub dash_length: f64,
    #[serde(rename = "dashed")]
    pub dashed: bool,
    #[serde(rename = "colored_dashes")]
    pub colored_dashes: bool,
}

impl Default for RubberBandStyle {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            color: Color::BLACK,
            dash_color: Color::WHITE,
            dash_length: 0.0,
            dashed: true,
            colored_dashes: false,
        }
    }
}

impl RubberBandStyle {
    /// Applies the style to a shape, with the line width scaled by the factor.
    fn apply(&self, style: &mut ShapeStyle, width_factor: f64) {
        style.set_line_width_in_pixels(self.line_width * width_factor);
        style.set_line_color(self.color);
        if self.dashed {
            style.set_dash_in_pixels(self.dash_length);
            if self.colored_dashes {
                style.set_dash_color(self.dash_color);
            }
        }
    }
}

/// The shape a rubberband draws between the point where it was started and the current point.
#[derive(Debug, Clone, PartialEq)]
pub enum RubberBandKind {
    /// A straight line
    Line,
    /// A rectangle with the two points as opposite corners
    Rectangle,
    /// A circle around the start point, with its radius drawn
    Circle,
    /// An ellipse inscribed in the rectangle spanned by the two points
    Ellipse,
    /// Lines from the current point to each of the fixed points
    Spider(Vec<Coord>),
}

/// Temporary shapes that follow the pointer while a button is held down.
///
/// The shapes are items on a layer of the canvas, which only exist while the rubberband is active.
#[derive(Debug, Clone)]
pub struct RubberBand {
    kind: RubberBandKind,
    style: RubberBandStyle,
    start: Coord,
    current: Coord,
    /// The layer and the items while active
    placed: Option<(LayerKey, Vec<ItemKey>)>,
}

impl RubberBand {
    pub fn new(kind: RubberBandKind) -> Self {
        Self {
            kind,
            style: RubberBandStyle::default(),
            start: Coord::zeros(),
            current: Coord::zeros(),
            placed: None,
        }
    }

    pub fn with_style(mut self, style: RubberBandStyle) -> Self {
        self.style = style;
        self
    }

    pub fn kind(&self) -> &RubberBandKind {
        &self.kind
    }

    pub fn style(&self) -> &RubberBandStyle {
        &self.style
    }

    pub fn active(&self) -> bool {
        self.placed.is_some()
    }

    pub fn start_point(&self) -> Coord {
        self.start
    }

    pub fn current_point(&self) -> Coord {
        self.current
    }

    /// Places the shapes on the layer, starting and ending at the point.
    pub fn start(
        &mut self,
        canvas: &mut Canvas,
        layer: LayerKey,
        pt: Coord,
    ) -> Result<(), CanvasError> {
        if self.active() {
            self.stop(canvas)?;
        }
        self.start = pt;
        self.current = pt;
        let keys = self
            .build_items()
            .into_iter()
            .map(|item| canvas.add_item(layer, item))
            .collect::<Result<Vec<ItemKey>, CanvasError>>()?;
        self.placed = Some((layer, keys));
        Ok(())
    }

    /// Moves the end of the shapes to the point.
    pub fn update(&mut self, canvas: &mut Canvas, pt: Coord) -> Result<(), CanvasError> {
        self.current = pt;
        let Some((_, keys)) = self.placed.as_ref() else {
            return Ok(());
        };
        for (key, new_item) in keys.iter().zip(self.build_items()) {
            canvas.update_item(*key, |item| *item = new_item)?;
        }
        Ok(())
    }

    /// Removes the shapes from the canvas.
    ///
    /// Every shape is removed even when one of them fails, the first error is returned.
    pub fn stop(&mut self, canvas: &mut Canvas) -> Result<(), CanvasError> {
        let Some((_, keys)) = self.placed.take() else {
            return Ok(());
        };
        keys.into_iter()
            .map(|key| canvas.remove_item(key).map(|_| ()))
            .fold(Ok(()), |acc, res| acc.and(res))
    }

    fn build_items(&self) -> Vec<CanvasItem> {
        let (start, current) = (self.start, self.current);
        match &self.kind {
            RubberBandKind::Line => {
                let mut seg = CanvasSegment::new(start, current);
                self.style.apply(&mut seg.style, 1.0);
                vec![seg.into()]
            }
            RubberBandKind::Rectangle => {
                let mut rect = CanvasRectangle::new(start, current);
                self.style.apply(&mut rect.style, 1.0);
                vec![rect.into()]
            }
            RubberBandKind::Circle => {
                let mut circle = CanvasCircle::new(start, (current - start).magnitude());
                self.style.apply(&mut circle.style, 1.0);
                let mut radius = CanvasSegment::new(start, current);
                self.style.apply(&mut radius.style, 0.5);
                vec![circle.into(), radius.into()]
            }
            RubberBandKind::Ellipse => {
                let mut rect = CanvasRectangle::new(start, current);
                self.style.apply(&mut rect.style, 0.5);
                let diff = current - start;
                let mut ellipse = CanvasEllipse::new(
                    0.5 * (start + current),
                    na::vector![0.5 * diff[0].abs(), 0.5 * diff[1].abs()],
                    0.0,
                );
                self.style.apply(&mut ellipse.style, 1.0);
                vec![rect.into(), ellipse.into()]
            }
            RubberBandKind::Spider(points) => {
                let mut segments = CanvasSegments::new();
                for p in points {
                    segments.add_segment(current, *p);
                }
                self.style.apply(&mut segments.style, 1.0);
                vec![segments.into()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemBehaviour;
    use approx::assert_relative_eq;
    use oofcanvas_compose::ext::AabbExt;
    use oofcanvas_compose::Length;

    #[test]
    fn lifecycle() {
        let mut canvas = Canvas::new(1.0).unwrap();
        let layer = canvas.new_layer("rubberband");
        let mut band = RubberBand::new(RubberBandKind::Rectangle);
        assert!(!band.active());
        band.start(&mut canvas, layer, na::vector![1.0, 1.0]).unwrap();
        assert!(band.active());
        band.update(&mut canvas, na::vector![4.0, 3.0]).unwrap();
        let items = canvas.layer_items(layer);
        assert_eq!(items.len(), 1);
        let bounds = items[0].1.bare_bounds().unwrap();
        assert_relative_eq!(bounds.lower_left(), na::vector![1.0, 1.0]);
        assert_relative_eq!(bounds.upper_right(), na::vector![4.0, 3.0]);

        band.stop(&mut canvas).unwrap();
        assert!(!band.active());
        assert!(canvas.layer(layer).unwrap().empty());
        band.update(&mut canvas, na::vector![0.0, 0.0]).unwrap();
        assert!(canvas.layer(layer).unwrap().empty());
    }

    #[test]
    fn stop_removes_remaining_items() {
        let mut canvas = Canvas::new(1.0).unwrap();
        let layer = canvas.new_layer("rubberband");
        let mut band = RubberBand::new(RubberBandKind::Ellipse);
        band.start(&mut canvas, layer, na::vector![0.0, 0.0]).unwrap();
        let keys = canvas.layer(layer).unwrap().item_keys().to_vec();
        assert_eq!(keys.len(), 2);
        canvas.remove_item(keys[0]).unwrap();

        assert!(matches!(
            band.stop(&mut canvas),
            Err(CanvasError::ItemNotFound)
        ));
        assert!(!band.active());
        assert!(canvas.layer(layer).unwrap().empty());
        assert!(canvas.item(keys[1]).is_none());
    }

    #[test]
    fn circle_has_radius_at_half_width() {
        let mut canvas = Canvas::new(1.0).unwrap();
        let layer = canvas.new_layer("rubberband");
        let mut band = RubberBand::new(RubberBandKind::Circle).with_style(RubberBandStyle {
            line_width: 2.0,
            ..Default::default()
        });
        band.start(&mut canvas, layer, na::vector![0.0, 0.0]).unwrap();
        band.update(&mut canvas, na::vector![3.0, 4.0]).unwrap();
        let items = canvas.layer_items(layer);
        match (items[0].1, items[1].1) {
            (CanvasItem::Circle(circle), CanvasItem::Segment(seg)) => {
                assert_relative_eq!(circle.radius, 5.0);
                assert_eq!(circle.style.line.width, Length::Pixels(2.0));
                assert_eq!(seg.style.line.width, Length::Pixels(1.0));
            }
            _ => panic!("unexpected rubberband items"),
        }
    }

    #[test]
    fn spider_follows_pointer() {
        let mut canvas = Canvas::new(1.0).unwrap();
        let layer = canvas.new_layer("rubberband");
        let mut band = RubberBand::new(RubberBandKind::Spider(vec![
            na::vector![0.0, 0.0],
            na::vector![10.0, 0.0],
        ]));
        band.start(&mut canvas, layer, na::vector![5.0, 5.0]).unwrap();
        band.update(&mut canvas, na::vector![5.0, 8.0]).unwrap();
        let items = canvas.layer_items(layer);
        let CanvasItem::Segments(segments) = items[0].1 else {
            panic!("unexpected rubberband item");
        };
        assert_eq!(segments.len(), 2);
        assert!(segments
            .segments
            .iter()
            .all(|s| s.p0 == na::vector![5.0, 8.0]));
    }
}
