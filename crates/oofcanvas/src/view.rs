// Imports
use crate::camera::Camera;
use crate::{Canvas, CanvasError, LayerKey, RubberBand};
use oofcanvas_compose::ext::{AabbExt, Vector2Ext};
use oofcanvas_compose::Coord;
use p2d::bounding_volume::Aabb;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// When pointer motion is reported to the callback.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    num_derive::FromPrimitive,
    num_derive::ToPrimitive,
)]
#[serde(rename = "motion_allowed")]
pub enum MotionAllowed {
    #[serde(rename = "never")]
    Never = 0,
    #[serde(rename = "mouse_down")]
    MouseDown,
    #[serde(rename = "always")]
    Always,
}

impl Default for MotionAllowed {
    fn default() -> Self {
        Self::Never
    }
}

impl TryFrom<u32> for MotionAllowed {
    type Error = anyhow::Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        num_traits::FromPrimitive::from_u32(value).ok_or_else(|| {
            anyhow::anyhow!("MotionAllowed try_from::<u32>() for value {} failed", value)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Up,
    Move,
    Scroll,
}

impl PointerEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
            Self::Move => "move",
            Self::Scroll => "scroll",
        }
    }
}

impl std::fmt::Display for PointerEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pointer event as reported to the view callback, with the position in user coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: Coord,
    /// The button that is or was last held down
    pub button: u32,
    pub shift: bool,
    pub ctrl: bool,
    /// The scroll amount, zero for other events
    pub delta: Coord,
}

/// What the pointer callback asks of the view after it handled an event.
///
/// A rubberband installed while handling [PointerEventKind::Down] starts at the pressed point.
#[derive(Debug, Default)]
pub enum PointerResponse {
    #[default]
    None,
    SetRubberband(RubberBand),
    RemoveRubberband,
}

type PointerCallback = Box<dyn FnMut(&PointerEvent) -> PointerResponse>;
/// Receives the new widget size in pixels.
type ResizeCallback = Box<dyn FnMut(Coord)>;

/// A canvas shown in a scrollable widget area.
///
/// Receives the pointer events of the widget in widget pixels, reports them in user coordinates
/// and drives an optional rubberband.
pub struct View {
    canvas: Canvas,
    /// The size of the visible widget area, in pixels
    widget_size: Coord,
    /// The offset of the visible area into the scrollable area, in pixels
    scroll: Coord,
    /// The transform from user coordinates to pixels of the scrollable area
    transform: kurbo::Affine,
    motion_allowed: MotionAllowed,
    button_down: bool,
    last_button: u32,
    last_position: Coord,
    callback: Option<PointerCallback>,
    resize_callback: Option<ResizeCallback>,
    rubberband: Option<RubberBand>,
    /// Holds the rubberband items, drawn above all other layers
    rubberband_layer: LayerKey,
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("canvas", &self.canvas)
            .field("widget_size", &self.widget_size)
            .field("scroll", &self.scroll)
            .field("transform", &self.transform)
            .field("motion_allowed", &self.motion_allowed)
            .field("button_down", &self.button_down)
            .field("last_button", &self.last_button)
            .field("last_position", &self.last_position)
            .field("callback", &"- no debug impl -")
            .field("resize_callback", &"- no debug impl -")
            .field("rubberband", &self.rubberband)
            .field("rubberband_layer", &self.rubberband_layer)
            .finish()
    }
}

impl View {
    /// A view of the canvas in a widget area of the given size in pixels.
    pub fn new(mut canvas: Canvas, width: f64, height: f64) -> Result<Self, CanvasError> {
        let rubberband_layer = canvas.new_detached_layer("rubberband");
        let mut view = Self {
            canvas,
            widget_size: na::vector![width.max(1.0), height.max(1.0)],
            scroll: Coord::zeros(),
            transform: kurbo::Affine::IDENTITY,
            motion_allowed: MotionAllowed::default(),
            button_down: false,
            last_button: 0,
            last_position: Coord::zeros(),
            callback: None,
            resize_callback: None,
            rubberband: None,
            rubberband_layer,
        };
        view.refresh()?;
        Ok(view)
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Mutable access to the canvas. [Self::refresh] must be called after items were changed.
    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn into_canvas(self) -> Canvas {
        self.canvas
    }

    pub fn widget_size(&self) -> Coord {
        self.widget_size
    }

    /// Resizes the widget area. The resize callback is called when the size changed.
    pub fn set_widget_size(&mut self, width: f64, height: f64) -> Result<(), CanvasError> {
        let size = na::vector![width.max(1.0), height.max(1.0)];
        let changed = size != self.widget_size;
        self.widget_size = size;
        self.refresh()?;
        if changed {
            if let Some(callback) = self.resize_callback.as_mut() {
                callback(size);
            }
        }
        Ok(())
    }

    pub fn scroll_offset(&self) -> Coord {
        self.scroll
    }

    /// Scrolls the visible area, clamped to the scrollable area.
    pub fn set_scroll_offset(&mut self, offset: Coord) {
        let max = (self.layout_size() - self.widget_size).maxs(&Coord::zeros());
        self.scroll = offset.maxs(&Coord::zeros()).mins(&max);
    }

    /// The size of the scrollable area: the bitmap size of the drawing, but at least the widget size.
    pub fn layout_size(&self) -> Coord {
        self.canvas.bitmap_size().maxs(&self.widget_size)
    }

    /// Recomputes the transforms after the items or the ppu changed.
    ///
    /// A drawing smaller than the widget is centered in it.
    pub fn refresh(&mut self) -> Result<(), CanvasError> {
        self.canvas.update_transform()?;
        let ppu = self.canvas.ppu();
        self.transform = Camera::find_transform(ppu, self.canvas.bounds(ppu), self.layout_size());
        self.set_scroll_offset(self.scroll);
        Ok(())
    }

    pub fn ppu(&self) -> f64 {
        self.canvas.ppu()
    }

    pub fn set_ppu(&mut self, ppu: f64) -> Result<(), CanvasError> {
        self.canvas.set_ppu(ppu)?;
        self.refresh()
    }

    /// Converts a point in widget pixels to user coordinates.
    pub fn pixel_to_user(&self, pt: Coord) -> Coord {
        Coord::from_kurbo_point(self.transform.inverse() * (pt + self.scroll).to_kurbo_point())
    }

    /// Converts a point in user coordinates to widget pixels.
    pub fn user_to_pixel(&self, pt: Coord) -> Coord {
        Coord::from_kurbo_point(self.transform * pt.to_kurbo_point()) - self.scroll
    }

    // Zooming

    /// Zooms so that the drawing with its margin fills the widget, and centers it.
    ///
    /// Does nothing while no item is visible.
    pub fn zoom_to_fill(&mut self) -> Result<(), CanvasError> {
        if self.canvas.empty() || self.canvas.n_visible_items() == 0 {
            return Ok(());
        }
        let available = self.widget_size / (1.0 + self.canvas.margin());
        let mut ppu = self.canvas.filled_ppu(available[0], available[1]);
        if !ppu.is_finite() || ppu <= 0.0 {
            ppu = 1.0;
        }
        self.set_ppu(ppu)?;
        self.center();
        Ok(())
    }

    /// Scrolls to the center of the scrollable area.
    pub fn center(&mut self) {
        self.set_scroll_offset(0.5 * (self.layout_size() - self.widget_size));
    }

    /// Multiplies the ppu by the factor, keeping the user point at the same position in the widget.
    pub fn zoom_about(&mut self, pt: Coord, factor: f64) -> Result<(), CanvasError> {
        let widget_pos = self.user_to_pixel(pt);
        self.set_ppu(self.ppu() * factor)?;
        let layout_pos = Coord::from_kurbo_point(self.transform * pt.to_kurbo_point());
        self.set_scroll_offset(layout_pos - widget_pos);
        debug!(
            "zoomed about {pt:?} by {factor}, ppu is now {}",
            self.ppu()
        );
        Ok(())
    }

    /// Zooms about the center of the widget.
    pub fn zoom(&mut self, factor: f64) -> Result<(), CanvasError> {
        let center = self.pixel_to_user(0.5 * self.widget_size);
        self.zoom_about(center, factor)
    }

    /// The region of the drawing that is currently shown, in user coordinates.
    pub fn visible_region(&self) -> Aabb {
        Aabb::new_positive(
            self.pixel_to_user(Coord::zeros()),
            self.pixel_to_user(self.widget_size),
        )
    }

    // Pointer events

    pub fn motion_allowed(&self) -> MotionAllowed {
        self.motion_allowed
    }

    pub fn allow_motion(&mut self, motion_allowed: MotionAllowed) {
        self.motion_allowed = motion_allowed;
    }

    /// Sets the callback that receives the pointer events.
    ///
    /// Its response is applied right after the event, so a callback can install the rubberband
    /// for the drag that a button press begins.
    pub fn set_callback(
        &mut self,
        callback: impl FnMut(&PointerEvent) -> PointerResponse + 'static,
    ) {
        self.callback = Some(Box::new(callback));
    }

    pub fn remove_callback(&mut self) {
        self.callback = None;
    }

    /// Sets the callback that is called when the widget size changes, e.g. to zoom to fill again.
    pub fn set_resize_callback(&mut self, callback: impl FnMut(Coord) + 'static) {
        self.resize_callback = Some(Box::new(callback));
    }

    pub fn remove_resize_callback(&mut self) {
        self.resize_callback = None;
    }

    pub fn rubberband(&self) -> Option<&RubberBand> {
        self.rubberband.as_ref()
    }

    /// Replaces the rubberband. An active one is stopped first.
    pub fn set_rubberband(&mut self, rubberband: Option<RubberBand>) -> Result<(), CanvasError> {
        if let Some(mut old) = self.rubberband.take() {
            old.stop(&mut self.canvas)?;
        }
        self.rubberband = rubberband;
        Ok(())
    }

    pub fn remove_rubberband(&mut self) -> Result<(), CanvasError> {
        self.set_rubberband(None)
    }

    pub fn button_down(&self) -> bool {
        self.button_down
    }

    fn report(
        &mut self,
        kind: PointerEventKind,
        shift: bool,
        ctrl: bool,
        delta: Coord,
    ) -> Result<(), CanvasError> {
        let event = PointerEvent {
            kind,
            position: self.last_position,
            button: self.last_button,
            shift,
            ctrl,
            delta,
        };
        let Some(callback) = self.callback.as_mut() else {
            return Ok(());
        };
        let response = callback(&event);
        match response {
            PointerResponse::None => Ok(()),
            PointerResponse::SetRubberband(rubberband) => self.set_rubberband(Some(rubberband)),
            PointerResponse::RemoveRubberband => self.remove_rubberband(),
        }
    }

    /// A button was pressed at the widget position. Ignored while the canvas is empty.
    pub fn button_press(
        &mut self,
        pos: Coord,
        button: u32,
        shift: bool,
        ctrl: bool,
    ) -> Result<(), CanvasError> {
        if self.canvas.empty() {
            return Ok(());
        }
        self.button_down = true;
        self.last_button = button;
        self.last_position = self.pixel_to_user(pos);
        self.report(PointerEventKind::Down, shift, ctrl, Coord::zeros())?;

        let pt = self.last_position;
        if let Some(rubberband) = self.rubberband.as_mut() {
            if !rubberband.active() {
                rubberband.start(&mut self.canvas, self.rubberband_layer, pt)?;
            }
            rubberband.update(&mut self.canvas, pt)?;
        }
        Ok(())
    }

    /// The button was released at the widget position. Ignored while the canvas is empty.
    pub fn button_release(
        &mut self,
        pos: Coord,
        button: u32,
        shift: bool,
        ctrl: bool,
    ) -> Result<(), CanvasError> {
        if self.canvas.empty() {
            return Ok(());
        }
        self.button_down = false;
        self.last_button = button;
        self.last_position = self.pixel_to_user(pos);
        if let Some(rubberband) = self.rubberband.as_mut() {
            if rubberband.active() {
                rubberband.stop(&mut self.canvas)?;
            }
        }
        self.report(PointerEventKind::Up, shift, ctrl, Coord::zeros())
    }

    /// The pointer moved to the widget position.
    ///
    /// Ignored unless allowed by [MotionAllowed]. An active rubberband follows the pointer first.
    pub fn motion(&mut self, pos: Coord, shift: bool, ctrl: bool) -> Result<(), CanvasError> {
        let allowed = match self.motion_allowed {
            MotionAllowed::Never => false,
            MotionAllowed::MouseDown => self.button_down,
            MotionAllowed::Always => true,
        };
        if !allowed {
            return Ok(());
        }
        self.last_position = self.pixel_to_user(pos);
        let pt = self.last_position;
        if let Some(rubberband) = self.rubberband.as_mut() {
            if rubberband.active() {
                rubberband.update(&mut self.canvas, pt)?;
            }
        }
        self.report(PointerEventKind::Move, shift, ctrl, Coord::zeros())
    }

    /// The scroll wheel moved, reported at the last known pointer position.
    pub fn scroll(&mut self, dx: f64, dy: f64, shift: bool, ctrl: bool) -> Result<(), CanvasError> {
        self.report(PointerEventKind::Scroll, shift, ctrl, na::vector![dx, dy])
    }

    // Rendering

    /// Renders the visible part of the drawing at the widget size, with the rubberband on top.
    pub fn render_to_surface(&mut self) -> Result<cairo::ImageSurface, CanvasError> {
        let surface = cairo::ImageSurface::create(
            cairo::Format::ARgb32,
            self.widget_size[0].ceil() as i32,
            self.widget_size[1].ceil() as i32,
        )?;
        {
            let cx = cairo::Context::new(&surface)?;
            cx.translate(-self.scroll[0], -self.scroll[1]);
            let layers = self
                .canvas
                .layer_keys()
                .iter()
                .copied()
                .chain(std::iter::once(self.rubberband_layer))
                .collect::<Vec<LayerKey>>();
            self.canvas.draw_layers_to_cairo(
                &cx,
                layers,
                self.transform,
                self.canvas.ppu(),
                true,
            )?;
        }
        self.canvas.mark_clean();
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{CanvasRectangle, ItemBehaviour};
    use crate::rubberband::RubberBandKind;
    use crate::utils::image_surface_to_rgba;
    use approx::assert_relative_eq;
    use oofcanvas_compose::Color;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn view_with_square() -> View {
        let mut canvas = Canvas::new(1.0).unwrap();
        let layer = canvas.new_layer("shapes");
        let mut rect = CanvasRectangle::new(na::vector![0.0, 0.0], na::vector![10.0, 10.0]);
        rect.style.set_fill_color(Color::BLUE);
        canvas.add_item(layer, rect).unwrap();
        View::new(canvas, 100.0, 100.0).unwrap()
    }

    #[test]
    fn small_drawing_is_centered() {
        let view = view_with_square();
        assert_relative_eq!(
            view.user_to_pixel(na::vector![5.0, 5.0]),
            na::vector![50.0, 50.0]
        );
        assert_relative_eq!(
            view.pixel_to_user(na::vector![45.0, 55.0]),
            na::vector![0.0, 0.0]
        );
    }

    #[test]
    fn zoom_to_fill_and_zoom_about() {
        let mut view = view_with_square();
        view.zoom_to_fill().unwrap();
        assert_relative_eq!(view.ppu(), 10.0);
        let region = view.visible_region();
        assert_relative_eq!(region.lower_left(), na::vector![0.0, 0.0], epsilon = 1e-9);
        assert_relative_eq!(region.upper_right(), na::vector![10.0, 10.0], epsilon = 1e-9);

        let fixed = na::vector![5.0, 5.0];
        let before = view.user_to_pixel(fixed);
        view.zoom_about(fixed, 4.0).unwrap();
        assert_relative_eq!(view.ppu(), 40.0);
        assert_relative_eq!(view.user_to_pixel(fixed), before, epsilon = 1e-9);
        assert_relative_eq!(view.layout_size(), na::vector![400.0, 400.0]);

        view.zoom(0.5).unwrap();
        assert_relative_eq!(view.ppu(), 20.0);
    }

    #[test]
    fn events_reach_callback() {
        let mut view = view_with_square();
        let events = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&events);
        view.set_callback(move |e| {
            recorded.borrow_mut().push(*e);
            PointerResponse::None
        });

        view.motion(na::vector![50.0, 50.0], false, false).unwrap();
        view.button_press(na::vector![50.0, 50.0], 1, true, false)
            .unwrap();
        view.motion(na::vector![60.0, 50.0], false, false).unwrap();
        view.allow_motion(MotionAllowed::MouseDown);
        view.motion(na::vector![60.0, 40.0], false, false).unwrap();
        view.button_release(na::vector![60.0, 40.0], 1, false, false)
            .unwrap();
        view.motion(na::vector![70.0, 40.0], false, false).unwrap();
        view.scroll(0.0, 1.0, false, true).unwrap();

        let events = events.borrow();
        let kinds = events.iter().map(|e| e.kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                PointerEventKind::Down,
                PointerEventKind::Move,
                PointerEventKind::Up,
                PointerEventKind::Scroll
            ]
        );
        assert_relative_eq!(events[0].position, na::vector![5.0, 5.0]);
        assert!(events[0].shift);
        assert_eq!(events[1].button, 1);
        assert_relative_eq!(events[1].position, na::vector![15.0, 15.0]);
        assert_relative_eq!(events[3].delta, na::vector![0.0, 1.0]);
        assert!(events[3].ctrl);
    }

    #[test]
    fn empty_canvas_ignores_buttons() {
        let mut view = View::new(Canvas::new(1.0).unwrap(), 50.0, 50.0).unwrap();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        view.set_callback(move |_| {
            *counter.borrow_mut() += 1;
            PointerResponse::None
        });
        view.button_press(na::vector![10.0, 10.0], 1, false, false)
            .unwrap();
        assert!(!view.button_down());
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn rubberband_is_drawn_and_removed() {
        let mut view = view_with_square();
        view.set_rubberband(Some(RubberBand::new(RubberBandKind::Line)))
            .unwrap();
        view.button_press(na::vector![10.0, 10.0], 1, false, false)
            .unwrap();
        assert!(view.rubberband().is_some_and(|r| r.active()));
        view.motion(na::vector![20.0, 10.0], false, false).unwrap();
        assert_eq!(view.canvas().layer(view.rubberband_layer).unwrap().size(), 1);
        // the rubberband is not part of the drawing
        assert_eq!(view.canvas().n_layers(), 1);
        assert_eq!(view.canvas().all_items().len(), 1);

        view.button_release(na::vector![20.0, 10.0], 1, false, false)
            .unwrap();
        assert!(view.canvas().layer(view.rubberband_layer).unwrap().empty());
    }

    #[test]
    fn button_press_callback_installs_rubberband() {
        let mut view = view_with_square();
        view.allow_motion(MotionAllowed::MouseDown);
        view.set_callback(|e| match e.kind {
            PointerEventKind::Down if e.shift => {
                PointerResponse::SetRubberband(RubberBand::new(RubberBandKind::Rectangle))
            }
            PointerEventKind::Up => PointerResponse::RemoveRubberband,
            _ => PointerResponse::None,
        });

        view.button_press(na::vector![45.0, 55.0], 1, false, false)
            .unwrap();
        assert!(view.rubberband().is_none());
        view.button_release(na::vector![45.0, 55.0], 1, false, false)
            .unwrap();

        view.button_press(na::vector![45.0, 55.0], 1, true, false)
            .unwrap();
        let band = view.rubberband().unwrap();
        assert!(band.active());
        assert_relative_eq!(band.start_point(), na::vector![0.0, 0.0]);
        view.motion(na::vector![55.0, 45.0], false, false).unwrap();
        let items = view.canvas().layer_items(view.rubberband_layer);
        assert_eq!(items.len(), 1);
        let bounds = items[0].1.bare_bounds().unwrap();
        assert_relative_eq!(bounds.upper_right(), na::vector![10.0, 10.0]);

        view.button_release(na::vector![55.0, 45.0], 1, false, false)
            .unwrap();
        assert!(view.rubberband().is_none());
        assert!(view.canvas().layer(view.rubberband_layer).unwrap().empty());
    }

    #[test]
    fn resize_callback() {
        let mut view = view_with_square();
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&sizes);
        view.set_resize_callback(move |size| recorded.borrow_mut().push(size));

        view.set_widget_size(200.0, 50.0).unwrap();
        view.set_widget_size(200.0, 50.0).unwrap();
        assert_eq!(*sizes.borrow(), vec![na::vector![200.0, 50.0]]);
        assert_relative_eq!(view.layout_size(), na::vector![200.0, 50.0]);

        view.remove_resize_callback();
        view.set_widget_size(100.0, 100.0).unwrap();
        assert_eq!(sizes.borrow().len(), 1);
    }

    #[test]
    fn render_widget_area() {
        let mut view = view_with_square();
        view.zoom_to_fill().unwrap();
        let mut surface = view.render_to_surface().unwrap();
        assert!(!view.canvas().is_dirty());
        let img = image_surface_to_rgba(&mut surface).unwrap();
        assert_eq!((img.width(), img.height()), (100, 100));
        assert_eq!(img.get_pixel(50, 50).0, [0, 0, 255, 255]);
    }
}
