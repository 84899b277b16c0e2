// Imports
use oofcanvas_compose::{Color, Dash, Length, LineCap, LineJoin, LineStyle};
use serde::{Deserialize, Serialize};

/// Outline and fill of a shape item.
///
/// The outline is only drawn once it is enabled by setting a line width or color,
/// the fill once a fill color is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename = "shape_style")]
pub struct ShapeStyle {
    #[serde(rename = "line")]
    pub line: LineStyle,
    #[serde(rename = "lined")]
    pub lined: bool,
    #[serde(rename = "fill")]
    pub fill: Option<Color>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            line: LineStyle::default(),
            lined: false,
            fill: None,
        }
    }
}

impl ShapeStyle {
    pub fn set_line_width(&mut self, width: f64) {
        self.line.width = Length::User(width);
        self.lined = true;
    }

    pub fn set_line_width_in_pixels(&mut self, width: f64) {
        self.line.width = Length::Pixels(width);
        self.lined = true;
    }

    pub fn set_line_color(&mut self, color: Color) {
        self.line.color = color;
        self.lined = true;
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.line.join = join;
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.line.cap = cap;
    }

    /// Dash lengths and offset in user units.
    pub fn set_dash(&mut self, pattern: Vec<f64>, offset: f64) {
        let color = self.line.dash.as_ref().and_then(|d| d.color);
        self.line.dash = Some(Dash {
            color,
            ..Dash::new(pattern, offset)
        });
    }

    /// Equal dashes and gaps, in user units.
    pub fn set_dash_single(&mut self, length: f64) {
        self.set_dash(vec![length, length], 0.0);
    }

    /// Dash lengths and offset in pixels.
    pub fn set_dash_pattern_in_pixels(&mut self, pattern: Vec<f64>, offset: f64) {
        self.set_dash(pattern, offset);
        if let Some(dash) = self.line.dash.as_mut() {
            dash.in_pixels = true;
        }
    }

    /// Equal dashes and gaps, in pixels.
    pub fn set_dash_in_pixels(&mut self, length: f64) {
        self.set_dash_pattern_in_pixels(vec![length, length], 0.0);
    }

    /// Fills the gaps between dashes with the color.
    ///
    /// Has no visible effect until a dash pattern is set.
    pub fn set_dash_color(&mut self, color: Color) {
        match self.line.dash.as_mut() {
            Some(dash) => dash.color = Some(color),
            None => {
                self.line.dash = Some(Dash {
                    color: Some(color),
                    ..Default::default()
                })
            }
        }
    }

    pub fn unset_dashes(&mut self) {
        self.line.dash = None;
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.fill = Some(color);
    }

    pub fn filled(&self) -> bool {
        self.fill.is_some()
    }

    pub fn lined(&self) -> bool {
        self.lined
    }

    /// The line width in user units, zero if the outline is disabled.
    pub fn line_width_in_user_units(&self, ppu: f64) -> f64 {
        if self.lined {
            self.line.width_in_user_units(ppu)
        } else {
            0.0
        }
    }

    /// Half the line width in user units, if the line width is in user units.
    pub fn half_user_width(&self) -> f64 {
        match self.line.width {
            Length::User(w) if self.lined => 0.5 * w,
            _ => 0.0,
        }
    }

    /// Half the line width in pixels, if the line width is in pixels.
    pub fn half_pixel_width(&self) -> f64 {
        if self.lined {
            self.line.half_width_pixels()
        } else {
            0.0
        }
    }

    pub(crate) fn draw_fill(&self, cx: &mut impl piet::RenderContext, shape: &impl kurbo::Shape) {
        if let Some(fill) = self.fill {
            cx.fill(shape, &piet::Color::from(fill));
        }
    }

    /// Strokes the shape in the line color.
    ///
    /// With a dash color the gaps are painted by a solid stroke underneath the dashes.
    pub(crate) fn draw_stroke(
        &self,
        cx: &mut impl piet::RenderContext,
        shape: &impl kurbo::Shape,
        ppu: f64,
    ) {
        if !self.lined {
            return;
        }
        let width = self.line.width_in_user_units(ppu);
        if width <= 0.0 {
            return;
        }
        let line_color = piet::Color::from(self.line.color);

        match self.line.active_dash() {
            None => {
                cx.stroke_styled(
                    shape,
                    &line_color,
                    width,
                    &self.line.piet_solid_stroke_style(),
                );
            }
            Some(dash) => {
                if let Some(dash_color) = dash.color {
                    cx.stroke_styled(
                        shape,
                        &piet::Color::from(dash_color),
                        width,
                        &self.line.piet_solid_stroke_style(),
                    );
                }
                cx.stroke_styled(
                    shape,
                    &line_color,
                    width,
                    &self.line.piet_stroke_style(ppu),
                );
            }
        }
    }

    pub(crate) fn draw_fill_and_stroke(
        &self,
        cx: &mut impl piet::RenderContext,
        shape: &impl kurbo::Shape,
        ppu: f64,
    ) {
        self.draw_fill(cx, shape);
        self.draw_stroke(cx, shape, ppu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn line_flags() {
        let mut style = ShapeStyle::default();
        assert!(!style.lined());
        assert!(!style.filled());
        style.set_line_color(Color::RED);
        assert!(style.lined());
        style.set_fill_color(Color::BLUE);
        assert!(style.filled());
    }

    #[test]
    fn widths() {
        let mut style = ShapeStyle::default();
        assert_relative_eq!(style.line_width_in_user_units(10.0), 0.0);
        style.set_line_width_in_pixels(4.0);
        assert_relative_eq!(style.line_width_in_user_units(10.0), 0.4);
        assert_relative_eq!(style.half_pixel_width(), 2.0);
        assert_relative_eq!(style.half_user_width(), 0.0);
        style.set_line_width(1.0);
        assert_relative_eq!(style.half_user_width(), 0.5);
        assert_relative_eq!(style.half_pixel_width(), 0.0);
    }

    #[test]
    fn dash_color_survives_new_pattern() {
        let mut style = ShapeStyle::default();
        style.set_dash_color(Color::WHITE);
        style.set_dash_in_pixels(5.0);
        let dash = style.line.dash.clone().unwrap();
        assert_eq!(dash.color, Some(Color::WHITE));
        assert!(dash.in_pixels);
        style.unset_dashes();
        assert!(style.line.dash.is_none());
    }

    #[test]
    fn negative_dashes_draw_solid() {
        let mut style = ShapeStyle::default();
        style.set_dash_in_pixels(-5.0);
        assert_eq!(style.line.dash.as_ref().unwrap().pattern, vec![0.0, 0.0]);
        assert!(style.line.active_dash().is_none());
        style.set_dash(vec![2.0, -1.0], 0.0);
        assert_eq!(
            style.line.active_dash().unwrap().user_pattern(1.0),
            vec![2.0, 0.0]
        );
    }
}
