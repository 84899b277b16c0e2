// Imports
use crate::Color;
use anyhow::Context;
use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

/// A length that is either measured in user units or in device pixels.
///
/// Pixel lengths keep their on-screen size when the pixels-per-unit of the canvas change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename = "length")]
pub enum Length {
    /// In user units
    #[serde(rename = "user")]
    User(f64),
    /// In device pixels
    #[serde(rename = "pixels")]
    Pixels(f64),
}

impl Default for Length {
    fn default() -> Self {
        Self::User(0.0)
    }
}

impl Length {
    /// The length in user units at the given pixels-per-unit.
    pub fn in_user_units(&self, ppu: f64) -> f64 {
        match self {
            Length::User(l) => *l,
            Length::Pixels(l) => *l / ppu,
        }
    }

    /// The length in pixels at the given pixels-per-unit.
    pub fn in_pixels(&self, ppu: f64) -> f64 {
        match self {
            Length::User(l) => *l * ppu,
            Length::Pixels(l) => *l,
        }
    }

    /// The length in pixels if it is pixel-sized, else zero.
    ///
    /// Used for the pixel extents of items, which don't depend on the ppu.
    pub fn fixed_pixels(&self) -> f64 {
        match self {
            Length::User(_) => 0.0,
            Length::Pixels(l) => *l,
        }
    }
}

/// Line join at corners of a stroked path
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[cfg_attr(feature = "clap-derive", derive(clap::ValueEnum))]
#[serde(rename = "line_join")]
pub enum LineJoin {
    /// Sharp corners
    #[default]
    #[serde(rename = "miter")]
    Miter,
    /// Rounded corners
    #[serde(rename = "round")]
    Round,
    /// Cut off corners
    #[serde(rename = "bevel")]
    Bevel,
}

impl TryFrom<u32> for LineJoin {
    type Error = anyhow::Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        num_traits::FromPrimitive::from_u32(value)
            .with_context(|| format!("LineJoin try_from::<u32>() for value {value} failed"))
    }
}

impl From<LineJoin> for piet::LineJoin {
    fn from(value: LineJoin) -> Self {
        match value {
            LineJoin::Miter => piet::LineJoin::Miter {
                limit: piet::LineJoin::DEFAULT_MITER_LIMIT,
            },
            LineJoin::Round => piet::LineJoin::Round,
            LineJoin::Bevel => piet::LineJoin::Bevel,
        }
    }
}

/// Line cap present at the start and end of a line
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[cfg_attr(feature = "clap-derive", derive(clap::ValueEnum))]
#[serde(rename = "line_cap")]
pub enum LineCap {
    /// Ends exactly at the end point
    #[serde(rename = "butt")]
    Butt,
    /// A half disk past the end point
    #[default]
    #[serde(rename = "round")]
    Round,
    /// A half square past the end point
    #[serde(rename = "square")]
    Square,
}

impl TryFrom<u32> for LineCap {
    type Error = anyhow::Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        num_traits::FromPrimitive::from_u32(value)
            .with_context(|| format!("LineCap try_from::<u32>() for value {value} failed"))
    }
}

impl From<LineCap> for piet::LineCap {
    fn from(value: LineCap) -> Self {
        match value {
            LineCap::Butt => piet::LineCap::Butt,
            LineCap::Round => piet::LineCap::Round,
            LineCap::Square => piet::LineCap::Square,
        }
    }
}

/// A dash pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename = "dash")]
pub struct Dash {
    /// Alternating on and off lengths
    #[serde(rename = "pattern")]
    pub pattern: Vec<f64>,
    /// Offset into the pattern at the start of the path
    #[serde(rename = "offset")]
    pub offset: f64,
    /// Whether the pattern and offset are measured in pixels instead of user units
    #[serde(rename = "in_pixels")]
    pub in_pixels: bool,
    /// When set, the gaps between the dashes are filled with this color
    #[serde(rename = "color")]
    pub color: Option<Color>,
}

impl Default for Dash {
    fn default() -> Self {
        Self {
            pattern: vec![],
            offset: 0.0,
            in_pixels: false,
            color: None,
        }
    }
}

impl Dash {
    /// A dash pattern from alternating on and off lengths.
    ///
    /// Negative and non-finite lengths are clamped to zero, cairo rejects them.
    pub fn new(pattern: Vec<f64>, offset: f64) -> Self {
        Self {
            pattern: pattern.into_iter().map(clamp_dash_length).collect(),
            offset: if offset.is_finite() { offset } else { 0.0 },
            ..Default::default()
        }
    }

    /// Equal dashes and gaps of the given length
    pub fn single(length: f64) -> Self {
        Self::new(vec![length, length], 0.0)
    }

    /// The pattern scaled to user units
    pub fn user_pattern(&self, ppu: f64) -> Vec<f64> {
        let scale = if self.in_pixels { 1.0 / ppu } else { 1.0 };
        self.pattern
            .iter()
            .map(|l| clamp_dash_length(*l) * scale)
            .collect()
    }

    /// The offset scaled to user units
    pub fn user_offset(&self, ppu: f64) -> f64 {
        if self.in_pixels {
            self.offset / ppu
        } else {
            self.offset
        }
    }

    /// A pattern with only zero lengths draws nothing useful and is treated as solid.
    pub fn is_solid(&self) -> bool {
        self.pattern.iter().all(|l| clamp_dash_length(*l) <= 0.0)
    }
}

fn clamp_dash_length(length: f64) -> f64 {
    if length.is_finite() {
        length.max(0.0)
    } else {
        0.0
    }
}

/// The outline style of a shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename = "line_style")]
pub struct LineStyle {
    /// The line width
    #[serde(rename = "width")]
    pub width: Length,
    /// The line color
    #[serde(rename = "color")]
    pub color: Color,
    /// The line join
    #[serde(rename = "join")]
    pub join: LineJoin,
    /// The line cap
    #[serde(rename = "cap")]
    pub cap: LineCap,
    /// The dash pattern, solid when None
    #[serde(rename = "dash")]
    pub dash: Option<Dash>,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            width: Length::User(0.0),
            color: Color::BLACK,
            join: LineJoin::default(),
            cap: LineCap::default(),
            dash: None,
        }
    }
}

impl LineStyle {
    /// The line width in user units at the given ppu
    pub fn width_in_user_units(&self, ppu: f64) -> f64 {
        self.width.in_user_units(ppu)
    }

    /// Half the line width in pixels, if the width is in pixels. Else zero.
    pub fn half_width_pixels(&self) -> f64 {
        0.5 * self.width.fixed_pixels()
    }

    /// The dash pattern that will actually be applied, if any.
    pub fn active_dash(&self) -> Option<&Dash> {
        self.dash.as_ref().filter(|d| !d.is_solid())
    }

    /// The piet stroke style for a solid line.
    pub fn piet_solid_stroke_style(&self) -> piet::StrokeStyle {
        piet::StrokeStyle::new()
            .line_join(self.join.into())
            .line_cap(self.cap.into())
    }

    /// The piet stroke style with the dash pattern applied, if there is one.
    pub fn piet_stroke_style(&self, ppu: f64) -> piet::StrokeStyle {
        let mut style = self.piet_solid_stroke_style();
        if let Some(dash) = self.active_dash() {
            style.set_dash_pattern(dash.user_pattern(ppu));
            style.set_dash_offset(dash.user_offset(ppu));
        }
        style
    }
}
