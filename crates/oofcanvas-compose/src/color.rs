// Imports
use serde::{Deserialize, Serialize};

/// A rgba color
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(default, rename = "color")]
pub struct Color {
    /// Red, ranging [0.0, 1.0].
    #[serde(rename = "r")]
    pub r: f64,
    /// Green, ranging [0.0, 1.0].
    #[serde(rename = "g")]
    pub g: f64,
    /// Blue, ranging [0.0, 1.0].
    #[serde(rename = "b")]
    pub b: f64,
    /// Alpha, ranging [0.0, 1.0].
    #[serde(rename = "a")]
    pub a: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    /// Transparent color with r,g,b set to 0.0.
    pub const TRANSPARENT: Self = Self::rgba_const(0.0, 0.0, 0.0, 0.0);
    /// Black color.
    pub const BLACK: Self = Self::rgba_const(0.0, 0.0, 0.0, 1.0);
    /// Medium gray color.
    pub const GRAY: Self = Self::rgba_const(0.5, 0.5, 0.5, 1.0);
    /// White color.
    pub const WHITE: Self = Self::rgba_const(1.0, 1.0, 1.0, 1.0);
    /// Red color.
    pub const RED: Self = Self::rgba_const(1.0, 0.0, 0.0, 1.0);
    /// Green color.
    pub const GREEN: Self = Self::rgba_const(0.0, 1.0, 0.0, 1.0);
    /// Blue color.
    pub const BLUE: Self = Self::rgba_const(0.0, 0.0, 1.0, 1.0);
    /// Yellow color.
    pub const YELLOW: Self = Self::rgba_const(1.0, 1.0, 0.0, 1.0);
    /// Cyan color.
    pub const CYAN: Self = Self::rgba_const(0.0, 1.0, 1.0, 1.0);
    /// Magenta color.
    pub const MAGENTA: Self = Self::rgba_const(1.0, 0.0, 1.0, 1.0);

    const fn rgba_const(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// A new color from rgba values.
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// A new opaque color from rgb values.
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// The same color with a different alpha value.
    pub fn opacity(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// The same color, fully opaque.
    pub fn opaque(self) -> Self {
        self.opacity(1.0)
    }

    /// Approximate equality.
    pub fn approx_eq(self, other: Self) -> bool {
        approx::relative_eq!(self.r, other.r)
            && approx::relative_eq!(self.g, other.g)
            && approx::relative_eq!(self.b, other.b)
            && approx::relative_eq!(self.a, other.a)
    }

    /// The color as 8 bit rgba components, not premultiplied.
    pub fn to_rgba8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            (self.a * 255.0).round() as u8,
        ]
    }

    /// A color from 8 bit rgba components, not premultiplied.
    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self {
            r: f64::from(rgba[0]) / 255.0,
            g: f64::from(rgba[1]) / 255.0,
            b: f64::from(rgba[2]) / 255.0,
            a: f64::from(rgba[3]) / 255.0,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Color({:.3}, {:.3}, {:.3}, {:.3})",
            self.r, self.g, self.b, self.a
        )
    }
}

impl From<piet::Color> for Color {
    fn from(piet_color: piet::Color) -> Self {
        let piet_rgba = piet_color.as_rgba();
        Self {
            r: piet_rgba.0,
            g: piet_rgba.1,
            b: piet_rgba.2,
            a: piet_rgba.3,
        }
    }
}

impl From<Color> for piet::Color {
    fn from(color: Color) -> Self {
        piet::Color::rgba(color.r, color.g, color.b, color.a)
    }
}

impl From<(f64, f64, f64, f64)> for Color {
    fn from(tuple: (f64, f64, f64, f64)) -> Self {
        Self::new(tuple.0, tuple.1, tuple.2, tuple.3)
    }
}

impl From<Color> for (f64, f64, f64, f64) {
    fn from(color: Color) -> Self {
        (color.r, color.g, color.b, color.a)
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self {
            r: f64::from((value >> 24) & 0xff) / 255.0,
            g: f64::from((value >> 16) & 0xff) / 255.0,
            b: f64::from((value >> 8) & 0xff) / 255.0,
            a: f64::from((value) & 0xff) / 255.0,
        }
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        ((((color.r * 255.0).round() as u32) & 0xff) << 24)
            | ((((color.g * 255.0).round() as u32) & 0xff) << 16)
            | ((((color.b * 255.0).round() as u32) & 0xff) << 8)
            | (((color.a * 255.0).round() as u32) & 0xff)
    }
}
