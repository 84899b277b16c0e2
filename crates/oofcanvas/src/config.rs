// Imports
use oofcanvas_compose::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings of a canvas that are saved with a scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename = "canvas_config")]
pub struct CanvasConfig {
    /// Pixels per user unit.
    #[serde(rename = "ppu")]
    pub ppu: f64,
    /// Blank space around the drawing, as a fraction of its size.
    #[serde(rename = "margin")]
    pub margin: f64,
    #[serde(rename = "antialias")]
    pub antialias: bool,
    /// Always opaque.
    #[serde(rename = "background_color")]
    pub background_color: Color,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            ppu: 1.0,
            margin: 0.0,
            antialias: true,
            background_color: Color::WHITE,
        }
    }
}

/// Export format.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    num_derive::FromPrimitive,
    num_derive::ToPrimitive,
)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename = "export_format")]
pub enum ExportFormat {
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "pdf")]
    Pdf,
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self::Png
    }
}

impl TryFrom<u32> for ExportFormat {
    type Error = anyhow::Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        num_traits::FromPrimitive::from_u32(value)
            .ok_or_else(|| anyhow::anyhow!("ExportFormat try_from::<u32>() for value {value} failed"))
    }
}

impl ExportFormat {
    /// File extension for the format.
    pub fn file_ext(self) -> String {
        match self {
            ExportFormat::Png => String::from("png"),
            ExportFormat::Pdf => String::from("pdf"),
        }
    }

    /// Guesses the format from the extension of the path.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// Export preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename = "export_prefs")]
pub struct ExportPrefs {
    /// The size of the larger side of the exported drawing, in pixels.
    #[serde(rename = "max_pixels")]
    pub max_pixels: u32,
    /// Whether the background color is painted.
    #[serde(rename = "draw_background")]
    pub draw_background: bool,
    #[serde(rename = "format")]
    pub format: ExportFormat,
}

impl Default for ExportPrefs {
    fn default() -> Self {
        Self {
            max_pixels: 1000,
            draw_background: true,
            format: ExportFormat::default(),
        }
    }
}
