#![warn(missing_debug_implementations)]
#![allow(clippy::field_reassign_with_default)]
#![allow(clippy::single_match)]
#![allow(clippy::derivable_impls)]

//! The oofcanvas crate is the canvas engine. It holds the layers and their items, does the hit-testing,
//! renders to cairo surfaces and exports to png and pdf.
//!
//! The main entry points are the off-screen [Canvas] and the interactive [View] that wraps it.

// Modules
pub mod camera;
pub mod canvas;
pub mod config;
pub mod drawable;
pub mod error;
pub mod export;
pub mod fill;
pub mod items;
pub(crate) mod keytree;
pub mod layer;
pub mod render;
pub mod rubberband;
pub mod scene;
pub mod utils;
pub mod view;

// Re-exports
pub use canvas::{Canvas, ItemKey, LayerKey};
pub use config::{CanvasConfig, ExportFormat, ExportPrefs};
pub use drawable::Drawable;
pub use error::CanvasError;
pub use items::{CanvasItem, ItemBehaviour};
pub use layer::Layer;
pub use rubberband::{RubberBand, RubberBandKind, RubberBandStyle};
pub use scene::{Scene, SceneItem, SceneLayer};
pub use view::{MotionAllowed, PointerEvent, PointerEventKind, PointerResponse, View};

// Renames
extern crate nalgebra as na;
extern crate parry2d_f64 as p2d;
