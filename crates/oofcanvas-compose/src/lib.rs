#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![allow(clippy::single_match)]

//! the oofcanvas-compose crate provides the canvas with geometric primitives, colors and line styles
//! that the canvas items are built from.

// Modules
/// colors
pub mod color;
/// module for extension traits for foreign types
pub mod ext;
/// straight line segments
pub mod segment;
/// module for line and fill styles
pub mod style;
/// other misc utilities
pub mod utils;

// Re-exports
pub use color::Color;
pub use segment::Segment;
pub use style::{Dash, Length, LineCap, LineJoin, LineStyle};

// Renames
extern crate nalgebra as na;
extern crate parry2d_f64 as p2d;

/// A point or vector in user space.
pub type Coord = na::Vector2<f64>;
