//! Mask painting core - strokes, overlay rendering and mask rasterization
//!
//! This crate provides the editor core, independent of any UI toolkit:
//! - [`types`] - points, strokes, dimensions and stroke transforms
//! - [`log`] - stroke log with undo, clear and event listeners
//! - [`coords`] - pointer position to buffer pixel mapping
//! - [`layout`] - sizing the drawing buffer to the displayed image box
//! - [`surface`] - CPU RGBA surface behind the [`DrawingSurface`] trait
//! - [`raster`] - shape coverage (dots and stroked polylines)
//! - [`renderer`] - full-repaint and live-segment overlay renderer
//! - [`mask`] - binary mask rasterization and encoding
//! - [`pipeline`] - one image's log, buffer and brush tied together

pub mod brush;
pub mod constants;
pub mod coords;
pub mod layout;
pub mod log;
pub mod mask;
pub mod pipeline;
pub mod raster;
pub mod renderer;
pub mod style;
pub mod surface;
pub mod types;
pub mod validation;

pub use brush::*;
pub use constants::*;
pub use coords::*;
pub use layout::*;
pub use log::*;
pub use mask::*;
pub use pipeline::*;
pub use raster::{Coverage, LineCap, LineJoin, PixelRegion, Shape};
pub use renderer::*;
pub use style::*;
pub use surface::*;
pub use types::*;
pub use validation::*;
