//! Raster side of thumbnail rendering.
//!
//! - [`overlay`]: draws a geometry into Web Mercator tiles
//! - [`blend`]: composites an overlay tile onto a background tile
//! - [`mosaic`]: lays out and paints the tiles covering a bounding box
//! - [`png`] / [`format`]: image encoding

pub mod blend;
pub mod error;
pub mod format;
pub mod mosaic;
pub mod overlay;
pub mod png;
pub mod style;

pub use blend::blend_tiles;
pub use error::RenderError;
pub use format::ImageFormat;
pub use mosaic::{Mosaic, MosaicLayout, TilePlacement, MAX_CANVAS_PIXELS};
pub use overlay::{MapOptions, OverlayRenderer};
pub use style::Stylesheet;
