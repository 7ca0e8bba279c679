//! Common types shared by the thumbnail planner, renderer and pipeline.

pub mod bbox;
pub mod error;
pub mod geometry;
pub mod tile;

pub use bbox::BoundingBox;
pub use error::{InputError, SourceError, ThumbnailError, ThumbnailResult};
pub use geometry::Geometry;
pub use tile::{TileCoord, ZoomRange};
