//! Map projection helpers for tile-based rendering.
//!
//! Only Spherical Mercator is needed: every background and overlay tile is
//! addressed in the XYZ Web Mercator grid.

pub mod mercator;

pub use mercator::{SphericalMercator, TileRange};
