//! Shared test utilities for the thumbnail workspace.
//!
//! GeoJSON fixtures with known extents live in [`fixtures`], synthetic PNG
//! tiles and a decoder for rendered output in [`generators`], and the
//! float assertions used by the projection and planner tests are below.

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use generators::*;

/// Assert that two numbers are within `epsilon` of each other.
///
/// Both sides are widened to `f64`, so degrees, pixel offsets and `f32`
/// style values can be compared directly:
///
/// ```ignore
/// assert_approx_eq!(plan.bbox.min_x, -0.5, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        let diff = (left - right).abs();
        if diff.is_nan() || diff > epsilon {
            panic!(
                "assertion failed: {} ≈ {}\n  left: {:?}\n right: {:?}\n  diff {:?} exceeds {:?}",
                stringify!($left),
                stringify!($right),
                left,
                right,
                diff,
                epsilon
            );
        }
    }};
}

/// [`assert_approx_eq!`] on both halves of a `(lon, lat)` or `(x, y)` pair.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}
