//! Alpha compositing of an overlay tile onto a background tile.

use image::imageops;

use crate::error::RenderError;
use crate::format::{decode_rgba, encode_rgba, ImageFormat};

/// Composite `overlay` over `background` (source-over) and encode the result.
///
/// Both inputs may be any format the `image` crate can decode. They must
/// have identical dimensions.
pub fn blend_tiles(
    background: &[u8],
    overlay: &[u8],
    format: ImageFormat,
) -> Result<Vec<u8>, RenderError> {
    let mut bottom = decode_rgba(background)?;
    let top = decode_rgba(overlay)?;

    if bottom.dimensions() != top.dimensions() {
        return Err(RenderError::DimensionMismatch {
            background: bottom.dimensions(),
            overlay: top.dimensions(),
        });
    }

    imageops::overlay(&mut bottom, &top, 0, 0);
    encode_rgba(&bottom, format)
}
