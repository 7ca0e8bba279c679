//! Synthetic raster tiles.
//!
//! Tiles are produced as encoded PNG bytes, the same form real tile sources
//! return, so tests exercise the decode path too.

use image::{ImageOutputFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Encode an RGBA image as PNG.
pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageOutputFormat::Png)
        .expect("PNG encoding of an in-memory image cannot fail");
    out.into_inner()
}

/// A square tile filled with one colour.
///
/// # Example
///
/// ```
/// use test_utils::solid_tile;
///
/// let png = solid_tile(4, [255, 0, 0, 255]);
/// assert_eq!(&png[0..4], &[137, 80, 78, 71]);
/// ```
pub fn solid_tile(size: u32, rgba: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(size, size, Rgba(rgba)))
}

/// A tile whose left half is `left` and right half is `right`.
pub fn split_tile(size: u32, left: [u8; 4], right: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_fn(size, size, |x, _| {
        if x < size / 2 {
            Rgba(left)
        } else {
            Rgba(right)
        }
    });
    encode_png(&image)
}

/// Decode PNG/JPEG bytes back into RGBA for assertions.
pub fn decode_rgba(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes)
        .expect("test image should decode")
        .to_rgba8()
}
