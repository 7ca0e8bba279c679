//! Output image formats and the encode/decode boundary.

use std::fmt;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::png;

/// JPEG quality used for blended tiles and stitched output.
pub const JPEG_QUALITY: u8 = 85;

/// Encoded image format for blended tiles and the final thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Png => write!(f, "png"),
            ImageFormat::Jpeg => write!(f, "jpeg"),
        }
    }
}

impl FromStr for ImageFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            other => Err(RenderError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Decode any supported tile encoding into straight-alpha RGBA.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, RenderError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Encode an RGBA image. JPEG drops the alpha channel.
pub fn encode_rgba(image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, RenderError> {
    match format {
        ImageFormat::Png => png::encode_png(image.as_raw(), image.width(), image.height()),
        ImageFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut out = Vec::new();
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
                .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
                .map_err(|e| RenderError::Encode(e.to_string()))?;
            Ok(out)
        }
    }
}
