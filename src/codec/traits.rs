//! Codec trait definitions.

use image::DynamicImage;

use crate::config::EncodeParams;
use crate::error::Result;

/// Information about a codec.
#[derive(Debug, Clone)]
pub struct CodecInfo {
    /// Human-readable codec name.
    pub name: &'static str,
    /// Whether lossless encoding is supported.
    pub supports_lossless: bool,
    /// Whether alpha channels survive encoding.
    pub supports_alpha: bool,
}

/// Decode/encode collaborator used by the converter.
///
/// The converter only ever hands `encode` 8-bit RGB or RGBA images; a codec
/// may reject anything else with [`ConvertError::UnsupportedColor`].
///
/// [`ConvertError::UnsupportedColor`]: crate::error::ConvertError::UnsupportedColor
pub trait Codec {
    /// Decode a source file's bytes.
    fn decode(&self, data: &[u8]) -> Result<DynamicImage>;

    /// Whether the source stores palette indices rather than direct color.
    ///
    /// Decoders expand palettes, so this has to look at the raw bytes.
    fn is_indexed(&self, _data: &[u8]) -> bool {
        false
    }

    /// Encode an image to WebP bytes.
    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>>;

    /// Get codec information.
    fn info(&self) -> CodecInfo;
}
