//! WebP codec: `image` for decoding, libwebp for encoding.

use std::io::Cursor;

use image::DynamicImage;
use webp::{Encoder, WebPConfig};

use super::traits::{Codec, CodecInfo};
use crate::config::EncodeParams;
use crate::error::{ConvertError, Result};

/// Production codec backed by the `image` decoders and libwebp.
///
/// libwebp is compiled into the binary, so there is nothing to probe or
/// install at startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebpCodec;

impl WebpCodec {
    /// Create a new codec instance.
    pub fn new() -> Self {
        Self
    }

    fn config_for(params: &EncodeParams) -> Result<WebPConfig> {
        let mut config = WebPConfig::new()
            .map_err(|_| ConvertError::Encode("libwebp rejected the default config".into()))?;

        config.method = i32::from(params.method);
        if params.lossless {
            // In lossless mode libwebp reads quality as effort, not fidelity.
            config.lossless = 1;
            config.quality = 100.0;
        } else {
            config.lossless = 0;
            config.quality = f32::from(params.quality);
        }
        Ok(config)
    }
}

impl Codec for WebpCodec {
    fn decode(&self, data: &[u8]) -> Result<DynamicImage> {
        let image = image::load_from_memory(data)?;
        log::debug!(
            "Decoded {}x{} image ({:?})",
            image.width(),
            image.height(),
            image.color()
        );
        Ok(image)
    }

    fn is_indexed(&self, data: &[u8]) -> bool {
        png::Decoder::new(Cursor::new(data))
            .read_info()
            .map(|reader| reader.info().color_type == png::ColorType::Indexed)
            .unwrap_or(false)
    }

    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>> {
        let (width, height) = (image.width(), image.height());
        let encoder = match image {
            DynamicImage::ImageRgb8(buf) => Encoder::from_rgb(buf.as_raw(), width, height),
            DynamicImage::ImageRgba8(buf) => Encoder::from_rgba(buf.as_raw(), width, height),
            other => {
                return Err(ConvertError::UnsupportedColor(format!(
                    "{:?} (expected 8-bit RGB or RGBA)",
                    other.color()
                )))
            }
        };

        let config = Self::config_for(params)?;
        let memory = encoder
            .encode_advanced(&config)
            .map_err(|e| ConvertError::Encode(format!("{:?}", e)))?;

        log::debug!(
            "Encoded {}x{} to {} bytes (lossless: {}, quality: {}, method: {})",
            width,
            height,
            memory.len(),
            params.lossless,
            params.quality,
            params.method
        );
        Ok(memory.to_vec())
    }

    fn info(&self) -> CodecInfo {
        CodecInfo {
            name: "WebP (libwebp)",
            supports_lossless: true,
            supports_alpha: true,
        }
    }
}
