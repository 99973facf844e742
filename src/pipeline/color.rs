//! Color-mode normalization ahead of WebP encoding.

use image::{ColorType, DynamicImage};

/// An image in a layout the WebP encoder accepts.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// 8-bit RGB or RGBA pixels.
    pub image: DynamicImage,
    /// Color type of the decoded source.
    pub source_color: ColorType,
    /// True when the pixels were converted.
    pub converted: bool,
}

/// Bring a decoded image into 8-bit RGB or RGBA.
///
/// Indexed sources always become RGBA, whether or not the palette carries
/// transparency. Anything else that is not 8-bit RGB/RGBA is converted to
/// RGBA if it has an alpha channel and to RGB otherwise.
pub fn normalize(image: DynamicImage, indexed: bool) -> NormalizedImage {
    let source_color = image.color();
    let (image, converted) = match image {
        DynamicImage::ImageRgba8(_) => (image, false),
        other if indexed => (DynamicImage::ImageRgba8(other.to_rgba8()), true),
        DynamicImage::ImageRgb8(_) => (image, false),
        other if source_color.has_alpha() => (DynamicImage::ImageRgba8(other.to_rgba8()), true),
        other => (DynamicImage::ImageRgb8(other.to_rgb8()), true),
    };

    if converted {
        log::debug!("Converted {:?} to {:?}", source_color, image.color());
    }

    NormalizedImage {
        image,
        source_color,
        converted,
    }
}
