//! Codec layer for WebP conversion.
//!
//! This module provides the `Codec` trait, the libwebp-backed implementation
//! and a structural check for encoded WebP output.

mod traits;
mod webp_codec;

pub use self::traits::{Codec, CodecInfo};
pub use self::webp_codec::WebpCodec;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{ConvertError, Result};

/// Size of the `RIFF....WEBP` header.
const RIFF_HEADER_LEN: usize = 12;

/// Check that `data` is a RIFF/WEBP container whose RIFF size field matches
/// the number of bytes that follow it.
pub fn verify_container(data: &[u8]) -> Result<()> {
    if data.len() < RIFF_HEADER_LEN {
        return Err(ConvertError::InvalidContainer(format!(
            "{} bytes is too short for a WebP header",
            data.len()
        )));
    }
    if &data[0..4] != b"RIFF" || &data[8..12] != b"WEBP" {
        return Err(ConvertError::InvalidContainer(
            "missing RIFF/WEBP signature".into(),
        ));
    }

    let riff_size = LittleEndian::read_u32(&data[4..8]) as usize;
    if riff_size + 8 != data.len() {
        return Err(ConvertError::InvalidContainer(format!(
            "RIFF size {} does not match payload of {} bytes",
            riff_size,
            data.len() - 8
        )));
    }
    Ok(())
}
