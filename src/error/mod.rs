//! Error types for the WebP batch converter.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for the library.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Main error type for conversion and batch operations.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// I/O error while reading a source or writing an output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source image could not be decoded.
    #[error("Decode error: {0}")]
    Image(#[from] image::ImageError),

    /// The WebP encoder rejected the image or its settings.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Pixel layout the encoder cannot accept.
    #[error("Unsupported color mode: {0}")]
    UnsupportedColor(String),

    /// Encoded bytes are not a well-formed RIFF/WEBP container.
    #[error("Invalid WebP container: {0}")]
    InvalidContainer(String),

    /// An output file already exists and would be overwritten.
    #[error("Output already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// Target directory does not exist.
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Target path exists but is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Summary could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConvertError {
    /// Whether the CLI should print its usage block alongside this error.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::DirectoryNotFound(_) | Self::NotADirectory(_))
    }
}

impl From<toml::de::Error> for ConvertError {
    fn from(err: toml::de::Error) -> Self {
        ConvertError::Config(err.to_string())
    }
}
