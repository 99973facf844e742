//! WebP Batch Conversion Library
//!
//! Converts JPEG and PNG images to WebP next to the originals, lowering the
//! quality for JPEG sources and reporting how much space was saved.
//!
//! # Features
//!
//! - **Format-aware quality**: JPEG sources are re-encoded at no more than 85
//! - **Transparency preserved**: images with alpha are encoded as RGBA
//! - **Lossless mode**: bit-exact WebP output on request
//! - **Idempotent batches**: existing `.webp` files are skipped, never overwritten
//! - **Pluggable codec**: the converter talks to a [`Codec`] trait
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use webp_batch::{BatchConverter, ConversionSettings, NullProgress};
//! use std::path::Path;
//!
//! let batch = BatchConverter::new(ConversionSettings::lossy(95), NullProgress);
//! let report = batch.process_directory(Path::new("./public"))?;
//! println!("Saved {:.1}%", report.stats.savings_percent());
//! ```
//!
//! # Single files
//!
//! ```rust,ignore
//! use webp_batch::{Converter, ConversionSettings};
//!
//! let converter = Converter::new(ConversionSettings::lossless());
//! let result = converter.convert_file(Path::new("logo.png"))?;
//! assert_eq!(result.output_path, Path::new("logo.webp"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;

// Re-export commonly used types
pub use batch::{BatchConverter, BatchReport, FileDiscovery, JobStatus};
pub use codec::{Codec, CodecInfo, WebpCodec};
pub use config::{ConversionSettings, QualityDecision, SourceFormat};
pub use error::{ConvertError, Result};
pub use pipeline::{webp_output_path, BatchStats, ConversionResult, Converter};
pub use progress::{CallbackProgress, NullProgress, ProgressEvent, ProgressHandler};

/// Library version information.
pub mod version {
    /// Library version string.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Library name.
    pub const NAME: &str = env!("CARGO_PKG_NAME");

    /// Get full version string.
    pub fn full_version() -> String {
        format!("{} {}", NAME, VERSION)
    }
}
