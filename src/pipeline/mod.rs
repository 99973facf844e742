//! Conversion pipeline module.
//!
//! This module handles the single-file workflow: read, decode, normalize,
//! encode, verify and write a sibling `.webp`.

mod color;

pub use color::{normalize, NormalizedImage};

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::ColorType;
use serde::Serialize;

use crate::codec::{verify_container, Codec, WebpCodec};
use crate::config::{ConversionSettings, QualityDecision, SourceFormat};
use crate::error::{ConvertError, Result};

/// Extension given to every output file.
pub const WEBP_EXTENSION: &str = "webp";

/// Output path for a source image: same directory, same stem, `.webp`.
pub fn webp_output_path(input: &Path) -> PathBuf {
    input.with_extension(WEBP_EXTENSION)
}

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// Source file path.
    pub source_path: PathBuf,
    /// Output file path (written unless in dry-run mode).
    pub output_path: PathBuf,
    /// Source size in bytes.
    pub original_size: u64,
    /// Encoded WebP size in bytes.
    pub webp_size: u64,
    /// Quality requested and used.
    pub quality: QualityDecision,
    /// Whether lossless encoding was used.
    pub lossless: bool,
    /// Color type of the decoded source.
    pub source_color: ColorType,
    /// Color type handed to the encoder.
    pub output_color: ColorType,
    /// Whether the pixels had to be converted before encoding.
    pub normalized: bool,
    /// Whether the output was written to disk.
    pub written: bool,
    /// Time taken in milliseconds.
    pub elapsed_ms: u64,
}

impl ConversionResult {
    /// Bytes saved (negative when the WebP is larger).
    pub fn saved_bytes(&self) -> i64 {
        self.original_size as i64 - self.webp_size as i64
    }

    /// Size reduction as a percentage of the original.
    pub fn reduction_percent(&self) -> f64 {
        percent_saved(self.original_size, self.webp_size)
    }
}

/// Aggregate counters for a batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    /// Files matched by discovery.
    pub discovered: usize,
    /// Files converted.
    pub successful: usize,
    /// Files whose conversion failed.
    pub failed: usize,
    /// Files skipped because their output already existed.
    pub skipped: usize,
    /// Sum of source sizes over every attempted (non-skipped) file.
    pub total_original_bytes: u64,
    /// Sum of WebP sizes over successful conversions.
    pub total_webp_bytes: u64,
    /// Total processing time in milliseconds.
    pub total_time_ms: u64,
}

impl BatchStats {
    /// Files that were attempted (converted or failed).
    pub fn attempted(&self) -> usize {
        self.successful + self.failed
    }

    /// Overall bytes saved.
    pub fn saved_bytes(&self) -> i64 {
        self.total_original_bytes as i64 - self.total_webp_bytes as i64
    }

    /// Overall savings as a percentage of the attempted originals.
    pub fn savings_percent(&self) -> f64 {
        percent_saved(self.total_original_bytes, self.total_webp_bytes)
    }
}

fn percent_saved(original: u64, output: u64) -> f64 {
    if original == 0 {
        0.0
    } else {
        (original as f64 - output as f64) / original as f64 * 100.0
    }
}

/// Single-file converter.
pub struct Converter<C: Codec = WebpCodec> {
    /// Decode/encode collaborator.
    codec: C,
    /// Conversion settings.
    settings: ConversionSettings,
}

impl Converter<WebpCodec> {
    /// Create a converter backed by libwebp.
    pub fn new(settings: ConversionSettings) -> Self {
        Self::with_codec(WebpCodec::new(), settings)
    }
}

impl<C: Codec> Converter<C> {
    /// Create a converter with a custom codec.
    pub fn with_codec(codec: C, settings: ConversionSettings) -> Self {
        Self { codec, settings }
    }

    /// Settings in use.
    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    /// Codec in use.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Where the WebP for `input` is written.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        webp_output_path(input)
    }

    /// Quality that will be used for `input`.
    pub fn quality_for(&self, input: &Path) -> QualityDecision {
        self.settings.quality_for(SourceFormat::from_path(input))
    }

    /// Convert one image to a sibling `.webp` file.
    ///
    /// The source is never modified and an existing output is never
    /// overwritten: the output is opened with create-new semantics.
    pub fn convert_file(&self, input: &Path) -> Result<ConversionResult> {
        let start = Instant::now();
        let output_path = self.output_path_for(input);
        let quality = self.quality_for(input);

        log::debug!(
            "Converting {} with {}",
            input.display(),
            self.codec.info().name
        );

        let data = fs::read(input)?;
        let original_size = data.len() as u64;

        let indexed = self.codec.is_indexed(&data);
        let decoded = self.codec.decode(&data)?;
        drop(data);
        let normalized = normalize(decoded, indexed);

        let params = self.settings.encode_params(&quality);
        let encoded = self.codec.encode(&normalized.image, &params)?;
        verify_container(&encoded)?;

        let written = if self.settings.dry_run {
            log::debug!("Dry run: not writing {}", output_path.display());
            false
        } else {
            write_new_file(&output_path, &encoded)?;
            true
        };

        Ok(ConversionResult {
            source_path: input.to_path_buf(),
            output_path,
            original_size,
            webp_size: encoded.len() as u64,
            quality,
            lossless: self.settings.lossless,
            source_color: normalized.source_color,
            output_color: normalized.image.color(),
            normalized: normalized.converted,
            written,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Write `bytes` to a file that must not exist yet.
///
/// A failed write removes the partial file.
fn write_new_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ConvertError::OutputExists(path.to_path_buf()),
            _ => ConvertError::Io(e),
        })?;

    if let Err(e) = file.write_all(bytes).and_then(|()| file.sync_all()) {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path) {
            log::warn!("Could not remove partial {}: {}", path.display(), cleanup);
        }
        return Err(ConvertError::Io(e));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeCodec, CORRUPT, INDEXED, WITH_ALPHA};
    use super::*;
    use tempfile::TempDir;

    fn converter(settings: ConversionSettings) -> Converter<FakeCodec> {
        Converter::with_codec(FakeCodec::default(), settings)
    }

    #[test]
    fn test_output_path_is_sibling_with_webp_extension() {
        assert_eq!(
            webp_output_path(Path::new("/imgs/photo.jpg")),
            PathBuf::from("/imgs/photo.webp")
        );
        assert_eq!(
            webp_output_path(Path::new("rel/Logo.PNG")),
            PathBuf::from("rel/Logo.webp")
        );
        assert_eq!(
            webp_output_path(Path::new("a.b.jpeg")),
            PathBuf::from("a.b.webp")
        );
        assert_eq!(
            converter(ConversionSettings::default()).output_path_for(Path::new("x/y.png")),
            PathBuf::from("x/y.webp")
        );
    }

    #[test]
    fn test_convert_jpeg_caps_quality() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("a.jpg");
        fs::write(&input, b"jpeg bytes").unwrap();

        let converter = converter(ConversionSettings::lossy(95));
        let result = converter.convert_file(&input).unwrap();

        assert_eq!(result.quality.effective, 85);
        assert!(result.quality.adjusted);
        assert_eq!(converter.codec().encodes.borrow()[0].quality, 85);
        assert_eq!(converter.codec().encodes.borrow()[0].method, 6);
        assert_eq!(result.output_path, dir.path().join("a.webp"));
        assert!(result.written);
        assert!(result.output_path.exists());
        assert_eq!(result.original_size, 10);
        assert_eq!(result.webp_size, 16);
    }

    #[test]
    fn test_convert_png_keeps_requested_quality() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("b.png");
        fs::write(&input, b"png bytes").unwrap();

        let converter = converter(ConversionSettings::lossy(95));
        let result = converter.convert_file(&input).unwrap();

        assert_eq!(result.quality.effective, 95);
        assert!(!result.quality.adjusted);
    }

    #[test]
    fn test_convert_normalizes_color() {
        let dir = TempDir::new().unwrap();
        let gray = dir.path().join("gray.png");
        let alpha = dir.path().join("alpha.png");
        fs::write(&gray, b"gray").unwrap();
        fs::write(&alpha, WITH_ALPHA).unwrap();

        let converter = converter(ConversionSettings::default());
        let gray_result = converter.convert_file(&gray).unwrap();
        let alpha_result = converter.convert_file(&alpha).unwrap();

        assert!(gray_result.normalized);
        assert!(!alpha_result.normalized);
        assert_eq!(
            *converter.codec().colors.borrow(),
            vec![ColorType::Rgb8, ColorType::Rgba8]
        );
    }

    #[test]
    fn test_convert_palette_source_encodes_rgba() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("icon.png");
        fs::write(&input, INDEXED).unwrap();

        let converter = converter(ConversionSettings::default());
        let result = converter.convert_file(&input).unwrap();

        assert!(result.normalized);
        assert_eq!(result.source_color, ColorType::Rgb8);
        assert_eq!(result.output_color, ColorType::Rgba8);
        assert_eq!(*converter.codec().colors.borrow(), vec![ColorType::Rgba8]);
    }

    #[test]
    fn test_lossless_passes_flag() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("c.png");
        fs::write(&input, b"png").unwrap();

        let converter = converter(ConversionSettings::lossless());
        let result = converter.convert_file(&input).unwrap();

        assert!(result.lossless);
        assert!(converter.codec().encodes.borrow()[0].lossless);
    }

    #[test]
    fn test_corrupt_input_fails_without_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("bad.jpg");
        fs::write(&input, CORRUPT).unwrap();

        let err = converter(ConversionSettings::default())
            .convert_file(&input)
            .unwrap_err();

        assert!(matches!(err, ConvertError::Image(_)));
        assert!(!dir.path().join("bad.webp").exists());
        assert_eq!(fs::read(&input).unwrap(), CORRUPT);
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = converter(ConversionSettings::default())
            .convert_file(&dir.path().join("missing.png"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Io(_)));
    }

    #[test]
    fn test_invalid_container_is_not_written() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("d.png");
        fs::write(&input, b"png").unwrap();

        let converter = Converter::with_codec(FakeCodec::broken(), ConversionSettings::default());
        let err = converter.convert_file(&input).unwrap_err();

        assert!(matches!(err, ConvertError::InvalidContainer(_)));
        assert!(!dir.path().join("d.webp").exists());
    }

    #[test]
    fn test_existing_output_is_never_overwritten() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("e.png");
        let output = dir.path().join("e.webp");
        fs::write(&input, b"png").unwrap();
        fs::write(&output, b"keep me").unwrap();

        let err = converter(ConversionSettings::default())
            .convert_file(&input)
            .unwrap_err();

        assert!(matches!(err, ConvertError::OutputExists(_)));
        assert_eq!(fs::read(&output).unwrap(), b"keep me");
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("f.png");
        fs::write(&input, b"png").unwrap();

        let converter = converter(ConversionSettings::default().with_dry_run(true));
        let result = converter.convert_file(&input).unwrap();

        assert!(!result.written);
        assert_eq!(result.webp_size, 16);
        assert!(!dir.path().join("f.webp").exists());
    }

    #[test]
    fn test_reduction_percent() {
        let result = ConversionResult {
            source_path: PathBuf::from("a.jpg"),
            output_path: PathBuf::from("a.webp"),
            original_size: 1000,
            webp_size: 250,
            quality: ConversionSettings::default().quality_for(SourceFormat::Png),
            lossless: false,
            source_color: ColorType::Rgb8,
            output_color: ColorType::Rgb8,
            normalized: false,
            written: true,
            elapsed_ms: 1,
        };
        assert!((result.reduction_percent() - 75.0).abs() < 1e-9);
        assert_eq!(result.saved_bytes(), 750);
    }

    #[test]
    fn test_batch_stats_savings() {
        let stats = BatchStats {
            successful: 2,
            failed: 1,
            total_original_bytes: 2000,
            total_webp_bytes: 2500,
            ..Default::default()
        };
        assert_eq!(stats.attempted(), 3);
        assert_eq!(stats.saved_bytes(), -500);
        assert!((stats.savings_percent() + 25.0).abs() < 1e-9);
        assert_eq!(BatchStats::default().savings_percent(), 0.0);
    }
}
