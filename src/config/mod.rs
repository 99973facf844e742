//! Conversion settings, quality policy and config-file loading.

use std::num::IntErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Quality used when none is given or the given one cannot be parsed.
pub const DEFAULT_QUALITY: u8 = 95;

/// Lowest accepted quality.
pub const MIN_QUALITY: u8 = 1;

/// Highest accepted quality.
pub const MAX_QUALITY: u8 = 100;

/// JPEG sources are re-encoded at no more than this quality.
pub const JPEG_QUALITY_CEILING: u8 = 85;

/// Highest libwebp effort level (slowest, smallest output).
pub const MAX_METHOD: u8 = 6;

/// Extensions scanned by default.
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Source image format, as far as the quality policy cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    /// `.jpg` / `.jpeg`
    Jpeg,
    /// `.png`
    Png,
    /// Anything else the extension list lets through.
    Other,
}

impl SourceFormat {
    /// Detect the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => SourceFormat::Jpeg,
            Some("png") => SourceFormat::Png,
            _ => SourceFormat::Other,
        }
    }

    /// Whether the source has already been through lossy compression.
    pub fn is_lossy(&self) -> bool {
        matches!(self, SourceFormat::Jpeg)
    }
}

/// The quality requested for a file and the one actually used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityDecision {
    /// Quality from the settings.
    pub requested: u8,
    /// Quality handed to the encoder.
    pub effective: u8,
    /// True when the JPEG ceiling lowered the requested value.
    pub adjusted: bool,
}

/// Parameters handed to a codec for a single encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    /// Lossy quality (ignored when `lossless` is set).
    pub quality: u8,
    /// Use lossless WebP.
    pub lossless: bool,
    /// libwebp effort, 0..=6.
    pub method: u8,
}

/// Settings for a conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSettings {
    /// Requested lossy quality, 1..=100.
    pub quality: u8,
    /// Encode losslessly; quality is ignored.
    pub lossless: bool,
    /// libwebp effort, 0..=6.
    pub method: u8,
    /// Lower-case extensions (without the dot) picked up by discovery.
    pub extensions: Vec<String>,
    /// Encode in memory but write nothing.
    pub dry_run: bool,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            lossless: false,
            method: MAX_METHOD,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            dry_run: false,
        }
    }
}

impl ConversionSettings {
    /// Lossy settings with the given quality (clamped to 1..=100).
    pub fn lossy(quality: i64) -> Self {
        Self {
            quality: clamp_quality(quality),
            ..Default::default()
        }
    }

    /// Lossless settings.
    pub fn lossless() -> Self {
        Self {
            lossless: true,
            ..Default::default()
        }
    }

    /// Replace the extension list, normalizing each entry.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = normalize_extensions(extensions);
        self
    }

    /// Set the libwebp effort level (clamped to 0..=6).
    pub fn with_method(mut self, method: u8) -> Self {
        self.method = method.min(MAX_METHOD);
        self
    }

    /// Enable or disable dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Apply the format-aware quality policy.
    pub fn quality_for(&self, format: SourceFormat) -> QualityDecision {
        let requested = self.quality;
        if format.is_lossy() && requested > JPEG_QUALITY_CEILING {
            QualityDecision {
                requested,
                effective: JPEG_QUALITY_CEILING,
                adjusted: true,
            }
        } else {
            QualityDecision {
                requested,
                effective: requested,
                adjusted: false,
            }
        }
    }

    /// Encoder parameters for a given quality decision.
    pub fn encode_params(&self, decision: &QualityDecision) -> EncodeParams {
        EncodeParams {
            quality: decision.effective,
            lossless: self.lossless,
            method: self.method,
        }
    }

    /// Whether `ext` (any case, with or without a leading dot) is selected.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = normalize_extension(ext);
        self.extensions.iter().any(|e| *e == ext)
    }
}

/// Clamp an integer quality into 1..=100.
pub fn clamp_quality(value: i64) -> u8 {
    value.clamp(i64::from(MIN_QUALITY), i64::from(MAX_QUALITY)) as u8
}

/// Parse a quality argument.
///
/// Integers are clamped into range, including ones too large for `i64`.
/// Returns `None` for anything that is not an integer.
pub fn parse_quality(raw: &str) -> Option<u8> {
    match raw.trim().parse::<i64>() {
        Ok(value) => Some(clamp_quality(value)),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(MAX_QUALITY),
            IntErrorKind::NegOverflow => Some(MIN_QUALITY),
            _ => None,
        },
    }
}

/// Parse the lossless switch: `lossless`, `true` or `1` in any case.
pub fn parse_lossless(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "lossless" | "true" | "1"
    )
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

fn normalize_extensions<I, S>(extensions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for ext in extensions {
        let ext = normalize_extension(ext.as_ref());
        if !ext.is_empty() && !out.contains(&ext) {
            out.push(ext);
        }
    }
    out
}

/// Settings read from a TOML file. Every key is optional.
///
/// ```toml
/// quality = 90
/// lossless = false
/// method = 6
/// extensions = ["jpg", "jpeg", "png"]
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Requested quality; clamped like the CLI value.
    pub quality: Option<i64>,
    /// Lossless switch.
    pub lossless: Option<bool>,
    /// libwebp effort.
    pub method: Option<u8>,
    /// Extension list.
    pub extensions: Option<Vec<String>>,
}

impl FileConfig {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Overlay the values present in this file onto `settings`.
    pub fn apply(&self, mut settings: ConversionSettings) -> ConversionSettings {
        if let Some(quality) = self.quality {
            settings.quality = clamp_quality(quality);
        }
        if let Some(lossless) = self.lossless {
            settings.lossless = lossless;
        }
        if let Some(method) = self.method {
            settings = settings.with_method(method);
        }
        if let Some(ref extensions) = self.extensions {
            settings = settings.with_extensions(extensions);
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_source_format_detection() {
        assert_eq!(SourceFormat::from_path(Path::new("a.jpg")), SourceFormat::Jpeg);
        assert_eq!(SourceFormat::from_path(Path::new("a.JPEG")), SourceFormat::Jpeg);
        assert_eq!(SourceFormat::from_path(Path::new("dir/b.Png")), SourceFormat::Png);
        assert_eq!(SourceFormat::from_path(Path::new("c.gif")), SourceFormat::Other);
        assert_eq!(SourceFormat::from_path(Path::new("noext")), SourceFormat::Other);
    }

    #[test]
    fn test_jpeg_quality_ceiling() {
        let settings = ConversionSettings::lossy(95);
        let decision = settings.quality_for(SourceFormat::Jpeg);
        assert_eq!(decision.effective, 85);
        assert!(decision.adjusted);

        let png = settings.quality_for(SourceFormat::Png);
        assert_eq!(png.effective, 95);
        assert!(!png.adjusted);
    }

    #[test]
    fn test_jpeg_quality_at_or_below_ceiling_unchanged() {
        for q in [1, 50, 84, 85] {
            let decision = ConversionSettings::lossy(q).quality_for(SourceFormat::Jpeg);
            assert_eq!(i64::from(decision.effective), q);
            assert!(!decision.adjusted);
        }
        let decision = ConversionSettings::lossy(86).quality_for(SourceFormat::Jpeg);
        assert_eq!(decision.effective, 85);
    }

    #[test]
    fn test_parse_quality_clamps() {
        assert_eq!(parse_quality("150"), Some(100));
        assert_eq!(parse_quality("0"), Some(1));
        assert_eq!(parse_quality("-20"), Some(1));
        assert_eq!(parse_quality(" 90 "), Some(90));
        assert_eq!(parse_quality("99999999999999999999999"), Some(100));
        assert_eq!(parse_quality("-99999999999999999999999"), Some(1));
    }

    #[test]
    fn test_parse_quality_rejects_non_numeric() {
        assert_eq!(parse_quality("high"), None);
        assert_eq!(parse_quality("90.5"), None);
        assert_eq!(parse_quality(""), None);
    }

    #[test]
    fn test_parse_lossless() {
        assert!(parse_lossless("lossless"));
        assert!(parse_lossless("TRUE"));
        assert!(parse_lossless("1"));
        assert!(!parse_lossless("yes"));
        assert!(!parse_lossless("0"));
        assert!(!parse_lossless("false"));
    }

    #[test]
    fn test_default_settings() {
        let settings = ConversionSettings::default();
        assert_eq!(settings.quality, 95);
        assert!(!settings.lossless);
        assert_eq!(settings.method, 6);
        assert!(settings.accepts_extension("JPG"));
        assert!(settings.accepts_extension(".png"));
        assert!(!settings.accepts_extension("webp"));
    }

    #[test]
    fn test_extension_normalization() {
        let settings =
            ConversionSettings::default().with_extensions([".PNG", "png", " Jpg ", ""]);
        assert_eq!(settings.extensions, vec!["png".to_string(), "jpg".to_string()]);
    }

    #[test]
    fn test_method_clamped() {
        assert_eq!(ConversionSettings::default().with_method(9).method, 6);
        assert_eq!(ConversionSettings::default().with_method(2).method, 2);
    }

    #[test]
    fn test_file_config_overlay() {
        let config = FileConfig::from_toml_str(
            "quality = 300\nlossless = true\nextensions = [\"png\"]\n",
        )
        .unwrap();
        let settings = config.apply(ConversionSettings::default());

        assert_eq!(settings.quality, 100);
        assert!(settings.lossless);
        assert_eq!(settings.method, 6);
        assert_eq!(settings.extensions, vec!["png".to_string()]);
    }

    #[test]
    fn test_file_config_rejects_unknown_keys() {
        let err = FileConfig::from_toml_str("qualty = 90").unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }

    #[test]
    fn test_file_config_missing_file() {
        let err = FileConfig::load(&PathBuf::from("/nonexistent/webp.toml")).unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }
}
