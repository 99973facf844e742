//! Command-line interface for the WebP batch converter.

mod console;

pub use console::{format_kb, print_summary, ConsoleProgress};

use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::batch::{BatchConverter, BatchReport, JobStatus};
use crate::config::{parse_lossless, parse_quality, ConversionSettings, FileConfig, DEFAULT_QUALITY};
use crate::error::Result;
use crate::pipeline::BatchStats;

/// Image to WebP converter
///
/// Converts every JPG, JPEG and PNG directly inside a directory to a sibling
/// `.webp` file. Originals are never touched and existing `.webp` files are
/// never overwritten.
#[derive(Parser, Debug)]
#[command(name = "webp-batch")]
#[command(version)]
#[command(about = "Batch-convert JPEG/PNG images to WebP")]
#[command(allow_negative_numbers = true)]
pub struct Cli {
    /// Directory to scan (default: `public` next to the executable's folder)
    pub directory: Option<PathBuf>,

    /// Quality 1-100 (default 95; JPEG sources are capped at 85)
    pub quality: Option<String>,

    /// Pass `lossless`, `true` or `1` to encode losslessly
    pub lossless: Option<String>,

    /// TOML file with quality, lossless, method and extensions
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Comma-separated extensions to convert (default: jpg,jpeg,png)
    #[arg(short, long, value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Encoder effort, 0 (fast) to 6 (smallest output)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=6))]
    pub method: Option<u8>,

    /// Encode in memory and report sizes without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Usage block printed alongside directory errors.
pub fn usage() -> String {
    [
        "Usage:",
        "  webp-batch [directory] [quality] [lossless]",
        "",
        "Examples:",
        "  webp-batch",
        "  webp-batch ../public",
        "  webp-batch ../public 90",
        "  webp-batch ../public 95 lossless",
    ]
    .join("\n")
}

/// `public` in the parent of the executable's directory.
pub fn default_target_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| {
            exe.parent()
                .and_then(Path::parent)
                .map(|root| root.join("public"))
        })
        .unwrap_or_else(|| PathBuf::from("public"))
}

/// Merge defaults, config file and command-line values.
///
/// Returns the settings and any warnings to show the user.
pub fn resolve_settings(cli: &Cli) -> Result<(ConversionSettings, Vec<String>)> {
    let mut settings = match cli.config {
        Some(ref path) => FileConfig::load(path)?.apply(ConversionSettings::default()),
        None => ConversionSettings::default(),
    };
    let mut warnings = Vec::new();

    if let Some(ref raw) = cli.quality {
        settings.quality = match parse_quality(raw) {
            Some(quality) => quality,
            None => {
                warnings.push(format!(
                    "Invalid quality value '{}', using default: {}",
                    raw, DEFAULT_QUALITY
                ));
                DEFAULT_QUALITY
            }
        };
    }

    if let Some(ref raw) = cli.lossless {
        settings.lossless = parse_lossless(raw);
    }

    if let Some(method) = cli.method {
        settings = settings.with_method(method);
    }

    if let Some(ref extensions) = cli.extensions {
        settings = settings.with_extensions(extensions);
    }

    Ok((settings.with_dry_run(cli.dry_run), warnings))
}

/// Run the CLI application.
pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.quiet);

    let (settings, warnings) = resolve_settings(&cli)?;
    let quiet = cli.quiet || cli.json;
    let directory = cli.directory.clone().unwrap_or_else(default_target_dir);

    if !quiet {
        println!("{}", console::RULE);
        println!("🎨 IMAGE TO WEBP CONVERTER");
        println!("{}", console::RULE);
        println!();
        let shown = std::path::absolute(&directory).unwrap_or_else(|_| directory.clone());
        println!("📁 Target Directory: {}", shown.display());
        println!();
    }
    for warning in &warnings {
        log::warn!("{}", warning);
        eprintln!("⚠️  {}", warning);
    }

    log::debug!("Settings: {:?}", settings);

    let console = ConsoleProgress::new(&settings, quiet);
    let batch = BatchConverter::new(settings.clone(), &console);
    let report = batch.process_directory(&directory)?;

    if cli.json {
        let summary = JsonSummary::new(&report, &settings);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !cli.quiet && report.stats.discovered > 0 {
        print_summary(&report.stats, settings.dry_run);
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

/// Machine-readable summary for `--json`.
#[derive(Debug, Serialize)]
pub struct JsonSummary<'a> {
    /// Directory that was scanned.
    pub directory: &'a Path,
    /// Settings used for the run.
    pub settings: &'a ConversionSettings,
    /// Aggregate counters.
    pub stats: &'a BatchStats,
    /// Overall bytes saved.
    pub saved_bytes: i64,
    /// Overall savings percentage.
    pub savings_percent: f64,
    /// One entry per discovered file.
    pub files: Vec<JsonFile<'a>>,
}

/// Per-file entry of [`JsonSummary`].
#[derive(Debug, Serialize)]
pub struct JsonFile<'a> {
    /// Source path.
    pub source: &'a Path,
    /// Output path.
    pub output: &'a Path,
    /// Final status.
    pub status: JobStatus,
    /// Source size, if it was counted.
    pub original_size: Option<u64>,
    /// WebP size, if converted.
    pub webp_size: Option<u64>,
    /// Quality handed to the encoder, if converted lossy.
    pub quality: Option<u8>,
    /// Error message, if failed.
    pub error: Option<String>,
}

impl<'a> JsonSummary<'a> {
    /// Build a summary from a finished batch.
    pub fn new(report: &'a BatchReport, settings: &'a ConversionSettings) -> Self {
        let files = report
            .jobs
            .iter()
            .map(|result| JsonFile {
                source: &result.job.source_path,
                output: &result.job.output_path,
                status: result.status(),
                original_size: result.original_size,
                webp_size: result.webp_size(),
                quality: result
                    .conversion
                    .as_ref()
                    .filter(|c| !c.lossless)
                    .map(|c| c.quality.effective),
                error: result.error.as_ref().map(|e| e.to_string()),
            })
            .collect();

        Self {
            directory: &report.directory,
            settings,
            stats: &report.stats,
            saved_bytes: report.stats.saved_bytes(),
            savings_percent: report.stats.savings_percent(),
            files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["webp-batch"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_positional_arguments() {
        let cli = parse(&["../public", "90", "lossless"]);
        assert_eq!(cli.directory, Some(PathBuf::from("../public")));

        let (settings, warnings) = resolve_settings(&cli).unwrap();
        assert_eq!(settings.quality, 90);
        assert!(settings.lossless);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_defaults_without_arguments() {
        let (settings, warnings) = resolve_settings(&parse(&[])).unwrap();
        assert_eq!(settings, ConversionSettings::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_quality_clamping() {
        let (high, _) = resolve_settings(&parse(&["dir", "150"])).unwrap();
        assert_eq!(high.quality, 100);

        let (zero, _) = resolve_settings(&parse(&["dir", "0"])).unwrap();
        assert_eq!(zero.quality, 1);

        let (negative, _) = resolve_settings(&parse(&["dir", "-5"])).unwrap();
        assert_eq!(negative.quality, 1);
    }

    #[test]
    fn test_invalid_quality_warns_and_defaults() {
        let (settings, warnings) = resolve_settings(&parse(&["dir", "best"])).unwrap();
        assert_eq!(settings.quality, 95);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Invalid quality"));
    }

    #[test]
    fn test_lossless_values() {
        for value in ["lossless", "TRUE", "1"] {
            let (settings, _) = resolve_settings(&parse(&["dir", "95", value])).unwrap();
            assert!(settings.lossless, "{value} should enable lossless");
        }
        let (settings, _) = resolve_settings(&parse(&["dir", "95", "no"])).unwrap();
        assert!(!settings.lossless);
    }

    #[test]
    fn test_flags() {
        let cli = parse(&["dir", "--extensions", "png,.WEBP", "-m", "3", "--dry-run", "--json"]);
        let (settings, _) = resolve_settings(&cli).unwrap();

        assert_eq!(settings.extensions, vec!["png".to_string(), "webp".to_string()]);
        assert_eq!(settings.method, 3);
        assert!(settings.dry_run);
        assert!(cli.json);
    }

    #[test]
    fn test_method_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["webp-batch", "dir", "-m", "7"]).is_err());
    }

    #[test]
    fn test_config_file_with_cli_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "quality = 70\nlossless = true\nmethod = 4").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let (from_file, _) = resolve_settings(&parse(&["dir", "--config", path.as_str()])).unwrap();
        assert_eq!(from_file.quality, 70);
        assert!(from_file.lossless);
        assert_eq!(from_file.method, 4);

        let (overridden, _) =
            resolve_settings(&parse(&["dir", "80", "false", "--config", path.as_str()])).unwrap();
        assert_eq!(overridden.quality, 80);
        assert!(!overridden.lossless);
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cli = parse(&["dir", "--config", "/nonexistent/webp.toml"]);
        assert!(resolve_settings(&cli).is_err());
    }

    #[test]
    fn test_default_target_dir_ends_in_public() {
        assert!(default_target_dir().ends_with("public"));
    }

    #[test]
    fn test_usage_lists_positional_form() {
        let text = usage();
        assert!(text.starts_with("Usage:"));
        assert!(text.contains("[directory] [quality] [lossless]"));
    }
}
