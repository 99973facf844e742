//! Console progress reporting.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::ConversionSettings;
use crate::error::ConvertError;
use crate::pipeline::{BatchStats, ConversionResult};
use crate::progress::{ProgressEvent, ProgressHandler, ProgressPhase};

/// Horizontal rule used by the banner and summary.
pub const RULE: &str = "==================================================";

/// Format a byte count as kilobytes with one decimal.
pub fn format_kb(bytes: i64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

/// Prints per-file progress lines under an `indicatif` bar.
///
/// In quiet mode the bar is hidden and only failures are printed, to stderr.
pub struct ConsoleProgress {
    bar: ProgressBar,
    quiet: bool,
    quality: u8,
    lossless: bool,
}

impl ConsoleProgress {
    /// Create a console handler for a run with `settings`.
    pub fn new(settings: &ConversionSettings, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template("{bar:30} {pos}/{len} {wide_msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        };

        Self {
            bar,
            quiet,
            quality: settings.quality,
            lossless: settings.lossless,
        }
    }

    fn line(&self, text: &str) {
        if !self.quiet {
            self.bar.suspend(|| println!("{}", text));
        }
    }

    fn print_header(&self, dir: &Path, total: usize) {
        self.line(&format!("🖼️  Found {} image(s) to convert", total));
        self.line(&format!("📁 Directory: {}", dir.display()));
        self.line(&format!(
            "🎯 Quality: {}% {}",
            self.quality,
            if self.lossless { "(Lossless)" } else { "" }
        ));
        self.line(RULE);
        self.line("");
    }
}

impl ProgressHandler for ConsoleProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        match event.phase {
            ProgressPhase::Discovery => {
                let total = event.total_files.unwrap_or(0);
                let dir = event.current_file.as_deref().unwrap_or(Path::new("."));
                if total == 0 {
                    self.line(&format!("ℹ️  No images found in {}", dir.display()));
                } else {
                    self.bar.set_length(total as u64);
                    self.print_header(dir, total);
                }
            }
            ProgressPhase::Converting => {
                if let Some(quality) = event.quality {
                    if quality.adjusted && !self.lossless {
                        self.line(&format!(
                            "   ℹ️  Adjusted quality to {} for JPG source",
                            quality.effective
                        ));
                    }
                }
                self.bar.set_message(event.file_name().unwrap_or_default());
            }
            ProgressPhase::Skipped => {
                self.line(&format!(
                    "⏭️  Skipping {} (WebP already exists)",
                    event.file_name().unwrap_or_default()
                ));
                self.bar.inc(1);
            }
            ProgressPhase::Converted | ProgressPhase::Failed => self.bar.inc(1),
            ProgressPhase::Complete => self.bar.finish_and_clear(),
        }
    }

    fn on_converted(&self, result: &ConversionResult) {
        let name = result
            .source_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        if result.written {
            self.line(&format!("✅ {}", name));
        } else {
            self.line(&format!("✅ {} (dry run, not written)", name));
        }
        self.line(&format!("   Original: {}", format_kb(result.original_size as i64)));
        self.line(&format!("   WebP: {}", format_kb(result.webp_size as i64)));
        self.line(&format!("   Reduction: {:.1}%", result.reduction_percent()));
        self.line("");
    }

    fn on_error(&self, error: &ConvertError, file: Option<&Path>) {
        let file = file
            .map(|f| f.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        let text = format!("❌ Error converting {}: {}", file, error);

        if self.quiet {
            eprintln!("{}", text);
        } else {
            self.line(&text);
        }
    }

    fn on_complete(&self, _stats: &BatchStats) {
        self.bar.finish_and_clear();
    }
}

/// Print the end-of-run summary block.
pub fn print_summary(stats: &BatchStats, dry_run: bool) {
    println!("{}", RULE);
    println!("📊 CONVERSION SUMMARY");
    println!("{}", RULE);
    println!("✅ Successful: {}", stats.successful);
    println!("❌ Failed: {}", stats.failed);
    if stats.skipped > 0 {
        println!("⏭️  Skipped: {}", stats.skipped);
    }
    println!(
        "📦 Total Original Size: {}",
        format_kb(stats.total_original_bytes as i64)
    );
    println!("📦 Total WebP Size: {}", format_kb(stats.total_webp_bytes as i64));
    if stats.total_original_bytes > 0 {
        println!(
            "💾 Total Savings: {} ({:.1}%)",
            format_kb(stats.saved_bytes()),
            stats.savings_percent()
        );
    }
    println!();
    if dry_run {
        println!("ℹ️  Dry run: no files were written.");
    } else {
        println!(
            "ℹ️  Original files were preserved. You can delete them after verifying WebP quality."
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_kb() {
        assert_eq!(format_kb(0), "0.0 KB");
        assert_eq!(format_kb(51_200), "50.0 KB");
        assert_eq!(format_kb(1536), "1.5 KB");
        assert_eq!(format_kb(-2048), "-2.0 KB");
    }

    #[test]
    fn test_quiet_console_accepts_events() {
        let console = ConsoleProgress::new(&ConversionSettings::default(), true);
        console.on_progress(&ProgressEvent::discovery(Path::new("public"), 2));
        console.on_progress(&ProgressEvent::new(ProgressPhase::Converted));
        console.on_complete(&BatchStats::default());
        assert!(console.bar.is_hidden());
    }
}
