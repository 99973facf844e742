//! Progress handler trait and related types.

use std::path::{Path, PathBuf};

use crate::config::QualityDecision;
use crate::error::ConvertError;
use crate::pipeline::{BatchStats, ConversionResult};

/// Phase of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    /// Files have been discovered.
    Discovery,
    /// A file is about to be converted.
    Converting,
    /// A file was converted.
    Converted,
    /// A file was skipped because its output already exists.
    Skipped,
    /// A file failed to convert.
    Failed,
    /// The batch finished.
    Complete,
}

impl ProgressPhase {
    /// Get a human-readable description of the phase.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Discovery => "Discovering files",
            Self::Converting => "Converting",
            Self::Converted => "Converted",
            Self::Skipped => "Skipped",
            Self::Failed => "Failed",
            Self::Complete => "Complete",
        }
    }
}

impl std::fmt::Display for ProgressPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Progress event emitted during a batch run.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Current phase.
    pub phase: ProgressPhase,

    /// File being processed, or the scanned directory for discovery.
    pub current_file: Option<PathBuf>,

    /// Total files in the batch (once known).
    pub total_files: Option<usize>,

    /// Number of files finished so far.
    pub completed_files: usize,

    /// Quality decision for the file being converted.
    pub quality: Option<QualityDecision>,

    /// Status message.
    pub message: String,
}

impl Default for ProgressEvent {
    fn default() -> Self {
        Self {
            phase: ProgressPhase::Discovery,
            current_file: None,
            total_files: None,
            completed_files: 0,
            quality: None,
            message: String::new(),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

impl ProgressEvent {
    /// Create a new progress event for a specific phase.
    pub fn new(phase: ProgressPhase) -> Self {
        Self {
            phase,
            message: phase.description().into(),
            ..Default::default()
        }
    }

    /// Discovery finished in `dir` with `total` matching files.
    pub fn discovery(dir: &Path, total: usize) -> Self {
        Self {
            phase: ProgressPhase::Discovery,
            current_file: Some(dir.to_path_buf()),
            total_files: Some(total),
            message: format!("Found {} image(s) in {}", total, dir.display()),
            ..Default::default()
        }
    }

    /// A file is about to be converted with the given quality.
    pub fn converting(file: &Path, quality: QualityDecision) -> Self {
        Self {
            phase: ProgressPhase::Converting,
            current_file: Some(file.to_path_buf()),
            quality: Some(quality),
            message: format!("Converting {}", file_name(file)),
            ..Default::default()
        }
    }

    /// A file was skipped because `existing` is already there.
    pub fn skipped(file: &Path, existing: &Path) -> Self {
        Self {
            phase: ProgressPhase::Skipped,
            current_file: Some(file.to_path_buf()),
            message: format!(
                "Skipping {} ({} already exists)",
                file_name(file),
                file_name(existing)
            ),
            ..Default::default()
        }
    }

    /// The batch is done.
    pub fn complete(stats: &BatchStats) -> Self {
        Self {
            phase: ProgressPhase::Complete,
            total_files: Some(stats.discovered),
            completed_files: stats.discovered,
            message: format!(
                "Completed: {} converted, {} failed, {} skipped",
                stats.successful, stats.failed, stats.skipped
            ),
            ..Default::default()
        }
    }

    /// Set batch position.
    pub fn with_batch_progress(mut self, completed: usize, total: usize) -> Self {
        self.completed_files = completed;
        self.total_files = Some(total);
        self
    }

    /// File name of `current_file`, if any.
    pub fn file_name(&self) -> Option<String> {
        self.current_file.as_deref().map(file_name)
    }
}

impl std::fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(total) = self.total_files {
            write!(
                f,
                "[{}/{}] {}: {}",
                self.completed_files, total, self.phase, self.message
            )
        } else {
            write!(f, "{}: {}", self.phase, self.message)
        }
    }
}

/// Trait for receiving progress from a batch run.
///
/// # Example
///
/// ```rust,ignore
/// use webp_batch::progress::{ProgressHandler, ProgressEvent};
///
/// struct Printer;
///
/// impl ProgressHandler for Printer {
///     fn on_progress(&self, event: &ProgressEvent) {
///         println!("{}", event);
///     }
/// }
/// ```
pub trait ProgressHandler {
    /// Called for every progress event.
    fn on_progress(&self, event: &ProgressEvent);

    /// Called after a file converts successfully.
    fn on_converted(&self, result: &ConversionResult) {
        let _ = result;
    }

    /// Called when a file fails to convert.
    fn on_error(&self, error: &ConvertError, file: Option<&Path>) {
        let _ = (error, file);
    }

    /// Called once the batch has finished.
    fn on_complete(&self, stats: &BatchStats) {
        let _ = stats;
    }
}

impl<H: ProgressHandler + ?Sized> ProgressHandler for &H {
    fn on_progress(&self, event: &ProgressEvent) {
        (**self).on_progress(event)
    }

    fn on_converted(&self, result: &ConversionResult) {
        (**self).on_converted(result)
    }

    fn on_error(&self, error: &ConvertError, file: Option<&Path>) {
        (**self).on_error(error, file)
    }

    fn on_complete(&self, stats: &BatchStats) {
        (**self).on_complete(stats)
    }
}

/// A no-op progress handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressHandler for NullProgress {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
