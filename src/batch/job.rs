//! Batch job definitions.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::ConvertError;
use crate::pipeline::{webp_output_path, ConversionResult};

/// Status of a batch job.
///
/// Every job starts `Pending` and moves to exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Job is waiting to be processed.
    Pending,
    /// Output was written (or encoded, in dry-run mode).
    Converted,
    /// Output already existed; nothing was done.
    Skipped,
    /// Conversion failed.
    Failed,
}

impl JobStatus {
    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Converted => write!(f, "Converted"),
            Self::Skipped => write!(f, "Skipped"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// A single file in a batch.
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Position in discovery order.
    pub id: usize,

    /// Source file path.
    pub source_path: PathBuf,

    /// Expected output path.
    pub output_path: PathBuf,

    /// Current job status.
    pub status: JobStatus,
}

impl BatchJob {
    /// Create a pending job for `source_path`.
    pub fn new(id: usize, source_path: PathBuf) -> Self {
        let output_path = webp_output_path(&source_path);
        Self {
            id,
            source_path,
            output_path,
            status: JobStatus::Pending,
        }
    }

    /// Get the file name.
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Whether the output is already on disk.
    pub fn output_exists(&self) -> bool {
        self.output_path.exists()
    }
}

/// Result of a batch job.
#[derive(Debug)]
pub struct JobResult {
    /// The job that was processed.
    pub job: BatchJob,

    /// Conversion result (if converted).
    pub conversion: Option<ConversionResult>,

    /// Error (if failed).
    pub error: Option<ConvertError>,

    /// Source size counted toward the batch total (absent for skipped jobs).
    pub original_size: Option<u64>,
}

impl JobResult {
    /// A job that was skipped.
    pub fn skipped(mut job: BatchJob) -> Self {
        job.status = JobStatus::Skipped;
        Self {
            job,
            conversion: None,
            error: None,
            original_size: None,
        }
    }

    /// A job that converted.
    pub fn converted(mut job: BatchJob, result: ConversionResult) -> Self {
        job.status = JobStatus::Converted;
        Self {
            job,
            original_size: Some(result.original_size),
            conversion: Some(result),
            error: None,
        }
    }

    /// A job that failed.
    pub fn failed(mut job: BatchJob, error: ConvertError, original_size: Option<u64>) -> Self {
        job.status = JobStatus::Failed;
        Self {
            job,
            conversion: None,
            error: Some(error),
            original_size,
        }
    }

    /// Get the job status.
    pub fn status(&self) -> JobStatus {
        self.job.status
    }

    /// Get the WebP size if converted.
    pub fn webp_size(&self) -> Option<u64> {
        self.conversion.as_ref().map(|r| r.webp_size)
    }
}

impl std::fmt::Display for JobResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref result) = self.conversion {
            write!(
                f,
                "{}: {} ({:.1}% smaller, {}ms)",
                self.job.file_name(),
                self.status(),
                result.reduction_percent(),
                result.elapsed_ms
            )
        } else if let Some(ref error) = self.error {
            write!(f, "{}: {} - {}", self.job.file_name(), self.status(), error)
        } else {
            write!(f, "{}: {}", self.job.file_name(), self.status())
        }
    }
}
