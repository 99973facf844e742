//! Batch conversion of a directory.
//!
//! Files are processed one at a time in path order. Each one ends up
//! converted, skipped (its `.webp` already exists) or failed; a failure never
//! stops the batch.
//!
//! # Example
//!
//! ```rust,ignore
//! use webp_batch::batch::BatchConverter;
//! use webp_batch::config::ConversionSettings;
//! use webp_batch::progress::CallbackProgress;
//! use std::path::Path;
//!
//! let progress = CallbackProgress::new(|event| println!("{}", event));
//! let batch = BatchConverter::new(ConversionSettings::default(), progress);
//!
//! let report = batch.process_directory(Path::new("./public"))?;
//! println!("{} converted, {} failed", report.stats.successful, report.stats.failed);
//! ```

mod file_discovery;
mod job;

pub use file_discovery::FileDiscovery;
pub use job::{BatchJob, JobResult, JobStatus};

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::codec::{Codec, WebpCodec};
use crate::config::ConversionSettings;
use crate::error::{ConvertError, Result};
use crate::pipeline::{BatchStats, Converter};
use crate::progress::{ProgressEvent, ProgressHandler, ProgressPhase};

/// Outcome of a batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// Directory that was scanned.
    pub directory: PathBuf,
    /// Aggregate counters.
    pub stats: BatchStats,
    /// Per-file results in processing order.
    pub jobs: Vec<JobResult>,
}

impl BatchReport {
    /// Results with the given status.
    pub fn with_status(&self, status: JobStatus) -> impl Iterator<Item = &JobResult> {
        self.jobs.iter().filter(move |j| j.status() == status)
    }
}

/// Sequential batch converter.
pub struct BatchConverter<P: ProgressHandler, C: Codec = WebpCodec> {
    /// Single-file converter.
    converter: Converter<C>,

    /// Progress handler.
    progress: P,
}

impl<P: ProgressHandler> BatchConverter<P, WebpCodec> {
    /// Create a batch converter backed by libwebp.
    pub fn new(settings: ConversionSettings, progress: P) -> Self {
        Self::with_converter(Converter::new(settings), progress)
    }
}

impl<P: ProgressHandler, C: Codec> BatchConverter<P, C> {
    /// Create a batch converter around an existing converter.
    pub fn with_converter(converter: Converter<C>, progress: P) -> Self {
        Self {
            converter,
            progress,
        }
    }

    /// The single-file converter.
    pub fn converter(&self) -> &Converter<C> {
        &self.converter
    }

    /// Discover the files this batch would process.
    pub fn discover(&self, dir: &Path) -> Result<Vec<BatchJob>> {
        let files = FileDiscovery::new()
            .extensions(self.converter.settings().extensions.clone())
            .discover(dir)?;

        Ok(files
            .into_iter()
            .enumerate()
            .map(|(id, path)| BatchJob::new(id, path))
            .collect())
    }

    /// Convert every eligible image directly inside `dir`.
    ///
    /// Only a missing or unreadable directory is an error; per-file failures
    /// are counted and reported through the progress handler.
    pub fn process_directory(&self, dir: &Path) -> Result<BatchReport> {
        let jobs = self.discover(dir)?;
        log::info!("Found {} image(s) in {}", jobs.len(), dir.display());

        self.progress
            .on_progress(&ProgressEvent::discovery(dir, jobs.len()));

        let (stats, results) = self.process_jobs(jobs);

        Ok(BatchReport {
            directory: dir.to_path_buf(),
            stats,
            jobs: results,
        })
    }

    /// Process already-discovered jobs in order.
    pub fn process_jobs(&self, jobs: Vec<BatchJob>) -> (BatchStats, Vec<JobResult>) {
        let start = Instant::now();
        let total = jobs.len();

        let mut stats = BatchStats {
            discovered: total,
            ..Default::default()
        };
        let mut results = Vec::with_capacity(total);

        for (idx, job) in jobs.into_iter().enumerate() {
            let result = self.process_job(job, idx, total);
            debug_assert!(result.status().is_terminal());

            match result.status() {
                JobStatus::Converted => {
                    stats.successful += 1;
                    stats.total_webp_bytes += result.webp_size().unwrap_or(0);
                }
                JobStatus::Failed => stats.failed += 1,
                JobStatus::Skipped => stats.skipped += 1,
                JobStatus::Pending => {}
            }
            stats.total_original_bytes += result.original_size.unwrap_or(0);

            results.push(result);
        }

        stats.total_time_ms = start.elapsed().as_millis() as u64;
        log::info!(
            "Batch done: {} converted, {} failed, {} skipped",
            stats.successful,
            stats.failed,
            stats.skipped
        );

        self.progress.on_progress(&ProgressEvent::complete(&stats));
        self.progress.on_complete(&stats);

        (stats, results)
    }

    /// Process a single job. Never fails; errors are captured in the result.
    fn process_job(&self, job: BatchJob, idx: usize, total: usize) -> JobResult {
        if job.output_exists() {
            log::debug!("Skipping {} (WebP already exists)", job.source_path.display());
            self.progress.on_progress(
                &ProgressEvent::skipped(&job.source_path, &job.output_path)
                    .with_batch_progress(idx + 1, total),
            );
            return JobResult::skipped(job);
        }

        let original_size = match std::fs::metadata(&job.source_path) {
            Ok(m) => m.len(),
            Err(e) => return self.fail(job, e.into(), None, idx, total),
        };

        let quality = self.converter.quality_for(&job.source_path);
        if quality.adjusted && !self.converter.settings().lossless {
            log::debug!(
                "Lowering quality from {} to {} for JPEG source {}",
                quality.requested,
                quality.effective,
                job.source_path.display()
            );
        }
        self.progress.on_progress(
            &ProgressEvent::converting(&job.source_path, quality).with_batch_progress(idx, total),
        );

        match self.converter.convert_file(&job.source_path) {
            Ok(result) => {
                self.progress.on_converted(&result);
                self.progress.on_progress(&ProgressEvent {
                    phase: ProgressPhase::Converted,
                    current_file: Some(job.source_path.clone()),
                    message: format!(
                        "Converted {} ({:.1}% smaller)",
                        job.file_name(),
                        result.reduction_percent()
                    ),
                    ..Default::default()
                }
                .with_batch_progress(idx + 1, total));
                JobResult::converted(job, result)
            }
            Err(e) => self.fail(job, e, Some(original_size), idx, total),
        }
    }

    fn fail(
        &self,
        job: BatchJob,
        error: ConvertError,
        original_size: Option<u64>,
        idx: usize,
        total: usize,
    ) -> JobResult {
        log::debug!("Failed to convert {}: {}", job.source_path.display(), error);
        self.progress.on_error(&error, Some(&job.source_path));
        self.progress.on_progress(&ProgressEvent {
            phase: ProgressPhase::Failed,
            current_file: Some(job.source_path.clone()),
            message: format!("Error converting {}: {}", job.file_name(), error),
            ..Default::default()
        }
        .with_batch_progress(idx + 1, total));
        JobResult::failed(job, error, original_size)
    }
}
