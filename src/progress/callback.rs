//! Callback-based progress reporting.

use std::path::Path;

use crate::error::ConvertError;
use crate::pipeline::{BatchStats, ConversionResult};

use super::handler::{ProgressEvent, ProgressHandler};

type ErrorCallback = Box<dyn Fn(&ConvertError, Option<&Path>)>;
type ConvertedCallback = Box<dyn Fn(&ConversionResult)>;
type CompleteCallback = Box<dyn Fn(&BatchStats)>;

/// A progress handler that invokes callback functions.
///
/// # Example
///
/// ```rust,ignore
/// use webp_batch::progress::CallbackProgress;
///
/// let progress = CallbackProgress::new(|event| println!("{}", event))
///     .on_error(|err, file| eprintln!("{:?}: {}", file, err));
/// ```
pub struct CallbackProgress<F>
where
    F: Fn(ProgressEvent),
{
    /// Called on every progress event.
    callback: F,

    /// Called per successful file (optional).
    converted_callback: Option<ConvertedCallback>,

    /// Called per failed file (optional).
    error_callback: Option<ErrorCallback>,

    /// Called at the end of the batch (optional).
    complete_callback: Option<CompleteCallback>,
}

impl<F> CallbackProgress<F>
where
    F: Fn(ProgressEvent),
{
    /// Create a new callback progress handler.
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            converted_callback: None,
            error_callback: None,
            complete_callback: None,
        }
    }

    /// Set a per-file success callback.
    pub fn on_converted<C>(mut self, callback: C) -> Self
    where
        C: Fn(&ConversionResult) + 'static,
    {
        self.converted_callback = Some(Box::new(callback));
        self
    }

    /// Set an error callback.
    pub fn on_error<E>(mut self, callback: E) -> Self
    where
        E: Fn(&ConvertError, Option<&Path>) + 'static,
    {
        self.error_callback = Some(Box::new(callback));
        self
    }

    /// Set a completion callback.
    pub fn on_complete<C>(mut self, callback: C) -> Self
    where
        C: Fn(&BatchStats) + 'static,
    {
        self.complete_callback = Some(Box::new(callback));
        self
    }
}

impl<F> ProgressHandler for CallbackProgress<F>
where
    F: Fn(ProgressEvent),
{
    fn on_progress(&self, event: &ProgressEvent) {
        (self.callback)(event.clone());
    }

    fn on_converted(&self, result: &ConversionResult) {
        if let Some(ref callback) = self.converted_callback {
            callback(result);
        }
    }

    fn on_error(&self, error: &ConvertError, file: Option<&Path>) {
        if let Some(ref callback) = self.error_callback {
            callback(error, file);
        }
    }

    fn on_complete(&self, stats: &BatchStats) {
        if let Some(ref callback) = self.complete_callback {
            callback(stats);
        }
    }
}
