//! Progress reporting for batch conversion.
//!
//! The batch driver never prints; it emits events through a
//! [`ProgressHandler`]. The CLI installs a console handler, tests install
//! callbacks.
//!
//! # Example
//!
//! ```rust,ignore
//! use webp_batch::progress::{CallbackProgress, ProgressPhase};
//!
//! let progress = CallbackProgress::new(|event| {
//!     if event.phase == ProgressPhase::Skipped {
//!         println!("{}", event.message);
//!     }
//! });
//!
//! let batch = BatchConverter::new(settings, progress);
//! ```

mod callback;
mod handler;

pub use callback::CallbackProgress;
pub use handler::{NullProgress, ProgressEvent, ProgressHandler, ProgressPhase};
