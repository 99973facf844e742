//! WebP Batch Conversion CLI Tool
//!
//! Converts the JPEG and PNG images in a directory to WebP.

use clap::Parser;
use std::process::ExitCode;
use webp_batch::cli::{run, usage, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            if e.is_usage_error() {
                eprintln!();
                eprintln!("{}", usage());
            }
            ExitCode::FAILURE
        }
    }
}
