use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cleandns::args::Cli;
use cleandns::error::ZoneError;
use cleandns::{persist, transform};

fn run_pipeline(path: &Path) -> Result<(), ZoneError> {
    let mut zone = persist::load(path)?;
    transform::remove_duplicates(&mut zone);
    transform::sort(&mut zone);
    persist::save(&mut zone, path)
}

/// Process one zone file end to end. Returns whether it succeeded; a
/// failure never aborts the remaining files.
fn process_file(path: &Path) -> bool {
    if !path.is_file() {
        warn!("skipping {}: not a regular file", path.display());
        return false;
    }
    match run_pipeline(path) {
        Ok(()) => {
            info!("successfully processed {}", path.display());
            true
        }
        Err(e) => {
            error!("failed to process {}: {e}", path.display());
            false
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .without_time()
        .init();

    let cli = Cli::parse();
    if cli.keep_comments {
        warn!("--keep-comments is accepted but comments are currently dropped");
    }

    let files = match cli.resolve_files() {
        Ok(files) => files,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    if files.is_empty() {
        warn!("no files to process");
        return ExitCode::SUCCESS;
    }

    let mut has_error = false;
    for path in &files {
        if !process_file(path) {
            has_error = true;
        }
    }
    if has_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
