//! Command implementations for CLI tools.
//!
//! Each module contains the full implementation for a command,
//! which can be invoked by thin wrapper binaries.

pub mod completions;
pub mod extract_cmd;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Send logs to stderr, keeping stdout for results.
///
/// `RUST_LOG` wins when set; otherwise `verbose` shows debug output and
/// `quiet` shows errors only.
pub fn init_tracing(verbose: bool, quiet: bool) {
    let level = if quiet {
        LevelFilter::ERROR
    } else if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}
