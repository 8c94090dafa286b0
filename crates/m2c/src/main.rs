//! m2c CLI - publish markdown documents as Confluence pages.
//!
//! Each markdown file with a `page_title` in its front matter becomes one
//! page. Pages whose `sha-` fingerprint label matches the file body are left
//! untouched.

mod error;
mod output;
mod sync;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use output::Output;
use sync::SyncArgs;

fn main() -> ExitCode {
    let args = SyncArgs::parse();
    let output = Output::new();

    // RUST_LOG wins over --log-level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.execute(&output) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
