//! # Main — Entry Point
//!
//! Parses the command line and dispatches to [`cli::run`]. Diagnostics go
//! to stderr through `tracing` (enable with `RUST_LOG=debug`); program
//! output stays on stdout.

mod cli;

use anyhow::Result;
use clap::Parser;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = cli::Args::parse();
    cli::run(args)
}
