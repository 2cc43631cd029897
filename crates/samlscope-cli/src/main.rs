//! # samlscope
//!
//! Command-line inspector for SAML 2.0 traffic.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![allow(clippy::uninlined_format_args)]

use clap::Parser;
use samlscope_cli::{
    cli::{Cli, Command},
    commands::{run_decode, run_extract, run_inspect},
    output::error,
};
use tracing_subscriber::prelude::*;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(format = ?cli.output, "samlscope starting");

    let result = match cli.command {
        Command::Decode {
            input,
            file,
            deflate,
        } => run_decode(input.as_deref(), file.as_deref(), deflate, cli.output),
        Command::Inspect { file } => run_inspect(file.as_deref(), cli.output),
        Command::Extract { file, dir, list } => run_extract(&file, &dir, list),
    };

    if let Err(e) = result {
        error(&e.to_string());
        std::process::exit(1);
    }
}
