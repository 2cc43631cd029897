//! # samlscope-cli
//!
//! Command-line inspector for SAML assertions and traffic captures.
//!
//! This crate provides the `samlscope` binary:
//! - `decode` - base64/DEFLATE decoding of encoded SAML blobs
//! - `inspect` - structured display of SAML messages, with HAR auto-detection
//! - `extract` - bulk extraction of SAML messages from HAR captures

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod input;
pub mod output;

pub use cli::Cli;
pub use error::{CliError, CliResult};
