//! CLI argument parsing.

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// samlscope - SAML 2.0 traffic inspector.
#[derive(Debug, Parser)]
#[command(name = "samlscope")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format.
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub output: OutputFormat,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode a base64-encoded SAML message and print the XML.
    ///
    /// Input priority: -f file, positional argument, stdin. Use --deflate
    /// for HTTP-Redirect binding payloads.
    Decode {
        /// Base64-encoded SAML message.
        input: Option<String>,

        /// Read the encoded message from a file instead.
        #[arg(short, long)]
        file: Option<String>,

        /// Apply DEFLATE decompression after base64 decoding.
        #[arg(long)]
        deflate: bool,
    },

    /// Inspect a SAML message or HAR capture and display its details.
    ///
    /// HAR files are detected automatically (by .har extension or content)
    /// and every embedded SAML message is shown in capture order. Encoded
    /// input is decoded automatically.
    Inspect {
        /// Read input from a file (XML, base64, or HAR).
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Extract every SAML message from a HAR capture to XML files.
    Extract {
        /// HAR file to scan.
        #[arg(short, long)]
        file: String,

        /// Output directory for extracted files.
        #[arg(short, long, default_value = ".")]
        dir: String,

        /// List findings without writing files.
        #[arg(long)]
        list: bool,
    },
}
