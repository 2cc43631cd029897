//! The `extract` command.

use std::path::Path;

use samlscope_core::har::{extract_from_har, filename_for};
use samlscope_core::ExtractedMessage;

use crate::error::{CliError, CliResult};
use crate::output::{format_xml, success, truncate_url};

/// Extracts every SAML message from a HAR file into per-message XML files,
/// or lists the findings without writing.
pub fn run_extract(file: &str, dir: &str, list: bool) -> CliResult<()> {
    let data = std::fs::read(file)
        .map_err(|e| CliError::Input(format!("failed to read {file}: {e}")))?;

    let results = extract_from_har(&data)?;

    if results.is_empty() {
        println!("No SAML messages found in the HAR file.");
        return Ok(());
    }

    if list {
        list_results(&results);
        return Ok(());
    }

    save_results(&results, dir)
}

fn list_results(results: &[ExtractedMessage]) {
    println!("Found {} SAML message(s):\n", results.len());

    for extracted in results {
        println!("  [{}] {}", extracted.index, extracted.kind);
        println!("      Source: {}", extracted.source);
        if !extracted.parameter.is_empty() {
            println!("      Parameter: {}", extracted.parameter);
        }
        println!("      URL: {}", truncate_url(&extracted.url, 60));
        if extracted.deflated {
            println!("      Encoding: base64 + deflate");
        } else {
            println!("      Encoding: base64");
        }
        println!();
    }
}

fn save_results(results: &[ExtractedMessage], dir: &str) -> CliResult<()> {
    std::fs::create_dir_all(dir)?;

    println!("Extracting {} SAML message(s) to {dir}:\n", results.len());

    for extracted in results {
        let filename = filename_for(extracted);
        let path = Path::new(dir).join(&filename);
        std::fs::write(&path, format_xml(&extracted.xml))?;

        println!("  [{}] {} -> {filename}", extracted.index, extracted.kind);
        if extracted.parameter.is_empty() {
            println!("      Source: {}", extracted.source);
        } else {
            println!("      Source: {} ({})", extracted.source, extracted.parameter);
        }
    }

    println!();
    success(&format!("wrote {} file(s)", results.len()));
    Ok(())
}
