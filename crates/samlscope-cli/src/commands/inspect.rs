//! The `inspect` command.

use samlscope_core::{decode, decrypt, har, parse, ExtractedMessage};

use crate::error::CliResult;
use crate::input::read_input;
use crate::output::{format_message, truncate_url, warning, OutputFormat};

/// Inspects a SAML message or a HAR capture.
///
/// HAR input is detected automatically and every embedded message is shown
/// in capture order with a provenance banner. Encoded single-message input
/// is decoded first; encrypted responses degrade to a partial record with a
/// warning.
pub fn run_inspect(file: Option<&str>, format: OutputFormat) -> CliResult<()> {
    let input = read_input(file, None)?;

    if is_har_input(file, &input) {
        inspect_har(input.as_bytes(), format)
    } else {
        inspect_message(&input, format)
    }
}

/// HAR detection: `.har` file extension, or JSON content mentioning the
/// `log`/`entries` structure.
fn is_har_input(filename: Option<&str>, content: &str) -> bool {
    if let Some(name) = filename {
        if name.to_lowercase().ends_with(".har") {
            return true;
        }
    }

    let trimmed = content.trim_start();
    trimmed.starts_with('{') && trimmed.contains("\"log\"") && trimmed.contains("\"entries\"")
}

fn inspect_har(data: &[u8], format: OutputFormat) -> CliResult<()> {
    let results = har::extract_from_har(data)?;

    if results.is_empty() {
        println!("No SAML messages found in the HAR file.");
        return Ok(());
    }

    println!("Found {} SAML message(s) in HAR file:\n", results.len());

    for (i, extracted) in results.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_banner(extracted, i + 1, results.len());
        show_message(&extracted.xml, format);
    }

    Ok(())
}

fn print_banner(extracted: &ExtractedMessage, position: usize, total: usize) {
    println!("{}", "━".repeat(63));
    println!(
        " [{position}/{total}] {} from {}",
        extracted.kind, extracted.source
    );
    if !extracted.parameter.is_empty() {
        println!("       Parameter: {}", extracted.parameter);
    }
    println!("       URL: {}", truncate_url(&extracted.url, 70));
    println!("{}\n", "━".repeat(63));
}

/// Parses and prints one message, degrading per message rather than
/// aborting the whole listing.
fn show_message(xml: &[u8], format: OutputFormat) {
    let result = if decrypt::is_encrypted(xml) {
        warning("Encrypted assertion detected - showing response-level fields only");
        parse::parse_partial(xml)
    } else {
        parse::parse(xml)
    };

    match result {
        Ok(info) => match format_message(&info, xml, format) {
            Ok(formatted) => print!("{formatted}"),
            Err(err) => warning(&format!("failed to format message: {err}")),
        },
        Err(err) => warning(&format!("failed to parse message: {err}")),
    }
}

fn inspect_message(input: &str, format: OutputFormat) -> CliResult<()> {
    let decoded = decode::smart_decode(input)?;
    let xml = decoded.bytes;

    let info = if decrypt::is_encrypted(&xml) {
        warning("Encrypted assertion detected - showing response-level fields only");
        parse::parse_partial(&xml)?
    } else {
        parse::parse(&xml)?
    };

    print!("{}", format_message(&info, &xml, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn har_detection_by_extension_and_content() {
        assert!(is_har_input(Some("session.har"), ""));
        assert!(is_har_input(Some("SESSION.HAR"), ""));
        assert!(is_har_input(None, r#"{"log":{"entries":[]}}"#));
        assert!(!is_har_input(Some("assertion.xml"), "<samlp:Response/>"));
        assert!(!is_har_input(None, r#"{"unrelated": true}"#));
    }
}
