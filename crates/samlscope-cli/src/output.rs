//! Output formatting utilities.

use std::fmt::Write as _;

use clap::ValueEnum;
use colored::Colorize;
use quick_xml::events::Event;
use samlscope_core::MessageInfo;

use crate::error::CliResult;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, sectioned human-readable rendering.
    Pretty,
    /// Pretty-printed JSON record.
    Json,
    /// Indented XML of the decoded document.
    Xml,
}

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Pretty-prints an XML document with two-space indentation.
///
/// Content that does not survive a reader/writer round trip (non-XML,
/// binary) is returned as-is, lossily converted to UTF-8.
pub fn format_xml(data: &[u8]) -> String {
    let raw = String::from_utf8_lossy(data);

    let mut reader = quick_xml::Reader::from_str(&raw);
    reader.config_mut().trim_text(true);
    let mut writer = quick_xml::Writer::new_with_indent(Vec::new(), b' ', 2);

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => {
                if writer.write_event(event).is_err() {
                    return raw.into_owned();
                }
            }
            Err(_) => return raw.into_owned(),
        }
    }

    match String::from_utf8(writer.into_inner()) {
        Ok(formatted) if !formatted.is_empty() => formatted,
        _ => raw.into_owned(),
    }
}

/// Formats a parsed message record.
///
/// `raw_xml` backs the XML output format, which shows the document itself
/// rather than the derived record.
pub fn format_message(
    info: &MessageInfo,
    raw_xml: &[u8],
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Pretty => Ok(render_pretty(info)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(info)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Xml => {
            let mut xml = format_xml(raw_xml);
            if !xml.ends_with('\n') {
                xml.push('\n');
            }
            Ok(xml)
        }
    }
}

const HEAVY_RULE: &str =
    "═══════════════════════════════════════════════════════════════";
const LIGHT_RULE: &str =
    "───────────────────────────────────────────────────────────────";

/// Renders a record as a colored, sectioned report.
#[must_use]
pub fn render_pretty(info: &MessageInfo) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", HEAVY_RULE.cyan().bold());
    let _ = writeln!(out, "{}", format!(" SAML {}", info.type_label()).cyan().bold());
    let _ = writeln!(out, "{}\n", HEAVY_RULE.cyan().bold());

    section(&mut out, "Basic Information");
    field_opt(&mut out, "ID", info.id.as_deref());
    field_opt(&mut out, "Issuer", info.issuer.as_deref());
    if let Some(instant) = &info.issue_instant {
        field(&mut out, "Issue Instant", &instant.to_rfc3339());
    }
    field_opt(&mut out, "Destination", info.destination.as_deref());
    field_opt(&mut out, "In Response To", info.in_response_to.as_deref());
    out.push('\n');

    if let Some(status) = &info.status {
        section(&mut out, "Status");
        let code = if status.status_code == "Success" {
            status.status_code.green().to_string()
        } else {
            status.status_code.red().to_string()
        };
        field(&mut out, "Status Code", &code);
        field_opt(&mut out, "Message", status.status_message.as_deref());
        out.push('\n');
    }

    if let Some(acs_url) = &info.assertion_consumer_service_url {
        section(&mut out, "Request Details");
        field(&mut out, "ACS URL", acs_url);
        if let Some(binding) = &info.protocol_binding {
            field(&mut out, "Protocol Binding", shorten_uri(binding));
        }
        if let Some(force_authn) = info.force_authn {
            field(&mut out, "Force Authn", &force_authn.to_string());
        }
        if let Some(is_passive) = info.is_passive {
            field(&mut out, "Is Passive", &is_passive.to_string());
        }
        out.push('\n');
    }

    if let Some(policy) = &info.name_id_policy {
        section(&mut out, "NameID Policy");
        if let Some(format) = &policy.format {
            field(&mut out, "Format", shorten_uri(format));
        }
        if let Some(allow_create) = policy.allow_create {
            field(&mut out, "Allow Create", &allow_create.to_string());
        }
        field_opt(&mut out, "SP Name Qualifier", policy.sp_name_qualifier.as_deref());
        out.push('\n');
    }

    if !info.requested_attributes.is_empty() {
        section(&mut out, "Requested Attributes");
        for attr in &info.requested_attributes {
            let label = attr
                .friendly_name
                .clone()
                .unwrap_or_else(|| shorten_uri(&attr.name).to_string());
            let required = if attr.is_required == Some(true) {
                " (required)"
            } else {
                ""
            };
            field(&mut out, &label, &format!("{}{required}", shorten_uri(&attr.name)));
        }
        out.push('\n');
    }

    if let Some(subject) = &info.subject {
        section(&mut out, "Subject");
        field_opt(&mut out, "NameID", subject.name_id.as_deref());
        if let Some(format) = &subject.name_id_format {
            field(&mut out, "Format", shorten_uri(format));
        }
        field_opt(&mut out, "SP Name Qualifier", subject.sp_name_qualifier.as_deref());
        out.push('\n');
    }

    if let Some(conditions) = &info.conditions {
        section(&mut out, "Conditions");
        if let Some(not_before) = &conditions.not_before {
            field(&mut out, "Not Before", &not_before.to_rfc3339());
        }
        if let Some(not_on_or_after) = &conditions.not_on_or_after {
            field(&mut out, "Not On Or After", &not_on_or_after.to_rfc3339());
        }
        if !conditions.audience_restriction.is_empty() {
            field(&mut out, "Audiences", &conditions.audience_restriction.join(", "));
        }
        out.push('\n');
    }

    if let Some(stmt) = &info.authn_statement {
        section(&mut out, "Authentication");
        if let Some(instant) = &stmt.authn_instant {
            field(&mut out, "Auth Instant", &instant.to_rfc3339());
        }
        field_opt(&mut out, "Session Index", stmt.session_index.as_deref());
        if let Some(class_ref) = &stmt.authn_context_class_ref {
            field(&mut out, "Auth Context", shorten_uri(class_ref));
        }
        out.push('\n');
    }

    if !info.attributes.is_empty() {
        section(&mut out, "Attributes");
        for attr in &info.attributes {
            let label = match &attr.friendly_name {
                Some(friendly) => format!("{friendly} ({})", shorten_uri(&attr.name)),
                None => attr.name.clone(),
            };
            field(&mut out, &label, &attr.values.join(", "));
        }
        out.push('\n');
    }

    if let Some(sig) = &info.signature {
        section(&mut out, "Signature");
        if sig.signed {
            field(&mut out, "Signed", &"Yes".green().to_string());
        } else {
            field(&mut out, "Signed", &"No".red().to_string());
        }
        if let Some(method) = &sig.signature_method {
            field(&mut out, "Signature Method", shorten_uri(method));
        }
        if let Some(method) = &sig.digest_method {
            field(&mut out, "Digest Method", shorten_uri(method));
        }
        if let Some(cert) = &sig.certificate_info {
            out.push('\n');
            field(&mut out, "Cert Subject", &cert.subject);
            field(&mut out, "Cert Issuer", &cert.issuer);
            if let Some(not_before) = &cert.not_before {
                field(&mut out, "Cert Valid From", &not_before.to_rfc3339());
            }
            if let Some(not_after) = &cert.not_after {
                field(&mut out, "Cert Valid Until", &not_after.to_rfc3339());
            }
            field(&mut out, "Cert Serial", &cert.serial);
        }
        out.push('\n');
    }

    if let Some(assertion) = &info.assertion {
        let _ = writeln!(out, "{}", LIGHT_RULE.cyan().bold());
        let _ = writeln!(out, "{}", " Embedded Assertion".cyan().bold());
        let _ = writeln!(out, "{}", LIGHT_RULE.cyan().bold());
        out.push_str(&render_pretty(assertion));
    }

    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", format!("▸ {title}").cyan().bold());
}

fn field(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "  {} {value}", format!("{label}:").yellow());
}

fn field_opt(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        field(out, label, value);
    }
}

/// URI prefixes that are noise in terminal output.
const SHORTENED_PREFIXES: &[&str] = &[
    "urn:oasis:names:tc:SAML:2.0:nameid-format:",
    "urn:oasis:names:tc:SAML:1.1:nameid-format:",
    "urn:oasis:names:tc:SAML:2.0:ac:classes:",
    "urn:oasis:names:tc:SAML:2.0:attrname-format:",
    "http://www.w3.org/2001/04/xmldsig-more#",
    "http://www.w3.org/2000/09/xmldsig#",
    "http://www.w3.org/2001/04/xmlenc#",
];

/// Strips well-known SAML URI prefixes for readability.
#[must_use]
pub fn shorten_uri(uri: &str) -> &str {
    for prefix in SHORTENED_PREFIXES {
        if let Some(rest) = uri.strip_prefix(prefix) {
            return rest;
        }
    }
    uri
}

/// Truncates a URL for single-line display, counting characters rather than
/// bytes so multibyte IRIs never split mid-character.
#[must_use]
pub fn truncate_url(url: &str, max_len: usize) -> String {
    if url.chars().count() <= max_len {
        return url.to_string();
    }
    let kept: String = url.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
}
