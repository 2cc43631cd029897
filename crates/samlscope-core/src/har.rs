//! Bulk extraction of SAML messages from HAR capture documents.
//!
//! A HAR file is scanned entry by entry in a fixed order: request query
//! parameters, then POST data, then the response body. Every candidate value
//! runs through the decode pipeline and the SAML acceptance gate; candidates
//! that fail anywhere are skipped silently. Accepted messages get a single
//! document-wide 1-based index in traversal order.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::decode;
use crate::detect;
use crate::error::{SamlError, SamlResult};
use crate::model::{ExtractedMessage, SourceKind};

// ---------------------------------------------------------------------------
// HAR document model
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Har {
    log: HarLog,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HarLog {
    entries: Vec<HarEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HarEntry {
    request: HarRequest,
    response: HarResponse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HarRequest {
    url: String,
    query_string: Vec<HarNameValue>,
    post_data: Option<HarPostData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HarResponse {
    content: HarContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HarPostData {
    mime_type: String,
    text: String,
    params: Vec<HarNameValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HarContent {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HarNameValue {
    name: String,
    value: String,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Parameter names that carry SAML payloads, compared case-insensitively.
const SAML_PARAMETERS: &[&str] = &[
    "samlresponse",
    "samlrequest",
    "samlassertion",
    "samlart",
    "logoutrequest",
    "logoutresponse",
];

/// Hidden form inputs carrying SAML, name attribute before value.
static HIDDEN_INPUT_NAME_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<input[^>]*name=["']?(SAMLResponse|SAMLRequest|SAMLAssertion)["']?[^>]*value=["']([^"']+)["']"#,
    )
    .expect("hidden input regex is valid")
});

/// Hidden form inputs carrying SAML, value attribute before name.
static HIDDEN_INPUT_VALUE_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<input[^>]*value=["']([^"']+)["'][^>]*name=["']?(SAMLResponse|SAMLRequest|SAMLAssertion)["']?"#,
    )
    .expect("hidden input regex is valid")
});

/// Extracts every SAML message embedded in a HAR capture document.
///
/// Output order equals document traversal order and indices run exactly
/// `1..=N`. A document with no SAML in it yields an empty vector, not an
/// error; only an unreadable document fails.
pub fn extract_from_har(data: &[u8]) -> SamlResult<Vec<ExtractedMessage>> {
    let har: Har = serde_json::from_slice(data)
        .map_err(|e| SamlError::UnsupportedDocument(e.to_string()))?;

    let mut scanner = Scanner::new();
    for entry in &har.log.entries {
        scanner.scan_query(&entry.request);
        if let Some(post_data) = &entry.request.post_data {
            scanner.scan_post_data(post_data, &entry.request.url);
        }
        scanner.scan_response_body(&entry.response.content, &entry.request.url);
    }

    Ok(scanner.results)
}

/// Extracts a single SAML message from a raw encoded value.
///
/// Unlike the opportunistic HAR scan, failures here are surfaced: the caller
/// handed over exactly one candidate and wants to know why it was rejected.
pub fn extract_from_base64(value: &str) -> SamlResult<ExtractedMessage> {
    let xml = decode::decode(value)?;

    let (xml, deflated) = if looks_like_xml(&xml) {
        (xml, false)
    } else {
        (decode::decode_deflate(value)?, true)
    };

    let content = String::from_utf8_lossy(&xml);
    if !detect::is_saml(&content) {
        return Err(SamlError::NotSaml);
    }
    let kind = detect::detect_kind(&content);
    drop(content);

    Ok(ExtractedMessage {
        index: 1,
        kind,
        source: SourceKind::DirectInput,
        url: String::new(),
        parameter: String::new(),
        raw_value: value.to_string(),
        xml,
        deflated,
    })
}

/// Deterministic output filename for an extracted message:
/// `saml_<index 3-digit>_<kind>_<source>.xml`.
#[must_use]
pub fn filename_for(extracted: &ExtractedMessage) -> String {
    let kind = extracted
        .kind
        .as_str()
        .to_lowercase()
        .replace(' ', "_");
    let source = extracted.source.as_str().replace('-', "_");
    format!("saml_{:03}_{}_{}.xml", extracted.index, kind, source)
}

/// One extraction run over a single document. Owns the document-wide index
/// counter, so indices stay monotonic across entries and sources.
struct Scanner {
    next_index: u32,
    results: Vec<ExtractedMessage>,
}

impl Scanner {
    fn new() -> Self {
        Self {
            next_index: 1,
            results: Vec::new(),
        }
    }

    /// Query parameters from both the URL itself and the HAR queryString
    /// array (captures do not always populate both).
    fn scan_query(&mut self, request: &HarRequest) {
        if let Ok(parsed) = url::Url::parse(&request.url) {
            // query_pairs iterates in document order, keeping runs stable.
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            for (name, value) in pairs {
                if is_saml_parameter(&name) {
                    self.try_extract(&value, &name, &request.url, SourceKind::RequestQuery);
                }
            }
        }

        for param in &request.query_string {
            if is_saml_parameter(&param.name) {
                self.try_extract(&param.value, &param.name, &request.url, SourceKind::RequestQuery);
            }
        }
    }

    fn scan_post_data(&mut self, post_data: &HarPostData, request_url: &str) {
        for param in &post_data.params {
            if is_saml_parameter(&param.name) {
                self.try_extract(&param.value, &param.name, request_url, SourceKind::RequestBody);
            }
        }

        if post_data.mime_type.contains("application/x-www-form-urlencoded") {
            let pairs: Vec<(String, String)> = url::form_urlencoded::parse(post_data.text.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            for (name, value) in pairs {
                if is_saml_parameter(&name) {
                    self.try_extract(&value, &name, request_url, SourceKind::RequestBody);
                }
            }
        }

        // Raw body fallback: some clients post the bare encoded blob.
        self.try_extract(&post_data.text, "", request_url, SourceKind::RequestBody);
    }

    fn scan_response_body(&mut self, content: &HarContent, request_url: &str) {
        if content.text.is_empty() {
            return;
        }

        for (name, value) in hidden_form_fields(&content.text) {
            self.try_extract(&value, &name, request_url, SourceKind::ResponseBody);
        }

        // Raw fallback for responses that are the encoded blob itself.
        self.try_extract(&content.text, "", request_url, SourceKind::ResponseBody);
    }

    /// Runs one candidate through the decode pipeline and the acceptance
    /// gate. Rejection is silent; acceptance consumes the next index.
    fn try_extract(&mut self, value: &str, parameter: &str, url: &str, source: SourceKind) {
        if value.is_empty() {
            return;
        }

        // Values lifted from HTML or query strings may still be
        // percent-encoded once.
        let value = match urlencoding::decode(value) {
            Ok(unescaped) if unescaped != value => unescaped.into_owned(),
            _ => value.to_string(),
        };

        let decoded = match decode::decode(&value) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::debug!(%source, parameter, %err, "candidate is not base64");
                return;
            }
        };

        let (xml, deflated) = if looks_like_xml(&decoded) {
            (decoded, false)
        } else {
            match decode::decode_deflate(&value) {
                Ok(inflated) => (inflated, true),
                Err(err) => {
                    tracing::debug!(%source, parameter, %err, "candidate did not inflate to XML");
                    return;
                }
            }
        };

        let content = String::from_utf8_lossy(&xml);
        if !detect::is_saml(&content) {
            tracing::debug!(%source, parameter, "decoded candidate carries no SAML indicator");
            return;
        }
        let kind = detect::detect_kind(&content);
        drop(content);

        tracing::debug!(%source, parameter, %kind, index = self.next_index, "accepted SAML candidate");

        self.results.push(ExtractedMessage {
            index: self.next_index,
            kind,
            source,
            url: url.to_string(),
            parameter: parameter.to_string(),
            raw_value: value,
            xml,
            deflated,
        });
        self.next_index += 1;
    }
}

/// Hidden-input SAML fields of an HTML page, in match order, first
/// occurrence per parameter name winning.
fn hidden_form_fields(html: &str) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = Vec::new();

    let mut push = |name: &str, value: &str| {
        if !fields.iter().any(|(existing, _)| existing == name) {
            fields.push((name.to_string(), value.to_string()));
        }
    };

    for caps in HIDDEN_INPUT_NAME_FIRST.captures_iter(html) {
        push(&caps[1], &caps[2]);
    }
    for caps in HIDDEN_INPUT_VALUE_FIRST.captures_iter(html) {
        push(&caps[2], &caps[1]);
    }

    fields
}

fn is_saml_parameter(name: &str) -> bool {
    let lowered = name.to_lowercase();
    SAML_PARAMETERS.iter().any(|p| *p == lowered)
}

fn looks_like_xml(data: &[u8]) -> bool {
    data.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'<')
}
