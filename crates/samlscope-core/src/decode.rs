//! Base64 and DEFLATE decoding of SAML messages.
//!
//! Real-world encoders disagree on the details: URL-safe versus standard
//! alphabets, stripped padding, values that went through URL encoding once
//! or twice. [`decode`] runs an ordered fallback chain so that any of those
//! variants comes out as the original bytes.

use std::io::{Read, Write};

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE};
use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::error::{SamlError, SamlResult};

/// Decodes a base64-encoded SAML message.
///
/// Interleaved whitespace (spaces, CR, LF) is stripped first. Strategies are
/// tried in order, first success wins: standard base64, URL-safe base64,
/// standard base64 with padding repair, and finally percent-decoding the
/// input (only when that changes it) followed by another standard /
/// padding-repair attempt.
pub fn decode(input: &str) -> SamlResult<Vec<u8>> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | ' '))
        .collect();

    if let Ok(decoded) = STANDARD.decode(&cleaned) {
        return Ok(decoded);
    }

    if let Ok(decoded) = URL_SAFE.decode(&cleaned) {
        return Ok(decoded);
    }

    if let Ok(decoded) = decode_with_padding_fix(&cleaned) {
        return Ok(decoded);
    }

    // Query-parameter values are often still percent-encoded at this point.
    if let Ok(unescaped) = urlencoding::decode(&cleaned) {
        if unescaped != cleaned {
            if let Ok(decoded) = STANDARD.decode(unescaped.as_ref()) {
                return Ok(decoded);
            }
            if let Ok(decoded) = decode_with_padding_fix(&unescaped) {
                return Ok(decoded);
            }
        }
    }

    Err(SamlError::MalformedEncoding)
}

/// Decodes a base64-encoded, DEFLATE-compressed SAML message.
///
/// This is the shape produced by the HTTP-Redirect binding.
pub fn decode_deflate(input: &str) -> SamlResult<Vec<u8>> {
    let decoded = decode(input)?;
    inflate(&decoded)
}

/// Attempts base64 decoding with automatic padding correction.
fn decode_with_padding_fix(input: &str) -> SamlResult<Vec<u8>> {
    let mut padded = input.to_string();
    match input.len() % 4 {
        2 => padded.push_str("=="),
        3 => padded.push('='),
        _ => {}
    }

    if let Ok(decoded) = STANDARD.decode(&padded) {
        return Ok(decoded);
    }

    STANDARD_NO_PAD
        .decode(input)
        .map_err(|_| SamlError::MalformedEncoding)
}

/// Inflates raw DEFLATE data (no zlib/gzip header).
pub(crate) fn inflate(data: &[u8]) -> SamlResult<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);
    let mut inflated = Vec::new();
    decoder
        .read_to_end(&mut inflated)
        .map_err(|e| SamlError::DecompressionFailed(e.to_string()))?;
    Ok(inflated)
}

/// Compresses data using raw DEFLATE. Counterpart of [`decode_deflate`],
/// mainly useful for producing test fixtures.
pub fn deflate(data: &[u8]) -> SamlResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| SamlError::DecompressionFailed(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| SamlError::DecompressionFailed(e.to_string()))
}

/// Encodes data as standard base64.
#[must_use]
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Compresses and base64-encodes data (HTTP-Redirect binding shape).
pub fn encode_deflate(data: &[u8]) -> SamlResult<String> {
    Ok(encode(&deflate(data)?))
}

/// Checks whether the input looks base64-encoded rather than raw XML.
///
/// This is a cheap lexical filter, not a decode attempt: it can accept
/// strings that still fail to decode.
#[must_use]
pub fn is_base64_encoded(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        return false;
    }

    trimmed
        .chars()
        .all(|c| is_base64_char(c) || matches!(c, '\n' | '\r' | ' '))
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=' | '-' | '_')
}

/// Decoded content plus whether DEFLATE inflation was applied to get it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    /// The decoded bytes.
    pub bytes: Vec<u8>,
    /// True when the content was DEFLATE-compressed under the base64 layer.
    pub deflated: bool,
}

/// Decodes input, auto-detecting its encoding.
///
/// Input already starting with `<` is returned as-is. Otherwise the input is
/// base64-decoded and, when the result is not UTF-8 XML, DEFLATE-inflated.
/// Decoded content that still does not look like XML is returned unmodified;
/// the caller must handle non-XML/binary content.
pub fn smart_decode(input: &str) -> SamlResult<DecodedMessage> {
    let trimmed = input.trim();
    if trimmed.starts_with('<') {
        return Ok(DecodedMessage {
            bytes: trimmed.as_bytes().to_vec(),
            deflated: false,
        });
    }

    let decoded = decode(trimmed)?;
    if is_utf8_xml(&decoded) {
        return Ok(DecodedMessage {
            bytes: decoded,
            deflated: false,
        });
    }

    if let Ok(inflated) = inflate(&decoded) {
        if is_utf8_xml(&inflated) {
            return Ok(DecodedMessage {
                bytes: inflated,
                deflated: true,
            });
        }
    }

    Ok(DecodedMessage {
        bytes: decoded,
        deflated: false,
    })
}

fn is_utf8_xml(data: &[u8]) -> bool {
    !data.is_empty() && data[0] == b'<' && std::str::from_utf8(data).is_ok()
}
