//! Error types for SAML decoding, parsing, and extraction.

use thiserror::Error;

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// Errors produced by the SAML inspection pipeline.
#[derive(Debug, Error)]
pub enum SamlError {
    /// No base64 decode strategy succeeded.
    #[error("malformed encoding: no base64 decode strategy succeeded")]
    MalformedEncoding,

    /// Base64 decoded fine, but the bytes are not a valid DEFLATE stream.
    #[error("deflate decompression failed: {0}")]
    DecompressionFailed(String),

    /// XML well-formedness failure during parsing.
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// The capture document is not valid JSON or lacks the expected shape.
    #[error("unsupported capture document: {0}")]
    UnsupportedDocument(String),

    /// Decoded content passed no SAML indicator. Used as an internal
    /// acceptance gate; bulk extraction never surfaces it.
    #[error("decoded content is not SAML")]
    NotSaml,

    /// The external decryption capability reported a failure.
    #[error("decryption failed: {0}")]
    Decryption(String),
}

impl From<quick_xml::Error> for SamlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::MalformedXml(err.to_string())
    }
}

impl From<quick_xml::DeError> for SamlError {
    fn from(err: quick_xml::DeError) -> Self {
        Self::MalformedXml(err.to_string())
    }
}
