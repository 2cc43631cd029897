//! Normalized records produced by the parser and the bulk extractor.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::detect::MessageKind;

/// Parsed information from a SAML message.
///
/// Every field that may legitimately be missing is an `Option` so that
/// absence stays distinguishable from a real false/empty value.
#[derive(Debug, Clone, Serialize)]
pub struct MessageInfo {
    /// The message variant.
    #[serde(rename = "type")]
    pub kind: MessageKind,

    /// Set when the message carries an encrypted assertion that was not
    /// decrypted; the record then only holds response-level data.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub encrypted: bool,

    /// Message ID attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Timestamp the message was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_instant: Option<DateTime<Utc>>,

    /// Destination URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// ID of the request this message answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,

    /// Issuer entity ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// Protocol status (responses only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    /// Subject of the assertion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    /// Validity conditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,

    /// Authentication statement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authn_statement: Option<AuthnStatement>,

    /// Attribute statement contents, in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,

    /// Signature presence and metadata. Never verified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureInfo>,

    /// Embedded assertion of a response, parsed recursively.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion: Option<Box<MessageInfo>>,

    /// AuthnRequest: where the response should be posted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_consumer_service_url: Option<String>,

    /// AuthnRequest: requested response binding URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_binding: Option<String>,

    /// AuthnRequest: tri-state ForceAuthn attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_authn: Option<bool>,

    /// AuthnRequest: tri-state IsPassive attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_passive: Option<bool>,

    /// AuthnRequest: NameID policy constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id_policy: Option<NameIdPolicy>,

    /// AuthnRequest: attributes requested via Extensions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requested_attributes: Vec<RequestedAttribute>,
}

impl MessageInfo {
    /// Creates an empty record of the given kind.
    #[must_use]
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            encrypted: false,
            id: None,
            issue_instant: None,
            destination: None,
            in_response_to: None,
            issuer: None,
            status: None,
            subject: None,
            conditions: None,
            authn_statement: None,
            attributes: Vec::new(),
            signature: None,
            assertion: None,
            assertion_consumer_service_url: None,
            protocol_binding: None,
            force_authn: None,
            is_passive: None,
            name_id_policy: None,
            requested_attributes: Vec::new(),
        }
    }

    /// Display label for the message type, marking degraded encrypted
    /// records distinctly (e.g. "Response (Encrypted)").
    #[must_use]
    pub fn type_label(&self) -> String {
        if self.encrypted {
            format!("{} (Encrypted)", self.kind)
        } else {
            self.kind.to_string()
        }
    }
}

/// Protocol status of a response.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    /// Final segment of the status code URI (e.g. "Success").
    pub status_code: String,

    /// Optional human-readable status message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

/// Subject information of an assertion.
#[derive(Debug, Clone, Serialize)]
pub struct Subject {
    /// The NameID value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id: Option<String>,

    /// NameID format URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id_format: Option<String>,

    /// SP name qualifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp_name_qualifier: Option<String>,
}

/// Assertion validity conditions.
///
/// `NotBefore <= NotOnOrAfter` holds for valid input but is not enforced
/// here; this is an inspector, not a validator.
#[derive(Debug, Clone, Serialize)]
pub struct Conditions {
    /// Start of the validity window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    /// End of the validity window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,

    /// Allowed audience URIs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub audience_restriction: Vec<String>,
}

/// Authentication statement of an assertion.
#[derive(Debug, Clone, Serialize)]
pub struct AuthnStatement {
    /// When authentication took place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authn_instant: Option<DateTime<Utc>>,

    /// IdP session index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_index: Option<String>,

    /// Session expiry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_not_on_or_after: Option<DateTime<Utc>>,

    /// Authentication context class reference URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authn_context_class_ref: Option<String>,
}

/// A SAML attribute with its values in document order.
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    /// Attribute name (often a URI).
    pub name: String,

    /// Human-friendly name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,

    /// Name format URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_format: Option<String>,

    /// Attribute values, duplicates permitted.
    pub values: Vec<String>,
}

/// NameID policy of an AuthnRequest.
#[derive(Debug, Clone, Serialize)]
pub struct NameIdPolicy {
    /// Requested NameID format URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Tri-state AllowCreate attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_create: Option<bool>,

    /// SP name qualifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp_name_qualifier: Option<String>,
}

/// An attribute requested by an AuthnRequest extension.
#[derive(Debug, Clone, Serialize)]
pub struct RequestedAttribute {
    /// Attribute name.
    pub name: String,

    /// Human-friendly name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,

    /// Name format URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_format: Option<String>,

    /// Tri-state isRequired attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
}

/// Signature presence and display-only metadata. Nothing is verified.
#[derive(Debug, Clone, Serialize)]
pub struct SignatureInfo {
    /// True whenever a Signature subtree exists.
    pub signed: bool,

    /// Signature algorithm URI, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_method: Option<String>,

    /// Digest algorithm URI, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest_method: Option<String>,

    /// Parsed embedded certificate, when present and parseable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_info: Option<CertificateInfo>,
}

/// Display-only data from an embedded X.509 certificate.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateInfo {
    /// Subject distinguished name.
    pub subject: String,

    /// Issuer distinguished name.
    pub issuer: String,

    /// Start of the certificate validity window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    /// End of the certificate validity window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_after: Option<DateTime<Utc>>,

    /// Serial number, decimal.
    pub serial: String,
}

/// Where in a capture entry an encoded blob was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// URL query parameter (HTTP-Redirect binding).
    RequestQuery,
    /// POST body parameter or raw body (HTTP-POST binding).
    RequestBody,
    /// Response body, usually a hidden HTML form field.
    ResponseBody,
    /// Caller-supplied string outside any capture document.
    DirectInput,
}

impl SourceKind {
    /// Returns the provenance label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RequestQuery => "request-query",
            Self::RequestBody => "request-body",
            Self::ResponseBody => "response-body",
            Self::DirectInput => "direct-input",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One SAML message located during bulk extraction, with provenance.
/// Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedMessage {
    /// 1-based position in document traversal order. Strictly increasing
    /// across one extraction run, no gaps or repeats.
    pub index: u32,

    /// Classified message variant.
    #[serde(rename = "type")]
    pub kind: MessageKind,

    /// Where the blob was found.
    pub source: SourceKind,

    /// Request URL of the capture entry.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,

    /// Query/form parameter name; empty for raw-body and HTML matches.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parameter: String,

    /// Original encoded text.
    pub raw_value: String,

    /// Decoded XML bytes.
    #[serde(serialize_with = "serialize_base64")]
    pub xml: Vec<u8>,

    /// Whether DEFLATE inflation was applied.
    pub deflated: bool,
}

fn serialize_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_label_marks_encrypted_responses() {
        let mut info = MessageInfo::new(MessageKind::Response);
        assert_eq!(info.type_label(), "Response");
        info.encrypted = true;
        assert_eq!(info.type_label(), "Response (Encrypted)");
    }

    #[test]
    fn json_omits_absent_fields() {
        let info = MessageInfo::new(MessageKind::AuthnRequest);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type"], "AuthnRequest");
        assert!(json.get("force_authn").is_none());
        assert!(json.get("encrypted").is_none());
        assert!(json.get("status").is_none());
    }

    #[test]
    fn source_kind_labels() {
        assert_eq!(SourceKind::RequestQuery.as_str(), "request-query");
        assert_eq!(SourceKind::ResponseBody.to_string(), "response-body");
    }
}
