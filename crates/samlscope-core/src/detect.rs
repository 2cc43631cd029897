//! Heuristic classification of SAML message types.
//!
//! Classification is textual substring matching, not XML-aware dispatch.
//! That keeps it working on fragments and partially mangled captures, at the
//! cost of being foolable by a comment or attribute value containing an
//! indicator like `<Response ` - a known limitation, kept on purpose.

use serde::{Deserialize, Serialize};

/// The SAML message variants the inspector distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// `samlp:Response` - an IdP response, usually wrapping an assertion.
    Response,
    /// `samlp:AuthnRequest` - an SP authentication request.
    AuthnRequest,
    /// `saml:Assertion` - a bare assertion outside a response wrapper.
    Assertion,
    /// `samlp:LogoutRequest` - single logout request.
    LogoutRequest,
    /// `samlp:LogoutResponse` - single logout response.
    LogoutResponse,
    /// No indicator matched.
    Unknown,
}

impl MessageKind {
    /// Returns the display name for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Response => "Response",
            Self::AuthnRequest => "AuthnRequest",
            Self::Assertion => "Assertion",
            Self::LogoutRequest => "LogoutRequest",
            Self::LogoutResponse => "LogoutResponse",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority-ordered indicator table. Wrapper types come before Assertion
/// because a Response commonly contains one and must win the tie-break.
const KIND_INDICATORS: &[(MessageKind, &[&str])] = &[
    (
        MessageKind::Response,
        &["samlp:Response", "saml2p:Response", "<Response "],
    ),
    (
        MessageKind::AuthnRequest,
        &["samlp:AuthnRequest", "saml2p:AuthnRequest", "<AuthnRequest "],
    ),
    (
        MessageKind::LogoutRequest,
        &["samlp:LogoutRequest", "saml2p:LogoutRequest", "<LogoutRequest "],
    ),
    (
        MessageKind::LogoutResponse,
        &[
            "samlp:LogoutResponse",
            "saml2p:LogoutResponse",
            "<LogoutResponse ",
        ],
    ),
    (
        MessageKind::Assertion,
        &["saml:Assertion", "saml2:Assertion", "<Assertion "],
    ),
];

/// Indicators accepted by the [`is_saml`] gate.
const SAML_INDICATORS: &[&str] = &[
    "samlp:Response",
    "saml2p:Response",
    "samlp:AuthnRequest",
    "saml2p:AuthnRequest",
    "saml:Assertion",
    "saml2:Assertion",
    "urn:oasis:names:tc:SAML",
    "<Response",
    "<AuthnRequest",
    "<Assertion",
    "<LogoutRequest",
    "<LogoutResponse",
];

/// Classifies decoded content by its first matching indicator, in priority
/// order. Returns [`MessageKind::Unknown`] when nothing matches.
#[must_use]
pub fn detect_kind(content: &str) -> MessageKind {
    for (kind, indicators) in KIND_INDICATORS {
        if indicators.iter().any(|i| content.contains(i)) {
            return *kind;
        }
    }
    MessageKind::Unknown
}

/// Broad acceptance gate: does this content look like SAML at all?
///
/// Used before bulk extraction accepts a candidate; failing the gate causes
/// silent rejection, never an error.
#[must_use]
pub fn is_saml(content: &str) -> bool {
    SAML_INDICATORS.iter().any(|i| content.contains(i))
}
