//! Structural parsing of SAML XML documents into [`MessageInfo`] records.
//!
//! Deserialization is serde-driven through quick-xml. Namespace prefixes are
//! not resolved; the common `saml:`/`saml2:`/`samlp:`/`saml2p:`/`ds:`
//! spellings are accepted as aliases alongside unprefixed element names.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use serde::Deserialize;

use crate::detect::MessageKind;
use crate::error::{SamlError, SamlResult};
use crate::model::{
    Attribute, AuthnStatement, CertificateInfo, Conditions, MessageInfo, NameIdPolicy,
    RequestedAttribute, SignatureInfo, Status, Subject,
};

/// Parses a SAML XML document into a normalized record.
///
/// The root element's local name routes to the Response, AuthnRequest, or
/// Assertion shape. Ill-formed XML and unrecognized roots yield
/// [`SamlError::MalformedXml`].
pub fn parse(xml: &[u8]) -> SamlResult<MessageInfo> {
    let text = xml_str(xml)?;
    match root_local_name(text)?.as_str() {
        "Response" => parse_response(text, false),
        "AuthnRequest" => parse_authn_request(text),
        "Assertion" => parse_assertion(text),
        other => Err(SamlError::MalformedXml(format!(
            "unsupported root element <{other}>"
        ))),
    }
}

/// Parses a document, settling for the response envelope when the assertion
/// cannot be read.
///
/// A Response whose assertion is encrypted still yields its response-level
/// fields (id, destination, in-response-to, issuer, status, signature); the
/// record is marked encrypted. Anything that is not a Response falls through
/// to [`parse`].
pub fn parse_partial(xml: &[u8]) -> SamlResult<MessageInfo> {
    let text = xml_str(xml)?;
    if root_local_name(text)? == "Response" {
        parse_response(text, true)
    } else {
        parse(xml)
    }
}

fn xml_str(xml: &[u8]) -> SamlResult<&str> {
    std::str::from_utf8(xml)
        .map(str::trim)
        .map_err(|e| SamlError::MalformedXml(e.to_string()))
}

/// Local name of the document's root element, prefix stripped.
fn root_local_name(text: &str) -> SamlResult<String> {
    let mut reader = quick_xml::Reader::from_str(text);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                let name = e.name();
                return Ok(String::from_utf8_lossy(name.local_name().as_ref()).into_owned());
            }
            Event::Eof => return Err(SamlError::MalformedXml("no root element".into())),
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// XML shapes
// ---------------------------------------------------------------------------

/// An element whose only interesting content is its text.
#[derive(Debug, Deserialize)]
struct TextValue {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseXml {
    #[serde(rename = "@ID")]
    id: Option<String>,
    #[serde(rename = "@IssueInstant")]
    issue_instant: Option<String>,
    #[serde(rename = "@Destination")]
    destination: Option<String>,
    #[serde(rename = "@InResponseTo")]
    in_response_to: Option<String>,
    #[serde(rename = "Issuer", alias = "saml:Issuer", alias = "saml2:Issuer")]
    issuer: Option<TextValue>,
    #[serde(rename = "Status", alias = "samlp:Status", alias = "saml2p:Status")]
    status: Option<StatusXml>,
    /// Repeated elements collect here; the data model keeps the first.
    #[serde(
        rename = "Assertion",
        alias = "saml:Assertion",
        alias = "saml2:Assertion",
        default
    )]
    assertion: Vec<AssertionXml>,
    #[serde(rename = "Signature", alias = "ds:Signature")]
    signature: Option<SignatureXml>,
}

#[derive(Debug, Deserialize)]
struct StatusXml {
    #[serde(
        rename = "StatusCode",
        alias = "samlp:StatusCode",
        alias = "saml2p:StatusCode"
    )]
    status_code: Option<StatusCodeXml>,
    #[serde(
        rename = "StatusMessage",
        alias = "samlp:StatusMessage",
        alias = "saml2p:StatusMessage"
    )]
    status_message: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct StatusCodeXml {
    #[serde(rename = "@Value")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssertionXml {
    #[serde(rename = "@ID")]
    id: Option<String>,
    #[serde(rename = "@IssueInstant")]
    issue_instant: Option<String>,
    #[serde(rename = "Issuer", alias = "saml:Issuer", alias = "saml2:Issuer")]
    issuer: Option<TextValue>,
    #[serde(rename = "Subject", alias = "saml:Subject", alias = "saml2:Subject")]
    subject: Option<SubjectXml>,
    #[serde(rename = "Conditions", alias = "saml:Conditions", alias = "saml2:Conditions")]
    conditions: Option<ConditionsXml>,
    #[serde(
        rename = "AuthnStatement",
        alias = "saml:AuthnStatement",
        alias = "saml2:AuthnStatement"
    )]
    authn_statement: Option<AuthnStatementXml>,
    #[serde(
        rename = "AttributeStatement",
        alias = "saml:AttributeStatement",
        alias = "saml2:AttributeStatement"
    )]
    attribute_statement: Option<AttributeStatementXml>,
    #[serde(rename = "Signature", alias = "ds:Signature")]
    signature: Option<SignatureXml>,
}

#[derive(Debug, Deserialize)]
struct SubjectXml {
    #[serde(rename = "NameID", alias = "saml:NameID", alias = "saml2:NameID")]
    name_id: Option<NameIdXml>,
}

#[derive(Debug, Deserialize)]
struct NameIdXml {
    #[serde(rename = "@Format")]
    format: Option<String>,
    #[serde(rename = "@SPNameQualifier")]
    sp_name_qualifier: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConditionsXml {
    #[serde(rename = "@NotBefore")]
    not_before: Option<String>,
    #[serde(rename = "@NotOnOrAfter")]
    not_on_or_after: Option<String>,
    #[serde(
        rename = "AudienceRestriction",
        alias = "saml:AudienceRestriction",
        alias = "saml2:AudienceRestriction"
    )]
    audience_restriction: Option<AudienceRestrictionXml>,
}

#[derive(Debug, Deserialize)]
struct AudienceRestrictionXml {
    #[serde(
        rename = "Audience",
        alias = "saml:Audience",
        alias = "saml2:Audience",
        default
    )]
    audiences: Vec<TextValue>,
}

#[derive(Debug, Deserialize)]
struct AuthnStatementXml {
    #[serde(rename = "@AuthnInstant")]
    authn_instant: Option<String>,
    #[serde(rename = "@SessionIndex")]
    session_index: Option<String>,
    #[serde(rename = "@SessionNotOnOrAfter")]
    session_not_on_or_after: Option<String>,
    #[serde(
        rename = "AuthnContext",
        alias = "saml:AuthnContext",
        alias = "saml2:AuthnContext"
    )]
    authn_context: Option<AuthnContextXml>,
}

#[derive(Debug, Deserialize)]
struct AuthnContextXml {
    #[serde(
        rename = "AuthnContextClassRef",
        alias = "saml:AuthnContextClassRef",
        alias = "saml2:AuthnContextClassRef"
    )]
    class_ref: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct AttributeStatementXml {
    #[serde(
        rename = "Attribute",
        alias = "saml:Attribute",
        alias = "saml2:Attribute",
        default
    )]
    attributes: Vec<AttributeXml>,
}

#[derive(Debug, Deserialize)]
struct AttributeXml {
    #[serde(rename = "@Name")]
    name: Option<String>,
    #[serde(rename = "@FriendlyName")]
    friendly_name: Option<String>,
    #[serde(rename = "@NameFormat")]
    name_format: Option<String>,
    #[serde(
        rename = "AttributeValue",
        alias = "saml:AttributeValue",
        alias = "saml2:AttributeValue",
        default
    )]
    values: Vec<TextValue>,
}

#[derive(Debug, Deserialize)]
struct SignatureXml {
    #[serde(rename = "SignedInfo", alias = "ds:SignedInfo")]
    signed_info: Option<SignedInfoXml>,
    #[serde(rename = "KeyInfo", alias = "ds:KeyInfo")]
    key_info: Option<KeyInfoXml>,
}

#[derive(Debug, Deserialize)]
struct SignedInfoXml {
    #[serde(rename = "SignatureMethod", alias = "ds:SignatureMethod")]
    signature_method: Option<AlgorithmXml>,
    #[serde(rename = "Reference", alias = "ds:Reference")]
    reference: Option<ReferenceXml>,
}

#[derive(Debug, Deserialize)]
struct ReferenceXml {
    #[serde(rename = "DigestMethod", alias = "ds:DigestMethod")]
    digest_method: Option<AlgorithmXml>,
}

#[derive(Debug, Deserialize)]
struct AlgorithmXml {
    #[serde(rename = "@Algorithm")]
    algorithm: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KeyInfoXml {
    #[serde(rename = "X509Data", alias = "ds:X509Data")]
    x509_data: Option<X509DataXml>,
}

#[derive(Debug, Deserialize)]
struct X509DataXml {
    #[serde(rename = "X509Certificate", alias = "ds:X509Certificate")]
    certificate: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct AuthnRequestXml {
    #[serde(rename = "@ID")]
    id: Option<String>,
    #[serde(rename = "@IssueInstant")]
    issue_instant: Option<String>,
    #[serde(rename = "@Destination")]
    destination: Option<String>,
    #[serde(rename = "@AssertionConsumerServiceURL")]
    assertion_consumer_service_url: Option<String>,
    #[serde(rename = "@ProtocolBinding")]
    protocol_binding: Option<String>,
    #[serde(rename = "@ForceAuthn")]
    force_authn: Option<String>,
    #[serde(rename = "@IsPassive")]
    is_passive: Option<String>,
    #[serde(rename = "Issuer", alias = "saml:Issuer", alias = "saml2:Issuer")]
    issuer: Option<TextValue>,
    #[serde(
        rename = "NameIDPolicy",
        alias = "samlp:NameIDPolicy",
        alias = "saml2p:NameIDPolicy"
    )]
    name_id_policy: Option<NameIdPolicyXml>,
    #[serde(rename = "Signature", alias = "ds:Signature")]
    signature: Option<SignatureXml>,
    #[serde(
        rename = "Extensions",
        alias = "samlp:Extensions",
        alias = "saml2p:Extensions"
    )]
    extensions: Option<ExtensionsXml>,
}

#[derive(Debug, Deserialize)]
struct NameIdPolicyXml {
    #[serde(rename = "@Format")]
    format: Option<String>,
    #[serde(rename = "@AllowCreate")]
    allow_create: Option<String>,
    #[serde(rename = "@SPNameQualifier")]
    sp_name_qualifier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExtensionsXml {
    #[serde(
        rename = "RequestedAttribute",
        alias = "md:RequestedAttribute",
        alias = "req-attr:RequestedAttribute",
        default
    )]
    requested_attributes: Vec<RequestedAttributeXml>,
}

#[derive(Debug, Deserialize)]
struct RequestedAttributeXml {
    #[serde(rename = "@Name")]
    name: Option<String>,
    #[serde(rename = "@FriendlyName")]
    friendly_name: Option<String>,
    #[serde(rename = "@NameFormat")]
    name_format: Option<String>,
    #[serde(rename = "@isRequired")]
    is_required: Option<String>,
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

fn parse_response(text: &str, partial: bool) -> SamlResult<MessageInfo> {
    let resp: ResponseXml = quick_xml::de::from_str(text)?;

    let mut info = MessageInfo::new(MessageKind::Response);
    info.encrypted = partial;
    info.id = non_empty(resp.id);
    info.issue_instant = parse_instant(resp.issue_instant.as_deref());
    info.destination = non_empty(resp.destination);
    info.in_response_to = non_empty(resp.in_response_to);
    info.issuer = text_of(resp.issuer);
    info.status = resp.status.and_then(map_status);
    info.signature = resp.signature.map(map_signature);

    if !partial {
        if let Some(assertion) = resp.assertion.into_iter().next() {
            info.assertion = Some(Box::new(map_assertion(assertion)));
        }
    }

    Ok(info)
}

fn parse_authn_request(text: &str) -> SamlResult<MessageInfo> {
    let req: AuthnRequestXml = quick_xml::de::from_str(text)?;

    let mut info = MessageInfo::new(MessageKind::AuthnRequest);
    info.id = non_empty(req.id);
    info.issue_instant = parse_instant(req.issue_instant.as_deref());
    info.destination = non_empty(req.destination);
    info.issuer = text_of(req.issuer);
    info.assertion_consumer_service_url = non_empty(req.assertion_consumer_service_url);
    info.protocol_binding = non_empty(req.protocol_binding);
    info.force_authn = parse_tristate(req.force_authn.as_deref());
    info.is_passive = parse_tristate(req.is_passive.as_deref());
    info.signature = req.signature.map(map_signature);

    if let Some(policy) = req.name_id_policy {
        info.name_id_policy = Some(NameIdPolicy {
            format: non_empty(policy.format),
            allow_create: parse_tristate(policy.allow_create.as_deref()),
            sp_name_qualifier: non_empty(policy.sp_name_qualifier),
        });
    }

    if let Some(extensions) = req.extensions {
        info.requested_attributes = extensions
            .requested_attributes
            .into_iter()
            .map(|attr| RequestedAttribute {
                name: attr.name.unwrap_or_default(),
                friendly_name: non_empty(attr.friendly_name),
                name_format: non_empty(attr.name_format),
                is_required: parse_tristate(attr.is_required.as_deref()),
            })
            .collect();
    }

    Ok(info)
}

fn parse_assertion(text: &str) -> SamlResult<MessageInfo> {
    let assertion: AssertionXml = quick_xml::de::from_str(text)?;
    Ok(map_assertion(assertion))
}

fn map_assertion(assertion: AssertionXml) -> MessageInfo {
    let mut info = MessageInfo::new(MessageKind::Assertion);
    info.id = non_empty(assertion.id);
    info.issue_instant = parse_instant(assertion.issue_instant.as_deref());
    info.issuer = text_of(assertion.issuer);
    info.signature = assertion.signature.map(map_signature);

    if let Some(subject) = assertion.subject {
        if let Some(name_id) = subject.name_id {
            info.subject = Some(Subject {
                name_id: non_empty(name_id.value),
                name_id_format: non_empty(name_id.format),
                sp_name_qualifier: non_empty(name_id.sp_name_qualifier),
            });
        }
    }

    if let Some(conditions) = assertion.conditions {
        info.conditions = Some(Conditions {
            not_before: parse_instant(conditions.not_before.as_deref()),
            not_on_or_after: parse_instant(conditions.not_on_or_after.as_deref()),
            audience_restriction: conditions
                .audience_restriction
                .map(|ar| ar.audiences.into_iter().filter_map(|a| a.value).collect())
                .unwrap_or_default(),
        });
    }

    if let Some(stmt) = assertion.authn_statement {
        info.authn_statement = Some(AuthnStatement {
            authn_instant: parse_instant(stmt.authn_instant.as_deref()),
            session_index: non_empty(stmt.session_index),
            session_not_on_or_after: parse_instant(stmt.session_not_on_or_after.as_deref()),
            authn_context_class_ref: stmt.authn_context.and_then(|c| text_of(c.class_ref)),
        });
    }

    if let Some(stmt) = assertion.attribute_statement {
        info.attributes = stmt
            .attributes
            .into_iter()
            .map(|attr| Attribute {
                name: attr.name.unwrap_or_default(),
                friendly_name: non_empty(attr.friendly_name),
                name_format: non_empty(attr.name_format),
                values: attr
                    .values
                    .into_iter()
                    .map(|v| v.value.unwrap_or_default())
                    .collect(),
            })
            .collect();
    }

    info
}

fn map_status(status: StatusXml) -> Option<Status> {
    let full_code = status.status_code.and_then(|c| non_empty(c.value))?;
    Some(Status {
        status_code: extract_status_code(&full_code),
        status_message: text_of(status.status_message),
    })
}

fn map_signature(sig: SignatureXml) -> SignatureInfo {
    let signed_info = sig.signed_info;
    SignatureInfo {
        signed: true,
        signature_method: signed_info
            .as_ref()
            .and_then(|si| si.signature_method.as_ref())
            .and_then(|m| m.algorithm.clone()),
        digest_method: signed_info
            .as_ref()
            .and_then(|si| si.reference.as_ref())
            .and_then(|r| r.digest_method.as_ref())
            .and_then(|m| m.algorithm.clone()),
        certificate_info: sig
            .key_info
            .and_then(|ki| ki.x509_data)
            .and_then(|data| text_of(data.certificate))
            .and_then(|cert| certificate_info(&cert)),
    }
}

/// Decodes and parses an embedded X.509 certificate for display.
/// Any failure degrades to no certificate info.
fn certificate_info(cert_b64: &str) -> Option<CertificateInfo> {
    let cleaned: String = cert_b64.chars().filter(|c| !c.is_whitespace()).collect();

    let der = match STANDARD.decode(&cleaned) {
        Ok(der) => der,
        Err(err) => {
            tracing::warn!(%err, "embedded certificate is not valid base64");
            return None;
        }
    };

    match x509_parser::parse_x509_certificate(&der) {
        Ok((_, cert)) => Some(CertificateInfo {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            not_before: DateTime::<Utc>::from_timestamp(cert.validity().not_before.timestamp(), 0),
            not_after: DateTime::<Utc>::from_timestamp(cert.validity().not_after.timestamp(), 0),
            serial: cert.serial.to_string(),
        }),
        Err(err) => {
            tracing::warn!(%err, "embedded certificate could not be parsed");
            None
        }
    }
}

/// Final colon-delimited segment of a status code URI, or the whole string
/// when it has no colon.
fn extract_status_code(full_code: &str) -> String {
    full_code
        .rsplit(':')
        .next()
        .unwrap_or(full_code)
        .to_string()
}

fn parse_instant(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Tri-state boolean attribute: absent or empty stays absent, anything else
/// compares case-insensitively against "true".
fn parse_tristate(value: Option<&str>) -> Option<bool> {
    let value = value?;
    if value.is_empty() {
        return None;
    }
    Some(value.eq_ignore_ascii_case("true"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn text_of(value: Option<TextValue>) -> Option<String> {
    value.and_then(|t| t.value).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
        xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
        ID="_resp1" IssueInstant="2024-03-15T10:30:00Z"
        Destination="https://sp.example.com/acs" InResponseTo="_req1">
      <saml:Issuer>https://idp.example.com</saml:Issuer>
      <samlp:Status>
        <samlp:StatusCode Value="urn:oasis:names:tc:SAML:2.0:status:Success"/>
      </samlp:Status>
      <saml:Assertion ID="_asrt1" IssueInstant="2024-03-15T10:30:00Z">
        <saml:Issuer>https://idp.example.com</saml:Issuer>
        <saml:Subject>
          <saml:NameID Format="urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress">alice@example.com</saml:NameID>
        </saml:Subject>
        <saml:Conditions NotBefore="2024-03-15T10:25:00Z" NotOnOrAfter="2024-03-15T10:35:00Z">
          <saml:AudienceRestriction>
            <saml:Audience>https://sp.example.com</saml:Audience>
          </saml:AudienceRestriction>
        </saml:Conditions>
        <saml:AuthnStatement AuthnInstant="2024-03-15T10:29:58Z" SessionIndex="_sess1">
          <saml:AuthnContext>
            <saml:AuthnContextClassRef>urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport</saml:AuthnContextClassRef>
          </saml:AuthnContext>
        </saml:AuthnStatement>
        <saml:AttributeStatement>
          <saml:Attribute Name="email" FriendlyName="E-Mail">
            <saml:AttributeValue>alice@example.com</saml:AttributeValue>
          </saml:Attribute>
          <saml:Attribute Name="groups">
            <saml:AttributeValue>admins</saml:AttributeValue>
            <saml:AttributeValue>users</saml:AttributeValue>
            <saml:AttributeValue>admins</saml:AttributeValue>
          </saml:Attribute>
        </saml:AttributeStatement>
      </saml:Assertion>
    </samlp:Response>"#;

    const AUTHN_REQUEST: &str = r#"<samlp:AuthnRequest
        xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
        xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
        ID="_req1" IssueInstant="2024-03-15T10:29:00Z"
        Destination="https://idp.example.com/sso"
        AssertionConsumerServiceURL="https://sp.example.com/acs"
        ProtocolBinding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST"
        ForceAuthn="TRUE" IsPassive="false">
      <saml:Issuer>https://sp.example.com</saml:Issuer>
      <samlp:NameIDPolicy Format="urn:oasis:names:tc:SAML:2.0:nameid-format:persistent" AllowCreate="true"/>
    </samlp:AuthnRequest>"#;

    #[test]
    fn parses_response_with_assertion() {
        let info = parse(RESPONSE.as_bytes()).unwrap();
        assert_eq!(info.kind, MessageKind::Response);
        assert_eq!(info.id.as_deref(), Some("_resp1"));
        assert_eq!(info.in_response_to.as_deref(), Some("_req1"));
        assert_eq!(info.issuer.as_deref(), Some("https://idp.example.com"));
        assert_eq!(info.status.as_ref().unwrap().status_code, "Success");

        let assertion = info.assertion.as_deref().unwrap();
        assert_eq!(assertion.kind, MessageKind::Assertion);
        assert_eq!(assertion.id.as_deref(), Some("_asrt1"));
        let subject = assertion.subject.as_ref().unwrap();
        assert_eq!(subject.name_id.as_deref(), Some("alice@example.com"));
        assert_eq!(
            assertion.conditions.as_ref().unwrap().audience_restriction,
            vec!["https://sp.example.com"]
        );
    }

    #[test]
    fn attribute_values_keep_order_and_duplicates() {
        let info = parse(RESPONSE.as_bytes()).unwrap();
        let assertion = info.assertion.as_deref().unwrap();
        let groups = &assertion.attributes[1];
        assert_eq!(groups.name, "groups");
        assert_eq!(groups.values, vec!["admins", "users", "admins"]);
    }

    #[test]
    fn parses_authn_request() {
        let info = parse(AUTHN_REQUEST.as_bytes()).unwrap();
        assert_eq!(info.kind, MessageKind::AuthnRequest);
        assert_eq!(
            info.assertion_consumer_service_url.as_deref(),
            Some("https://sp.example.com/acs")
        );
        // Case-insensitive tri-state booleans.
        assert_eq!(info.force_authn, Some(true));
        assert_eq!(info.is_passive, Some(false));

        let policy = info.name_id_policy.as_ref().unwrap();
        assert_eq!(policy.allow_create, Some(true));
        assert_eq!(
            policy.format.as_deref(),
            Some("urn:oasis:names:tc:SAML:2.0:nameid-format:persistent")
        );
    }

    #[test]
    fn absent_boolean_attribute_stays_absent() {
        let xml = r#"<AuthnRequest ID="_q" xmlns="urn:oasis:names:tc:SAML:2.0:protocol"/>"#;
        let info = parse(xml.as_bytes()).unwrap();
        assert_eq!(info.force_authn, None);
        assert_eq!(info.is_passive, None);
    }

    #[test]
    fn parses_bare_assertion() {
        let xml = r#"<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
            ID="_a1" IssueInstant="2024-03-15T10:30:00Z">
          <saml:Issuer>https://idp.example.com</saml:Issuer>
        </saml:Assertion>"#;
        let info = parse(xml.as_bytes()).unwrap();
        assert_eq!(info.kind, MessageKind::Assertion);
        assert_eq!(info.id.as_deref(), Some("_a1"));
    }

    #[test]
    fn invalid_timestamp_leaves_field_absent() {
        let xml = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
            ID="_r" IssueInstant="not-a-date"/>"#;
        let info = parse(xml.as_bytes()).unwrap();
        assert_eq!(info.id.as_deref(), Some("_r"));
        assert_eq!(info.issue_instant, None);
    }

    #[test]
    fn status_code_is_final_uri_segment() {
        assert_eq!(
            extract_status_code("urn:oasis:names:tc:SAML:2.0:status:Requester"),
            "Requester"
        );
        assert_eq!(extract_status_code("PlainCode"), "PlainCode");
    }

    #[test]
    fn signature_presence_without_certificate() {
        let xml = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
            xmlns:ds="http://www.w3.org/2000/09/xmldsig#" ID="_r">
          <ds:Signature>
            <ds:SignedInfo>
              <ds:SignatureMethod Algorithm="http://www.w3.org/2001/04/xmldsig-more#rsa-sha256"/>
              <ds:Reference>
                <ds:DigestMethod Algorithm="http://www.w3.org/2001/04/xmlenc#sha256"/>
              </ds:Reference>
            </ds:SignedInfo>
          </ds:Signature>
        </samlp:Response>"#;
        let info = parse(xml.as_bytes()).unwrap();
        let sig = info.signature.as_ref().unwrap();
        assert!(sig.signed);
        assert_eq!(
            sig.signature_method.as_deref(),
            Some("http://www.w3.org/2001/04/xmldsig-more#rsa-sha256")
        );
        assert_eq!(
            sig.digest_method.as_deref(),
            Some("http://www.w3.org/2001/04/xmlenc#sha256")
        );
        assert!(sig.certificate_info.is_none());
    }

    #[test]
    fn garbage_certificate_degrades_silently() {
        let xml = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
            xmlns:ds="http://www.w3.org/2000/09/xmldsig#" ID="_r">
          <ds:Signature>
            <ds:KeyInfo><ds:X509Data><ds:X509Certificate>bm90IGEgY2VydA==</ds:X509Certificate></ds:X509Data></ds:KeyInfo>
          </ds:Signature>
        </samlp:Response>"#;
        let info = parse(xml.as_bytes()).unwrap();
        let sig = info.signature.as_ref().unwrap();
        assert!(sig.signed);
        assert!(sig.certificate_info.is_none());
    }

    #[test]
    fn partial_parse_of_encrypted_response() {
        let xml = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
            xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
            ID="_r1" InResponseTo="_q1" Destination="https://sp.example.com/acs"
            IssueInstant="2024-03-15T10:30:00Z">
          <saml:Issuer>https://idp.example.com</saml:Issuer>
          <samlp:Status>
            <samlp:StatusCode Value="urn:oasis:names:tc:SAML:2.0:status:Success"/>
          </samlp:Status>
          <saml:EncryptedAssertion>
            <xenc:EncryptedData xmlns:xenc="http://www.w3.org/2001/04/xmlenc#"/>
          </saml:EncryptedAssertion>
        </samlp:Response>"#;
        let info = parse_partial(xml.as_bytes()).unwrap();
        assert!(info.encrypted);
        assert_eq!(info.type_label(), "Response (Encrypted)");
        assert_eq!(info.id.as_deref(), Some("_r1"));
        assert_eq!(info.issuer.as_deref(), Some("https://idp.example.com"));
        assert_eq!(info.status.as_ref().unwrap().status_code, "Success");
        assert!(info.assertion.is_none());
    }

    #[test]
    fn response_with_repeated_assertions_keeps_the_first() {
        let xml = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
            xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
            ID="_r1" InResponseTo="_q1">
          <saml:Issuer>https://idp.example.com</saml:Issuer>
          <samlp:Status>
            <samlp:StatusCode Value="urn:oasis:names:tc:SAML:2.0:status:Success"/>
          </samlp:Status>
          <saml:Assertion ID="_a1"/>
          <saml:Assertion ID="_a2"/>
        </samlp:Response>"#;

        let info = parse(xml.as_bytes()).unwrap();
        assert_eq!(info.id.as_deref(), Some("_r1"));
        assert_eq!(
            info.assertion.as_deref().unwrap().id.as_deref(),
            Some("_a1")
        );

        // Response-level fields survive regardless of the assertion subtree.
        let partial = parse_partial(xml.as_bytes()).unwrap();
        assert_eq!(partial.id.as_deref(), Some("_r1"));
        assert_eq!(partial.issuer.as_deref(), Some("https://idp.example.com"));
        assert_eq!(partial.status.as_ref().unwrap().status_code, "Success");
        assert!(partial.assertion.is_none());
    }

    #[test]
    fn partial_parse_falls_through_for_requests() {
        let info = parse_partial(AUTHN_REQUEST.as_bytes()).unwrap();
        assert_eq!(info.kind, MessageKind::AuthnRequest);
        assert!(!info.encrypted);
    }

    #[test]
    fn malformed_xml_is_a_typed_error() {
        assert!(matches!(
            parse(b"<samlp:Response"),
            Err(SamlError::MalformedXml(_))
        ));
        assert!(matches!(
            parse(b"<NotSaml attr=\"x\"/>"),
            Err(SamlError::MalformedXml(_))
        ));
    }
}
