//! End-to-end extraction tests over synthetic HAR captures.

use samlscope_core::decode;
use samlscope_core::har::{extract_from_har, filename_for};
use samlscope_core::{MessageKind, SourceKind};

const RESPONSE_XML: &str = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
    xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="_r1" InResponseTo="_q1">
  <saml:Issuer>https://idp.example.com</saml:Issuer>
  <samlp:Status>
    <samlp:StatusCode Value="urn:oasis:names:tc:SAML:2.0:status:Success"/>
  </samlp:Status>
</samlp:Response>"#;

const AUTHN_REQUEST_XML: &str = r#"<samlp:AuthnRequest
    xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="_q1"
    AssertionConsumerServiceURL="https://sp.example.com/acs"/>"#;

fn har_with_entries(entries: &[serde_json::Value]) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "log": { "entries": entries } })).unwrap()
}

#[test]
fn post_parameter_yields_one_response() {
    let har = har_with_entries(&[serde_json::json!({
        "request": {
            "method": "POST",
            "url": "https://sp.example.com/acs",
            "postData": {
                "mimeType": "application/x-www-form-urlencoded",
                "text": "",
                "params": [
                    { "name": "SAMLResponse", "value": decode::encode(RESPONSE_XML.as_bytes()) },
                    { "name": "RelayState", "value": "opaque" }
                ]
            }
        },
        "response": { "content": { "mimeType": "text/html", "text": "" } }
    })]);

    let results = extract_from_har(&har).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].kind, MessageKind::Response);
    assert_eq!(results[0].source, SourceKind::RequestBody);
    assert_eq!(results[0].index, 1);
    assert_eq!(results[0].parameter, "SAMLResponse");
    assert_eq!(results[0].url, "https://sp.example.com/acs");
    assert_eq!(results[0].xml, RESPONSE_XML.as_bytes());
    assert!(!results[0].deflated);
}

#[test]
fn two_entry_capture_keeps_traversal_order() {
    let deflated_request = decode::encode_deflate(AUTHN_REQUEST_XML.as_bytes()).unwrap();
    let har = har_with_entries(&[
        serde_json::json!({
            "request": {
                "method": "GET",
                "url": "https://idp.example.com/sso",
                "queryString": [
                    { "name": "SAMLRequest", "value": deflated_request },
                    { "name": "RelayState", "value": "opaque" }
                ]
            },
            "response": { "content": { "mimeType": "text/html", "text": "" } }
        }),
        serde_json::json!({
            "request": {
                "method": "POST",
                "url": "https://sp.example.com/acs",
                "postData": {
                    "mimeType": "application/x-www-form-urlencoded",
                    "text": format!(
                        "SAMLResponse={}&RelayState=opaque",
                        urlencoding::encode(&decode::encode(RESPONSE_XML.as_bytes()))
                    )
                }
            },
            "response": { "content": { "mimeType": "text/html", "text": "" } }
        }),
    ]);

    let results = extract_from_har(&har).unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0].kind, MessageKind::AuthnRequest);
    assert_eq!(results[0].index, 1);
    assert_eq!(results[0].source, SourceKind::RequestQuery);
    assert!(results[0].deflated);
    assert_eq!(results[0].xml, AUTHN_REQUEST_XML.as_bytes());

    assert_eq!(results[1].kind, MessageKind::Response);
    assert_eq!(results[1].index, 2);
    assert_eq!(results[1].source, SourceKind::RequestBody);
    assert_eq!(results[1].parameter, "SAMLResponse");
}

#[test]
fn indices_run_one_to_n_across_sources() {
    let encoded_response = decode::encode(RESPONSE_XML.as_bytes());
    let deflated_request = decode::encode_deflate(AUTHN_REQUEST_XML.as_bytes()).unwrap();
    let html = format!(
        r#"<html><form method="post" action="https://sp.example.com/acs">
            <input type="hidden" name="SAMLResponse" value="{encoded_response}"/>
        </form></html>"#
    );

    let har = har_with_entries(&[
        serde_json::json!({
            "request": {
                "method": "GET",
                "url": format!("https://idp.example.com/sso?SAMLRequest={}",
                    urlencoding::encode(&deflated_request))
            },
            "response": { "content": { "mimeType": "text/html", "text": html } }
        }),
        serde_json::json!({
            "request": {
                "method": "POST",
                "url": "https://sp.example.com/acs",
                "postData": {
                    "mimeType": "application/x-www-form-urlencoded",
                    "text": "",
                    "params": [
                        { "name": "samlresponse", "value": encoded_response }
                    ]
                }
            },
            "response": { "content": { "mimeType": "text/html", "text": "" } }
        }),
    ]);

    let results = extract_from_har(&har).unwrap();
    assert_eq!(results.len(), 3);
    for (i, extracted) in results.iter().enumerate() {
        assert_eq!(extracted.index, i as u32 + 1);
    }

    // Fixed scan order within an entry: query before response body.
    assert_eq!(results[0].source, SourceKind::RequestQuery);
    assert_eq!(results[1].source, SourceKind::ResponseBody);
    assert_eq!(results[2].source, SourceKind::RequestBody);

    assert_eq!(filename_for(&results[0]), "saml_001_authnrequest_request_query.xml");
    assert_eq!(filename_for(&results[1]), "saml_002_response_response_body.xml");
    assert_eq!(filename_for(&results[2]), "saml_003_response_request_body.xml");
}

#[test]
fn undecodable_candidates_are_skipped_silently() {
    let har = har_with_entries(&[
        serde_json::json!({
            "request": {
                "method": "GET",
                "url": "https://idp.example.com/sso",
                "queryString": [
                    { "name": "SAMLRequest", "value": "%%% not base64 %%%" }
                ]
            },
            "response": { "content": { "mimeType": "text/html", "text": "" } }
        }),
        serde_json::json!({
            "request": {
                "method": "POST",
                "url": "https://sp.example.com/acs",
                "postData": {
                    "mimeType": "application/x-www-form-urlencoded",
                    "text": "",
                    "params": [
                        // Decodes fine but is not SAML.
                        { "name": "SAMLResponse", "value": decode::encode(b"<html/>") },
                        { "name": "SAMLAssertion", "value": decode::encode(RESPONSE_XML.as_bytes()) }
                    ]
                }
            },
            "response": { "content": { "mimeType": "text/html", "text": "" } }
        }),
    ]);

    let results = extract_from_har(&har).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].index, 1);
    assert_eq!(results[0].parameter, "SAMLAssertion");
}

#[test]
fn extraction_output_is_json_serializable() {
    let har = har_with_entries(&[serde_json::json!({
        "request": {
            "method": "POST",
            "url": "https://sp.example.com/acs",
            "postData": {
                "mimeType": "application/x-www-form-urlencoded",
                "text": "",
                "params": [
                    { "name": "SAMLResponse", "value": decode::encode(RESPONSE_XML.as_bytes()) }
                ]
            }
        },
        "response": { "content": { "mimeType": "text/html", "text": "" } }
    })]);

    let results = extract_from_har(&har).unwrap();
    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json[0]["index"], 1);
    assert_eq!(json[0]["type"], "Response");
    assert_eq!(json[0]["source"], "request-body");
    assert_eq!(
        json[0]["xml"],
        serde_json::Value::String(decode::encode(RESPONSE_XML.as_bytes()))
    );
}
