//! Encrypted-assertion detection and the decryption seam.
//!
//! The decryption algorithm itself lives outside this crate; implementors of
//! [`AssertionDecryptor`] take the whole document and return it with the
//! encrypted subtree replaced by plaintext. This module only detects
//! encrypted content and re-parses whatever an implementor hands back.

use quick_xml::events::Event;

use crate::error::{SamlError, SamlResult};
use crate::model::MessageInfo;
use crate::parse;

/// Checks whether a document carries encrypted content.
///
/// True when an `EncryptedAssertion` or `EncryptedData` element appears
/// anywhere in the tree, namespace prefix ignored. Ill-formed input is
/// simply not encrypted.
#[must_use]
pub fn is_encrypted(xml: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(xml) else {
        return false;
    };

    let mut reader = quick_xml::Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                let name = e.name();
                if matches!(
                    name.local_name().as_ref(),
                    b"EncryptedAssertion" | b"EncryptedData"
                ) {
                    return true;
                }
            }
            Ok(Event::Eof) | Err(_) => return false,
            Ok(_) => {}
        }
    }
}

/// External capability that turns a document with encrypted content into the
/// same document with plaintext in its place.
pub trait AssertionDecryptor {
    /// Decrypts the encrypted subtree(s) of `xml` and returns the full
    /// document with plaintext substituted.
    fn decrypt(&self, xml: &[u8]) -> SamlResult<Vec<u8>>;
}

/// Decrypts a document and parses the result.
///
/// Implementors report failures as [`SamlError::Decryption`]; the decrypted
/// document then goes through the regular structural parser.
pub fn decrypt_and_parse<D: AssertionDecryptor>(
    decryptor: &D,
    xml: &[u8],
) -> SamlResult<MessageInfo> {
    let decrypted = decryptor.decrypt(xml)?;
    parse::parse(&decrypted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::MessageKind;

    const ENCRYPTED_RESPONSE: &str = r#"<samlp:Response
        xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
        xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="_r1">
      <saml:EncryptedAssertion>
        <xenc:EncryptedData xmlns:xenc="http://www.w3.org/2001/04/xmlenc#"/>
      </saml:EncryptedAssertion>
    </samlp:Response>"#;

    struct FixedDecryptor(&'static str);

    impl AssertionDecryptor for FixedDecryptor {
        fn decrypt(&self, _xml: &[u8]) -> SamlResult<Vec<u8>> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    struct FailingDecryptor;

    impl AssertionDecryptor for FailingDecryptor {
        fn decrypt(&self, _xml: &[u8]) -> SamlResult<Vec<u8>> {
            Err(SamlError::Decryption("no key".into()))
        }
    }

    #[test]
    fn detects_encrypted_assertion() {
        assert!(is_encrypted(ENCRYPTED_RESPONSE.as_bytes()));
    }

    #[test]
    fn plaintext_response_is_not_encrypted() {
        let xml = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="_r1"/>"#;
        assert!(!is_encrypted(xml.as_bytes()));
        assert!(!is_encrypted(b"not xml at all"));
    }

    #[test]
    fn decrypt_and_parse_runs_the_parser_on_plaintext() {
        let decryptor = FixedDecryptor(
            r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="_r1"/>"#,
        );
        let info = decrypt_and_parse(&decryptor, ENCRYPTED_RESPONSE.as_bytes()).unwrap();
        assert_eq!(info.kind, MessageKind::Response);
        assert_eq!(info.id.as_deref(), Some("_r1"));
    }

    #[test]
    fn decryption_failure_is_typed() {
        let err = decrypt_and_parse(&FailingDecryptor, ENCRYPTED_RESPONSE.as_bytes()).unwrap_err();
        assert!(matches!(err, SamlError::Decryption(_)));
    }
}
