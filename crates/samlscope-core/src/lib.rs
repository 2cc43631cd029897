//! SAML 2.0 inspection library for traffic debugging.
//!
//! This crate turns opaque encoded blobs from web traffic into structured
//! SAML records:
//!
//! - **Encoding resolution** - base64 variants, padding repair, URL
//!   encoding, and DEFLATE, via an ordered fallback chain
//! - **Message classification** - heuristic detection of the SAML message
//!   variant from decoded content
//! - **Structural parsing** - Response / AuthnRequest / Assertion documents
//!   into a normalized [`MessageInfo`] record
//! - **Bulk extraction** - scanning HAR capture documents for every
//!   embedded SAML message, with deterministic ordering and provenance
//! - **Encrypted-content detection** - plus a trait seam for external
//!   decryption capabilities
//!
//! # Architecture
//!
//! - [`decode`] - base64 / DEFLATE / URL codec fallback chain
//! - [`detect`] - message-kind classification and the SAML acceptance gate
//! - [`parse`] - XML to [`MessageInfo`] structural parsing
//! - [`har`] - HAR capture scanning and bulk extraction
//! - [`decrypt`] - encrypted-content detection and the decryption seam
//! - [`error`] - error taxonomy for the whole pipeline
//!
//! Nothing here verifies signatures, validates schemas, or enforces
//! time-window/audience policy: this is a debugging inspector, not a
//! trust-verifying consumer.
//!
//! # SAML Specifications
//!
//! - [SAML 2.0 Core](https://docs.oasis-open.org/security/saml/v2.0/saml-core-2.0-os.pdf)
//! - [SAML 2.0 Bindings](https://docs.oasis-open.org/security/saml/v2.0/saml-bindings-2.0-os.pdf)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod decode;
pub mod decrypt;
pub mod detect;
pub mod error;
pub mod har;
pub mod model;
pub mod parse;

pub use decode::DecodedMessage;
pub use decrypt::AssertionDecryptor;
pub use detect::MessageKind;
pub use error::{SamlError, SamlResult};
pub use model::{ExtractedMessage, MessageInfo, SourceKind};
