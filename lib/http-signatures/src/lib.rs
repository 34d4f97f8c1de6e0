//!
//! Cavage HTTP signatures
//!
//! Parsing, signing string construction, signing and verification of `Signature` headers.
//! Only asymmetric schemes are supported (RSA PKCS#1 v1.5 with SHA-256 and Ed25519).
//!

use http::HeaderName;

pub mod cavage;
pub mod crypto;

/// Header carrying the cavage signature parameters
pub static SIGNATURE_HEADER: HeaderName = HeaderName::from_static("signature");
