//!
//! Implementation of the cavage draft of HTTP signatures
//!

mod parse;
mod safety_check;
mod serialise;
mod sign;

pub mod signature_string;

pub use self::{
    parse::{parse, parse_authorization, ParseError},
    safety_check::{is_fresh, SafetyCheckError},
    serialise::serialise,
    sign::{sign_request, SignError},
};

/// Pseudo-header covering the lowercased method and the path and query of the request
pub const REQUEST_TARGET: &str = "(request-target)";

/// Pseudo-header covering the creation timestamp
pub const CREATED: &str = "(created)";

/// Pseudo-header covering the expiration timestamp
pub const EXPIRES: &str = "(expires)";

/// Parsed `Signature` header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Identifier of the key the request was signed with
    pub key_id: String,

    /// Algorithm the client claims to have used
    pub algorithm: Option<String>,

    /// Covered components, lowercased and in the order they were signed in
    pub headers: Vec<String>,

    /// Decoded signature
    pub signature: Vec<u8>,

    /// UNIX timestamp of the creation of the signature
    pub created: Option<u64>,

    /// UNIX timestamp of the expiration of the signature
    pub expires: Option<u64>,
}

impl SignatureHeader {
    /// Check whether a component is part of the signed components
    #[must_use]
    pub fn covers(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|header| header.eq_ignore_ascii_case(name))
    }
}
