use super::{signature_string, SignatureHeader};
use crate::{crypto::SigningKey, SIGNATURE_HEADER};
use http::{
    header::{InvalidHeaderValue, AUTHORIZATION},
    request::Parts,
    HeaderValue,
};
use miette::Diagnostic;
use thiserror::Error;

/// Signing error
#[derive(Debug, Diagnostic, Error)]
pub enum SignError {
    /// Serialised header isn't a valid header value
    #[error(transparent)]
    InvalidHeaderValue(#[from] InvalidHeaderValue),

    /// Signature string construction failure
    #[error(transparent)]
    SignatureStringConstruction(#[from] signature_string::Error),

    /// The signing key failed to produce a signature
    #[error("Failed to sign message")]
    Signing,
}

/// Sign the request parts over the provided components
///
/// The signature is inserted as an `Authorization: Signature ...` header if `authorization` is set,
/// otherwise as a `Signature` header. All covered headers have to be set before calling this.
pub fn sign_request<SK>(
    parts: &mut Parts,
    key_id: &str,
    algorithm: Option<&str>,
    components: &[&str],
    key: &SK,
    authorization: bool,
) -> Result<SignatureHeader, SignError>
where
    SK: SigningKey,
{
    let mut signature_header = SignatureHeader {
        key_id: key_id.to_string(),
        algorithm: algorithm.map(ToString::to_string),
        headers: components
            .iter()
            .map(|component| component.to_ascii_lowercase())
            .collect(),
        signature: Vec::new(),
        created: None,
        expires: None,
    };

    let signature_string = signature_string::construct(parts, &signature_header)?;
    signature_header.signature = key
        .sign(signature_string.as_bytes())
        .map_err(|_| SignError::Signing)?
        .as_ref()
        .to_vec();

    let serialised = super::serialise(&signature_header);
    if authorization {
        let value = HeaderValue::from_str(&format!("Signature {serialised}"))?;
        parts.headers.insert(AUTHORIZATION, value);
    } else {
        let value = HeaderValue::from_str(&serialised)?;
        parts.headers.insert(&SIGNATURE_HEADER, value);
    }

    Ok(signature_header)
}
