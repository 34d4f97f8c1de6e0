//!
//! Parse cryptographic keys for use in the HTTP signature implementations
//!

use const_oid::db::{rfc5912::RSA_ENCRYPTION, rfc8410::ID_ED_25519};
use miette::Diagnostic;
use pkcs8::{Document, SubjectPublicKeyInfoRef};
use ring::signature::{
    UnparsedPublicKey, ED25519, ED25519_PUBLIC_KEY_LEN, RSA_PKCS1_2048_8192_SHA256,
};
use thiserror::Error;

/// Key parsing error
#[derive(Debug, Diagnostic, Error)]
pub enum Error {
    /// Malformed DER structure
    #[error(transparent)]
    Der(#[from] pkcs8::der::Error),

    /// Key rejected
    #[error(transparent)]
    KeyRejected(#[from] ring::error::KeyRejected),

    /// Malformed key
    #[error("Malformed key")]
    MalformedKey,

    /// Malformed PKCS#8 document
    #[error(transparent)]
    Pkcs8(#[from] pkcs8::Error),

    /// Unknown key type
    #[error("Unknown key type")]
    UnknownKeyType,
}

fn subject_public_key(pem: &str) -> Result<(bool, Vec<u8>), Error> {
    let (_pem_tag, document) = Document::from_pem(pem.trim())?;
    let spki: SubjectPublicKeyInfoRef<'_> = document.decode_msg()?;

    let is_rsa = if spki.algorithm.oid == RSA_ENCRYPTION {
        true
    } else if spki.algorithm.oid == ID_ED_25519 {
        false
    } else {
        return Err(Error::UnknownKeyType);
    };

    let raw_bytes = spki
        .subject_public_key
        .as_bytes()
        .ok_or(Error::MalformedKey)?
        .to_vec();

    Ok((is_rsa, raw_bytes))
}

/// Parse an RSA public key from its SPKI PEM form
///
/// The returned key verifies RSA PKCS#1 v1.5 signatures using SHA-256
#[inline]
pub fn rsa_public_key(pem: &str) -> Result<UnparsedPublicKey<Vec<u8>>, Error> {
    match subject_public_key(pem)? {
        (true, raw_bytes) => Ok(UnparsedPublicKey::new(
            &RSA_PKCS1_2048_8192_SHA256,
            raw_bytes,
        )),
        (false, ..) => Err(Error::UnknownKeyType),
    }
}

/// Wrap a raw Ed25519 public key
#[inline]
pub fn ed25519_public_key(raw: Vec<u8>) -> Result<UnparsedPublicKey<Vec<u8>>, Error> {
    if raw.len() != ED25519_PUBLIC_KEY_LEN {
        return Err(Error::MalformedKey);
    }

    Ok(UnparsedPublicKey::new(&ED25519, raw))
}
