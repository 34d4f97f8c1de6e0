use base58::FromBase58;
use hanko_error::{bail, hanko_error, Error, ErrorKind, Result};
use hanko_key::{key_type, KeyDocument, PublicKeyMaterial};
use http_signatures::crypto::{self, parse as key_parse};
use ring::signature::UnparsedPublicKey;

const ED25519_ALGORITHMS: &[&str] = &["ed25519", "hs2019"];
const RSA_SHA256_ALGORITHMS: &[&str] = &["rsa-sha256", "hs2019"];

/// Signature schemes supported by the verifier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerificationAlgorithm {
    Ed25519,
    RsaSha256,
}

impl VerificationAlgorithm {
    /// Pick the scheme matching the type tags of the key
    ///
    /// An algorithm declared by the client has to agree with the key type.
    pub fn select(key: &KeyDocument, declared: Option<&str>) -> Result<Self> {
        let (algorithm, allowed) = if key.has_type(key_type::ED25519_2018) {
            (Self::Ed25519, ED25519_ALGORITHMS)
        } else if key.has_type(key_type::RSA_2018) {
            (Self::RsaSha256, RSA_SHA256_ALGORITHMS)
        } else {
            bail!(
                kind = ErrorKind::InvalidState,
                "unsupported key type, expected one of `{}` or `{}`",
                key_type::ED25519_2018,
                key_type::RSA_2018
            );
        };

        if let Some(declared) = declared {
            if !allowed.contains(&declared) {
                bail!(
                    kind = ErrorKind::InvalidState,
                    "algorithm `{declared}` doesn't match key type `{}` ({})",
                    algorithm.key_type(),
                    allowed[0]
                );
            }
        }

        Ok(algorithm)
    }

    #[must_use]
    pub fn key_type(self) -> &'static str {
        match self {
            Self::Ed25519 => key_type::ED25519_2018,
            Self::RsaSha256 => key_type::RSA_2018,
        }
    }

    fn public_key(self, material: &PublicKeyMaterial) -> Result<UnparsedPublicKey<Vec<u8>>> {
        let public_key = match (self, material) {
            (Self::Ed25519, PublicKeyMaterial::Base58(encoded)) => {
                let raw = encoded.from_base58().map_err(|err| {
                    hanko_error!(kind = ErrorKind::Data, "invalid base58 key: {err:?}")
                })?;
                key_parse::ed25519_public_key(raw)
            }
            (Self::RsaSha256, PublicKeyMaterial::Pem(pem)) => key_parse::rsa_public_key(pem),
            (Self::Ed25519, PublicKeyMaterial::Pem(..)) => {
                bail!(kind = ErrorKind::Data, "Ed25519 keys have to use `publicKeyBase58`")
            }
            (Self::RsaSha256, PublicKeyMaterial::Base58(..)) => {
                bail!(kind = ErrorKind::Data, "RSA keys have to use `publicKeyPem`")
            }
        };

        public_key.map_err(|err| Error::new(ErrorKind::Data, err))
    }
}

/// Verify the signature over the signing string with the key of the document
#[instrument(skip_all, fields(key_id = %key.id))]
pub fn verify(
    key: &KeyDocument,
    declared_algorithm: Option<&str>,
    signing_string: &str,
    signature: &[u8],
) -> Result<VerificationAlgorithm> {
    let algorithm = VerificationAlgorithm::select(key, declared_algorithm)?;
    let public_key = algorithm.public_key(&key.material)?;

    crypto::verify(signing_string.as_bytes(), signature, &public_key)
        .map_err(|err| Error::new(ErrorKind::NotAllowed, err))?;

    debug!(?algorithm, "signature verified");
    Ok(algorithm)
}
