use super::KeyResolver;
use crate::{key_type, CAPABILITY_INVOCATION};
use async_trait::async_trait;
use base58::{FromBase58, ToBase58};
use hanko_error::{bail, hanko_error, ErrorKind, Result};
use serde_json::{json, Value};

/// Multicodec prefix of an Ed25519 public key
const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];
const ED25519_KEY_LENGTH: usize = 32;

const DID_KEY_PREFIX: &str = "did:key:";
const DID_CONTEXT: &str = "https://w3id.org/did/v0.11";

/// Verification relationships a `did:key` document grants its single key
const PROOF_PURPOSES: &[&str] = &[
    "authentication",
    "assertionMethod",
    "capabilityDelegation",
    CAPABILITY_INVOCATION,
];

/// Derives documents for the `did:key` method
///
/// Only Ed25519 keys are supported. Resolving the bare DID yields the DID document,
/// resolving `did:key:<fingerprint>#<fingerprint>` yields the key itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct DidKeyResolver;

/// Encode a raw Ed25519 public key as a `did:key` identifier
#[must_use]
pub fn encode(public_key: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(ED25519_MULTICODEC.len() + public_key.len());
    bytes.extend_from_slice(&ED25519_MULTICODEC);
    bytes.extend_from_slice(public_key);

    format!("{DID_KEY_PREFIX}z{}", bytes.to_base58())
}

fn decode(fingerprint: &str) -> Result<Vec<u8>> {
    let Some(encoded) = fingerprint.strip_prefix('z') else {
        bail!(
            kind = ErrorKind::NotFound,
            "`did:key` fingerprint isn't base58btc encoded"
        );
    };
    let bytes = encoded
        .from_base58()
        .map_err(|err| hanko_error!(kind = ErrorKind::NotFound, "invalid fingerprint: {err:?}"))?;

    match bytes.strip_prefix(ED25519_MULTICODEC.as_slice()) {
        Some(key) if key.len() == ED25519_KEY_LENGTH => Ok(key.to_vec()),
        Some(..) => bail!(
            kind = ErrorKind::NotFound,
            "Ed25519 key has to be {ED25519_KEY_LENGTH} bytes long"
        ),
        None => bail!(
            kind = ErrorKind::NotSupported,
            "`did:key` fingerprint doesn't describe an Ed25519 key"
        ),
    }
}

#[async_trait]
impl KeyResolver for DidKeyResolver {
    async fn resolve(&self, id: &str) -> Result<Value> {
        let (did, fragment) = match id.split_once('#') {
            Some((did, fragment)) => (did, Some(fragment)),
            None => (id, None),
        };
        let Some(fingerprint) = did.strip_prefix(DID_KEY_PREFIX) else {
            bail!(
                kind = ErrorKind::NotSupported,
                "unsupported DID method in `{did}`"
            );
        };

        let public_key = decode(fingerprint)?;
        let key_id = format!("{did}#{fingerprint}");
        let key = json!({
            "id": key_id,
            "type": key_type::ED25519_2018,
            "controller": did,
            "publicKeyBase58": public_key.to_base58(),
        });

        match fragment {
            None => {
                let mut document = json!({
                    "@context": DID_CONTEXT,
                    "id": did,
                    "verificationMethod": [key],
                });
                for purpose in PROOF_PURPOSES {
                    document[*purpose] = json!([key_id]);
                }

                Ok(document)
            }
            Some(fragment) if fragment == fingerprint => Ok(key),
            Some(fragment) => bail!(
                kind = ErrorKind::NotFound,
                "`{did}` has no key `#{fragment}`"
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{encode, DidKeyResolver};
    use crate::resolver::KeyResolver;
    use base58::ToBase58;
    use hanko_error::ErrorKind;
    use pretty_assertions::assert_eq;

    const PUBLIC_KEY: [u8; 32] = [7; 32];

    #[test]
    fn encodes_fingerprint() {
        let did = encode(&PUBLIC_KEY);
        assert!(did.starts_with("did:key:z6Mk"));
    }

    #[tokio::test]
    async fn resolves_document() {
        let did = encode(&PUBLIC_KEY);
        let document = DidKeyResolver.resolve(&did).await.unwrap();
        let fingerprint = did.trim_start_matches("did:key:");
        let key_id = format!("{did}#{fingerprint}");

        assert_eq!(document["id"], did);
        assert_eq!(document["verificationMethod"][0]["id"], key_id);
        assert_eq!(document["capabilityInvocation"][0], key_id);
        assert_eq!(document["authentication"][0], key_id);
    }

    #[tokio::test]
    async fn resolves_key() {
        let did = encode(&PUBLIC_KEY);
        let fingerprint = did.trim_start_matches("did:key:");
        let key = DidKeyResolver
            .resolve(&format!("{did}#{fingerprint}"))
            .await
            .unwrap();

        assert_eq!(key["type"], "Ed25519VerificationKey2018");
        assert_eq!(key["controller"], did);
        assert_eq!(key["publicKeyBase58"], PUBLIC_KEY.to_base58());
    }

    #[tokio::test]
    async fn unknown_fragment() {
        let did = encode(&PUBLIC_KEY);
        let err = DidKeyResolver
            .resolve(&format!("{did}#other"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn other_methods() {
        let err = DidKeyResolver.resolve("did:web:example.com").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
    }
}
