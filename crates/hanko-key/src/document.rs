use hanko_error::{bail, hanko_error, Error, ErrorKind};
use iso8601_timestamp::Timestamp;
use serde_json::Value;

/// Encoded public key carried by a key document
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKeyMaterial {
    /// `publicKeyPem`
    Pem(String),

    /// `publicKeyBase58`
    Base58(String),
}

/// Key document that passed validation
#[derive(Clone, Debug, PartialEq)]
pub struct KeyDocument {
    pub id: String,

    /// Identifier of the entity that controls the key
    ///
    /// Falls back to `controller` when the document has no `owner`
    pub owner: String,
    pub types: Vec<String>,
    pub material: PublicKeyMaterial,
    pub revoked: Option<Timestamp>,

    /// Untouched JSON representation
    pub document: Value,
}

impl KeyDocument {
    #[must_use]
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|ty| ty == tag)
    }
}

/// Type tags of a JSON-LD node
///
/// `type` may either be a single string or a list of strings
#[must_use]
pub fn type_tags(document: &Value) -> Vec<&str> {
    match document.get("type") {
        Some(Value::String(ty)) => vec![ty.as_str()],
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Identifier referenced by a JSON-LD property
///
/// Handles both plain strings and embedded nodes carrying an `id`
#[must_use]
pub fn node_id(value: &Value) -> Option<&str> {
    match value {
        Value::String(id) => Some(id),
        Value::Object(node) => node.get("id").and_then(Value::as_str),
        _ => None,
    }
}

/// `owner` of the key, falling back to `controller`
#[must_use]
pub fn owner_of(document: &Value) -> Option<&str> {
    document
        .get("owner")
        .and_then(node_id)
        .or_else(|| document.get("controller").and_then(node_id))
}

pub(crate) fn material_of(document: &Value) -> Result<PublicKeyMaterial, Error> {
    let pem = document.get("publicKeyPem").and_then(Value::as_str);
    let base58 = document.get("publicKeyBase58").and_then(Value::as_str);

    match (pem, base58) {
        (Some(pem), None) => Ok(PublicKeyMaterial::Pem(pem.to_string())),
        (None, Some(base58)) => Ok(PublicKeyMaterial::Base58(base58.to_string())),
        (Some(..), Some(..)) => Err(hanko_error!(
            kind = ErrorKind::Data,
            "key document carries both `publicKeyPem` and `publicKeyBase58`"
        )),
        (None, None) => Err(hanko_error!(
            kind = ErrorKind::Data,
            "key document carries no public key material"
        )),
    }
}

impl TryFrom<Value> for KeyDocument {
    type Error = Error;

    fn try_from(document: Value) -> Result<Self, Self::Error> {
        let Some(id) = document.get("id").and_then(Value::as_str) else {
            bail!(kind = ErrorKind::Data, "key document has no `id`");
        };
        let Some(owner) = owner_of(&document) else {
            bail!(
                kind = ErrorKind::Data,
                "key document `{id}` has neither `owner` nor `controller`"
            );
        };

        let revoked = match document.get("revoked") {
            None | Some(Value::Null) => None,
            Some(value) => {
                let timestamp = value.as_str().and_then(Timestamp::parse);
                if timestamp.is_none() {
                    bail!(kind = ErrorKind::Type, "`revoked` isn't a valid timestamp");
                }
                timestamp
            }
        };

        Ok(Self {
            id: id.to_string(),
            owner: owner.to_string(),
            types: type_tags(&document)
                .into_iter()
                .map(ToString::to_string)
                .collect(),
            material: material_of(&document)?,
            revoked,
            document,
        })
    }
}

#[cfg(test)]
mod test {
    use super::{owner_of, type_tags, KeyDocument, PublicKeyMaterial};
    use hanko_error::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn converts_pem_document() {
        let document = json!({
            "id": "https://example.com/keys/1",
            "type": "RsaVerificationKey2018",
            "owner": "https://example.com/i/am/a/user",
            "publicKeyPem": "-----BEGIN PUBLIC KEY-----",
        });

        let key = KeyDocument::try_from(document.clone()).unwrap();
        assert_eq!(key.id, "https://example.com/keys/1");
        assert_eq!(key.owner, "https://example.com/i/am/a/user");
        assert!(key.has_type("RsaVerificationKey2018"));
        assert_eq!(
            key.material,
            PublicKeyMaterial::Pem("-----BEGIN PUBLIC KEY-----".into())
        );
        assert_eq!(key.revoked, None);
        assert_eq!(key.document, document);
    }

    #[test]
    fn controller_fallback() {
        let document = json!({ "controller": { "id": "did:example:123" } });
        assert_eq!(owner_of(&document), Some("did:example:123"));

        let document = json!({ "owner": "a", "controller": "b" });
        assert_eq!(owner_of(&document), Some("a"));
    }

    #[test]
    fn type_list() {
        let document = json!({ "type": ["CryptographicKey", 1, "Ed25519VerificationKey2018"] });
        assert_eq!(
            type_tags(&document),
            ["CryptographicKey", "Ed25519VerificationKey2018"]
        );
        assert!(type_tags(&json!({})).is_empty());
    }

    #[test]
    fn ambiguous_material() {
        let document = json!({
            "id": "did:example:123#key",
            "owner": "did:example:123",
            "publicKeyPem": "pem",
            "publicKeyBase58": "base58",
        });

        let err = KeyDocument::try_from(document).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);
    }

    #[test]
    fn unparseable_revocation() {
        let document = json!({
            "id": "did:example:123#key",
            "owner": "did:example:123",
            "publicKeyBase58": "base58",
            "revoked": "yesterday",
        });

        let err = KeyDocument::try_from(document).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }
}
