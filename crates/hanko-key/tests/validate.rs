use hanko_config::verification::DEFAULT_ACCEPTED_KEY_TYPES;
use hanko_error::ErrorKind;
use hanko_key::{
    resolver::{did_key, DidKeyResolver, MemoryResolver},
    validate, ControllerKeyCheck, KeyDocument, KeyResolverRegistry, PublicKeyMaterial,
    ValidationOptions, CAPABILITY_INVOCATION,
};
use iso8601_timestamp::Timestamp;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use smol_str::SmolStr;
use std::sync::Arc;

const KEY_ID: &str = "https://example.com/i/am/a/key";
const OWNER: &str = "https://example.com/i/am/a/user";

fn accepted_types() -> Vec<SmolStr> {
    DEFAULT_ACCEPTED_KEY_TYPES
        .iter()
        .copied()
        .map(SmolStr::new_static)
        .collect()
}

fn now() -> Timestamp {
    Timestamp::parse("2024-06-01T00:00:00Z").unwrap()
}

fn key_document() -> Value {
    json!({
        "id": KEY_ID,
        "type": "RsaVerificationKey2018",
        "owner": OWNER,
        "publicKeyPem": "-----BEGIN PUBLIC KEY-----",
    })
}

fn key_check(owner_document: Value) -> ControllerKeyCheck {
    let registry = KeyResolverRegistry::builder()
        .register("https", MemoryResolver::default().with_document(owner_document))
        .register("did", DidKeyResolver)
        .build();

    ControllerKeyCheck::new(Arc::new(registry))
}

async fn run(document: Value, proof_purpose: Option<&str>) -> hanko_error::Result<KeyDocument> {
    let accepted_types = accepted_types();
    let options = ValidationOptions {
        accepted_types: &accepted_types,
        proof_purpose,
        now: now(),
    };
    let check = key_check(json!({
        "id": OWNER,
        "capabilityInvocation": [{ "id": KEY_ID }],
    }));

    validate(document, &options, &check).await
}

#[tokio::test]
async fn accepts_valid_document() {
    let key = run(key_document(), None).await.unwrap();

    assert_eq!(key.id, KEY_ID);
    assert_eq!(key.owner, OWNER);
    assert!(matches!(key.material, PublicKeyMaterial::Pem(..)));
}

#[tokio::test]
async fn rejects_non_objects() {
    for document in [Value::Null, json!([]), json!("key")] {
        let err = run(document, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);
    }
}

#[tokio::test]
async fn revoked_in_the_past() {
    let mut document = key_document();
    document["revoked"] = json!("2020-01-01T00:00:00Z");

    let err = run(document, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn revoked_in_the_future() {
    let mut document = key_document();
    document["revoked"] = json!("2030-01-01T00:00:00Z");

    let key = run(document, None).await.unwrap();
    assert!(key.revoked.is_some());
}

#[tokio::test]
async fn unparseable_revocation() {
    for revoked in [json!("not a date"), json!(1_577_836_800)] {
        let mut document = key_document();
        document["revoked"] = revoked;

        let err = run(document, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }
}

#[tokio::test]
async fn key_check_failure_is_data_error() {
    let mut document = key_document();
    document["type"] = json!("SomeOtherKey");

    let err = run(document, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);
    assert!(err.to_string().contains("key check"));
}

#[tokio::test]
async fn controller_fallback() {
    let mut document = key_document();
    let owner = document
        .as_object_mut()
        .unwrap()
        .remove("owner")
        .unwrap();
    document["controller"] = owner;

    let key = run(document, None).await.unwrap();
    assert_eq!(key.owner, OWNER);
}

#[tokio::test]
async fn proof_purpose_listed() {
    let key = run(key_document(), Some(CAPABILITY_INVOCATION)).await.unwrap();
    assert_eq!(key.id, KEY_ID);
}

#[tokio::test]
async fn proof_purpose_missing() {
    let err = run(key_document(), Some("capabilityDelegation"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);
}

#[tokio::test]
async fn did_key_controller() {
    let did = did_key::encode(&[3; 32]);
    let fingerprint = did.trim_start_matches("did:key:");
    let registry = KeyResolverRegistry::builder()
        .register("did", DidKeyResolver)
        .build();
    let document = registry
        .resolve(&format!("{did}#{fingerprint}"))
        .await
        .unwrap();

    let accepted_types = accepted_types();
    let options = ValidationOptions {
        accepted_types: &accepted_types,
        proof_purpose: Some(CAPABILITY_INVOCATION),
        now: now(),
    };
    let check = ControllerKeyCheck::new(Arc::new(registry));

    let key = validate(document, &options, &check).await.unwrap();
    assert_eq!(key.owner, did);
    assert!(matches!(key.material, PublicKeyMaterial::Base58(..)));
}
