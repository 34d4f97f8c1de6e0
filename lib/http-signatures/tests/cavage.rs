use http::HeaderValue;
use http_signatures::{
    cavage::{self, signature_string},
    crypto::{self, parse::rsa_public_key},
    SIGNATURE_HEADER,
};


#[test]
fn basic_signature() {
    let parts = self::data::get_parts();
    let public_key = self::data::get_public_key();

    let signature_header = cavage::parse(self::data::DRAFT_SIGNATURE_HEADER).unwrap();
    let signature_string = signature_string::construct(&parts, &signature_header).unwrap();

    assert!(crypto::verify(
        signature_string.as_bytes(),
        &signature_header.signature,
        &public_key
    )
    .is_ok());
}

#[test]
fn tampered_signature_string() {
    let mut parts = self::data::get_parts();
    parts
        .headers
        .insert("host", HeaderValue::from_static("example.org"));
    let public_key = self::data::get_public_key();

    let signature_header = cavage::parse(self::data::DRAFT_SIGNATURE_HEADER).unwrap();
    let signature_string = signature_string::construct(&parts, &signature_header).unwrap();

    assert!(crypto::verify(
        signature_string.as_bytes(),
        &signature_header.signature,
        &public_key
    )
    .is_err());
}

#[test]
fn sign_then_verify() {
    let mut parts = self::data::get_parts();
    let private_key = self::data::get_private_key();

    let signed = cavage::sign_request(
        &mut parts,
        "https://example.com/keys/1",
        Some("rsa-sha256"),
        &["(request-target)", "host", "date", "digest"],
        &private_key,
        false,
    )
    .unwrap();

    let header = parts.headers.get(&SIGNATURE_HEADER).unwrap();
    let parsed = cavage::parse(header.to_str().unwrap()).unwrap();
    assert_eq!(parsed, signed);

    let public_key = rsa_public_key(&self::data::get_private_key_spki()).unwrap();
    let signature_string = signature_string::construct(&parts, &parsed).unwrap();
    assert!(crypto::verify(signature_string.as_bytes(), &parsed.signature, &public_key).is_ok());
}

#[test]
fn sign_into_authorization() {
    let mut parts = self::data::get_parts();
    let private_key = self::data::get_private_key();

    cavage::sign_request(
        &mut parts,
        "Test",
        None,
        &["(request-target)", "host", "date"],
        &private_key,
        true,
    )
    .unwrap();

    let header = parts.headers.get(http::header::AUTHORIZATION).unwrap();
    let parsed = cavage::parse_authorization(header.to_str().unwrap()).unwrap();
    assert_eq!(parsed.key_id, "Test");
    assert_eq!(parsed.headers, ["(request-target)", "host", "date"]);
}
