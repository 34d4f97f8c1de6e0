use http::{request::Parts, Method, Request};
use http_signatures::{cavage, crypto::SigningKey};
use std::time::SystemTime;

pub const DEFAULT_COMPONENTS: &[&str] = &["(request-target)", "host", "date"];

/// Request parts with a current `Date` header
#[must_use]
pub fn request(method: Method, uri: &str) -> Parts {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("host", "example.com")
        .header("date", httpdate::fmt_http_date(SystemTime::now()))
        .header("content-type", "application/json")
        .body(())
        .unwrap()
        .into_parts()
        .0
}

/// Sign the parts and attach the `Signature` header
pub fn sign<K>(parts: &mut Parts, key_id: &str, algorithm: Option<&str>, components: &[&str], key: &K)
where
    K: SigningKey,
{
    cavage::sign_request(parts, key_id, algorithm, components, key, false).unwrap();
}
