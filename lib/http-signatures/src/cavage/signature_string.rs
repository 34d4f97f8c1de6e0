//!
//! Utilities for handling signature strings
//!

use super::{SignatureHeader, CREATED, EXPIRES, REQUEST_TARGET};
use http::request::Parts;
use miette::Diagnostic;
use std::fmt::Write;
use thiserror::Error;

/// Signature string error
#[derive(Debug, Diagnostic, Error)]
pub enum Error {
    /// Header had an invalid value (non-UTF8 value)
    #[error(transparent)]
    InvalidHeaderValue(#[from] http::header::ToStrError),

    /// Header is missing from the request
    #[error("Missing value for `{0}`")]
    MissingHeaderValue(String),
}

/// Construct the signature string for the components covered by the signature header
#[inline]
pub fn construct(parts: &Parts, signature_header: &SignatureHeader) -> Result<String, Error> {
    construct_from(
        parts,
        signature_header.headers.iter().map(String::as_str),
        signature_header.created,
        signature_header.expires,
    )
}

/// Construct a signature string from an ordered list of component names
///
/// Every component is rendered as `<lowercased name>: <value>`, joined by new-lines.
/// Multiple values of the same header are joined by `, `.
pub fn construct_from<'a, I>(
    parts: &Parts,
    components: I,
    created: Option<u64>,
    expires: Option<u64>,
) -> Result<String, Error>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut signature_string = String::new();
    for name in components {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            REQUEST_TARGET => {
                let method = parts.method.as_str().to_lowercase();
                let path_and_query = parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| parts.uri.path(), |path_and_query| path_and_query.as_str());

                let _ = writeln!(signature_string, "{name}: {method} {path_and_query}");
            }
            CREATED => {
                let created = created.ok_or_else(|| Error::MissingHeaderValue(name.clone()))?;
                let _ = writeln!(signature_string, "{name}: {created}");
            }
            EXPIRES => {
                let expires = expires.ok_or_else(|| Error::MissingHeaderValue(name.clone()))?;
                let _ = writeln!(signature_string, "{name}: {expires}");
            }
            header => {
                let mut values = parts.headers.get_all(header).iter().peekable();
                if values.peek().is_none() {
                    return Err(Error::MissingHeaderValue(header.to_string()));
                }

                let _ = write!(signature_string, "{header}: ");
                for (idx, value) in values.enumerate() {
                    if idx > 0 {
                        signature_string.push_str(", ");
                    }
                    signature_string.push_str(value.to_str()?.trim());
                }
                signature_string.push('\n');
            }
        }
    }

    // Remove the last new-line
    signature_string.pop();

    Ok(signature_string)
}

#[cfg(test)]
mod test {
    use super::Error;
    use http::{request::Parts, Method, Request, Uri};
    use pretty_assertions::assert_eq;

    const BASIC_SIGNATURE_STRING: &str = "(request-target): get /foo?param=value&pet=dog\nhost: example.com\ndate: Sun, 05 Jan 2014 21:31:40 GMT";
    const ALL_HEADERS_SIGNATURE_STRING: &str = "(request-target): post /foo?param=value&pet=dog\n(created): 1402170695\n(expires): 1402170699\nhost: example.com\ndate: Sun, 05 Jan 2014 21:31:40 GMT\ncontent-type: application/json\ndigest: SHA-256=X48E9qOokqqrvdts8nOJRJN3OWDUoyWxBf7kbu9DBPE=\ncontent-length: 18";

    fn parts(method: Method) -> Parts {
        Request::builder()
            .method(method)
            .uri(Uri::from_static("/foo?param=value&pet=dog"))
            .header("Host", "example.com")
            .header("Date", "Sun, 05 Jan 2014 21:31:40 GMT")
            .header("Content-Type", "application/json")
            .header(
                "Digest",
                "SHA-256=X48E9qOokqqrvdts8nOJRJN3OWDUoyWxBf7kbu9DBPE=",
            )
            .header("Content-Length", "18")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn basic_signature_string() {
        let parts = parts(Method::GET);
        let signature_header = crate::cavage::parse(r#"keyId="Test",algorithm="rsa-sha256",headers="(request-target) host date",signature="cWR4""#).unwrap();
        let signature_string = super::construct(&parts, &signature_header).unwrap();

        assert_eq!(signature_string, BASIC_SIGNATURE_STRING);
    }

    #[test]
    fn all_headers_signature_string() {
        let parts = parts(Method::POST);
        let signature_header = crate::cavage::parse(r#"keyId="Test",algorithm="hs2019",created=1402170695, expires=1402170699,headers="(request-target) (created) (expires) host date content-type digest content-length",signature="cWR4""#).unwrap();
        let signature_string = super::construct(&parts, &signature_header).unwrap();

        assert_eq!(signature_string, ALL_HEADERS_SIGNATURE_STRING);
    }

    #[test]
    fn order_is_preserved() {
        let parts = parts(Method::GET);
        let signature_string =
            super::construct_from(&parts, ["date", "Host"], None, None).unwrap();

        assert_eq!(
            signature_string,
            "date: Sun, 05 Jan 2014 21:31:40 GMT\nhost: example.com"
        );
    }

    #[test]
    fn repeated_headers_are_joined() {
        let mut parts = parts(Method::GET);
        parts
            .headers
            .append("x-example", "one".parse().unwrap());
        parts
            .headers
            .append("x-example", "two".parse().unwrap());

        let signature_string =
            super::construct_from(&parts, ["x-example"], None, None).unwrap();
        assert_eq!(signature_string, "x-example: one, two");
    }

    #[test]
    fn missing_header() {
        let parts = parts(Method::GET);
        let err = super::construct_from(&parts, ["host", "object-capability"], None, None)
            .unwrap_err();

        assert!(matches!(err, Error::MissingHeaderValue(ref name) if name == "object-capability"));
    }

    #[test]
    fn missing_created() {
        let parts = parts(Method::GET);
        assert!(super::construct_from(&parts, ["(created)"], None, None).is_err());
    }
}
