#[macro_use]
extern crate tracing;

use self::header::CapabilityHeader;
use async_trait::async_trait;
use futures_util::future::try_join_all;
use hanko_error::{bail, ErrorKind, Result};
use http::{request::Parts, HeaderName};
use http_signatures::cavage::SignatureHeader;
use serde_json::Value;

pub mod header;

pub static OBJECT_CAPABILITY: HeaderName = HeaderName::from_static("object-capability");

pub const TYPE_URL: &str = "url";
pub const TYPE_OCAPLD: &str = "ocapld";

/// Dereferences capability identifiers (`type=url`)
#[async_trait]
pub trait GetObjectCapability: Send + Sync {
    async fn get_object_capability(&self, id: &str, parts: &Parts) -> Result<Value>;
}

/// Rejects every capability identifier
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedObjectCapability;

#[async_trait]
impl GetObjectCapability for UnsupportedObjectCapability {
    async fn get_object_capability(&self, id: &str, _parts: &Parts) -> Result<Value> {
        bail!(
            kind = ErrorKind::NotSupported,
            "no hook to dereference capability `{id}`"
        );
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CapabilityInvocation {
    pub capability: Value,
    pub action: Option<String>,
}

/// Invocations attached to the request extensions, in header order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CapabilityInvocations(pub Vec<CapabilityInvocation>);

/// Raw `Object-Capability` values of the request
///
/// Repeated headers and comma-folded values are both split into separate entries
pub fn header_values(parts: &Parts) -> Result<Vec<&str>> {
    let mut values = Vec::new();
    for value in parts.headers.get_all(&OBJECT_CAPABILITY) {
        let Ok(value) = value.to_str() else {
            bail!(
                kind = ErrorKind::Syntax,
                "`{OBJECT_CAPABILITY}` header isn't valid ASCII"
            );
        };

        values.extend(value.split(',').map(str::trim).filter(|value| !value.is_empty()));
    }

    Ok(values)
}

async fn resolve(
    header: CapabilityHeader,
    parts: &Parts,
    hook: &dyn GetObjectCapability,
) -> Result<CapabilityInvocation> {
    let capability = match header.ty.as_str() {
        TYPE_URL => {
            let Ok(id) = std::str::from_utf8(&header.value) else {
                bail!(
                    kind = ErrorKind::Syntax,
                    "capability identifier isn't valid UTF-8"
                );
            };
            hook.get_object_capability(id, parts).await?
        }
        TYPE_OCAPLD => match serde_json::from_slice(&header.value) {
            Ok(capability @ Value::Object(..)) => capability,
            Ok(..) => bail!(
                kind = ErrorKind::Syntax,
                "embedded capability isn't a JSON object"
            ),
            Err(err) => bail!(
                kind = ErrorKind::Syntax,
                "embedded capability isn't valid JSON: {err}"
            ),
        },
        other => bail!(
            kind = ErrorKind::Syntax,
            "unsupported capability type `{other}`"
        ),
    };

    Ok(CapabilityInvocation {
        capability,
        action: header.action,
    })
}

/// Fail if the request carries capability invocations the signature doesn't cover
pub fn ensure_signed(parts: &Parts, signature: &SignatureHeader) -> Result<()> {
    if parts.headers.contains_key(&OBJECT_CAPABILITY)
        && !signature.covers(OBJECT_CAPABILITY.as_str())
    {
        bail!(
            kind = ErrorKind::Syntax,
            "`{OBJECT_CAPABILITY}` header was not signed"
        );
    }

    Ok(())
}

/// Parse and resolve the capability invocations carried by the request
///
/// Returns `None` if the request doesn't carry any. The header has to be covered
/// by the signature. Entries resolve concurrently, the first failure aborts the whole list.
#[instrument(skip_all)]
pub async fn process(
    parts: &Parts,
    signature: &SignatureHeader,
    hook: &dyn GetObjectCapability,
) -> Result<Option<Vec<CapabilityInvocation>>> {
    let values = header_values(parts)?;
    if values.is_empty() {
        return Ok(None);
    }

    ensure_signed(parts, signature)?;

    let headers = values
        .into_iter()
        .map(header::parse)
        .collect::<Result<Vec<_>>>()?;

    debug!(count = headers.len(), "resolving capabilities");
    let invocations =
        try_join_all(headers.into_iter().map(|header| resolve(header, parts, hook))).await?;

    Ok(Some(invocations))
}
