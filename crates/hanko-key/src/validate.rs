use crate::{
    document::{material_of, node_id, owner_of, type_tags},
    KeyDocument, KeyResolver,
};
use async_trait::async_trait;
use hanko_error::{bail, ErrorKind, Result};
use iso8601_timestamp::Timestamp;
use serde_json::Value;
use smol_str::SmolStr;
use std::sync::Arc;

pub struct ValidationOptions<'a> {
    /// Key types of which the document has to carry at least one
    pub accepted_types: &'a [SmolStr],

    /// Verification relationship the controller has to list the key under
    pub proof_purpose: Option<&'a str>,

    /// Reference point for the revocation check
    pub now: Timestamp,
}

/// Consistency check run against every resolved key document
#[async_trait]
pub trait KeyCheck: Send + Sync {
    async fn check(&self, document: &Value, options: &ValidationOptions<'_>) -> Result<()>;
}

/// Checks the shape of the key and its relationship with its controller
///
/// When a proof purpose is requested, the controller document gets resolved
/// and has to list the key under that purpose.
#[derive(Clone)]
pub struct ControllerKeyCheck {
    resolver: Arc<dyn KeyResolver>,
}

impl ControllerKeyCheck {
    #[must_use]
    pub fn new(resolver: Arc<dyn KeyResolver>) -> Self {
        Self { resolver }
    }
}

fn lists_key(relationship: Option<&Value>, key_id: &str) -> bool {
    match relationship {
        Some(Value::Array(entries)) => entries.iter().any(|entry| node_id(entry) == Some(key_id)),
        Some(entry) => node_id(entry) == Some(key_id),
        None => false,
    }
}

#[async_trait]
impl KeyCheck for ControllerKeyCheck {
    async fn check(&self, document: &Value, options: &ValidationOptions<'_>) -> Result<()> {
        let Some(id) = document.get("id").and_then(Value::as_str) else {
            bail!(kind = ErrorKind::Data, "key document has no `id`");
        };

        let types = type_tags(document);
        if !options
            .accepted_types
            .iter()
            .any(|accepted| types.contains(&accepted.as_str()))
        {
            bail!(
                kind = ErrorKind::Data,
                "key `{id}` has none of the accepted types"
            );
        }

        let Some(owner) = owner_of(document) else {
            bail!(
                kind = ErrorKind::Data,
                "key `{id}` has neither `owner` nor `controller`"
            );
        };
        material_of(document)?;

        if let Some(purpose) = options.proof_purpose {
            let controller = self.resolver.resolve(owner).await?;
            if controller.get("id").and_then(Value::as_str) != Some(owner) {
                bail!(
                    kind = ErrorKind::Data,
                    "controller document doesn't match `{owner}`"
                );
            }
            if !lists_key(controller.get(purpose), id) {
                bail!(
                    kind = ErrorKind::Data,
                    "`{owner}` doesn't authorise `{id}` for `{purpose}`"
                );
            }
        }

        Ok(())
    }
}

/// Validate a resolved key document
///
/// Checks run in order: document shape, revocation status, the key check
/// and finally the conversion into a [`KeyDocument`].
#[instrument(skip_all)]
pub async fn validate(
    document: Value,
    options: &ValidationOptions<'_>,
    key_check: &dyn KeyCheck,
) -> Result<KeyDocument> {
    if !document.is_object() {
        bail!(kind = ErrorKind::Data, "key document isn't a JSON object");
    }

    match document.get("revoked") {
        None | Some(Value::Null) => {}
        Some(Value::String(revoked)) => {
            let Some(timestamp) = Timestamp::parse(revoked) else {
                bail!(
                    kind = ErrorKind::Type,
                    "`revoked` isn't a valid timestamp: {revoked:?}"
                );
            };
            if timestamp < options.now {
                bail!(
                    kind = ErrorKind::InvalidState,
                    "key has been revoked at {revoked}"
                );
            }
        }
        Some(..) => bail!(kind = ErrorKind::Type, "`revoked` isn't a string"),
    }

    key_check
        .check(&document, options)
        .await
        .map_err(|err| err.wrap(ErrorKind::Data, "key document failed the key check"))?;

    let key = KeyDocument::try_from(document)?;
    debug!(id = %key.id, owner = %key.owner, "key document is valid");

    Ok(key)
}
