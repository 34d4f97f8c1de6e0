#[macro_use]
extern crate tracing;

use self::extract::SignedRequest;
use hanko_capability::{CapabilityInvocations, GetObjectCapability, UnsupportedObjectCapability};
use hanko_error::{bail, Error, ErrorKind, Result};
use hanko_key::{KeyCheck, KeyDocument, ValidationOptions, CAPABILITY_INVOCATION};
use http::request::Parts;
use http_signatures::cavage::SignatureHeader;
use iso8601_timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{sync::Arc, time::SystemTime};
use typed_builder::TypedBuilder;

pub use self::{
    hook::{GetKey, GetUser, KeyOwner, ValidateCapabilityInvocations, ValidateRequest},
    verify::VerificationAlgorithm,
};

pub mod extract;
pub mod hook;
pub mod verify;

/// Authenticated principal
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub id: String,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl User {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }
}

/// State of a request that passed key resolution and signature verification
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub signature: SignatureHeader,
    pub signing_string: String,
    pub key: KeyDocument,
    pub algorithm: VerificationAlgorithm,
}

#[derive(Debug)]
pub enum AuthenticationOutcome {
    Accepted(User),

    /// The credential couldn't be parsed, other strategies may still authenticate the request
    Rejected(Error),

    /// Authentication failed and the request should be aborted
    Errored(Error),
}

impl AuthenticationOutcome {
    pub fn into_result(self) -> Result<User> {
        match self {
            Self::Accepted(user) => Ok(user),
            Self::Rejected(err) | Self::Errored(err) => Err(err),
        }
    }
}

/// HTTP signature authentication strategy
///
/// Built once and shared across requests.
#[derive(Clone, TypedBuilder)]
pub struct Strategy {
    #[builder(default, setter(strip_option))]
    get_key: Option<Arc<dyn GetKey>>,

    #[builder(default, setter(strip_option))]
    validate_request: Option<Arc<dyn ValidateRequest>>,

    #[builder(default, setter(strip_option))]
    validate_capability_invocations: Option<Arc<dyn ValidateCapabilityInvocations>>,

    #[builder(default = Arc::new(KeyOwner) as Arc<dyn GetUser>)]
    get_user: Arc<dyn GetUser>,

    #[builder(default = Arc::new(UnsupportedObjectCapability) as Arc<dyn GetObjectCapability>)]
    get_object_capability: Arc<dyn GetObjectCapability>,

    key_check: Arc<dyn KeyCheck>,

    #[builder(default)]
    config: hanko_config::verification::Configuration,
}

impl Strategy {
    fn required_hooks(&self) -> Result<(&dyn GetKey, &dyn ValidateRequest)> {
        let Some(get_key) = self.get_key.as_deref() else {
            bail!(kind = ErrorKind::InvalidState, "`getKey` hook isn't configured");
        };
        let Some(validate_request) = self.validate_request.as_deref() else {
            bail!(
                kind = ErrorKind::InvalidState,
                "`validateRequest` hook isn't configured"
            );
        };

        Ok((get_key, validate_request))
    }

    #[instrument(skip_all, fields(key_id = %signed.signature.key_id))]
    async fn resolve_key(
        &self,
        get_key: &dyn GetKey,
        parts: &Parts,
        signed: &SignedRequest,
    ) -> Result<KeyDocument> {
        let document = get_key.get_key(parts, &signed.signature.key_id).await?;

        let proof_purpose = signed
            .signature
            .covers(hanko_capability::OBJECT_CAPABILITY.as_str())
            .then_some(CAPABILITY_INVOCATION);
        let options = ValidationOptions {
            accepted_types: &self.config.accepted_key_types,
            proof_purpose,
            now: Timestamp::now_utc(),
        };

        hanko_key::validate(document, &options, self.key_check.as_ref()).await
    }

    async fn run(
        &self,
        parts: &mut Parts,
        get_key: &dyn GetKey,
        validate_request: &dyn ValidateRequest,
        signed: SignedRequest,
    ) -> Result<User> {
        hanko_capability::ensure_signed(parts, &signed.signature)?;

        let key = self.resolve_key(get_key, parts, &signed).await?;
        let algorithm = verify::verify(
            &key,
            signed.signature.algorithm.as_deref(),
            &signed.signing_string,
            &signed.signature.signature,
        )?;

        let capabilities = hanko_capability::process(
            parts,
            &signed.signature,
            self.get_object_capability.as_ref(),
        )
        .await?;
        let has_capabilities = capabilities.is_some();
        if let Some(capabilities) = capabilities {
            parts
                .extensions
                .insert(CapabilityInvocations(capabilities));
        }

        let context = AuthContext {
            signature: signed.signature,
            signing_string: signed.signing_string,
            key,
            algorithm,
        };

        validate_request.validate_request(parts, &context).await?;

        if has_capabilities {
            let Some(validate_capabilities) = self.validate_capability_invocations.as_deref()
            else {
                bail!(
                    kind = ErrorKind::NotSupported,
                    "`validateCapabilityInvocations` hook isn't configured"
                );
            };
            validate_capabilities
                .validate_capability_invocations(parts, &context)
                .await?;
        }

        self.get_user.get_user(parts, &context).await
    }

    /// Authenticate a request
    ///
    /// Capability invocations carried by the request get inserted into its extensions
    /// as [`CapabilityInvocations`].
    #[instrument(skip_all, fields(method = %parts.method, uri = %parts.uri))]
    pub async fn authenticate(&self, parts: &mut Parts) -> AuthenticationOutcome {
        let (get_key, validate_request) = match self.required_hooks() {
            Ok(hooks) => hooks,
            Err(err) => {
                error!(error = %err, "strategy is misconfigured");
                return AuthenticationOutcome::Errored(err);
            }
        };

        let signed = match extract::extract(parts, &self.config, SystemTime::now()) {
            Ok(signed) => signed,
            Err(err) => {
                debug!(error = %err, "rejecting credential");
                return AuthenticationOutcome::Rejected(err);
            }
        };

        match self.run(parts, get_key, validate_request, signed).await {
            Ok(user) => {
                debug!(user = %user.id, "request authenticated");
                AuthenticationOutcome::Accepted(user)
            }
            Err(err) => {
                debug!(error = %err, "authentication failed");
                AuthenticationOutcome::Errored(err)
            }
        }
    }
}
