use crate::{AuthContext, User};
use async_trait::async_trait;
use hanko_error::Result;
use hanko_key::KeyResolverRegistry;
use http::request::Parts;
use serde_json::Value;

/// Fetches the raw key document for a key id
#[async_trait]
pub trait GetKey: Send + Sync {
    async fn get_key(&self, parts: &Parts, key_id: &str) -> Result<Value>;
}

/// Application-level request validation, run after the signature verified
#[async_trait]
pub trait ValidateRequest: Send + Sync {
    async fn validate_request(&self, parts: &Parts, context: &AuthContext) -> Result<()>;
}

/// Validates the capability invocations attached to the request extensions
#[async_trait]
pub trait ValidateCapabilityInvocations: Send + Sync {
    async fn validate_capability_invocations(
        &self,
        parts: &Parts,
        context: &AuthContext,
    ) -> Result<()>;
}

/// Maps the verified request to a user
#[async_trait]
pub trait GetUser: Send + Sync {
    async fn get_user(&self, parts: &Parts, context: &AuthContext) -> Result<User>;
}

/// Uses the key owner as the user
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyOwner;

#[async_trait]
impl GetUser for KeyOwner {
    async fn get_user(&self, _parts: &Parts, context: &AuthContext) -> Result<User> {
        Ok(User::new(context.key.owner.clone()))
    }
}

#[async_trait]
impl GetKey for KeyResolverRegistry {
    async fn get_key(&self, _parts: &Parts, key_id: &str) -> Result<Value> {
        self.resolve(key_id).await
    }
}
