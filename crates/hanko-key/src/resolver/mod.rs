use async_trait::async_trait;
use hanko_error::{bail, ErrorKind, Result};
use serde_json::Value;
use smol_str::SmolStr;
use std::{collections::HashMap, sync::Arc};

pub use self::{did_key::DidKeyResolver, https::HttpsResolver, memory::MemoryResolver};

pub mod did_key;
pub mod https;
pub mod memory;

/// Retrieves the JSON document an identifier refers to
#[async_trait]
pub trait KeyResolver: Send + Sync {
    async fn resolve(&self, id: &str) -> Result<Value>;
}

#[async_trait]
impl<T> KeyResolver for Arc<T>
where
    T: KeyResolver + ?Sized,
{
    async fn resolve(&self, id: &str) -> Result<Value> {
        (**self).resolve(id).await
    }
}

/// Scheme of an identifier, lowercased
///
/// Everything in front of the first `:`
#[must_use]
pub fn scheme(id: &str) -> Option<SmolStr> {
    let (scheme, _rest) = id.split_once(':')?;
    if scheme.is_empty() {
        return None;
    }

    Some(SmolStr::from(scheme.to_ascii_lowercase()))
}

/// Dispatches resolution based on the scheme of the identifier
#[derive(Clone, Default)]
pub struct KeyResolverRegistry {
    resolvers: HashMap<SmolStr, Arc<dyn KeyResolver>>,
}

impl KeyResolverRegistry {
    #[must_use]
    pub fn builder() -> KeyResolverRegistryBuilder {
        KeyResolverRegistryBuilder::default()
    }

    /// Registry with the built-in resolvers enabled in the configuration
    pub fn from_config(config: &hanko_config::resolver::Configuration) -> Result<Self> {
        let mut builder = Self::builder();
        for scheme in &config.schemes {
            builder = match scheme.as_str() {
                "https" => builder.register("https", HttpsResolver::from_config(config)?),
                "did" => builder.register("did", DidKeyResolver),
                other => bail!(
                    kind = ErrorKind::InvalidState,
                    "no built-in resolver for scheme `{other}`"
                ),
            };
        }

        Ok(builder.build())
    }

    #[must_use]
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.resolvers.keys().map(SmolStr::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, id: &str) -> Result<Value> {
        let Some(scheme) = scheme(id) else {
            bail!(
                kind = ErrorKind::NotSupported,
                "identifier `{id}` has no scheme"
            );
        };
        let Some(resolver) = self.resolvers.get(&scheme) else {
            bail!(
                kind = ErrorKind::NotSupported,
                "unsupported key id scheme `{scheme}`"
            );
        };

        debug!(%scheme, "resolving document");
        resolver.resolve(id).await
    }
}

#[async_trait]
impl KeyResolver for KeyResolverRegistry {
    async fn resolve(&self, id: &str) -> Result<Value> {
        KeyResolverRegistry::resolve(self, id).await
    }
}

#[derive(Default)]
pub struct KeyResolverRegistryBuilder {
    resolvers: HashMap<SmolStr, Arc<dyn KeyResolver>>,
}

impl KeyResolverRegistryBuilder {
    /// Register a resolver for a scheme
    ///
    /// Replaces any resolver previously registered for the same scheme
    #[must_use]
    pub fn register<R>(mut self, scheme: &str, resolver: R) -> Self
    where
        R: KeyResolver + 'static,
    {
        self.resolvers
            .insert(scheme.to_ascii_lowercase().into(), Arc::new(resolver));
        self
    }

    #[must_use]
    pub fn build(self) -> KeyResolverRegistry {
        KeyResolverRegistry {
            resolvers: self.resolvers,
        }
    }
}
