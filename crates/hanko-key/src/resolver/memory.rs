use super::KeyResolver;
use async_trait::async_trait;
use hanko_error::{bail, ErrorKind, Result};
use serde_json::Value;
use std::collections::HashMap;

/// Serves documents out of an in-memory map
#[derive(Clone, Debug, Default)]
pub struct MemoryResolver {
    documents: HashMap<String, Value>,
}

impl MemoryResolver {
    /// Insert a document under an explicit identifier
    pub fn insert(&mut self, id: impl Into<String>, document: Value) {
        self.documents.insert(id.into(), document);
    }

    /// Insert a document under its own `id`
    ///
    /// Documents without a string `id` are skipped
    #[must_use]
    pub fn with_document(mut self, document: Value) -> Self {
        if let Some(id) = document.get("id").and_then(Value::as_str) {
            self.insert(id.to_string(), document);
        }
        self
    }
}

#[async_trait]
impl KeyResolver for MemoryResolver {
    async fn resolve(&self, id: &str) -> Result<Value> {
        let Some(document) = self.documents.get(id) else {
            bail!(kind = ErrorKind::NotFound, "no document with id `{id}`");
        };

        Ok(document.clone())
    }
}
