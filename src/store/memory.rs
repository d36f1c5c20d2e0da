use super::{validate_id, Collection, DocumentStore, StoreError};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local document store
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<(Collection, String), Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.get(&(collection, id.to_string())).cloned())
    }

    async fn set(&self, collection: Collection, id: &str, doc: Value) -> Result<(), StoreError> {
        validate_id(id)?;
        let mut docs = self.docs.write().await;
        docs.insert((collection, id.to_string()), doc);
        Ok(())
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .filter(|((c, _), _)| *c == collection)
            .map(|(_, doc)| doc.clone())
            .collect())
    }
}
