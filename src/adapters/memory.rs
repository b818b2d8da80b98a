use crate::domain::model::Document;
use crate::domain::ports::{DocumentCursor, DocumentStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process document store. Documents keep insertion order per collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a raw JSON object, bypassing any validation. Non-object values are stored
    /// under a single `value` field.
    pub async fn seed(&self, collection: &str, value: Value) -> String {
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                let mut fields = Map::new();
                fields.insert("value".to_string(), other);
                fields
            }
        };
        self.insert(collection, fields).await
    }

    pub async fn get(&self, collection: &str, id: &str) -> Option<Document> {
        self.collections
            .read()
            .await
            .get(collection)?
            .iter()
            .find(|doc| doc.id == id)
            .cloned()
    }

    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    async fn insert(&self, collection: &str, fields: Map<String, Value>) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                fields,
            });
        id
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, fields: Map<String, Value>) -> Result<String> {
        Ok(self.insert(collection, fields).await)
    }

    fn query_eq<'a>(
        &'a self,
        collection: &'a str,
        field: &'a str,
        value: Value,
        limit: Option<usize>,
    ) -> Box<dyn DocumentCursor + 'a> {
        Box::new(MemoryCursor {
            store: self,
            collection,
            filter: Some((field, value)),
            position: 0,
            remaining: limit,
        })
    }

    fn documents<'a>(&'a self, collection: &'a str) -> Box<dyn DocumentCursor + 'a> {
        Box::new(MemoryCursor {
            store: self,
            collection,
            filter: None,
            position: 0,
            remaining: None,
        })
    }
}

/// Walks a collection by position, re-reading under the lock on every step.
struct MemoryCursor<'a> {
    store: &'a MemoryStore,
    collection: &'a str,
    filter: Option<(&'a str, Value)>,
    position: usize,
    remaining: Option<usize>,
}

#[async_trait]
impl DocumentCursor for MemoryCursor<'_> {
    async fn next(&mut self) -> Result<Option<Document>> {
        if self.remaining == Some(0) {
            return Ok(None);
        }

        let collections = self.store.collections.read().await;
        let Some(docs) = collections.get(self.collection) else {
            return Ok(None);
        };

        while let Some(doc) = docs.get(self.position) {
            self.position += 1;
            let matches = match &self.filter {
                Some((field, value)) => doc.fields.get(*field) == Some(value),
                None => true,
            };
            if matches {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                return Ok(Some(doc.clone()));
            }
        }

        Ok(None)
    }
}
