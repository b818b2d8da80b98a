use crate::domain::model::Document;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Pull-based iteration over documents. `Ok(None)` marks normal exhaustion.
#[async_trait]
pub trait DocumentCursor: Send {
    async fn next(&mut self) -> Result<Option<Document>>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates a document and returns its store-assigned id.
    async fn create(&self, collection: &str, fields: Map<String, Value>) -> Result<String>;

    /// Documents in `collection` whose `field` equals `value`, at most `limit` of them.
    fn query_eq<'a>(
        &'a self,
        collection: &'a str,
        field: &'a str,
        value: Value,
        limit: Option<usize>,
    ) -> Box<dyn DocumentCursor + 'a>;

    /// Every document in `collection`, in store order.
    fn documents<'a>(&'a self, collection: &'a str) -> Box<dyn DocumentCursor + 'a>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
