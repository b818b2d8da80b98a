use crate::domain::model::{Bean, Document, BEANS, ROASTERS, ROASTER_NAME};
use crate::domain::ports::DocumentStore;
use crate::utils::error::{CatalogError, Result};
use serde_json::Value;
use std::sync::Arc;

/// Validates bean submissions and maps beans to and from store documents.
///
/// Holds no state of its own between requests; cloning shares the store handle.
#[derive(Clone)]
pub struct BeanCatalog {
    store: Arc<dyn DocumentStore>,
}

impl BeanCatalog {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list_beans(&self) -> Result<Vec<Bean>> {
        let mut cursor = self.store.documents(BEANS);
        let mut beans = Vec::new();

        while let Some(doc) = cursor.next().await.map_err(iteration_failure)? {
            beans.push(bean_from_document(doc));
        }

        tracing::debug!("Listed {} beans", beans.len());
        Ok(beans)
    }

    pub async fn add_bean(&self, bean: Bean) -> Result<String> {
        if bean.name.is_empty() {
            return Err(CatalogError::malformed("name cannot be empty"));
        }

        // Make sure roaster exists; the first match is enough
        let mut roasters = self.store.query_eq(
            ROASTERS,
            ROASTER_NAME,
            Value::String(bean.roaster.clone()),
            Some(1),
        );
        if roasters
            .next()
            .await
            .map_err(CatalogError::into_unavailable)?
            .is_none()
        {
            return Err(CatalogError::InvalidRoaster);
        }
        drop(roasters);

        let fields = match serde_json::to_value(&bean)? {
            Value::Object(fields) => fields,
            _ => return Err(CatalogError::malformed("bean must serialize to an object")),
        };

        let id = self
            .store
            .create(BEANS, fields)
            .await
            .map_err(CatalogError::into_unavailable)?;

        tracing::info!("Added bean '{}' from '{}' as {}", bean.name, bean.roaster, id);
        Ok(id)
    }
}

fn iteration_failure(err: CatalogError) -> CatalogError {
    match err {
        e @ CatalogError::IterationFailure { .. } => e,
        e => CatalogError::IterationFailure {
            message: e.to_string(),
        },
    }
}

/// Record contents never fail a listing; only the cursor can.
fn bean_from_document(doc: Document) -> Bean {
    match serde_json::from_value(Value::Object(doc.fields.clone())) {
        Ok(bean) => bean,
        Err(e) => {
            tracing::warn!("Document {} does not decode as a bean: {}", doc.id, e);
            Bean::from_fields_lossy(&doc.fields)
        }
    }
}
