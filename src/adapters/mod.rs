// Adapters layer: concrete implementations of the document store port.

pub mod firestore;
pub mod memory;

use crate::config::toml_config::{Backend, DatabaseConfig};
use crate::domain::ports::DocumentStore;
use crate::utils::error::Result;
use std::sync::Arc;

/// Opens the configured store once; the handle is shared by every request.
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend {
        Backend::Firestore => {
            tracing::info!("Connecting to Firestore project {}", config.project_id);
            Ok(Arc::new(firestore::FirestoreStore::connect(config).await?))
        }
        Backend::Memory => {
            tracing::warn!("Using in-memory document store, data is lost on shutdown");
            Ok(Arc::new(memory::MemoryStore::new()))
        }
    }
}
