pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{firestore::FirestoreStore, memory::MemoryStore, open_store};
pub use config::ServiceConfig;
pub use core::catalog::BeanCatalog;
pub use domain::model::Bean;
pub use utils::error::{CatalogError, Result};
