pub mod catalog;

pub use crate::domain::model::{Bean, Document};
pub use crate::domain::ports::{DocumentCursor, DocumentStore};
pub use crate::utils::error::Result;
