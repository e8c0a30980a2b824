//! Document store gateway.
//!
//! Collections of schemaless JSON documents addressed by id. The application
//! owns document shape; normalization happens in `models::document`.

mod memory;
mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub type Fields = Map<String, Value>;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("document {collection}/{id} does not exist")]
    Missing { collection: String, id: String },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Fields) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of `collection` in store order.
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Inserts under a store-assigned id and returns it.
    async fn insert(&self, collection: &str, data: Fields) -> StoreResult<String>;

    /// Creates or replaces the document stored under `id`.
    async fn set(&self, collection: &str, id: &str, data: Fields) -> StoreResult<()>;

    /// Overwrites the supplied top-level fields only. Fails with
    /// `StoreError::Missing` when the document does not exist.
    async fn merge(&self, collection: &str, id: &str, data: Fields) -> StoreResult<()>;

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    async fn ping(&self) -> StoreResult<()>;
}

pub(crate) fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
