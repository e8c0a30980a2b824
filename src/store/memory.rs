use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{Document, DocumentStore, Fields, StoreError, StoreResult, generate_id};

/// Process-local store keeping documents in insertion order.
///
/// `set_available(false)` makes every call fail the way a dropped connection
/// would, which is how transport faults are exercised.
/// `set_collection_available` does the same for a single collection.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    offline: AtomicBool,
    offline_collections: RwLock<HashSet<String>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.offline.store(!available, Ordering::SeqCst);
    }

    pub fn set_collection_available(&self, collection: &str, available: bool) {
        let mut offline = self.offline_collections.write();
        if available {
            offline.remove(collection);
        } else {
            offline.insert(collection.to_string());
        }
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn check(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn check_collection(&self, collection: &str) -> StoreResult<()> {
        self.check()?;
        if self.offline_collections.read().contains(collection) {
            return Err(StoreError::Unavailable(format!("{} is offline", collection)));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        self.check_collection(collection)?;
        Ok(self
            .collections
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.check_collection(collection)?;
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned()))
    }

    async fn insert(&self, collection: &str, data: Fields) -> StoreResult<String> {
        self.check_collection(collection)?;
        let id = generate_id();
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), data));
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, data: Fields) -> StoreResult<()> {
        self.check_collection(collection)?;
        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => existing.data = data,
            None => docs.push(Document::new(id, data)),
        }
        Ok(())
    }

    async fn merge(&self, collection: &str, id: &str, data: Fields) -> StoreResult<()> {
        self.check_collection(collection)?;
        let mut collections = self.collections.write();
        let existing = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StoreError::Missing {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        for (key, value) in data {
            existing.data.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.check_collection(collection)?;
        if let Some(docs) = self.collections.write().get_mut(collection) {
            docs.retain(|d| d.id != id);
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn merge_keeps_unlisted_fields() {
        let store = MemoryDocumentStore::new();
        let id = store
            .insert("products", fields(json!({"name": "Serum", "price": 10})))
            .await
            .unwrap();

        store
            .merge("products", &id, fields(json!({"price": 12})))
            .await
            .unwrap();

        let doc = store.get("products", &id).await.unwrap().unwrap();
        assert_eq!(doc.data["name"], json!("Serum"));
        assert_eq!(doc.data["price"], json!(12));
    }

    #[tokio::test]
    async fn merge_on_missing_document_fails() {
        let store = MemoryDocumentStore::new();
        let result = store.merge("products", "nope", Fields::new()).await;
        assert!(matches!(result, Err(StoreError::Missing { .. })));
    }

    #[tokio::test]
    async fn offline_store_rejects_reads() {
        let store = MemoryDocumentStore::new();
        store.set_available(false);
        assert!(store.list("products").await.is_err());
        store.set_available(true);
        assert!(store.list("products").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn single_collection_can_go_offline() {
        let store = MemoryDocumentStore::new();
        store.set_collection_available("products", false);
        assert!(store.list("products").await.is_err());
        assert!(store.list("users").await.unwrap().is_empty());
        assert!(store.ping().await.is_ok());
    }
}
