//! Storage collaborators.
//!
//! Handlers talk to a small async CRUD trait so they stay independent
//! of the backing store. The in-memory implementation is the only one
//! shipped; its `NotFound` error is what drives the `not_found` metric
//! bucket.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Internal(String),
}

/// A record that can live in a keyed store.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Lowercase singular noun used in errors ("item", "user").
    const KIND: &'static str;

    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);
}

/// Keyed CRUD store for one entity type.
#[async_trait]
pub trait Store<T: Entity>: Send + Sync {
    /// Insert a record, assigning it a fresh id.
    async fn create(&self, value: T) -> Result<T, StorageError>;
    async fn get(&self, id: u64) -> Result<T, StorageError>;
    /// Replace the record at `id`; fails if it does not exist.
    async fn update(&self, id: u64, value: T) -> Result<T, StorageError>;
    async fn delete(&self, id: u64) -> Result<(), StorageError>;
    async fn list(&self) -> Result<Vec<T>, StorageError>;
}

/// In-memory store; ids are assigned monotonically per store.
pub struct MemoryStore<T: Entity> {
    records: RwLock<HashMap<u64, T>>,
    next_id: AtomicU64,
}

impl<T: Entity> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn missing<T: Entity>(id: u64) -> StorageError {
    StorageError::NotFound(format!("{} {}", T::KIND, id))
}

#[async_trait]
impl<T: Entity> Store<T> for MemoryStore<T> {
    async fn create(&self, mut value: T) -> Result<T, StorageError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        value.set_id(id);
        self.records.write().await.insert(id, value.clone());
        Ok(value)
    }

    async fn get(&self, id: u64) -> Result<T, StorageError> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| missing::<T>(id))
    }

    async fn update(&self, id: u64, mut value: T) -> Result<T, StorageError> {
        let mut records = self.records.write().await;
        if !records.contains_key(&id) {
            return Err(missing::<T>(id));
        }
        value.set_id(id);
        records.insert(id, value.clone());
        Ok(value)
    }

    async fn delete(&self, id: u64) -> Result<(), StorageError> {
        self.records
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| missing::<T>(id))
    }

    async fn list(&self) -> Result<Vec<T>, StorageError> {
        let records = self.records.read().await;
        let mut values: Vec<T> = records.values().cloned().collect();
        values.sort_by_key(|value| value.id());
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Item;

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = MemoryStore::<Item>::new();
        let first = store
            .create(Item::new("Item One".to_string()))
            .await
            .unwrap();
        let second = store
            .create(Item::new("Item Two".to_string()))
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryStore::<Item>::new();
        let err = store.get(999).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
        assert_eq!(err.to_string(), "item 999 not found");
    }

    #[tokio::test]
    async fn test_update_replaces_existing_record() {
        let store = MemoryStore::<Item>::new();
        let created = store.create(Item::new("Before".to_string())).await.unwrap();

        let updated = store
            .update(created.id, Item::new("After".to_string()))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "After");
        assert_eq!(store.get(created.id).await.unwrap().name, "After");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryStore::<Item>::new();
        let err = store
            .update(5, Item::new("Ghost".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let store = MemoryStore::<Item>::new();
        let created = store.create(Item::new("Doomed".to_string())).await.unwrap();

        store.delete(created.id).await.unwrap();
        assert!(store.get(created.id).await.is_err());
        assert!(store.delete(created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_id() {
        let store = MemoryStore::<Item>::new();
        for name in ["a", "b", "c"] {
            store.create(Item::new(name.to_string())).await.unwrap();
        }

        let items = store.list().await.unwrap();
        let ids: Vec<u64> = items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
