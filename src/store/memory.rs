//! In-memory store backend.
//!
//! Reference implementation of [`ObjectStore`] used by tests and the demo
//! binary. Create is atomic under the map lock; updates are
//! last-writer-wins, matching the semantics the controller assumes of the
//! real store.

use super::{ObjectKey, ObjectStore, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<ObjectKey, Value>>,
    write_ops: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes (create/update/update_status) so far.
    ///
    /// Lets tests assert that a reconciliation pass issued exactly the
    /// writes it was supposed to and nothing else.
    pub fn write_count(&self) -> u64 {
        self.write_ops.load(Ordering::SeqCst)
    }

    /// Whether a record currently exists, without going through `get`.
    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.objects
            .read()
            .map(|m| m.contains_key(key))
            .unwrap_or(false)
    }

    fn read_guard(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<ObjectKey, Value>>, StoreError> {
        self.objects
            .read()
            .map_err(|e| StoreError::Unavailable(format!("store lock poisoned: {e}")))
    }

    fn write_guard(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<ObjectKey, Value>>, StoreError> {
        self.objects
            .write()
            .map_err(|e| StoreError::Unavailable(format!("store lock poisoned: {e}")))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, key: &ObjectKey) -> Result<Value, StoreError> {
        let objects = self.read_guard()?;
        objects.get(key).cloned().ok_or(StoreError::NotFound {
            kind: key.kind,
            name: key.name.clone(),
        })
    }

    async fn create(&self, key: &ObjectKey, value: Value) -> Result<(), StoreError> {
        let mut objects = self.write_guard()?;
        if objects.contains_key(key) {
            return Err(StoreError::AlreadyExists {
                kind: key.kind,
                name: key.name.clone(),
            });
        }
        objects.insert(key.clone(), value);
        self.write_ops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update(&self, key: &ObjectKey, value: Value) -> Result<(), StoreError> {
        let mut objects = self.write_guard()?;
        if !objects.contains_key(key) {
            return Err(StoreError::NotFound {
                kind: key.kind,
                name: key.name.clone(),
            });
        }
        objects.insert(key.clone(), value);
        self.write_ops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_status(&self, key: &ObjectKey, status: Value) -> Result<(), StoreError> {
        let mut objects = self.write_guard()?;
        let existing = objects.get_mut(key).ok_or(StoreError::NotFound {
            kind: key.kind,
            name: key.name.clone(),
        })?;
        match existing {
            Value::Object(map) => {
                map.insert("status".to_string(), status);
            }
            other => {
                // Non-mapping records have no status subresource.
                return Err(StoreError::Unavailable(format!(
                    "record {key} is not an object (found {})",
                    value_type(other)
                )));
            }
        }
        self.write_ops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn value_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
