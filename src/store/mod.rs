//! Object-store port.
//!
//! The controller never talks to a concrete store directly. Everything goes
//! through the [`ObjectStore`] trait, which models the generic kinded object
//! store the controller runs against: raw JSON records keyed by
//! `(kind, namespace, name)`. Keeping the trait object-safe (untyped
//! `serde_json::Value` records) lets backends stay generic; typed access for
//! the controller goes through the [`Objects`] facade.
//!
//! The store is the sole point of concurrency control in the system:
//! `create` must be atomic (at most one concurrent create succeeds for a
//! key) and `update` is last-writer-wins.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Record kinds known to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    RateLimitIntent,
    Workload,
    ConfigArtifact,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::RateLimitIntent => "RateLimitIntent",
            Kind::Workload => "Workload",
            Kind::ConfigArtifact => "ConfigArtifact",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub kind: Kind,
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(kind: Kind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

/// Namespace/name pair carried by every stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub namespace: String,
    pub name: String,
}

impl ObjectMeta {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn key(&self, kind: Kind) -> ObjectKey {
        ObjectKey::new(kind, self.namespace.clone(), self.name.clone())
    }
}

/// Store-level failures, mapped one-to-one onto the store's wire outcomes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: Kind, name: String },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: Kind, name: String },

    #[error("conflicting write on {kind} '{name}'")]
    Conflict { kind: Kind, name: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("object serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}

/// Generic kinded object store.
///
/// `update_status` writes only the `status` field of an existing record,
/// leaving the rest untouched (status is a subresource: spec writers and
/// status writers must not clobber each other).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, key: &ObjectKey) -> Result<Value, StoreError>;

    /// Atomic create: exactly one of N concurrent creates for the same key
    /// succeeds, the rest observe `AlreadyExists`.
    async fn create(&self, key: &ObjectKey, value: Value) -> Result<(), StoreError>;

    async fn update(&self, key: &ObjectKey, value: Value) -> Result<(), StoreError>;

    async fn update_status(&self, key: &ObjectKey, status: Value) -> Result<(), StoreError>;
}

/// Typed facade over a [`ObjectStore`] backend.
///
/// Serde round-trips records at the boundary so the trait itself stays
/// object-safe.
#[derive(Clone, Copy)]
pub struct Objects<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> Objects<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &ObjectKey) -> Result<T, StoreError> {
        let raw = self.store.get(key).await?;
        Ok(serde_json::from_value(raw)?)
    }

    pub async fn create<T: Serialize>(&self, key: &ObjectKey, object: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_value(object)?;
        self.store.create(key, raw).await
    }

    pub async fn update<T: Serialize>(&self, key: &ObjectKey, object: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_value(object)?;
        self.store.update(key, raw).await
    }

    pub async fn update_status<T: Serialize>(
        &self,
        key: &ObjectKey,
        status: &T,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_value(status)?;
        self.store.update_status(key, raw).await
    }
}
