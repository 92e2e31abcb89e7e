use crate::store::StoreError;
use thiserror::Error;

/// Unified error type for the controller.
///
/// Every failure path in the core returns one of these; nothing panics.
/// Store outcomes that are part of normal control flow (intent `NotFound`,
/// artifact `AlreadyExists`) are absorbed before they reach this type, so
/// what surfaces here is exactly what the external dispatcher must
/// redeliver.
#[derive(Debug, Error)]
pub enum Error {
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    /// Fetching the intent's target workload failed. Unlike a missing
    /// intent, this is fatal for the pass: the intent still exists and
    /// wants enforcement on a workload the controller cannot see.
    #[error("failed to fetch target workload '{name}': {source}")]
    WorkloadFetch {
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("document rendering failed: {0}")]
    Render(#[from] serde_yaml::Error),
}

impl Error {
    /// Whether the failure is worth redelivering as-is.
    ///
    /// Everything surfaced here is transient from the dispatcher's point of
    /// view except serialization of our own document tree, which would fail
    /// identically on every pass.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Error::Render(_))
    }
}
