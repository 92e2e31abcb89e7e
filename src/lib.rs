//! # ratelimit-operator
//!
//! Declarative convergence controller for per-workload rate limiting: given
//! a [`RateLimitIntent`] describing the limits a workload should enforce,
//! drive the live state toward that intent and keep it there by injecting a
//! preconfigured Envoy sidecar.
//!
//! ## How a pass works
//!
//! The external dispatcher invokes [`Reconciler::reconcile`] at-least-once
//! per change to a watched intent. One pass:
//!
//! 1. Load the intent; a concurrently-deleted intent is a silent no-op.
//! 2. Load the target workload; failure here is fatal and redelivered.
//! 3. Guard: if the reserved sidecar container is already present, correct
//!    drifted status and stop.
//! 4. Synthesize the Envoy document ([`envoy::synthesize`]) and upsert the
//!    configuration artifact, tolerating creation races.
//! 5. Attach the sidecar container and config volume, persist the workload.
//! 6. Record `applied = true` on the intent status.
//!
//! Effects are idempotent and recomputed from live state every pass; the
//! object store (behind the [`store::ObjectStore`] port) is the only point
//! of coordination between concurrent passes.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ratelimit_operator::{dispatch::NamespacedName, reconcile::Reconciler, store::MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> ratelimit_operator::Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let reconciler = Reconciler::new(store);
//!     let outcome = reconciler
//!         .reconcile(&NamespacedName::new("default", "api"))
//!         .await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod dispatch;
pub mod envoy;
pub mod intent;
pub mod reconcile;
pub mod store;
pub mod workload;

// Re-export main types for convenience
pub use dispatch::{NamespacedName, ReconcileOutcome};
pub use intent::{EnforcementStatus, HeaderLimit, RateLimitIntent, RateLimitIntentSpec};
pub use reconcile::{ArtifactOutcome, Reconciler, ReconcilerOptions};
pub use workload::{ConfigArtifact, Workload};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::Error;
