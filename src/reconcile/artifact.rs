//! Artifact reconciler.
//!
//! Ensures a named configuration artifact exists with exactly the content
//! the synthesizer produced. Create-first: the common case on a fresh
//! intent is that the artifact does not exist yet, and create is the only
//! atomic operation the store offers, so losing a creation race is detected
//! by the store rather than by a read-check race window.

use crate::store::{Objects, ObjectStore, StoreError};
use crate::workload::ConfigArtifact;
use tracing::{debug, info};

/// What an upsert actually did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactOutcome {
    Created,
    Updated,
    /// Existing record already matched the desired one; no write issued.
    Unchanged,
}

/// Derived artifact name for an intent.
pub fn artifact_name(intent_name: &str) -> String {
    format!("{intent_name}-ratelimit-config")
}

/// Create the artifact, or converge an existing one to `artifact`'s content.
///
/// A concurrent pass may win the create; that surfaces as `AlreadyExists`
/// and falls through to get-then-compare-then-update, so both passes
/// terminate successfully with the same stored content. Any other store
/// error is fatal for the pass and propagates unchanged.
pub async fn upsert(
    store: &dyn ObjectStore,
    artifact: &ConfigArtifact,
) -> Result<ArtifactOutcome, StoreError> {
    let objects = Objects::new(store);
    let key = artifact.key();

    match objects.create(&key, artifact).await {
        Ok(()) => {
            info!(artifact = %key.name, "configuration artifact created");
            return Ok(ArtifactOutcome::Created);
        }
        Err(err) if err.is_already_exists() => {}
        Err(err) => return Err(err),
    }

    // Full-record compare: ownership drift gets repaired along with stale
    // content.
    let existing: ConfigArtifact = objects.get(&key).await?;
    if existing == *artifact {
        debug!(artifact = %key.name, "configuration artifact already current");
        return Ok(ArtifactOutcome::Unchanged);
    }

    objects.update(&key, artifact).await?;
    info!(artifact = %key.name, "configuration artifact updated");
    Ok(ArtifactOutcome::Updated)
}
