//! Reconciliation engine.
//!
//! One invocation converges one intent: load the intent and its target
//! workload, short-circuit if enforcement is already active, otherwise
//! render and upsert the configuration artifact, attach the sidecar, and
//! record `applied` on the intent's status. Every pass starts from live
//! state; nothing is carried in memory between invocations, so repeated
//! and concurrent passes are safe by construction.

pub mod artifact;
pub mod guard;
pub mod sidecar;

pub use artifact::{artifact_name, ArtifactOutcome};

use crate::dispatch::{NamespacedName, ReconcileOutcome};
use crate::intent::{EnforcementStatus, RateLimitIntent};
use crate::store::{Kind, ObjectKey, Objects, ObjectStore};
use crate::workload::{ConfigArtifact, Workload};
use crate::{envoy, Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Policy knobs for the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcilerOptions {
    /// When true, a pass that finds the sidecar already present still
    /// re-renders and upserts the artifact, so intent edits made after
    /// first application keep converging the document. Off by default:
    /// the artifact is frozen once enforcement is active, and a pass
    /// against an applied intent writes nothing but a status correction.
    pub refresh_artifact_when_applied: bool,
}

/// The convergence loop, invoked at-least-once per affected intent by the
/// external dispatcher. Takes its store capability by injection; there is
/// no ambient client handle.
pub struct Reconciler {
    store: Arc<dyn ObjectStore>,
    options: ReconcilerOptions,
}

impl Reconciler {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self::with_options(store, ReconcilerOptions::default())
    }

    pub fn with_options(store: Arc<dyn ObjectStore>, options: ReconcilerOptions) -> Self {
        Self { store, options }
    }

    /// Run one reconciliation pass for the named intent.
    ///
    /// A missing intent is a silent no-op (deleted concurrently); a missing
    /// or unreachable target workload is fatal for the pass and surfaces to
    /// the dispatcher for re-invocation. All effects are idempotent.
    pub async fn reconcile(&self, key: &NamespacedName) -> Result<ReconcileOutcome> {
        let objects = Objects::new(self.store.as_ref());

        let intent_key = ObjectKey::new(Kind::RateLimitIntent, &*key.namespace, &*key.name);
        let intent: RateLimitIntent = match objects.get(&intent_key).await {
            Ok(intent) => intent,
            Err(err) if err.is_not_found() => {
                debug!(intent = %key, "intent gone before reconciliation; nothing to do");
                return Ok(ReconcileOutcome::IntentGone);
            }
            Err(err) => return Err(err.into()),
        };

        let workload_name = intent.spec.target_workload_name.clone();
        let workload_key = ObjectKey::new(Kind::Workload, &*key.namespace, &*workload_name);
        let mut workload: Workload = objects.get(&workload_key).await.map_err(|source| {
            error!(intent = %key, workload = %workload_name, error = %source,
                "failed to fetch target workload");
            Error::WorkloadFetch {
                name: workload_name.clone(),
                source,
            }
        })?;

        if guard::sidecar_present(&workload) {
            if self.options.refresh_artifact_when_applied {
                let artifact = render_artifact(&intent)?;
                artifact::upsert(self.store.as_ref(), &artifact).await?;
            }
            if !intent.status.applied {
                objects
                    .update_status(&intent_key, &EnforcementStatus { applied: true })
                    .await?;
                info!(intent = %key, "status corrected: enforcement already active");
            }
            debug!(intent = %key, workload = %workload_name, "sidecar present; pass complete");
            return Ok(ReconcileOutcome::AlreadyApplied);
        }

        let artifact = render_artifact(&intent)?;
        artifact::upsert(self.store.as_ref(), &artifact).await?;

        sidecar::attach_sidecar(
            &mut workload,
            &artifact.metadata.name,
            intent.spec.proxy_port(),
        );
        objects.update(&workload_key, &workload).await?;
        info!(intent = %key, workload = %workload_name, port = intent.spec.proxy_port(),
            "rate limiting sidecar injected");

        objects
            .update_status(&intent_key, &EnforcementStatus { applied: true })
            .await?;

        Ok(ReconcileOutcome::Applied)
    }
}

/// Render the configuration artifact for `intent`.
fn render_artifact(intent: &RateLimitIntent) -> Result<ConfigArtifact> {
    let document = envoy::synthesize(&intent.spec, intent.spec.proxy_port())?;
    let mut data = BTreeMap::new();
    data.insert(sidecar::ARTIFACT_KEY.to_string(), document);
    Ok(ConfigArtifact {
        metadata: crate::store::ObjectMeta::new(
            intent.metadata.namespace.clone(),
            artifact_name(&intent.metadata.name),
        ),
        owner: Some(intent.metadata.name.clone()),
        data,
    })
}
