//! Standalone binary that drives one full reconciliation against the
//! in-memory store and prints the resulting Envoy document and status.
//! Useful for eyeballing the synthesized configuration without a cluster.

use anyhow::Result;
use ratelimit_operator::dispatch::NamespacedName;
use ratelimit_operator::intent::{HeaderLimit, RateLimitIntent, RateLimitIntentSpec};
use ratelimit_operator::reconcile::{artifact_name, Reconciler};
use ratelimit_operator::store::{Kind, MemoryStore, ObjectKey, ObjectMeta, Objects, ObjectStore};
use ratelimit_operator::workload::{ConfigArtifact, Container, Workload, WorkloadSpec};
use ratelimit_operator::EnforcementStatus;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let store = Arc::new(MemoryStore::new());
    seed(store.as_ref()).await?;

    let reconciler = Reconciler::new(store.clone());
    let key = NamespacedName::new("default", "api");

    let outcome = reconciler.reconcile(&key).await?;
    println!("first pass:  {outcome:?}");

    // Second pass demonstrates the guard short-circuit.
    let outcome = reconciler.reconcile(&key).await?;
    println!("second pass: {outcome:?}");

    let objects = Objects::new(store.as_ref());
    let artifact: ConfigArtifact = objects
        .get(&ObjectKey::new(
            Kind::ConfigArtifact,
            "default",
            artifact_name("api"),
        ))
        .await?;
    let intent: RateLimitIntent = objects
        .get(&ObjectKey::new(Kind::RateLimitIntent, "default", "api"))
        .await?;
    let workload: Workload = objects
        .get(&ObjectKey::new(Kind::Workload, "default", "api"))
        .await?;

    println!("\nstatus: {:?}", intent.status);
    println!(
        "containers: {:?}",
        workload
            .spec
            .containers
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
    );
    println!("\n=== envoy.yaml ===\n{}", artifact.data["envoy.yaml"]);

    Ok(())
}

async fn seed(store: &dyn ObjectStore) -> Result<()> {
    let objects = Objects::new(store);

    let intent = RateLimitIntent {
        metadata: ObjectMeta::new("default", "api"),
        spec: RateLimitIntentSpec {
            target_workload_name: "api".into(),
            cluster_name: "api-upstream".into(),
            proxy_port: None,
            per_ip_limit: Some(100),
            per_user_limit: Some(20),
            per_route_pattern_limit: None,
            named_header_limits: vec![HeaderLimit {
                header_name: "X-Tenant".into(),
                rps: 5,
            }],
        },
        status: EnforcementStatus::default(),
    };
    objects.create(&intent.key(), &intent).await?;

    let workload = Workload {
        metadata: ObjectMeta::new("default", "api"),
        spec: WorkloadSpec {
            containers: vec![Container {
                name: "api".into(),
                image: "example/api:1.0".into(),
                command: vec![],
                volume_mounts: vec![],
                ports: vec![],
            }],
            volumes: vec![],
        },
    };
    objects.create(&workload.key(), &workload).await?;

    Ok(())
}
