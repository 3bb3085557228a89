//! Cluster read operations behind a narrow trait
//!
//! The controller consumes the cluster through three lookups: pods by
//! label, deployment by name, replica-sets by label. Everything else the
//! API offers is out of scope here.

use crate::models::{PodPhase, PodSnapshot, RevisionRecord, WorkloadRef};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet};
use k8s_openapi::api::core::v1::Pod;
use kube::api::ListParams;
use kube::{Api, Client};

pub use async_trait::async_trait;

/// Annotation the deployment controller stamps on replica-sets (and the
/// deployment itself) with the rollout revision
pub const REVISION_ANNOTATION: &str = "deployment.kubernetes.io/revision";

/// Cluster read failure. Kept as a typed value so callers can treat it as
/// data (an unhealthy attempt, a fallback revision) instead of aborting.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("cluster API request failed: {0}")]
    Api(#[from] kube::Error),
}

/// Read-side cluster operations used by the controller
#[async_trait]
pub trait ClusterOps: Send + Sync {
    /// Pods belonging to the workload, by label selector
    async fn list_pods(&self, workload: &WorkloadRef) -> Result<Vec<PodSnapshot>, ClusterError>;

    /// Whether the deployment exists at all
    async fn deployment_exists(&self, workload: &WorkloadRef) -> Result<bool, ClusterError>;

    /// Revision history derived from the workload's replica-sets
    async fn list_revisions(
        &self,
        workload: &WorkloadRef,
    ) -> Result<Vec<RevisionRecord>, ClusterError>;
}

/// Cluster operations backed by the Kubernetes API
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the ambient kubeconfig, falling back to the
    /// in-cluster service account when running inside a pod
    pub async fn connect() -> Result<Self> {
        let client = Client::try_default()
            .await
            .context("Failed to create Kubernetes client")?;
        Ok(Self { client })
    }

    fn pods(&self, workload: &WorkloadRef) -> Api<Pod> {
        Api::namespaced(self.client.clone(), &workload.namespace)
    }

    fn deployments(&self, workload: &WorkloadRef) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), &workload.namespace)
    }

    fn replica_sets(&self, workload: &WorkloadRef) -> Api<ReplicaSet> {
        Api::namespaced(self.client.clone(), &workload.namespace)
    }
}

#[async_trait]
impl ClusterOps for KubeCluster {
    async fn list_pods(&self, workload: &WorkloadRef) -> Result<Vec<PodSnapshot>, ClusterError> {
        let params = ListParams::default().labels(&workload.selector());
        let pods = self.pods(workload).list(&params).await?;
        Ok(pods.into_iter().map(snapshot_from_pod).collect())
    }

    async fn deployment_exists(&self, workload: &WorkloadRef) -> Result<bool, ClusterError> {
        let deployment = self.deployments(workload).get_opt(&workload.name).await?;
        Ok(deployment.is_some())
    }

    async fn list_revisions(
        &self,
        workload: &WorkloadRef,
    ) -> Result<Vec<RevisionRecord>, ClusterError> {
        let params = ListParams::default().labels(&workload.selector());
        let replica_sets = self.replica_sets(workload).list(&params).await?;

        // The deployment's own annotation identifies the live revision.
        // When it is unreadable the caller falls back to ordering by age.
        let current_revision = self
            .deployments(workload)
            .get_opt(&workload.name)
            .await?
            .and_then(|d| annotation(d.metadata.annotations.as_ref(), REVISION_ANNOTATION));

        let mut records = Vec::new();
        for rs in replica_sets {
            // Replica-sets not managed by the deployment controller carry
            // no revision annotation; they are not part of the history.
            let Some(revision) = annotation(rs.metadata.annotations.as_ref(), REVISION_ANNOTATION)
            else {
                continue;
            };

            let created_at = rs
                .metadata
                .creation_timestamp
                .map(|t| t.0)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

            let is_current = current_revision.as_deref() == Some(revision.as_str());

            records.push(RevisionRecord {
                revision,
                created_at,
                is_current,
            });
        }

        Ok(records)
    }
}

fn annotation(
    annotations: Option<&std::collections::BTreeMap<String, String>>,
    key: &str,
) -> Option<String> {
    annotations.and_then(|map| map.get(key).cloned())
}

fn snapshot_from_pod(pod: Pod) -> PodSnapshot {
    let name = pod.metadata.name.unwrap_or_default();
    let status = pod.status.unwrap_or_default();

    let phase = status
        .phase
        .as_deref()
        .map(PodPhase::parse)
        .unwrap_or(PodPhase::Unknown);

    // Ready means every container reports ready; a pod with no container
    // statuses yet has nothing to vouch for it.
    let containers_ready = status
        .container_statuses
        .as_ref()
        .map(|statuses| !statuses.is_empty() && statuses.iter().all(|c| c.ready))
        .unwrap_or(false);

    PodSnapshot {
        name,
        phase,
        ip: status.pod_ip,
        containers_ready,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{ContainerStatus, PodStatus};
    use kube::api::ObjectMeta;

    fn pod(name: &str, phase: &str, ip: Option<&str>, ready: Vec<bool>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            status: Some(PodStatus {
                phase: Some(phase.to_string()),
                pod_ip: ip.map(str::to_string),
                container_statuses: Some(
                    ready
                        .into_iter()
                        .map(|r| ContainerStatus {
                            ready: r,
                            ..Default::default()
                        })
                        .collect(),
                ),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_snapshot_running_ready_pod() {
        let snapshot = snapshot_from_pod(pod("web-1", "Running", Some("10.0.0.5"), vec![true]));
        assert_eq!(snapshot.name, "web-1");
        assert_eq!(snapshot.phase, PodPhase::Running);
        assert_eq!(snapshot.ip.as_deref(), Some("10.0.0.5"));
        assert!(snapshot.containers_ready);
    }

    #[test]
    fn test_snapshot_partially_ready_pod() {
        let snapshot = snapshot_from_pod(pod("web-2", "Running", Some("10.0.0.6"), vec![true, false]));
        assert!(!snapshot.containers_ready);
    }

    #[test]
    fn test_snapshot_no_container_statuses() {
        let snapshot = snapshot_from_pod(pod("web-3", "Pending", None, vec![]));
        assert_eq!(snapshot.phase, PodPhase::Pending);
        assert!(snapshot.ip.is_none());
        assert!(!snapshot.containers_ready);
    }

    #[test]
    fn test_snapshot_missing_status() {
        let bare = Pod {
            metadata: ObjectMeta {
                name: Some("web-4".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let snapshot = snapshot_from_pod(bare);
        assert_eq!(snapshot.phase, PodPhase::Unknown);
        assert!(!snapshot.containers_ready);
    }
}
