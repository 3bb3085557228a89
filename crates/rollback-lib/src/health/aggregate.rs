//! Fleet-wide health aggregation for one polling attempt
//!
//! Combines cluster-reported pod state with live endpoint probes. Probes
//! are dispatched concurrently so a poll cycle costs roughly one probe
//! timeout, not one per pod.

use crate::cluster::{ClusterError, ClusterOps};
use crate::health::probe::HealthProbe;
use crate::models::{HealthVerdict, PodPhase, WorkloadRef};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// One aggregation pass over the workload's pods
#[async_trait]
pub trait Aggregate: Send + Sync {
    async fn aggregate(
        &self,
        workload: &WorkloadRef,
        attempt: usize,
    ) -> Result<HealthVerdict, ClusterError>;
}

/// Aggregator that probes every Running pod with a known IP.
///
/// A pod counts healthy only when the cluster reports it Running with all
/// containers ready AND its live probe returned HTTP 200. Failing any one
/// criterion demotes it for the cycle; partial data never promotes.
pub struct HealthAggregator {
    cluster: Arc<dyn ClusterOps>,
    probe: Arc<dyn HealthProbe>,
}

impl HealthAggregator {
    pub fn new(cluster: Arc<dyn ClusterOps>, probe: Arc<dyn HealthProbe>) -> Self {
        Self { cluster, probe }
    }
}

#[async_trait]
impl Aggregate for HealthAggregator {
    async fn aggregate(
        &self,
        workload: &WorkloadRef,
        attempt: usize,
    ) -> Result<HealthVerdict, ClusterError> {
        let pods = self.cluster.list_pods(workload).await?;

        if pods.is_empty() {
            warn!(deployment = %workload.name, "No pods found for deployment");
            return Ok(HealthVerdict::new(0, 0, attempt));
        }

        let total = pods.len();
        let mut probes = JoinSet::new();

        for pod in &pods {
            // Anything not Running or without an IP has already failed the
            // cluster half of the rule; probing it would add nothing.
            if pod.phase != PodPhase::Running {
                debug!(pod = %pod.name, phase = ?pod.phase, "Skipping probe, pod not running");
                continue;
            }
            let Some(ip) = pod.ip.clone() else {
                debug!(pod = %pod.name, "Skipping probe, no pod IP reported");
                continue;
            };

            let probe = Arc::clone(&self.probe);
            let name = pod.name.clone();
            let ready = pod.containers_ready;
            probes.spawn(async move { (probe.probe(&name, &ip).await, ready) });
        }

        let mut healthy = 0usize;
        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok((outcome, ready)) => {
                    if ready && outcome.is_healthy() {
                        healthy += 1;
                    } else {
                        debug!(
                            pod = %outcome.pod_name,
                            ready,
                            status = ?outcome.http_status,
                            "Pod failed health check"
                        );
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Probe task failed to complete");
                }
            }
        }

        let verdict = HealthVerdict::new(healthy, total, attempt);
        info!(
            deployment = %workload.name,
            healthy = verdict.healthy_count,
            total = verdict.total_count,
            percentage = verdict.healthy_percentage,
            attempt,
            "Health aggregation complete"
        );
        Ok(verdict)
    }
}
