//! Retry-bounded health polling
//!
//! Repeats aggregation on a fixed interval until the workload passes the
//! threshold or the budget runs out. Cluster-read failures burn an attempt
//! instead of aborting: API flakiness must not masquerade as workload
//! unhealthiness, but it must not stall the controller either.

use crate::health::aggregate::Aggregate;
use crate::models::WorkloadRef;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Polling policy. Defaults match the operator tooling this replaces;
/// every knob is exposed on the CLI.
#[derive(Debug, Clone)]
pub struct MonitorPolicy {
    pub max_retries: usize,
    pub retry_interval: Duration,
    pub healthy_threshold_pct: f64,
}

impl Default for MonitorPolicy {
    fn default() -> Self {
        Self {
            max_retries: 10,
            retry_interval: Duration::from_secs(30),
            healthy_threshold_pct: 80.0,
        }
    }
}

/// Sequential polling loop over the aggregator
pub struct HealthMonitor {
    aggregator: Arc<dyn Aggregate>,
    policy: MonitorPolicy,
}

impl HealthMonitor {
    pub fn new(aggregator: Arc<dyn Aggregate>, policy: MonitorPolicy) -> Self {
        Self { aggregator, policy }
    }

    /// Poll until healthy or exhausted. Returns true as soon as one
    /// attempt meets the threshold; sleeps only between attempts, never
    /// after the last one.
    pub async fn wait_for_healthy(&self, workload: &WorkloadRef) -> bool {
        for attempt in 0..self.policy.max_retries {
            match self.aggregator.aggregate(workload, attempt).await {
                Ok(verdict) if verdict.is_healthy(self.policy.healthy_threshold_pct) => {
                    info!(
                        deployment = %workload.name,
                        attempt,
                        percentage = verdict.healthy_percentage,
                        "Deployment healthy"
                    );
                    return true;
                }
                Ok(verdict) => {
                    info!(
                        deployment = %workload.name,
                        attempt,
                        healthy = verdict.healthy_count,
                        total = verdict.total_count,
                        percentage = verdict.healthy_percentage,
                        threshold = self.policy.healthy_threshold_pct,
                        "Deployment below health threshold"
                    );
                }
                Err(e) => {
                    warn!(
                        deployment = %workload.name,
                        attempt,
                        error = %e,
                        "Cluster read failed, counting attempt as unhealthy"
                    );
                }
            }

            if attempt + 1 < self.policy.max_retries {
                info!(
                    wait_secs = self.policy.retry_interval.as_secs(),
                    "Waiting before next health check"
                );
                tokio::time::sleep(self.policy.retry_interval).await;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterError;
    use crate::models::HealthVerdict;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Aggregator that replays a scripted percentage per attempt and
    /// counts invocations
    struct ScriptedAggregator {
        percentages: Vec<f64>,
        calls: AtomicUsize,
    }

    impl ScriptedAggregator {
        fn new(percentages: Vec<f64>) -> Self {
            Self {
                percentages,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Aggregate for ScriptedAggregator {
        async fn aggregate(
            &self,
            _: &WorkloadRef,
            attempt: usize,
        ) -> Result<HealthVerdict, ClusterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let pct = self.percentages.get(attempt).copied().unwrap_or(0.0);
            let healthy = pct.round() as usize;
            Ok(HealthVerdict::new(healthy, 100, attempt))
        }
    }

    /// Aggregator whose cluster reads always fail
    struct FailingAggregator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Aggregate for FailingAggregator {
        async fn aggregate(
            &self,
            _: &WorkloadRef,
            _: usize,
        ) -> Result<HealthVerdict, ClusterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ClusterError::Api(kube::Error::Api(
                kube::error::ErrorResponse {
                    status: "Failure".to_string(),
                    message: "connection refused".to_string(),
                    reason: "InternalError".to_string(),
                    code: 500,
                },
            )))
        }
    }

    fn workload() -> WorkloadRef {
        WorkloadRef::new("default", "microservice-a")
    }

    fn policy(max_retries: usize, interval: Duration) -> MonitorPolicy {
        MonitorPolicy {
            max_retries,
            retry_interval: interval,
            healthy_threshold_pct: 80.0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_budget_with_exactly_two_sleeps() {
        let aggregator = Arc::new(ScriptedAggregator::new(vec![0.0, 0.0, 0.0]));
        let interval = Duration::from_secs(30);
        let monitor = HealthMonitor::new(aggregator.clone(), policy(3, interval));

        let start = tokio::time::Instant::now();
        let healthy = monitor.wait_for_healthy(&workload()).await;

        assert!(!healthy);
        assert_eq!(aggregator.call_count(), 3);
        // 3 attempts, sleeps only between them: exactly 2 x 30s of paused time
        assert_eq!(start.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_exit_on_first_healthy_attempt() {
        let aggregator = Arc::new(ScriptedAggregator::new(vec![100.0, 0.0]));
        let monitor = HealthMonitor::new(aggregator.clone(), policy(10, Duration::from_secs(30)));

        let start = tokio::time::Instant::now();
        let healthy = monitor.wait_for_healthy(&workload()).await;

        assert!(healthy);
        assert_eq!(aggregator.call_count(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_mid_budget() {
        let aggregator = Arc::new(ScriptedAggregator::new(vec![0.0, 50.0, 85.0]));
        let monitor = HealthMonitor::new(aggregator.clone(), policy(10, Duration::from_secs(30)));

        let healthy = monitor.wait_for_healthy(&workload()).await;

        assert!(healthy);
        assert_eq!(aggregator.call_count(), 3);
    }

    #[tokio::test]
    async fn test_threshold_boundary_is_inclusive() {
        let aggregator = Arc::new(ScriptedAggregator::new(vec![80.0]));
        let monitor = HealthMonitor::new(aggregator.clone(), policy(1, Duration::ZERO));

        assert!(monitor.wait_for_healthy(&workload()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cluster_errors_consume_budget_without_aborting() {
        let aggregator = Arc::new(FailingAggregator {
            calls: AtomicUsize::new(0),
        });
        let monitor = HealthMonitor::new(aggregator.clone(), policy(4, Duration::from_secs(5)));

        let healthy = monitor.wait_for_healthy(&workload()).await;

        assert!(!healthy);
        assert_eq!(aggregator.calls.load(Ordering::SeqCst), 4);
    }
}
