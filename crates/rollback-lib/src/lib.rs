//! Health-gated rollback controller for Kubernetes deployments
//!
//! This crate provides the building blocks for deciding whether a
//! deployment is healthy and reverting it to its previous revision when
//! it is not:
//! - Cluster read boundary (pods, deployments, replica-sets)
//! - Concurrent pod health probing and fleet aggregation
//! - Retry-bounded health monitoring
//! - Replica-set revision history inference
//! - Rollback execution and best-effort notification

pub mod cluster;
pub mod controller;
pub mod health;
pub mod models;
pub mod notify;
pub mod rollback;

pub use cluster::{ClusterError, ClusterOps, KubeCluster};
pub use controller::{RollbackController, RunOptions, RunOutcome};
pub use health::{
    Aggregate, HealthAggregator, HealthMonitor, HealthProbe, HttpProbe, MonitorPolicy, ProbeConfig,
};
pub use models::*;
pub use notify::Notifier;
pub use rollback::{KubectlActuator, RevisionResolver, RollbackExecutor, RolloutActuator};
