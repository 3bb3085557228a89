//! Core data model for the rollback controller
//!
//! Every value here is rebuilt from the cluster on each poll or resolve
//! call; nothing is cached across cycles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Deployment under watch. Fixed for the lifetime of one controller run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadRef {
    pub namespace: String,
    pub name: String,
}

impl WorkloadRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Label selector matching the workload's pods and replica-sets
    pub fn selector(&self) -> String {
        format!("app={}", self.name)
    }
}

impl std::fmt::Display for WorkloadRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Pod lifecycle phase as reported by the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// Parse the cluster's string phase; unrecognised values map to Unknown
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Pending" => PodPhase::Pending,
            "Running" => PodPhase::Running,
            "Succeeded" => PodPhase::Succeeded,
            "Failed" => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

/// Point-in-time view of one pod, produced fresh on every poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodSnapshot {
    pub name: String,
    pub phase: PodPhase,
    pub ip: Option<String>,
    pub containers_ready: bool,
}

/// Result of one bounded health probe against one pod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub pod_name: String,
    pub reachable: bool,
    pub http_status: Option<u16>,
    pub latency: Duration,
}

impl ProbeOutcome {
    /// The probe half of the health rule: a response arrived in time and
    /// carried HTTP 200. Any other status or no response is unhealthy.
    pub fn is_healthy(&self) -> bool {
        self.reachable && self.http_status == Some(200)
    }
}

/// Aggregated fleet health for one polling attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthVerdict {
    pub healthy_count: usize,
    pub total_count: usize,
    pub healthy_percentage: f64,
    pub attempt: usize,
}

impl HealthVerdict {
    /// Build a verdict, deriving the percentage. A verdict over zero pods
    /// reports 0% so that "no pods found" is a failure, never a vacuous
    /// success.
    pub fn new(healthy_count: usize, total_count: usize, attempt: usize) -> Self {
        let healthy_count = healthy_count.min(total_count);
        let healthy_percentage = if total_count > 0 {
            healthy_count as f64 * 100.0 / total_count as f64
        } else {
            0.0
        };

        Self {
            healthy_count,
            total_count,
            healthy_percentage,
            attempt,
        }
    }

    /// Threshold comparison is inclusive: exactly meeting it passes
    pub fn is_healthy(&self, threshold_pct: f64) -> bool {
        self.total_count > 0 && self.healthy_percentage >= threshold_pct
    }
}

/// One replica-set's revision metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRecord {
    pub revision: String,
    pub created_at: DateTime<Utc>,
    pub is_current: bool,
}

/// What the rollback attempt produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackOutcome {
    pub attempted: bool,
    pub succeeded: bool,
    pub target_revision: Option<String>,
    pub error_detail: Option<String>,
}

impl RollbackOutcome {
    pub fn success(target_revision: impl Into<String>) -> Self {
        Self {
            attempted: true,
            succeeded: true,
            target_revision: Some(target_revision.into()),
            error_detail: None,
        }
    }

    pub fn failure(target_revision: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            attempted: true,
            succeeded: false,
            target_revision: Some(target_revision.into()),
            error_detail: Some(detail.into()),
        }
    }
}
