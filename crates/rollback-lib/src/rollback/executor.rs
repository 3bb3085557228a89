//! Rollback execution through the external rollout actuator

use crate::models::{RollbackOutcome, WorkloadRef};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{error, info};

/// Raw result reported by the rollout actuator
#[derive(Debug, Clone)]
pub struct ActuatorReport {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// The external mechanism that mutates a deployment to a prior revision.
/// Its retry and consistency semantics are its own; only the reported
/// result matters here.
#[async_trait]
pub trait RolloutActuator: Send + Sync {
    async fn undo(&self, workload: &WorkloadRef, revision: &str) -> Result<ActuatorReport>;
}

/// Actuator driving `kubectl rollout undo`
#[derive(Debug, Default)]
pub struct KubectlActuator;

impl KubectlActuator {
    fn argv(workload: &WorkloadRef, revision: &str) -> Vec<String> {
        vec![
            "rollout".to_string(),
            "undo".to_string(),
            format!("deployment/{}", workload.name),
            format!("--namespace={}", workload.namespace),
            format!("--to-revision={}", revision),
        ]
    }
}

#[async_trait]
impl RolloutActuator for KubectlActuator {
    async fn undo(&self, workload: &WorkloadRef, revision: &str) -> Result<ActuatorReport> {
        let output = Command::new("kubectl")
            .args(Self::argv(workload, revision))
            .output()
            .await
            .context("Failed to run kubectl")?;

        Ok(ActuatorReport {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Invokes the actuator once and folds every failure mode into the
/// outcome value. No post-rollback verification happens here, and a
/// failed rollback is never retried automatically.
pub struct RollbackExecutor {
    actuator: Arc<dyn RolloutActuator>,
}

impl RollbackExecutor {
    pub fn new(actuator: Arc<dyn RolloutActuator>) -> Self {
        Self { actuator }
    }

    pub async fn rollback(&self, workload: &WorkloadRef, target_revision: &str) -> RollbackOutcome {
        info!(
            deployment = %workload.name,
            namespace = %workload.namespace,
            revision = %target_revision,
            "Executing rollback"
        );

        match self.actuator.undo(workload, target_revision).await {
            Ok(report) if report.success => {
                info!(
                    deployment = %workload.name,
                    revision = %target_revision,
                    output = %report.stdout.trim(),
                    "Rollback succeeded"
                );
                RollbackOutcome::success(target_revision)
            }
            Ok(report) => {
                error!(
                    deployment = %workload.name,
                    revision = %target_revision,
                    stderr = %report.stderr.trim(),
                    "Rollback failed"
                );
                RollbackOutcome::failure(target_revision, report.stderr)
            }
            Err(e) => {
                error!(
                    deployment = %workload.name,
                    error = %e,
                    "Rollback actuator could not be invoked"
                );
                RollbackOutcome::failure(target_revision, e.to_string())
            }
        }
    }
}
