//! Single-run orchestration: monitor, resolve, roll back, notify
//!
//! Collaborators are owned explicitly by the controller for one run; there
//! is no global client or logger state.

use crate::cluster::ClusterOps;
use crate::health::HealthMonitor;
use crate::models::{RollbackOutcome, WorkloadRef};
use crate::notify::Notifier;
use crate::rollback::{RevisionResolver, RollbackExecutor};
use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Terminal state of one controller run, mapped onto the process exit
/// status
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Workload met the health threshold; nothing was mutated
    Healthy,
    /// Unhealthy, but the operator disabled remediation
    CheckOnlyUnhealthy,
    /// Rollback attempted and the actuator reported success
    RolledBack(RollbackOutcome),
    /// Rollback attempted and failed; diagnostics in the outcome
    RollbackFailed(RollbackOutcome),
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Healthy | RunOutcome::RolledBack(_) => 0,
            RunOutcome::CheckOnlyUnhealthy | RunOutcome::RollbackFailed(_) => 1,
        }
    }
}

/// Per-run operator options
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Report health without mutating the deployment
    pub check_only: bool,
    /// Explicit rollback target, bypassing history inference
    pub revision_override: Option<String>,
}

pub struct RollbackController {
    cluster: Arc<dyn ClusterOps>,
    monitor: HealthMonitor,
    resolver: RevisionResolver,
    executor: RollbackExecutor,
    notifier: Notifier,
}

impl RollbackController {
    pub fn new(
        cluster: Arc<dyn ClusterOps>,
        monitor: HealthMonitor,
        resolver: RevisionResolver,
        executor: RollbackExecutor,
        notifier: Notifier,
    ) -> Self {
        Self {
            cluster,
            monitor,
            resolver,
            executor,
            notifier,
        }
    }

    /// Run the controller once. Only a missing workload or a cluster
    /// failure during the existence check surfaces as an error; every
    /// other outcome is a terminal state with an exit code.
    pub async fn run(&self, workload: &WorkloadRef, options: &RunOptions) -> Result<RunOutcome> {
        if !self.cluster.deployment_exists(workload).await? {
            bail!("deployment {workload} not found");
        }

        info!(deployment = %workload.name, namespace = %workload.namespace, "Checking deployment health");

        if self.monitor.wait_for_healthy(workload).await {
            info!(deployment = %workload.name, "Deployment healthy, no rollback required");
            return Ok(RunOutcome::Healthy);
        }

        warn!(deployment = %workload.name, "Deployment unhealthy");

        if options.check_only {
            info!("Check-only mode, skipping rollback");
            return Ok(RunOutcome::CheckOnlyUnhealthy);
        }

        let target = match &options.revision_override {
            Some(revision) => {
                info!(revision = %revision, "Using operator-specified rollback revision");
                revision.clone()
            }
            None => self.resolver.resolve_previous(workload).await,
        };

        let outcome = self.executor.rollback(workload, &target).await;

        let message = if outcome.succeeded {
            format!(
                "Rollback executed for {} in {} (revision {target})",
                workload.name, workload.namespace
            )
        } else {
            format!(
                "Rollback FAILED for {} in {} (revision {target})",
                workload.name, workload.namespace
            )
        };
        self.notifier.notify(&message).await;

        if outcome.succeeded {
            Ok(RunOutcome::RolledBack(outcome))
        } else {
            Ok(RunOutcome::RollbackFailed(outcome))
        }
    }
}
