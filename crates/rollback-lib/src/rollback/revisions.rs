//! Rollback target selection from replica-set history

use crate::cluster::ClusterOps;
use crate::models::WorkloadRef;
use std::sync::Arc;
use tracing::{info, warn};

/// Last-resort target when no prior revision can be determined. The
/// first-ever revision is the only one guaranteed to have existed; callers
/// treat it as a low-confidence target, not a known-good one.
pub const FALLBACK_REVISION: &str = "1";

/// Picks the most recent revision before the current one
pub struct RevisionResolver {
    cluster: Arc<dyn ClusterOps>,
}

impl RevisionResolver {
    pub fn new(cluster: Arc<dyn ClusterOps>) -> Self {
        Self { cluster }
    }

    /// Resolve the rollback target. Never fails: thin history or a lookup
    /// error degrades to the fallback sentinel, because once the verdict
    /// is unhealthy the remediation step must still attempt something.
    pub async fn resolve_previous(&self, workload: &WorkloadRef) -> String {
        let mut records = match self.cluster.list_revisions(workload).await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    deployment = %workload.name,
                    error = %e,
                    fallback = FALLBACK_REVISION,
                    "Failed to list replica-set history"
                );
                return FALLBACK_REVISION.to_string();
            }
        };

        // Newest first. The live revision is excluded by its annotation
        // mark when the cluster reported one, otherwise by position.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let previous = if records.iter().any(|r| r.is_current) {
            records.iter().find(|r| !r.is_current)
        } else {
            records.get(1)
        };

        match previous {
            Some(record) => {
                info!(
                    deployment = %workload.name,
                    revision = %record.revision,
                    "Resolved previous revision"
                );
                record.revision.clone()
            }
            None => {
                warn!(
                    deployment = %workload.name,
                    fallback = FALLBACK_REVISION,
                    "No prior revision in history"
                );
                FALLBACK_REVISION.to_string()
            }
        }
    }
}
