//! Remediation: revision-history inference and rollback execution

mod executor;
mod revisions;

pub use executor::{ActuatorReport, KubectlActuator, RollbackExecutor, RolloutActuator};
pub use revisions::{RevisionResolver, FALLBACK_REVISION};
