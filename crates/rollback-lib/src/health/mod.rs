//! Health evaluation: per-pod probing, fleet aggregation, bounded polling

mod aggregate;
mod monitor;
mod probe;

pub use aggregate::{Aggregate, HealthAggregator};
pub use monitor::{HealthMonitor, MonitorPolicy};
pub use probe::{HealthProbe, HttpProbe, ProbeConfig};
