//! Deployment Rollback Controller CLI
//!
//! Watches a deployment's pod health and rolls it back to the previous
//! revision when the fleet drops below the health threshold.

mod config;
mod output;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use rollback_lib::{
    HealthAggregator, HealthMonitor, HttpProbe, KubeCluster, KubectlActuator, MonitorPolicy,
    Notifier, ProbeConfig, RevisionResolver, RollbackController, RollbackExecutor, RunOptions,
    WorkloadRef,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Health-gated rollback for Kubernetes deployments
#[derive(Parser)]
#[command(name = "drc")]
#[command(author, version, about = "Health-gated rollback for Kubernetes deployments", long_about = None)]
pub struct Cli {
    /// Kubernetes namespace of the deployment
    #[arg(long, default_value = "default")]
    pub namespace: String,

    /// Deployment to watch
    #[arg(long)]
    pub deployment: String,

    /// Only report health, never mutate the deployment
    #[arg(long)]
    pub check_only: bool,

    /// Explicit revision to roll back to (skips history inference)
    #[arg(long)]
    pub revision: Option<String>,

    /// Health check attempts before declaring the deployment unhealthy
    #[arg(long, default_value_t = 10)]
    pub max_retries: usize,

    /// Seconds to wait between health check attempts
    #[arg(long, default_value_t = 30)]
    pub retry_interval: u64,

    /// Healthy pod percentage required to pass
    #[arg(long, default_value_t = 80.0)]
    pub threshold: f64,

    /// Port the pods' health endpoint listens on
    #[arg(long, default_value_t = 8000)]
    pub health_port: u16,

    /// Path of the pods' health endpoint
    #[arg(long, default_value = "/api/v1/health")]
    pub health_path: String,

    /// Per-pod probe timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub probe_timeout: u64,

    /// Webhook for rollback notifications (can also be set via SLACK_WEBHOOK_URL env var)
    #[arg(long, env = "SLACK_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer())
        .init();

    let file_config = config::Config::load().unwrap_or_default();
    let webhook_url = cli.webhook_url.clone().or(file_config.webhook_url);

    let workload = WorkloadRef::new(&cli.namespace, &cli.deployment);
    info!(deployment = %workload, "Starting rollback controller");

    let cluster = Arc::new(KubeCluster::connect().await?);

    let probe = Arc::new(HttpProbe::new(ProbeConfig {
        port: cli.health_port,
        path: cli.health_path.clone(),
        timeout: Duration::from_secs(cli.probe_timeout),
    })?);
    let aggregator = Arc::new(HealthAggregator::new(cluster.clone(), probe));
    let monitor = HealthMonitor::new(
        aggregator,
        MonitorPolicy {
            max_retries: cli.max_retries,
            retry_interval: Duration::from_secs(cli.retry_interval),
            healthy_threshold_pct: cli.threshold,
        },
    );
    let resolver = RevisionResolver::new(cluster.clone());
    let executor = RollbackExecutor::new(Arc::new(KubectlActuator));
    let notifier = Notifier::new(webhook_url.as_deref())?;

    // Show the rollout history up front when remediation is on the table
    if !cli.check_only {
        output::print_revision_history(cluster.as_ref(), &workload).await;
    }

    let controller = RollbackController::new(cluster, monitor, resolver, executor, notifier);
    let options = RunOptions {
        check_only: cli.check_only,
        revision_override: cli.revision.clone(),
    };

    let outcome = controller.run(&workload, &options).await?;
    output::print_outcome(&outcome, &workload);

    std::process::exit(outcome.exit_code());
}
