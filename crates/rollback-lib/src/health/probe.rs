//! Single-pod HTTP health probe

use crate::models::ProbeOutcome;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Where on each pod the liveness endpoint lives
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub port: u16,
    pub path: String,
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            path: "/api/v1/health".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// One bounded GET against a pod's health endpoint
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Never fails: network errors, timeouts, and bad statuses are all
    /// expressed in the returned outcome, not raised.
    async fn probe(&self, pod_name: &str, ip: &str) -> ProbeOutcome;
}

/// HTTP implementation of the pod health probe
pub struct HttpProbe {
    client: reqwest::Client,
    config: ProbeConfig,
}

impl HttpProbe {
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, ip: &str) -> String {
        format!("http://{}:{}{}", ip, self.config.port, self.config.path)
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn probe(&self, pod_name: &str, ip: &str) -> ProbeOutcome {
        let url = self.endpoint(ip);
        let start = Instant::now();

        let result = self
            .client
            .get(&url)
            .timeout(self.config.timeout)
            .send()
            .await;
        let latency = start.elapsed();

        match result {
            Ok(response) => {
                let status = response.status().as_u16();
                debug!(
                    pod = %pod_name,
                    status,
                    latency_ms = latency.as_millis() as u64,
                    "Health probe completed"
                );
                ProbeOutcome {
                    pod_name: pod_name.to_string(),
                    reachable: true,
                    http_status: Some(status),
                    latency,
                }
            }
            Err(e) => {
                debug!(pod = %pod_name, error = %e, "Health probe failed");
                ProbeOutcome {
                    pod_name: pod_name.to_string(),
                    reachable: false,
                    http_status: None,
                    latency,
                }
            }
        }
    }
}
