//! Best-effort rollback event notification
//!
//! Fire-and-forget delivery to a Slack-compatible webhook. Failures are
//! logged and swallowed; nothing on this path can change the controller's
//! exit status.

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Payload shape understood by Slack-compatible webhook endpoints
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
    username: &'a str,
    icon_emoji: &'a str,
}

pub struct Notifier {
    webhook: Option<Url>,
    client: reqwest::Client,
}

impl Notifier {
    /// A notifier with no destination is a valid no-op notifier
    pub fn new(webhook_url: Option<&str>) -> Result<Self> {
        let webhook = webhook_url
            .map(|raw| Url::parse(raw).context("Invalid webhook URL"))
            .transpose()?;

        let client = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { webhook, client })
    }

    pub async fn notify(&self, message: &str) {
        let Some(webhook) = &self.webhook else {
            debug!("No webhook configured, skipping notification");
            return;
        };

        let payload = WebhookPayload {
            text: message,
            username: "Rollback Bot",
            icon_emoji: ":warning:",
        };

        match self.client.post(webhook.clone()).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(status = response.status().as_u16(), "Notification delivered");
            }
            Ok(response) => {
                warn!(
                    status = response.status().as_u16(),
                    "Notification endpoint returned an error"
                );
            }
            Err(e) => {
                warn!(error = %e, "Failed to deliver notification");
            }
        }
    }
}
