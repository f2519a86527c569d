use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::TrackEvent;

/// Delivery backend for tracking events
#[async_trait]
pub trait Transport: Send + Sync {
    /// Regular delivery
    async fn send(&self, event: &TrackEvent) -> Result<()>;

    /// Delivery that must complete while the client shuts down.
    ///
    /// Returns `Ok(false)` when no such delivery exists, in which case the
    /// caller falls back to `send`.
    async fn beacon(&self, _event: &TrackEvent) -> Result<bool> {
        Ok(false)
    }
}

const BEACON_TIMEOUT: Duration = Duration::from_secs(2);

/// Posts events as JSON to the tracking endpoint, without credentials
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create tracking HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, event: &TrackEvent) -> Result<()> {
        self.client
            .post(&self.endpoint)
            .json(event)
            .send()
            .await
            .context("Tracking request failed")?
            .error_for_status()
            .context("Tracking endpoint rejected event")?;
        Ok(())
    }

    async fn beacon(&self, event: &TrackEvent) -> Result<bool> {
        self.client
            .post(&self.endpoint)
            .json(event)
            .timeout(BEACON_TIMEOUT)
            .send()
            .await
            .context("Beacon request failed")?
            .error_for_status()
            .context("Tracking endpoint rejected beacon")?;
        Ok(true)
    }
}
