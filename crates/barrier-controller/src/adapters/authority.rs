//! HTTP client adapters for the central authority: frame verification and
//! event reporting.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use shared_types::{BarrierEvent, BarrierId, EventSink, VerifyRemoteRequest, VerifyRemoteResponse};
use tracing::{debug, error, info, warn};

use crate::ports::{AuthorityClient, AuthorityClientError};

/// reqwest-backed [`AuthorityClient`].
///
/// With no verify URL configured, every frame is rejected as
/// [`AuthorityClientError::Disabled`] — the gateway then never opens, which
/// is the safe direction.
pub struct HttpAuthorityClient {
    client: Client,
    verify_url: Option<String>,
}

impl HttpAuthorityClient {
    /// Build a client with a bounded request timeout.
    pub fn new(
        verify_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AuthorityClientError> {
        if verify_url.is_none() {
            warn!("authority verify endpoint not configured, radio verification is disabled");
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthorityClientError::Transport(e.to_string()))?;
        Ok(Self { client, verify_url })
    }
}

#[async_trait::async_trait]
impl AuthorityClient for HttpAuthorityClient {
    async fn verify_remote(
        &self,
        barrier: &BarrierId,
        frame_hex: &str,
    ) -> Result<VerifyRemoteResponse, AuthorityClientError> {
        let url = self
            .verify_url
            .as_deref()
            .ok_or(AuthorityClientError::Disabled)?;

        let request = VerifyRemoteRequest {
            barrier_id: barrier.clone(),
            frame_hex: frame_hex.to_string(),
        };

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthorityClientError::Timeout
                } else {
                    AuthorityClientError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(AuthorityClientError::Transport(format!(
                "authority answered status {}",
                response.status()
            )));
        }

        response
            .json::<VerifyRemoteResponse>()
            .await
            .map_err(|e| AuthorityClientError::Malformed(e.to_string()))
    }
}

/// Event sink that POSTs each record to the authority's event intake.
///
/// Delivery is fire-and-forget: the post runs in its own task so a slow
/// central endpoint never delays a physical transition. With no event URL
/// configured, events are only logged (reporting disabled).
pub struct HttpEventSink {
    client: Client,
    event_url: Option<Arc<str>>,
}

impl HttpEventSink {
    /// Build a sink with a bounded per-delivery timeout.
    pub fn new(event_url: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        if event_url.is_none() {
            warn!("authority event endpoint not configured, event reporting is disabled");
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            event_url: event_url.map(Into::into),
        })
    }
}

#[async_trait::async_trait]
impl EventSink for HttpEventSink {
    async fn record(&self, event: BarrierEvent) {
        let Some(url) = self.event_url.clone() else {
            debug!(event_type = ?event.event_type, "event reporting disabled, not sent");
            return;
        };

        let client = self.client.clone();
        tokio::spawn(async move {
            let event_type = event.event_type;
            match client.post(url.as_ref()).json(&event).send().await {
                Ok(response) if response.status().is_success() => {
                    info!(event_type = ?event_type, status = %response.status(), "event reported");
                }
                Ok(response) => {
                    error!(
                        event_type = ?event_type,
                        status = %response.status(),
                        "authority rejected event"
                    );
                }
                Err(e) if e.is_timeout() => {
                    error!(event_type = ?event_type, "event report timed out");
                }
                Err(e) => {
                    error!(event_type = ?event_type, error = %e, "event report failed");
                }
            }
        });
    }
}
