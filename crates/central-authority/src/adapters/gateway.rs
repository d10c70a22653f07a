//! HTTP gateway to barrier controllers.

use std::time::Duration;

use reqwest::Client;
use shared_types::{BarrierAction, PrincipalId};
use tracing::{info, warn};

use crate::domain::errors::{RelayError, RelayOutcome};
use crate::ports::outbound::ControllerGateway;

/// Header carrying the caller identity to the controller.
pub const USER_ID_HEADER: &str = "x-user-id";

/// reqwest-backed [`ControllerGateway`] with a bounded per-command timeout.
pub struct HttpControllerGateway {
    client: Client,
}

impl HttpControllerGateway {
    /// Build a gateway whose every command times out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::GatewayConnection(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ControllerGateway for HttpControllerGateway {
    async fn send(
        &self,
        endpoint: &str,
        action: BarrierAction,
        principal: &PrincipalId,
    ) -> Result<RelayOutcome, RelayError> {
        let url = format!("{}/{}", endpoint.trim_end_matches('/'), action.as_path());
        info!(url = %url, principal = %principal, "relaying command to controller");

        let response = self
            .client
            .post(&url)
            .header(USER_ID_HEADER, principal.as_str())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!(url = %url, "controller command timed out");
                    RelayError::GatewayTimeout
                } else {
                    warn!(url = %url, error = %e, "controller unreachable");
                    RelayError::GatewayConnection(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| RelayError::GatewayConnection(e.to_string()))?;

        // The controller speaks JSON; anything else is wrapped rather than
        // dropped so the caller still sees what came back.
        let body = serde_json::from_str(&text)
            .unwrap_or_else(|_| serde_json::json!({ "raw_response": text }));

        info!(url = %url, status, "controller responded");
        Ok(RelayOutcome { status, body })
    }
}
