//! # Radio Signal Gateway
//!
//! Pulls frames off the radio link, relays them to the authority for
//! verification, and opens the barrier on an access-granted answer.
//!
//! The gateway never opens on an ambiguous outcome: denial, transport
//! failure, and malformed responses all end the same way — a log line and
//! nothing else.

use std::sync::Arc;

use barrier_actuator::BarrierActuator;
use shared_types::{BarrierId, TriggerMethod};
use tracing::{debug, info, warn};

use crate::ports::{AuthorityClient, RadioFrame, RadioLink};

/// Receives raw frames and turns verified ones into open commands.
pub struct RadioSignalGateway {
    barrier_id: BarrierId,
    actuator: Arc<BarrierActuator>,
    authority: Arc<dyn AuthorityClient>,
    link: Box<dyn RadioLink>,
}

impl RadioSignalGateway {
    /// Wire the gateway.
    pub fn new(
        barrier_id: BarrierId,
        actuator: Arc<BarrierActuator>,
        authority: Arc<dyn AuthorityClient>,
        link: Box<dyn RadioLink>,
    ) -> Self {
        Self {
            barrier_id,
            actuator,
            authority,
            link,
        }
    }

    /// Consume the link until it closes.
    pub async fn run(mut self) {
        info!(
            barrier = %self.barrier_id,
            mode = self.link.mode_name(),
            "radio gateway listening"
        );
        while let Some(frame) = self.link.recv().await {
            self.handle_frame(frame).await;
        }
        info!(barrier = %self.barrier_id, "radio link closed, gateway stopping");
    }

    /// Handle one received frame.
    async fn handle_frame(&self, frame: RadioFrame) {
        debug!(
            barrier = %self.barrier_id,
            len = frame.bytes.len(),
            rssi = ?frame.rssi,
            "radio frame received"
        );

        // Local fast path, not a security decision: when the barrier cannot
        // usefully open anyway, skip the round-trip and emit nothing.
        let snapshot = self.actuator.snapshot();
        let skip_reason = if snapshot.service_mode {
            Some("service mode active")
        } else if snapshot.in_motion {
            Some("barrier in motion")
        } else if snapshot.is_open {
            Some("barrier already open")
        } else {
            None
        };
        if let Some(reason) = skip_reason {
            debug!(barrier = %self.barrier_id, reason, "ignoring radio frame");
            return;
        }

        let frame_hex = hex::encode(&frame.bytes);
        match self
            .authority
            .verify_remote(&self.barrier_id, &frame_hex)
            .await
        {
            Ok(response) if response.access_granted => {
                info!(
                    barrier = %self.barrier_id,
                    principal = ?response.principal,
                    rssi = ?frame.rssi,
                    "access granted, opening"
                );
                let actuator = Arc::clone(&self.actuator);
                let principal = response.principal;
                tokio::spawn(async move {
                    if let Err(e) = actuator.open(TriggerMethod::Radio, principal).await {
                        warn!(error = %e, "radio-triggered open failed");
                    }
                });
            }
            Ok(response) => {
                info!(
                    barrier = %self.barrier_id,
                    reason = response.reason.as_deref().unwrap_or("unspecified"),
                    "access denied by authority"
                );
            }
            Err(e) => {
                warn!(
                    barrier = %self.barrier_id,
                    error = %e,
                    "verification failed, not opening"
                );
            }
        }
    }
}
