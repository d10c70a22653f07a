//! # Access & Operational Events
//!
//! Every state transition and every verification outcome produces one
//! [`BarrierEvent`]. Events flow one way: components append them through the
//! [`EventSink`] capability and never read them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{BarrierAction, BarrierId, PrincipalId};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// The barrier finished (or failed) an open sequence.
    BarrierOpened,
    /// The barrier finished a close sequence.
    BarrierClosed,
    /// One close attempt failed (obstacle or external stop); more context in
    /// `details`.
    CloseAttemptFailed,
    /// Terminal operational failure requiring operator attention.
    BarrierFailure,
    /// Service mode was switched on.
    ServiceModeStarted,
    /// Service mode end was attempted; `success` tells whether it stuck.
    ServiceModeEnded,
    /// A radio credential was accepted by the authority.
    AccessGranted,
    /// A radio credential was rejected; `details` carries the reason.
    AccessDenied,
    /// Controller process came up.
    SystemStartup,
    /// Controller process is going down.
    SystemShutdown,
    /// Fatal startup/runtime failure.
    SystemFailure,
}

/// Which path triggered the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMethod {
    /// Relayed administrative command.
    Api,
    /// Verified radio credential.
    Radio,
    /// The auto-close timer.
    AutoClose,
    /// Side effect of entering service mode.
    ServiceStart,
    /// Side effect of leaving service mode.
    ServiceEnd,
    /// Process startup.
    Startup,
    /// Process shutdown.
    Shutdown,
}

/// One appended access/operational event record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarrierEvent {
    /// The barrier this event belongs to.
    pub barrier_id: BarrierId,
    /// What happened.
    pub event_type: EventType,
    /// Which path triggered it.
    pub trigger_method: TriggerMethod,
    /// When it happened (controller clock).
    pub timestamp: DateTime<Utc>,
    /// Attributed principal, when one is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<PrincipalId>,
    /// Whether the transition/verification succeeded.
    pub success: bool,
    /// Free-text detail for humans and dashboards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// The action that failed, for failure events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_action: Option<BarrierAction>,
}

impl BarrierEvent {
    /// Build a successful event.
    #[must_use]
    pub fn success(
        barrier_id: BarrierId,
        event_type: EventType,
        trigger_method: TriggerMethod,
        principal: Option<PrincipalId>,
    ) -> Self {
        Self {
            barrier_id,
            event_type,
            trigger_method,
            timestamp: Utc::now(),
            principal,
            success: true,
            details: None,
            failed_action: None,
        }
    }

    /// Build a failure event tagged with the action that failed.
    #[must_use]
    pub fn failure(
        barrier_id: BarrierId,
        event_type: EventType,
        trigger_method: TriggerMethod,
        principal: Option<PrincipalId>,
        failed_action: Option<BarrierAction>,
    ) -> Self {
        Self {
            barrier_id,
            event_type,
            trigger_method,
            timestamp: Utc::now(),
            principal,
            success: false,
            details: None,
            failed_action,
        }
    }

    /// Attach free-text detail.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Append-only sink for access/operational events.
///
/// Delivery is best-effort from the producer's point of view: adapters own
/// their transport errors (retrying or logging them), so producers never
/// block a physical transition on event delivery.
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    /// Append one event record.
    async fn record(&self, event: BarrierEvent);
}

/// Sink that only logs events through `tracing`.
///
/// Used when no central endpoint is configured, matching the controller's
/// "notifications disabled" mode.
#[derive(Debug, Default)]
pub struct TracingEventSink;

#[async_trait::async_trait]
impl EventSink for TracingEventSink {
    async fn record(&self, event: BarrierEvent) {
        tracing::info!(
            barrier = %event.barrier_id,
            event_type = ?event.event_type,
            trigger = ?event.trigger_method,
            success = event.success,
            details = event.details.as_deref().unwrap_or(""),
            "barrier event"
        );
    }
}

/// Sink that keeps every event in memory.
///
/// Backs the in-process event store and the assertions in the test suites.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: parking_lot::Mutex<Vec<BarrierEvent>>,
}

impl MemoryEventSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in append order.
    #[must_use]
    pub fn recorded(&self) -> Vec<BarrierEvent> {
        self.events.lock().clone()
    }

    /// The most recent `limit` events, newest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<BarrierEvent> {
        let events = self.events.lock();
        events.iter().rev().take(limit).cloned().collect()
    }
}

#[async_trait::async_trait]
impl EventSink for MemoryEventSink {
    async fn record(&self, event: BarrierEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format_uses_snake_case() {
        let event = BarrierEvent::failure(
            BarrierId::from("gate-01"),
            EventType::BarrierFailure,
            TriggerMethod::AutoClose,
            None,
            Some(BarrierAction::Close),
        )
        .with_details("attempts exhausted");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "barrier_failure");
        assert_eq!(json["trigger_method"], "auto_close");
        assert_eq!(json["failed_action"], "close");
        assert_eq!(json["success"], false);
    }

    #[test]
    fn test_success_event_omits_optional_fields() {
        let event = BarrierEvent::success(
            BarrierId::from("gate-01"),
            EventType::BarrierOpened,
            TriggerMethod::Radio,
            Some(PrincipalId::from("remote-7")),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("details").is_none());
        assert!(json.get("failed_action").is_none());
        assert_eq!(json["principal"], "remote-7");
    }
}
