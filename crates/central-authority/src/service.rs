//! # Authority Service
//!
//! Application service behind the HTTP surface: radio verification with
//! event recording, and the permissioned command relay.

use std::sync::Arc;

use credential_verification::VerificationService;
use shared_types::{
    BarrierAction, BarrierEvent, BarrierId, EventType, PrincipalId, TriggerMethod,
    VerifyRemoteResponse,
};
use tracing::{info, warn};

use crate::domain::authorize::authorize;
use crate::domain::errors::{RelayError, RelayOutcome};
use crate::ports::outbound::{ControllerGateway, Directory, EventStore, StoreError};

/// The authority's application service.
pub struct AuthorityService {
    directory: Arc<dyn Directory>,
    events: Arc<dyn EventStore>,
    gateway: Arc<dyn ControllerGateway>,
    verification: VerificationService,
}

impl AuthorityService {
    /// Wire the service from its collaborators.
    pub fn new(
        directory: Arc<dyn Directory>,
        events: Arc<dyn EventStore>,
        gateway: Arc<dyn ControllerGateway>,
        verification: VerificationService,
    ) -> Self {
        Self {
            directory,
            events,
            gateway,
            verification,
        }
    }

    /// Verify a radio frame for `barrier` and record the outcome.
    ///
    /// Never fails upward: every rejection becomes an access-denied response
    /// with its specific reason, plus an event.
    pub async fn verify_remote(&self, barrier: &BarrierId, frame_hex: &str) -> VerifyRemoteResponse {
        match self.verification.verify_remote(barrier, frame_hex).await {
            Ok(verified) => {
                self.append_event(
                    BarrierEvent::success(
                        barrier.clone(),
                        EventType::AccessGranted,
                        TriggerMethod::Radio,
                        Some(verified.principal.clone()),
                    )
                    .with_details(format!("credential {}", verified.credential_id)),
                )
                .await;
                VerifyRemoteResponse::granted(verified.principal)
            }
            Err(e) => {
                info!(barrier = %barrier, reason = e.reason(), "access denied");
                self.append_event(
                    BarrierEvent::failure(
                        barrier.clone(),
                        EventType::AccessDenied,
                        TriggerMethod::Radio,
                        None,
                        Some(BarrierAction::Open),
                    )
                    .with_details(e.reason()),
                )
                .await;
                VerifyRemoteResponse::denied(e.reason())
            }
        }
    }

    /// Check permissions and relay `action` to the barrier's controller,
    /// forwarding the caller identity.
    ///
    /// The controller's response travels back verbatim; only authorization
    /// and transport problems become [`RelayError`]s.
    pub async fn relay(
        &self,
        principal: &PrincipalId,
        barrier: &BarrierId,
        action: BarrierAction,
    ) -> Result<RelayOutcome, RelayError> {
        let level = self
            .directory
            .permission_level(principal, barrier)
            .await
            .map_err(|StoreError::Unavailable(msg)| RelayError::Store(msg))?;

        let level = authorize(level, action).inspect_err(|e| {
            warn!(
                principal = %principal,
                barrier = %barrier,
                action = %action,
                reason = e.reason(),
                "authorization failed"
            );
        })?;

        let endpoint = self
            .directory
            .controller_endpoint(barrier)
            .await
            .map_err(|StoreError::Unavailable(msg)| RelayError::Store(msg))?
            .ok_or(RelayError::UnknownBarrier)?;

        info!(
            principal = %principal,
            level = %level,
            barrier = %barrier,
            action = %action,
            "relaying authorized command"
        );
        self.gateway.send(&endpoint, action, principal).await
    }

    /// Append one event from a controller (the event intake endpoint).
    pub async fn record_event(&self, event: BarrierEvent) -> Result<(), StoreError> {
        self.events.append(event).await
    }

    /// Recent events, newest first (operator readback).
    pub async fn recent_events(&self, limit: usize) -> Result<Vec<BarrierEvent>, StoreError> {
        self.events.recent(limit).await
    }

    async fn append_event(&self, event: BarrierEvent) {
        if let Err(e) = self.events.append(event).await {
            warn!(error = %e, "failed to record event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryDirectory, MemoryEventStore};
    use credential_verification::{seal_frame, CredentialDirectory, CredentialRecord};
    use parking_lot::Mutex;
    use shared_crypto::{CipherKey, CounterSeed, MacKey};
    use shared_types::{CredentialId, PermissionLevel};

    /// Mock gateway that records sends and replies with a canned outcome.
    struct MockGateway {
        sent: Mutex<Vec<(String, BarrierAction, PrincipalId)>>,
        reply: Box<dyn Fn() -> Result<RelayOutcome, RelayError> + Send + Sync>,
    }

    impl MockGateway {
        fn ok() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                reply: Box::new(|| {
                    Ok(RelayOutcome {
                        status: 202,
                        body: serde_json::json!({"status": "ok", "message": "Opening initiated."}),
                    })
                }),
            }
        }

        fn timing_out() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                reply: Box::new(|| Err(RelayError::GatewayTimeout)),
            }
        }
    }

    #[async_trait::async_trait]
    impl ControllerGateway for MockGateway {
        async fn send(
            &self,
            endpoint: &str,
            action: BarrierAction,
            principal: &PrincipalId,
        ) -> Result<RelayOutcome, RelayError> {
            self.sent
                .lock()
                .push((endpoint.to_string(), action, principal.clone()));
            (self.reply)()
        }
    }

    fn credential(barrier: &str) -> CredentialRecord {
        CredentialRecord {
            id: CredentialId::from_bytes([0xCA; 8]),
            principal: PrincipalId::from("Remote 1"),
            barrier: BarrierId::from(barrier),
            cipher_key: CipherKey::generate(),
            mac_key: MacKey::generate(),
            counter_seed: CounterSeed::generate(),
            last_accepted_counter: 0,
        }
    }

    fn service_with(
        directory: Arc<MemoryDirectory>,
        gateway: Arc<MockGateway>,
    ) -> (AuthorityService, Arc<MemoryEventStore>) {
        let events = Arc::new(MemoryEventStore::new());
        let verification =
            VerificationService::new(Arc::clone(&directory) as Arc<dyn CredentialDirectory>);
        let service = AuthorityService::new(
            directory,
            Arc::clone(&events) as Arc<dyn EventStore>,
            gateway,
            verification,
        );
        (service, events)
    }

    #[tokio::test]
    async fn test_relay_requires_grant() {
        let directory = Arc::new(MemoryDirectory::new());
        directory.register_barrier(BarrierId::from("gate-01"), "http://controller");
        let gateway = Arc::new(MockGateway::ok());
        let (service, _) = service_with(directory, Arc::clone(&gateway));

        let err = service
            .relay(
                &PrincipalId::from("nobody"),
                &BarrierId::from("gate-01"),
                BarrierAction::Open,
            )
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "no_permission");
        assert!(gateway.sent.lock().is_empty(), "no relay before authz");
    }

    #[tokio::test]
    async fn test_relay_rejects_insufficient_level_before_network() {
        let directory = Arc::new(MemoryDirectory::new());
        directory.register_barrier(BarrierId::from("gate-01"), "http://controller");
        directory.grant(
            PrincipalId::from("jan"),
            BarrierId::from("gate-01"),
            PermissionLevel::Operator,
        );
        let gateway = Arc::new(MockGateway::ok());
        let (service, _) = service_with(directory, Arc::clone(&gateway));

        let err = service
            .relay(
                &PrincipalId::from("jan"),
                &BarrierId::from("gate-01"),
                BarrierAction::ServiceStart,
            )
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "insufficient_level");
        assert!(gateway.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_relay_forwards_outcome_verbatim() {
        let directory = Arc::new(MemoryDirectory::new());
        directory.register_barrier(BarrierId::from("gate-01"), "http://controller");
        directory.grant(
            PrincipalId::from("jan"),
            BarrierId::from("gate-01"),
            PermissionLevel::Technician,
        );
        let gateway = Arc::new(MockGateway::ok());
        let (service, _) = service_with(directory, Arc::clone(&gateway));

        let outcome = service
            .relay(
                &PrincipalId::from("jan"),
                &BarrierId::from("gate-01"),
                BarrierAction::Open,
            )
            .await
            .unwrap();
        assert_eq!(outcome.status, 202);
        assert_eq!(outcome.body["status"], "ok");

        let sent = gateway.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].2, PrincipalId::from("jan"));
    }

    #[tokio::test]
    async fn test_relay_surfaces_timeout() {
        let directory = Arc::new(MemoryDirectory::new());
        directory.register_barrier(BarrierId::from("gate-01"), "http://controller");
        directory.grant(
            PrincipalId::from("jan"),
            BarrierId::from("gate-01"),
            PermissionLevel::Operator,
        );
        let (service, _) = service_with(directory, Arc::new(MockGateway::timing_out()));

        let err = service
            .relay(
                &PrincipalId::from("jan"),
                &BarrierId::from("gate-01"),
                BarrierAction::Close,
            )
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "gateway_timeout");
        assert_eq!(err.http_status(), 504);
    }

    #[tokio::test]
    async fn test_relay_unknown_barrier() {
        let directory = Arc::new(MemoryDirectory::new());
        directory.grant(
            PrincipalId::from("jan"),
            BarrierId::from("gate-02"),
            PermissionLevel::Operator,
        );
        let (service, _) = service_with(directory, Arc::new(MockGateway::ok()));

        let err = service
            .relay(
                &PrincipalId::from("jan"),
                &BarrierId::from("gate-02"),
                BarrierAction::Open,
            )
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "unknown_barrier");
    }

    #[tokio::test]
    async fn test_verify_remote_records_grant_and_denial() {
        let directory = Arc::new(MemoryDirectory::new());
        let record = credential("gate-01");
        let frame_hex = hex::encode(seal_frame(&record, 1, b"open"));
        directory.issue_credential(record);
        let (service, events) = service_with(directory, Arc::new(MockGateway::ok()));

        let barrier = BarrierId::from("gate-01");
        let granted = service.verify_remote(&barrier, &frame_hex).await;
        assert!(granted.access_granted);
        assert_eq!(granted.principal, Some(PrincipalId::from("Remote 1")));

        let replayed = service.verify_remote(&barrier, &frame_hex).await;
        assert!(!replayed.access_granted);
        assert_eq!(replayed.reason.as_deref(), Some("stale_counter"));

        let recorded = events.recent(10).await.unwrap();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].event_type, EventType::AccessDenied);
        assert_eq!(recorded[1].event_type, EventType::AccessGranted);
    }
}
