//! Full radio path without HTTP in between: frame from the modem channel,
//! verification by the real authority service, actuator open on grant.

use std::sync::Arc;
use std::time::Duration;

use barrier_actuator::{ActuatorConfig, BarrierActuator, StaticSensor, TracingLamp};
use barrier_controller::{
    AuthorityClient, AuthorityClientError, FskLink, FskParams, RadioFrame, RadioSignalGateway,
};
use central_authority::{
    AuthorityService, ControllerGateway, Directory, EventStore, MemoryDirectory, MemoryEventStore,
    RelayError, RelayOutcome,
};
use credential_verification::{
    seal_frame, CredentialDirectory, CredentialRecord, VerificationService,
};
use shared_crypto::{CipherKey, CounterSeed, MacKey};
use shared_types::{
    BarrierAction, BarrierId, CredentialId, EventSink, EventType, MemoryEventSink, PrincipalId,
    TriggerMethod, VerifyRemoteResponse,
};
use tokio::sync::mpsc;

/// Adapter running the authority service in-process, standing in for the
/// HTTP hop between controller and authority.
struct InProcessAuthority {
    service: AuthorityService,
}

#[async_trait::async_trait]
impl AuthorityClient for InProcessAuthority {
    async fn verify_remote(
        &self,
        barrier: &BarrierId,
        frame_hex: &str,
    ) -> Result<VerifyRemoteResponse, AuthorityClientError> {
        Ok(self.service.verify_remote(barrier, frame_hex).await)
    }
}

/// The relay gateway is unused on this path; refuse loudly if touched.
struct NoRelayGateway;

#[async_trait::async_trait]
impl ControllerGateway for NoRelayGateway {
    async fn send(
        &self,
        _endpoint: &str,
        _action: BarrierAction,
        _principal: &PrincipalId,
    ) -> Result<RelayOutcome, RelayError> {
        Err(RelayError::GatewayConnection(
            "no relay expected in this scenario".into(),
        ))
    }
}

fn issued_record() -> CredentialRecord {
    CredentialRecord {
        id: CredentialId::from_bytes([0xCA, 0xFE, 0xBA, 0xBE, 0xDE, 0xAD, 0xBE, 0xEF]),
        principal: PrincipalId::from("Remote 1"),
        barrier: BarrierId::from("gate-01"),
        cipher_key: CipherKey::generate(),
        mac_key: MacKey::generate(),
        counter_seed: CounterSeed::generate(),
        last_accepted_counter: 0,
    }
}

fn authority_with(record: &CredentialRecord) -> (Arc<InProcessAuthority>, Arc<MemoryEventStore>) {
    let directory = Arc::new(MemoryDirectory::new());
    directory.issue_credential(record.clone());
    let events = Arc::new(MemoryEventStore::new());
    let verification =
        VerificationService::new(Arc::clone(&directory) as Arc<dyn CredentialDirectory>);
    let service = AuthorityService::new(
        directory as Arc<dyn Directory>,
        Arc::clone(&events) as Arc<dyn EventStore>,
        Arc::new(NoRelayGateway),
        verification,
    );
    (Arc::new(InProcessAuthority { service }), events)
}

fn fast_actuator() -> (Arc<BarrierActuator>, Arc<MemoryEventSink>) {
    let events = Arc::new(MemoryEventSink::new());
    let config = ActuatorConfig {
        open_duration: Duration::from_millis(10),
        close_duration: Duration::from_millis(20),
        retry_delay: Duration::from_millis(5),
        poll_interval: Duration::from_millis(5),
        auto_close_delay: Duration::from_secs(60),
        ..ActuatorConfig::default()
    };
    let actuator = BarrierActuator::new(
        BarrierId::from("gate-01"),
        config,
        Arc::new(StaticSensor(Some(80.0))),
        Arc::new(TracingLamp),
        Arc::clone(&events) as Arc<dyn EventSink>,
    )
    .unwrap();
    (Arc::new(actuator), events)
}

#[tokio::test]
async fn test_radio_frame_opens_barrier_and_replay_does_not() {
    let record = issued_record();
    let (authority, authority_events) = authority_with(&record);
    let (actuator, controller_events) = fast_actuator();

    let (tx, rx) = mpsc::channel(8);
    let link = Box::new(FskLink::new(FskParams::default(), rx));
    let gateway = RadioSignalGateway::new(
        BarrierId::from("gate-01"),
        Arc::clone(&actuator),
        Arc::clone(&authority) as Arc<dyn AuthorityClient>,
        link,
    );
    let gateway_task = tokio::spawn(gateway.run());

    // First press: verified, barrier opens.
    let frame = seal_frame(&record, 1, b"open");
    tx.send(RadioFrame::new(frame.clone())).await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(actuator.snapshot().is_open);

    // Captured replay while the barrier is open: the local fast path drops
    // it before verification.
    tx.send(RadioFrame::new(frame.clone())).await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    // Close again and replay once more: now it reaches the authority and
    // dies on the replay guard.
    actuator.close(TriggerMethod::Api, None).await.unwrap();
    tx.send(RadioFrame::new(frame)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(
        !actuator.snapshot().is_open,
        "replayed frame must not reopen the barrier"
    );

    drop(tx);
    gateway_task.await.unwrap();

    // Authority saw exactly one grant and one denial.
    let recorded = authority_events.recent(10).await.unwrap();
    let grants = recorded
        .iter()
        .filter(|e| e.event_type == EventType::AccessGranted)
        .count();
    let denials: Vec<_> = recorded
        .iter()
        .filter(|e| e.event_type == EventType::AccessDenied)
        .collect();
    assert_eq!(grants, 1);
    assert_eq!(denials.len(), 1);
    assert_eq!(denials[0].details.as_deref(), Some("stale_counter"));

    // The controller attributed the open to the credential's principal.
    let opened: Vec<_> = controller_events
        .recorded()
        .into_iter()
        .filter(|e| e.event_type == EventType::BarrierOpened && e.trigger_method == TriggerMethod::Radio)
        .collect();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].principal, Some(PrincipalId::from("Remote 1")));
}

#[tokio::test]
async fn test_forged_frame_never_opens() {
    let record = issued_record();
    let (authority, _authority_events) = authority_with(&record);
    let (actuator, _controller_events) = fast_actuator();

    let (tx, rx) = mpsc::channel(8);
    let link = Box::new(FskLink::new(FskParams::default(), rx));
    let gateway = RadioSignalGateway::new(
        BarrierId::from("gate-01"),
        Arc::clone(&actuator),
        authority as Arc<dyn AuthorityClient>,
        link,
    );
    let gateway_task = tokio::spawn(gateway.run());

    // A frame sealed under a different remote's keys.
    let forged = seal_frame(
        &CredentialRecord {
            id: record.id,
            ..issued_record()
        },
        1,
        b"open",
    );
    tx.send(RadioFrame::new(forged)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert!(!actuator.snapshot().is_open);
    drop(tx);
    gateway_task.await.unwrap();
}
