//! Authority-side relay: permission matrix enforcement and verbatim
//! propagation of controller outcomes.

use std::sync::Arc;

use central_authority::{
    AuthorityService, ControllerGateway, Directory, EventStore, MemoryDirectory, MemoryEventStore,
    RelayError, RelayOutcome,
};
use credential_verification::{CredentialDirectory, VerificationService};
use parking_lot::Mutex;
use shared_types::{BarrierAction, BarrierId, PermissionLevel, PrincipalId};

/// Gateway double that answers like a controller with a busy mechanism.
struct BusyControllerGateway {
    sent: Mutex<Vec<BarrierAction>>,
}

#[async_trait::async_trait]
impl ControllerGateway for BusyControllerGateway {
    async fn send(
        &self,
        _endpoint: &str,
        action: BarrierAction,
        _principal: &PrincipalId,
    ) -> Result<RelayOutcome, RelayError> {
        self.sent.lock().push(action);
        Ok(RelayOutcome {
            status: 200,
            body: serde_json::json!({"status": "ok", "message": "Barrier in motion."}),
        })
    }
}

fn service_with_gateway(
    gateway: Arc<dyn ControllerGateway>,
) -> (AuthorityService, Arc<MemoryDirectory>) {
    let directory = Arc::new(MemoryDirectory::new());
    directory.register_barrier(BarrierId::from("gate-01"), "http://controller:5000");
    directory.grant(
        PrincipalId::from("operator-ola"),
        BarrierId::from("gate-01"),
        PermissionLevel::Operator,
    );
    directory.grant(
        PrincipalId::from("tech-tomasz"),
        BarrierId::from("gate-01"),
        PermissionLevel::Technician,
    );

    let verification =
        VerificationService::new(Arc::clone(&directory) as Arc<dyn CredentialDirectory>);
    let service = AuthorityService::new(
        Arc::clone(&directory) as Arc<dyn Directory>,
        Arc::new(MemoryEventStore::new()) as Arc<dyn EventStore>,
        gateway,
        verification,
    );
    (service, directory)
}

#[tokio::test]
async fn test_permission_matrix() {
    let gateway = Arc::new(BusyControllerGateway {
        sent: Mutex::new(Vec::new()),
    });
    let (service, _directory) = service_with_gateway(Arc::clone(&gateway) as Arc<dyn ControllerGateway>);
    let barrier = BarrierId::from("gate-01");

    // Operator: movement allowed, service mode denied.
    for action in [BarrierAction::Open, BarrierAction::Close] {
        assert!(service
            .relay(&PrincipalId::from("operator-ola"), &barrier, action)
            .await
            .is_ok());
    }
    for action in [BarrierAction::ServiceStart, BarrierAction::ServiceEnd] {
        let err = service
            .relay(&PrincipalId::from("operator-ola"), &barrier, action)
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "insufficient_level");
    }

    // Technician: everything allowed.
    for action in [
        BarrierAction::Open,
        BarrierAction::Close,
        BarrierAction::ServiceStart,
        BarrierAction::ServiceEnd,
    ] {
        assert!(service
            .relay(&PrincipalId::from("tech-tomasz"), &barrier, action)
            .await
            .is_ok());
    }

    // Stranger: denied before any relay.
    let sent_before = gateway.sent.lock().len();
    let err = service
        .relay(&PrincipalId::from("stranger"), &barrier, BarrierAction::Open)
        .await
        .unwrap_err();
    assert_eq!(err.reason(), "no_permission");
    assert_eq!(gateway.sent.lock().len(), sent_before);
}

#[tokio::test]
async fn test_controller_business_failure_is_not_an_authority_error() {
    // A "busy" from the controller travels back verbatim as a 200-level
    // outcome, not as a relay failure.
    let gateway = Arc::new(BusyControllerGateway {
        sent: Mutex::new(Vec::new()),
    });
    let (service, _directory) = service_with_gateway(gateway as Arc<dyn ControllerGateway>);

    let outcome = service
        .relay(
            &PrincipalId::from("operator-ola"),
            &BarrierId::from("gate-01"),
            BarrierAction::Open,
        )
        .await
        .unwrap();
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.body["message"], "Barrier in motion.");
}
