//! End-to-end credential verification: a frame built exactly the way a
//! remote's firmware builds it, pushed through the verification service and
//! the replay guard against the in-memory directory.

use std::sync::Arc;

use central_authority::MemoryDirectory;
use credential_verification::{CredentialDirectory, CredentialRecord, VerificationService};
use shared_crypto::{apply_keystream, mac_tag, CipherKey, CounterSeed, MacKey};
use shared_types::{BarrierId, CredentialId, PrincipalId};

/// Key material lifted from a provisioned remote.
const CIPHER_KEY: [u8; 16] = [
    0x8F, 0x3B, 0xFB, 0x77, 0xCF, 0x6C, 0x9E, 0xCC, 0xAD, 0x67, 0xCA, 0x1F, 0xA5, 0xD5, 0xB1,
    0xB1,
];
const MAC_KEY: [u8; 32] = [
    0xB8, 0xE6, 0x2D, 0xBA, 0x0E, 0x67, 0x65, 0x7F, 0xED, 0x03, 0x5B, 0x63, 0x1F, 0x24, 0xD7,
    0xB3, 0x31, 0x35, 0x6C, 0x14, 0xDB, 0x05, 0x8C, 0x8A, 0x87, 0x70, 0x3B, 0x68, 0x50, 0xFB,
    0xAD, 0x0F,
];
const COUNTER_SEED: [u8; 16] = [
    0x62, 0x69, 0xD9, 0x7F, 0xB9, 0xA4, 0x71, 0x3D, 0xC9, 0xC9, 0xD5, 0xFF, 0x40, 0xA6, 0x54,
    0xFE,
];
const REMOTE_ID: [u8; 8] = [0xCA, 0xFE, 0xBA, 0xBE, 0xDE, 0xAD, 0xBE, 0xEF];

fn issued_record() -> CredentialRecord {
    CredentialRecord {
        id: CredentialId::from_bytes(REMOTE_ID),
        principal: PrincipalId::from("Remote 1"),
        barrier: BarrierId::from("gate-01"),
        cipher_key: CipherKey::from_bytes(CIPHER_KEY),
        mac_key: MacKey::from_bytes(MAC_KEY),
        counter_seed: CounterSeed::from_bytes(COUNTER_SEED),
        last_accepted_counter: 0,
    }
}

fn foreign_record(id_byte: u8) -> CredentialRecord {
    CredentialRecord {
        id: CredentialId::from_bytes([id_byte; 8]),
        principal: PrincipalId::new(format!("remote-{id_byte}")),
        barrier: BarrierId::from("gate-01"),
        cipher_key: CipherKey::generate(),
        mac_key: MacKey::generate(),
        counter_seed: CounterSeed::generate(),
        last_accepted_counter: 0,
    }
}

/// Build the frame the way the remote firmware does: AES-CTR over
/// `[id][counter][command]`, HMAC-SHA256 over the ciphertext, hex on the
/// wire.
fn remote_frame_hex(counter: u64, command: &[u8]) -> String {
    let mut payload = Vec::new();
    payload.extend_from_slice(&REMOTE_ID);
    payload.extend_from_slice(&counter.to_be_bytes());
    payload.extend_from_slice(command);

    apply_keystream(
        &CipherKey::from_bytes(CIPHER_KEY),
        &CounterSeed::from_bytes(COUNTER_SEED),
        &mut payload,
    );
    let tag = mac_tag(&MacKey::from_bytes(MAC_KEY), &payload);
    payload.extend_from_slice(&tag);
    hex::encode(payload)
}

fn directory_with(records: Vec<CredentialRecord>) -> Arc<MemoryDirectory> {
    let directory = Arc::new(MemoryDirectory::new());
    for record in records {
        directory.issue_credential(record);
    }
    directory
}

#[tokio::test]
async fn test_end_to_end_accept_then_stale_on_replay() {
    let directory = directory_with(vec![issued_record()]);
    let service = VerificationService::new(Arc::clone(&directory) as Arc<dyn CredentialDirectory>);
    let barrier = BarrierId::from("gate-01");

    let frame_hex = remote_frame_hex(1, b"cmd");

    let verified = service.verify_remote(&barrier, &frame_hex).await.unwrap();
    assert_eq!(verified.credential_id, CredentialId::from_bytes(REMOTE_ID));
    assert_eq!(verified.principal, PrincipalId::from("Remote 1"));
    assert_eq!(verified.counter, 1);

    // The accepted counter was written back to the store.
    let records = directory.credentials_for(&barrier).await.unwrap();
    assert_eq!(records[0].last_accepted_counter, 1);

    // The identical frame a second time is a replay.
    let err = service.verify_remote(&barrier, &frame_hex).await.unwrap_err();
    assert_eq!(err.reason(), "stale_counter");
}

#[tokio::test]
async fn test_monotonic_rule_across_frames() {
    let directory = directory_with(vec![issued_record()]);
    let service = VerificationService::new(directory as Arc<dyn CredentialDirectory>);
    let barrier = BarrierId::from("gate-01");

    assert!(service
        .verify_remote(&barrier, &remote_frame_hex(1, b""))
        .await
        .is_ok());
    // Jumping forward is fine (counters may skip on lost transmissions).
    assert!(service
        .verify_remote(&barrier, &remote_frame_hex(5, b""))
        .await
        .is_ok());
    // Anything at or below the high-water mark is stale.
    for counter in [1, 3, 5] {
        let err = service
            .verify_remote(&barrier, &remote_frame_hex(counter, b""))
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "stale_counter");
    }
    assert!(service
        .verify_remote(&barrier, &remote_frame_hex(6, b""))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_result_independent_of_candidate_set_size_and_order() {
    let frame_hex = remote_frame_hex(1, b"cmd");
    let barrier = BarrierId::from("gate-01");

    for records in [
        vec![issued_record()],
        vec![issued_record(), foreign_record(1), foreign_record(2)],
        vec![
            foreign_record(1),
            foreign_record(2),
            foreign_record(3),
            issued_record(),
        ],
    ] {
        let directory = directory_with(records);
        let service = VerificationService::new(directory as Arc<dyn CredentialDirectory>);
        let verified = service.verify_remote(&barrier, &frame_hex).await.unwrap();
        assert_eq!(verified.counter, 1);
        assert_eq!(verified.principal, PrincipalId::from("Remote 1"));
    }
}

#[tokio::test]
async fn test_tampered_frame_rejected_with_mac_mismatch() {
    let directory = directory_with(vec![issued_record()]);
    let service = VerificationService::new(directory as Arc<dyn CredentialDirectory>);
    let barrier = BarrierId::from("gate-01");

    let mut frame = hex::decode(remote_frame_hex(1, b"cmd")).unwrap();

    // Flip one ciphertext bit.
    frame[3] ^= 0x10;
    let err = service
        .verify_remote(&barrier, &hex::encode(&frame))
        .await
        .unwrap_err();
    assert_eq!(err.reason(), "mac_mismatch");

    // Restore, flip one MAC bit instead.
    frame[3] ^= 0x10;
    let last = frame.len() - 1;
    frame[last] ^= 0x01;
    let err = service
        .verify_remote(&barrier, &hex::encode(&frame))
        .await
        .unwrap_err();
    assert_eq!(err.reason(), "mac_mismatch");
}

#[tokio::test]
async fn test_short_and_undecodable_frames() {
    let directory = directory_with(vec![issued_record()]);
    let service = VerificationService::new(directory as Arc<dyn CredentialDirectory>);
    let barrier = BarrierId::from("gate-01");

    let err = service
        .verify_remote(&barrier, &hex::encode([0u8; 20]))
        .await
        .unwrap_err();
    assert_eq!(err.reason(), "message_too_short");

    let err = service.verify_remote(&barrier, "zz-not-hex").await.unwrap_err();
    assert_eq!(err.reason(), "decode_error");
}
