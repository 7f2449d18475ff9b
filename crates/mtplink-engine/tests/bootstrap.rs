//! Session bootstrap: the configure state machine and its retry bounds.

use bytes::BytesMut;
use mtplink_engine::{Engine, EngineConfig, EngineError};
use mtplink_transport::MockTransport;
use mtplink_wire::consts::{
    CONTAINER_RESPONSE, OC_CLOSE_SESSION, OC_OPEN_SESSION, RC_GENERAL_ERROR, RC_OK,
    RC_SESSION_ALREADY_OPENED,
};
use mtplink_wire::{BulkHeader, BULK_HEADER_LEN};

fn response(code: u16, tid: u32) -> Vec<u8> {
    let mut out = BytesMut::new();
    BulkHeader {
        length: BULK_HEADER_LEN as u32,
        kind: CONTAINER_RESPONSE,
        code,
        transaction_id: tid,
    }
    .encode(&mut out);
    out.to_vec()
}

fn sent_opcodes(engine: &Engine<MockTransport>) -> Vec<u16> {
    engine
        .transport()
        .sent
        .iter()
        .map(|p| u16::from_le_bytes([p[6], p[7]]))
        .collect()
}

fn sent_session_id(packet: &[u8]) -> u32 {
    u32::from_le_bytes([packet[12], packet[13], packet[14], packet[15]])
}

#[test]
fn configure_opens_transport_and_session() {
    let mut transport = MockTransport::new();
    transport.push_read(response(RC_OK, 0));
    let mut engine = Engine::new(transport, EngineConfig::default());

    engine.configure().unwrap();

    assert!(engine.is_open());
    assert!(engine.session_id().is_some());
    assert_eq!(engine.transport().opens, 1);
    assert_eq!(engine.transport().resets, 0);
    assert_eq!(sent_opcodes(&engine), vec![OC_OPEN_SESSION]);

    // The chosen id is what went on the wire, within the legal range.
    let id = sent_session_id(&engine.transport().sent[0]);
    assert_eq!(engine.session_id(), Some(id));
    assert_ne!(id, 0);
    assert_ne!(id, u32::MAX);
}

#[test]
fn stale_device_session_is_closed_and_reopened_once() {
    let mut transport = MockTransport::new();
    transport.push_read(response(RC_SESSION_ALREADY_OPENED, 0));
    transport.push_read(response(RC_OK, 0)); // CloseSession
    transport.push_read(response(RC_OK, 0)); // second OpenSession
    let mut engine = Engine::new(transport, EngineConfig::default());

    engine.configure().unwrap();

    assert!(engine.session_id().is_some());
    assert_eq!(
        sent_opcodes(&engine),
        vec![OC_OPEN_SESSION, OC_CLOSE_SESSION, OC_OPEN_SESSION]
    );
    assert_eq!(engine.transport().resets, 0);
    assert_eq!(engine.transport().opens, 1);
}

#[test]
fn other_failure_resets_and_retries_exactly_once() {
    let mut transport = MockTransport::new();
    transport.push_read(response(RC_GENERAL_ERROR, 0));
    transport.push_read(response(RC_OK, 0));
    let mut engine = Engine::new(transport, EngineConfig::default());

    engine.configure().unwrap();

    assert!(engine.session_id().is_some());
    assert_eq!(sent_opcodes(&engine), vec![OC_OPEN_SESSION, OC_OPEN_SESSION]);
    assert_eq!(engine.transport().resets, 1);
    assert_eq!(engine.transport().opens, 2);
    assert_eq!(engine.transport().closes, 1);
}

#[test]
fn failure_after_retry_is_final() {
    let mut transport = MockTransport::new();
    transport.push_read(response(RC_GENERAL_ERROR, 0));
    transport.push_read(response(RC_GENERAL_ERROR, 0));
    let mut engine = Engine::new(transport, EngineConfig::default());

    let err = engine.configure().unwrap_err();
    assert!(matches!(err, EngineError::Rc(rc) if rc.0 == RC_GENERAL_ERROR));
    // Exactly two open attempts, one reset, no further retries.
    assert_eq!(sent_opcodes(&engine), vec![OC_OPEN_SESSION, OC_OPEN_SESSION]);
    assert_eq!(engine.transport().resets, 1);
    assert_eq!(engine.session_id(), None);
}

#[test]
fn open_session_picks_fresh_ids() {
    // Two bootstraps should not land on the same id; the space is 2^31.
    let mut seen = Vec::new();
    for _ in 0..4 {
        let mut transport = MockTransport::new();
        transport.push_read(response(RC_OK, 0));
        let mut engine = Engine::new(transport, EngineConfig::default());
        engine.configure().unwrap();
        seen.push(sent_session_id(&engine.transport().sent[0]));
    }
    seen.sort_unstable();
    seen.dedup();
    assert!(seen.len() > 1);
}

#[test]
fn close_drops_device_and_host_session() {
    let mut transport = MockTransport::new();
    transport.push_read(response(RC_OK, 0));
    transport.push_read(response(RC_OK, 1)); // CloseSession, first tid
    let mut engine = Engine::new(transport, EngineConfig::default());
    engine.configure().unwrap();

    engine.close().unwrap();

    assert!(!engine.is_open());
    assert_eq!(engine.session_id(), None);
    assert_eq!(
        sent_opcodes(&engine),
        vec![OC_OPEN_SESSION, OC_CLOSE_SESSION]
    );
    assert_eq!(engine.transport().closes, 1);
}
