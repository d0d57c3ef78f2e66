//! Codec Tests
//!
//! Tests for command and response encoding/decoding.

use std::io::{self, Cursor};

use txkv::protocol::{
    Command, Response, Status,
    encode_command, decode_command,
    encode_response, decode_response,
    read_command, write_command,
    read_response, write_response,
    HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
use txkv::KvError;

// =============================================================================
// Command Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_every_command() {
    let commands = vec![
        Command::Get { key: "hello".to_string() },
        Command::Set { key: "k".to_string(), value: "v".to_string() },
        Command::Begin,
        Command::TxnGet { txn_id: 7, key: "k".to_string() },
        Command::TxnSet { txn_id: u64::MAX, key: "k".to_string(), value: "v".to_string() },
        Command::Commit { txn_id: 1 },
        Command::Rollback { txn_id: 2 },
        Command::Ping,
    ];

    for cmd in commands {
        let encoded = encode_command(&cmd);
        assert_eq!(decode_command(&encoded).unwrap(), cmd);
    }
}

#[test]
fn test_encode_decode_empty_value() {
    let cmd = Command::Set { key: "k".to_string(), value: String::new() };

    let decoded = decode_command(&encode_command(&cmd)).unwrap();

    assert_eq!(decoded, cmd);
}

#[test]
fn test_encode_decode_unicode() {
    let cmd = Command::TxnSet {
        txn_id: 3,
        key: "clé".to_string(),
        value: "値 with spaces".to_string(),
    };

    let decoded = decode_command(&encode_command(&cmd)).unwrap();

    assert_eq!(decoded, cmd);
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_response_ok() {
    let resp = Response::ok(Some(b"value".to_vec()));

    let decoded = decode_response(&encode_response(&resp)).unwrap();

    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.payload_str().as_deref(), Some("value"));
}

#[test]
fn test_encode_decode_response_ok_no_payload() {
    let decoded = decode_response(&encode_response(&Response::ok(None))).unwrap();

    assert_eq!(decoded, Response::ok(None));
}

#[test]
fn test_encode_decode_response_statuses() {
    for resp in [
        Response::not_found("Key not found"),
        Response::bad_request("Transaction 4 is not active"),
        Response::error("IO error: disk full"),
    ] {
        assert_eq!(decode_response(&encode_response(&resp)).unwrap(), resp);
    }
}

// =============================================================================
// Error Mapping Tests
// =============================================================================

#[test]
fn test_response_from_error() {
    assert_eq!(Response::from_error(&KvError::NotFound).status, Status::NotFound);
    assert_eq!(Response::from_error(&KvError::TxnNotFound(9)).status, Status::NotFound);

    assert_eq!(Response::from_error(&KvError::InvalidKey).status, Status::BadRequest);
    assert_eq!(Response::from_error(&KvError::TxnNotActive(1)).status, Status::BadRequest);
    assert_eq!(Response::from_error(&KvError::TxnFinished(1)).status, Status::BadRequest);
    assert_eq!(
        Response::from_error(&KvError::Protocol("bad".to_string())).status,
        Status::BadRequest
    );

    let io = KvError::Io(io::Error::new(io::ErrorKind::Other, "disk full"));
    let resp = Response::from_error(&io);
    assert_eq!(resp.status, Status::Error);
    assert!(resp.payload_str().unwrap().contains("disk full"));
}

// =============================================================================
// Error Case Tests
// =============================================================================

#[test]
fn test_incomplete_header() {
    let err = decode_command(&[0x01, 0x00]).unwrap_err();
    assert!(matches!(err, KvError::Protocol(_)));
}

#[test]
fn test_incomplete_payload() {
    let mut encoded = encode_command(&Command::Get { key: "hello".to_string() }).to_vec();
    encoded.truncate(encoded.len() - 2);

    assert!(matches!(decode_command(&encoded).unwrap_err(), KvError::Protocol(_)));
}

#[test]
fn test_unknown_command_type() {
    let bytes = [0xFF, 0x00, 0x00, 0x00, 0x00];
    assert!(matches!(decode_command(&bytes).unwrap_err(), KvError::Protocol(_)));
}

#[test]
fn test_unknown_response_status() {
    let bytes = [0x7F, 0x00, 0x00, 0x00, 0x00];
    assert!(matches!(decode_response(&bytes).unwrap_err(), KvError::Protocol(_)));
}

#[test]
fn test_commit_missing_txn_id() {
    // COMMIT with a 4 byte payload instead of 8
    let bytes = [0x06, 0x00, 0x00, 0x00, 0x04, 0, 0, 0, 1];
    assert!(matches!(decode_command(&bytes).unwrap_err(), KvError::Protocol(_)));
}

#[test]
fn test_ping_with_unexpected_payload() {
    let bytes = [0x08, 0x00, 0x00, 0x00, 0x01, 0xAA];
    assert!(matches!(decode_command(&bytes).unwrap_err(), KvError::Protocol(_)));
}

#[test]
fn test_invalid_utf8_key() {
    let bytes = [0x01, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x02, 0xFF, 0xFE];
    let err = decode_command(&bytes).unwrap_err();

    assert!(matches!(err, KvError::Protocol(_)));
    assert!(err.is_bad_request());
}

#[test]
fn test_oversized_payload_rejected_before_reading() {
    let len = (MAX_PAYLOAD_SIZE + 1).to_be_bytes();
    let header = [0x01, len[0], len[1], len[2], len[3]];

    let err = read_command(&mut Cursor::new(header.to_vec())).unwrap_err();
    assert!(matches!(err, KvError::Protocol(_)));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_multiple_commands() {
    let commands = vec![
        Command::Begin,
        Command::TxnSet { txn_id: 1, key: "a".to_string(), value: "1".to_string() },
        Command::Commit { txn_id: 1 },
    ];

    let mut buf = Vec::new();
    for cmd in &commands {
        write_command(&mut buf, cmd).unwrap();
    }

    let mut cursor = Cursor::new(buf);
    for expected in &commands {
        assert_eq!(&read_command(&mut cursor).unwrap(), expected);
    }

    let err = read_command(&mut cursor).unwrap_err();
    assert!(matches!(err, KvError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
}

#[test]
fn test_stream_multiple_responses() {
    let responses = vec![
        Response::ok(Some(b"1".to_vec())),
        Response::not_found("Key not found"),
        Response::ok(None),
    ];

    let mut buf = Vec::new();
    for resp in &responses {
        write_response(&mut buf, resp).unwrap();
    }

    let mut cursor = Cursor::new(buf);
    for expected in &responses {
        assert_eq!(&read_response(&mut cursor).unwrap(), expected);
    }
}

// =============================================================================
// Wire Format Tests
// =============================================================================

#[test]
fn test_wire_format_get() {
    let encoded = encode_command(&Command::Get { key: "ab".to_string() });

    assert_eq!(
        encoded.as_ref(),
        &[0x01, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x02, b'a', b'b']
    );
}

#[test]
fn test_wire_format_commit() {
    let encoded = encode_command(&Command::Commit { txn_id: 0x0102 });

    assert_eq!(encoded.len(), HEADER_SIZE + 8);
    assert_eq!(
        encoded.as_ref(),
        &[0x06, 0x00, 0x00, 0x00, 0x08, 0, 0, 0, 0, 0, 0, 0x01, 0x02]
    );
}

#[test]
fn test_wire_format_response_ok() {
    let encoded = encode_response(&Response::ok(Some(b"42".to_vec())));

    assert_eq!(encoded.as_ref(), &[0x00, 0x00, 0x00, 0x00, 0x02, b'4', b'2']);
}
