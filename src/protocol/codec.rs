//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - GET:      str(key)
//! - SET:      str(key) + str(value)
//! - BEGIN:    empty
//! - TXN_GET:  txn_id (8) + str(key)
//! - TXN_SET:  txn_id (8) + str(key) + str(value)
//! - COMMIT:   txn_id (8)
//! - ROLLBACK: txn_id (8)
//! - PING:     empty
//!
//! where `str(s)` is `len (4) + UTF-8 bytes`.
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{KvError, Result};
use super::{Command, CommandType, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Bytes {
    let mut payload = BytesMut::new();

    match command {
        Command::Get { key } => put_str(&mut payload, key),
        Command::Set { key, value } => {
            put_str(&mut payload, key);
            put_str(&mut payload, value);
        }
        Command::TxnGet { txn_id, key } => {
            payload.put_u64(*txn_id);
            put_str(&mut payload, key);
        }
        Command::TxnSet { txn_id, key, value } => {
            payload.put_u64(*txn_id);
            put_str(&mut payload, key);
            put_str(&mut payload, value);
        }
        Command::Commit { txn_id } | Command::Rollback { txn_id } => payload.put_u64(*txn_id),
        Command::Begin | Command::Ping => {}
    }

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, payload) = unframe(bytes, "command")?;

    let cmd_type = CommandType::from_u8(cmd_type).ok_or_else(|| {
        KvError::Protocol(format!("Unknown command type: 0x{:02x}", cmd_type))
    })?;

    let mut buf = payload;
    let command = match cmd_type {
        CommandType::Get => Command::Get {
            key: take_str(&mut buf, "GET key")?,
        },
        CommandType::Set => Command::Set {
            key: take_str(&mut buf, "SET key")?,
            value: take_str(&mut buf, "SET value")?,
        },
        CommandType::Begin => Command::Begin,
        CommandType::TxnGet => Command::TxnGet {
            txn_id: take_u64(&mut buf, "TXN_GET txn_id")?,
            key: take_str(&mut buf, "TXN_GET key")?,
        },
        CommandType::TxnSet => Command::TxnSet {
            txn_id: take_u64(&mut buf, "TXN_SET txn_id")?,
            key: take_str(&mut buf, "TXN_SET key")?,
            value: take_str(&mut buf, "TXN_SET value")?,
        },
        CommandType::Commit => Command::Commit {
            txn_id: take_u64(&mut buf, "COMMIT txn_id")?,
        },
        CommandType::Rollback => Command::Rollback {
            txn_id: take_u64(&mut buf, "ROLLBACK txn_id")?,
        },
        CommandType::Ping => Command::Ping,
    };

    if buf.has_remaining() {
        return Err(KvError::Protocol(format!(
            "{:?} command: {} unexpected trailing bytes",
            cmd_type,
            buf.remaining()
        )));
    }

    Ok(command)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Bytes {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = unframe(bytes, "response")?;

    let status = Status::from_u8(status_byte).ok_or_else(|| {
        KvError::Protocol(format!("Unknown response status: 0x{:02x}", status_byte))
    })?;

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let message = read_message(reader, "command")?;
    decode_command(&message)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_message(reader, "response")?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Framing helpers
// =============================================================================

fn frame(tag: u8, payload: &[u8]) -> Bytes {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(tag);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    message.freeze()
}

/// Split a full message into its tag byte and payload
fn unframe<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(KvError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let tag = header.get_u8();
    let payload_len = header.get_u32();
    check_payload_len(payload_len, what)?;

    let total_len = HEADER_SIZE + payload_len as usize;
    if bytes.len() < total_len {
        return Err(KvError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((tag, &bytes[HEADER_SIZE..total_len]))
}

/// Read header then payload from a stream, returning the whole message
fn read_message<R: Read>(reader: &mut R, what: &str) -> Result<BytesMut> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    check_payload_len(payload_len, what)?;

    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload_len as usize);
    message.put_slice(&header);
    message.resize(HEADER_SIZE + payload_len as usize, 0);
    reader.read_exact(&mut message[HEADER_SIZE..])?;

    Ok(message)
}

fn check_payload_len(payload_len: u32, what: &str) -> Result<()> {
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(KvError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, payload_len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

fn put_str(buf: &mut BytesMut, s: &str) {
    buf.put_u32(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

fn take_u64(buf: &mut &[u8], field: &str) -> Result<u64> {
    if buf.remaining() < 8 {
        return Err(KvError::Protocol(format!("{}: missing", field)));
    }
    Ok(buf.get_u64())
}

fn take_str(buf: &mut &[u8], field: &str) -> Result<String> {
    if buf.remaining() < 4 {
        return Err(KvError::Protocol(format!("{}: missing length", field)));
    }

    let len = buf.get_u32() as usize;
    if buf.remaining() < len {
        return Err(KvError::Protocol(format!(
            "{}: incomplete (expected {}, got {})",
            field,
            len,
            buf.remaining()
        )));
    }

    let raw = buf.copy_to_bytes(len);
    String::from_utf8(raw.to_vec())
        .map_err(|_| KvError::Protocol(format!("{}: not valid UTF-8", field)))
}
