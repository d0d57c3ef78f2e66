//! Response definitions
//!
//! Represents responses to clients.

use crate::error::KvError;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    BadRequest = 0x02,
    Error = 0x03,
}

impl Status {
    /// Map a wire byte back to a status
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::NotFound),
            0x02 => Some(Status::BadRequest),
            0x03 => Some(Status::Error),
            _ => None,
        }
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (value for GET, id for BEGIN, message otherwise)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found(message: &str) -> Self {
        Self {
            status: Status::NotFound,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Create a BAD_REQUEST response
    pub fn bad_request(message: &str) -> Self {
        Self {
            status: Status::BadRequest,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Translate an engine error into the response a client sees
    ///
    /// - `NotFound`, `TxnNotFound` → NOT_FOUND
    /// - `InvalidKey`, `TxnNotActive`, `TxnFinished`, `Protocol` → BAD_REQUEST
    /// - `Io` → ERROR
    pub fn from_error(error: &KvError) -> Self {
        let message = error.to_string();
        if error.is_not_found() {
            Self::not_found(&message)
        } else if error.is_bad_request() {
            Self::bad_request(&message)
        } else {
            Self::error(&message)
        }
    }

    /// Payload as text, if present
    pub fn payload_str(&self) -> Option<String> {
        self.payload
            .as_ref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
    }
}
