//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: GET       - Payload: key
//! - 0x02: SET       - Payload: key + value
//! - 0x03: BEGIN     - Payload: empty
//! - 0x04: TXN_GET   - Payload: txn_id (8) + key
//! - 0x05: TXN_SET   - Payload: txn_id (8) + key + value
//! - 0x06: COMMIT    - Payload: txn_id (8)
//! - 0x07: ROLLBACK  - Payload: txn_id (8)
//! - 0x08: PING      - Payload: empty
//!
//! Strings are encoded as `len (4) + UTF-8 bytes`; all integers are big endian.
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: NOT_FOUND
//! - 0x02: BAD_REQUEST
//! - 0x03: ERROR

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
