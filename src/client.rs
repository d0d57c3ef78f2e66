//! Client Module
//!
//! Blocking TCP client for a txkv server.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::{KvError, Result};
use crate::protocol::{read_response, write_command, Command, Response, Status};
use crate::transaction::TxnId;

/// A connection to a txkv server
///
/// Server-side failures come back as [`KvError::Server`] carrying the
/// response status, so `is_not_found()` and `is_bad_request()` work the same
/// on both sides of the wire.
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_half = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(stream),
        })
    }

    /// Read a committed value
    pub fn get(&mut self, key: &str) -> Result<String> {
        let response = self.call(&Command::Get { key: key.to_string() })?;
        Ok(response.payload_str().unwrap_or_default())
    }

    /// Write a value outside any transaction
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.call(&Command::Set {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        Ok(())
    }

    /// Start a transaction and return its id
    pub fn begin(&mut self) -> Result<TxnId> {
        let response = self.call(&Command::Begin)?;
        let text = response.payload_str().unwrap_or_default();
        text.parse()
            .map_err(|_| KvError::Protocol(format!("BEGIN returned a non-numeric id: {:?}", text)))
    }

    /// Read through a transaction
    pub fn txn_get(&mut self, txn_id: TxnId, key: &str) -> Result<String> {
        let response = self.call(&Command::TxnGet {
            txn_id,
            key: key.to_string(),
        })?;
        Ok(response.payload_str().unwrap_or_default())
    }

    /// Buffer a write in a transaction
    pub fn txn_set(&mut self, txn_id: TxnId, key: &str, value: &str) -> Result<()> {
        self.call(&Command::TxnSet {
            txn_id,
            key: key.to_string(),
            value: value.to_string(),
        })?;
        Ok(())
    }

    pub fn commit(&mut self, txn_id: TxnId) -> Result<()> {
        self.call(&Command::Commit { txn_id })?;
        Ok(())
    }

    pub fn rollback(&mut self, txn_id: TxnId) -> Result<()> {
        self.call(&Command::Rollback { txn_id })?;
        Ok(())
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        self.call(&Command::Ping)?;
        Ok(())
    }

    /// Send one command and wait for its response
    fn call(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        let response = read_response(&mut self.reader)?;

        match response.status {
            Status::Ok => Ok(response),
            status => Err(KvError::Server {
                status,
                message: response.payload_str().unwrap_or_default(),
            }),
        }
    }
}
