//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{KvError, Result};
use crate::protocol::{read_command, write_response, Command, Response};
use crate::service::KvService;

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Shared engine and transaction registry
    service: Arc<KvService>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, service: Arc<KvService>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;
        let read_half = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(stream),
            service,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 leaves a direction without timeout)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads commands in a loop and sends responses. A client hanging up or
    /// going idle past the read timeout ends the loop with `Ok`.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let command = match read_command(&mut self.reader) {
                Ok(command) => command,
                Err(e) if is_hangup(&e) => {
                    tracing::debug!("Client {} went away: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Bad request from {}: {}", self.peer_addr, e);
                    // Framing is lost after a bad message, so reply once and close
                    let _ = self.send_response(Response::from_error(&e));
                    return Err(e);
                }
            };

            tracing::trace!("Received command from {}: {:?}", self.peer_addr, command);
            let response = self.execute_command(command);

            match self.send_response(response) {
                Ok(()) => {}
                Err(e) if is_hangup(&e) => {
                    tracing::debug!("Client {} left before the response was sent", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            }
        }
    }

    /// Execute a command and return a response
    fn execute_command(&self, command: Command) -> Response {
        match self.service.execute(command) {
            Ok(Some(value)) => Response::ok(Some(value.into_bytes())),
            Ok(None) => Response::ok(None),
            Err(e) => {
                if let KvError::Io(_) = e {
                    tracing::warn!("Command from {} failed: {}", self.peer_addr, e);
                }
                Response::from_error(&e)
            }
        }
    }

    /// Send a response to the client
    fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Errors that mean the peer disconnected or idled out rather than misbehaved
fn is_hangup(error: &KvError) -> bool {
    match error {
        KvError::Io(e) => matches!(
            e.kind(),
            ErrorKind::UnexpectedEof
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::BrokenPipe
                | ErrorKind::WouldBlock
                | ErrorKind::TimedOut
        ),
        _ => false,
    }
}
