//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, TrySendError};

use crate::config::Config;
use crate::error::Result;
use crate::service::KvService;
use super::Connection;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP server for txkv
pub struct Server {
    config: Config,
    service: Arc<KvService>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind the listen address from `config`
    pub fn bind(config: Config, service: Arc<KvService>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            service,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Flag that stops `run` when set; can be shared with other threads
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Start the server (blocking)
    ///
    /// Returns after shutdown is signalled and every worker has finished
    /// its current connection.
    pub fn run(&self) -> Result<()> {
        let (sender, receiver) = channel::bounded::<TcpStream>(self.config.max_connections.max(1));

        let mut workers = Vec::new();
        for id in 0..self.config.worker_threads.max(1) {
            let receiver = receiver.clone();
            let service = Arc::clone(&self.service);
            let config = self.config.clone();

            let worker = thread::Builder::new()
                .name(format!("txkv-worker-{}", id))
                .spawn(move || {
                    for stream in receiver.iter() {
                        serve(stream, &service, &config);
                    }
                })?;
            workers.push(worker);
        }
        drop(receiver);

        tracing::info!(
            "Listening on {} with {} worker(s)",
            self.local_addr()?,
            workers.len()
        );

        while !self.shutdown.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", addr, e);
                        continue;
                    }
                    match sender.try_send(stream) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            tracing::warn!("Connection queue full, rejecting {}", addr);
                        }
                        Err(TrySendError::Disconnected(_)) => break,
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        drop(sender);
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        tracing::info!("Server stopped accepting connections");
        Ok(())
    }
}

fn serve(stream: TcpStream, service: &Arc<KvService>, config: &Config) {
    let mut connection = match Connection::new(stream, Arc::clone(service)) {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!("Failed to set up connection: {}", e);
            return;
        }
    };

    if let Err(e) = connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms) {
        tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
        return;
    }

    if let Err(e) = connection.handle() {
        tracing::debug!("Connection {} ended with error: {}", connection.peer_addr(), e);
    }
}
