//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept loop, polls a shutdown flag)
//! - Fixed worker thread pool fed through a bounded channel
//! - Commands routed through `KvService`

mod server;
mod connection;

pub use server::Server;
pub use connection::Connection;
