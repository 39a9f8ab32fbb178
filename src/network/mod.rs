//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept, polls a shutdown flag)
//! - One worker thread per connection, capped at `max_connections`
//! - Requests routed through Engine

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
