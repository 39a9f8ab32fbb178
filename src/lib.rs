//! # RemoteList
//!
//! An in-memory store of named integer lists, served over TCP, with:
//! - An fsync'd operation log written before every mutation takes effect
//! - Crash recovery from the latest snapshot plus log replay
//! - Periodic snapshot compaction and log rotation in the background
//! - A single reader/writer lock over all lists
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (one worker thread per client)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │        Append/Remove exclusive · Get/Size shared             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │     Log     │          │    Lists    │
//!   │  (fsync'd)  │          │  (RwLock)   │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          └───────────┬────────────┘
//!                      ▼
//!              ┌───────────────┐
//!              │   Compactor   │──▶ snapshot.json
//!              │ (background)  │
//!              └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod wal;
pub mod snapshot;
pub mod engine;
pub mod compactor;
pub mod protocol;
pub mod network;
pub mod client;

mod io_util;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ListError, Result};
pub use config::Config;
pub use engine::Engine;
pub use compactor::Compactor;
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of RemoteList
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
