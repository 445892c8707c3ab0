//! # LineKV
//!
//! A minimal networked key-value service:
//! - Integer keys, opaque byte values
//! - Line-framed headers with length-prefixed payloads
//! - Single-threaded blocking server, one connection at a time
//! - Interactive and batch client frontends
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────┐            ┌──────────────────────────────┐
//! │  Shell (REPL/batch)  │            │         TCP Server           │
//! │   client::command    │            │  (one connection at a time)  │
//! └──────────┬───────────┘            └──────────────┬───────────────┘
//!            │                                       │
//! ┌──────────▼───────────┐   frames   ┌──────────────▼───────────────┐
//! │   client::Session    │◄──────────►│     network::Connection      │
//! │  (protocol::codec)   │            │      (protocol::codec)       │
//! └──────────────────────┘            └──────────────┬───────────────┘
//!                                                    │
//!                                            ┌───────▼───────┐
//!                                            │     Store     │
//!                                            │ (HashMap/RwLock)
//!                                            └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::Config;
pub use store::{Key, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of LineKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
