//! Network Module
//!
//! TCP server and per-connection handling.
//!
//! ## Architecture
//! - Single thread, blocking I/O
//! - One connection served at a time, requests strictly in order
//! - Commands applied directly to the shared `Store`

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
