//! Store Module
//!
//! In-memory mapping from integer keys to opaque byte values.
//!
//! ## Responsibilities
//! - Enforce create/update/delete semantics (unique keys)
//! - Own every value buffer; readers get read-only `Bytes` views
//! - Surface allocation failure as an error instead of aborting
//!
//! ## Data Structure Choice
//! `HashMap<Key, Bytes>` behind a `parking_lot::RwLock`:
//! - No ordering requirement, so a hash map is enough
//! - The lock lets the store be shared through an `Arc` with the server
//!   while tests inspect it from another thread

mod table;

pub use table::Store;

/// A binding key
pub type Key = i32;
