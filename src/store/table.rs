//! Store implementation
//!
//! HashMap-based store with RwLock for shared ownership.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;

use super::Key;
use crate::error::{KvError, Result};

/// Process-lifetime key/value store
#[derive(Debug, Default)]
pub struct Store {
    data: RwLock<HashMap<Key, Bytes>>,
}

impl Store {
    /// Create a new empty Store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new binding holding a copy of `value`
    ///
    /// Fails with `KeyExists` if `key` is already bound. Empty values are
    /// allowed.
    pub fn create(&self, key: Key, value: &[u8]) -> Result<()> {
        let mut data = self.data.write();
        if data.contains_key(&key) {
            return Err(KvError::KeyExists);
        }

        let buf = copy_value(value)?;
        data.insert(key, buf);
        Ok(())
    }

    /// Replace the value of an existing binding
    ///
    /// The new buffer is installed before the old one is dropped.
    pub fn update(&self, key: Key, value: &[u8]) -> Result<()> {
        if value.is_empty() {
            return Err(KvError::SizeRule);
        }

        let mut data = self.data.write();
        let slot = data.get_mut(&key).ok_or(KvError::KeyNotFound)?;
        let buf = copy_value(value)?;
        let _old = std::mem::replace(slot, buf);
        Ok(())
    }

    /// Get a read-only view of the current value
    ///
    /// The returned `Bytes` stays valid even if the binding changes later.
    pub fn read(&self, key: Key) -> Result<Bytes> {
        self.data.read().get(&key).cloned().ok_or(KvError::KeyNotFound)
    }

    /// Remove a binding and release its value
    pub fn delete(&self, key: Key) -> Result<()> {
        self.data
            .write()
            .remove(&key)
            .map(drop)
            .ok_or(KvError::KeyNotFound)
    }

    /// Check whether a key is bound
    pub fn contains(&self, key: Key) -> bool {
        self.data.read().contains_key(&key)
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True when the store holds no bindings
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Sum of all value lengths in bytes
    pub fn total_bytes(&self) -> usize {
        self.data.read().values().map(Bytes::len).sum()
    }
}

/// Copy `value` into a fresh buffer, reporting allocation failure
fn copy_value(value: &[u8]) -> Result<Bytes> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(value.len())
        .map_err(|_| KvError::OutOfMemory)?;
    buf.extend_from_slice(value);
    Ok(Bytes::from(buf))
}
