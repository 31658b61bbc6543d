use std::sync::atomic::{AtomicU32, Ordering};

use super::addr::ReplicaAddr;

/// A live connection entry for a single replica
///
/// The balancer only ever reads the address; the usage counter exists for
/// the owning pool's bookkeeping and plays no part in selection.
#[derive(Debug)]
pub struct ReplicaEntry {
    /// Endpoint identity this entry connects to
    addr: ReplicaAddr,

    /// Number of requests currently borrowing this entry
    active_connections: AtomicU32,
}

impl ReplicaEntry {
    /// Create a new entry for the given replica address
    pub fn new(addr: ReplicaAddr) -> Self {
        Self {
            addr,
            active_connections: AtomicU32::new(0),
        }
    }

    /// Get the replica address this entry connects to
    pub fn addr(&self) -> &ReplicaAddr {
        &self.addr
    }

    /// Increment the active connection counter
    pub fn increment_connections(&self) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement the active connection counter
    pub fn decrement_connections(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    /// Get the current number of active connections
    pub fn get_active_connections(&self) -> u32 {
        self.active_connections.load(Ordering::Relaxed)
    }
}
