//! Per-printer job serialization
//!
//! A thermal printer accepts one raw connection at a time. Jobs for the
//! same `host:port` are queued here; different printers never wait on each
//! other.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = DashMap<String, Arc<Mutex<()>>>;

#[derive(Debug, Default)]
pub struct PrinterLocks {
    locks: Arc<LockTable>,
}

impl PrinterLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other job is using `addr`
    ///
    /// The printer is free again once the guard is dropped.
    pub async fn acquire(&self, addr: &str) -> PrinterGuard {
        // Clone the Arc out so the shard lock is not held across the await
        let lock = self
            .locks
            .entry(addr.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;

        PrinterGuard {
            addr: addr.to_string(),
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Printers with a job running or waiting
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive use of one printer
///
/// On drop the printer is released; the table entry goes away with the
/// last job that referenced it.
#[derive(Debug)]
pub struct PrinterGuard {
    addr: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockTable>,
}

impl Drop for PrinterGuard {
    fn drop(&mut self) {
        // Release the mutex first so its Arc no longer counts
        drop(self.guard.take());
        // Waiters hold a clone; a new acquirer is serialized by the shard lock
        self.locks
            .remove_if(&self.addr, |_, lock| Arc::strong_count(lock) == 1);
    }
}
