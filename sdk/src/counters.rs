use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cumulative bytes received and sent by every connection of a dialer.
///
/// One instance is created by whoever owns the run and shared by `Arc` with
/// the dialers; wrapped connections only ever add to it.
#[derive(Debug, Default)]
pub struct TransferCounters {
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
}

/// Point-in-time copy of [`TransferCounters`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransferSnapshot {
    pub bytes_read: u64,
    pub bytes_written: u64,
}

impl TransferCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Both values are loaded independently, so a snapshot taken while
    /// connections are active is approximate.
    pub fn snapshot(&self) -> TransferSnapshot {
        TransferSnapshot {
            bytes_read: self.bytes_read(),
            bytes_written: self.bytes_written(),
        }
    }

    pub(crate) fn add_read(&self, bytes: usize) {
        self.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn add_written(&self, bytes: usize) {
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Zeroes both counters and returns what they held. Only the owner of the
    /// counters should call this, between runs.
    pub fn reset(&self) -> TransferSnapshot {
        TransferSnapshot {
            bytes_read: self.bytes_read.swap(0, Ordering::Relaxed),
            bytes_written: self.bytes_written.swap(0, Ordering::Relaxed),
        }
    }
}
