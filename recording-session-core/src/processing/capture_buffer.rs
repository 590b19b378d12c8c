use sha2::{Digest, Sha256};

use crate::models::capture::AudioFragment;

/// Append-only buffer for the current session's captured data.
///
/// Cleared when a session starts. [`flush`] moves the contents out, so the
/// receiver owns them and the buffer is empty again before the receiver runs.
///
/// [`flush`]: CaptureBuffer::flush
#[derive(Debug)]
pub struct CaptureBuffer<T> {
    items: Vec<T>,
    flushes: u64,
}

impl<T> CaptureBuffer<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            flushes: 0,
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Take everything captured so far, leaving the buffer empty.
    pub fn flush(&mut self) -> Vec<T> {
        self.flushes += 1;
        std::mem::take(&mut self.items)
    }

    /// Drop the contents without delivering them.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of flushes over the buffer's lifetime.
    pub fn flush_count(&self) -> u64 {
        self.flushes
    }
}

impl<T> Default for CaptureBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Total payload size of a fragment list.
pub fn total_bytes(fragments: &[AudioFragment]) -> u64 {
    fragments.iter().map(|f| f.len() as u64).sum()
}

/// SHA-256 hex digest over the fragment bytes in order.
pub fn fragment_checksum(fragments: &[AudioFragment]) -> String {
    let mut hasher = Sha256::new();
    for fragment in fragments {
        hasher.update(&fragment.data);
    }
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
