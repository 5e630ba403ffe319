//! Hands captured input frames from the capture callback to the playback callback. The capture
//! side pushes pairs into an `XyBuffers` and the playback side consumes them in order with its
//! own cursor, so neither side ever waits for the other.

use crate::buffers::XyBuffers;
use std::sync::Arc;

/// Read cursor over a ring of captured input pairs.
#[derive(Debug)]
pub struct InputTap {
    ring: Arc<XyBuffers>,
    // Absolute index (in pushes) of the next pair to read.
    next: u64,
    last: (f32, f32),
    skipped: u64,
}

impl InputTap {
    /// Start reading from the most recent frame in `ring` onwards.
    pub fn new(ring: Arc<XyBuffers>) -> Self {
        let next = ring.written();
        Self {
            ring,
            next,
            last: (0.0, 0.0),
            skipped: 0,
        }
    }

    /// Number of captured pairs waiting to be read.
    pub fn available(&self) -> u64 {
        self.ring.written().saturating_sub(self.next)
    }

    /// Total number of pairs dropped because the reader fell more than a ring's worth behind.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Return the next captured pair. When no new input is available the previous pair is
    /// repeated. When the reader has fallen behind by more than the ring capacity, it jumps
    /// forward to the oldest pair still held.
    pub fn next_pair(&mut self) -> (f32, f32) {
        let written = self.ring.written();
        let capacity = self.ring.capacity() as u64;
        let available = written.saturating_sub(self.next);
        if available == 0 {
            return self.last;
        }
        if available > capacity {
            let oldest = written - capacity;
            self.skipped += oldest - self.next;
            self.next = oldest;
        }
        self.last = self.ring.slot((self.next % capacity) as usize);
        self.next += 1;
        self.last
    }
}
