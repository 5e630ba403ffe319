use std::{
    num::NonZeroUsize,
    sync::atomic::{AtomicU32, AtomicU64, Ordering},
};

/// Fixed-capacity circular buffer of `f32` samples with one writer and one reader.
///
/// The writer stores a sample into the slot after the current tail and only then publishes the
/// new tail. Readers may observe a slot while it is being overwritten by a later push. Each slot
/// is read and written atomically so this can only ever produce a stale sample, never a torn one
/// or an out-of-bounds access. There is no consistency guarantee across a range of slots.
pub struct SampleRing {
    slots: Box<[AtomicU32]>,
    // Total number of pushes since construction or the last resize. The tail is derived from this.
    // 64 bits so it doesn't wrap in any realistic run time on 32-bit targets.
    written: AtomicU64,
}

fn zeroed_slots(capacity: NonZeroUsize) -> Box<[AtomicU32]> {
    (0..capacity.get())
        .map(|_| AtomicU32::new(0.0f32.to_bits()))
        .collect()
}

impl SampleRing {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            slots: zeroed_slots(capacity),
            written: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Overwrite the slot after the tail and advance the tail. Never allocates or blocks, so it's
    /// safe to call from an audio callback. Must only be called from a single thread at a time.
    pub fn push(&self, value: f32) {
        let written = self.written.load(Ordering::Relaxed);
        let index = (written % self.slots.len() as u64) as usize;
        self.slots[index].store(value.to_bits(), Ordering::Relaxed);
        self.written.store(written.wrapping_add(1), Ordering::Release);
    }

    /// Total number of samples pushed since construction or the last resize.
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Acquire)
    }

    /// Index of the most recently written slot, or `None` if nothing has been pushed yet.
    pub fn tail(&self) -> Option<usize> {
        tail_of(self.written(), self.capacity())
    }

    /// Number of slots holding a pushed sample.
    pub fn len(&self) -> usize {
        self.written().min(self.capacity() as u64) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.written() == 0
    }

    /// Read a slot by its physical index. Indices past the end wrap around.
    pub fn slot(&self, index: usize) -> f32 {
        f32::from_bits(self.slots[index % self.slots.len()].load(Ordering::Relaxed))
    }

    /// Returns the sample pushed `age` pushes ago, where an age of 0 is the most recent sample.
    ///
    /// Ages of at least the capacity refer to overwritten samples. They wrap modulo the capacity
    /// rather than panicking. Before the first push the slot before index 0 is treated as the
    /// tail, so reads return the zero-initialized contents.
    pub fn read(&self, age: usize) -> f32 {
        let capacity = self.capacity();
        if cfg!(debug_assertions) && age >= capacity {
            log::debug!(
                "Sample ring read out of range (age {} with capacity {}). Wrapping.",
                age,
                capacity
            );
        }
        let tail = self.tail().unwrap_or(capacity - 1);
        let age = age % capacity;
        self.slot(tail + capacity - age)
    }

    /// Replace the storage with `capacity` zeroed slots and forget all history. Taking `&mut self`
    /// means this can't run while the ring is shared with the audio or render context.
    pub fn resize(&mut self, capacity: NonZeroUsize) {
        self.slots = zeroed_slots(capacity);
        *self.written.get_mut() = 0;
    }

    #[cfg(test)]
    pub(crate) fn set_written(&mut self, written: u64) {
        *self.written.get_mut() = written;
    }

    /// Copy of the slots in physical order, for diagnostics and tests.
    pub fn to_vec(&self) -> Vec<f32> {
        (0..self.capacity()).map(|i| self.slot(i)).collect()
    }
}

fn tail_of(written: u64, capacity: usize) -> Option<usize> {
    if written == 0 {
        None
    } else {
        Some(((written - 1) % capacity as u64) as usize)
    }
}

impl std::fmt::Debug for SampleRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleRing")
            .field("capacity", &self.capacity())
            .field("written", &self.written())
            .finish()
    }
}
