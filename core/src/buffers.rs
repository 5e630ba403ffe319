use crate::ring::SampleRing;
use std::num::NonZeroUsize;

/// Reference capacity shared by both axis buffers.
pub const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::new(32768).unwrap();

/// A pair of same-capacity rings holding the X and Y axis of the scope. Samples can only be added
/// in pairs so both rings always have the same tail and the same number of valid entries.
#[derive(Debug)]
pub struct XyBuffers {
    x: SampleRing,
    y: SampleRing,
}

impl XyBuffers {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            x: SampleRing::new(capacity),
            y: SampleRing::new(capacity),
        }
    }

    /// Append one sample to each axis. Lock-free and allocation-free. Single writer only.
    pub fn push_pair(&self, x: f32, y: f32) {
        self.x.push(x);
        self.y.push(y);
    }

    pub fn x(&self) -> &SampleRing {
        &self.x
    }

    pub fn y(&self) -> &SampleRing {
        &self.y
    }

    pub fn capacity(&self) -> usize {
        self.x.capacity()
    }

    /// The tail of the X axis. The Y axis agrees except while a pair is mid-write.
    pub fn tail(&self) -> Option<usize> {
        self.x.tail()
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn written(&self) -> u64 {
        self.x.written()
    }

    #[cfg(test)]
    pub(crate) fn set_written(&mut self, written: u64) {
        self.x.set_written(written);
        self.y.set_written(written);
    }

    /// The pair written `age` pairs ago.
    pub fn read(&self, age: usize) -> (f32, f32) {
        (self.x.read(age), self.y.read(age))
    }

    /// The pair stored at physical slot `index` (modulo capacity).
    pub fn slot(&self, index: usize) -> (f32, f32) {
        (self.x.slot(index), self.y.slot(index))
    }

    pub fn resize(&mut self, capacity: NonZeroUsize) {
        self.x.resize(capacity);
        self.y.resize(capacity);
    }
}

impl Default for XyBuffers {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::Rng;

    #[test]
    fn pairs_share_tail_and_len() {
        let mut rng = rand::rng();
        let buffers = XyBuffers::new(NonZeroUsize::new(37).unwrap());
        for _ in 0..20 {
            for _ in 0..rng.random_range(0..50) {
                buffers.push_pair(rng.random(), rng.random());
            }
            assert_eq!(buffers.x().tail(), buffers.y().tail());
            assert_eq!(buffers.x().len(), buffers.y().len());
        }
    }

    #[test]
    fn read_returns_matching_pair() {
        let buffers = XyBuffers::new(NonZeroUsize::new(4).unwrap());
        buffers.push_pair(1.0, -1.0);
        buffers.push_pair(2.0, -2.0);
        assert_eq!(buffers.read(0), (2.0, -2.0));
        assert_eq!(buffers.read(1), (1.0, -1.0));
        assert_eq!(buffers.slot(0), (1.0, -1.0));
    }

    #[test]
    fn resize_resets_both_axes() {
        let mut buffers = XyBuffers::new(NonZeroUsize::new(4).unwrap());
        buffers.push_pair(1.0, 1.0);
        buffers.resize(NonZeroUsize::new(8).unwrap());
        assert_eq!(buffers.capacity(), 8);
        assert_eq!(buffers.y().capacity(), 8);
        assert!(buffers.is_empty());
        assert_eq!(buffers.y().tail(), None);
    }
}
