// src/acquisition/batch_buffer.rs
//! Bounded producer/consumer exchange of sample batches

use super::batch::{Sample, SampleBatch};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Bounded FIFO hand-off between the sampling thread and the consumer.
///
/// Every critical section is O(1): an append pushes one element (evicting
/// the oldest at capacity) and a drain swaps the whole interior for a fresh
/// empty sequence. The producer never waits behind consumer-side work such
/// as column extraction or transforms, which all happen outside the lock.
pub struct SampleBatchBuffer {
    inner: Mutex<VecDeque<Sample>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl SampleBatchBuffer {
    /// Create a buffer retaining at most `capacity` samples.
    ///
    /// `capacity` must be nonzero; the configuration boundary rejects a
    /// zero capacity before construction.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "buffer capacity must be nonzero");
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Append one sample, evicting the oldest entry at capacity.
    ///
    /// Producer-side only. Eviction is the defined overrun behavior, not an
    /// error; evictions are counted in [`dropped_samples`](Self::dropped_samples).
    pub fn append(&self, sample: Sample) {
        let mut queue = self.inner.lock();
        if queue.len() == self.capacity {
            queue.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        queue.push_back(sample);
    }

    /// Atomically take everything accumulated since the previous drain and
    /// reset the buffer to empty.
    ///
    /// The interior is swapped, not copied, so the producer is blocked only
    /// for the exchange itself regardless of batch size.
    pub fn drain_and_reset(&self) -> SampleBatch {
        let fresh = VecDeque::with_capacity(self.capacity);
        let drained = {
            let mut queue = self.inner.lock();
            std::mem::replace(&mut *queue, fresh)
        };
        SampleBatch::from_samples(Vec::from(drained))
    }

    /// Empty the buffer without returning its contents and reset the
    /// dropped-sample counter. Used on (re)start.
    pub fn clear(&self) {
        let mut queue = self.inner.lock();
        queue.clear();
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Samples currently held.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// True when nothing is held.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Maximum retained sample count.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples evicted before any consumer saw them, since the last clear.
    pub fn dropped_samples(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: f64) -> Sample {
        Sample {
            timestamp_s: t,
            channel1_v: t * 10.0,
            channel2_v: 0.0,
            differential_v: 0.0,
        }
    }

    #[test]
    fn test_append_and_drain_preserves_order() {
        let buffer = SampleBatchBuffer::new(8);
        for i in 0..5 {
            buffer.append(sample(i as f64));
        }
        let batch = buffer.drain_and_reset();
        assert_eq!(batch.len(), 5);
        assert_eq!(batch.timestamps(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_eviction_keeps_last_capacity_entries() {
        let buffer = SampleBatchBuffer::new(4);
        for i in 0..7 {
            buffer.append(sample(i as f64));
        }
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.dropped_samples(), 3);

        let batch = buffer.drain_and_reset();
        assert_eq!(batch.timestamps(), vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_second_drain_is_empty() {
        let buffer = SampleBatchBuffer::new(4);
        buffer.append(sample(0.0));
        assert_eq!(buffer.drain_and_reset().len(), 1);
        assert!(buffer.drain_and_reset().is_empty());
    }

    #[test]
    fn test_clear_resets_contents_and_counter() {
        let buffer = SampleBatchBuffer::new(2);
        for i in 0..5 {
            buffer.append(sample(i as f64));
        }
        assert!(buffer.dropped_samples() > 0);

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.dropped_samples(), 0);
    }

    #[test]
    fn test_append_after_drain_starts_fresh_sequence() {
        let buffer = SampleBatchBuffer::new(4);
        buffer.append(sample(1.0));
        let first = buffer.drain_and_reset();
        buffer.append(sample(2.0));
        let second = buffer.drain_and_reset();
        assert_eq!(first.timestamps(), vec![1.0]);
        assert_eq!(second.timestamps(), vec![2.0]);
    }
}
