// src/acquisition/batch.rs
//! Timestamped samples and the batches handed to the consumer

/// One measured or generated instant. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Seconds since run start; non-decreasing within a batch.
    pub timestamp_s: f64,
    /// Channel-1 value, volts.
    pub channel1_v: f64,
    /// Channel-2 value, volts.
    pub channel2_v: f64,
    /// Channel 1 − channel 2 when differential mode is active, else 0.0.
    pub differential_v: f64,
}

/// Time-ordered batch of samples, owned wholly by the consumer after a
/// drain: the buffer it came from starts over on a fresh sequence, so
/// nothing aliases this data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBatch {
    /// Samples in insertion (= temporal) order.
    pub samples: Vec<Sample>,
}

impl SampleBatch {
    pub(crate) fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the batch holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample, if any.
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Timestamp column, for the frequency estimator.
    pub fn timestamps(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.timestamp_s).collect()
    }

    /// Channel-1 column.
    pub fn channel1(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.channel1_v).collect()
    }

    /// Channel-2 column.
    pub fn channel2(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.channel2_v).collect()
    }

    /// Differential column.
    pub fn differential(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.differential_v).collect()
    }
}

impl IntoIterator for SampleBatch {
    type Item = Sample;
    type IntoIter = std::vec::IntoIter<Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}
