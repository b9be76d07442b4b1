//! daq-core: real-time dual-channel signal synthesis and acquisition engine
//!
//! This library is the core of a bench instrument that periodically drives a
//! dual-channel analog signal generator and/or samples a dual-channel
//! digitizer, while exposing the most recent window of samples to a display
//! or analysis consumer. It provides:
//!
//! - A fixed-period scheduling loop with drift-free waveform phase
//! - Lock-guarded, O(1)-critical-section batch exchange between the
//!   sampling thread and the consumer
//! - Deterministic waveform synthesis (sine, square, triangle, sawtooth)
//! - A windowed-FFT dominant-frequency estimator
//!
//! The presentation layer and the physical hardware driver are external
//! collaborators: the former consumes drained batches, the latter plugs in
//! through the [`Transducer`] trait.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use daq_core::{AcquisitionScheduler, EngineConfig, LoopbackTransducer};
//! use daq_core::processing::estimate_dominant_frequency;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), daq_core::EngineError> {
//! let config = EngineConfig::default();
//! let mut engine = AcquisitionScheduler::new(config, LoopbackTransducer::default())?;
//!
//! engine.start();
//! std::thread::sleep(Duration::from_millis(500));
//!
//! let batch = engine.drain_and_reset();
//! let freq = estimate_dominant_frequency(&batch.timestamps(), &batch.channel1());
//! println!("captured {} samples, dominant frequency {freq:.1} Hz", batch.len());
//!
//! engine.stop();
//! engine.join(Duration::from_secs(1));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod acquisition;
pub mod config;
pub mod error;
pub mod hal;
pub mod processing;
pub mod synth;

// Re-export commonly used types for convenience
pub use acquisition::{
    AcquisitionConfig, AcquisitionScheduler, EngineState, Sample, SampleBatch, SampleBatchBuffer,
};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use hal::{LoopbackTransducer, OutputChannel, Transducer};
pub use processing::estimate_dominant_frequency;
pub use synth::{mirror_value, Waveform, WaveformSpec};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
