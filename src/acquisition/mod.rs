// src/acquisition/mod.rs
//! Sample capture, buffering, and the scheduling loop

pub mod batch;
pub mod batch_buffer;
pub mod scheduler;

pub use batch::{Sample, SampleBatch};
pub use batch_buffer::SampleBatchBuffer;
pub use scheduler::{AcquisitionConfig, AcquisitionScheduler, EngineState};
