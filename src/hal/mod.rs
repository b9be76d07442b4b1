// src/hal/mod.rs
//! Hardware abstraction for the analog transducer

pub mod loopback;
pub mod traits;

pub use loopback::{LoopbackConfig, LoopbackError, LoopbackTransducer};
pub use traits::{OutputChannel, Transducer};
