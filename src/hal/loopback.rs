// src/hal/loopback.rs
//! Loopback transducer for tests and bench setups

use super::traits::{OutputChannel, Transducer};
use crate::config::constants::transducer as xdcr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Loopback device settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopbackConfig {
    /// Peak uniform noise added to each read, volts.
    pub noise_v: f64,
    /// When set, every transducer call past this operation count fails.
    /// Fault-injection hook for error-path tests.
    pub fail_after_ops: Option<u64>,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            noise_v: 0.0,
            fail_after_ops: None,
        }
    }
}

/// Loopback device failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoopbackError {
    /// The configured fault-injection threshold was crossed.
    #[error("injected fault after {0} transducer operations")]
    InjectedFault(u64),
    /// The requested input channel does not exist on the device.
    #[error("input channel {0} outside 1..=8")]
    ChannelOutOfRange(u8),
}

/// Simulated transducer wired the way the observed bench is: each DAC
/// output feeds a pair of ADC inputs, so reads return the last written
/// value. Odd input channels follow output 1, even channels output 2.
///
/// Reads saturate to the device range like a real ADC and can carry
/// uniform noise for estimator robustness tests.
pub struct LoopbackTransducer {
    config: LoopbackConfig,
    outputs: [f64; 2],
    ops: u64,
    writes: u64,
    reads: u64,
}

impl Default for LoopbackTransducer {
    fn default() -> Self {
        Self::new(LoopbackConfig::default())
    }
}

impl LoopbackTransducer {
    /// Create a loopback device. Outputs start at the zero offset so an
    /// initial read reports a signed 0 V.
    pub fn new(config: LoopbackConfig) -> Self {
        Self {
            config,
            outputs: [xdcr::INPUT_ZERO_OFFSET_V; 2],
            ops: 0,
            writes: 0,
            reads: 0,
        }
    }

    /// Writes performed so far.
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Reads performed so far.
    pub fn read_count(&self) -> u64 {
        self.reads
    }

    fn step(&mut self) -> Result<(), LoopbackError> {
        self.ops += 1;
        match self.config.fail_after_ops {
            Some(limit) if self.ops > limit => Err(LoopbackError::InjectedFault(limit)),
            _ => Ok(()),
        }
    }
}

impl Transducer for LoopbackTransducer {
    type Error = LoopbackError;

    fn write_output_voltage(
        &mut self,
        channel: OutputChannel,
        volts: f64,
    ) -> Result<(), Self::Error> {
        self.step()?;
        self.writes += 1;
        self.outputs[channel.index()] = volts;
        Ok(())
    }

    fn read_input_voltage(&mut self, channel: u8, _range: u8) -> Result<f64, Self::Error> {
        self.step()?;
        if !(xdcr::INPUT_CHANNEL_MIN..=xdcr::INPUT_CHANNEL_MAX).contains(&channel) {
            return Err(LoopbackError::ChannelOutOfRange(channel));
        }
        self.reads += 1;

        let source = if channel % 2 == 1 { 0 } else { 1 };
        let mut value = self.outputs[source];
        if self.config.noise_v > 0.0 {
            value += (rand::random::<f64>() - 0.5) * 2.0 * self.config.noise_v;
        }
        Ok(value.clamp(xdcr::OUTPUT_MIN_V, xdcr::OUTPUT_MAX_V))
    }
}
