// src/hal/traits.rs
//! Transducer boundary consumed by the scheduling loop

use std::error::Error;

/// Selector for the two DAC output channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputChannel {
    /// DAC channel 1.
    One,
    /// DAC channel 2.
    Two,
}

impl OutputChannel {
    /// Zero-based index for array-backed implementations.
    pub fn index(self) -> usize {
        match self {
            OutputChannel::One => 0,
            OutputChannel::Two => 1,
        }
    }
}

/// Hardware boundary converting between requested voltages and device I/O.
///
/// Calls run on the scheduling thread and are treated as fast,
/// non-blocking-for-practical-purposes operations; there is no per-call
/// timeout, so a hung call stalls the loop. A returned error is fatal to
/// the current run.
pub trait Transducer: Send {
    /// Device-specific failure type.
    type Error: Error + Send + Sync + 'static;

    /// Write `volts` to an output channel.
    ///
    /// Callers clamp to the device output interval before calling;
    /// behavior on out-of-range input is device-defined.
    fn write_output_voltage(&mut self, channel: OutputChannel, volts: f64)
        -> Result<(), Self::Error>;

    /// Read the raw voltage on input `channel` (1..=8) using the device
    /// `range` selector.
    ///
    /// The reading is in the device's native unsigned range; subtract the
    /// documented zero offset to recover a signed measurement.
    fn read_input_voltage(&mut self, channel: u8, range: u8) -> Result<f64, Self::Error>;
}
