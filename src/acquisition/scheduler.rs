// src/acquisition/scheduler.rs
//! Fixed-period acquisition/synthesis loop
//!
//! The scheduler owns the producer side of the engine: a dedicated thread
//! that synthesizes output values, drives the transducer, and appends
//! timestamped samples to the batch buffer at the configured rate. Waveform
//! phase is derived from the sample counter and target rate, never from
//! accumulated sleeps, so scheduling jitter cannot drift the phase.

use super::batch::{Sample, SampleBatch};
use super::batch_buffer::SampleBatchBuffer;
use crate::config::constants::{engine, transducer as xdcr};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::hal::{OutputChannel, Transducer};
use crate::synth::{mirror_value, WaveformSpec};
use crossbeam::channel::{bounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Engine lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EngineState {
    /// No scheduling loop is active.
    Idle = 0,
    /// Exactly one scheduling loop instance is active.
    Running = 1,
}

impl EngineState {
    fn from_u8(value: u8) -> Self {
        if value == EngineState::Running as u8 {
            EngineState::Running
        } else {
            EngineState::Idle
        }
    }
}

/// Input/output behavior of the scheduling loop.
///
/// Read once at the top of every iteration; edits apply on the next sample,
/// never mid-iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Target loop rate, Hz. Must be positive.
    pub target_rate_hz: f64,
    /// Synthesize and write output voltages each iteration.
    pub generate_output: bool,
    /// Read input voltages each iteration.
    pub sample_input: bool,
    /// Input side: record channel 1 − channel 2 in the differential column.
    pub differential_mode: bool,
    /// Output side: derive channel 2 as channel 1 reflected about its
    /// offset instead of an independent waveform.
    pub mirror_mode: bool,
    /// ADC channel read as channel 1 (1..=8).
    pub input_channel1: u8,
    /// ADC channel read as channel 2 (1..=8).
    pub input_channel2: u8,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            target_rate_hz: engine::DEFAULT_TARGET_RATE_HZ,
            generate_output: true,
            sample_input: true,
            differential_mode: false,
            mirror_mode: false,
            input_channel1: engine::DEFAULT_INPUT_CHANNEL1,
            input_channel2: engine::DEFAULT_INPUT_CHANNEL2,
        }
    }
}

impl AcquisitionConfig {
    /// Boundary validation for user-supplied configs.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.target_rate_hz > 0.0 && self.target_rate_hz.is_finite()) {
            return Err(EngineError::config(
                "target_rate_hz",
                format!("must be positive and finite, got {}", self.target_rate_hz),
            ));
        }
        let valid = xdcr::INPUT_CHANNEL_MIN..=xdcr::INPUT_CHANNEL_MAX;
        if !valid.contains(&self.input_channel1) {
            return Err(EngineError::config(
                "input_channel1",
                format!("must be in 1..=8, got {}", self.input_channel1),
            ));
        }
        if !valid.contains(&self.input_channel2) {
            return Err(EngineError::config(
                "input_channel2",
                format!("must be in 1..=8, got {}", self.input_channel2),
            ));
        }
        Ok(())
    }
}

/// State shared between the engine handle and the loop thread.
struct Shared {
    state: AtomicU8,
    stop_requested: AtomicBool,
    channel1: RwLock<WaveformSpec>,
    channel2: RwLock<WaveformSpec>,
    acquisition: RwLock<AcquisitionConfig>,
    buffer: Arc<SampleBatchBuffer>,
    sample_count: AtomicU64,
    achieved_rate_bits: AtomicU64,
}

/// Drives the fixed-period loop on a dedicated thread and exposes the
/// consumer surface: start/stop, live parameter mutation, batch draining,
/// and run diagnostics.
pub struct AcquisitionScheduler<T: Transducer + 'static> {
    shared: Arc<Shared>,
    transducer: Arc<Mutex<T>>,
    fault_tx: Sender<EngineError>,
    fault_rx: Receiver<EngineError>,
    handle: Option<JoinHandle<()>>,
}

impl<T: Transducer + 'static> AcquisitionScheduler<T> {
    /// Build an engine around a validated configuration and a transducer.
    pub fn new(config: EngineConfig, transducer: T) -> Result<Self, EngineError> {
        config.validate()?;
        let (fault_tx, fault_rx) = bounded(1);
        Ok(Self {
            shared: Arc::new(Shared {
                state: AtomicU8::new(EngineState::Idle as u8),
                stop_requested: AtomicBool::new(false),
                channel1: RwLock::new(config.channel1),
                channel2: RwLock::new(config.channel2),
                acquisition: RwLock::new(config.acquisition),
                buffer: Arc::new(SampleBatchBuffer::new(config.buffer_capacity)),
                sample_count: AtomicU64::new(0),
                achieved_rate_bits: AtomicU64::new(0),
            }),
            transducer: Arc::new(Mutex::new(transducer)),
            fault_tx,
            fault_rx,
            handle: None,
        })
    }

    /// Start the scheduling loop. No-op while already `Running`.
    ///
    /// Clears the batch buffer and resets the sample counter and
    /// achieved-rate diagnostic before the first iteration.
    pub fn start(&mut self) {
        let swapped = self.shared.state.compare_exchange(
            EngineState::Idle as u8,
            EngineState::Running as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        if swapped.is_err() {
            debug!("start requested while already running, ignoring");
            return;
        }

        // Reap the thread of a previous run, if any.
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }

        self.shared.stop_requested.store(false, Ordering::Release);
        self.shared.buffer.clear();
        self.shared.sample_count.store(0, Ordering::Relaxed);
        self.shared.achieved_rate_bits.store(0, Ordering::Relaxed);
        // A fault left unconsumed from an earlier run belongs to that run.
        while self.fault_rx.try_recv().is_ok() {}

        let target = self.shared.acquisition.read().target_rate_hz;
        info!(target_rate_hz = target, "acquisition started");

        let shared = Arc::clone(&self.shared);
        let transducer = Arc::clone(&self.transducer);
        let fault_tx = self.fault_tx.clone();
        self.handle = Some(thread::spawn(move || run_loop(shared, transducer, fault_tx)));
    }

    /// Request stop. The loop exits at the next iteration boundary, so an
    /// in-flight transducer call always completes. No-op while `Idle`.
    pub fn stop(&self) {
        if self.state() == EngineState::Running {
            self.shared.stop_requested.store(true, Ordering::Release);
            info!("stop requested");
        }
    }

    /// Wait up to `grace` for the loop thread to exit after a stop request.
    ///
    /// Returns true once the engine observably reached `Idle` within the
    /// grace period.
    pub fn join(&mut self, grace: Duration) -> bool {
        let Some(handle) = self.handle.take() else {
            return self.state() == EngineState::Idle;
        };
        let deadline = Instant::now() + grace;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                self.handle = Some(handle);
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        let _ = handle.join();
        true
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        EngineState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Consumer handle onto the batch buffer, shareable across threads.
    pub fn batch_buffer(&self) -> Arc<SampleBatchBuffer> {
        Arc::clone(&self.shared.buffer)
    }

    /// Drain everything captured since the previous drain.
    pub fn drain_and_reset(&self) -> SampleBatch {
        self.shared.buffer.drain_and_reset()
    }

    /// Samples produced by the current run.
    pub fn sample_count(&self) -> u64 {
        self.shared.sample_count.load(Ordering::Relaxed)
    }

    /// Measured throughput of the current run, Hz. Recomputed every
    /// [`engine::RATE_REPORT_INTERVAL`] samples; 0.0 until the first report.
    pub fn achieved_rate_hz(&self) -> f64 {
        f64::from_bits(self.shared.achieved_rate_bits.load(Ordering::Relaxed))
    }

    /// Take the fault that ended the last run, if one occurred.
    pub fn last_fault(&self) -> Option<EngineError> {
        self.fault_rx.try_recv().ok()
    }

    /// Replace the channel-1 waveform. Takes effect on the next sample.
    pub fn set_channel1(&self, spec: WaveformSpec) -> Result<(), EngineError> {
        spec.validate()?;
        *self.shared.channel1.write() = spec;
        Ok(())
    }

    /// Replace the channel-2 waveform. Takes effect on the next sample.
    pub fn set_channel2(&self, spec: WaveformSpec) -> Result<(), EngineError> {
        spec.validate()?;
        *self.shared.channel2.write() = spec;
        Ok(())
    }

    /// Replace the acquisition settings. Takes effect on the next sample.
    pub fn set_acquisition(&self, config: AcquisitionConfig) -> Result<(), EngineError> {
        config.validate()?;
        *self.shared.acquisition.write() = config;
        Ok(())
    }

    /// Snapshot of the channel-1 waveform.
    pub fn channel1(&self) -> WaveformSpec {
        *self.shared.channel1.read()
    }

    /// Snapshot of the channel-2 waveform.
    pub fn channel2(&self) -> WaveformSpec {
        *self.shared.channel2.read()
    }

    /// Snapshot of the acquisition settings.
    pub fn acquisition(&self) -> AcquisitionConfig {
        *self.shared.acquisition.read()
    }

    /// Shared handle onto the transducer, for diagnostics. Hold the lock
    /// briefly: the loop takes it every iteration.
    pub fn transducer(&self) -> Arc<Mutex<T>> {
        Arc::clone(&self.transducer)
    }
}

impl<T: Transducer + 'static> Drop for AcquisitionScheduler<T> {
    fn drop(&mut self) {
        // Forced shutdown: signal the loop and detach. It exits at the next
        // iteration boundary.
        self.stop();
    }
}

fn clamp_output(volts: f64) -> f64 {
    volts.clamp(xdcr::OUTPUT_MIN_V, xdcr::OUTPUT_MAX_V)
}

fn fail_run<E>(shared: &Shared, fault_tx: &Sender<EngineError>, err: E)
where
    E: Error + Send + Sync + 'static,
{
    error!(error = %err, "transducer fault, stopping acquisition");
    let _ = fault_tx.try_send(EngineError::transducer(err));
    shared.state.store(EngineState::Idle as u8, Ordering::Release);
}

fn run_loop<T: Transducer + 'static>(
    shared: Arc<Shared>,
    transducer: Arc<Mutex<T>>,
    fault_tx: Sender<EngineError>,
) {
    let run_start = Instant::now();
    let mut index: u64 = 0;

    // Nominal time accumulates across rate changes so timestamps stay
    // non-decreasing even when target_rate_hz is edited mid-run.
    let mut current_rate = shared.acquisition.read().target_rate_hz;
    let mut base_t = 0.0f64;
    let mut base_index: u64 = 0;

    loop {
        if shared.stop_requested.load(Ordering::Acquire) {
            debug!(samples = index, "stop observed, leaving acquisition loop");
            break;
        }
        let iter_start = Instant::now();

        let acq = *shared.acquisition.read();
        let spec1 = *shared.channel1.read();
        let spec2 = *shared.channel2.read();

        if acq.target_rate_hz != current_rate {
            base_t += (index - base_index) as f64 / current_rate;
            base_index = index;
            current_rate = acq.target_rate_hz;
        }
        // Nominal instant from the sample counter, immune to scheduling jitter.
        let t = base_t + (index - base_index) as f64 / current_rate;

        let mut synth1 = 0.0;
        let mut synth2 = 0.0;
        if acq.generate_output {
            synth1 = spec1.sample(t);
            synth2 = if acq.mirror_mode {
                mirror_value(spec1.offset_v, synth1)
            } else {
                spec2.sample(t)
            };
            let written = {
                let mut device = transducer.lock();
                device
                    .write_output_voltage(OutputChannel::One, clamp_output(synth1))
                    .and_then(|()| {
                        device.write_output_voltage(OutputChannel::Two, clamp_output(synth2))
                    })
            };
            if let Err(err) = written {
                fail_run(&shared, &fault_tx, err);
                return;
            }
        }

        let sample = if acq.sample_input {
            let readings = {
                let mut device = transducer.lock();
                device.read_input_voltage(acq.input_channel1, 0).and_then(|raw1| {
                    device
                        .read_input_voltage(acq.input_channel2, 0)
                        .map(|raw2| (raw1, raw2))
                })
            };
            let (raw1, raw2) = match readings {
                Ok(pair) => pair,
                Err(err) => {
                    fail_run(&shared, &fault_tx, err);
                    return;
                }
            };
            let value1 = raw1 - xdcr::INPUT_ZERO_OFFSET_V;
            let value2 = raw2 - xdcr::INPUT_ZERO_OFFSET_V;
            let differential = if acq.differential_mode {
                value1 - value2
            } else {
                0.0
            };
            Sample {
                // Acquisition timestamps follow the wall clock so the
                // display axis matches real elapsed time.
                timestamp_s: run_start.elapsed().as_secs_f64(),
                channel1_v: value1,
                channel2_v: value2,
                differential_v: differential,
            }
        } else {
            // Synthesis-only runs record the pre-clamp synthesized values
            // at the nominal instant.
            let differential = if acq.mirror_mode { synth1 - synth2 } else { 0.0 };
            Sample {
                timestamp_s: t,
                channel1_v: synth1,
                channel2_v: synth2,
                differential_v: differential,
            }
        };
        shared.buffer.append(sample);

        index += 1;
        shared.sample_count.store(index, Ordering::Relaxed);

        if index % engine::RATE_REPORT_INTERVAL == 0 {
            let elapsed = run_start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let achieved = index as f64 / elapsed;
                shared
                    .achieved_rate_bits
                    .store(achieved.to_bits(), Ordering::Relaxed);
                if achieved < engine::OVERRUN_WARN_RATIO * acq.target_rate_hz {
                    warn!(
                        achieved_rate_hz = achieved,
                        target_rate_hz = acq.target_rate_hz,
                        "sustained overrun, throughput below target"
                    );
                }
            }
        }

        // Advisory pacing: an overrunning iteration skips the sleep and the
        // next one starts immediately.
        let period = Duration::from_secs_f64(1.0 / acq.target_rate_hz);
        let elapsed = iter_start.elapsed();
        if elapsed < period {
            thread::sleep(period - elapsed);
        }
    }

    shared.state.store(EngineState::Idle as u8, Ordering::Release);
}
