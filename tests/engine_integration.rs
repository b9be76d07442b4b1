// tests/engine_integration.rs
//! End-to-end engine scenarios over the loopback transducer

use daq_core::processing::estimate_dominant_frequency;
use daq_core::{
    AcquisitionConfig, AcquisitionScheduler, EngineConfig, EngineError, EngineState,
    LoopbackTransducer, Waveform, WaveformSpec,
};
use daq_core::hal::LoopbackConfig;
use serial_test::serial;
use std::time::Duration;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn sine_spec(frequency_hz: f64, amplitude_v: f64, offset_v: f64) -> WaveformSpec {
    WaveformSpec {
        shape: Waveform::Sine,
        frequency_hz,
        amplitude_v,
        offset_v,
    }
}

#[test]
#[serial]
fn test_synthesis_run_stays_in_envelope_and_estimates_frequency() {
    init_logging();
    let config = EngineConfig {
        channel1: sine_spec(10.0, 1.0, 0.0),
        acquisition: AcquisitionConfig {
            target_rate_hz: 1000.0,
            generate_output: true,
            sample_input: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut engine =
        AcquisitionScheduler::new(config, LoopbackTransducer::default()).unwrap();

    engine.start();
    std::thread::sleep(Duration::from_secs(1));
    engine.stop();
    assert!(engine.join(Duration::from_secs(1)));

    let batch = engine.drain_and_reset();
    assert!(batch.len() >= 64, "only {} samples captured", batch.len());
    assert!(batch.len() <= 1000);

    for sample in &batch.samples {
        assert!(
            sample.channel1_v.abs() <= 1.0 + 1e-9,
            "sample {} V exceeds the 1 V envelope",
            sample.channel1_v
        );
    }

    let estimate = estimate_dominant_frequency(&batch.timestamps(), &batch.channel1());
    assert!(
        (estimate - 10.0).abs() <= 2.0,
        "estimated {estimate} Hz, expected about 10 Hz"
    );
}

#[test]
#[serial]
fn test_acquisition_run_reads_back_generated_signal() {
    init_logging();
    // Offset keeps the 1 V sine inside the DAC range, so the loopback read
    // minus the zero offset recovers the signed waveform exactly.
    let config = EngineConfig {
        channel1: sine_spec(10.0, 1.0, 1.5),
        channel2: sine_spec(40.0, 0.5, 1.5),
        acquisition: AcquisitionConfig {
            target_rate_hz: 1000.0,
            generate_output: true,
            sample_input: true,
            differential_mode: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut engine =
        AcquisitionScheduler::new(config, LoopbackTransducer::default()).unwrap();

    engine.start();
    std::thread::sleep(Duration::from_secs(1));
    engine.stop();
    assert!(engine.join(Duration::from_secs(1)));

    let batch = engine.drain_and_reset();
    assert!(batch.len() >= 64);

    let mut last_timestamp = f64::NEG_INFINITY;
    for sample in &batch.samples {
        assert!(sample.channel1_v.abs() <= 1.0 + 1e-9);
        assert!(sample.channel2_v.abs() <= 0.5 + 1e-9);
        assert_eq!(sample.differential_v, sample.channel1_v - sample.channel2_v);
        assert!(sample.timestamp_s >= last_timestamp, "timestamps went backward");
        last_timestamp = sample.timestamp_s;
    }

    // Output phase advances nominally per sample while timestamps follow
    // the wall clock, so the frequency the digitizer sees scales with the
    // achieved loop rate.
    let apparent = 10.0 * engine.achieved_rate_hz() / 1000.0;
    let estimate = estimate_dominant_frequency(&batch.timestamps(), &batch.channel1());
    assert!(estimate > 5.0, "estimated {estimate} Hz on channel 1");
    assert!(
        (estimate - apparent).abs() <= 2.0,
        "estimated {estimate} Hz, apparent frequency {apparent} Hz"
    );
}

#[test]
#[serial]
fn test_mirror_mode_reflects_channel_one() {
    init_logging();
    let offset = 0.8;
    let config = EngineConfig {
        channel1: sine_spec(20.0, 0.5, offset),
        acquisition: AcquisitionConfig {
            target_rate_hz: 2000.0,
            generate_output: true,
            sample_input: false,
            mirror_mode: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut engine =
        AcquisitionScheduler::new(config, LoopbackTransducer::default()).unwrap();

    engine.start();
    std::thread::sleep(Duration::from_millis(200));
    engine.stop();
    assert!(engine.join(Duration::from_secs(1)));

    let batch = engine.drain_and_reset();
    assert!(!batch.is_empty());
    for sample in &batch.samples {
        assert_eq!(sample.channel2_v, 2.0 * offset - sample.channel1_v);
        assert_eq!(sample.differential_v, sample.channel1_v - sample.channel2_v);
    }
}

#[test]
fn test_start_then_immediate_stop_leaves_everything_untouched() {
    init_logging();
    let mut engine = AcquisitionScheduler::new(
        EngineConfig::default(),
        LoopbackTransducer::default(),
    )
    .unwrap();

    engine.start();
    engine.stop();
    assert!(engine.join(Duration::from_secs(1)));

    assert_eq!(engine.state(), EngineState::Idle);
    assert_eq!(engine.sample_count(), 0);
    assert!(engine.drain_and_reset().is_empty());

    let transducer = engine.transducer();
    let device = transducer.lock();
    assert_eq!(device.write_count(), 0);
    assert_eq!(device.read_count(), 0);
}

#[test]
#[serial]
fn test_overrun_evicts_oldest_and_counts_drops() {
    init_logging();
    let config = EngineConfig {
        buffer_capacity: 100,
        acquisition: AcquisitionConfig {
            target_rate_hz: 50_000.0,
            generate_output: true,
            sample_input: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut engine =
        AcquisitionScheduler::new(config, LoopbackTransducer::default()).unwrap();
    let buffer = engine.batch_buffer();

    engine.start();
    std::thread::sleep(Duration::from_millis(200));
    engine.stop();
    assert!(engine.join(Duration::from_secs(1)));

    assert!(engine.sample_count() > 100);
    assert!(buffer.dropped_samples() > 0);
    let batch = buffer.drain_and_reset();
    assert_eq!(batch.len(), 100);
    // The retained window is the newest samples, still in order.
    let timestamps = batch.timestamps();
    assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
#[serial]
fn test_transducer_fault_stops_run_and_is_reported() {
    init_logging();
    let config = EngineConfig {
        acquisition: AcquisitionConfig {
            target_rate_hz: 5000.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let loopback = LoopbackTransducer::new(LoopbackConfig {
        fail_after_ops: Some(25),
        ..Default::default()
    });
    let mut engine = AcquisitionScheduler::new(config, loopback).unwrap();

    engine.start();
    assert!(
        engine.join(Duration::from_secs(2)),
        "loop should exit on its own after the injected fault"
    );
    assert_eq!(engine.state(), EngineState::Idle);

    let fault = engine.last_fault().expect("fault must be surfaced");
    assert!(matches!(fault, EngineError::Transducer(_)));
    assert!(fault.to_string().contains("transducer fault"));
    // The fault is consumed once.
    assert!(engine.last_fault().is_none());

    // A fault does not wedge the state machine: the engine accepts a
    // restart and winds down again (the loopback keeps failing).
    engine.start();
    engine.stop();
    assert!(engine.join(Duration::from_secs(2)));
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
#[serial]
fn test_live_reconfiguration_applies_on_next_sample() {
    init_logging();
    let config = EngineConfig {
        channel1: sine_spec(10.0, 1.0, 0.0),
        acquisition: AcquisitionConfig {
            target_rate_hz: 2000.0,
            generate_output: true,
            sample_input: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut engine =
        AcquisitionScheduler::new(config, LoopbackTransducer::default()).unwrap();

    engine.start();
    std::thread::sleep(Duration::from_millis(100));

    // Flatten channel 1 mid-run; new samples settle onto the new offset.
    engine
        .set_channel1(WaveformSpec {
            shape: Waveform::Sine,
            frequency_hz: 10.0,
            amplitude_v: 0.0,
            offset_v: 0.25,
        })
        .unwrap();
    engine.drain_and_reset();
    std::thread::sleep(Duration::from_millis(100));

    engine.stop();
    assert!(engine.join(Duration::from_secs(1)));

    let batch = engine.drain_and_reset();
    assert!(!batch.is_empty());
    // Everything after the first few transition samples sits at the offset.
    let tail = &batch.samples[batch.len().saturating_sub(batch.len() / 2)..];
    for sample in tail {
        assert_eq!(sample.channel1_v, 0.25);
    }
}

#[test]
#[serial]
fn test_achieved_rate_tracks_wall_clock_throughput() {
    init_logging();
    let config = EngineConfig {
        acquisition: AcquisitionConfig {
            target_rate_hz: 2000.0,
            generate_output: true,
            sample_input: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut engine =
        AcquisitionScheduler::new(config, LoopbackTransducer::default()).unwrap();

    engine.start();
    std::thread::sleep(Duration::from_millis(500));
    engine.stop();
    assert!(engine.join(Duration::from_secs(1)));

    let achieved = engine.achieved_rate_hz();
    assert!(achieved > 0.0, "rate diagnostic never reported");
    // Advisory pacing cannot exceed the target by more than jitter.
    assert!(achieved <= 2000.0 * 1.1, "achieved {achieved} Hz");
}
