//! Native audio output: plays the engine through the system device.
//!
//! This is the desktop monitor path; the browser build renders through an
//! AudioWorklet instead. The stream callback drives the shared engine
//! directly, so anything audible is also visible to the capture recorder.

use std::sync::{Arc, Mutex, MutexGuard};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::warn;

use crate::dsp::engine::SynthEngine;
use crate::error::DeviceError;

/// Owns the cpal stream that pulls audio from a shared engine.
pub struct AudioOutput {
    engine: Arc<Mutex<SynthEngine>>,
    stream: Option<cpal::Stream>,
}

impl AudioOutput {
    pub fn new(engine: Arc<Mutex<SynthEngine>>) -> Self {
        AudioOutput {
            engine,
            stream: None,
        }
    }

    /// Sample rate of the default output device. Use this to build the
    /// engine before opening the stream.
    pub fn device_sample_rate() -> Result<f64, DeviceError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(DeviceError::NoOutputDevice)?;
        let config = device
            .default_output_config()
            .map_err(|e| DeviceError::Unsupported(e.to_string()))?;
        Ok(config.sample_rate().0 as f64)
    }

    /// Open the output stream and start the engine. Idempotent: calling
    /// again while the stream is open just re-asserts the running state.
    pub fn start(&mut self) -> Result<(), DeviceError> {
        if self.stream.is_some() {
            lock_engine(&self.engine).start();
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(DeviceError::NoOutputDevice)?;
        let config = device
            .default_output_config()
            .map_err(|e| DeviceError::Unsupported(e.to_string()))?;
        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(DeviceError::Unsupported(format!(
                "unsupported sample format {:?}",
                config.sample_format()
            )));
        }
        let channels = (config.channels() as usize).max(1);
        let config: cpal::StreamConfig = config.into();

        let engine = Arc::clone(&self.engine);
        let mut left: Vec<f32> = Vec::new();
        let mut right: Vec<f32> = Vec::new();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _| {
                    let frames = data.len().div_ceil(channels);
                    left.resize(frames, 0.0);
                    right.resize(frames, 0.0);
                    lock_engine(&engine).process_block(&mut left, &mut right);

                    for (frame, samples) in data.chunks_mut(channels).enumerate() {
                        if samples.len() == 1 {
                            samples[0] = 0.5 * (left[frame] + right[frame]);
                        } else {
                            samples[0] = left[frame];
                            samples[1] = right[frame];
                            for extra in &mut samples[2..] {
                                *extra = 0.0;
                            }
                        }
                    }
                },
                |err| warn!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| DeviceError::Stream(e.to_string()))?;

        stream.play().map_err(|e| DeviceError::Stream(e.to_string()))?;
        lock_engine(&self.engine).start();
        self.stream = Some(stream);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

fn lock_engine(engine: &Arc<Mutex<SynthEngine>>) -> MutexGuard<'_, SynthEngine> {
    match engine.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
