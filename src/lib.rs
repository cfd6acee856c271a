pub mod dsp;
pub mod error;
pub mod params;
#[cfg(feature = "playback")]
pub mod playback;
#[cfg(feature = "service")]
pub mod service;
pub mod store;

use wasm_bindgen::prelude::*;

use crate::dsp::engine::SynthEngine;
use crate::dsp::filter::FilterType;
use crate::dsp::oscillator::Waveform;
use crate::params::{
    DelaySettings, EnvelopeSettings, FilterSettings, OscillatorSettings, ReverbSettings,
    SynthSettings,
};

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the wavedeck-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: the default synth settings as a plain JS object.
#[wasm_bindgen]
pub fn default_settings() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&SynthSettings::default())
        .map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed synthesizer instance for AudioWorklet playback.
///
/// The worklet thread owns the instance and calls `process_block` from its
/// `process()` callback; note and parameter messages arrive over the worklet
/// port and are applied between blocks.
#[wasm_bindgen]
pub struct WasmSynth {
    engine: SynthEngine,
}

#[wasm_bindgen]
impl WasmSynth {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f64) -> WasmSynth {
        WasmSynth {
            engine: SynthEngine::new(sample_rate),
        }
    }

    /// Begin producing audio. Safe to call repeatedly.
    pub fn start(&mut self) {
        self.engine.start();
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn note_on(&mut self, pitch: u8) {
        self.engine.note_on(pitch);
    }

    pub fn note_off(&mut self, pitch: u8) {
        self.engine.note_off(pitch);
    }

    pub fn active_voices(&self) -> usize {
        self.engine.active_voices()
    }

    /// Replace every parameter at once from a settings object, e.g. a
    /// stored preset. Out-of-range values are clamped, never rejected.
    pub fn apply_settings(&mut self, settings: JsValue) -> Result<(), JsValue> {
        let settings: SynthSettings = serde_wasm_bindgen::from_value(settings)
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.engine.apply_settings(&settings);
        Ok(())
    }

    /// The engine's current settings as a plain JS object.
    pub fn settings(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.engine.settings())
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    pub fn set_oscillator(&mut self, waveform: &str, detune: f64) -> Result<(), JsValue> {
        let waveform = parse_waveform(waveform)?;
        self.engine
            .set_oscillator(&OscillatorSettings { waveform, detune });
        Ok(())
    }

    pub fn set_filter(
        &mut self,
        filter_type: &str,
        cutoff_frequency: f64,
        resonance: f64,
    ) -> Result<(), JsValue> {
        let filter_type = parse_filter_type(filter_type)?;
        self.engine.set_filter(&FilterSettings {
            filter_type,
            cutoff_frequency,
            resonance,
        });
        Ok(())
    }

    pub fn set_envelope(&mut self, attack: f64, decay: f64, sustain: f64, release: f64) {
        self.engine.set_envelope(&EnvelopeSettings {
            attack,
            decay,
            sustain,
            release,
        });
    }

    pub fn set_delay(&mut self, time: f64, feedback: f64) {
        self.engine.set_delay(&DelaySettings { time, feedback });
    }

    pub fn set_reverb(&mut self, room_size: f64, damping: f64) {
        self.engine.set_reverb(&ReverbSettings { room_size, damping });
    }

    /// Fill a stereo pair of output buffers with the next block of audio.
    /// Slices must be the same length; the shorter one wins if they differ.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.engine.process_block(left, right);
    }

    /// Begin capturing the master output. Errors if already capturing.
    pub fn start_capture(&mut self) -> Result<(), JsValue> {
        self.engine
            .start_capture()
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    /// Stop capturing and return the recording as WAV bytes.
    pub fn stop_capture(&mut self) -> Result<Vec<u8>, JsValue> {
        self.engine
            .stop_capture()
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    pub fn is_capturing(&self) -> bool {
        self.engine.is_capturing()
    }
}

fn parse_waveform(name: &str) -> Result<Waveform, JsValue> {
    match name {
        "sine" => Ok(Waveform::Sine),
        "square" => Ok(Waveform::Square),
        "sawtooth" => Ok(Waveform::Sawtooth),
        "triangle" => Ok(Waveform::Triangle),
        other => Err(JsValue::from_str(&format!("unknown waveform: {other}"))),
    }
}

fn parse_filter_type(name: &str) -> Result<FilterType, JsValue> {
    match name {
        "lowpass" => Ok(FilterType::Lowpass),
        "highpass" => Ok(FilterType::Highpass),
        "bandpass" => Ok(FilterType::Bandpass),
        other => Err(JsValue::from_str(&format!("unknown filter type: {other}"))),
    }
}
