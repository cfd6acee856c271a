//! Realtime polyphonic voice pool with a master effects bus.
//!
//! The engine renders blocks on demand: voices are summed through the mixer,
//! the mono mix runs through the master filter, then the delay and reverb
//! buses produce the stereo output. A capture recorder taps the final output
//! so exported WAV files contain exactly what was heard.

use crate::error::CaptureError;
use crate::params::{
    DelaySettings, EnvelopeSettings, FilterSettings, OscillatorSettings, ReverbSettings,
    SynthSettings,
};

use super::delay::Delay;
use super::filter::BiquadFilter;
use super::mixer::Mixer;
use super::recorder::Recorder;
use super::reverb::Reverb;
use super::voice::Voice;

/// A4 reference frequency in Hz.
const TUNING_PITCH: f64 = 440.0;
/// Wet mix for the delay bus.
const DELAY_MIX: f64 = 0.35;
/// Wet mix for the reverb bus.
const REVERB_MIX: f64 = 0.3;
/// Longest delay time the bus supports, in seconds.
const MAX_DELAY_SECONDS: f64 = 1.0;
/// Voice pool ceiling. Beyond this, new notes steal the quietest voice.
const MAX_VOICES: usize = 64;

/// Convert a MIDI note number to frequency (12-TET, A4 = 440 Hz).
///
/// Values above 127 are treated as 127.
pub fn midi_to_frequency(pitch: u8) -> f64 {
    let midi = pitch.min(127);
    TUNING_PITCH * (2.0_f64).powf((midi as f64 - 69.0) / 12.0)
}

/// The realtime synthesizer engine.
pub struct SynthEngine {
    sample_rate: f64,
    settings: SynthSettings,
    voices: Vec<Voice>,
    max_voices: usize,
    mixer: Mixer,
    filter: BiquadFilter,
    delay: Delay,
    reverb: Reverb,
    recorder: Recorder,
    running: bool,
}

impl SynthEngine {
    pub fn new(sample_rate: f64) -> Self {
        let defaults = SynthSettings::default();
        let mut engine = SynthEngine {
            sample_rate,
            settings: defaults.clone(),
            voices: Vec::new(),
            max_voices: MAX_VOICES,
            mixer: Mixer::new(),
            filter: BiquadFilter::new(
                defaults.filter.filter_type,
                defaults.filter.cutoff_frequency,
                defaults.filter.resonance,
                sample_rate,
            ),
            delay: Delay::new(sample_rate, MAX_DELAY_SECONDS),
            reverb: Reverb::new(sample_rate),
            recorder: Recorder::new(sample_rate),
            running: false,
        };
        engine.delay.mix = DELAY_MIX;
        engine.reverb.mix = REVERB_MIX;
        engine.apply_settings(&defaults);
        engine
    }

    /// Mark the engine as producing audio. Idempotent.
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// The current settings, as clamped by the setters.
    pub fn settings(&self) -> &SynthSettings {
        &self.settings
    }

    /// Apply a full settings document.
    pub fn apply_settings(&mut self, settings: &SynthSettings) {
        self.set_oscillator(&settings.oscillator);
        self.set_envelope(&settings.envelope);
        self.set_filter(&settings.filter);
        self.set_delay(&settings.effects.delay);
        self.set_reverb(&settings.effects.reverb);
    }

    /// Set oscillator parameters. Live voices pick them up immediately.
    pub fn set_oscillator(&mut self, settings: &OscillatorSettings) {
        let clamped = settings.clamped();
        self.settings.oscillator = clamped;
        for voice in &mut self.voices {
            voice.apply_oscillator(&clamped);
        }
    }

    /// Set envelope parameters. Live voices pick them up immediately.
    pub fn set_envelope(&mut self, settings: &EnvelopeSettings) {
        let clamped = settings.clamped();
        self.settings.envelope = clamped;
        for voice in &mut self.voices {
            voice.apply_envelope(&clamped);
        }
    }

    /// Set master filter parameters.
    pub fn set_filter(&mut self, settings: &FilterSettings) {
        let clamped = settings.clamped();
        self.settings.filter = clamped;
        self.filter.set_type(clamped.filter_type);
        self.filter.set_frequency(clamped.cutoff_frequency);
        self.filter.set_q(clamped.resonance);
    }

    /// Set delay bus parameters.
    pub fn set_delay(&mut self, settings: &DelaySettings) {
        let clamped = settings.clamped();
        self.settings.effects.delay = clamped;
        self.delay.set_time(clamped.time);
        self.delay.set_feedback(clamped.feedback);
    }

    /// Set reverb bus parameters.
    pub fn set_reverb(&mut self, settings: &ReverbSettings) {
        let clamped = settings.clamped();
        self.settings.effects.reverb = clamped;
        self.reverb.room_size = clamped.room_size;
        self.reverb.damping = clamped.damping;
        self.reverb.update_parameters();
    }

    /// Press a key. Re-pressing a sounding pitch retriggers its voice
    /// instead of stacking a duplicate.
    pub fn note_on(&mut self, pitch: u8) {
        let pitch = pitch.min(127);

        if let Some(voice) = self
            .voices
            .iter_mut()
            .find(|v| v.pitch == pitch && !v.is_finished())
        {
            voice.retrigger();
            return;
        }

        let mut voice = Voice::new(self.sample_rate);
        voice.apply_oscillator(&self.settings.oscillator);
        voice.apply_envelope(&self.settings.envelope);
        voice.note_on(pitch, midi_to_frequency(pitch));

        if self.voices.len() < self.max_voices {
            self.voices.push(voice);
        } else if let Some(quietest) = self
            .voices
            .iter_mut()
            .min_by(|a, b| a.level().total_cmp(&b.level()))
        {
            *quietest = voice;
        }
    }

    /// Release a key. Unknown pitches are ignored.
    pub fn note_off(&mut self, pitch: u8) {
        let pitch = pitch.min(127);
        for voice in &mut self.voices {
            if voice.pitch == pitch {
                voice.note_off();
            }
        }
    }

    /// Number of voices still sounding.
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_finished()).count()
    }

    /// Begin capturing the engine output.
    pub fn start_capture(&mut self) -> Result<(), CaptureError> {
        self.recorder.start()
    }

    /// Finish capturing and return the WAV bytes.
    pub fn stop_capture(&mut self) -> Result<Vec<u8>, CaptureError> {
        self.recorder.stop()
    }

    pub fn is_capturing(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Render one block of stereo output.
    ///
    /// Before `start` the engine emits silence and voices stay frozen.
    /// The recorder always taps the produced output, so a capture spanning
    /// a stopped engine contains the silence that was heard.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());

        if !self.running {
            left[..frames].fill(0.0);
            right[..frames].fill(0.0);
            self.recorder.record_block(&left[..frames], &right[..frames]);
            return;
        }

        self.mixer.clear(frames);
        for voice in &mut self.voices {
            for i in 0..frames {
                let sample = voice.next_sample();
                self.mixer.add(i, sample);
            }
        }
        self.voices.retain(|v| !v.is_finished());

        for i in 0..frames {
            let mono = self.filter.process(self.mixer.sample(i)) as f32;
            let (l, r) = self.delay.process(mono, mono);
            let (l, r) = self.reverb.process(l, r);
            left[i] = l;
            right[i] = r;
        }

        self.recorder.record_block(&left[..frames], &right[..frames]);
    }
}
