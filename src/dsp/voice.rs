//! A single note instance combining oscillator + envelope.

use crate::params::{EnvelopeSettings, OscillatorSettings};

use super::envelope::Envelope;
use super::oscillator::{Oscillator, Waveform};

/// A single voice: one oscillator shaped by an ADSR envelope.
///
/// A voice is bound to a MIDI pitch while it sounds. The pool owner can
/// re-attack it (same pitch pressed again) without resetting the oscillator
/// phase, which keeps the retrigger click-free.
#[derive(Debug, Clone)]
pub struct Voice {
    pub oscillator: Oscillator,
    pub envelope: Envelope,
    /// MIDI pitch this voice is playing.
    pub pitch: u8,
    finished: bool,
}

impl Voice {
    pub fn new(sample_rate: f64) -> Self {
        Voice {
            oscillator: Oscillator::new(Waveform::Sine, sample_rate),
            envelope: Envelope::new(sample_rate),
            pitch: 0,
            finished: false,
        }
    }

    /// Apply oscillator settings without disturbing the running phase.
    pub fn apply_oscillator(&mut self, settings: &OscillatorSettings) {
        self.oscillator.waveform = settings.waveform;
        self.oscillator.detune = settings.detune;
    }

    /// Apply envelope timing/level settings.
    pub fn apply_envelope(&mut self, settings: &EnvelopeSettings) {
        self.envelope.attack = settings.attack;
        self.envelope.decay = settings.decay;
        self.envelope.sustain = settings.sustain;
        self.envelope.release = settings.release;
    }

    /// Start playing a note from a clean phase.
    pub fn note_on(&mut self, pitch: u8, frequency: f64) {
        self.pitch = pitch;
        self.oscillator.frequency = frequency;
        self.oscillator.reset();
        self.finished = false;
        self.envelope.gate_on();
    }

    /// Re-attack a voice that is already sounding this pitch.
    ///
    /// The envelope restarts from its current level and the oscillator
    /// keeps its phase.
    pub fn retrigger(&mut self) {
        self.finished = false;
        self.envelope.gate_on();
    }

    /// Release the note.
    pub fn note_off(&mut self) {
        self.envelope.gate_off();
    }

    /// Generate the next sample.
    pub fn next_sample(&mut self) -> f64 {
        if self.finished {
            return 0.0;
        }

        let osc = self.oscillator.next_sample();
        let env = self.envelope.next_sample();

        if self.envelope.is_finished() {
            self.finished = true;
        }

        osc * env
    }

    /// Is this voice done (envelope finished)?
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Current envelope level, used for quietest-voice stealing.
    pub fn level(&self) -> f64 {
        self.envelope.level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_produces_sound() {
        let mut v = Voice::new(44100.0);
        v.note_on(69, 440.0);

        let mut has_nonzero = false;
        for _ in 0..4410 {
            let s = v.next_sample();
            if s.abs() > 0.001 {
                has_nonzero = true;
            }
        }
        assert!(has_nonzero, "Voice should produce non-zero output");
    }

    #[test]
    fn voice_silent_after_release() {
        let mut v = Voice::new(44100.0);
        v.envelope.attack = 0.001;
        v.envelope.decay = 0.001;
        v.envelope.sustain = 0.5;
        v.envelope.release = 0.01;

        v.note_on(69, 440.0);

        // Let it play for a bit
        for _ in 0..500 {
            v.next_sample();
        }

        v.note_off();

        // Run through release
        for _ in 0..2000 {
            v.next_sample();
        }

        assert!(v.is_finished(), "Voice should be finished after release");
        let s = v.next_sample();
        assert!(s.abs() < 0.001, "Voice should be silent, got {s}");
    }

    #[test]
    fn voice_output_range() {
        let mut v = Voice::new(44100.0);
        v.note_on(81, 880.0);

        for _ in 0..44100 {
            let s = v.next_sample();
            assert!(
                s.abs() <= 1.01,
                "Voice output should be within [-1, 1], got {s}"
            );
        }
    }

    #[test]
    fn retrigger_keeps_voice_sounding() {
        let mut v = Voice::new(44100.0);
        v.envelope.attack = 0.001;
        v.envelope.decay = 0.01;
        v.envelope.sustain = 0.6;
        v.note_on(60, 261.63);

        for _ in 0..1000 {
            v.next_sample();
        }

        v.retrigger();
        assert_eq!(v.pitch, 60);
        assert!(!v.is_finished());

        let mut has_nonzero = false;
        for _ in 0..1000 {
            if v.next_sample().abs() > 0.001 {
                has_nonzero = true;
            }
        }
        assert!(has_nonzero, "Retriggered voice should keep sounding");
    }

    #[test]
    fn settings_apply_to_running_voice() {
        let mut v = Voice::new(44100.0);
        v.note_on(69, 440.0);
        for _ in 0..100 {
            v.next_sample();
        }

        v.apply_oscillator(&OscillatorSettings {
            waveform: Waveform::Square,
            detune: 25.0,
        });
        v.apply_envelope(&EnvelopeSettings {
            attack: 0.2,
            decay: 0.3,
            sustain: 0.4,
            release: 0.5,
        });

        assert_eq!(v.oscillator.waveform, Waveform::Square);
        assert_eq!(v.oscillator.detune, 25.0);
        assert_eq!(v.envelope.sustain, 0.4);
        assert!(!v.is_finished(), "Applying settings should not kill the voice");
    }
}
