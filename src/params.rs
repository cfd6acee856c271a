//! Synthesizer settings: the typed parameter tree shared by the UI,
//! the engine, and the preset store.
//!
//! Nesting and field names match the JSON settings document saved with
//! each preset, so a settings object round-trips through `serde_json`
//! unchanged. Deserialization never clamps; `clamped()` runs when a
//! subtree is applied to the engine, keeping all range enforcement in
//! one place.

use serde::{Deserialize, Serialize};

use crate::dsp::filter::FilterType;
use crate::dsp::oscillator::Waveform;

/// Complete synthesizer state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthSettings {
    pub oscillator: OscillatorSettings,
    pub filter: FilterSettings,
    pub envelope: EnvelopeSettings,
    pub effects: EffectSettings,
}

/// Oscillator section: waveform shape plus detune.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OscillatorSettings {
    pub waveform: Waveform,
    /// Detune in cents.
    pub detune: f64,
}

/// Filter section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    /// Cutoff frequency in Hz.
    #[serde(rename = "cutoffFrequency")]
    pub cutoff_frequency: f64,
    /// Filter Q.
    pub resonance: f64,
}

/// ADSR amplitude envelope. Times are seconds, sustain is a level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeSettings {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

/// Master effects section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSettings {
    pub delay: DelaySettings,
    pub reverb: ReverbSettings,
}

/// Feedback delay parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelaySettings {
    /// Delay time in seconds.
    pub time: f64,
    /// Feedback gain. Held strictly below 1 so echoes always decay.
    pub feedback: f64,
}

/// Reverb parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReverbSettings {
    #[serde(rename = "roomSize")]
    pub room_size: f64,
    /// Comb feedback lowpass coefficient, a [0, 1] ratio. Higher is darker.
    pub damping: f64,
}

impl Default for SynthSettings {
    fn default() -> Self {
        Self {
            oscillator: OscillatorSettings::default(),
            filter: FilterSettings::default(),
            envelope: EnvelopeSettings::default(),
            effects: EffectSettings::default(),
        }
    }
}

impl Default for OscillatorSettings {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            detune: 0.0,
        }
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            filter_type: FilterType::Lowpass,
            cutoff_frequency: 1000.0,
            resonance: 1.0,
        }
    }
}

impl Default for EnvelopeSettings {
    fn default() -> Self {
        Self {
            attack: 0.1,
            decay: 0.2,
            sustain: 0.5,
            release: 0.5,
        }
    }
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            delay: DelaySettings::default(),
            reverb: ReverbSettings::default(),
        }
    }
}

impl Default for DelaySettings {
    fn default() -> Self {
        Self {
            time: 0.3,
            feedback: 0.3,
        }
    }
}

impl Default for ReverbSettings {
    fn default() -> Self {
        Self {
            room_size: 0.5,
            damping: 0.5,
        }
    }
}

impl SynthSettings {
    /// Copy with every field forced into its documented range.
    pub fn clamped(&self) -> Self {
        Self {
            oscillator: self.oscillator.clamped(),
            filter: self.filter.clamped(),
            envelope: self.envelope.clamped(),
            effects: EffectSettings {
                delay: self.effects.delay.clamped(),
                reverb: self.effects.reverb.clamped(),
            },
        }
    }
}

impl OscillatorSettings {
    pub const DETUNE_MIN: f64 = -100.0;
    pub const DETUNE_MAX: f64 = 100.0;

    pub fn clamped(&self) -> Self {
        Self {
            waveform: self.waveform,
            detune: self.detune.clamp(Self::DETUNE_MIN, Self::DETUNE_MAX),
        }
    }
}

impl FilterSettings {
    pub const CUTOFF_MIN_HZ: f64 = 20.0;
    pub const CUTOFF_MAX_HZ: f64 = 20_000.0;
    /// Zero or negative Q makes the biquad coefficients degenerate, so
    /// resonance is floored at a small positive epsilon.
    pub const RESONANCE_MIN: f64 = 1e-4;
    pub const RESONANCE_MAX: f64 = 20.0;

    pub fn clamped(&self) -> Self {
        Self {
            filter_type: self.filter_type,
            cutoff_frequency: self
                .cutoff_frequency
                .clamp(Self::CUTOFF_MIN_HZ, Self::CUTOFF_MAX_HZ),
            resonance: self.resonance.clamp(Self::RESONANCE_MIN, Self::RESONANCE_MAX),
        }
    }
}

impl EnvelopeSettings {
    /// Zero-length ramps are undefined for the envelope; stage times
    /// round up to this minimum.
    pub const MIN_STAGE_SECONDS: f64 = 0.001;

    pub fn clamped(&self) -> Self {
        Self {
            attack: self.attack.max(Self::MIN_STAGE_SECONDS),
            decay: self.decay.max(Self::MIN_STAGE_SECONDS),
            sustain: self.sustain.clamp(0.0, 1.0),
            release: self.release.max(Self::MIN_STAGE_SECONDS),
        }
    }
}

impl DelaySettings {
    pub const MAX_TIME_SECONDS: f64 = 1.0;
    pub const MAX_FEEDBACK: f64 = 0.9;

    pub fn clamped(&self) -> Self {
        Self {
            time: self.time.clamp(0.0, Self::MAX_TIME_SECONDS),
            feedback: self.feedback.clamp(0.0, Self::MAX_FEEDBACK),
        }
    }
}

impl ReverbSettings {
    pub const MAX_ROOM_SIZE: f64 = 0.9;

    /// Legacy patches stored damping as a cutoff in Hz; anything past 1
    /// clamps to full damping rather than wrapping into nonsense.
    pub fn clamped(&self) -> Self {
        Self {
            room_size: self.room_size.clamp(0.0, Self::MAX_ROOM_SIZE),
            damping: self.damping.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_in_range() {
        let s = SynthSettings::default();
        assert_eq!(s.clamped(), s);
    }

    #[test]
    fn settings_roundtrip() {
        let settings = SynthSettings {
            oscillator: OscillatorSettings {
                waveform: Waveform::Sawtooth,
                detune: 7.5,
            },
            filter: FilterSettings {
                filter_type: FilterType::Bandpass,
                cutoff_frequency: 2500.0,
                resonance: 4.0,
            },
            envelope: EnvelopeSettings {
                attack: 0.02,
                decay: 0.15,
                sustain: 0.8,
                release: 1.2,
            },
            effects: EffectSettings {
                delay: DelaySettings {
                    time: 0.25,
                    feedback: 0.45,
                },
                reverb: ReverbSettings {
                    room_size: 0.7,
                    damping: 0.3,
                },
            },
        };

        let json = serde_json::to_string(&settings).unwrap();
        let deserialized: SynthSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, settings);
    }

    #[test]
    fn wire_field_names() {
        let json = serde_json::to_string(&SynthSettings::default()).unwrap();
        assert!(json.contains("\"waveform\":\"sine\""));
        assert!(json.contains("\"type\":\"lowpass\""));
        assert!(json.contains("\"cutoffFrequency\""));
        assert!(json.contains("\"roomSize\""));
        assert!(!json.contains("filter_type"), "rust field names must not leak: {json}");
    }

    #[test]
    fn parses_ui_document() {
        let json = r#"{
            "oscillator": { "waveform": "square", "detune": -12.0 },
            "filter": { "type": "highpass", "cutoffFrequency": 800.0, "resonance": 2.0 },
            "envelope": { "attack": 0.1, "decay": 0.2, "sustain": 0.5, "release": 0.5 },
            "effects": {
                "delay": { "time": 0.3, "feedback": 0.3 },
                "reverb": { "roomSize": 0.5, "damping": 0.5 }
            }
        }"#;

        let s: SynthSettings = serde_json::from_str(json).unwrap();
        assert_eq!(s.oscillator.waveform, Waveform::Square);
        assert_eq!(s.filter.filter_type, FilterType::Highpass);
        assert!((s.filter.cutoff_frequency - 800.0).abs() < 1e-9);
    }

    #[test]
    fn missing_section_is_an_error() {
        let json = r#"{ "oscillator": { "waveform": "sine", "detune": 0.0 } }"#;
        assert!(serde_json::from_str::<SynthSettings>(json).is_err());
    }

    #[test]
    fn detune_clamps_to_bounds() {
        let high = OscillatorSettings {
            waveform: Waveform::Square,
            detune: 500.0,
        };
        assert_eq!(high.clamped().detune, 100.0);

        let low = OscillatorSettings {
            waveform: Waveform::Square,
            detune: -500.0,
        };
        assert_eq!(low.clamped().detune, -100.0);
    }

    #[test]
    fn feedback_stays_below_unity() {
        let d = DelaySettings {
            time: 0.3,
            feedback: 1.5,
        };
        let c = d.clamped();
        assert!(c.feedback < 1.0);
        assert_eq!(c.feedback, DelaySettings::MAX_FEEDBACK);
    }

    #[test]
    fn degenerate_filter_values_clamp_up() {
        let f = FilterSettings {
            filter_type: FilterType::Lowpass,
            cutoff_frequency: 0.0,
            resonance: -3.0,
        };
        let c = f.clamped();
        assert_eq!(c.cutoff_frequency, FilterSettings::CUTOFF_MIN_HZ);
        assert!(c.resonance > 0.0);
    }

    #[test]
    fn zero_envelope_times_round_up() {
        let e = EnvelopeSettings {
            attack: 0.0,
            decay: 0.0,
            sustain: 2.0,
            release: -1.0,
        };
        let c = e.clamped();
        assert_eq!(c.attack, EnvelopeSettings::MIN_STAGE_SECONDS);
        assert_eq!(c.decay, EnvelopeSettings::MIN_STAGE_SECONDS);
        assert_eq!(c.release, EnvelopeSettings::MIN_STAGE_SECONDS);
        assert_eq!(c.sustain, 1.0);
    }

    #[test]
    fn legacy_hz_damping_clamps_to_full() {
        let r = ReverbSettings {
            room_size: 0.5,
            damping: 3000.0,
        };
        assert_eq!(r.clamped().damping, 1.0);
    }
}
