//! Pure Rust audio synthesis and processing.
//!
//! All DSP runs in Rust for deterministic, cross-platform audio output.
//! The same code powers the browser build (via AudioWorklet + WASM) and
//! the native playback monitor.

pub mod delay;
pub mod engine;
pub mod envelope;
pub mod filter;
pub mod mixer;
pub mod oscillator;
pub mod recorder;
pub mod reverb;
pub mod voice;
