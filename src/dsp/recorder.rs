//! Capture recorder: buffers engine output and exports it as WAV bytes.

use crate::error::CaptureError;

const CHANNELS: u16 = 2;

/// Captures rendered stereo audio between `start` and `stop`.
///
/// The recorder taps the engine's output block by block. While idle it
/// ignores incoming audio; while recording it accumulates interleaved
/// samples, and `stop` finalizes them into a complete in-memory WAV file
/// (44-byte header + 16-bit PCM data).
#[derive(Debug, Clone)]
pub struct Recorder {
    sample_rate: u32,
    session: Option<CaptureSession>,
}

#[derive(Debug, Clone)]
struct CaptureSession {
    /// Interleaved stereo samples (L, R, L, R, ...).
    samples: Vec<f32>,
}

impl Recorder {
    pub fn new(sample_rate: f64) -> Self {
        Recorder {
            sample_rate: sample_rate as u32,
            session: None,
        }
    }

    /// Begin a capture session. Fails if one is already in progress.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.session.is_some() {
            return Err(CaptureError::AlreadyRecording);
        }
        self.session = Some(CaptureSession {
            samples: Vec::new(),
        });
        Ok(())
    }

    /// End the capture session and return the finished WAV file.
    pub fn stop(&mut self) -> Result<Vec<u8>, CaptureError> {
        let session = self.session.take().ok_or(CaptureError::NotRecording)?;
        let pcm = to_pcm_i16(&session.samples);
        Ok(encode_wav(&pcm, self.sample_rate, CHANNELS))
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Number of stereo frames captured so far.
    pub fn recorded_frames(&self) -> usize {
        match &self.session {
            Some(session) => session.samples.len() / CHANNELS as usize,
            None => 0,
        }
    }

    /// Append a rendered block. No-op while idle.
    pub fn record_block(&mut self, left: &[f32], right: &[f32]) {
        if let Some(session) = &mut self.session {
            let frames = left.len().min(right.len());
            session.samples.reserve(frames * CHANNELS as usize);
            for i in 0..frames {
                session.samples.push(left[i]);
                session.samples.push(right[i]);
            }
        }
    }
}

/// Convert float samples to i16, clamping anything outside [-1, 1].
fn to_pcm_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s as f64 * 32767.0).round().clamp(-32768.0, 32767.0) as i16)
        .collect()
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
pub fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_header_valid() {
        let mut rec = Recorder::new(44100.0);
        rec.start().unwrap();
        rec.record_block(&[0.0; 64], &[0.0; 64]);
        rec.record_block(&[0.0; 64], &[0.0; 64]);
        let wav = rec.stop().unwrap();

        // Check RIFF header
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");

        // Check sample rate
        let sr = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(sr, 44100);

        // Check channels
        let ch = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(ch, 2);

        // 128 frames * 2 channels * 2 bytes
        assert_eq!(wav.len(), 44 + 128 * 4);
    }

    #[test]
    fn one_second_of_silence_sizes_correctly() {
        let mut rec = Recorder::new(44100.0);
        rec.start().unwrap();
        let silence = vec![0.0f32; 44100];
        rec.record_block(&silence, &silence);
        let wav = rec.stop().unwrap();

        // 44100 frames * 2 channels * 2 bytes = 176400 data bytes
        let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_size, 176400);
        assert_eq!(wav.len(), 44 + 176400);
        assert!(wav[44..].iter().all(|&b| b == 0), "Silence should encode as zeros");
    }

    #[test]
    fn stop_without_start_is_rejected() {
        let mut rec = Recorder::new(44100.0);
        assert_eq!(rec.stop(), Err(CaptureError::NotRecording));
    }

    #[test]
    fn second_start_is_rejected_and_session_survives() {
        let mut rec = Recorder::new(44100.0);
        rec.start().unwrap();
        rec.record_block(&[0.1; 32], &[0.1; 32]);
        assert_eq!(rec.recorded_frames(), 32);

        assert_eq!(rec.start(), Err(CaptureError::AlreadyRecording));
        assert_eq!(rec.recorded_frames(), 32, "Failed start must not reset the session");

        rec.record_block(&[0.1; 32], &[0.1; 32]);
        assert_eq!(rec.recorded_frames(), 64);
    }

    #[test]
    fn interleaves_left_then_right() {
        let mut rec = Recorder::new(44100.0);
        rec.start().unwrap();
        rec.record_block(&[0.5], &[-0.5]);
        let wav = rec.stop().unwrap();

        let first = i16::from_le_bytes([wav[44], wav[45]]);
        let second = i16::from_le_bytes([wav[46], wav[47]]);
        assert_eq!(first, 16384, "Left sample first");
        assert_eq!(second, -16384, "Right sample second");
    }

    #[test]
    fn clamps_out_of_range_samples() {
        let mut rec = Recorder::new(44100.0);
        rec.start().unwrap();
        rec.record_block(&[1.0, 2.0, -2.0], &[0.0, 0.0, 0.0]);
        let wav = rec.stop().unwrap();

        let full = i16::from_le_bytes([wav[44], wav[45]]);
        let over = i16::from_le_bytes([wav[48], wav[49]]);
        let under = i16::from_le_bytes([wav[52], wav[53]]);
        assert_eq!(full, 32767);
        assert_eq!(over, 32767);
        assert_eq!(under, -32768);
    }

    #[test]
    fn mismatched_block_lengths_take_shorter() {
        let mut rec = Recorder::new(44100.0);
        rec.start().unwrap();
        rec.record_block(&[0.1, 0.2, 0.3], &[0.1, 0.2]);
        assert_eq!(rec.recorded_frames(), 2);
    }
}
