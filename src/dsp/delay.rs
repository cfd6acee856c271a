//! Stereo delay line with feedback and mix control.

/// A stereo delay effect with configurable time, feedback, and dry/wet mix.
///
/// The delay buffer holds up to `max_delay_seconds` of audio at the given
/// sample rate. The delay time can be changed while running.
#[derive(Debug, Clone)]
pub struct Delay {
    buffer_l: Vec<f32>,
    buffer_r: Vec<f32>,
    write_pos: usize,
    sample_rate: f64,
    max_delay: f64,

    /// Delay time in seconds.
    pub time: f64,
    /// Feedback amount (0.0 = single echo, approaching 1.0 = near-infinite).
    pub feedback: f64,
    /// Dry/wet mix (0.0 = fully dry, 1.0 = fully wet).
    pub mix: f64,
}

impl Delay {
    /// Create a new delay effect.
    ///
    /// # Arguments
    /// - `sample_rate`: Audio sample rate in Hz.
    /// - `max_delay_seconds`: Maximum supported delay time.
    pub fn new(sample_rate: f64, max_delay_seconds: f64) -> Self {
        let buffer_size = (sample_rate * max_delay_seconds) as usize + 1;
        Self {
            buffer_l: vec![0.0; buffer_size],
            buffer_r: vec![0.0; buffer_size],
            write_pos: 0,
            sample_rate,
            max_delay: max_delay_seconds,
            time: 0.3,
            feedback: 0.3,
            mix: 0.5,
        }
    }

    /// Create a delay with specific parameters.
    pub fn with_params(
        sample_rate: f64,
        max_delay_seconds: f64,
        time: f64,
        feedback: f64,
        mix: f64,
    ) -> Self {
        let mut d = Self::new(sample_rate, max_delay_seconds);
        d.set_time(time);
        d.set_feedback(feedback);
        d.mix = mix.clamp(0.0, 1.0);
        d
    }

    /// Set the delay time, clamped to the buffer capacity.
    pub fn set_time(&mut self, time: f64) {
        self.time = time.clamp(0.0, self.max_delay);
    }

    /// Set the feedback amount, kept below unity so echoes always decay.
    pub fn set_feedback(&mut self, feedback: f64) {
        self.feedback = feedback.clamp(0.0, 0.99);
    }

    /// Process a stereo sample pair, returning the processed output.
    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        let buffer_len = self.buffer_l.len();
        let delay_samples = (self.time * self.sample_rate) as usize;
        let delay_samples = delay_samples.min(buffer_len - 1);

        let read_pos = (self.write_pos + buffer_len - delay_samples) % buffer_len;

        let delayed_l = self.buffer_l[read_pos];
        let delayed_r = self.buffer_r[read_pos];

        // Write input + feedback to buffer
        self.buffer_l[self.write_pos] = left + delayed_l * self.feedback as f32;
        self.buffer_r[self.write_pos] = right + delayed_r * self.feedback as f32;

        self.write_pos = (self.write_pos + 1) % buffer_len;

        // Mix dry/wet
        let mix = self.mix as f32;
        let out_l = left * (1.0 - mix) + delayed_l * mix;
        let out_r = right * (1.0 - mix) + delayed_r * mix;

        (out_l, out_r)
    }

    /// Process a block of stereo audio in-place.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        for i in 0..left.len().min(right.len()) {
            let (out_l, out_r) = self.process(left[i], right[i]);
            left[i] = out_l;
            right[i] = out_r;
        }
    }

    /// Clear the delay buffers.
    pub fn clear(&mut self) {
        self.buffer_l.fill(0.0);
        self.buffer_r.fill(0.0);
        self.write_pos = 0;
    }
}
