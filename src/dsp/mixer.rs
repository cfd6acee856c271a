//! Sums multiple voice outputs with master gain.

/// A simple summing mixer that accumulates audio from multiple sources.
#[derive(Debug, Clone)]
pub struct Mixer {
    pub master_gain: f64,
    buffer: Vec<f64>,
}

impl Mixer {
    pub fn new() -> Self {
        Mixer {
            master_gain: 0.8,
            buffer: Vec::new(),
        }
    }

    /// Prepare a buffer of `num_samples` filled with zeros.
    pub fn clear(&mut self, num_samples: usize) {
        self.buffer.clear();
        self.buffer.resize(num_samples, 0.0);
    }

    /// Add a sample at the given index.
    pub fn add(&mut self, index: usize, sample: f64) {
        if index < self.buffer.len() {
            self.buffer[index] += sample;
        }
    }

    /// Read the mixed sample at `index`, with master gain and soft clipping
    /// applied. Out-of-range reads are silent.
    pub fn sample(&self, index: usize) -> f64 {
        match self.buffer.get(index) {
            Some(&s) => soft_clip(s * self.master_gain),
            None => 0.0,
        }
    }

    /// Number of samples in the current buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Is the buffer empty?
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

/// Soft clipper using tanh to prevent harsh digital clipping.
fn soft_clip(x: f64) -> f64 {
    x.tanh()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer() {
        let mut m = Mixer::new();
        m.clear(128);
        assert_eq!(m.len(), 128);
        assert!((0..128).all(|i| m.sample(i) == 0.0));
    }

    #[test]
    fn accumulates_samples() {
        let mut m = Mixer::new();
        m.master_gain = 1.0;
        m.clear(4);
        m.add(0, 0.5);
        m.add(0, 0.3);
        m.add(1, 1.0);
        assert!((m.sample(0) - soft_clip(0.8)).abs() < 1e-10);
        assert!((m.sample(1) - soft_clip(1.0)).abs() < 1e-10);
        assert!((m.sample(2) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn out_of_range_read_is_silent() {
        let mut m = Mixer::new();
        m.clear(2);
        m.add(0, 0.5);
        m.add(7, 0.5); // ignored
        assert_eq!(m.sample(7), 0.0);
    }

    #[test]
    fn soft_clip_prevents_overflow() {
        let mut m = Mixer::new();
        m.master_gain = 1.0;
        m.clear(1);
        m.add(0, 100.0);
        assert!(
            m.sample(0).abs() <= 1.0,
            "Soft clip should keep output <= 1.0, got {}",
            m.sample(0)
        );
    }
}
