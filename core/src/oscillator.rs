use std::f32::consts::PI;

/// Phase-accumulating sine oscillator. The frequency is supplied on every sample so changes to it
/// take effect immediately without a discontinuity in phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sine {
    state_01: f32,
}

impl Sine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_phase_01(phase_01: f32) -> Self {
        Self {
            state_01: phase_01 - phase_01.floor(),
        }
    }

    pub fn phase_01(&self) -> f32 {
        self.state_01
    }

    /// Returns the value at the current phase, then advances the phase by one sample.
    pub fn sample(&mut self, freq_hz: f32, sample_rate_hz: f32) -> f32 {
        let sample = (self.state_01 * PI * 2.0).sin();
        self.state_01 += freq_hz / sample_rate_hz;
        self.state_01 -= self.state_01.floor();
        sample
    }
}
