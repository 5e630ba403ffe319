use crate::{buffers::XyBuffers, oscillator::Sine, params::Params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Visualize the stereo input signal.
    #[default]
    External,
    /// Visualize a pair of sine oscillators.
    Internal,
}

impl SourceMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::External => Self::Internal,
            Self::Internal => Self::External,
        }
    }
}

/// The result of processing one elementary audio frame. The output pair is scaled by the output
/// volume and goes to the audio device. The display pair is scaled by the display scale and goes
/// to the scope buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub output: (f32, f32),
    pub display: (f32, f32),
}

/// Chooses where each sample pair comes from and applies the output and display gains.
#[derive(Debug, Clone, Default)]
pub struct SourceSelector {
    osc_a: Sine,
    osc_b: Sine,
}

impl SourceSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the pair for a single frame. The oscillators only advance while the internal
    /// source is selected.
    pub fn frame(
        &mut self,
        params: &Params,
        input: (f32, f32),
        sample_rate_hz: f32,
    ) -> Frame {
        let (left, right) = match params.source {
            SourceMode::External => input,
            SourceMode::Internal => (
                self.osc_a.sample(params.base_freq_hz, sample_rate_hz),
                self.osc_b
                    .sample(params.base_freq_hz * params.ratio, sample_rate_hz),
            ),
        };
        Frame {
            output: (left * params.output_volume, right * params.output_volume),
            display: (left * params.display_scale, right * params.display_scale),
        }
    }

    /// Process one interleaved block. The number of frames is determined by the output block.
    /// Input frames beyond the end of `input` read as silence, a mono input is duplicated onto
    /// both axes, and output channels after the first two are silenced. Every frame pushes one
    /// pair into `buffers`. Doesn't allocate or lock.
    #[allow(clippy::too_many_arguments)]
    pub fn process_block(
        &mut self,
        params: &Params,
        sample_rate_hz: f32,
        input: &[f32],
        in_channels: usize,
        output: &mut [f32],
        out_channels: usize,
        buffers: &XyBuffers,
    ) {
        if out_channels == 0 {
            return;
        }
        for (i, out_frame) in output.chunks_mut(out_channels).enumerate() {
            let input_pair = input_pair(input, in_channels, i);
            let Frame { output, display } =
                self.frame(params, input_pair, sample_rate_hz);
            buffers.push_pair(display.0, display.1);
            write_output_frame(out_frame, output);
        }
    }

    /// Like `process_block` but for callers whose input is delivered as an iterator of pairs,
    /// such as an `InputTap`.
    pub fn process_block_with<I>(
        &mut self,
        params: &Params,
        sample_rate_hz: f32,
        mut input: I,
        output: &mut [f32],
        out_channels: usize,
        buffers: &XyBuffers,
    ) where
        I: FnMut() -> (f32, f32),
    {
        if out_channels == 0 {
            return;
        }
        for out_frame in output.chunks_mut(out_channels) {
            // Pulled in both modes so a capture cursor stays level with the live input.
            let input_pair = input();
            let Frame { output, display } =
                self.frame(params, input_pair, sample_rate_hz);
            buffers.push_pair(display.0, display.1);
            write_output_frame(out_frame, output);
        }
    }
}

fn input_pair(input: &[f32], in_channels: usize, frame_index: usize) -> (f32, f32) {
    if in_channels == 0 {
        return (0.0, 0.0);
    }
    let base = frame_index * in_channels;
    let left = input.get(base).copied().unwrap_or(0.0);
    let right = if in_channels == 1 {
        left
    } else {
        input.get(base + 1).copied().unwrap_or(0.0)
    };
    (left, right)
}

fn write_output_frame(out_frame: &mut [f32], (left, right): (f32, f32)) {
    for (channel, sample) in out_frame.iter_mut().enumerate() {
        *sample = match channel {
            0 => left,
            1 => right,
            _ => 0.0,
        };
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tap::InputTap;
    use std::{num::NonZeroUsize, sync::Arc};

    fn buffers(capacity: usize) -> XyBuffers {
        XyBuffers::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn external_applies_separate_gains() {
        let params = Params {
            output_volume: 0.5,
            display_scale: 0.25,
            ..Params::default()
        };
        let mut selector = SourceSelector::new();
        let frame = selector.frame(&params, (1.0, -1.0), 48_000.0);
        assert_eq!(frame.output, (0.5, -0.5));
        assert_eq!(frame.display, (0.25, -0.25));
    }

    #[test]
    fn internal_uses_ratio_for_second_oscillator() {
        let params = Params {
            source: SourceMode::Internal,
            base_freq_hz: 1.0,
            ratio: 2.0,
            display_scale: 1.0,
            output_volume: 1.0,
            ..Params::default()
        };
        let mut selector = SourceSelector::new();
        // At 8 samples per second, oscillator A advances by 1/8 of a cycle per sample and
        // oscillator B by 1/4.
        let frames = (0..3)
            .map(|_| selector.frame(&params, (9.0, 9.0), 8.0).display)
            .collect::<Vec<_>>();
        assert_eq!(frames[0], (0.0, 0.0));
        assert!((frames[1].0 - (std::f32::consts::FRAC_1_SQRT_2)).abs() < 1e-6);
        assert!((frames[1].1 - 1.0).abs() < 1e-6);
        assert!((frames[2].0 - 1.0).abs() < 1e-6);
        assert!(frames[2].1.abs() < 1e-6);
    }

    #[test]
    fn block_pushes_one_pair_per_frame() {
        let params = Params {
            output_volume: 1.0,
            display_scale: 0.5,
            ..Params::default()
        };
        let mut selector = SourceSelector::new();
        let buffers = buffers(16);
        let input = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut output = [7.0; 9];
        selector.process_block(&params, 48_000.0, &input, 2, &mut output, 3, &buffers);
        assert_eq!(output, [1.0, 2.0, 0.0, 3.0, 4.0, 0.0, 5.0, 6.0, 0.0]);
        assert_eq!(buffers.len(), 3);
        assert_eq!(buffers.read(0), (2.5, 3.0));
        assert_eq!(buffers.read(2), (0.5, 1.0));
    }

    #[test]
    fn short_and_mono_input() {
        let params = Params {
            output_volume: 1.0,
            display_scale: 1.0,
            ..Params::default()
        };
        let mut selector = SourceSelector::new();
        let buffers = buffers(16);
        let mut output = [0.0; 6];
        selector.process_block(&params, 48_000.0, &[0.5], 1, &mut output, 2, &buffers);
        assert_eq!(output, [0.5, 0.5, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(buffers.len(), 3);
        assert_eq!(buffers.read(2), (0.5, 0.5));
    }

    #[test]
    fn block_with_pulls_input_in_both_modes() {
        let mut params = Params {
            output_volume: 1.0,
            display_scale: 1.0,
            ..Params::default()
        };
        let mut selector = SourceSelector::new();
        let buffers = buffers(16);
        let mut pulled = 0;
        let mut output = [0.0; 4];
        selector.process_block_with(
            &params,
            48_000.0,
            || {
                pulled += 1;
                (0.25, 0.75)
            },
            &mut output,
            2,
            &buffers,
        );
        assert_eq!(pulled, 2);
        assert_eq!(output, [0.25, 0.75, 0.25, 0.75]);
        params.source = SourceMode::Internal;
        selector.process_block_with(
            &params,
            48_000.0,
            || {
                pulled += 1;
                (0.25, 0.75)
            },
            &mut output,
            2,
            &buffers,
        );
        assert_eq!(pulled, 4);
        assert_eq!(buffers.len(), 4);
        assert_ne!(buffers.read(0), (0.25, 0.75));
    }

    #[test]
    fn tap_stays_current_across_internal_to_external_switch() {
        const BLOCK: usize = 1024;
        let capture = Arc::new(buffers(16384));
        let mut tap = InputTap::new(Arc::clone(&capture));
        let display = buffers(4096);
        let mut params = Params {
            source: SourceMode::Internal,
            output_volume: 1.0,
            display_scale: 1.0,
            ..Params::default()
        };
        let mut selector = SourceSelector::new();
        let mut output = vec![0.0; BLOCK * 2];
        let mut captured = 0u32;
        let mut run_block = |params: &Params, selector: &mut SourceSelector| {
            for _ in 0..BLOCK {
                capture.push_pair(captured as f32, -(captured as f32));
                captured += 1;
            }
            selector.process_block_with(
                params,
                48_000.0,
                || tap.next_pair(),
                &mut output,
                2,
                &display,
            );
            captured - 1
        };
        for _ in 0..47 {
            run_block(&params, &mut selector);
        }
        params.source = SourceMode::External;
        for _ in 0..200 {
            let newest = run_block(&params, &mut selector) as f32;
            let (x, y) = display.read(0);
            assert!(newest - x < BLOCK as f32, "lagging by {}", newest - x);
            assert_eq!(y, -x);
        }
    }
}
