//! Bounded control parameters. `Params` is a plain snapshot that's passed by reference into the
//! audio and render entry points. `Controls` is the shared, lock-free store which GUI, keyboard
//! and network inputs write to and which each context snapshots once per block or frame.

use crate::{appearance::Rgb, source::SourceMode};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Values that don't compare (ie. NaN) clamp to the minimum.
    pub fn clamp(&self, value: T) -> T {
        if value > self.max {
            self.max
        } else if value >= self.min {
            value
        } else {
            self.min
        }
    }
}

pub const BASE_FREQ_HZ: Bounds<f32> = Bounds::new(0.1, 500.0);
pub const RATIO: Bounds<f32> = Bounds::new(1.0, 10.0);
pub const OUTPUT_VOLUME: Bounds<f32> = Bounds::new(0.0, 1.0);
pub const TAIL_LENGTH: Bounds<usize> = Bounds::new(1024, 8192);
pub const THICKNESS: Bounds<f32> = Bounds::new(0.05, 1.5);
pub const DISPLAY_SCALE: Bounds<f32> = Bounds::new(0.01, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub base_freq_hz: f32,
    /// Frequency of the second oscillator relative to the first.
    pub ratio: f32,
    /// Gain applied to the pair sent to the audio output.
    pub output_volume: f32,
    /// Number of sample pairs in the trail.
    pub tail_length: usize,
    pub thickness: f32,
    /// Gain applied to the pair pushed into the scope buffers.
    pub display_scale: f32,
    pub source: SourceMode,
    pub color: Rgb,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            base_freq_hz: 2.0,
            ratio: 1.5,
            output_volume: 0.0,
            tail_length: 2048,
            thickness: 0.8,
            display_scale: 0.9,
            source: SourceMode::External,
            color: Rgb::GREEN,
        }
    }
}

impl Params {
    /// Clamp every knob into its bounds. The tail length is also limited to `capacity` so the
    /// trail never re-reads overwritten samples.
    pub fn clamped(self, capacity: usize) -> Self {
        Self {
            base_freq_hz: BASE_FREQ_HZ.clamp(self.base_freq_hz),
            ratio: RATIO.clamp(self.ratio),
            output_volume: OUTPUT_VOLUME.clamp(self.output_volume),
            tail_length: TAIL_LENGTH.clamp(self.tail_length).min(capacity),
            thickness: THICKNESS.clamp(self.thickness),
            display_scale: DISPLAY_SCALE.clamp(self.display_scale),
            source: self.source,
            color: clamp_color(self.color),
        }
    }
}

fn clamp_color(color: Rgb) -> Rgb {
    let unit = Bounds::new(0.0, 1.0);
    Rgb::new(unit.clamp(color.r), unit.clamp(color.g), unit.clamp(color.b))
}

/// An `f32` that can be shared between threads without a lock.
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Shared store of the current parameters. Every setter clamps into the parameter's bounds.
/// Individual values are updated atomically; a snapshot may mix values from before and after a
/// concurrent update, which only ever lasts for one block or frame.
#[derive(Debug)]
pub struct Controls {
    capacity: usize,
    base_freq_hz: AtomicF32,
    ratio: AtomicF32,
    output_volume: AtomicF32,
    tail_length: AtomicUsize,
    thickness: AtomicF32,
    display_scale: AtomicF32,
    internal_source: AtomicBool,
    color: [AtomicF32; 3],
}

impl Controls {
    /// `capacity` is the scope buffer capacity, which bounds the tail length.
    pub fn new(params: Params, capacity: usize) -> Self {
        let p = params.clamped(capacity);
        Self {
            capacity,
            base_freq_hz: AtomicF32::new(p.base_freq_hz),
            ratio: AtomicF32::new(p.ratio),
            output_volume: AtomicF32::new(p.output_volume),
            tail_length: AtomicUsize::new(p.tail_length),
            thickness: AtomicF32::new(p.thickness),
            display_scale: AtomicF32::new(p.display_scale),
            internal_source: AtomicBool::new(p.source == SourceMode::Internal),
            color: [
                AtomicF32::new(p.color.r),
                AtomicF32::new(p.color.g),
                AtomicF32::new(p.color.b),
            ],
        }
    }

    pub fn snapshot(&self) -> Params {
        Params {
            base_freq_hz: self.base_freq_hz.get(),
            ratio: self.ratio.get(),
            output_volume: self.output_volume.get(),
            tail_length: self.tail_length.load(Ordering::Relaxed),
            thickness: self.thickness.get(),
            display_scale: self.display_scale.get(),
            source: self.source(),
            color: self.color(),
        }
    }

    pub fn source(&self) -> SourceMode {
        if self.internal_source.load(Ordering::Relaxed) {
            SourceMode::Internal
        } else {
            SourceMode::External
        }
    }

    pub fn color(&self) -> Rgb {
        let [r, g, b] = &self.color;
        Rgb::new(r.get(), g.get(), b.get())
    }

    pub fn set_base_freq_hz(&self, value: f32) {
        self.base_freq_hz.set(BASE_FREQ_HZ.clamp(value));
    }

    pub fn set_ratio(&self, value: f32) {
        self.ratio.set(RATIO.clamp(value));
    }

    pub fn set_output_volume(&self, value: f32) {
        self.output_volume.set(OUTPUT_VOLUME.clamp(value));
    }

    pub fn set_tail_length(&self, value: usize) {
        self.tail_length
            .store(TAIL_LENGTH.clamp(value).min(self.capacity), Ordering::Relaxed);
    }

    pub fn set_thickness(&self, value: f32) {
        self.thickness.set(THICKNESS.clamp(value));
    }

    pub fn set_display_scale(&self, value: f32) {
        self.display_scale.set(DISPLAY_SCALE.clamp(value));
    }

    pub fn set_source(&self, source: SourceMode) {
        self.internal_source
            .store(source == SourceMode::Internal, Ordering::Relaxed);
    }

    pub fn toggle_source(&self) -> SourceMode {
        let source = self.source().toggle();
        self.set_source(source);
        source
    }

    pub fn set_color(&self, color: Rgb) {
        let clamped = clamp_color(color);
        let [r, g, b] = &self.color;
        r.set(clamped.r);
        g.set(clamped.g);
        b.set(clamped.b);
    }

    pub fn nudge_base_freq_hz(&self, factor: f32) {
        self.set_base_freq_hz(self.base_freq_hz.get() * factor);
    }

    pub fn nudge_ratio(&self, delta: f32) {
        self.set_ratio(self.ratio.get() + delta);
    }

    pub fn nudge_output_volume(&self, delta: f32) {
        self.set_output_volume(self.output_volume.get() + delta);
    }

    pub fn nudge_tail_length(&self, delta: isize) {
        let current = self.tail_length.load(Ordering::Relaxed);
        self.set_tail_length(current.saturating_add_signed(delta));
    }

    pub fn nudge_thickness(&self, delta: f32) {
        self.set_thickness(self.thickness.get() + delta);
    }

    pub fn nudge_display_scale(&self, factor: f32) {
        self.set_display_scale(self.display_scale.get() * factor);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_within_bounds() {
        let params = Params::default();
        assert_eq!(params.clamped(32768), params);
    }

    #[test]
    fn clamped_limits_every_knob() {
        let params = Params {
            base_freq_hz: 0.0,
            ratio: 20.0,
            output_volume: -1.0,
            tail_length: 100_000,
            thickness: 3.0,
            display_scale: 0.0,
            source: SourceMode::Internal,
            color: Rgb::new(2.0, -1.0, f32::NAN),
        }
        .clamped(32768);
        assert_eq!(params.base_freq_hz, 0.1);
        assert_eq!(params.ratio, 10.0);
        assert_eq!(params.output_volume, 0.0);
        assert_eq!(params.tail_length, 8192);
        assert_eq!(params.thickness, 1.5);
        assert_eq!(params.display_scale, 0.01);
        assert_eq!(params.color, Rgb::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn tail_length_never_exceeds_capacity() {
        let params = Params {
            tail_length: 4096,
            ..Params::default()
        };
        assert_eq!(params.clamped(2000).tail_length, 2000);
        let controls = Controls::new(params, 3000);
        assert_eq!(controls.snapshot().tail_length, 3000);
        controls.set_tail_length(8000);
        assert_eq!(controls.snapshot().tail_length, 3000);
    }

    #[test]
    fn controls_round_trip_params() {
        let params = Params {
            base_freq_hz: 110.0,
            ratio: 2.0,
            source: SourceMode::Internal,
            color: Rgb::new(0.25, 0.5, 0.75),
            ..Params::default()
        };
        let controls = Controls::new(params, 32768);
        assert_eq!(controls.snapshot(), params);
    }

    #[test]
    fn setters_clamp() {
        let controls = Controls::new(Params::default(), 32768);
        controls.nudge_base_freq_hz(1000.0);
        controls.nudge_ratio(-5.0);
        controls.nudge_tail_length(-5000);
        controls.nudge_display_scale(0.5);
        let p = controls.snapshot();
        assert_eq!(p.base_freq_hz, 500.0);
        assert_eq!(p.ratio, 1.0);
        assert_eq!(p.tail_length, 1024);
        assert_eq!(p.display_scale, 0.45);
    }

    #[test]
    fn toggle_source() {
        let controls = Controls::new(Params::default(), 32768);
        assert_eq!(controls.toggle_source(), SourceMode::Internal);
        assert_eq!(controls.snapshot().source, SourceMode::Internal);
        assert_eq!(controls.toggle_source(), SourceMode::External);
    }

    #[test]
    fn params_from_partial_json() {
        let params: Params =
            serde_json::from_str(r#"{ "ratio": 3.0, "source": "internal" }"#)
                .unwrap();
        assert_eq!(params.ratio, 3.0);
        assert_eq!(params.source, SourceMode::Internal);
        assert_eq!(params.tail_length, Params::default().tail_length);
    }
}
