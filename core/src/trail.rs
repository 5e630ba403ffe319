use crate::{appearance::Appearance, buffers::XyBuffers};

/// One vertex of the trail polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub x: f32,
    pub y: f32,
    /// Trail color with the fade weight as its alpha.
    pub rgba: [f32; 4],
    pub thickness: f32,
}

impl TrailPoint {
    pub fn fade(&self) -> f32 {
        self.rgba[3]
    }
}

/// Index of the oldest slot in a window of `tail_length` slots ending at `tail`, wrapped into
/// `[0, capacity)`.
pub fn window_start(tail: usize, tail_length: usize, capacity: usize) -> usize {
    let start = tail as i64 - tail_length as i64 + 1;
    start.rem_euclid(capacity as i64) as usize
}

/// Replace the contents of `out` with the `tail_length` most recent sample pairs from `buffers`
/// in chronological order. Point `i` has fade weight `i / tail_length`, so the oldest point is
/// fully transparent. Doesn't modify `buffers` and only allocates if `out` needs to grow.
///
/// `tail_length` is expected to be at most the buffer capacity. Longer windows re-read slots and
/// show overwritten samples. Until the buffers have filled once, the window includes
/// zero-initialized slots.
pub fn extract_trail(
    buffers: &XyBuffers,
    tail_length: usize,
    appearance: &Appearance,
    out: &mut Vec<TrailPoint>,
) {
    out.clear();
    if tail_length == 0 {
        return;
    }
    let capacity = buffers.capacity();
    let tail = buffers.tail().unwrap_or(capacity - 1);
    let start = window_start(tail, tail_length, capacity);
    out.extend((0..tail_length).map(|i| {
        let index = (start + i) % capacity;
        let x = buffers.x().slot(index);
        let y = buffers.y().slot(index);
        TrailPoint {
            x: x * appearance.aspect,
            y,
            rgba: appearance
                .color
                .with_alpha(i as f32 / tail_length as f32),
            thickness: appearance.thickness,
        }
    }));
}

/// Reusable storage for the per-frame trail.
#[derive(Debug, Default)]
pub struct TrailWindow {
    points: Vec<TrailPoint>,
}

impl TrailWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        buffers: &XyBuffers,
        tail_length: usize,
        appearance: &Appearance,
    ) -> &[TrailPoint] {
        extract_trail(buffers, tail_length, appearance, &mut self.points);
        &self.points
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::appearance::{Rgb, aspect_compensation};
    use rand::Rng;
    use std::{
        num::NonZeroUsize,
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        thread,
    };

    fn buffers(capacity: usize) -> XyBuffers {
        XyBuffers::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn window_start_wraps_negative() {
        assert_eq!(window_start(1, 4, 8), 6);
        assert_eq!(window_start(3, 4, 8), 0);
        assert_eq!(window_start(7, 4, 8), 4);
        assert_eq!(window_start(0, 20, 8), 5);
    }

    #[test]
    fn four_samples_in_order_with_fade() {
        let buffers = buffers(16);
        for (x, y) in [(1.0, 10.0), (2.0, 20.0), (3.0, 30.0), (4.0, 40.0)] {
            buffers.push_pair(x, y);
        }
        let mut out = Vec::new();
        extract_trail(&buffers, 4, &Appearance::default(), &mut out);
        let xs = out.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>();
        assert_eq!(xs, vec![(1.0, 10.0), (2.0, 20.0), (3.0, 30.0), (4.0, 40.0)]);
        let fades = out.iter().map(TrailPoint::fade).collect::<Vec<_>>();
        assert_eq!(fades, vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn window_wraps_around_the_buffer() {
        let buffers = buffers(8);
        for i in 1..=10 {
            buffers.push_pair(i as f32, -(i as f32));
        }
        let mut out = Vec::new();
        extract_trail(&buffers, 5, &Appearance::default(), &mut out);
        let xs = out.iter().map(|p| p.x).collect::<Vec<_>>();
        assert_eq!(xs, vec![6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_eq!(out[4].y, -10.0);
    }

    #[test]
    fn fade_strictly_increases() {
        let buffers = buffers(4096);
        for i in 0..5000 {
            buffers.push_pair((i as f32).sin(), (i as f32).cos());
        }
        let mut out = Vec::new();
        extract_trail(&buffers, 2048, &Appearance::default(), &mut out);
        assert_eq!(out.len(), 2048);
        assert_eq!(out[0].fade(), 0.0);
        for w in out.windows(2) {
            assert!(w[0].fade() < w[1].fade());
        }
        assert!(out[2047].fade() < 1.0);
    }

    #[test]
    fn repeated_extraction_is_identical() {
        let buffers = buffers(64);
        for i in 0..100 {
            buffers.push_pair(i as f32 * 0.01, i as f32 * -0.02);
        }
        let appearance = Appearance {
            color: Rgb::new(0.2, 0.4, 0.6),
            thickness: 1.2,
            aspect: 0.75,
        };
        let mut window = TrailWindow::new();
        let first = window.update(&buffers, 50, &appearance).to_vec();
        let second = window.update(&buffers, 50, &appearance).to_vec();
        let bits = |points: &[TrailPoint]| {
            points
                .iter()
                .flat_map(|p| {
                    [p.x, p.y, p.rgba[0], p.rgba[1], p.rgba[2], p.rgba[3], p.thickness]
                })
                .map(f32::to_bits)
                .collect::<Vec<_>>()
        };
        assert_eq!(bits(&first), bits(&second));
        assert_eq!(buffers.len(), 64);
    }

    #[test]
    fn aspect_scales_x_only() {
        let buffers = buffers(8);
        buffers.push_pair(0.8, 0.6);
        let appearance = Appearance {
            aspect: aspect_compensation(1600, 900),
            ..Appearance::default()
        };
        let mut out = Vec::new();
        extract_trail(&buffers, 1, &appearance, &mut out);
        assert!((out[0].x - 0.8 * 900.0 / 1600.0).abs() < 1e-6);
        assert_eq!(out[0].y, 0.6);
    }

    #[test]
    fn points_carry_color_and_thickness() {
        let buffers = buffers(8);
        buffers.push_pair(0.0, 0.0);
        let appearance = Appearance {
            color: Rgb::new(1.0, 0.5, 0.0),
            thickness: 0.3,
            aspect: 1.0,
        };
        let mut out = Vec::new();
        extract_trail(&buffers, 2, &appearance, &mut out);
        assert_eq!(out[1].rgba, [1.0, 0.5, 0.0, 0.5]);
        assert!(out.iter().all(|p| p.thickness == 0.3));
    }

    #[test]
    fn empty_buffer_and_zero_length() {
        let buffers = buffers(8);
        let mut out = vec![];
        extract_trail(&buffers, 3, &Appearance::default(), &mut out);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|p| p.x == 0.0 && p.y == 0.0));
        extract_trail(&buffers, 0, &Appearance::default(), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn extraction_while_writer_is_pushing() {
        const TAIL_LENGTH: usize = 1024;
        let buffers = Arc::new(buffers(4096));
        let stop = Arc::new(AtomicBool::new(false));
        let writer = {
            let buffers = Arc::clone(&buffers);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut rng = rand::rng();
                let mut pushed = 0u64;
                while !stop.load(Ordering::Relaxed) {
                    buffers.push_pair(
                        rng.random_range(-1.0..=1.0),
                        rng.random_range(-1.0..=1.0),
                    );
                    pushed += 1;
                }
                pushed
            })
        };
        let appearance = Appearance {
            aspect: 1.0,
            ..Appearance::default()
        };
        let mut window = TrailWindow::new();
        for _ in 0..2000 {
            let points = window.update(&buffers, TAIL_LENGTH, &appearance);
            assert_eq!(points.len(), TAIL_LENGTH);
            for p in points {
                assert!(p.x.is_finite() && p.y.is_finite());
                assert!((-1.0..=1.0).contains(&p.x), "x out of range: {}", p.x);
                assert!((-1.0..=1.0).contains(&p.y), "y out of range: {}", p.y);
            }
        }
        stop.store(true, Ordering::Relaxed);
        let pushed = writer.join().unwrap();
        assert_eq!(buffers.written(), pushed);
    }
}
