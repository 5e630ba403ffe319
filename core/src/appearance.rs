use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const RED: Self = Self::new(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn to_u8(self) -> (u8, u8, u8) {
        let f = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (f(self.r), f(self.g), f(self.b))
    }

    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::GREEN
    }
}

/// Per-frame appearance inputs to trail extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub color: Rgb,
    pub thickness: f32,
    /// Multiplier applied to x coordinates so traces aren't stretched by a non-square viewport.
    pub aspect: f32,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            color: Rgb::default(),
            thickness: 0.8,
            aspect: 1.0,
        }
    }
}

/// The x-axis scale that compensates for a `width` by `height` viewport. A degenerate viewport
/// leaves the x axis unscaled.
pub fn aspect_compensation(width: u32, height: u32) -> f32 {
    if width == 0 {
        1.0
    } else {
        height as f32 / width as f32
    }
}

/// Map `t` in [0, 1] onto a piecewise-linear hue ramp made of five equal segments:
/// red to yellow to green to cyan to blue to magenta. Values outside [0, 1] are clamped.
pub fn hue_ramp(t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    if t < 0.2 {
        Rgb::new(1.0, t * 5.0, 0.0)
    } else if t < 0.4 {
        Rgb::new(1.0 - (t - 0.2) * 5.0, 1.0, 0.0)
    } else if t < 0.6 {
        Rgb::new(0.0, 1.0, (t - 0.4) * 5.0)
    } else if t < 0.8 {
        Rgb::new(0.0, 1.0 - (t - 0.6) * 5.0, 1.0)
    } else {
        Rgb::new((t - 0.8) * 5.0, 0.0, 1.0)
    }
}

/// Lowest control value, mapped to the start of the hue ramp.
pub const CONTROL_MIN: f32 = 200.0;
/// Highest control value, mapped to the end of the hue ramp.
pub const CONTROL_MAX: f32 = 800.0;

/// Convert an inbound control value into a trail color. Returns `None` for values that can't be
/// mapped (NaN or infinite) so the caller can leave the current color alone.
pub fn color_from_control(value: f32) -> Option<Rgb> {
    if !value.is_finite() {
        return None;
    }
    Some(hue_ramp((value - CONTROL_MIN) / (CONTROL_MAX - CONTROL_MIN)))
}
