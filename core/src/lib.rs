//! The real-time sample pipeline of an X/Y oscilloscope.
//!
//! An audio callback (the write context) selects a sample pair per frame with a
//! [`SourceSelector`] and pushes it into a pair of lock-free ring buffers ([`XyBuffers`]). Once
//! per rendered frame (the read context) the most recent pairs are read back out as a fading
//! polyline with [`extract_trail`]. The two contexts share nothing but the buffers and a
//! [`Controls`] store, and neither ever blocks the other.

pub mod appearance;
pub mod buffers;
pub mod control;
pub mod oscillator;
pub mod params;
pub mod ring;
pub mod source;
pub mod tap;
pub mod trail;

pub use appearance::{
    Appearance, Rgb, aspect_compensation, color_from_control, hue_ramp,
};
pub use buffers::{DEFAULT_CAPACITY, XyBuffers};
pub use control::{
    ColorEvent, ControlReceiver, ControlSender, SendStatus, control_channel,
};
pub use params::{Bounds, Controls, Params};
pub use ring::SampleRing;
pub use source::{Frame, SourceMode, SourceSelector};
pub use tap::InputTap;
pub use trail::{TrailPoint, TrailWindow, extract_trail};
