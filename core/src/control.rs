//! Inbound color-control events. Network (or any other) handlers send a `ColorEvent` through a
//! bounded queue and the render loop applies pending events once per frame.

use crate::{appearance::color_from_control, params::Controls};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

/// Queue bound used when none is specified.
pub const DEFAULT_QUEUE_BOUND: usize = 64;

/// A scalar control value which selects the trail color. The expected domain is roughly
/// [200, 800].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorEvent {
    pub value: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    Sent,
    /// The queue was full and the event was dropped.
    Dropped,
    /// The receiving end is gone.
    Disconnected,
}

#[derive(Debug, Clone)]
pub struct ControlSender(SyncSender<ColorEvent>);

impl ControlSender {
    /// Enqueue an event without blocking.
    pub fn send(&self, event: ColorEvent) -> SendStatus {
        match self.0.try_send(event) {
            Ok(()) => SendStatus::Sent,
            Err(TrySendError::Full(event)) => {
                log::warn!("Control queue is full. Dropping {:?}.", event);
                SendStatus::Dropped
            }
            Err(TrySendError::Disconnected(_)) => SendStatus::Disconnected,
        }
    }
}

#[derive(Debug)]
pub struct ControlReceiver(Receiver<ColorEvent>);

impl ControlReceiver {
    /// Apply every pending event to `controls`. Values that don't map to a color leave the color
    /// unchanged. Returns the number of events consumed.
    pub fn drain_into(&self, controls: &Controls) -> usize {
        let mut count = 0;
        for event in self.0.try_iter() {
            count += 1;
            match color_from_control(event.value) {
                Some(color) => {
                    log::debug!("Control value {} -> color {:?}", event.value, color);
                    controls.set_color(color);
                }
                None => {
                    log::warn!("Ignoring unmappable control value {}", event.value);
                }
            }
        }
        count
    }
}

pub fn control_channel(bound: usize) -> (ControlSender, ControlReceiver) {
    let (sender, receiver) = mpsc::sync_channel(bound);
    (ControlSender(sender), ControlReceiver(receiver))
}
