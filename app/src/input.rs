use sdl2::{event::Event, keyboard::Scancode, mouse::MouseState};
use xyscope_core::Controls;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    ToggleSource,
    BaseFreq(f32),
    Ratio(f32),
    TailLength(isize),
    Volume(f32),
    Scale(f32),
    Thickness(f32),
}

const FREQ_STEP: f32 = 1.05;
const RATIO_STEP: f32 = 0.01;
const TAIL_LENGTH_STEP: isize = 256;
const VOLUME_STEP: f32 = 0.05;
const SCALE_STEP: f32 = 1.1;
const THICKNESS_PER_PX: f32 = 0.01;

pub fn action_for_key(scancode: Scancode) -> Option<Action> {
    let action = match scancode {
        Scancode::Escape => Action::Quit,
        Scancode::Tab => Action::ToggleSource,
        Scancode::Up => Action::BaseFreq(FREQ_STEP),
        Scancode::Down => Action::BaseFreq(1.0 / FREQ_STEP),
        Scancode::Right => Action::Ratio(RATIO_STEP),
        Scancode::Left => Action::Ratio(-RATIO_STEP),
        Scancode::RightBracket => Action::TailLength(TAIL_LENGTH_STEP),
        Scancode::LeftBracket => Action::TailLength(-TAIL_LENGTH_STEP),
        Scancode::Equals => Action::Volume(VOLUME_STEP),
        Scancode::Minus => Action::Volume(-VOLUME_STEP),
        _ => return None,
    };
    Some(action)
}

pub fn action_for_wheel(y: i32) -> Option<Action> {
    if y > 0 {
        Some(Action::Scale(SCALE_STEP))
    } else if y < 0 {
        Some(Action::Scale(1.0 / SCALE_STEP))
    } else {
        None
    }
}

pub fn action_for_drag(mousestate: MouseState, xrel: i32) -> Option<Action> {
    if mousestate.left() && xrel != 0 {
        Some(Action::Thickness(xrel as f32 * THICKNESS_PER_PX))
    } else {
        None
    }
}

pub fn action_for_event(event: &Event) -> Option<Action> {
    match event {
        Event::Quit { .. } => Some(Action::Quit),
        Event::KeyDown {
            scancode: Some(scancode),
            ..
        } => action_for_key(*scancode),
        Event::MouseWheel { y, .. } => action_for_wheel(*y),
        Event::MouseMotion {
            mousestate, xrel, ..
        } => action_for_drag(*mousestate, *xrel),
        _ => None,
    }
}

/// Apply an action to the shared controls. Returns `false` if the app should exit.
pub fn apply(action: Action, controls: &Controls) -> bool {
    match action {
        Action::Quit => return false,
        Action::ToggleSource => {
            let source = controls.toggle_source();
            log::info!("source: {:?}", source);
        }
        Action::BaseFreq(factor) => controls.nudge_base_freq_hz(factor),
        Action::Ratio(delta) => controls.nudge_ratio(delta),
        Action::TailLength(delta) => controls.nudge_tail_length(delta),
        Action::Volume(delta) => controls.nudge_output_volume(delta),
        Action::Scale(factor) => controls.nudge_display_scale(factor),
        Action::Thickness(delta) => controls.nudge_thickness(delta),
    }
    true
}

#[cfg(test)]
mod test {
    use super::*;
    use xyscope_core::{Params, SourceMode};

    fn controls() -> Controls {
        Controls::new(Params::default(), 32768)
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(action_for_key(Scancode::Escape), Some(Action::Quit));
        assert_eq!(action_for_key(Scancode::Tab), Some(Action::ToggleSource));
        assert_eq!(
            action_for_key(Scancode::RightBracket),
            Some(Action::TailLength(256))
        );
        assert_eq!(action_for_key(Scancode::Q), None);
    }

    #[test]
    fn wheel_scales_display() {
        let controls = controls();
        assert!(apply(action_for_wheel(-1).unwrap(), &controls));
        let scale = controls.snapshot().display_scale;
        assert!((scale - 0.9 / 1.1).abs() < 1e-6);
        assert_eq!(action_for_wheel(0), None);
    }

    #[test]
    fn apply_updates_controls() {
        let controls = controls();
        assert!(apply(Action::ToggleSource, &controls));
        assert!(apply(Action::TailLength(256), &controls));
        assert!(apply(Action::Volume(0.05), &controls));
        assert!(!apply(Action::Quit, &controls));
        let params = controls.snapshot();
        assert_eq!(params.source, SourceMode::Internal);
        assert_eq!(params.tail_length, 2048 + 256);
        assert!((params.output_volume - 0.05).abs() < 1e-6);
    }

    #[test]
    fn quit_event() {
        let event = Event::Quit { timestamp: 0 };
        assert_eq!(action_for_event(&event), Some(Action::Quit));
    }
}
