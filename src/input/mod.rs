//! Pull-based input boundary.
//!
//! The on-screen joystick and buttons live outside the core. They publish
//! their latest state into an `InputSource`; the session pulls exactly one
//! `InputFrame` per tick and never subscribes to widget events.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Analog stick reading. `x`/`y` are in [-1, 1]; `angle` (radians) and
/// `distance` (0..=1) are carried for widgets that report polar values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StickState {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub distance: f32,
}

impl StickState {
    /// Build from cartesian axes, clamped to the unit square
    pub fn from_xy(x: f32, y: f32) -> Self {
        let x = x.clamp(-1.0, 1.0);
        let y = y.clamp(-1.0, 1.0);
        Self {
            x,
            y,
            angle: y.atan2(x),
            distance: (x * x + y * y).sqrt().min(1.0),
        }
    }
}

/// Everything the player can do in one tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputFrame {
    pub stick: StickState,
    /// Jump
    #[serde(default)]
    pub a: bool,
    /// Secondary action (dig)
    #[serde(default)]
    pub b: bool,
}

impl InputFrame {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn stick(x: f32, y: f32) -> Self {
        Self {
            stick: StickState::from_xy(x, y),
            ..Self::default()
        }
    }

    pub fn with_a(mut self) -> Self {
        self.a = true;
        self
    }

    pub fn with_b(mut self) -> Self {
        self.b = true;
        self
    }
}

/// Something the session can read the current input from
pub trait InputSource: Send {
    fn current(&mut self) -> InputFrame;
}

/// No input at all
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn current(&mut self) -> InputFrame {
        InputFrame::idle()
    }
}

/// Latest widget state, shared between the widget side and the loop thread
#[derive(Debug, Clone, Default)]
pub struct SharedInput {
    inner: Arc<Mutex<InputFrame>>,
}

impl SharedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, frame: InputFrame) {
        *self.inner.lock() = frame;
    }

    pub fn set_stick(&self, stick: StickState) {
        self.inner.lock().stick = stick;
    }

    /// Joystick released
    pub fn release_stick(&self) {
        self.inner.lock().stick = StickState::default();
    }

    pub fn set_buttons(&self, a: bool, b: bool) {
        let mut frame = self.inner.lock();
        frame.a = a;
        frame.b = b;
    }
}

impl InputSource for SharedInput {
    fn current(&mut self) -> InputFrame {
        *self.inner.lock()
    }
}

/// Fixed sequence of frames, each held for a number of ticks. Idle once
/// the script runs out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    steps: Vec<(u32, InputFrame)>,
    cursor: usize,
    used: u32,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold(mut self, ticks: u32, frame: InputFrame) -> Self {
        if ticks > 0 {
            self.steps.push((ticks, frame));
        }
        self
    }

    /// One frame per tick, in order
    pub fn from_frames(frames: impl IntoIterator<Item = InputFrame>) -> Self {
        frames
            .into_iter()
            .fold(Self::new(), |script, frame| script.hold(1, frame))
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.steps.len()
    }
}

impl InputSource for ScriptedInput {
    fn current(&mut self) -> InputFrame {
        let Some(&(ticks, frame)) = self.steps.get(self.cursor) else {
            return InputFrame::idle();
        };
        self.used += 1;
        if self.used >= ticks {
            self.cursor += 1;
            self.used = 0;
        }
        frame
    }
}

/// Seeded random walk over the stick and buttons, for soak runs
#[derive(Debug, Clone)]
pub struct RandomInput {
    rng: Xoshiro256PlusPlus,
    held: InputFrame,
    hold_left: u32,
    max_hold: u32,
}

impl RandomInput {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            held: InputFrame::idle(),
            hold_left: 0,
            max_hold: 30,
        }
    }

    /// Longest run of ticks a random frame is held for
    pub fn with_max_hold(mut self, ticks: u32) -> Self {
        self.max_hold = ticks.max(1);
        self
    }
}

impl InputSource for RandomInput {
    fn current(&mut self) -> InputFrame {
        if self.hold_left == 0 {
            let x = self.rng.gen_range(-1.0f32..=1.0);
            let y = self.rng.gen_range(-1.0f32..=1.0);
            self.held = InputFrame {
                stick: StickState::from_xy(x, y),
                a: self.rng.gen_bool(0.1),
                b: self.rng.gen_bool(0.05),
            };
            self.hold_left = self.rng.gen_range(1..=self.max_hold);
        }
        self.hold_left -= 1;
        self.held
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stick_from_xy() {
        let stick = StickState::from_xy(2.0, 0.0);
        assert_eq!(stick.x, 1.0);
        assert_eq!(stick.distance, 1.0);
        assert_eq!(stick.angle, 0.0);

        let down = StickState::from_xy(0.0, 0.5);
        assert!((down.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(down.distance, 0.5);
    }

    #[test]
    fn test_frame_builders() {
        let frame = InputFrame::stick(1.0, 0.0).with_a().with_b();
        assert!(frame.a && frame.b);
        assert_eq!(frame.stick.x, 1.0);
        assert_eq!(InputFrame::idle(), InputFrame::default());
    }

    #[test]
    fn test_shared_input_is_pulled() {
        let widget = SharedInput::new();
        let mut source = widget.clone();
        widget.set_stick(StickState::from_xy(-1.0, 0.0));
        widget.set_buttons(true, false);
        let frame = source.current();
        assert_eq!(frame.stick.x, -1.0);
        assert!(frame.a);

        widget.release_stick();
        assert_eq!(source.current().stick, StickState::default());
        widget.set(InputFrame::idle());
        assert!(!source.current().a);
    }

    #[test]
    fn test_scripted_holds_then_idles() {
        let mut script = ScriptedInput::new()
            .hold(2, InputFrame::stick(1.0, 0.0))
            .hold(0, InputFrame::stick(0.0, 1.0))
            .hold(1, InputFrame::idle().with_a());
        assert_eq!(script.current().stick.x, 1.0);
        assert_eq!(script.current().stick.x, 1.0);
        assert!(script.current().a);
        assert!(script.is_exhausted());
        assert_eq!(script.current(), InputFrame::idle());
    }

    #[test]
    fn test_scripted_from_frames() {
        let frames = vec![InputFrame::stick(1.0, 0.0), InputFrame::stick(-1.0, 0.0)];
        let mut script = ScriptedInput::from_frames(frames);
        assert_eq!(script.current().stick.x, 1.0);
        assert_eq!(script.current().stick.x, -1.0);
        assert!(script.is_exhausted());
    }

    #[test]
    fn test_random_input_is_seeded() {
        let mut a = RandomInput::new(7);
        let mut b = RandomInput::new(7);
        for _ in 0..200 {
            assert_eq!(a.current(), b.current());
        }
    }

    #[test]
    fn test_random_input_in_range() {
        let mut source = RandomInput::new(99).with_max_hold(3);
        for _ in 0..500 {
            let frame = source.current();
            assert!((-1.0..=1.0).contains(&frame.stick.x));
            assert!((-1.0..=1.0).contains(&frame.stick.y));
        }
    }
}
