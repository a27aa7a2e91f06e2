//! Fixed-timestep scheduling.
//!
//! `FixedTimestep` is the accumulator: it turns irregular frame arrivals into
//! a whole number of fixed-duration ticks followed by exactly one render.
//! Time is passed in explicitly so the arithmetic is testable without a
//! clock. `GameLoop` (in `runner`) feeds it real frame arrivals on a thread.

mod runner;

use std::time::{Duration, Instant};

use tracing::warn;

use crate::config::SimConfig;

pub use runner::{GameLoop, SchedulerError};

/// Callbacks driven by the scheduler
pub trait FrameHandler {
    /// One fixed tick; `dt` is the tick duration in seconds
    fn update(&mut self, dt: f32);

    /// Once per frame arrival, after any ticks
    fn render(&mut self) {}

    /// Lets a threaded loop wind down on its own
    fn is_finished(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// What one frame arrival did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    pub ticks: u32,
    /// Due ticks discarded by the catch-up cap
    pub dropped: u64,
    pub rendered: bool,
}

#[derive(Debug, Clone)]
pub struct FixedTimestep {
    tick: Duration,
    max_catch_up: Option<u32>,
    state: LoopState,
    last: Option<Instant>,
    accumulator: Duration,
    total_ticks: u64,
}

impl FixedTimestep {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick: tick.max(Duration::from_nanos(1)),
            max_catch_up: None,
            state: LoopState::Stopped,
            last: None,
            accumulator: Duration::ZERO,
            total_ticks: 0,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.tick_duration()).with_max_catch_up(config.max_catch_up_ticks)
    }

    /// Bound the ticks a single frame may drain; `None` is unbounded
    pub fn with_max_catch_up(mut self, max: Option<u32>) -> Self {
        self.max_catch_up = max;
        self
    }

    /// Stopped -> Running; the next frame measures from `now`
    pub fn start(&mut self, now: Instant) {
        if self.state == LoopState::Running {
            return;
        }
        self.state = LoopState::Running;
        self.last = Some(now);
    }

    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick
    }

    pub fn tick_seconds(&self) -> f32 {
        self.tick.as_secs_f32()
    }

    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Handle one frame arrival at `now`
    pub fn frame<H: FrameHandler + ?Sized>(&mut self, now: Instant, handler: &mut H) -> FrameReport {
        if self.state != LoopState::Running {
            return FrameReport::default();
        }

        let last = self.last.unwrap_or(now);
        self.accumulator += now.saturating_duration_since(last);
        self.last = Some(now);

        let dt = self.tick_seconds();
        let mut report = FrameReport::default();
        while self.accumulator >= self.tick {
            if self.max_catch_up.is_some_and(|max| report.ticks >= max) {
                let (acc, tick) = (self.accumulator.as_nanos(), self.tick.as_nanos());
                let due = (acc / tick) as u64;
                self.accumulator = Duration::from_nanos((acc % tick) as u64);
                report.dropped = due;
                warn!(dropped = due, ran = report.ticks, "catch-up cap reached, dropping ticks");
                break;
            }
            handler.update(dt);
            self.accumulator -= self.tick;
            self.total_ticks += 1;
            report.ticks += 1;
        }

        handler.render();
        report.rendered = true;
        report
    }
}
