//! Collaborator seams of the simulation core.
//!
//! Audio/haptics, the hosting screen, score persistence and drawing are all
//! outside the core. The session talks to them only through these traits,
//! never waits on them, and treats a failing signaler as if it had succeeded.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::Snapshot;

/// Fire-and-forget feedback cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    Jump,
    Collect,
    Die,
    LevelComplete,
    Dig,
}

impl Cue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Jump => "jump",
            Cue::Collect => "collect",
            Cue::Die => "die",
            Cue::LevelComplete => "level_complete",
            Cue::Dig => "dig",
        }
    }
}

#[derive(Debug, Error)]
#[error("signal {cue} failed: {reason}")]
pub struct SignalError {
    pub cue: &'static str,
    pub reason: String,
}

impl SignalError {
    pub fn new(cue: Cue, reason: impl Into<String>) -> Self {
        Self {
            cue: cue.as_str(),
            reason: reason.into(),
        }
    }
}

/// Audio/haptic trigger
pub trait Signaler: Send {
    fn signal(&mut self, cue: Cue) -> Result<(), SignalError>;
}

/// Caller contract of a level attempt. Exactly one of the first two fires
/// per attempt; `on_exit` only after an explicit abandon.
pub trait SessionObserver: Send {
    fn on_level_complete(&mut self, score: u32);
    fn on_game_over(&mut self, score: u32);
    fn on_exit(&mut self) {}
}

/// Outcome record handed to the persistence side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub score: u32,
    pub level: u32,
    /// Unix seconds
    pub timestamp: u64,
}

impl ScoreRecord {
    pub fn now(score: u32, level: u32) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            score,
            level,
            timestamp,
        }
    }
}

pub trait ScoreSink: Send {
    fn record(&mut self, record: ScoreRecord);
}

/// Receives a view of the session once per frame
pub trait Renderer: Send {
    fn render(&mut self, snapshot: &Snapshot);
}

/// Does nothing for every seam
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Signaler for Silent {
    fn signal(&mut self, _cue: Cue) -> Result<(), SignalError> {
        Ok(())
    }
}

impl SessionObserver for Silent {
    fn on_level_complete(&mut self, _score: u32) {}
    fn on_game_over(&mut self, _score: u32) {}
}

impl ScoreSink for Silent {
    fn record(&mut self, _record: ScoreRecord) {}
}

impl Renderer for Silent {
    fn render(&mut self, _snapshot: &Snapshot) {}
}

/// The set of collaborators a session reports to
pub struct Hooks {
    pub signaler: Box<dyn Signaler>,
    pub observer: Box<dyn SessionObserver>,
    pub scores: Box<dyn ScoreSink>,
    pub renderer: Box<dyn Renderer>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            signaler: Box::new(Silent),
            observer: Box::new(Silent),
            scores: Box::new(Silent),
            renderer: Box::new(Silent),
        }
    }
}

impl Hooks {
    /// Route every seam into one event log
    pub fn logged(log: &EventLog) -> Self {
        Self {
            signaler: Box::new(log.clone()),
            observer: Box::new(log.clone()),
            scores: Box::new(log.clone()),
            renderer: Box::new(Silent),
        }
    }
}

/// What crossed a seam, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HookEvent {
    Cue { cue: Cue },
    LevelComplete { score: u32 },
    GameOver { score: u32 },
    Exit,
    Score { record: ScoreRecord },
}

/// In-memory recorder implementing every seam; clones share the log
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<HookEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HookEvent> {
        self.events.lock().clone()
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                HookEvent::Cue { cue } => Some(*cue),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &HookEvent) -> usize {
        self.events.lock().iter().filter(|e| *e == wanted).count()
    }

    pub fn scores(&self) -> Vec<ScoreRecord> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                HookEvent::Score { record } => Some(record.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: HookEvent) {
        self.events.lock().push(event);
    }
}

impl Signaler for EventLog {
    fn signal(&mut self, cue: Cue) -> Result<(), SignalError> {
        self.push(HookEvent::Cue { cue });
        Ok(())
    }
}

impl SessionObserver for EventLog {
    fn on_level_complete(&mut self, score: u32) {
        self.push(HookEvent::LevelComplete { score });
    }

    fn on_game_over(&mut self, score: u32) {
        self.push(HookEvent::GameOver { score });
    }

    fn on_exit(&mut self) {
        self.push(HookEvent::Exit);
    }
}

impl ScoreSink for EventLog {
    fn record(&mut self, record: ScoreRecord) {
        self.push(HookEvent::Score { record });
    }
}
