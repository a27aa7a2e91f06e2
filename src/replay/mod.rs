//! Replay System
//!
//! Records the input frame of every tick a session runs and replays them
//! against the same level to check determinism.
//!
//! Workflow:
//! 1. Build the session with `record_inputs()`
//! 2. Play; each tick's `InputFrame` is kept in order
//! 3. `ReplayRecording::capture` freezes the frames plus the final state digest
//! 4. `verify` rebuilds the session from the level, steps every frame and
//!    compares digests

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::SimConfig;
use crate::input::InputFrame;
use crate::level::Level;
use crate::session::{LevelState, Session};

/// Replay format version
pub const REPLAY_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("session was not recording inputs")]
    NotRecording,
    #[error("replay frames do not match their hash")]
    Tampered,
    #[error("replay is for level {expected}, got level {found}")]
    LevelMismatch { expected: u32, found: u32 },
    #[error("unsupported replay version {0}")]
    UnsupportedVersion(u32),
    #[error("failed to access replay file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid replay JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayOutcome {
    InProgress,
    Victory,
    Death,
    Abandoned,
}

impl From<LevelState> for ReplayOutcome {
    fn from(state: LevelState) -> Self {
        match state {
            LevelState::Playing | LevelState::Paused => ReplayOutcome::InProgress,
            LevelState::Complete => ReplayOutcome::Victory,
            LevelState::Over => ReplayOutcome::Death,
            LevelState::Abandoned => ReplayOutcome::Abandoned,
        }
    }
}

/// Metadata for a replay recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayHeader {
    pub level_id: u32,
    pub level_name: String,
    pub ticks: u64,
    pub outcome: ReplayOutcome,
    /// Session digest after the last tick
    pub final_digest: String,
    /// Unix seconds
    pub recorded_at: u64,
    pub version: u32,
}

/// Complete replay recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecording {
    pub header: ReplayHeader,
    pub frames: Vec<InputFrame>,
    pub frames_hash: String,
}

/// Result of replaying a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayVerdict {
    pub ticks: u64,
    pub outcome: ReplayOutcome,
    pub digest: String,
    /// Digest and outcome both equal the recorded ones
    pub matches: bool,
}

impl ReplayRecording {
    /// Freeze what a recording session has played so far
    pub fn capture(session: &Session) -> Result<Self, ReplayError> {
        let frames = session
            .recorded_inputs()
            .ok_or(ReplayError::NotRecording)?
            .to_vec();
        let recorded_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let header = ReplayHeader {
            level_id: session.level().id,
            level_name: session.level().name.clone(),
            ticks: session.tick_count(),
            outcome: session.state().into(),
            final_digest: session.digest(),
            recorded_at,
            version: REPLAY_VERSION,
        };
        let frames_hash = hash_frames(&frames);
        Ok(Self {
            header,
            frames,
            frames_hash,
        })
    }

    /// Frames still match the hash taken at capture time
    pub fn is_intact(&self) -> bool {
        self.frames_hash == hash_frames(&self.frames)
    }

    /// Fresh session on `level` driven through every recorded frame
    pub fn replay(&self, level: &Level, config: &SimConfig) -> Result<Session, ReplayError> {
        if self.header.version != REPLAY_VERSION {
            return Err(ReplayError::UnsupportedVersion(self.header.version));
        }
        if level.id != self.header.level_id {
            return Err(ReplayError::LevelMismatch {
                expected: self.header.level_id,
                found: level.id,
            });
        }
        if !self.is_intact() {
            return Err(ReplayError::Tampered);
        }

        let mut session = Session::new(level.clone(), config.clone());
        for frame in &self.frames {
            session.step(*frame);
        }
        if self.header.outcome == ReplayOutcome::Abandoned {
            session.abandon();
        }
        Ok(session)
    }

    pub fn verify(&self, level: &Level, config: &SimConfig) -> Result<ReplayVerdict, ReplayError> {
        let session = self.replay(level, config)?;
        let outcome = ReplayOutcome::from(session.state());
        let digest = session.digest();
        let matches = digest == self.header.final_digest && outcome == self.header.outcome;
        if matches {
            info!(level = level.id, ticks = session.tick_count(), "replay verified");
        } else {
            warn!(
                level = level.id,
                expected = %self.header.final_digest,
                found = %digest,
                "replay diverged"
            );
        }
        Ok(ReplayVerdict {
            ticks: session.tick_count(),
            outcome,
            digest,
            matches,
        })
    }

    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ReplayError> {
        std::fs::write(path, self.to_json()?).map_err(|source| ReplayError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}

fn hash_frames(frames: &[InputFrame]) -> String {
    let mut hasher = Sha3_256::new();
    for frame in frames {
        hasher.update(frame.stick.x.to_bits().to_le_bytes());
        hasher.update(frame.stick.y.to_bits().to_le_bytes());
        hasher.update([frame.a as u8, frame.b as u8]);
    }
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
