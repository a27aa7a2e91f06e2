//! Sprite animation clocks.
//!
//! An `Animator` plays one named clip at a time and only decides which frame
//! rectangle is current; drawing it is the renderer's business. Clips are
//! authored in RON and shared between entities through `AnimationLibrary`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Clip names the session requests
pub mod clips {
    pub const PLAYER_IDLE: &str = "idle";
    pub const PLAYER_RUN: &str = "run";
    pub const PLAYER_CLIMB: &str = "climb";
    pub const PLAYER_HANG: &str = "hang";
    pub const PLAYER_FALL: &str = "fall";
    pub const ENEMY_WALK: &str = "enemy_walk";
    pub const ENEMY_FALL: &str = "enemy_fall";
}

/// Source rectangle of one frame on a sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub frames: Vec<FrameRect>,
    /// Frames per second
    pub frame_rate: f32,
    #[serde(default)]
    pub looping: bool,
}

impl AnimationClip {
    pub fn new(frames: Vec<FrameRect>, frame_rate: f32, looping: bool) -> Self {
        Self {
            frames,
            frame_rate,
            looping,
        }
    }

    /// Seconds each frame stays on screen; infinite for a zero rate
    pub fn frame_duration(&self) -> f32 {
        if self.frame_rate > 0.0 {
            1.0 / self.frame_rate
        } else {
            f32::INFINITY
        }
    }
}

/// Playback state of an animator
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing {
        clip: String,
        frame: usize,
        elapsed: f32,
    },
    Finished {
        clip: String,
        frame: usize,
    },
}

#[derive(Debug, Error)]
pub enum AnimationError {
    #[error("failed to read clip file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid clip definitions: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Named clips shared between animators
#[derive(Debug, Clone, Default)]
pub struct AnimationLibrary {
    clips: HashMap<String, Arc<AnimationClip>>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, clip: AnimationClip) {
        self.clips.insert(name.to_string(), Arc::new(clip));
    }

    pub fn get(&self, name: &str) -> Option<Arc<AnimationClip>> {
        self.clips.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Parse a RON map of clip name to clip
    pub fn from_ron(source: &str) -> Result<Self, AnimationError> {
        let parsed: HashMap<String, AnimationClip> = ron::from_str(source)?;
        Ok(Self {
            clips: parsed
                .into_iter()
                .map(|(name, clip)| (name, Arc::new(clip)))
                .collect(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, AnimationError> {
        let source = std::fs::read_to_string(path).map_err(|source| AnimationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron(&source)
    }

    /// An animator with every clip of this library registered
    pub fn animator(&self) -> Animator {
        Animator {
            clips: self.clips.clone(),
            state: PlaybackState::Idle,
        }
    }
}

/// Per-entity animation clock
#[derive(Debug, Clone, Default)]
pub struct Animator {
    clips: HashMap<String, Arc<AnimationClip>>,
    state: PlaybackState,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_clip(&mut self, name: &str, clip: AnimationClip) {
        self.clips.insert(name.to_string(), Arc::new(clip));
    }

    pub fn remove_clip(&mut self, name: &str) -> Option<Arc<AnimationClip>> {
        self.clips.remove(name)
    }

    /// Start `name` at frame 0 unless it is already the current clip.
    /// `reset` forces the restart.
    pub fn play(&mut self, name: &str, reset: bool) {
        if self.current_clip() != Some(name) || reset {
            self.state = PlaybackState::Playing {
                clip: name.to_string(),
                frame: 0,
                elapsed: 0.0,
            };
        }
    }

    /// Restart the current clip at frame 0
    pub fn reset(&mut self) {
        if let Some(clip) = self.current_clip().map(str::to_string) {
            self.state = PlaybackState::Playing {
                clip,
                frame: 0,
                elapsed: 0.0,
            };
        }
    }

    pub fn advance(&mut self, dt: f32) {
        let PlaybackState::Playing {
            clip,
            frame,
            elapsed,
        } = &mut self.state
        else {
            return;
        };
        let Some(animation) = self.clips.get(clip.as_str()) else {
            return;
        };
        if animation.frames.is_empty() {
            return;
        }

        *elapsed += dt;
        if *elapsed < animation.frame_duration() {
            return;
        }
        *elapsed = 0.0;
        *frame += 1;

        if *frame >= animation.frames.len() {
            if animation.looping {
                *frame = 0;
            } else {
                let last = animation.frames.len() - 1;
                self.state = PlaybackState::Finished {
                    clip: std::mem::take(clip),
                    frame: last,
                };
            }
        }
    }

    pub fn current_clip(&self) -> Option<&str> {
        match &self.state {
            PlaybackState::Idle => None,
            PlaybackState::Playing { clip, .. } | PlaybackState::Finished { clip, .. } => {
                Some(clip.as_str())
            }
        }
    }

    pub fn frame_index(&self) -> Option<usize> {
        match &self.state {
            PlaybackState::Idle => None,
            PlaybackState::Playing { frame, .. } | PlaybackState::Finished { frame, .. } => {
                Some(*frame)
            }
        }
    }

    pub fn current_frame(&self) -> Option<FrameRect> {
        let clip = self.clips.get(self.current_clip()?)?;
        clip.frames.get(self.frame_index()?).copied()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, PlaybackState::Finished { .. })
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }
}
