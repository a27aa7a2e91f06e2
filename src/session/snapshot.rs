use serde::{Deserialize, Serialize};

use super::entities::{Enemy, Facing, Pickup, Player};
use super::LevelState;
use crate::animation::{Animator, FrameRect};
use crate::physics::Body;

/// Render-facing view of one moving entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
    pub grounded: bool,
    pub facing: Facing,
    pub clip: Option<String>,
    pub frame: Option<FrameRect>,
}

impl EntityView {
    fn new(id: u32, body: &Body, facing: Facing, animator: &Animator) -> Self {
        Self {
            id,
            x: body.x,
            y: body.y,
            width: body.width,
            height: body.height,
            vx: body.vx,
            vy: body.vy,
            grounded: body.grounded,
            facing,
            clip: animator.current_clip().map(str::to_string),
            frame: animator.current_frame(),
        }
    }

    pub fn player(player: &Player) -> Self {
        Self::new(0, &player.body, player.facing, &player.animator)
    }

    pub fn enemy(enemy: &Enemy) -> Self {
        Self::new(enemy.id, &enemy.body, enemy.facing, &enemy.animator)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub collected: bool,
}

impl From<&Pickup> for PickupView {
    fn from(pickup: &Pickup) -> Self {
        Self {
            id: pickup.id,
            x: pickup.position.x,
            y: pickup.position.y,
            collected: pickup.collected,
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub level_id: u32,
    pub tick: u64,
    pub state: LevelState,
    pub score: u32,
    pub lives: u32,
    pub on_ladder: bool,
    pub on_rope: bool,
    pub player: EntityView,
    pub enemies: Vec<EntityView>,
    pub pickups: Vec<PickupView>,
}

impl Snapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }
}
