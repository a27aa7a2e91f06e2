//! Player, enemy and pickup records and their per-tick movement.

use serde::{Deserialize, Serialize};

use crate::animation::{clips, Animator};
use crate::collision::{Point, Rect};
use crate::config::SimConfig;
use crate::grid::{is_ladder, is_rope, is_solid, TileGrid};
use crate::input::InputFrame;
use crate::physics::{apply_gravity, clamp_velocity, integrate_position, Body};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing implied by a horizontal velocity; zero keeps `current`
    pub fn from_vx(vx: f32, current: Facing) -> Facing {
        if vx > 0.0 {
            Facing::Right
        } else if vx < 0.0 {
            Facing::Left
        } else {
            current
        }
    }
}

/// Side effects of one player update the session turns into cues
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerActions {
    pub jumped: bool,
    pub dug: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub on_ladder: bool,
    pub on_rope: bool,
    pub facing: Facing,
    pub animator: Animator,
    spawn: Point,
    // button levels seen last tick; A and B act on the press only
    held_a: bool,
    held_b: bool,
}

impl Player {
    pub fn new(spawn: Point, size: f32, animator: Animator) -> Self {
        Self {
            body: Body::new(spawn.x, spawn.y, size, size),
            on_ladder: false,
            on_rope: false,
            facing: Facing::Right,
            animator,
            spawn,
            held_a: false,
            held_b: false,
        }
    }

    pub fn spawn_point(&self) -> Point {
        self.spawn
    }

    pub fn is_climbing(&self) -> bool {
        self.on_ladder || self.on_rope
    }

    /// Back to the spawn point at rest
    pub fn respawn(&mut self) {
        self.body.x = self.spawn.x;
        self.body.y = self.spawn.y;
        self.body.halt();
        self.body.grounded = false;
        self.on_ladder = false;
        self.on_rope = false;
    }

    /// One tick of input handling, movement and tile collision
    pub fn update(&mut self, input: &InputFrame, grid: &TileGrid, config: &SimConfig) -> PlayerActions {
        let mut actions = PlayerActions::default();
        let stick = input.stick;
        let pressed_a = input.a && !self.held_a;
        let pressed_b = input.b && !self.held_b;
        self.held_a = input.a;
        self.held_b = input.b;

        if pressed_a && self.body.grounded && !self.on_ladder {
            self.body.vy = config.jump_force;
            actions.jumped = true;
        }
        actions.dug = pressed_b;

        if stick.x.abs() > config.deadzone {
            self.body.vx = stick.x * config.player_speed;
            self.facing = Facing::from_vx(stick.x, self.facing);
        } else {
            self.body.vx = 0.0;
        }

        let here = grid.tile_at(self.body.center_x(), self.body.center_y());
        self.on_ladder = is_ladder(here);
        self.on_rope = is_rope(here);

        if self.is_climbing() {
            self.body.vy = if stick.y.abs() > config.deadzone {
                stick.y * config.player_speed
            } else {
                0.0
            };
        } else {
            apply_gravity(&mut self.body, config.gravity);
        }

        let mut next = self.body.clone();
        integrate_position(&mut next);
        let (new_x, new_y) = (next.x, next.y);
        let (w, h) = (self.body.width, self.body.height);

        self.body.grounded = false;
        if self.body.vy < 0.0 {
            // rising: the head stops under the row it hit
            if grid.solid_at(new_x, new_y) || grid.solid_at(new_x + w, new_y) {
                self.body.vy = 0.0;
                self.body.y = grid.row_top(new_y) + grid.tile_size();
            } else {
                self.body.y = new_y;
            }
        } else {
            let feet = new_y + h;
            if grid.solid_at(new_x, feet) || grid.solid_at(new_x + w, feet) {
                self.body.grounded = true;
                self.body.vy = 0.0;
                self.body.y = grid.row_top(feet) - h;
            } else {
                self.body.y = new_y;
            }
        }

        let mid = self.body.y + h / 2.0;
        if !grid.solid_at(new_x, mid) && !grid.solid_at(new_x + w, mid) {
            self.body.x = new_x;
        }

        clamp_velocity(&mut self.body, config.max_vx, config.max_vy);
        self.body.x = self.body.x.clamp(0.0, (grid.width_px() - w).max(0.0));
        self.body.y = self.body.y.clamp(0.0, (grid.height_px() - h).max(0.0));

        actions
    }

    /// Clip for the current movement state
    pub fn clip(&self) -> &'static str {
        if self.on_ladder {
            clips::PLAYER_CLIMB
        } else if self.on_rope {
            clips::PLAYER_HANG
        } else if !self.body.grounded {
            clips::PLAYER_FALL
        } else if self.body.vx != 0.0 {
            clips::PLAYER_RUN
        } else {
            clips::PLAYER_IDLE
        }
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub body: Body,
    pub facing: Facing,
    pub animator: Animator,
}

impl Enemy {
    /// Starts walking right at `speed`
    pub fn new(id: u32, spawn: Point, size: f32, speed: f32, animator: Animator) -> Self {
        let mut body = Body::new(spawn.x, spawn.y, size, size);
        body.vx = speed;
        Self {
            id,
            body,
            facing: Facing::Right,
            animator,
        }
    }

    /// Patrol step: walk, turn at walls, fall until something is underfoot
    pub fn update(&mut self, grid: &TileGrid, config: &SimConfig) {
        let body = &mut self.body;
        body.x += body.vx;

        let ahead = if body.vx > 0.0 { body.x + body.width } else { body.x };
        if is_solid(grid.tile_at(ahead, body.center_y())) {
            body.vx = -body.vx;
            self.facing = Facing::from_vx(body.vx, self.facing);
        }

        apply_gravity(body, config.gravity);

        let probe = body.y + body.height + 1.0;
        if grid.solid_at(body.center_x(), probe) {
            body.grounded = true;
            body.vy = 0.0;
            body.y = grid.row_top(probe) - body.height;
        } else {
            body.y += body.vy;
            body.grounded = false;
        }
    }

    pub fn clip(&self) -> &'static str {
        if self.body.grounded {
            clips::ENEMY_WALK
        } else {
            clips::ENEMY_FALL
        }
    }
}

/// A gold pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    /// Centre of the pickup box
    pub position: Point,
    pub collected: bool,
}

impl Pickup {
    pub fn new(id: u32, position: Point) -> Self {
        Self {
            id,
            position,
            collected: false,
        }
    }

    pub fn rect(&self, size: f32) -> Rect {
        Rect::centered(self.position.x, self.position.y, size)
    }

    /// Flip to collected; false if it already was
    pub fn collect(&mut self) -> bool {
        !std::mem::replace(&mut self.collected, true)
    }
}
