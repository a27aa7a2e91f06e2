//! Centralized game constants for the runner simulation core.
//!
//! These are the authored tuning values of the game. `SimConfig`
//! defaults to exactly these numbers; code that takes a config reads the
//! config, tests and pure helpers read the constants.

use std::time::Duration;

// =====================================================
// Timing
// =====================================================

/// Simulation ticks per second
pub const TICK_RATE: u32 = 60;

/// Fixed tick duration (1/60 s, rounded to the nearest nanosecond)
pub const TICK_DURATION: Duration = Duration::from_nanos(16_666_667);

/// Upper bound on ticks drained by a single frame arrival
pub const MAX_CATCH_UP_TICKS: u32 = 5;

// =====================================================
// Grid
// =====================================================

/// Edge length of one square tile in pixels
pub const TILE_SIZE: f32 = 16.0;

// =====================================================
// Physics (per tick, not scaled by delta time)
// =====================================================

/// Downward acceleration added to vy each tick while airborne
pub const GRAVITY: f32 = 0.5;

/// Default horizontal speed limit
pub const MAX_VX: f32 = 10.0;

/// Default vertical speed limit
pub const MAX_VY: f32 = 15.0;

/// Horizontal damping applied by `apply_friction` when no factor is chosen
pub const GROUND_FRICTION: f32 = 0.8;

// =====================================================
// Player
// =====================================================

/// Run and climb speed at full stick deflection (px/tick)
pub const PLAYER_SPEED: f32 = 3.0;

/// Initial vy of a jump (negative is up)
pub const JUMP_FORCE: f32 = -8.0;

/// Analog magnitude at or below which an axis reads as zero
pub const INPUT_DEADZONE: f32 = 0.3;

/// Lives at the start of a level attempt
pub const STARTING_LIVES: u32 = 3;

// =====================================================
// Entities
// =====================================================

/// Width and height of player and enemy bodies
pub const ENTITY_SIZE: f32 = 14.0;

/// Patrol speed of a freshly spawned enemy (px/tick)
pub const ENEMY_SPEED: f32 = 1.0;

/// Edge length of the square box centred on a gold pickup
pub const PICKUP_SIZE: f32 = 12.0;

/// Score awarded per collected pickup
pub const PICKUP_SCORE: u32 = 100;
