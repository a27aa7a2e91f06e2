//! Runner Sim - Simulation Core Library
//!
//! Deterministic core of a ladder-and-rope tile platformer:
//! - Tile grid and point queries
//! - AABB collision
//! - Per-tick kinematics
//! - Sprite animation clocks
//! - Fixed-timestep scheduling with a catch-up cap
//! - Level simulation (player, patrolling enemies, gold, win/lose)
//! - Input recording and replay verification
//!
//! Rendering, audio and persistence stay outside; see `hooks`.

pub mod animation;
pub mod collision;
pub mod config;
pub mod constants;
pub mod grid;
pub mod hooks;
pub mod input;
pub mod level;
pub mod logging;
pub mod physics;
pub mod replay;
pub mod scheduler;
pub mod session;
