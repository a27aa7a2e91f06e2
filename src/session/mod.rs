//! Level simulation.
//!
//! A `Session` owns every entity of one level attempt as plain records and
//! advances them in a fixed order each tick: player, enemies, pickups, enemy
//! contact, win check. Nothing outside the session mutates entity state.
//! Results leave through the collaborator seams in `hooks`.

mod entities;
mod snapshot;

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::{debug, info, warn};

use crate::animation::AnimationLibrary;
use crate::collision::{first_overlap, overlaps, Rect};
use crate::config::{ConfigError, SimConfig};
use crate::hooks::{Cue, Hooks, ScoreRecord};
use crate::input::{InputFrame, InputSource, NoInput};
use crate::level::Level;
use crate::physics::Body;
use crate::scheduler::FrameHandler;

pub use entities::{Enemy, Facing, Pickup, Player, PlayerActions};
pub use snapshot::{EntityView, PickupView, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelState {
    #[default]
    Playing,
    Paused,
    Complete,
    Over,
    Abandoned,
}

impl LevelState {
    /// The attempt is finished and no further tick will run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LevelState::Complete | LevelState::Over | LevelState::Abandoned
        )
    }
}

pub struct Session {
    level: Level,
    config: SimConfig,
    player: Player,
    enemies: Vec<Enemy>,
    pickups: Vec<Pickup>,
    score: u32,
    lives: u32,
    state: LevelState,
    tick_count: u64,
    tick_seconds: f32,
    hooks: Hooks,
    input: Box<dyn InputSource>,
    recording: Option<Vec<InputFrame>>,
}

impl Session {
    /// The level's grid is already laid out in pixels, so its tile size
    /// wins over `config.tile_size`.
    pub fn new(level: Level, mut config: SimConfig) -> Self {
        let tile_size = level.grid.tile_size();
        if config.tile_size != tile_size {
            warn!(
                config = config.tile_size,
                level = tile_size,
                "tile size differs from the level's, using the level's"
            );
            config.tile_size = tile_size;
        }
        let size = config.entity_size;
        let player = Player::new(level.player_spawn, size, Default::default());
        let enemies = level
            .enemy_spawns
            .iter()
            .enumerate()
            .map(|(id, spawn)| {
                Enemy::new(id as u32, *spawn, size, config.enemy_speed, Default::default())
            })
            .collect();
        let pickups = level
            .gold_spawns
            .iter()
            .enumerate()
            .map(|(id, position)| Pickup::new(id as u32, *position))
            .collect();

        Self {
            player,
            enemies,
            pickups,
            score: 0,
            lives: config.starting_lives,
            state: LevelState::Playing,
            tick_count: 0,
            tick_seconds: config.tick_duration().as_secs_f32(),
            hooks: Hooks::default(),
            input: Box::new(NoInput),
            recording: None,
            level,
            config,
        }
    }

    /// Validating constructor: rejects a bad config and a tile size that
    /// disagrees with the level instead of adopting the level's
    pub fn try_new(level: Level, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.tile_size != level.grid.tile_size() {
            return Err(ConfigError::OutOfRange {
                field: "tile_size",
                reason: format!(
                    "level {} is laid out with {}px tiles",
                    level.id,
                    level.grid.tile_size()
                ),
            });
        }
        Ok(Self::new(level, config))
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_input(mut self, input: impl InputSource + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Give every entity its own animator over the shared clips
    pub fn with_animations(mut self, library: &AnimationLibrary) -> Self {
        self.player.animator = library.animator();
        for enemy in &mut self.enemies {
            enemy.animator = library.animator();
        }
        self
    }

    /// Keep every input frame that drives a tick, for replays
    pub fn record_inputs(mut self) -> Self {
        self.recording = Some(Vec::new());
        self
    }

    pub fn set_input(&mut self, input: impl InputSource + 'static) {
        self.input = Box::new(input);
    }

    /// One tick with the frame pulled from the input source
    pub fn tick(&mut self, dt: f32) {
        if self.state != LevelState::Playing {
            return;
        }
        let input = self.input.current();
        self.run_tick(input, dt);
    }

    /// One tick with an explicit input frame
    pub fn step(&mut self, input: InputFrame) {
        self.run_tick(input, self.tick_seconds);
    }

    fn run_tick(&mut self, input: InputFrame, dt: f32) {
        if self.state != LevelState::Playing {
            return;
        }
        if let Some(frames) = &mut self.recording {
            frames.push(input);
        }
        self.tick_count += 1;

        let actions = self.player.update(&input, &self.level.grid, &self.config);
        if actions.jumped {
            self.signal(Cue::Jump);
        }
        if actions.dug {
            self.signal(Cue::Dig);
        }

        for enemy in &mut self.enemies {
            enemy.update(&self.level.grid, &self.config);
        }
        self.animate(dt);

        let player_rect = self.player.body.rect();
        let collected = self.collect_pickups(&player_rect);
        for _ in 0..collected {
            self.signal(Cue::Collect);
        }

        let enemy_rects: Vec<Rect> = self.enemies.iter().map(|e| e.body.rect()).collect();
        if let Some((index, _)) = first_overlap(&player_rect, &enemy_rects) {
            debug!(tick = self.tick_count, enemy = self.enemies[index].id, "enemy contact");
            self.kill_player();
            if self.state == LevelState::Over {
                return;
            }
        }

        if self.pickups.iter().all(|p| p.collected) {
            self.complete();
        }
    }

    fn animate(&mut self, dt: f32) {
        let clip = self.player.clip();
        self.player.animator.play(clip, false);
        self.player.animator.advance(dt);
        for enemy in &mut self.enemies {
            let clip = enemy.clip();
            enemy.animator.play(clip, false);
            enemy.animator.advance(dt);
        }
    }

    fn collect_pickups(&mut self, player_rect: &Rect) -> u32 {
        let size = self.config.pickup_size;
        let mut collected = 0;
        for pickup in &mut self.pickups {
            if !pickup.collected && overlaps(player_rect, &pickup.rect(size)) && pickup.collect() {
                collected += 1;
                self.score += self.config.pickup_score;
                debug!(pickup = pickup.id, score = self.score, "gold collected");
            }
        }
        collected
    }

    fn kill_player(&mut self) {
        self.signal(Cue::Die);
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.state = LevelState::Over;
            info!(level = self.level.id, score = self.score, ticks = self.tick_count, "game over");
            self.hooks.observer.on_game_over(self.score);
            self.hooks
                .scores
                .record(ScoreRecord::now(self.score, self.level.id));
        } else {
            debug!(lives = self.lives, "player respawned");
            self.player.respawn();
        }
    }

    fn complete(&mut self) {
        self.state = LevelState::Complete;
        info!(level = self.level.id, score = self.score, ticks = self.tick_count, "level complete");
        self.signal(Cue::LevelComplete);
        self.hooks.observer.on_level_complete(self.score);
        self.hooks
            .scores
            .record(ScoreRecord::now(self.score, self.level.id));
    }

    fn signal(&mut self, cue: Cue) {
        if let Err(err) = self.hooks.signaler.signal(cue) {
            debug!(%err, "signal failed, ignoring");
        }
    }

    pub fn pause(&mut self) {
        if self.state == LevelState::Playing {
            self.state = LevelState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == LevelState::Paused {
            self.state = LevelState::Playing;
        }
    }

    /// Leave the level early; fires `on_exit` once
    pub fn abandon(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = LevelState::Abandoned;
        info!(level = self.level.id, score = self.score, "level abandoned");
        self.hooks.observer.on_exit();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            level_id: self.level.id,
            tick: self.tick_count,
            state: self.state,
            score: self.score,
            lives: self.lives,
            on_ladder: self.player.on_ladder,
            on_rope: self.player.on_rope,
            player: EntityView::player(&self.player),
            enemies: self.enemies.iter().map(EntityView::enemy).collect(),
            pickups: self.pickups.iter().map(PickupView::from).collect(),
        }
    }

    /// SHA3-256 over the full simulation state, lowercase hex
    pub fn digest(&self) -> String {
        let mut hasher = Sha3_256::new();
        hasher.update(self.level.id.to_le_bytes());
        hasher.update(self.tick_count.to_le_bytes());
        hasher.update([self.state as u8]);
        hasher.update(self.score.to_le_bytes());
        hasher.update(self.lives.to_le_bytes());

        hash_body(&mut hasher, &self.player.body);
        hasher.update([
            self.player.on_ladder as u8,
            self.player.on_rope as u8,
            self.player.facing as u8,
        ]);
        for enemy in &self.enemies {
            hasher.update(enemy.id.to_le_bytes());
            hash_body(&mut hasher, &enemy.body);
            hasher.update([enemy.facing as u8]);
        }
        for pickup in &self.pickups {
            hasher.update(pickup.id.to_le_bytes());
            hasher.update([pickup.collected as u8]);
        }

        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    pub fn pickups_mut(&mut self) -> &mut [Pickup] {
        &mut self.pickups
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn state(&self) -> LevelState {
        self.state
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Frames recorded so far, if recording was enabled
    pub fn recorded_inputs(&self) -> Option<&[InputFrame]> {
        self.recording.as_deref()
    }
}

fn hash_body(hasher: &mut Sha3_256, body: &Body) {
    for value in [body.x, body.y, body.width, body.height, body.vx, body.vy] {
        hasher.update(value.to_bits().to_le_bytes());
    }
    hasher.update([body.grounded as u8]);
}

impl FrameHandler for Session {
    fn update(&mut self, dt: f32) {
        self.tick(dt);
    }

    fn render(&mut self) {
        let snapshot = self.snapshot();
        self.hooks.renderer.render(&snapshot);
    }

    fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }
}
