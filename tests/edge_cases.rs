//! Edge case & boundary tests
//!
//! Tests behavior at system boundaries:
//! - Malformed level data fails at load, never mid-tick
//! - Out-of-range and non-finite tile queries are passable
//! - Missing or degenerate animation clips
//! - Failing collaborators never abort a tick
//! - Scheduler catch-up cap and stop idempotence

use std::time::{Duration, Instant};

use runner_core::animation::{AnimationClip, Animator, FrameRect};
use runner_core::collision::{first_overlap, overlap_side, overlaps, Rect, Side};
use runner_core::config::{ConfigError, SimConfig};
use runner_core::grid::{is_solid, Tile, TileGrid};
use runner_core::hooks::{Cue, EventLog, HookEvent, Hooks, SignalError, Signaler};
use runner_core::input::InputFrame;
use runner_core::level::{Level, LevelDef, LevelError, TileCoord};
use runner_core::scheduler::{FixedTimestep, FrameHandler, GameLoop};
use runner_core::session::{LevelState, Session};

// ============================================================
// Helpers
// ============================================================

fn load(rows: &[&str]) -> Result<Level, LevelError> {
    Level::from_def(&LevelDef::from_rows(1, "edge", rows), 16.0)
}

fn frame(n: u32) -> FrameRect {
    FrameRect {
        x: n * 16,
        y: 0,
        width: 16,
        height: 16,
    }
}

// ============================================================
// 1. Malformed levels
// ============================================================

#[test]
fn empty_level_rejected() {
    assert!(matches!(load(&[]), Err(LevelError::EmptyGrid)));
    assert!(matches!(load(&["", ""]), Err(LevelError::EmptyGrid)));
}

#[test]
fn ragged_level_rejected() {
    let err = load(&["#######", "#P =  #", "# G =#", "#######"]).unwrap_err();
    assert!(matches!(
        err,
        LevelError::RaggedRow {
            row: 2,
            expected: 7,
            found: 6
        }
    ));
    assert!(err.to_string().contains("row 2"));
}

#[test]
fn unknown_symbol_rejected() {
    let err = load(&["####", "#P?#", "####"]).unwrap_err();
    assert!(matches!(
        err,
        LevelError::UnknownSymbol {
            row: 1,
            col: 2,
            symbol: '?'
        }
    ));
}

#[test]
fn spawn_errors_reported() {
    assert!(matches!(
        load(&["####", "#  #", "####"]),
        Err(LevelError::MissingPlayerSpawn)
    ));
    assert!(matches!(
        load(&["####", "#PP#", "####"]),
        Err(LevelError::DuplicatePlayerSpawn)
    ));

    let mut def = LevelDef::from_rows(1, "edge", &["####", "#P #", "####"]);
    def.gold = vec![TileCoord::new(4, 1)];
    assert!(matches!(
        Level::from_def(&def, 16.0),
        Err(LevelError::SpawnOutOfBounds { col: 4, .. })
    ));
}

#[test]
fn malformed_level_ron_rejected() {
    assert!(matches!(
        LevelDef::from_ron("(id: 1, rows: [\"###\""),
        Err(LevelError::Parse(_))
    ));
}

#[test]
fn missing_level_file_is_io_error() {
    let err = Level::load(std::path::Path::new("/nonexistent/level.ron"), 16.0).unwrap_err();
    assert!(matches!(err, LevelError::Io { .. }));
}

// ============================================================
// 2. Tile queries at the boundary
// ============================================================

#[test]
fn tile_queries_outside_grid_are_passable() {
    let grid = TileGrid::from_rows(&["##", "##"], 16.0).unwrap();
    assert_eq!(grid.tile_at(0.0, 0.0), Some(Tile::Solid));
    assert_eq!(grid.tile_at(31.999, 31.999), Some(Tile::Solid));
    assert_eq!(grid.tile_at(32.0, 0.0), None);
    assert_eq!(grid.tile_at(0.0, 32.0), None);
    assert_eq!(grid.tile_at(-0.001, 5.0), None);
    assert_eq!(grid.tile_at(f32::NAN, 5.0), None);
    assert_eq!(grid.tile_at(5.0, f32::INFINITY), None);
    assert!(!is_solid(grid.tile_at(-100.0, -100.0)));
}

#[test]
fn level_without_walls_clamps_player() {
    // gold out of reach keeps the level running
    let mut session = Session::new(load(&["P  G"]).unwrap(), SimConfig::default());
    for _ in 0..20 {
        session.step(InputFrame::stick(-1.0, 0.0));
    }
    assert_eq!(session.state(), LevelState::Playing);
    assert_eq!(session.tick_count(), 20);
    let body = &session.player().body;
    assert_eq!(body.x, 0.0);
    assert_eq!(body.y, 2.0);
}

// ============================================================
// 3. Collision boundaries
// ============================================================

#[test]
fn touching_boxes_do_not_overlap() {
    let a = Rect::new(0.0, 0.0, 14.0, 14.0);
    let right = Rect::new(14.0, 0.0, 12.0, 12.0);
    let below = Rect::new(0.0, 14.0, 12.0, 12.0);
    assert!(!overlaps(&a, &right));
    assert!(!overlaps(&a, &below));
    assert_eq!(overlap_side(&a, &right), None);
    assert!(first_overlap(&a, &[right, below]).is_none());
}

#[test]
fn exact_diagonal_tie_resolves_vertically() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(5.0, 5.0, 10.0, 10.0);
    assert_eq!(overlap_side(&a, &b), Some(Side::Bottom));
    assert_eq!(overlap_side(&b, &a), Some(Side::Top));
}

// ============================================================
// 4. Animation edge cases
// ============================================================

#[test]
fn unknown_clip_has_no_frame() {
    let mut animator = Animator::new();
    animator.play("missing", false);
    animator.advance(1.0);
    assert_eq!(animator.current_frame(), None);
    assert_eq!(animator.current_clip(), Some("missing"));
}

#[test]
fn zero_rate_and_empty_clips_never_advance() {
    let mut animator = Animator::new();
    animator.add_clip("frozen", AnimationClip::new(vec![frame(0), frame(1)], 0.0, true));
    animator.add_clip("empty", AnimationClip::new(Vec::new(), 10.0, true));

    animator.play("frozen", false);
    for _ in 0..100 {
        animator.advance(1.0);
    }
    assert_eq!(animator.frame_index(), Some(0));

    animator.play("empty", false);
    animator.advance(1.0);
    assert_eq!(animator.current_frame(), None);
    assert!(!animator.is_finished());
}

#[test]
fn one_shot_clip_stays_on_last_frame() {
    let mut animator = Animator::new();
    animator.add_clip("shot", AnimationClip::new(vec![frame(0), frame(1), frame(2)], 10.0, false));
    animator.play("shot", false);
    for _ in 0..3 {
        animator.advance(0.1);
    }
    assert!(animator.is_finished());
    assert_eq!(animator.current_frame(), Some(frame(2)));
    animator.advance(5.0);
    assert_eq!(animator.frame_index(), Some(2));
}

#[test]
fn removed_clip_leaves_no_frame() {
    let mut animator = Animator::new();
    animator.add_clip("walk", AnimationClip::new(vec![frame(0)], 10.0, true));
    animator.play("walk", false);
    assert!(animator.current_frame().is_some());
    assert!(animator.remove_clip("walk").is_some());
    assert_eq!(animator.current_frame(), None);
}

// ============================================================
// 5. Collaborator failures
// ============================================================

struct AlwaysFails;

impl Signaler for AlwaysFails {
    fn signal(&mut self, cue: Cue) -> Result<(), SignalError> {
        Err(SignalError::new(cue, "haptics unavailable"))
    }
}

#[test]
fn failing_signaler_never_aborts_a_tick() {
    let log = EventLog::new();
    let mut hooks = Hooks::logged(&log);
    hooks.signaler = Box::new(AlwaysFails);

    let mut def = LevelDef::from_rows(1, "edge", &["#######", "#P   G#", "#######"]);
    def.enemies = vec![TileCoord::new(1, 1)];
    let mut session = Session::new(Level::from_def(&def, 16.0).unwrap(), SimConfig::default())
        .with_hooks(hooks);

    for _ in 0..3 {
        session.step(InputFrame::idle().with_a().with_b());
    }
    assert_eq!(session.state(), LevelState::Over);
    assert!(log.cues().is_empty());
    assert_eq!(log.count(&HookEvent::GameOver { score: 0 }), 1);
}

// ============================================================
// 6. Configuration edge cases
// ============================================================

#[test]
fn config_out_of_range_rejected() {
    for source in [
        "(tick_rate: 0)",
        "(max_catch_up_ticks: Some(0))",
        "(tile_size: -16.0)",
        "(starting_lives: 0)",
        "(pickup_size: 0.0)",
    ] {
        assert!(
            matches!(SimConfig::from_ron(source), Err(ConfigError::OutOfRange { .. })),
            "{source} should be rejected"
        );
    }
}

#[test]
fn unbounded_catch_up_from_config() {
    let config = SimConfig::from_ron("(max_catch_up_ticks: None)").unwrap();
    assert_eq!(config.max_catch_up_ticks, None);
}

// ============================================================
// 7. Scheduler boundaries
// ============================================================

#[derive(Default)]
struct Ticks {
    updates: u32,
    renders: u32,
}

impl FrameHandler for Ticks {
    fn update(&mut self, _dt: f32) {
        self.updates += 1;
    }

    fn render(&mut self) {
        self.renders += 1;
    }
}

#[test]
fn long_stall_is_capped() {
    let t0 = Instant::now();
    let mut step = FixedTimestep::from_config(&SimConfig::default());
    let mut ticks = Ticks::default();
    step.start(t0);

    let report = step.frame(t0 + Duration::from_secs(10), &mut ticks);
    assert_eq!(report.ticks, 5);
    assert!(report.dropped > 500);
    assert!(step.accumulator() < step.tick_duration());
    assert_eq!(ticks.renders, 1);

    let report = step.frame(t0 + Duration::from_secs(10) + step.tick_duration(), &mut ticks);
    assert_eq!(report.ticks, 1);
    assert_eq!(report.dropped, 0);
}

#[test]
fn frame_at_same_instant_only_renders() {
    let t0 = Instant::now();
    let mut step = FixedTimestep::new(Duration::from_millis(16));
    let mut ticks = Ticks::default();
    step.start(t0);
    step.frame(t0, &mut ticks);
    step.frame(t0, &mut ticks);
    assert_eq!(ticks.updates, 0);
    assert_eq!(ticks.renders, 2);
}

#[test]
fn game_loop_stop_is_idempotent() {
    let config = SimConfig {
        frame_interval_ms: Some(1),
        ..SimConfig::default()
    };
    let mut game_loop = GameLoop::spawn(Ticks::default(), &config).unwrap();
    let first = game_loop.stop();
    assert!(first.is_some());
    assert!(game_loop.stop().is_none());
    assert!(game_loop.stop().is_none());
    assert!(!game_loop.is_running());
}

#[test]
fn dropping_a_running_loop_stops_it() {
    let config = SimConfig {
        frame_interval_ms: Some(1),
        ..SimConfig::default()
    };
    let game_loop = GameLoop::spawn(Ticks::default(), &config).unwrap();
    drop(game_loop);
}
