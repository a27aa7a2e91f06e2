//! Level authoring format and load-time validation.
//!
//! A `LevelDef` is what designers write (RON): symbol rows plus spawn points
//! in tile coordinates, either listed explicitly or placed in the rows with
//! the `P`, `E` and `G` markers. `Level::from_def` validates everything and
//! resolves spawns to pixels; no tick ever sees an unvalidated level.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::collision::Point;
use crate::grid::{Tile, TileGrid};

pub const PLAYER_MARKER: char = 'P';
pub const ENEMY_MARKER: char = 'E';
pub const GOLD_MARKER: char = 'G';

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level grid has no rows or no columns")]
    EmptyGrid,
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile symbol {symbol:?} at row {row}, column {col}")]
    UnknownSymbol { row: usize, col: usize, symbol: char },
    #[error("level has no player spawn")]
    MissingPlayerSpawn,
    #[error("level has more than one player spawn")]
    DuplicatePlayerSpawn,
    #[error("{kind} spawn at tile ({col}, {row}) is outside the {width}x{height} grid")]
    SpawnOutOfBounds {
        kind: SpawnKind,
        col: u32,
        row: u32,
        width: usize,
        height: usize,
    },
    #[error("{kind} spawn at tile ({col}, {row}) is inside a solid tile")]
    SpawnInSolid { kind: SpawnKind, col: u32, row: u32 },
    #[error("failed to read level file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid level definition: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    Player,
    Enemy,
    Gold,
}

impl std::fmt::Display for SpawnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpawnKind::Player => write!(f, "player"),
            SpawnKind::Enemy => write!(f, "enemy"),
            SpawnKind::Gold => write!(f, "gold"),
        }
    }
}

/// Column/row of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub col: u32,
    pub row: u32,
}

impl TileCoord {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// Authored level, as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub rows: Vec<String>,
    #[serde(default)]
    pub player_spawn: Option<TileCoord>,
    #[serde(default)]
    pub enemies: Vec<TileCoord>,
    #[serde(default)]
    pub gold: Vec<TileCoord>,
}

impl LevelDef {
    /// Definition whose spawns all come from row markers
    pub fn from_rows<S: AsRef<str>>(id: u32, name: &str, rows: &[S]) -> Self {
        Self {
            id,
            name: name.to_string(),
            rows: rows.iter().map(|r| r.as_ref().to_string()).collect(),
            player_spawn: None,
            enemies: Vec::new(),
            gold: Vec::new(),
        }
    }

    pub fn from_ron(source: &str) -> Result<Self, LevelError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let source = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron(&source)
    }

    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

/// Validated level with spawns resolved to pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub id: u32,
    pub name: String,
    pub grid: TileGrid,
    /// Top-left of the player body
    pub player_spawn: Point,
    /// Top-left of each enemy body
    pub enemy_spawns: Vec<Point>,
    /// Centre of each gold pickup
    pub gold_spawns: Vec<Point>,
}

impl Level {
    pub fn from_def(def: &LevelDef, tile_size: f32) -> Result<Self, LevelError> {
        let mut player = def.player_spawn.into_iter().collect::<Vec<_>>();
        let mut enemies = def.enemies.clone();
        let mut gold = def.gold.clone();

        let mut stripped = Vec::with_capacity(def.rows.len());
        for (row, line) in def.rows.iter().enumerate() {
            let mut clean = String::with_capacity(line.len());
            for (col, symbol) in line.chars().enumerate() {
                let here = TileCoord::new(col as u32, row as u32);
                match symbol {
                    PLAYER_MARKER => player.push(here),
                    ENEMY_MARKER => enemies.push(here),
                    GOLD_MARKER => gold.push(here),
                    other => {
                        clean.push(other);
                        continue;
                    }
                }
                clean.push(Tile::Empty.symbol());
            }
            stripped.push(clean);
        }

        let grid = TileGrid::from_rows(&stripped, tile_size)?;

        let player_spawn = match player.as_slice() {
            [] => return Err(LevelError::MissingPlayerSpawn),
            [only] => *only,
            _ => return Err(LevelError::DuplicatePlayerSpawn),
        };
        check_spawn(&grid, SpawnKind::Player, player_spawn)?;
        for coord in &enemies {
            check_spawn(&grid, SpawnKind::Enemy, *coord)?;
        }
        for coord in &gold {
            check_spawn(&grid, SpawnKind::Gold, *coord)?;
        }

        let origin = |c: &TileCoord| {
            Point::new(c.col as f32 * tile_size, c.row as f32 * tile_size)
        };
        let centre = |c: &TileCoord| {
            Point::new(
                (c.col as f32 + 0.5) * tile_size,
                (c.row as f32 + 0.5) * tile_size,
            )
        };

        let level = Self {
            id: def.id,
            name: def.name.clone(),
            player_spawn: origin(&player_spawn),
            enemy_spawns: enemies.iter().map(origin).collect(),
            gold_spawns: gold.iter().map(centre).collect(),
            grid,
        };
        info!(
            level = level.id,
            name = %level.name,
            width = level.grid.width(),
            height = level.grid.height(),
            enemies = level.enemy_spawns.len(),
            gold = level.gold_spawns.len(),
            "level loaded"
        );
        Ok(level)
    }

    pub fn load(path: &Path, tile_size: f32) -> Result<Self, LevelError> {
        Self::from_def(&LevelDef::load(path)?, tile_size)
    }
}

fn check_spawn(grid: &TileGrid, kind: SpawnKind, coord: TileCoord) -> Result<(), LevelError> {
    match grid.get(coord.col as usize, coord.row as usize) {
        None => Err(LevelError::SpawnOutOfBounds {
            kind,
            col: coord.col,
            row: coord.row,
            width: grid.width(),
            height: grid.height(),
        }),
        Some(Tile::Solid) => Err(LevelError::SpawnInSolid {
            kind,
            col: coord.col,
            row: coord.row,
        }),
        Some(_) => Ok(()),
    }
}
