//! Static tile grid for one level.
//!
//! Rows are authored as strings of single-character symbols. The grid is
//! built once at level load and never mutated; out-of-range queries return
//! `None`, which every predicate treats as passable.

use serde::{Deserialize, Serialize};

use crate::level::LevelError;

/// One cell of the level grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Solid,
    Ladder,
    Rope,
}

impl Tile {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            ' ' => Some(Tile::Empty),
            '#' => Some(Tile::Solid),
            '=' => Some(Tile::Ladder),
            '-' => Some(Tile::Rope),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Solid => '#',
            Tile::Ladder => '=',
            Tile::Rope => '-',
        }
    }

    /// Ladders and ropes override gravity with direct vertical control
    pub fn is_climbable(&self) -> bool {
        matches!(self, Tile::Ladder | Tile::Rope)
    }
}

pub fn is_solid(tile: Option<Tile>) -> bool {
    tile == Some(Tile::Solid)
}

pub fn is_ladder(tile: Option<Tile>) -> bool {
    tile == Some(Tile::Ladder)
}

pub fn is_rope(tile: Option<Tile>) -> bool {
    tile == Some(Tile::Rope)
}

/// Immutable rectangular tile grid
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    tiles: Vec<Tile>,
    width: usize,
    height: usize,
    tile_size: f32,
}

impl TileGrid {
    /// Build from authored rows. Every row must have the same length and
    /// contain only tile symbols.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], tile_size: f32) -> Result<Self, LevelError> {
        let Some(first) = rows.first() else {
            return Err(LevelError::EmptyGrid);
        };
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(LevelError::EmptyGrid);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(LevelError::RaggedRow {
                    row: row_idx,
                    expected: width,
                    found,
                });
            }
            for (col, symbol) in row.chars().enumerate() {
                let tile = Tile::from_symbol(symbol).ok_or(LevelError::UnknownSymbol {
                    row: row_idx,
                    col,
                    symbol,
                })?;
                tiles.push(tile);
            }
        }

        Ok(Self {
            tiles,
            width,
            height: rows.len(),
            tile_size,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn width_px(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    pub fn height_px(&self) -> f32 {
        self.height as f32 * self.tile_size
    }

    /// Tile by column/row index
    pub fn get(&self, col: usize, row: usize) -> Option<Tile> {
        if col < self.width && row < self.height {
            Some(self.tiles[row * self.width + col])
        } else {
            None
        }
    }

    /// Tile under a pixel coordinate; `None` outside the grid
    pub fn tile_at(&self, px: f32, py: f32) -> Option<Tile> {
        if !px.is_finite() || !py.is_finite() {
            return None;
        }
        let col = (px / self.tile_size).floor();
        let row = (py / self.tile_size).floor();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        self.get(col as usize, row as usize)
    }

    pub fn solid_at(&self, px: f32, py: f32) -> bool {
        is_solid(self.tile_at(px, py))
    }

    /// Pixel y of the top edge of the row containing `py`
    pub fn row_top(&self, py: f32) -> f32 {
        (py / self.tile_size).floor() * self.tile_size
    }

    /// Authored rows, markers already stripped
    pub fn rows(&self) -> Vec<String> {
        self.tiles
            .chunks(self.width)
            .map(|row| row.iter().map(Tile::symbol).collect())
            .collect()
    }
}
