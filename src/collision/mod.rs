//! Axis-aligned box queries.
//!
//! `overlaps` uses open intervals (touching edges do not collide) while
//! `point_in_rect` is closed on every edge. Callers that probe "standing
//! exactly on a boundary" depend on that asymmetry.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of `size` centred on (cx, cy)
    pub fn centered(cx: f32, cy: f32, size: f32) -> Self {
        Self::new(cx - size / 2.0, cy - size / 2.0, size, size)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A pixel-space position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Side of `b` that `a` is pressing against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// Open-interval AABB test
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// First candidate (in iteration order) overlapping `entity`, with its index
pub fn first_overlap<'a, I>(entity: &Rect, candidates: I) -> Option<(usize, &'a Rect)>
where
    I: IntoIterator<Item = &'a Rect>,
{
    candidates
        .into_iter()
        .enumerate()
        .find(|(_, candidate)| overlaps(entity, candidate))
}

/// Dominant-axis side classification of an overlap.
///
/// `dx`/`dy` are measured from `b`'s centre to `a`'s centre. Equal magnitudes
/// resolve vertically.
pub fn overlap_side(a: &Rect, b: &Rect) -> Option<Side> {
    if !overlaps(a, b) {
        return None;
    }

    let ca = a.center();
    let cb = b.center();
    let dx = ca.x - cb.x;
    let dy = ca.y - cb.y;

    let side = if dx.abs() > dy.abs() {
        if dx > 0.0 {
            Side::Left
        } else {
            Side::Right
        }
    } else if dy > 0.0 {
        Side::Top
    } else {
        Side::Bottom
    };
    Some(side)
}

/// Closed-interval point containment
pub fn point_in_rect(px: f32, py: f32, rect: &Rect) -> bool {
    px >= rect.x && px <= rect.right() && py >= rect.y && py <= rect.bottom()
}
