//! Kinematic body integration.
//!
//! Every function is a tick-constant step: the scheduler guarantees a fixed
//! tick duration, so accelerations are plain per-tick increments and the
//! results are bit-for-bit reproducible.

use serde::{Deserialize, Serialize};

use crate::collision::Rect;

/// Position, size and velocity of one moving entity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
    pub grounded: bool,
}

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Zero both velocity components
    pub fn halt(&mut self) {
        self.vx = 0.0;
        self.vy = 0.0;
    }
}

/// Add `gravity` to vy unless grounded
pub fn apply_gravity(body: &mut Body, gravity: f32) {
    if !body.grounded {
        body.vy += gravity;
    }
}

/// Explicit Euler step, one tick = one unit of integration
pub fn integrate_position(body: &mut Body) {
    body.x += body.vx;
    body.y += body.vy;
}

/// Symmetric per-axis clamp to [-max, max]
pub fn clamp_velocity(body: &mut Body, max_vx: f32, max_vy: f32) {
    body.vx = body.vx.clamp(-max_vx, max_vx);
    body.vy = body.vy.clamp(-max_vy, max_vy);
}

/// Damp horizontal speed by `factor` while grounded
pub fn apply_friction(body: &mut Body, factor: f32) {
    if body.grounded {
        body.vx *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{GRAVITY, GROUND_FRICTION, MAX_VX, MAX_VY};

    #[test]
    fn test_gravity_single_increment() {
        let mut body = Body::new(0.0, 10.0, 14.0, 14.0);
        apply_gravity(&mut body, GRAVITY);
        assert_eq!(body.vy, GRAVITY);
        integrate_position(&mut body);
        assert_eq!(body.y, 10.0 + GRAVITY);
    }

    #[test]
    fn test_gravity_skipped_when_grounded() {
        let mut body = Body::new(0.0, 0.0, 14.0, 14.0);
        body.grounded = true;
        apply_gravity(&mut body, GRAVITY);
        assert_eq!(body.vy, 0.0);
    }

    #[test]
    fn test_gravity_accumulates() {
        let mut body = Body::new(0.0, 0.0, 14.0, 14.0);
        for _ in 0..4 {
            apply_gravity(&mut body, GRAVITY);
        }
        assert_eq!(body.vy, 4.0 * GRAVITY);
    }

    #[test]
    fn test_integrate_both_axes() {
        let mut body = Body::new(5.0, 5.0, 14.0, 14.0);
        body.vx = -2.0;
        body.vy = 3.0;
        integrate_position(&mut body);
        assert_eq!((body.x, body.y), (3.0, 8.0));
    }

    #[test]
    fn test_clamp_velocity_symmetric() {
        let mut body = Body::new(0.0, 0.0, 1.0, 1.0);
        body.vx = 25.0;
        body.vy = -40.0;
        clamp_velocity(&mut body, MAX_VX, MAX_VY);
        assert_eq!(body.vx, MAX_VX);
        assert_eq!(body.vy, -MAX_VY);

        body.vx = -3.0;
        body.vy = 2.0;
        clamp_velocity(&mut body, MAX_VX, MAX_VY);
        assert_eq!((body.vx, body.vy), (-3.0, 2.0));
    }

    #[test]
    fn test_clamp_velocity_custom_limits() {
        let mut body = Body::new(0.0, 0.0, 1.0, 1.0);
        body.vx = 5.0;
        body.vy = 5.0;
        clamp_velocity(&mut body, 1.0, 2.0);
        assert_eq!((body.vx, body.vy), (1.0, 2.0));
    }

    #[test]
    fn test_friction_only_on_ground() {
        let mut body = Body::new(0.0, 0.0, 1.0, 1.0);
        body.vx = 10.0;
        body.vy = 4.0;
        apply_friction(&mut body, GROUND_FRICTION);
        assert_eq!(body.vx, 10.0);

        body.grounded = true;
        apply_friction(&mut body, GROUND_FRICTION);
        assert_eq!(body.vx, 8.0);
        assert_eq!(body.vy, 4.0);
    }

    #[test]
    fn test_body_helpers() {
        let mut body = Body::new(2.0, 4.0, 14.0, 10.0);
        assert_eq!(body.center_x(), 9.0);
        assert_eq!(body.center_y(), 9.0);
        assert_eq!(body.rect(), Rect::new(2.0, 4.0, 14.0, 10.0));
        body.vx = 1.0;
        body.vy = 1.0;
        body.halt();
        assert_eq!((body.vx, body.vy), (0.0, 0.0));
    }
}
