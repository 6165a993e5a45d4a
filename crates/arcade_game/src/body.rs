//! Rectangle bodies with gravity, bounce and world-bound clamping.
//!
//! Contact flags follow the usual arcade convention: `touching` records
//! contacts with solids during the last step, `blocked` records clamping
//! against the world bounds. Either one counts as ground contact.

use arcade_core::render::Rect;

use crate::collision::{Aabb, CollisionMoveResult, Solids};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub aabb: Aabb,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub bounce_x: f32,
    pub bounce_y: f32,
    /// Multiplies the scene gravity; zero for top-down movers.
    pub gravity_scale: f32,
    pub collide_world_bounds: bool,
    pub touching: Contacts,
    pub blocked: Contacts,
    /// Disabled bodies skip simulation and overlap checks.
    pub enabled: bool,
}

impl Body {
    pub fn new(aabb: Aabb) -> Self {
        Self {
            aabb,
            velocity_x: 0.0,
            velocity_y: 0.0,
            bounce_x: 0.0,
            bounce_y: 0.0,
            gravity_scale: 1.0,
            collide_world_bounds: false,
            touching: Contacts::default(),
            blocked: Contacts::default(),
            enabled: true,
        }
    }

    pub fn set_bounce(&mut self, bounce: f32) {
        self.bounce_x = bounce;
        self.bounce_y = bounce;
    }

    pub fn on_ground(&self) -> bool {
        self.touching.down || self.blocked.down
    }

    pub fn stop(&mut self) {
        self.velocity_x = 0.0;
        self.velocity_y = 0.0;
    }

    /// Moves the body to a new center and clears contact state.
    pub fn reset_at(&mut self, center_x: f32, center_y: f32) {
        self.aabb.center_x = center_x;
        self.aabb.center_y = center_y;
        self.stop();
        self.touching = Contacts::default();
        self.blocked = Contacts::default();
    }

    pub fn step(&mut self, dt: f32, gravity: f32, solids: &impl Solids, world_bounds: Option<Rect>) {
        if !self.enabled {
            return;
        }

        self.velocity_y += gravity * self.gravity_scale * dt;

        let dx = self.velocity_x * dt;
        let dy = self.velocity_y * dt;
        let result = solids.move_and_collide_detailed(self.aabb, dx, dy);
        self.apply_collision_result(result);

        self.blocked = Contacts::default();
        if self.collide_world_bounds {
            if let Some(bounds) = world_bounds {
                self.clamp_to_bounds(bounds);
            }
        }
    }

    fn apply_collision_result(&mut self, result: CollisionMoveResult) {
        self.aabb = result.aabb;
        self.touching = Contacts {
            left: result.blocked_left,
            right: result.blocked_right,
            up: result.blocked_up,
            down: result.blocked_down,
        };

        if (result.blocked_left && self.velocity_x < 0.0)
            || (result.blocked_right && self.velocity_x > 0.0)
        {
            self.velocity_x = -self.velocity_x * self.bounce_x;
        }
        if (result.blocked_up && self.velocity_y < 0.0)
            || (result.blocked_down && self.velocity_y > 0.0)
        {
            self.velocity_y = -self.velocity_y * self.bounce_y;
        }
    }

    fn clamp_to_bounds(&mut self, bounds: Rect) {
        if self.aabb.left() < bounds.x {
            self.aabb.center_x = bounds.x + self.aabb.half_w;
            self.blocked.left = true;
            if self.velocity_x < 0.0 {
                self.velocity_x = -self.velocity_x * self.bounce_x;
            }
        } else if self.aabb.right() > bounds.right() {
            self.aabb.center_x = bounds.right() - self.aabb.half_w;
            self.blocked.right = true;
            if self.velocity_x > 0.0 {
                self.velocity_x = -self.velocity_x * self.bounce_x;
            }
        }

        if self.aabb.top() < bounds.y {
            self.aabb.center_y = bounds.y + self.aabb.half_h;
            self.blocked.up = true;
            if self.velocity_y < 0.0 {
                self.velocity_y = -self.velocity_y * self.bounce_y;
            }
        } else if self.aabb.bottom() > bounds.bottom() {
            self.aabb.center_y = bounds.bottom() - self.aabb.half_h;
            self.blocked.down = true;
            if self.velocity_y > 0.0 {
                self.velocity_y = -self.velocity_y * self.bounce_y;
            }
        }
    }
}
