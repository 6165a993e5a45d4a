use arcade_core::input::{InputState, Key};

use crate::body::Body;

pub const LEFT_KEYS: [Key; 2] = [Key::Left, Key::A];
pub const RIGHT_KEYS: [Key; 2] = [Key::Right, Key::D];
pub const UP_KEYS: [Key; 2] = [Key::Up, Key::W];
pub const DOWN_KEYS: [Key; 2] = [Key::Down, Key::S];
pub const JUMP_KEYS: [Key; 3] = [Key::Up, Key::W, Key::Space];

/// Ground-contact jump latch.
///
/// Evaluated once per tick with the ground check before the jump check. A
/// jump spends the latch for the rest of the current ground contact; it is
/// re-armed by the first grounded tick after the body has left the ground.
/// Holding jump therefore yields one impulse per landing.
#[derive(Debug, Clone, Copy)]
pub struct JumpLatch {
    can_jump: bool,
    spent_this_contact: bool,
}

impl Default for JumpLatch {
    fn default() -> Self {
        Self {
            can_jump: true,
            spent_this_contact: false,
        }
    }
}

impl JumpLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_jump(&self) -> bool {
        self.can_jump
    }

    /// Returns true when this tick produces a jump impulse.
    pub fn update(&mut self, on_ground: bool, jump_held: bool) -> bool {
        if !on_ground {
            self.spent_this_contact = false;
        }
        if on_ground && !self.spent_this_contact {
            self.can_jump = true;
        }
        if jump_held && self.can_jump && on_ground {
            self.can_jump = false;
            self.spent_this_contact = true;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlatformerTuning {
    pub run_speed: f32,
    pub jump_speed: f32,
    pub drop_speed: f32,
    pub grounded_bounce: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlOutcome {
    pub jumped: bool,
    pub facing_left: bool,
}

/// Per-tick input handling for the platformer player. Reads contact flags
/// left by the previous physics step and writes velocities for the next.
#[derive(Debug, Clone, Copy)]
pub struct PlatformerController {
    pub tuning: PlatformerTuning,
    pub latch: JumpLatch,
    pub facing_left: bool,
}

impl PlatformerController {
    pub fn new(tuning: PlatformerTuning) -> Self {
        Self {
            tuning,
            latch: JumpLatch::new(),
            facing_left: false,
        }
    }

    pub fn update(&mut self, body: &mut Body, input: &InputState) -> ControlOutcome {
        if input.any_held(&LEFT_KEYS) {
            body.velocity_x = -self.tuning.run_speed;
            self.facing_left = true;
        } else if input.any_held(&RIGHT_KEYS) {
            body.velocity_x = self.tuning.run_speed;
            self.facing_left = false;
        } else {
            body.velocity_x = 0.0;
        }

        let on_ground = body.on_ground();
        let jumped = self.latch.update(on_ground, input.any_held(&JUMP_KEYS));
        if jumped {
            body.velocity_y = -self.tuning.jump_speed;
            log::debug!("Jump impulse at y={:.1}", body.aabb.center_y);
        }

        if input.is_held(Key::S) {
            body.velocity_y = self.tuning.drop_speed;
        }

        body.set_bounce(if on_ground {
            self.tuning.grounded_bounce
        } else {
            0.0
        });

        ControlOutcome {
            jumped,
            facing_left: self.facing_left,
        }
    }
}

/// Four-direction top-down velocity. Left wins over right and up over down;
/// diagonal motion scales both axes by `diagonal_factor`.
pub fn top_down_velocity(input: &InputState, speed: f32, diagonal_factor: f32) -> (f32, f32) {
    let vx = if input.any_held(&LEFT_KEYS) {
        -speed
    } else if input.any_held(&RIGHT_KEYS) {
        speed
    } else {
        0.0
    };
    let vy = if input.any_held(&UP_KEYS) {
        -speed
    } else if input.any_held(&DOWN_KEYS) {
        speed
    } else {
        0.0
    };

    if vx != 0.0 && vy != 0.0 {
        (vx * diagonal_factor, vy * diagonal_factor)
    } else {
        (vx, vy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{Aabb, StaticBodies};

    fn tuning() -> PlatformerTuning {
        PlatformerTuning {
            run_speed: 160.0,
            jump_speed: 330.0,
            drop_speed: 100.0,
            grounded_bounce: 0.2,
        }
    }

    fn grounded_body() -> Body {
        let mut body = Body::new(Aabb::from_center(100.0, 536.0, 32.0, 32.0));
        body.touching.down = true;
        body
    }

    #[test]
    fn scripted_latch_sequence_jumps_on_first_and_fourth_tick() {
        let mut latch = JumpLatch::new();
        let script = [(true, true), (true, true), (false, true), (true, true)];
        let impulses: Vec<usize> = script
            .iter()
            .enumerate()
            .filter_map(|(tick, &(on_ground, held))| {
                latch.update(on_ground, held).then_some(tick + 1)
            })
            .collect();
        assert_eq!(impulses, vec![1, 4]);
    }

    #[test]
    fn airborne_press_never_jumps() {
        let mut latch = JumpLatch::new();
        for _ in 0..5 {
            assert!(!latch.update(false, true));
        }
        assert!(latch.can_jump());
    }

    #[test]
    fn grounded_without_press_keeps_latch_armed() {
        let mut latch = JumpLatch::new();
        assert!(!latch.update(true, false));
        assert!(!latch.update(true, false));
        assert!(latch.update(true, true));
        assert!(!latch.can_jump());
    }

    #[test]
    fn held_jump_repeats_once_per_landing() {
        let mut latch = JumpLatch::new();
        let mut impulses = 0;
        for contact in 0..3 {
            for _ in 0..4 {
                impulses += usize::from(latch.update(true, true));
            }
            for _ in 0..2 {
                impulses += usize::from(latch.update(false, true));
            }
            assert_eq!(impulses, contact + 1);
        }
    }

    #[test]
    fn run_keys_set_velocity_and_facing() {
        let mut controller = PlatformerController::new(tuning());
        let mut body = grounded_body();
        let mut input = InputState::new();

        input.key_down(Key::A);
        let outcome = controller.update(&mut body, &input);
        assert_eq!(body.velocity_x, -160.0);
        assert!(outcome.facing_left);

        input.key_up(Key::A);
        input.key_down(Key::Right);
        let outcome = controller.update(&mut body, &input);
        assert_eq!(body.velocity_x, 160.0);
        assert!(!outcome.facing_left);

        input.key_up(Key::Right);
        controller.update(&mut body, &input);
        assert_eq!(body.velocity_x, 0.0);
    }

    #[test]
    fn grounded_jump_sets_upward_velocity_and_bounce() {
        let mut controller = PlatformerController::new(tuning());
        let mut body = grounded_body();
        let mut input = InputState::new();
        input.key_down(Key::Space);

        let outcome = controller.update(&mut body, &input);
        assert!(outcome.jumped);
        assert_eq!(body.velocity_y, -330.0);
        assert_eq!(body.bounce_y, 0.2);
    }

    #[test]
    fn drop_key_overrides_jump_velocity() {
        let mut controller = PlatformerController::new(tuning());
        let mut body = grounded_body();
        let mut input = InputState::new();
        input.key_down(Key::W);
        input.key_down(Key::S);

        controller.update(&mut body, &input);
        assert_eq!(body.velocity_y, 100.0);
    }

    #[test]
    fn airborne_body_has_no_bounce() {
        let mut controller = PlatformerController::new(tuning());
        let mut body = Body::new(Aabb::from_center(100.0, 300.0, 32.0, 32.0));
        controller.update(&mut body, &InputState::new());
        assert_eq!(body.bounce_x, 0.0);
        assert_eq!(body.bounce_y, 0.0);
    }

    #[test]
    fn held_jump_through_a_real_landing() {
        let mut solids = StaticBodies::new();
        solids.push(Aabb::from_center(400.0, 568.0, 800.0, 32.0));
        let mut controller = PlatformerController::new(tuning());
        let mut body = Body::new(Aabb::from_center(100.0, 536.0, 32.0, 32.0));
        body.collide_world_bounds = true;
        let mut input = InputState::new();
        input.key_down(Key::Up);

        let dt = 1.0 / 60.0;
        let mut jumps = 0;
        // Settle one step so contact flags exist, then hold jump for 5 s.
        body.step(dt, 300.0, &solids, None);
        for _ in 0..300 {
            if controller.update(&mut body, &input).jumped {
                jumps += 1;
            }
            body.step(dt, 300.0, &solids, None);
        }
        // Airtime is 2 * 330 / 300 = 2.2 s, so a held key lands and
        // relaunches twice within 5 s.
        assert_eq!(jumps, 3);
    }

    #[test]
    fn top_down_axes_and_diagonal() {
        let mut input = InputState::new();
        assert_eq!(top_down_velocity(&input, 100.0, 0.707), (0.0, 0.0));

        input.key_down(Key::Left);
        assert_eq!(top_down_velocity(&input, 100.0, 0.707), (-100.0, 0.0));

        input.key_down(Key::Right);
        assert_eq!(top_down_velocity(&input, 100.0, 0.707), (-100.0, 0.0));

        input.key_down(Key::Down);
        let (vx, vy) = top_down_velocity(&input, 100.0, 0.707);
        assert!((vx + 70.7).abs() < 0.001);
        assert!((vy - 70.7).abs() < 0.001);

        input.key_down(Key::Up);
        let (_, vy) = top_down_velocity(&input, 100.0, 0.707);
        assert!(vy < 0.0);
    }
}
