//! Collectible stars and the score they feed.

use rand::Rng;

use crate::body::Body;
use crate::collision::{Aabb, Solids};

pub const STAR_SIZE: f32 = 32.0;

#[derive(Debug, Clone, Copy)]
pub struct Star {
    pub body: Body,
    pub spawn_x: f32,
    pub spawn_y: f32,
}

impl Star {
    pub fn is_active(&self) -> bool {
        self.body.enabled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOutcome {
    pub remaining: usize,
    /// True when this pickup took the last active star.
    pub field_cleared: bool,
}

/// Fixed set of star slots. Collected stars are disabled, not removed, so
/// a respawn can bring every slot back at its original position.
#[derive(Debug, Clone)]
pub struct StarField {
    stars: Vec<Star>,
    completions: u32,
}

impl StarField {
    /// Lays stars out left to right from `start_x`, each with a random
    /// vertical bounce in `bounce_range`.
    pub fn spawn(
        count: u32,
        start_x: f32,
        spacing: f32,
        bounce_range: (f32, f32),
        rng: &mut impl Rng,
    ) -> Self {
        let (bounce_min, bounce_max) = bounce_range;
        let stars = (0..count)
            .map(|i| {
                let spawn_x = start_x + spacing * i as f32;
                let spawn_y = 0.0;
                let mut body = Body::new(Aabb::from_center(spawn_x, spawn_y, STAR_SIZE, STAR_SIZE));
                body.bounce_y = if bounce_max > bounce_min {
                    rng.gen_range(bounce_min..bounce_max)
                } else {
                    bounce_min
                };
                Star {
                    body,
                    spawn_x,
                    spawn_y,
                }
            })
            .collect();
        Self {
            stars,
            completions: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn active_count(&self) -> usize {
        self.stars.iter().filter(|star| star.is_active()).count()
    }

    /// How many times the field has been emptied.
    pub fn completions(&self) -> u32 {
        self.completions
    }

    pub fn step(&mut self, dt: f32, gravity: f32, solids: &impl Solids) {
        for star in &mut self.stars {
            star.body.step(dt, gravity, solids, None);
        }
    }

    /// Indices of active stars overlapping `aabb`, in slot order.
    pub fn overlapping(&self, aabb: &Aabb) -> Vec<usize> {
        self.stars
            .iter()
            .enumerate()
            .filter(|(_, star)| star.is_active() && star.body.aabb.overlaps(aabb))
            .map(|(index, _)| index)
            .collect()
    }

    /// Deactivates one star. Returns `None` if the slot is unknown or the
    /// star was already collected.
    pub fn collect(&mut self, index: usize) -> Option<CollectOutcome> {
        let star = self.stars.get_mut(index)?;
        if !star.is_active() {
            return None;
        }
        star.body.enabled = false;
        star.body.stop();

        let remaining = self.active_count();
        let field_cleared = remaining == 0;
        if field_cleared {
            self.completions += 1;
        }
        Some(CollectOutcome {
            remaining,
            field_cleared,
        })
    }

    /// Reactivates every slot at its original position with zero velocity.
    pub fn respawn_all(&mut self) {
        for star in &mut self.stars {
            star.body.reset_at(star.spawn_x, star.spawn_y);
            star.body.enabled = true;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub value: u32,
    pub per_star: u32,
}

impl Score {
    pub fn new(per_star: u32) -> Self {
        Self { value: 0, per_star }
    }

    pub fn add_star(&mut self) -> u32 {
        self.value += self.per_star;
        self.value
    }

    pub fn label(&self) -> String {
        format!("Score: {}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::StaticBodies;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field() -> StarField {
        let mut rng = StdRng::seed_from_u64(7);
        StarField::spawn(12, 12.0, 70.0, (0.4, 0.8), &mut rng)
    }

    #[test]
    fn stars_are_laid_out_from_the_left_edge() {
        let field = field();
        assert_eq!(field.len(), 12);
        assert_eq!(field.active_count(), 12);
        let xs: Vec<f32> = field.stars().iter().map(|s| s.spawn_x).collect();
        assert_eq!(xs[0], 12.0);
        assert_eq!(xs[1], 82.0);
        assert_eq!(xs[11], 12.0 + 70.0 * 11.0);
        assert!(field.stars().iter().all(|s| s.body.aabb.center_y == 0.0));
    }

    #[test]
    fn bounce_is_drawn_from_range() {
        let field = field();
        for star in field.stars() {
            assert!((0.4..0.8).contains(&star.body.bounce_y));
        }
    }

    #[test]
    fn same_seed_same_bounces() {
        let a = field();
        let b = field();
        let bounces = |f: &StarField| f.stars().iter().map(|s| s.body.bounce_y).collect::<Vec<_>>();
        assert_eq!(bounces(&a), bounces(&b));
    }

    #[test]
    fn collecting_every_star_completes_once() {
        let mut field = field();
        let mut cleared = 0;
        for index in 0..12 {
            let outcome = field.collect(index).expect("star is active");
            assert_eq!(outcome.remaining, 11 - index);
            if outcome.field_cleared {
                cleared += 1;
            }
        }
        assert_eq!(cleared, 1);
        assert_eq!(field.completions(), 1);
        assert_eq!(field.active_count(), 0);
    }

    #[test]
    fn collected_star_cannot_be_collected_again() {
        let mut field = field();
        assert!(field.collect(3).is_some());
        assert!(field.collect(3).is_none());
        assert!(field.collect(99).is_none());
        assert_eq!(field.active_count(), 11);
    }

    #[test]
    fn collected_stars_skip_physics_and_overlap() {
        let mut field = field();
        field.collect(0);
        let before = field.stars()[0].body.aabb;
        field.step(1.0 / 60.0, 300.0, &StaticBodies::new());
        assert_eq!(field.stars()[0].body.aabb, before);
        assert!(field.stars()[1].body.aabb.center_y > 0.0);
        assert!(field.overlapping(&before).is_empty());
    }

    #[test]
    fn respawn_restores_original_positions() {
        let mut field = field();
        field.step(0.5, 300.0, &StaticBodies::new());
        for index in 0..12 {
            field.collect(index);
        }
        field.respawn_all();
        assert_eq!(field.active_count(), 12);
        for star in field.stars() {
            assert_eq!(star.body.aabb.center_x, star.spawn_x);
            assert_eq!(star.body.aabb.center_y, 0.0);
            assert_eq!(star.body.velocity_y, 0.0);
        }
    }

    #[test]
    fn overlap_finds_active_stars_only() {
        let field = field();
        let hitbox = Aabb::from_center(47.0, 0.0, 40.0, 10.0);
        assert_eq!(field.overlapping(&hitbox), vec![0, 1]);
    }

    #[test]
    fn score_is_ten_per_star() {
        let mut score = Score::new(10);
        for n in 1..=12u32 {
            assert_eq!(score.add_star(), 10 * n);
        }
        assert_eq!(score.label(), "Score: 120");
    }
}
