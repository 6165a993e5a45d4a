use glam::Vec2;

use crate::deferred::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    Linear,
    /// Cubic ease-out, the curve browser engines call "Power2".
    Power2,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power2 => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Position tween between two points over a fixed duration on the scene clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: Vec2,
    pub to: Vec2,
    pub start: Clock,
    pub duration: Clock,
    pub ease: Ease,
}

impl Tween {
    pub fn new(from: Vec2, to: Vec2, start: Clock, duration: Clock, ease: Ease) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            ease,
        }
    }

    pub fn progress(&self, now: Clock) -> f32 {
        if self.duration == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start);
        (elapsed as f64 / self.duration as f64).min(1.0) as f32
    }

    pub fn sample(&self, now: Clock) -> Vec2 {
        let k = self.ease.apply(self.progress(now));
        self.from + (self.to - self.from) * k
    }

    pub fn is_finished(&self, now: Clock) -> bool {
        self.progress(now) >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power2_is_ease_out() {
        assert_eq!(Ease::Power2.apply(0.0), 0.0);
        assert_eq!(Ease::Power2.apply(1.0), 1.0);
        assert!((Ease::Power2.apply(0.5) - 0.875).abs() < 1e-6);
        // Front-loaded: past halfway by a quarter of the time.
        assert!(Ease::Power2.apply(0.25) > 0.5);
    }

    #[test]
    fn sample_hits_endpoints() {
        let tween = Tween::new(
            Vec2::new(100.0, 450.0),
            Vec2::new(500.0, 50.0),
            1_000,
            1_000_000,
            Ease::Power2,
        );
        assert_eq!(tween.sample(0), Vec2::new(100.0, 450.0));
        assert_eq!(tween.sample(1_000), Vec2::new(100.0, 450.0));
        assert_eq!(tween.sample(1_001_000), Vec2::new(500.0, 50.0));
        assert_eq!(tween.sample(9_000_000), Vec2::new(500.0, 50.0));
        assert!(!tween.is_finished(500_000));
        assert!(tween.is_finished(1_001_000));
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        let tween = Tween::new(Vec2::ZERO, Vec2::ONE, 10, 0, Ease::Linear);
        assert_eq!(tween.sample(10), Vec2::ONE);
    }
}
