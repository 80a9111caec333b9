//! Cooperative, tick-sampled transitions.
//!
//! All animation in the engine is time-sliced by the frame tick: a
//! [`Transition`] stores its endpoints and start time and is sampled with an
//! explicit clock, so nothing here spawns timers or threads. A refresh that
//! starts new transitions first settles the previous ones.

use crate::core::bounds::Bounds;
use crate::core::geo::Point;
use std::time::{Duration, Instant};

/// Unified easing curves for tile and overlay transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EasingType {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl EasingType {
    /// Apply easing function to a normalized time value (0.0 to 1.0)
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::Linear => t,
            EasingType::EaseIn => t * t * t,
            EasingType::EaseOut => {
                let t = t - 1.0;
                t * t * t + 1.0
            }
            EasingType::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Interpolation between two values of the same type
pub trait Lerp {
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t as f32
    }
}

impl Lerp for Point {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Point::new(self.x.lerp(&other.x, t), self.y.lerp(&other.y, t))
    }
}

impl Lerp for Bounds {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Bounds::new(self.min.lerp(&other.min, t), self.max.lerp(&other.max, t))
    }
}

/// A single in-flight transition between two styles/positions
#[derive(Debug, Clone)]
pub struct Transition<T> {
    from: T,
    to: T,
    start: Instant,
    duration: Duration,
    easing: EasingType,
}

impl<T: Lerp + Clone> Transition<T> {
    pub fn new(from: T, to: T, start: Instant, duration: Duration, easing: EasingType) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            easing,
        }
    }

    /// Samples the transition at `now`, returning the value and whether it finished
    pub fn sample(&self, now: Instant) -> (T, bool) {
        let elapsed = now.saturating_duration_since(self.start);
        if elapsed >= self.duration || self.duration.is_zero() {
            return (self.to.clone(), true);
        }
        let progress = self
            .easing
            .apply(elapsed.as_secs_f64() / self.duration.as_secs_f64());
        (self.from.lerp(&self.to, progress), false)
    }

    /// The final value the transition is heading to
    pub fn target(&self) -> &T {
        &self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_functions() {
        assert_eq!(EasingType::Linear.apply(0.0), 0.0);
        assert_eq!(EasingType::Linear.apply(1.0), 1.0);
        assert_eq!(EasingType::Linear.apply(0.5), 0.5);

        let ease_out = EasingType::EaseOut.apply(0.5);
        assert!(ease_out > 0.5); // Should be faster than linear

        // Out-of-range inputs are clamped
        assert_eq!(EasingType::EaseIn.apply(2.0), 1.0);
    }

    #[test]
    fn test_transition_sampling() {
        let start = Instant::now();
        let transition = Transition::new(
            0.0_f64,
            10.0_f64,
            start,
            Duration::from_millis(100),
            EasingType::Linear,
        );

        let (at_start, done) = transition.sample(start);
        assert_eq!(at_start, 0.0);
        assert!(!done);

        let (mid, done) = transition.sample(start + Duration::from_millis(50));
        assert!((mid - 5.0).abs() < 1e-9);
        assert!(!done);

        let (end, done) = transition.sample(start + Duration::from_millis(150));
        assert_eq!(end, 10.0);
        assert!(done);
    }

    #[test]
    fn test_point_and_bounds_lerp() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 50.0);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid, Point::new(50.0, 25.0));

        let from = Bounds::from_coords(0.0, 0.0, 10.0, 10.0);
        let to = Bounds::from_coords(10.0, 10.0, 30.0, 30.0);
        let mid = from.lerp(&to, 0.5);
        assert_eq!(mid, Bounds::from_coords(5.0, 5.0, 20.0, 20.0));
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let start = Instant::now();
        let transition = Transition::new(0.0_f64, 1.0_f64, start, Duration::ZERO, EasingType::Linear);
        let (value, done) = transition.sample(start);
        assert_eq!(value, 1.0);
        assert!(done);
    }
}
