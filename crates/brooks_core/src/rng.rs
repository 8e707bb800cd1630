//! Injectable random sources.
//!
//! Layers never call system randomness. Every probability gate and random
//! scouting target draws from a [`RandomSource`] handed in by the caller, so
//! tests can force either branch and sandbox matches replay exactly from a
//! seed.

use std::collections::VecDeque;

/// A source of uniform random numbers.
pub trait RandomSource {
    /// Next value, uniform in `[0.0, 1.0)`.
    fn next_unit(&mut self) -> f64;

    /// Next integer, uniform in `[0, bound)`. Returns 0 when `bound` is 0.
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        let value = (self.next_unit() * f64::from(bound)) as u32;
        value.min(bound - 1)
    }

    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }
}

/// Seeded linear congruential generator.
///
/// Same seed, same sequence, on every platform.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    /// Create a generator from a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        // Top 53 bits; the low bits of an LCG are weak.
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Replays a fixed list of values, then repeats a fallback forever.
///
/// Lets a test decide exactly which gates fire:
///
/// ```
/// use brooks_core::rng::{RandomSource, ScriptedRandom};
///
/// let mut rng = ScriptedRandom::new([0.01, 0.5]);
/// assert!(rng.chance(0.05));
/// assert!(!rng.chance(0.05));
/// // Exhausted: falls back to a value no gate below 1.0 passes.
/// assert!(!rng.chance(0.99));
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRandom {
    /// Largest value below 1.0; fails every probability gate.
    pub const MISS: f64 = 0.999_999;

    /// Replay `values`, then [`Self::MISS`].
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            fallback: Self::MISS,
        }
    }

    /// A source that fails every gate.
    #[must_use]
    pub fn never() -> Self {
        Self::new([])
    }

    /// A source that passes every gate.
    #[must_use]
    pub fn always() -> Self {
        Self::new([]).with_fallback(0.0)
    }

    /// Replace the value used once the script runs out.
    #[must_use]
    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    /// Values not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        self.values.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_unit().to_bits(), b.next_unit().to_bits());
        }
    }

    #[test]
    fn test_seeded_stays_in_unit_interval() {
        let mut rng = SeededRandom::new(7);
        for _ in 0..10_000 {
            let v = rng.next_unit();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_below_respects_bound() {
        let mut rng = SeededRandom::new(3);
        for _ in 0..1_000 {
            assert!(rng.below(64) < 64);
        }
        assert_eq!(rng.below(0), 0);
        let mut top = ScriptedRandom::new([ScriptedRandom::MISS]);
        assert_eq!(top.below(10), 9);
    }

    #[test]
    fn test_scripted_replays_then_falls_back() {
        let mut rng = ScriptedRandom::new([0.1, 0.2]).with_fallback(0.5);
        assert_eq!(rng.remaining(), 2);
        assert!((rng.next_unit() - 0.1).abs() < f64::EPSILON);
        assert!((rng.next_unit() - 0.2).abs() < f64::EPSILON);
        assert!((rng.next_unit() - 0.5).abs() < f64::EPSILON);
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn test_always_and_never() {
        assert!(ScriptedRandom::always().chance(0.05));
        assert!(!ScriptedRandom::never().chance(0.95));
    }
}
