//! Randomness facade for deterministic simulation.
//!
//! Every random draw of a run goes through one [`RandomProvider`] owned by the
//! [`crate::Simulation`]. The default provider, [`SeededRandom`], is seeded once
//! at construction, so two runs with the same seed and configuration draw the
//! same numbers in the same order. Tests and replay tools can inject their own
//! provider with [`crate::Simulation::with_random`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp1, StandardNormal};

/// Source of primitive random variates. Distributions in [`crate::dists`] are
/// expressed in terms of these three draws.
pub trait RandomProvider: Send {
    /// A draw from N(0, 1)
    fn standard_normal(&mut self) -> f64;

    /// A draw from Exp(1)
    fn standard_exponential(&mut self) -> f64;

    /// A uniform draw from [0, 1)
    fn unit(&mut self) -> f64;
}

/// Default seeded provider backed by [`StdRng`]
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: StdRng,
    draws: u64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            draws: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of primitive draws taken so far
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl RandomProvider for SeededRandom {
    fn standard_normal(&mut self) -> f64 {
        self.draws += 1;
        self.rng.sample(StandardNormal)
    }

    fn standard_exponential(&mut self) -> f64 {
        self.draws += 1;
        self.rng.sample(Exp1)
    }

    fn unit(&mut self) -> f64 {
        self.draws += 1;
        self.rng.gen::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        for _ in 0..100 {
            assert_eq!(a.standard_normal(), b.standard_normal());
            assert_eq!(a.unit(), b.unit());
        }
        assert_eq!(a.draws(), 200);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SeededRandom::new(1);
        let mut b = SeededRandom::new(2);
        let xs: Vec<f64> = (0..8).map(|_| a.unit()).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.unit()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn unit_draws_stay_in_range() {
        let mut rng = SeededRandom::new(7);
        for _ in 0..1000 {
            let u = rng.unit();
            assert!((0.0..1.0).contains(&u));
            assert!(rng.standard_exponential() >= 0.0);
        }
    }
}
