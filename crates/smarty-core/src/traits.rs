//! Trait interfaces for the simulator.
//!
//! - [`RandomSource`] is the pluggable source of every random draw (investor
//!   traits and token sale splits). Any [`rand::Rng`] implements it, so a
//!   seeded `StdRng` gives reproducible runs.

use rand::Rng;

/// Source of the random draws used by the simulation.
///
/// Only [`unit`](Self::unit) and [`index`](Self::index) are required; the
/// distribution helpers are derived from them.
pub trait RandomSource {
    /// Uniform draw from `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Uniform index from `0..upper`. `upper` must be positive.
    fn index(&mut self, upper: usize) -> usize;

    /// Normal draw via the Box-Muller transform.
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        // 1 - unit() lies in (0, 1], keeping ln() finite.
        let u1 = 1.0 - self.unit();
        let u2 = self.unit();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        mean + std_dev * z
    }

    /// Flat Dirichlet draw over `count` parts: non-negative, summing to 1.
    ///
    /// Normalized unit-rate exponentials. Falls back to the uniform vector in
    /// the degenerate case where every exponential draw is zero.
    fn flat_dirichlet(&mut self, count: usize) -> Vec<f64> {
        let mut draws: Vec<f64> = (0..count).map(|_| -(1.0 - self.unit()).ln()).collect();
        let sum: f64 = draws.iter().sum();
        if sum > 0.0 && sum.is_finite() {
            for d in draws.iter_mut() {
                *d /= sum;
            }
        } else {
            draws.fill(1.0 / count as f64);
        }
        draws
    }
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn unit(&mut self) -> f64 {
        self.r#gen::<f64>()
    }

    fn index(&mut self, upper: usize) -> usize {
        self.gen_range(0..upper)
    }
}
