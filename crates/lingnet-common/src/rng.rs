//! Injectable randomness source
//!
//! Every stochastic step of a run (tie-breaks, noise, frequency-weighted
//! sampling, network wiring) draws from one `SimRng`, so a fixed seed
//! reproduces a whole simulation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Seedable random source shared by one simulation run
#[derive(Debug, Clone)]
pub struct SimRng {
    inner: StdRng,
    seed: Option<u64>,
}

impl SimRng {
    /// Deterministic source for reproducible runs and tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Source seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Seeded when a seed is given, entropy otherwise
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// The seed this source was created with, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Uniform index in `0..n`. `n` must be positive.
    pub fn uniform_index(&mut self, n: usize) -> usize {
        debug_assert!(n > 0, "uniform_index over an empty range");
        self.inner.gen_range(0..n)
    }

    /// Uniform real in `[0, 1)`
    pub fn uniform_real(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// One standard-normal variate
    pub fn standard_normal(&mut self) -> f64 {
        self.inner.sample(StandardNormal)
    }

    /// Sum of `repeats` independent standard-normal draws
    ///
    /// This is the evaluation-noise model of the perceptron: the repeat count
    /// plays the role of a "standard deviation" without scaling a single draw.
    pub fn summed_normals(&mut self, repeats: u32) -> f64 {
        (0..repeats).map(|_| self.standard_normal()).sum()
    }

    /// Frequency-weighted choice of an index into `weights`
    ///
    /// Draws `u` uniformly in `[0, total)` and walks the weights subtracting
    /// each until `u` crosses zero. Non-positive and NaN weights are never
    /// chosen.
    /// Returns `None` when the total weight is not positive.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 || !total.is_finite() {
            return None;
        }

        let mut choice = self.uniform_real() * total;
        let mut last_positive = None;
        for (index, weight) in weights.iter().enumerate() {
            if !(*weight > 0.0) {
                continue;
            }
            last_positive = Some(index);
            choice -= weight;
            if choice <= 0.0 {
                return Some(index);
            }
        }

        // Rounding can leave a sliver above zero after the last subtraction
        last_positive
    }

    /// Access the underlying generator for distributions not wrapped here
    pub fn inner_mut(&mut self) -> &mut StdRng {
        &mut self.inner
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = SimRng::seeded(7);
        let mut b = SimRng::seeded(7);
        for _ in 0..20 {
            assert_eq!(a.uniform_index(10), b.uniform_index(10));
            assert_eq!(a.standard_normal().to_bits(), b.standard_normal().to_bits());
        }
        assert_eq!(a.seed(), Some(7));
    }

    #[test]
    fn test_uniform_index_in_range() {
        let mut rng = SimRng::seeded(1);
        for _ in 0..1000 {
            assert!(rng.uniform_index(3) < 3);
        }
    }

    #[test]
    fn test_weighted_index_zero_total() {
        let mut rng = SimRng::seeded(1);
        assert_eq!(rng.weighted_index(&[]), None);
        assert_eq!(rng.weighted_index(&[0.0, 0.0]), None);
        assert_eq!(rng.weighted_index(&[-1.0, 0.0]), None);
    }

    #[test]
    fn test_weighted_index_skips_non_positive() {
        let mut rng = SimRng::seeded(3);
        for _ in 0..500 {
            let idx = rng.weighted_index(&[0.0, 2.0, 0.0, 1.0]).unwrap();
            assert!(idx == 1 || idx == 3);
        }
    }

    #[test]
    fn test_weighted_index_never_picks_nan() {
        let mut rng = SimRng::seeded(4);
        assert_eq!(rng.weighted_index(&[f64::NAN]), None);
        assert_eq!(rng.weighted_index(&[f64::NAN, 0.0]), None);
        for _ in 0..500 {
            assert_eq!(rng.weighted_index(&[1.0, f64::NAN]), Some(0));
            assert_eq!(rng.weighted_index(&[f64::NAN, 1.0, f64::NAN]), Some(1));
        }
    }

    #[test]
    fn test_weighted_index_distribution() {
        let mut rng = SimRng::seeded(11);
        let mut counts = [0usize; 2];
        let draws = 20_000;
        for _ in 0..draws {
            counts[rng.weighted_index(&[1.0, 3.0]).unwrap()] += 1;
        }
        let share = counts[1] as f64 / draws as f64;
        assert!((share - 0.75).abs() < 0.02, "share was {share}");
    }

    #[test]
    fn test_summed_normals_zero_repeats() {
        let mut rng = SimRng::seeded(5);
        assert_eq!(rng.summed_normals(0), 0.0);
    }

    #[test]
    fn test_summed_normals_variance_grows_with_repeats() {
        let mut rng = SimRng::seeded(9);
        let n = 20_000;
        let variance = |rng: &mut SimRng, repeats: u32| {
            let draws: Vec<f64> = (0..n).map(|_| rng.summed_normals(repeats)).collect();
            let mean = draws.iter().sum::<f64>() / n as f64;
            draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n as f64
        };
        let one = variance(&mut rng, 1);
        let four = variance(&mut rng, 4);
        assert!((one - 1.0).abs() < 0.1);
        assert!((four - 4.0).abs() < 0.4);
    }
}
