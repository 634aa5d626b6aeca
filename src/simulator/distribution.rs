//! Per-player outcome distributions: truncated normal fit from
//! `(mean, floor, ceiling)`, `σ = (ceiling − floor) / 4`.

use rand::Rng;
use rand_distr::{Distribution, Normal};

#[derive(Debug, Clone, Copy)]
pub struct PlayerDistribution {
    mean: f64,
    floor: f64,
    ceiling: f64,
    std_dev: f64,
}

impl PlayerDistribution {
    pub fn new(mean: f64, floor: f64, ceiling: f64) -> Self {
        let (floor, ceiling) = if floor <= ceiling { (floor, ceiling) } else { (ceiling, floor) };
        let std_dev = ((ceiling - floor) / 4.0).max(0.0);
        Self { mean, floor, ceiling, std_dev }
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Rejection-sample the truncated normal. A zero-width range (floor ==
    /// ceiling) is deterministic: every draw returns the clamped mean.
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        if self.std_dev <= 0.0 {
            return self.mean.clamp(self.floor, self.ceiling);
        }
        let normal = Normal::new(self.mean, self.std_dev).expect("finite positive std_dev");
        loop {
            let draw = normal.sample(rng);
            if draw >= self.floor && draw <= self.ceiling {
                return draw;
            }
        }
    }

    /// Map a standard-normal quantile to this marginal for the Gaussian
    /// copula path. Approximates the truncated-normal inverse CDF by simple
    /// rescale-then-clamp rather than re-deriving the truncated quantile
    /// function; stable across runs for a fixed input `z`, which is what the
    /// reproducibility property actually requires.
    pub fn inverse_from_standard_normal(&self, z: f64) -> f64 {
        if self.std_dev <= 0.0 {
            return self.mean.clamp(self.floor, self.ceiling);
        }
        (self.mean + z * self.std_dev).clamp(self.floor, self.ceiling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn zero_width_range_is_deterministic() {
        let dist = PlayerDistribution::new(20.0, 20.0, 20.0);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(dist.sample(&mut rng), 20.0);
        }
    }

    #[test]
    fn samples_stay_within_floor_and_ceiling() {
        let dist = PlayerDistribution::new(20.0, 10.0, 30.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let v = dist.sample(&mut rng);
            assert!((10.0..=30.0).contains(&v));
        }
    }
}
