//! Gaussian-copula correlated sampling: draw a correlated standard-normal
//! vector via Cholesky decomposition of the pairwise correlation matrix.
//!
//! No linear-algebra crate is pulled in for this; the matrices involved are
//! small (one row/column per rostered player) and a hand-rolled Cholesky
//! with diagonal loading is the same order of effort as wiring one up.

use crate::correlation::CorrelationMatrix;
use crate::error::SimulationFailed;
use crate::model::PlayerId;
use crate::warning::Warning;
use rand::Rng;
use rand_distr::StandardNormal;

/// Dense lower-triangular Cholesky factor of a correlation matrix, fixed to
/// one player ordering for the lifetime of a simulation run.
#[derive(Debug)]
pub struct CorrelatedSampler {
    order: Vec<PlayerId>,
    factor: Vec<Vec<f64>>,
    psd_projection_applied: bool,
}

impl CorrelatedSampler {
    /// Build the factor for `order` out of `matrix`. If the raw correlation
    /// matrix isn't positive semidefinite, nudge the diagonal by
    /// successively larger epsilons until it is. A matrix that's still not
    /// repaired past `epsilon > 1.0` is internally inconsistent (its
    /// pairwise correlations can't jointly hold), not merely noisy, so the
    /// run fails rather than silently substituting independence.
    pub fn build(order: Vec<PlayerId>, matrix: &CorrelationMatrix) -> Result<Self, SimulationFailed> {
        let n = order.len();
        let mut dense = vec![vec![0.0; n]; n];
        for i in 0..n {
            dense[i][i] = 1.0;
            for j in (i + 1)..n {
                let c = matrix.get(order[i], order[j]);
                dense[i][j] = c;
                dense[j][i] = c;
            }
        }

        let mut epsilon = 0.0;
        let mut psd_projection_applied = false;
        let factor = loop {
            if let Some(l) = cholesky(&dense, epsilon) {
                break l;
            }
            psd_projection_applied = true;
            epsilon = if epsilon == 0.0 { 1e-6 } else { epsilon * 10.0 };
            if epsilon > 1.0 {
                let offending_pair = worst_pair(&order, &dense);
                return Err(SimulationFailed {
                    offending_pair,
                    detail: "correlation matrix is not positive semidefinite after diagonal loading".to_string(),
                });
            }
        };

        Ok(Self { order, factor, psd_projection_applied })
    }

    pub fn order(&self) -> &[PlayerId] {
        &self.order
    }

    /// Draw one correlated standard-normal vector, one entry per player in
    /// `order()`.
    pub fn sample(&self, rng: &mut impl Rng) -> Vec<f64> {
        let n = self.order.len();
        let z: Vec<f64> = (0..n).map(|_| rng.sample(StandardNormal)).collect();
        let mut out = vec![0.0; n];
        for (i, row) in self.factor.iter().enumerate() {
            let mut sum = 0.0;
            for (k, zk) in z.iter().enumerate().take(i + 1) {
                sum += row[k] * zk;
            }
            out[i] = sum;
        }
        out
    }

    pub fn warning(&self) -> Option<Warning> {
        self.psd_projection_applied.then_some(Warning::PsdProjectionApplied)
    }
}

/// The pair whose correlation magnitude is largest, reported as the
/// likeliest culprit when the matrix can't be made positive semidefinite.
fn worst_pair(order: &[PlayerId], dense: &[Vec<f64>]) -> (PlayerId, PlayerId) {
    let mut worst = (order[0], order[1.min(order.len() - 1)]);
    let mut worst_abs = -1.0;
    for i in 0..order.len() {
        for j in (i + 1)..order.len() {
            let abs = dense[i][j].abs();
            if abs > worst_abs {
                worst_abs = abs;
                worst = (order[i], order[j]);
            }
        }
    }
    worst
}

/// Cholesky decomposition of `matrix + epsilon * I`. Returns `None` as soon
/// as a pivot goes non-positive, meaning the matrix isn't PSD at this
/// epsilon.
fn cholesky(matrix: &[Vec<f64>], epsilon: f64) -> Option<Vec<Vec<f64>>> {
    let n = matrix.len();
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = matrix[i][j];
            if i == j {
                sum += epsilon;
            }
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }
    Some(l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn independent_players_draw_like_identity() {
        let order = vec![PlayerId(1), PlayerId(2)];
        let matrix = CorrelationMatrix::new();
        let sampler = CorrelatedSampler::build(order, &matrix).unwrap();
        assert!(!sampler.psd_projection_applied);
        let mut rng = StdRng::seed_from_u64(3);
        let draw = sampler.sample(&mut rng);
        assert_eq!(draw.len(), 2);
    }

    #[test]
    fn same_seed_gives_same_draw() {
        let order = vec![PlayerId(1), PlayerId(2), PlayerId(3)];
        let mut matrix = CorrelationMatrix::new();
        matrix.set(PlayerId(1), PlayerId(2), 0.4);
        let sampler = CorrelatedSampler::build(order, &matrix).unwrap();
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(sampler.sample(&mut a), sampler.sample(&mut b));
    }

    #[test]
    fn unrepairable_matrix_reports_simulation_failed() {
        // corr(1,2) = corr(1,3) = -1.0 forces corr(2,3) = +1.0 by transitivity;
        // asserting all three pairwise at -1.0 is mathematically inconsistent
        // and no diagonal loading within the retry budget can fix it.
        let order = vec![PlayerId(1), PlayerId(2), PlayerId(3)];
        let mut matrix = CorrelationMatrix::new();
        matrix.set(PlayerId(1), PlayerId(2), -1.0);
        matrix.set(PlayerId(1), PlayerId(3), -1.0);
        matrix.set(PlayerId(2), PlayerId(3), -1.0);
        let err = CorrelatedSampler::build(order, &matrix).unwrap_err();
        let pair = err.offending_pair;
        assert!(pair == (PlayerId(1), PlayerId(2)) || pair == (PlayerId(1), PlayerId(3)) || pair == (PlayerId(2), PlayerId(3)));
    }
}
