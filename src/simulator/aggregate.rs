//! Per-lineup outcome aggregation across simulation iterations.
//!
//! Each worker owns one [`ChunkAccumulator`] per lineup and folds its
//! iterations into it; chunks combine with [`ChunkAccumulator::merge`],
//! which is associative and commutative, so the final numbers never depend
//! on how `rayon` happened to schedule the chunks.

use crate::simulator::config::LineupSimulationResult;

#[derive(Debug, Clone)]
pub struct ChunkAccumulator {
    count: u64,
    sum: f64,
    sum_sq: f64,
    cash_count: u64,
    win_count: u64,
    top1_count: u64,
    payout_sum: f64,
    /// Raw per-iteration scores for percentile estimation. Kept in full:
    /// `numSimulations` is bounded to 100,000 by config validation, so this
    /// never grows large enough to matter.
    samples: Vec<f64>,
}

impl ChunkAccumulator {
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            cash_count: 0,
            win_count: 0,
            top1_count: 0,
            payout_sum: 0.0,
            samples: Vec::new(),
        }
    }

    pub fn record(&mut self, score: f64, payout: f64, rank: u32, field_size: u32) {
        self.count += 1;
        self.sum += score;
        self.sum_sq += score * score;
        self.payout_sum += payout;
        if payout > 0.0 {
            self.cash_count += 1;
        }
        if rank == 1 {
            self.win_count += 1;
        }
        if (rank as f64) <= (field_size as f64 * 0.01).max(1.0) {
            self.top1_count += 1;
        }
        self.samples.push(score);
    }

    pub fn merge(&mut self, other: ChunkAccumulator) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.cash_count += other.cash_count;
        self.win_count += other.win_count;
        self.top1_count += other.top1_count;
        self.payout_sum += other.payout_sum;
        self.samples.extend(other.samples);
    }

    pub fn iterations(&self) -> u64 {
        self.count
    }

    pub fn finish(mut self, lineup_index: usize, entry_fee: f64) -> LineupSimulationResult {
        let n = self.count.max(1) as f64;
        let mean = self.sum / n;
        let variance = (self.sum_sq / n - mean * mean).max(0.0);
        let std_dev = variance.sqrt();

        self.samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let percentile = |p: f64| -> f64 {
            if self.samples.is_empty() {
                return 0.0;
            }
            let idx = (((self.samples.len() - 1) as f64) * p).round() as usize;
            self.samples[idx.min(self.samples.len() - 1)]
        };

        LineupSimulationResult {
            lineup_index,
            mean,
            std_dev,
            p01: percentile(0.01),
            p10: percentile(0.10),
            p50: percentile(0.50),
            p90: percentile(0.90),
            p99: percentile(0.99),
            cash_probability: self.cash_count as f64 / n,
            win_probability: self.win_count as f64 / n,
            top_1_percent_probability: self.top1_count as f64 / n,
            expected_roi: if entry_fee > 0.0 {
                (self.payout_sum / n - entry_fee) / entry_fee
            } else {
                0.0
            },
        }
    }
}

impl Default for ChunkAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_equivalent_to_recording_everything_in_one_accumulator() {
        let mut whole = ChunkAccumulator::new();
        for score in [10.0, 20.0, 30.0, 40.0] {
            whole.record(score, 0.0, 1, 10);
        }

        let mut a = ChunkAccumulator::new();
        a.record(10.0, 0.0, 1, 10);
        a.record(20.0, 0.0, 1, 10);
        let mut b = ChunkAccumulator::new();
        b.record(30.0, 0.0, 1, 10);
        b.record(40.0, 0.0, 1, 10);
        a.merge(b);

        let whole_result = whole.finish(0, 5.0);
        let merged_result = a.finish(0, 5.0);
        assert!((whole_result.mean - merged_result.mean).abs() < 1e-9);
        assert!((whole_result.std_dev - merged_result.std_dev).abs() < 1e-9);
    }

    #[test]
    fn cash_and_win_probabilities_reflect_recorded_outcomes() {
        let mut acc = ChunkAccumulator::new();
        acc.record(50.0, 10.0, 1, 100);
        acc.record(20.0, 0.0, 50, 100);
        let result = acc.finish(0, 5.0);
        assert!((result.cash_probability - 0.5).abs() < 1e-9);
        assert!((result.win_probability - 0.5).abs() < 1e-9);
    }
}
