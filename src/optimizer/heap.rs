//! Bounded max-heap of candidate lineups, sized `numLineups * oversample`.
//!
//! Oversampling lets the diversity/exposure post-pass (§4.3 point 7) choose
//! from more candidates than the final accepted count, the same way the
//! source keeps more raw solutions around than it ultimately reports.

use crate::model::Lineup;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A scored candidate ordered for a *min*-heap (`BinaryHeap` is a max-heap by
/// default, so `Ord` is reversed) keyed on objective ascending, salary
/// descending, player-id list descending — i.e. the worst candidate by the
/// §4.3 tie-break rule sorts first and is the one evicted when the heap is
/// full.
#[derive(Debug, Clone)]
struct ScoredLineup {
    lineup: Lineup,
}

/// The §4.3 tie-break rule as a total order: `Less` means `a` ranks *better*
/// than `b` (higher objective, then lower salary, then lexicographically
/// smaller player-id list).
fn better_order(a: &Lineup, b: &Lineup) -> Ordering {
    let obj_a = a.objective.unwrap_or(a.total_projection);
    let obj_b = b.objective.unwrap_or(b.total_projection);
    obj_b
        .partial_cmp(&obj_a)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            let (salary_a, ids_a) = a.tie_break_key();
            let (salary_b, ids_b) = b.tie_break_key();
            salary_a.cmp(&salary_b).then_with(|| ids_a.cmp(&ids_b))
        })
}

impl PartialEq for ScoredLineup {
    fn eq(&self, other: &Self) -> bool {
        better_order(&self.lineup, &other.lineup) == Ordering::Equal
    }
}
impl Eq for ScoredLineup {}

impl PartialOrd for ScoredLineup {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredLineup {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed from `better_order` so the heap's max (the pop/eviction
        // candidate) is the *worst* ranked lineup, not the best.
        better_order(&self.lineup, &other.lineup).reverse()
    }
}

/// Bounded collection of the best `capacity` lineups seen so far, by the
/// §4.3 objective/tie-break ordering.
pub struct BoundedLineupHeap {
    capacity: usize,
    heap: BinaryHeap<ScoredLineup>,
}

impl BoundedLineupHeap {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            heap: BinaryHeap::with_capacity(capacity.max(1)),
        }
    }

    /// Offer a candidate lineup. If the heap is full, the worst candidate is
    /// evicted in favor of `lineup` only if `lineup` ranks better.
    pub fn offer(&mut self, lineup: Lineup) {
        let candidate = ScoredLineup { lineup };
        if self.heap.len() < self.capacity {
            self.heap.push(candidate);
            return;
        }
        // The heap's peek is the worst-ranked candidate under our reversed
        // Ord; replace it if the new one is better.
        if let Some(worst) = self.heap.peek() {
            if better_order(&candidate.lineup, &worst.lineup) == Ordering::Less {
                self.heap.pop();
                self.heap.push(candidate);
            }
        }
    }

    /// Drain all candidates, best-objective first (descending by the §4.3
    /// ordering: objective desc, salary asc, player-id list asc).
    pub fn into_sorted_vec(self) -> Vec<Lineup> {
        let mut items: Vec<ScoredLineup> = self.heap.into_vec();
        items.sort_by(|a, b| better_order(&a.lineup, &b.lineup));
        items.into_iter().map(|s| s.lineup).collect()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The current worst accepted objective, but only once the heap has
    /// reached capacity — before that, any candidate is worth keeping, so
    /// there is nothing meaningful to prune against.
    pub fn worst_objective_if_full(&self) -> Option<f64> {
        if self.heap.len() < self.capacity {
            return None;
        }
        self.heap
            .peek()
            .map(|s| s.lineup.objective.unwrap_or(s.lineup.total_projection))
    }
}
