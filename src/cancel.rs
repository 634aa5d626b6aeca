//! Cooperative cancellation handle shared by the optimizer and simulator.
//!
//! Every public operation accepts one of these (§5). There are no
//! suspension points to cancel at inside the optimizer's pure-compute
//! backtracking; it simply polls the flag at its existing decision points
//! (once per backtrack step, once per heap-accept).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    flag: Arc<AtomicBool>,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
