//! Progress event payloads published by the optimizer and simulator.

use serde::{Deserialize, Serialize};

/// What kind of run this event reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressKind {
    OptimizeHeartbeat,
    SimulationChunk,
}

/// A single progress update. Immutable once constructed; only C3/C4 produce
/// these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub kind: ProgressKind,
    pub topic: String,
    pub completed: u64,
    pub total: u64,
    pub estimated_remaining_ms: f64,
    pub lineup_id: Option<u32>,
}
