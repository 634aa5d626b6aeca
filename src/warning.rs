//! Non-fatal conditions attached to a successful result (§7: warnings are
//! never raised as errors). Shared by the optimizer and the simulator.

use crate::model::PlayerId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Warning {
    MinExposureUnsatisfied { player: PlayerId, achieved: f64, target: f64 },
    FieldAttrition { dropped: u32 },
    PsdProjectionApplied,
}
