//! Progress Hub (§5): a topic-based pub/sub fan-out used by the optimizer's
//! heartbeat and the simulator's per-chunk updates. The sole long-lived
//! shared state in the crate; every other type is created per request and
//! discarded when the call returns.

pub mod event;
pub mod hub;

pub use event::{ProgressEvent, ProgressKind};
pub use hub::{ProgressHub, SubscriptionHandle};
