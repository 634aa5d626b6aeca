//! `dfs-core`: lineup optimizer and Monte Carlo contest simulator for daily
//! fantasy sports.
//!
//! ```text
//! model ───────── plain value types (players, contests, lineups)
//!   │
//!   ├── roster ── (sport, platform) -> slot plan, lineup validation   (C1)
//!   ├── correlation ── pairwise scoring, stack enumeration            (C2)
//!   ├── optimizer ──── constraint-satisfaction lineup generation      (C3)
//!   └── simulator ──── Monte Carlo outcome simulation                 (C4)
//!
//! cancel / progress / warning / error are cross-cutting: every public
//! operation in C3/C4 takes a `CancellationHandle`, may publish to a
//! `ProgressHub`, and reports non-fatal `Warning`s alongside its result.
//! ```
//!
//! There is no crate-level mutable state beyond the optional `ProgressHub` a
//! caller constructs and passes in; everything else is a value created for
//! one `optimize`/`simulate` call and dropped when it returns.

pub mod cancel;
pub mod correlation;
pub mod error;
pub mod model;
pub mod optimizer;
pub mod progress;
pub mod roster;
pub mod simulator;
pub mod warning;

pub use cancel::CancellationHandle;
pub use error::{InvalidConfig, RosterError, ViolationKind};
pub use warning::Warning;
