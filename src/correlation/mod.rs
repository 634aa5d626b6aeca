//! Correlation & Stack Builder (C2): pairwise correlation scoring and
//! sport-dispatched enumeration of viable stacks.

pub mod pairwise;
pub mod stacks;

pub use pairwise::{build_matrix, pairwise_score, CorrelationMatrix};
pub use stacks::{candidates, GolfStackMetadata, Stack, StackKind};
