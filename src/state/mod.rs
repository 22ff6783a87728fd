//! State tracking for release operations.
//!
//! A single [`ReleaseState`] is created when a run starts, mutated in place by
//! each step and finalized into the report when the run ends.

mod release_state;

pub use release_state::{METADATA_PLACEHOLDER, Outcome, ReleasePhase, ReleaseState};
