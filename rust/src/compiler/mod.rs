//! Workout compiler: blocks in, absolute-timestamped step timeline out.
//!
//! Pure and synchronous. Expansion of a single block never fails; the only
//! errors come from strict block-type checking and the JSON edges.

mod builder;
mod expand;
mod round_transition;
mod sequencer;

use thiserror::Error;

pub use builder::TimelineBuilder;
pub use expand::{
    compile_block, decide_rest, expand_block, BlockExpander, BlockExpansion, RestContext,
    RestPolicy,
};
pub use round_transition::{insert_round_transition, RoundTransitionTiming};
pub use sequencer::compile_workout;

/// Errors that can occur while compiling.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Invalid workout JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported block type {block_type:?} at index {index}")]
    UnsupportedBlockType { index: usize, block_type: String },
}
