//! Configuration types for the timeline compiler.

use chrono::{DateTime, Utc};

use crate::compiler::RoundTransitionTiming;

/// Settings for a compile call.
///
/// Every field has a default that reproduces the reference player contract, so
/// `CompileConfig::default()` is what callers want unless they are debugging.
#[derive(Clone, Debug)]
pub struct CompileConfig {
    /// Duration of the pre-workout intro instruction (ms)
    pub intro_duration_ms: i64,
    /// Work duration when neither the exercise nor the block sets one (s)
    pub default_work_sec: u32,
    /// Rest duration when neither the exercise nor the block sets one (s)
    pub default_rest_sec: u32,
    /// Transition before a finisher when the block has no `transitionSec` (s)
    pub default_transition_sec: u32,
    /// Finisher duration when `postCardio.durationSec` is absent (s)
    pub default_post_cardio_sec: u32,
    /// How often the player should reconcile its clock against the timeline (ms)
    pub resync_every_ms: i64,
    /// Drift the player may tolerate before correcting (ms)
    pub allowed_drift_ms: i64,
    /// Planned wall-clock start; emitted as `sync.workoutStartEpochMs`
    pub workout_start: Option<DateTime<Utc>>,
    /// Millisecond offsets of the round-transition ritual
    pub round_transition: RoundTransitionTiming,
    /// Reject unrecognized block types instead of compiling them to nothing
    pub strict_block_types: bool,
    /// Verbosity level: 0=silent, 1=blocks, 2=steps, 3=debug
    pub verbosity: u8,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            intro_duration_ms: 10_000,
            default_work_sec: 30,
            default_rest_sec: 30,
            default_transition_sec: 10,
            default_post_cardio_sec: 300,
            resync_every_ms: 15_000,
            allowed_drift_ms: 250,
            workout_start: None,
            round_transition: RoundTransitionTiming::STANDARD,
            strict_block_types: false,
            verbosity: 0,
        }
    }
}

impl CompileConfig {
    /// Build a config from optional overrides, falling back to defaults.
    ///
    /// The round-transition timing is not overridable here; players depend on
    /// the exact offsets.
    pub fn with_overrides(
        workout_start: Option<DateTime<Utc>>,
        strict_block_types: Option<bool>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            workout_start,
            strict_block_types: strict_block_types.unwrap_or(defaults.strict_block_types),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
            ..defaults
        }
    }

    /// `workout_start` as epoch milliseconds, 0 when unset.
    pub fn workout_start_epoch_ms(&self) -> i64 {
        self.workout_start
            .map(|start| start.timestamp_millis())
            .unwrap_or(0)
    }
}
