//! Compiled timeline artifact handed to the real-time player and voice layer.

mod exercise;
mod step;

pub use exercise::{equipment_union, parse_cues, ExerciseSnapshot};
pub use step::{CountdownCue, ReadyGate, StepKind, TimelineStep};

use serde::{Deserialize, Serialize};

use crate::models::{BlockType, Mode, Pattern};

/// Where one input block landed in the combined timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
    pub index: usize,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub pattern: Pattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    pub sets: u32,
    pub exercise_count: usize,
    pub step_count: usize,
    pub start_ms: i64,
    pub end_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutHeader {
    pub name: String,
    /// Includes pre-workout time
    pub total_duration_sec: i64,
    #[serde(default)]
    pub structure: Vec<BlockSummary>,
    pub pre_workout_duration_ms: i64,
}

/// Clock reconciliation contract the player is expected to honor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncContract {
    pub workout_start_epoch_ms: i64,
    pub resync_every_ms: i64,
    pub allowed_drift_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionTimeline {
    pub workout_header: WorkoutHeader,
    pub execution_timeline: Vec<TimelineStep>,
    pub sync: SyncContract,
}

impl ExecutionTimeline {
    pub fn steps(&self) -> &[TimelineStep] {
        &self.execution_timeline
    }

    /// Wall-clock span of the workout after the pre-workout steps (ms).
    ///
    /// Measured from the final clock, so silent windows inside the round
    /// ritual count toward it.
    pub fn workout_duration_ms(&self) -> i64 {
        let end = self
            .execution_timeline
            .iter()
            .map(|s| s.end_ms)
            .max()
            .unwrap_or(0);
        (end - self.workout_header.pre_workout_duration_ms).max(0)
    }

    /// The step at `index` plus up to `lookahead` following steps.
    ///
    /// This is the context window the voice layer reads.
    pub fn window(&self, index: usize, lookahead: usize) -> &[TimelineStep] {
        let len = self.execution_timeline.len();
        let start = index.min(len);
        let end = index
            .saturating_add(lookahead)
            .saturating_add(1)
            .min(len);
        &self.execution_timeline[start..end]
    }
}
