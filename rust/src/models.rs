//! Input data types: blocks, their exercises, and parameter resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::CompileConfig;

/// Kind of scheduling unit.
///
/// Unrecognized strings are preserved in `Other` so they can be reported.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    CustomSequence,
    Transition,
    Other(String),
}

impl From<String> for BlockType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "custom_sequence" => Self::CustomSequence,
            "transition" => Self::Transition,
            _ => Self::Other(value),
        }
    }
}

impl From<BlockType> for String {
    fn from(value: BlockType) -> Self {
        match value {
            BlockType::CustomSequence => "custom_sequence".to_string(),
            BlockType::Transition => "transition".to_string(),
            BlockType::Other(s) => s,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CustomSequence => write!(f, "custom_sequence"),
            Self::Transition => write!(f, "transition"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Traversal order for sets and exercises in a `custom_sequence` block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// All sets of one exercise before moving to the next
    StraightSets,
    Superset,
    Circuit,
    /// Anything else traverses like a circuit
    #[default]
    #[serde(other)]
    Custom,
}

impl Pattern {
    /// Whether this pattern walks round-by-round (one set of every exercise per round).
    pub fn is_round_based(self) -> bool {
        !matches!(self, Self::StraightSets)
    }
}

/// How a block measures work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Reps,
    Time,
}

/// Optional cardio finisher appended after a block's last work step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCardio {
    /// Display name of the finisher exercise
    pub exercise: String,
    #[serde(default)]
    pub exercise_id: Option<String>,
    #[serde(default)]
    pub duration_sec: Option<u32>,
}

/// Block-level timing parameters. Absent values fall back to `CompileConfig`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockParams {
    pub sets_per_exercise: Option<u32>,
    pub work_sec: Option<u32>,
    pub rest_sec: Option<u32>,
    /// Accepted but not consulted: round boundaries always use the fixed ritual
    pub round_rest_sec: Option<u32>,
    pub transition_sec: Option<u32>,
    pub await_ready_before_start: bool,
    pub target_reps: Option<String>,
    pub post_cardio: Option<PostCardio>,
}

/// One ordered exercise inside a block, with its display snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockExercise {
    pub exercise_id: String,
    #[serde(default)]
    pub order_index: u32,
    #[serde(default)]
    pub exercise_name: String,
    #[serde(default)]
    pub primary_muscle_group: Option<String>,
    #[serde(default)]
    pub equipment_primary: Option<String>,
    #[serde(default)]
    pub equipment_secondary: Vec<String>,
    /// Raw coaching text, one cue per line
    #[serde(default)]
    pub coaching_bullet_points: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub work_sec: Option<u32>,
    #[serde(default)]
    pub rest_sec: Option<u32>,
    #[serde(default)]
    pub target_reps: Option<String>,
}

/// One scheduling unit of a workout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub pattern: Pattern,
    /// Absent behaves like `time`
    #[serde(default)]
    pub mode: Option<Mode>,
    #[serde(default)]
    pub params: BlockParams,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub exercises: Vec<BlockExercise>,
}

impl Block {
    pub fn is_rep_mode(&self) -> bool {
        self.mode == Some(Mode::Reps)
    }

    /// Exercises in ascending `order_index`, input order breaking ties.
    pub fn ordered_exercises(exercises: &[BlockExercise]) -> Vec<&BlockExercise> {
        let mut ordered: Vec<&BlockExercise> = exercises.iter().collect();
        ordered.sort_by_key(|e| e.order_index);
        ordered
    }
}

/// Block parameters with defaults applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedParams {
    pub sets_per_exercise: u32,
    pub work_sec: u32,
    pub rest_sec: u32,
    pub transition_sec: u32,
    pub await_ready_before_start: bool,
    pub target_reps: Option<String>,
}

/// Treat zero as "not set".
fn positive(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v > 0)
}

/// Treat blank text as "not set".
fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl ResolvedParams {
    pub fn resolve(params: &BlockParams, config: &CompileConfig) -> Self {
        Self {
            sets_per_exercise: params.sets_per_exercise.unwrap_or(1).max(1),
            work_sec: positive(params.work_sec).unwrap_or(config.default_work_sec),
            rest_sec: positive(params.rest_sec).unwrap_or(config.default_rest_sec),
            transition_sec: params.transition_sec.unwrap_or(0),
            await_ready_before_start: params.await_ready_before_start,
            target_reps: non_blank(params.target_reps.as_ref()).map(str::to_string),
        }
    }

    /// Work duration for an exercise: its override wins over the block.
    pub fn exercise_work_sec(&self, exercise: &BlockExercise) -> u32 {
        positive(exercise.work_sec).unwrap_or(self.work_sec)
    }

    pub fn exercise_rest_sec(&self, exercise: &BlockExercise) -> u32 {
        positive(exercise.rest_sec).unwrap_or(self.rest_sec)
    }

    /// Effective rep target text for an exercise.
    pub fn exercise_target_reps<'a>(&'a self, exercise: &'a BlockExercise) -> Option<&'a str> {
        non_blank(exercise.target_reps.as_ref()).or(self.target_reps.as_deref())
    }

    /// An exercise is rep-gated when it has a rep target and no explicit work override.
    pub fn is_rep_based(&self, exercise: &BlockExercise) -> bool {
        self.exercise_target_reps(exercise).is_some() && positive(exercise.work_sec).is_none()
    }
}

/// A parsed rep target: `"12"` or `"10-12"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RepTarget {
    Exact { reps: u32 },
    Range { min: u32, max: u32 },
    /// Free text that could not be parsed, kept for display
    Text { text: String },
}

impl RepTarget {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(reps) = trimmed.parse::<u32>() {
            return Self::Exact { reps };
        }
        let bounds: Vec<&str> = trimmed.split(['-', '–']).map(str::trim).collect();
        if let [lo, hi] = bounds.as_slice() {
            if let (Ok(a), Ok(b)) = (lo.parse::<u32>(), hi.parse::<u32>()) {
                return Self::Range {
                    min: a.min(b),
                    max: a.max(b),
                };
            }
        }
        Self::Text {
            text: trimmed.to_string(),
        }
    }
}

impl fmt::Display for RepTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact { reps } => write!(f, "{}", reps),
            Self::Range { min, max } => write!(f, "{}-{}", min, max),
            Self::Text { text } => write!(f, "{}", text),
        }
    }
}
