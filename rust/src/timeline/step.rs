//! Timeline steps: common timing fields plus a closed set of step kinds.

use serde::{Deserialize, Serialize};

use super::exercise::ExerciseSnapshot;
use crate::models::RepTarget;

/// Which beep a countdown step plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownCue {
    /// Short pip
    Pip,
    /// Long "go" beep
    Go,
}

/// Why the player suspends at an `await_ready` step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyGate {
    /// Participant gets organized before the workout clock starts
    WorkoutStart,
    /// Block requested a ready check before its first step
    BlockStart,
    /// Between two blocks of a workout
    NextBlock,
    /// Participant reports a rep count; their rest happens here
    RepCount,
}

/// Per-type payload of a step. Serialized inline with a `type` tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StepKind {
    Instruction {
        text: String,
    },
    Work {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exercise: Option<ExerciseSnapshot>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_reps: Option<RepTarget>,
        #[serde(default)]
        finisher: bool,
    },
    Rest,
    RoundRest {
        completed_round: u32,
        next_round: u32,
    },
    Countdown {
        cue: CountdownCue,
    },
    Transition,
    AwaitReady {
        gate: ReadyGate,
    },
    Hold,
    AmrapLoop {
        #[serde(default)]
        rounds: Option<u32>,
    },
    EmomWindow {
        #[serde(default)]
        minute: Option<u32>,
    },
}

impl StepKind {
    /// Wire name of the step type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Instruction { .. } => "instruction",
            Self::Work { .. } => "work",
            Self::Rest => "rest",
            Self::RoundRest { .. } => "round_rest",
            Self::Countdown { .. } => "countdown",
            Self::Transition => "transition",
            Self::AwaitReady { .. } => "await_ready",
            Self::Hold => "hold",
            Self::AmrapLoop { .. } => "amrap_loop",
            Self::EmomWindow { .. } => "emom_window",
        }
    }

    /// Steps whose start is pinned to the round-transition ritual rather than
    /// to the end of the previous step.
    pub fn is_ritual_cue(&self) -> bool {
        matches!(self, Self::RoundRest { .. } | Self::Countdown { .. })
    }
}

/// One entry of the compiled timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStep {
    /// 1-based position in the timeline
    pub step: u32,
    /// Offset from the notional workout start (ms)
    pub at_ms: i64,
    pub end_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step_id: Option<u32>,
    /// Excluded from the official workout clock
    #[serde(default)]
    pub pre_workout: bool,
    #[serde(flatten)]
    pub kind: StepKind,
}

impl TimelineStep {
    pub fn new(kind: StepKind, at_ms: i64, duration_ms: i64, label: impl Into<String>) -> Self {
        Self {
            step: 0,
            at_ms,
            end_ms: at_ms + duration_ms,
            set: None,
            round: None,
            label: label.into(),
            coach_prompt: None,
            next_step_id: None,
            pre_workout: false,
            kind,
        }
    }

    pub fn with_set(mut self, set: u32, round: Option<u32>) -> Self {
        self.set = Some(set);
        self.round = round;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.coach_prompt = Some(prompt.into());
        self
    }

    pub fn pre_workout(mut self) -> Self {
        self.pre_workout = true;
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn is_await_ready(&self) -> bool {
        matches!(self.kind, StepKind::AwaitReady { .. })
    }

    pub fn is_work(&self) -> bool {
        matches!(self.kind, StepKind::Work { .. })
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.at_ms
    }

    pub fn exercise(&self) -> Option<&ExerciseSnapshot> {
        match &self.kind {
            StepKind::Work { exercise, .. } => exercise.as_ref(),
            _ => None,
        }
    }

    /// Shift both ends by `offset_ms`.
    pub fn shifted(mut self, offset_ms: i64) -> Self {
        self.at_ms += offset_ms;
        self.end_ms += offset_ms;
        self
    }
}
