//! Fixed beep/voice/countdown ritual inserted between circuit rounds.
//!
//! Every offset is relative to `T`, the end of the round's last work step.
//! Existing players schedule audio against these exact values.

use super::builder::TimelineBuilder;
use crate::log_debug;
use crate::timeline::{CountdownCue, StepKind, TimelineStep};

/// Millisecond offsets of the round-transition ritual.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundTransitionTiming {
    /// "Round complete" voice cue, after the player's ~600ms end-of-work beep
    pub round_cue_offset_ms: i64,
    pub round_cue_duration_ms: i64,
    /// Short countdown pips
    pub pip_offsets_ms: [i64; 2],
    pub pip_duration_ms: i64,
    /// Long "go" beep
    pub go_offset_ms: i64,
    pub go_duration_ms: i64,
    /// Where the next round's first work step starts
    pub next_round_offset_ms: i64,
}

impl RoundTransitionTiming {
    pub const STANDARD: Self = Self {
        round_cue_offset_ms: 700,
        round_cue_duration_ms: 100,
        pip_offsets_ms: [3_000, 4_000],
        pip_duration_ms: 220,
        go_offset_ms: 5_000,
        go_duration_ms: 600,
        next_round_offset_ms: 5_600,
    };
}

impl Default for RoundTransitionTiming {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Emit the ritual after `completed_round` and move the clock to the start
/// of `next_round`.
pub fn insert_round_transition(
    builder: &mut TimelineBuilder,
    timing: &RoundTransitionTiming,
    completed_round: u32,
    next_round: u32,
    verbosity: u8,
) {
    let t = builder.current_ms();
    log_debug!(
        verbosity,
        "round {} -> {} ritual anchored at T={}ms",
        completed_round,
        next_round,
        t
    );

    let mut marker = TimelineStep::new(
        StepKind::RoundRest {
            completed_round,
            next_round,
        },
        t + timing.round_cue_offset_ms,
        timing.round_cue_duration_ms,
        format!("Round {} complete", completed_round),
    )
    .with_prompt(format!(
        "Round {} complete. Round {} starts in a few seconds.",
        completed_round, next_round
    ));
    marker.round = Some(completed_round);
    builder.push_cue(marker);

    let pip_labels = ["2", "1"];
    for (offset, label) in timing.pip_offsets_ms.iter().zip(pip_labels) {
        let mut pip = TimelineStep::new(
            StepKind::Countdown {
                cue: CountdownCue::Pip,
            },
            t + offset,
            timing.pip_duration_ms,
            label,
        );
        pip.round = Some(next_round);
        builder.push_cue(pip);
    }

    let mut go = TimelineStep::new(
        StepKind::Countdown {
            cue: CountdownCue::Go,
        },
        t + timing.go_offset_ms,
        timing.go_duration_ms,
        "GO",
    );
    go.round = Some(next_round);
    builder.push_cue(go);

    builder.advance_to(t + timing.next_round_offset_ms);
}
