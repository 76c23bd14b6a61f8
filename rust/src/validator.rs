//! Structural checks on a compiled (or hand-edited) timeline.
//!
//! Never fails: every violation is collected into the report.

use serde::{Deserialize, Serialize};

use crate::compiler::RoundTransitionTiming;
use crate::timeline::{ExecutionTimeline, StepKind, TimelineStep};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

pub fn validate(timeline: &ExecutionTimeline) -> ValidationReport {
    validate_steps(&timeline.execution_timeline)
}

/// Check numbering, timing bounds, contiguity, and resolved exercises.
///
/// `await_ready` steps are zero-width markers: they are exempt from the
/// end-after-start and contiguity checks. Round-transition cues must sit at
/// their exact offsets from the end of the preceding step; a gap leading into
/// a correctly anchored cue belongs to the ritual and is not reported.
/// Overlaps always are.
pub fn validate_steps(steps: &[TimelineStep]) -> ValidationReport {
    let mut errors = Vec::new();
    let in_ritual = check_round_transitions(steps, &mut errors);

    for (index, step) in steps.iter().enumerate() {
        let position = index + 1;

        if step.step as usize != position {
            errors.push(format!(
                "Step at position {} has step number {}, expected {}",
                position, step.step, position
            ));
        }
        if step.at_ms < 0 {
            errors.push(format!(
                "Step {} starts at negative offset {}ms",
                position, step.at_ms
            ));
        }
        if !step.is_await_ready() && step.end_ms < step.at_ms {
            errors.push(format!(
                "Step {} ends before it starts (atMs={}, endMs={})",
                position, step.at_ms, step.end_ms
            ));
        }
        if step.is_work() && step.exercise().is_none() {
            errors.push(format!("Work step {} has no resolved exercise", position));
        }

        let Some(next) = steps.get(index + 1) else {
            continue;
        };
        if step.is_await_ready() || step.end_ms == next.at_ms {
            continue;
        }
        if step.end_ms < next.at_ms {
            if !(next.kind.is_ritual_cue() && in_ritual[index + 1]) {
                errors.push(format!(
                    "Gap between step {} and {}: {}ms (endMs={}, atMs={})",
                    position,
                    position + 1,
                    next.at_ms - step.end_ms,
                    step.end_ms,
                    next.at_ms
                ));
            }
        } else {
            errors.push(format!(
                "Overlap between step {} and {}: {}ms (endMs={}, atMs={})",
                position,
                position + 1,
                step.end_ms - next.at_ms,
                step.end_ms,
                next.at_ms
            ));
        }
    }

    ValidationReport::from_errors(errors)
}

/// Check each `round_rest` and the three countdown cues after it against
/// `RoundTransitionTiming::STANDARD`, anchored at the previous step's end.
///
/// Returns which positions belong to a ritual run.
fn check_round_transitions(steps: &[TimelineStep], errors: &mut Vec<String>) -> Vec<bool> {
    let timing = RoundTransitionTiming::STANDARD;
    let cue_offsets = [
        timing.round_cue_offset_ms,
        timing.pip_offsets_ms[0],
        timing.pip_offsets_ms[1],
        timing.go_offset_ms,
    ];
    let mut in_ritual = vec![false; steps.len()];

    for (index, step) in steps.iter().enumerate() {
        if !matches!(step.kind, StepKind::RoundRest { .. }) {
            continue;
        }
        let Some(anchor) = index.checked_sub(1).map(|prev| steps[prev].end_ms) else {
            errors.push("Round transition at step 1 has no preceding work step".to_string());
            continue;
        };

        for (offset_index, offset) in cue_offsets.iter().enumerate() {
            let position = index + offset_index;
            let cue = match steps.get(position) {
                Some(cue) if offset_index == 0 || matches!(cue.kind, StepKind::Countdown { .. }) => {
                    cue
                }
                _ => {
                    errors.push(format!(
                        "Round transition at step {} is incomplete: expected {} cues",
                        index + 1,
                        cue_offsets.len()
                    ));
                    break;
                }
            };
            in_ritual[position] = true;
            let expected = anchor + offset;
            if cue.at_ms != expected {
                errors.push(format!(
                    "Misplaced ritual cue at step {}: {} expected at T+{}ms ({}ms), found {}ms",
                    position + 1,
                    cue.type_name(),
                    offset,
                    expected,
                    cue.at_ms
                ));
            }
        }
    }

    in_ritual
}
