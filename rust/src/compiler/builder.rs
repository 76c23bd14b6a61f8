//! Running clock and step list shared by block expansion and sequencing.

use crate::log_debug;
use crate::timeline::{StepKind, TimelineStep};

/// Accumulates steps against a running millisecond clock.
///
/// Invariant: steps are appended in non-decreasing `at_ms` order, and
/// `current_ms` never moves backwards.
#[derive(Debug, Default)]
pub struct TimelineBuilder {
    steps: Vec<TimelineStep>,
    current_ms: i64,
    verbosity: u8,
}

impl TimelineBuilder {
    pub fn new(verbosity: u8) -> Self {
        Self {
            steps: Vec::new(),
            current_ms: 0,
            verbosity,
        }
    }

    pub fn current_ms(&self) -> i64 {
        self.current_ms
    }

    /// A step starting at the current clock.
    pub fn step_here(
        &self,
        kind: StepKind,
        duration_ms: i64,
        label: impl Into<String>,
    ) -> TimelineStep {
        TimelineStep::new(kind, self.current_ms, duration_ms, label)
    }

    /// Append a step that occupies time; the clock moves to its end.
    pub fn push_timed(&mut self, step: TimelineStep) {
        self.current_ms = self.current_ms.max(step.end_ms);
        self.steps.push(step);
    }

    /// Append a zero-width marker at the current clock without advancing it.
    pub fn push_marker(&mut self, kind: StepKind, label: impl Into<String>) -> &mut TimelineStep {
        let step = TimelineStep::new(kind, self.current_ms, 0, label);
        self.steps.push(step);
        let last = self.steps.len() - 1;
        &mut self.steps[last]
    }

    /// Append a step pinned to an absolute time; the clock is untouched.
    pub fn push_cue(&mut self, step: TimelineStep) {
        self.steps.push(step);
    }

    pub fn advance_to(&mut self, ms: i64) {
        self.current_ms = self.current_ms.max(ms);
    }

    /// Splice steps compiled against a zero origin, then advance by their span.
    pub fn extend_shifted(&mut self, steps: Vec<TimelineStep>, duration_ms: i64) {
        let offset = self.current_ms;
        log_debug!(
            self.verbosity,
            "splice {} steps at +{}ms (span {}ms)",
            steps.len(),
            offset,
            duration_ms
        );
        self.steps
            .extend(steps.into_iter().map(|step| step.shifted(offset)));
        self.current_ms = offset + duration_ms;
    }

    /// Number steps from 1 and link each to its successor.
    pub fn finish(self) -> Vec<TimelineStep> {
        let mut steps = self.steps;
        let count = steps.len() as u32;
        for (index, step) in steps.iter_mut().enumerate() {
            let number = index as u32 + 1;
            step.step = number;
            step.next_step_id = (number < count).then_some(number + 1);
        }
        steps
    }
}
