//! Step expansion: one block's sets x exercises into an ordered step list.

use super::builder::TimelineBuilder;
use super::round_transition::insert_round_transition;
use super::sequencer::{assemble_timeline, check_block_types, summarize_block};
use super::CompileError;
use crate::config::CompileConfig;
use crate::models::{Block, BlockExercise, BlockType, RepTarget, ResolvedParams};
use crate::timeline::{ExecutionTimeline, ExerciseSnapshot, ReadyGate, StepKind, TimelineStep};
use crate::{log_blocks, log_steps};

/// What follows a work step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestPolicy {
    /// Last work step of the block: nothing follows
    EndOfTimeline,
    /// Fixed round-transition ritual
    RoundTransition,
    /// Zero-width wait for a rep count; the real rest happens inside it
    RepGated,
    /// Plain timed rest
    TimedRest,
}

/// Facts about a work step that decide its rest policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct RestContext {
    /// Last work step of the whole block
    pub is_last: bool,
    /// Last exercise of a non-final round (never true for straight sets)
    pub is_round_end: bool,
    /// Block runs in `reps` mode
    pub rep_mode: bool,
    /// Exercise has a rep target and no work override
    pub rep_based: bool,
}

/// Pick the rest policy. First matching rule wins.
pub fn decide_rest(ctx: RestContext) -> RestPolicy {
    if ctx.is_last {
        RestPolicy::EndOfTimeline
    } else if ctx.rep_mode && ctx.is_round_end {
        RestPolicy::RoundTransition
    } else if ctx.rep_based && !ctx.rep_mode {
        RestPolicy::RepGated
    } else if ctx.is_round_end {
        RestPolicy::RoundTransition
    } else {
        RestPolicy::TimedRest
    }
}

/// Steps of one block compiled against a zero origin.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockExpansion {
    pub steps: Vec<TimelineStep>,
    /// Clock position after the last step (ms)
    pub duration_ms: i64,
}

/// Expands a single block.
pub struct BlockExpander<'a> {
    block: &'a Block,
    exercises: Vec<&'a BlockExercise>,
    snapshots: Vec<ExerciseSnapshot>,
    params: ResolvedParams,
    config: &'a CompileConfig,
    builder: TimelineBuilder,
}

impl<'a> BlockExpander<'a> {
    pub fn new(block: &'a Block, exercises: &'a [BlockExercise], config: &'a CompileConfig) -> Self {
        let exercises = Block::ordered_exercises(exercises);
        let snapshots = exercises
            .iter()
            .map(|e| ExerciseSnapshot::from_block_exercise(e))
            .collect();
        Self {
            block,
            exercises,
            snapshots,
            params: ResolvedParams::resolve(&block.params, config),
            config,
            builder: TimelineBuilder::new(config.verbosity),
        }
    }

    pub fn run(mut self, with_intro: bool) -> BlockExpansion {
        let verbosity = self.config.verbosity;
        match &self.block.block_type {
            BlockType::CustomSequence => {
                self.emit_prefix(with_intro);
                if self.block.pattern.is_round_based() {
                    self.expand_rounds();
                } else {
                    self.expand_straight_sets();
                }
                if !self.exercises.is_empty() {
                    self.emit_finisher();
                }
            }
            BlockType::Transition => {
                self.emit_prefix(with_intro);
                self.emit_transition_block();
            }
            BlockType::Other(name) => {
                log_blocks!(verbosity, "skipping unsupported block type {:?}", name);
            }
        }

        let duration_ms = self.builder.current_ms();
        let steps = self.builder.finish();
        log_blocks!(
            verbosity,
            "{} block ({:?}, {} exercises x {} sets) -> {} steps, {}ms",
            self.block.block_type,
            self.block.pattern,
            self.exercises.len(),
            self.params.sets_per_exercise,
            steps.len(),
            duration_ms
        );
        BlockExpansion { steps, duration_ms }
    }

    fn title(&self) -> &str {
        self.block.title.as_deref().unwrap_or("Next block")
    }

    /// Optional intro instruction, then the optional ready gate.
    fn emit_prefix(&mut self, with_intro: bool) {
        if with_intro {
            let text = format!(
                "{}: {} exercises, {} sets each.",
                self.title(),
                self.exercises.len(),
                self.params.sets_per_exercise
            );
            let intro = self
                .builder
                .step_here(
                    StepKind::Instruction { text },
                    self.config.intro_duration_ms,
                    "Intro",
                )
                .pre_workout();
            self.builder.push_timed(intro);
        }
        if self.params.await_ready_before_start {
            let prompt = format!("Tap ready when you're set for {}.", self.title());
            self.builder
                .push_marker(
                    StepKind::AwaitReady {
                        gate: ReadyGate::BlockStart,
                    },
                    "Ready?",
                )
                .coach_prompt = Some(prompt);
        }
    }

    /// All sets of exercise A, then all sets of exercise B.
    fn expand_straight_sets(&mut self) {
        let sets = self.params.sets_per_exercise;
        let count = self.exercises.len();
        for index in 0..count {
            for set in 1..=sets {
                self.emit_work(index, set, None);
                let is_last = index + 1 == count && set == sets;
                let next = if set < sets { index } else { index + 1 };
                self.emit_after_work(index, set, None, next, false, is_last);
            }
        }
    }

    /// One set of every exercise per round; rounds repeat.
    fn expand_rounds(&mut self) {
        let rounds = self.params.sets_per_exercise;
        let count = self.exercises.len();
        for round in 1..=rounds {
            for index in 0..count {
                self.emit_work(index, round, Some(round));
                let last_in_round = index + 1 == count;
                let is_last = last_in_round && round == rounds;
                let is_round_end = last_in_round && round < rounds;
                let next = if last_in_round { 0 } else { index + 1 };
                self.emit_after_work(index, round, Some(round), next, is_round_end, is_last);
            }
        }
    }

    fn emit_work(&mut self, index: usize, set: u32, round: Option<u32>) {
        let exercise = self.exercises[index];
        let snapshot = self.snapshots[index].clone();
        let work_sec = self.params.exercise_work_sec(exercise);
        let target = self.params.exercise_target_reps(exercise).map(RepTarget::parse);
        let prompt = match &target {
            Some(target) => format!("Aim for {} reps of {}.", target, snapshot.name),
            None => format!("{} for {} seconds.", snapshot.name, work_sec),
        };
        let label = snapshot.name.clone();
        let step = self
            .builder
            .step_here(
                StepKind::Work {
                    exercise: Some(snapshot),
                    target_reps: target,
                    finisher: false,
                },
                i64::from(work_sec) * 1_000,
                label,
            )
            .with_set(set, round)
            .with_prompt(prompt);
        log_steps!(
            self.config.verbosity,
            "work {:?} set {} [{}, {})",
            step.label,
            set,
            step.at_ms,
            step.end_ms
        );
        self.builder.push_timed(step);
    }

    fn emit_after_work(
        &mut self,
        index: usize,
        set: u32,
        round: Option<u32>,
        next_index: usize,
        is_round_end: bool,
        is_last: bool,
    ) {
        let exercise = self.exercises[index];
        let policy = decide_rest(RestContext {
            is_last,
            is_round_end,
            rep_mode: self.block.is_rep_mode(),
            rep_based: self.params.is_rep_based(exercise),
        });
        log_steps!(
            self.config.verbosity,
            "after {:?} set {}: {:?}",
            exercise.exercise_name,
            set,
            policy
        );

        match policy {
            RestPolicy::EndOfTimeline => {}
            RestPolicy::RoundTransition => {
                insert_round_transition(
                    &mut self.builder,
                    &self.config.round_transition,
                    set,
                    set + 1,
                    self.config.verbosity,
                );
            }
            RestPolicy::RepGated => {
                let prompt = format!(
                    "How many reps of {} did you get?",
                    self.snapshots[index].name
                );
                let marker = self.builder.push_marker(
                    StepKind::AwaitReady {
                        gate: ReadyGate::RepCount,
                    },
                    "Log your reps",
                );
                marker.set = Some(set);
                marker.round = round;
                marker.coach_prompt = Some(prompt);
            }
            RestPolicy::TimedRest => {
                let rest_sec = self.params.exercise_rest_sec(exercise);
                let mut rest = self
                    .builder
                    .step_here(StepKind::Rest, i64::from(rest_sec) * 1_000, "Rest")
                    .with_set(set, round);
                if let Some(next) = self.snapshots.get(next_index) {
                    rest.coach_prompt = Some(format!("Up next: {}.", next.name));
                }
                self.builder.push_timed(rest);
            }
        }
    }

    /// Transition then finisher work, with nothing after.
    fn emit_finisher(&mut self) {
        let Some(post_cardio) = self.block.params.post_cardio.as_ref() else {
            return;
        };
        let transition_sec = match self.params.transition_sec {
            0 => self.config.default_transition_sec,
            sec => sec,
        };
        let duration_sec = post_cardio
            .duration_sec
            .filter(|sec| *sec > 0)
            .unwrap_or(self.config.default_post_cardio_sec);

        let transition = self
            .builder
            .step_here(
                StepKind::Transition,
                i64::from(transition_sec) * 1_000,
                format!("Get ready for {}", post_cardio.exercise),
            )
            .with_prompt(format!("Finisher coming up: {}.", post_cardio.exercise));
        self.builder.push_timed(transition);

        let finisher = self
            .builder
            .step_here(
                StepKind::Work {
                    exercise: Some(ExerciseSnapshot::from_post_cardio(post_cardio)),
                    target_reps: None,
                    finisher: true,
                },
                i64::from(duration_sec) * 1_000,
                post_cardio.exercise.clone(),
            )
            .with_prompt(format!(
                "Finisher: {} for {} seconds.",
                post_cardio.exercise, duration_sec
            ));
        self.builder.push_timed(finisher);
    }

    /// A `transition` block is one timed transition step, or nothing.
    fn emit_transition_block(&mut self) {
        let sec = self.params.transition_sec;
        if sec == 0 {
            return;
        }
        let label = self.block.title.clone().unwrap_or_else(|| "Transition".to_string());
        let step = self
            .builder
            .step_here(StepKind::Transition, i64::from(sec) * 1_000, label);
        self.builder.push_timed(step);
    }
}

/// Expand one block into steps numbered from 1, starting at 0ms.
pub fn expand_block(
    block: &Block,
    exercises: &[BlockExercise],
    config: &CompileConfig,
    with_intro: bool,
) -> Vec<TimelineStep> {
    BlockExpander::new(block, exercises, config)
        .run(with_intro)
        .steps
}

/// Compile a single block (with its own exercises) into a complete timeline.
pub fn compile_block(
    block: &Block,
    name: &str,
    config: &CompileConfig,
    with_intro: bool,
) -> Result<ExecutionTimeline, CompileError> {
    check_block_types(std::slice::from_ref(block), config)?;
    let expansion = BlockExpander::new(block, &block.exercises, config).run(with_intro);
    let summary = summarize_block(0, block, &expansion, 0, config);
    Ok(assemble_timeline(
        name,
        expansion.steps,
        expansion.duration_ms,
        vec![summary],
        config,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockParams, Mode, Pattern, PostCardio};

    fn make_exercise(name: &str, order: u32) -> BlockExercise {
        BlockExercise {
            exercise_id: name.to_lowercase(),
            order_index: order,
            exercise_name: name.to_string(),
            ..Default::default()
        }
    }

    fn make_block(pattern: Pattern, mode: Option<Mode>, params: BlockParams) -> Block {
        Block {
            block_type: BlockType::CustomSequence,
            pattern,
            mode,
            params,
            title: None,
            exercises: vec![make_exercise("Squat", 0), make_exercise("Row", 1)],
        }
    }

    fn timed_params(sets: u32, work: u32, rest: u32) -> BlockParams {
        BlockParams {
            sets_per_exercise: Some(sets),
            work_sec: Some(work),
            rest_sec: Some(rest),
            ..Default::default()
        }
    }

    fn types(steps: &[TimelineStep]) -> Vec<&'static str> {
        steps.iter().map(TimelineStep::type_name).collect()
    }

    #[test]
    fn test_decide_rest_priority() {
        let last = RestContext {
            is_last: true,
            is_round_end: true,
            rep_mode: true,
            rep_based: true,
        };
        assert_eq!(decide_rest(last), RestPolicy::EndOfTimeline);

        // Rep mode: the ritual beats the rep gate
        let rep_round_end = RestContext {
            is_round_end: true,
            rep_mode: true,
            rep_based: true,
            ..Default::default()
        };
        assert_eq!(decide_rest(rep_round_end), RestPolicy::RoundTransition);

        // Time mode: a rep-gated exercise waits even at a round boundary
        let legacy_round_end = RestContext {
            is_round_end: true,
            rep_based: true,
            ..Default::default()
        };
        assert_eq!(decide_rest(legacy_round_end), RestPolicy::RepGated);

        let rep_mode_mid_round = RestContext {
            rep_mode: true,
            rep_based: true,
            ..Default::default()
        };
        assert_eq!(decide_rest(rep_mode_mid_round), RestPolicy::TimedRest);

        let time_round_end = RestContext {
            is_round_end: true,
            ..Default::default()
        };
        assert_eq!(decide_rest(time_round_end), RestPolicy::RoundTransition);
        assert_eq!(decide_rest(RestContext::default()), RestPolicy::TimedRest);
    }

    #[test]
    fn test_straight_sets_timing() {
        let block = make_block(Pattern::StraightSets, Some(Mode::Time), timed_params(2, 30, 15));
        let steps = expand_block(&block, &block.exercises, &CompileConfig::default(), false);

        assert_eq!(
            types(&steps),
            vec!["work", "rest", "work", "rest", "work", "rest", "work"]
        );
        let spans: Vec<(i64, i64)> = steps.iter().map(|s| (s.at_ms, s.end_ms)).collect();
        assert_eq!(
            spans,
            vec![
                (0, 30_000),
                (30_000, 45_000),
                (45_000, 75_000),
                (75_000, 90_000),
                (90_000, 120_000),
                (120_000, 135_000),
                (135_000, 165_000)
            ]
        );
        assert_eq!(steps[0].label, "Squat");
        assert_eq!(steps[2].label, "Squat");
        assert_eq!(steps[4].label, "Row");
        assert_eq!(steps[2].set, Some(2));
        assert_eq!(steps[2].round, None);
        assert_eq!(steps[1].coach_prompt.as_deref(), Some("Up next: Squat."));
        assert_eq!(steps[3].coach_prompt.as_deref(), Some("Up next: Row."));
    }

    #[test]
    fn test_circuit_round_transition() {
        let block = make_block(Pattern::Circuit, Some(Mode::Time), timed_params(2, 20, 10));
        let steps = expand_block(&block, &block.exercises, &CompileConfig::default(), false);

        assert_eq!(
            types(&steps),
            vec![
                "work",
                "rest",
                "work",
                "round_rest",
                "countdown",
                "countdown",
                "countdown",
                "work",
                "rest",
                "work"
            ]
        );
        let starts: Vec<i64> = steps.iter().map(|s| s.at_ms).collect();
        assert_eq!(
            starts,
            vec![0, 20_000, 30_000, 50_700, 53_000, 54_000, 55_000, 55_600, 75_600, 85_600]
        );
        assert_eq!(steps.last().unwrap().end_ms, 105_600);
        assert_eq!(steps[7].round, Some(2));
        assert_eq!(steps[6].label, "GO");
    }

    #[test]
    fn test_round_rest_sec_is_ignored() {
        let mut params = timed_params(2, 20, 10);
        params.round_rest_sec = Some(90);
        let block = make_block(Pattern::Superset, None, params);
        let steps = expand_block(&block, &block.exercises, &CompileConfig::default(), false);
        let second_round = steps
            .iter()
            .find(|s| s.is_work() && s.round == Some(2))
            .unwrap();
        assert_eq!(second_round.at_ms, 55_600);
    }

    #[test]
    fn test_rep_gated_exercise_waits() {
        let params = BlockParams {
            sets_per_exercise: Some(2),
            target_reps: Some("12".to_string()),
            ..Default::default()
        };
        let block = make_block(Pattern::Circuit, None, params);
        let steps = expand_block(&block, &block.exercises, &CompileConfig::default(), false);

        let gate = &steps[1];
        assert!(gate.is_await_ready());
        assert_eq!(gate.at_ms, gate.end_ms);
        assert_eq!(gate.at_ms, 30_000);
        assert_eq!(
            gate.coach_prompt.as_deref(),
            Some("How many reps of Squat did you get?")
        );
        // Next work starts right where the gate sits
        assert_eq!(steps[2].at_ms, 30_000);
        assert_eq!(
            steps[0].kind,
            StepKind::Work {
                exercise: Some(ExerciseSnapshot::from_block_exercise(&block.exercises[0])),
                target_reps: Some(RepTarget::Exact { reps: 12 }),
                finisher: false,
            }
        );
        assert!(!types(&steps).contains(&"round_rest"));
    }

    #[test]
    fn test_rep_mode_uses_ritual_and_rests() {
        let params = BlockParams {
            sets_per_exercise: Some(2),
            target_reps: Some("10-12".to_string()),
            ..timed_params(2, 40, 20)
        };
        let block = make_block(Pattern::Circuit, Some(Mode::Reps), params);
        let steps = expand_block(&block, &block.exercises, &CompileConfig::default(), false);
        assert_eq!(types(&steps)[1], "rest");
        assert_eq!(types(&steps)[3], "round_rest");
        assert!(steps.iter().all(|s| !s.is_await_ready()));
        assert_eq!(steps[0].coach_prompt.as_deref(), Some("Aim for 10-12 reps of Squat."));
    }

    #[test]
    fn test_exercise_overrides() {
        let mut block = make_block(Pattern::StraightSets, None, timed_params(1, 30, 15));
        block.exercises[0].work_sec = Some(45);
        block.exercises[0].rest_sec = Some(5);
        let steps = expand_block(&block, &block.exercises, &CompileConfig::default(), false);
        assert_eq!(steps[0].duration_ms(), 45_000);
        assert_eq!(steps[1].duration_ms(), 5_000);
        assert_eq!(steps[2].duration_ms(), 30_000);
    }

    #[test]
    fn test_exercises_follow_order_index() {
        let mut block = make_block(Pattern::StraightSets, None, timed_params(1, 30, 15));
        block.exercises.reverse();
        let steps = expand_block(&block, &block.exercises, &CompileConfig::default(), false);
        assert_eq!(steps[0].label, "Squat");
        assert_eq!(steps[2].label, "Row");
    }

    #[test]
    fn test_intro_and_ready_gate_prefix() {
        let mut params = timed_params(1, 30, 15);
        params.await_ready_before_start = true;
        let block = make_block(Pattern::Circuit, None, params);
        let steps = expand_block(&block, &block.exercises, &CompileConfig::default(), true);

        assert_eq!(types(&steps)[..3], ["instruction", "await_ready", "work"]);
        assert!(steps[0].pre_workout);
        assert_eq!((steps[0].at_ms, steps[0].end_ms), (0, 10_000));
        assert_eq!((steps[1].at_ms, steps[1].end_ms), (10_000, 10_000));
        assert_eq!(steps[2].at_ms, 10_000);
    }

    #[test]
    fn test_post_cardio_finisher() {
        let mut params = timed_params(1, 30, 15);
        params.transition_sec = Some(20);
        params.post_cardio = Some(PostCardio {
            exercise: "Bike".to_string(),
            exercise_id: Some("bike".to_string()),
            duration_sec: Some(120),
        });
        let block = make_block(Pattern::StraightSets, None, params);
        let steps = expand_block(&block, &block.exercises, &CompileConfig::default(), false);

        let tail = &steps[steps.len() - 3..];
        assert_eq!(types(tail), vec!["work", "transition", "work"]);
        assert_eq!(tail[1].duration_ms(), 20_000);
        assert_eq!(tail[2].duration_ms(), 120_000);
        assert_eq!(tail[2].exercise().unwrap().exercise_id, "bike");
        assert!(matches!(tail[2].kind, StepKind::Work { finisher: true, .. }));
    }

    #[test]
    fn test_empty_exercises_only_prefix() {
        let mut params = timed_params(3, 30, 15);
        params.await_ready_before_start = true;
        params.post_cardio = Some(PostCardio {
            exercise: "Bike".to_string(),
            ..Default::default()
        });
        let mut block = make_block(Pattern::Circuit, None, params);
        block.exercises.clear();
        let steps = expand_block(&block, &block.exercises, &CompileConfig::default(), true);
        assert_eq!(types(&steps), vec!["instruction", "await_ready"]);
    }

    #[test]
    fn test_transition_block() {
        let block = Block {
            block_type: BlockType::Transition,
            pattern: Pattern::Custom,
            mode: None,
            params: BlockParams {
                transition_sec: Some(45),
                ..Default::default()
            },
            title: Some("Move to the rack".to_string()),
            exercises: vec![],
        };
        let steps = expand_block(&block, &[], &CompileConfig::default(), false);
        assert_eq!(types(&steps), vec!["transition"]);
        assert_eq!(steps[0].duration_ms(), 45_000);
        assert_eq!(steps[0].label, "Move to the rack");

        let empty = Block {
            params: BlockParams::default(),
            ..block
        };
        assert!(expand_block(&empty, &[], &CompileConfig::default(), false).is_empty());
    }

    #[test]
    fn test_unsupported_block_yields_nothing() {
        let mut block = make_block(Pattern::Circuit, None, timed_params(2, 30, 15));
        block.block_type = BlockType::Other("amrap".to_string());
        let expansion = BlockExpander::new(&block, &block.exercises, &CompileConfig::default())
            .run(true);
        assert!(expansion.steps.is_empty());
        assert_eq!(expansion.duration_ms, 0);
    }

    #[test]
    fn test_compile_block_header() {
        let block = make_block(Pattern::StraightSets, Some(Mode::Time), timed_params(2, 30, 15));
        let timeline = compile_block(&block, "Legs", &CompileConfig::default(), true).unwrap();
        assert_eq!(timeline.workout_header.name, "Legs");
        assert_eq!(timeline.workout_header.pre_workout_duration_ms, 10_000);
        assert_eq!(timeline.workout_header.total_duration_sec, 175);
        assert_eq!(timeline.workout_header.structure.len(), 1);
        assert_eq!(timeline.workout_header.structure[0].end_ms, 175_000);
    }

    #[test]
    fn test_compile_block_strict_rejects_unknown() {
        let mut block = make_block(Pattern::Circuit, None, timed_params(2, 30, 15));
        block.block_type = BlockType::Other("emom".to_string());
        let config = CompileConfig {
            strict_block_types: true,
            ..Default::default()
        };
        let err = compile_block(&block, "x", &config, false).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedBlockType { index: 0, .. }));
    }
}
