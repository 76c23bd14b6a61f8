//! End-to-end compile scenarios through the public API.

use workout_timeline::models::ResolvedParams;
use workout_timeline::timeline::ReadyGate;
use workout_timeline::{
    compile_workout, expand_block, validate, Block, BlockExercise, BlockParams, BlockType,
    CompileConfig, Mode, Pattern, StepKind, TimelineStep,
};

fn exercise(name: &str, order: u32) -> BlockExercise {
    BlockExercise {
        exercise_id: name.to_lowercase().replace(' ', "-"),
        order_index: order,
        exercise_name: name.to_string(),
        ..Default::default()
    }
}

fn block(pattern: Pattern, mode: Option<Mode>, sets: u32, work: u32, rest: u32) -> Block {
    Block {
        block_type: BlockType::CustomSequence,
        pattern,
        mode,
        params: BlockParams {
            sets_per_exercise: Some(sets),
            work_sec: Some(work),
            rest_sec: Some(rest),
            ..Default::default()
        },
        title: None,
        exercises: vec![exercise("Goblet Squat", 0), exercise("Bent Row", 1)],
    }
}

fn spans(steps: &[TimelineStep]) -> Vec<(&'static str, i64, i64)> {
    steps
        .iter()
        .map(|s| (s.type_name(), s.at_ms, s.end_ms))
        .collect()
}

#[test]
fn straight_sets_time_mode() {
    let b = block(Pattern::StraightSets, Some(Mode::Time), 2, 30, 15);
    let steps = expand_block(&b, &b.exercises, &CompileConfig::default(), false);

    assert_eq!(
        spans(&steps),
        vec![
            ("work", 0, 30_000),
            ("rest", 30_000, 45_000),
            ("work", 45_000, 75_000),
            ("rest", 75_000, 90_000),
            ("work", 90_000, 120_000),
            ("rest", 120_000, 135_000),
            ("work", 135_000, 165_000),
        ]
    );
}

#[test]
fn circuit_time_mode_with_round_ritual() {
    let b = block(Pattern::Circuit, Some(Mode::Time), 2, 20, 10);
    let steps = expand_block(&b, &b.exercises, &CompileConfig::default(), false);

    assert_eq!(
        spans(&steps),
        vec![
            ("work", 0, 20_000),
            ("rest", 20_000, 30_000),
            ("work", 30_000, 50_000),
            ("round_rest", 50_700, 50_800),
            ("countdown", 53_000, 53_220),
            ("countdown", 54_000, 54_220),
            ("countdown", 55_000, 55_600),
            ("work", 55_600, 75_600),
            ("rest", 75_600, 85_600),
            ("work", 85_600, 105_600),
        ]
    );
    assert_eq!(steps[6].label, "GO");
}

#[test]
fn legacy_rep_gated_exercise_mid_circuit() {
    let mut b = block(Pattern::Circuit, None, 2, 30, 30);
    b.params.work_sec = None;
    b.exercises[0].target_reps = Some("12".to_string());
    let steps = expand_block(&b, &b.exercises, &CompileConfig::default(), false);

    let gate = &steps[1];
    assert_eq!(
        gate.kind,
        StepKind::AwaitReady {
            gate: ReadyGate::RepCount
        }
    );
    assert_eq!(gate.at_ms, gate.end_ms);
    assert!(gate.coach_prompt.as_deref().unwrap().contains("How many reps"));

    // The untargeted exercise still ends its round with the ritual
    assert_eq!(steps[3].type_name(), "round_rest");
}

#[test]
fn validator_flags_hand_made_gap() {
    let b = block(Pattern::StraightSets, Some(Mode::Time), 2, 30, 15);
    let timeline =
        workout_timeline::compile_block(&b, "Gap", &CompileConfig::default(), false).unwrap();
    let mut corrupted = timeline.clone();
    corrupted.execution_timeline[1].at_ms += 500;

    let report = validate(&corrupted);
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Gap between step 1 and 2: 500ms"));
    assert!(validate(&timeline).valid);
}

#[test]
fn two_block_full_session() {
    let block_a = block(Pattern::StraightSets, Some(Mode::Time), 2, 30, 15);
    let block_b = block(Pattern::Circuit, Some(Mode::Time), 2, 20, 10);
    let config = CompileConfig::default();
    let a_steps = expand_block(&block_a, &block_a.exercises, &config, false);
    let b_steps = expand_block(&block_b, &block_b.exercises, &config, false);
    let a_duration = a_steps.last().unwrap().end_ms;

    let timeline = compile_workout(&[block_a, block_b], "Full Session", &config).unwrap();
    let steps = timeline.steps();

    assert!(steps[0].is_await_ready() && steps[0].pre_workout);
    assert_eq!(steps[1].type_name(), "instruction");
    assert!(steps[1].pre_workout);
    assert_eq!(steps[1].duration_ms(), 10_000);

    for (offset, expected) in a_steps.iter().enumerate() {
        let actual = &steps[2 + offset];
        assert_eq!(actual.type_name(), expected.type_name());
        assert_eq!(actual.at_ms, expected.at_ms + 10_000);
        assert_eq!(actual.end_ms, expected.end_ms + 10_000);
    }

    let gate_index = 2 + a_steps.len();
    assert!(steps[gate_index].is_await_ready());
    assert!(!steps[gate_index].pre_workout);

    for (offset, expected) in b_steps.iter().enumerate() {
        let actual = &steps[gate_index + 1 + offset];
        assert_eq!(actual.at_ms, expected.at_ms + 10_000 + a_duration);
    }
    assert_eq!(steps.len(), gate_index + 1 + b_steps.len());

    assert_eq!(timeline.workout_header.pre_workout_duration_ms, 10_000);
    assert!(validate(&timeline).valid);
}

#[test]
fn round_rest_sec_does_not_change_ritual() {
    let mut b = block(Pattern::Circuit, Some(Mode::Reps), 3, 20, 10);
    b.params.round_rest_sec = Some(120);
    let resolved = ResolvedParams::resolve(&b.params, &CompileConfig::default());
    assert_eq!(resolved.sets_per_exercise, 3);

    let steps = expand_block(&b, &b.exercises, &CompileConfig::default(), false);
    let round_starts: Vec<i64> = steps
        .iter()
        .filter(|s| s.is_work() && s.label == "Goblet Squat")
        .map(|s| s.at_ms)
        .collect();
    // Each round is 50s of work/rest; the ritual adds exactly 5.6s
    assert_eq!(round_starts, vec![0, 55_600, 111_200]);
}

#[test]
fn validator_flags_misplaced_round_cue() {
    let b = block(Pattern::Circuit, Some(Mode::Time), 2, 20, 10);
    let timeline =
        workout_timeline::compile_block(&b, "Ritual", &CompileConfig::default(), false).unwrap();
    assert!(validate(&timeline).valid);

    let mut corrupted = timeline.clone();
    let cue = &mut corrupted.execution_timeline[3];
    assert_eq!(cue.type_name(), "round_rest");
    cue.at_ms += 1_500;
    cue.end_ms += 1_500;

    let report = validate(&corrupted);
    assert!(!report.valid);
    assert_eq!(
        report.errors,
        vec!["Misplaced ritual cue at step 4: round_rest expected at T+700ms (50700ms), found 52200ms"]
    );
}
