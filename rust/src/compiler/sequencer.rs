//! Multi-block sequencing into one workout timeline.

use super::builder::TimelineBuilder;
use super::expand::{BlockExpander, BlockExpansion};
use super::CompileError;
use crate::config::CompileConfig;
use crate::models::{Block, BlockType, ResolvedParams};
use crate::timeline::{
    BlockSummary, ExecutionTimeline, ReadyGate, StepKind, SyncContract, TimelineStep,
    WorkoutHeader,
};
use crate::{log_blocks, log_debug};

/// Fail on unrecognized block types when the config asks for it.
pub(crate) fn check_block_types(blocks: &[Block], config: &CompileConfig) -> Result<(), CompileError> {
    if !config.strict_block_types {
        return Ok(());
    }
    for (index, block) in blocks.iter().enumerate() {
        if let BlockType::Other(name) = &block.block_type {
            return Err(CompileError::UnsupportedBlockType {
                index,
                block_type: name.clone(),
            });
        }
    }
    Ok(())
}

pub(crate) fn summarize_block(
    index: usize,
    block: &Block,
    expansion: &BlockExpansion,
    start_ms: i64,
    config: &CompileConfig,
) -> BlockSummary {
    BlockSummary {
        index,
        block_type: block.block_type.clone(),
        pattern: block.pattern,
        mode: block.mode,
        sets: ResolvedParams::resolve(&block.params, config).sets_per_exercise,
        exercise_count: block.exercises.len(),
        step_count: expansion.steps.len(),
        start_ms,
        end_ms: start_ms + expansion.duration_ms,
    }
}

/// Wrap finished steps into the artifact handed to the player.
pub(crate) fn assemble_timeline(
    name: &str,
    steps: Vec<TimelineStep>,
    duration_ms: i64,
    structure: Vec<BlockSummary>,
    config: &CompileConfig,
) -> ExecutionTimeline {
    let pre_workout_duration_ms = steps
        .iter()
        .filter(|s| s.pre_workout)
        .map(TimelineStep::duration_ms)
        .sum();
    ExecutionTimeline {
        workout_header: WorkoutHeader {
            name: name.to_string(),
            total_duration_sec: (duration_ms.max(0) + 999) / 1_000,
            structure,
            pre_workout_duration_ms,
        },
        execution_timeline: steps,
        sync: SyncContract {
            workout_start_epoch_ms: config.workout_start_epoch_ms(),
            resync_every_ms: config.resync_every_ms,
            allowed_drift_ms: config.allowed_drift_ms,
        },
    }
}

/// Compile a full workout: organize gate, intro, then each block with a
/// ready gate between consecutive blocks.
///
/// `await_ready` steps never advance the clock; offsets after one are valid
/// once the player resumes.
pub fn compile_workout(
    blocks: &[Block],
    name: &str,
    config: &CompileConfig,
) -> Result<ExecutionTimeline, CompileError> {
    check_block_types(blocks, config)?;
    let mut builder = TimelineBuilder::new(config.verbosity);

    let gate = builder.push_marker(
        StepKind::AwaitReady {
            gate: ReadyGate::WorkoutStart,
        },
        "Get organized",
    );
    gate.pre_workout = true;
    gate.coach_prompt =
        Some("Take a moment to get organized. Tap ready when you're set.".to_string());

    let intro = builder
        .step_here(
            StepKind::Instruction {
                text: intro_text(name, blocks.len()),
            },
            config.intro_duration_ms,
            "Intro",
        )
        .pre_workout();
    builder.push_timed(intro);

    let mut structure = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        let start_ms = builder.current_ms();
        let expansion = BlockExpander::new(block, &block.exercises, config).run(false);
        log_debug!(
            config.verbosity,
            "block {} placed at {}ms, span {}ms",
            index,
            start_ms,
            expansion.duration_ms
        );
        structure.push(summarize_block(index, block, &expansion, start_ms, config));
        builder.extend_shifted(expansion.steps, expansion.duration_ms);

        if index + 1 < blocks.len() {
            let next = index + 2;
            let gate = builder.push_marker(
                StepKind::AwaitReady {
                    gate: ReadyGate::NextBlock,
                },
                format!("Ready for block {}?", next),
            );
            gate.coach_prompt = Some(format!("Tap ready when you're set for block {}.", next));
        }
    }

    let duration_ms = builder.current_ms();
    let steps = builder.finish();
    log_blocks!(
        config.verbosity,
        "workout {:?}: {} blocks, {} steps, {}ms",
        name,
        blocks.len(),
        steps.len(),
        duration_ms
    );
    Ok(assemble_timeline(name, steps, duration_ms, structure, config))
}

fn intro_text(name: &str, block_count: usize) -> String {
    let noun = if block_count == 1 { "block" } else { "blocks" };
    format!("Welcome to {}. {} {} today.", name, block_count, noun)
}
