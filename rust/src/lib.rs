//! Workout timeline compiler.
//!
//! Turns declarative exercise blocks (pattern, sets, work/rest durations) into a
//! flat, absolute-timestamped step list that a real-time player and a voice
//! coach can follow without re-deriving any timing:
//!
//! 1. [`compiler::expand_block`] expands one block (straight sets or rounds),
//!    choosing rest, rep-gated wait, or the round-transition ritual after each
//!    work step
//! 2. [`compiler::compile_workout`] sequences blocks behind ready gates
//! 3. [`validator::validate`] checks the result's structural invariants
//!
//! With the `python` feature the JSON entry points are also exposed as a
//! Python extension module.

pub mod compiler;
pub mod config;
pub mod logging;
pub mod models;
pub mod timeline;
pub mod validator;

use serde::{Deserialize, Serialize};

pub use compiler::{
    compile_block, compile_workout, expand_block, CompileError, RoundTransitionTiming,
};
pub use config::CompileConfig;
pub use models::{Block, BlockExercise, BlockParams, BlockType, Mode, Pattern, PostCardio};
pub use timeline::{ExecutionTimeline, StepKind, TimelineStep};
pub use validator::{validate, ValidationReport};

/// JSON request for a whole workout; each block carries its exercises.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutRequest {
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Compile a `WorkoutRequest` JSON document into timeline JSON.
pub fn compile_workout_json(request_json: &str, config: &CompileConfig) -> Result<String, CompileError> {
    let request: WorkoutRequest = serde_json::from_str(request_json)?;
    let timeline = compile_workout(&request.blocks, &request.name, config)?;
    Ok(serde_json::to_string(&timeline)?)
}

/// Compile a single block JSON document into timeline JSON.
pub fn compile_block_json(
    block_json: &str,
    name: &str,
    config: &CompileConfig,
    with_intro: bool,
) -> Result<String, CompileError> {
    let block: Block = serde_json::from_str(block_json)?;
    let timeline = compile_block(&block, name, config, with_intro)?;
    Ok(serde_json::to_string(&timeline)?)
}

/// Validate timeline JSON. Only malformed JSON is an error.
pub fn validate_json(timeline_json: &str) -> Result<ValidationReport, CompileError> {
    let timeline: ExecutionTimeline = serde_json::from_str(timeline_json)?;
    Ok(validate(&timeline))
}

#[cfg(feature = "python")]
mod python {
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::{CompileConfig, CompileError};

    fn to_py_err(err: CompileError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    /// Compile a workout request (JSON) into an execution timeline (JSON).
    ///
    /// # Raises
    /// * ValueError on malformed JSON, or on unknown block types when `strict=True`
    #[pyfunction]
    #[pyo3(signature = (request_json, strict=false, verbosity=0))]
    fn compile_workout_json(request_json: &str, strict: bool, verbosity: u8) -> PyResult<String> {
        let config = CompileConfig::with_overrides(None, Some(strict), Some(verbosity));
        crate::compile_workout_json(request_json, &config).map_err(to_py_err)
    }

    /// Compile one block (JSON, with its exercises) into an execution timeline (JSON).
    #[pyfunction]
    #[pyo3(signature = (block_json, name, with_intro=false, strict=false, verbosity=0))]
    fn compile_block_json(
        block_json: &str,
        name: &str,
        with_intro: bool,
        strict: bool,
        verbosity: u8,
    ) -> PyResult<String> {
        let config = CompileConfig::with_overrides(None, Some(strict), Some(verbosity));
        crate::compile_block_json(block_json, name, &config, with_intro).map_err(to_py_err)
    }

    /// Validate an execution timeline (JSON). Returns `(valid, errors)`.
    #[pyfunction]
    fn validate_timeline_json(timeline_json: &str) -> PyResult<(bool, Vec<String>)> {
        let report = crate::validate_json(timeline_json).map_err(to_py_err)?;
        Ok((report.valid, report.errors))
    }

    #[pymodule]
    fn workout_timeline(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(compile_workout_json, m)?)?;
        m.add_function(wrap_pyfunction!(compile_block_json, m)?)?;
        m.add_function(wrap_pyfunction!(validate_timeline_json, m)?)?;
        Ok(())
    }
}
