//! Resolved exercise snapshot carried by `work` steps.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::models::{BlockExercise, PostCardio};

/// What the player and voice layer need to present one exercise.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSnapshot {
    pub exercise_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_muscle_group: Option<String>,
    /// Primary then secondary equipment, de-duplicated
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub cues: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl ExerciseSnapshot {
    pub fn from_block_exercise(exercise: &BlockExercise) -> Self {
        Self {
            exercise_id: exercise.exercise_id.clone(),
            name: exercise.exercise_name.clone(),
            primary_muscle_group: exercise.primary_muscle_group.clone(),
            equipment: equipment_union(
                exercise.equipment_primary.as_deref(),
                &exercise.equipment_secondary,
            ),
            cues: exercise
                .coaching_bullet_points
                .as_deref()
                .map(parse_cues)
                .unwrap_or_default(),
            video_url: exercise.video_url.clone(),
            thumbnail_url: exercise.thumbnail_url.clone(),
        }
    }

    /// Snapshot for a finisher, which only has a name.
    pub fn from_post_cardio(post_cardio: &PostCardio) -> Self {
        Self {
            exercise_id: post_cardio
                .exercise_id
                .clone()
                .unwrap_or_else(|| "post-cardio".to_string()),
            name: post_cardio.exercise.clone(),
            ..Default::default()
        }
    }
}

/// Order-preserving, case-insensitive union of primary and secondary equipment.
pub fn equipment_union(primary: Option<&str>, secondary: &[String]) -> Vec<String> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    primary
        .into_iter()
        .chain(secondary.iter().map(String::as_str))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(item.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Split raw coaching text into cues, one per line, without bullet markers.
pub fn parse_cues(raw: &str) -> Vec<String> {
    raw.lines()
        .map(strip_bullet)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_bullet(line: &str) -> &str {
    let line = line.trim();
    for marker in ["- ", "* ", "• ", "-", "*", "•"] {
        if let Some(rest) = line.strip_prefix(marker) {
            return rest.trim();
        }
    }
    // Numbered lists: "1." or "1)"
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim();
        }
    }
    line
}
