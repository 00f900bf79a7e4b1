//! Learner response models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::item::ComponentKind;
use crate::models::task::TaskType;

/// How much scaffolding was shown for a presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CueLevel {
    None = 0,
    Light = 1,
    Moderate = 2,
    Full = 3,
}

impl CueLevel {
    pub fn is_cued(&self) -> bool {
        *self != CueLevel::None
    }

    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Self::None,
            1 => Self::Light,
            2 => Self::Moderate,
            _ => Self::Full,
        }
    }
}

/// Per-component partial credit for one response. Components the task
/// did not touch stay `None`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ComponentScores {
    pub phonological: Option<f64>,
    pub morphological: Option<f64>,
    pub lexical: Option<f64>,
    pub syntactic: Option<f64>,
    pub pragmatic: Option<f64>,
}

impl ComponentScores {
    pub fn get(&self, component: ComponentKind) -> Option<f64> {
        match component {
            ComponentKind::Phonological => self.phonological,
            ComponentKind::Morphological => self.morphological,
            ComponentKind::Lexical => self.lexical,
            ComponentKind::Syntactic => self.syntactic,
            ComponentKind::Pragmatic => self.pragmatic,
        }
    }

    pub fn set(&mut self, component: ComponentKind, score: f64) {
        let slot = match component {
            ComponentKind::Phonological => &mut self.phonological,
            ComponentKind::Morphological => &mut self.morphological,
            ComponentKind::Lexical => &mut self.lexical,
            ComponentKind::Syntactic => &mut self.syntactic,
            ComponentKind::Pragmatic => &mut self.pragmatic,
        };
        *slot = Some(score);
    }

    /// Components with a recorded score, in cascade order.
    pub fn entries(&self) -> Vec<(ComponentKind, f64)> {
        crate::models::item::CASCADE
            .iter()
            .filter_map(|&c| self.get(c).map(|s| (c, s)))
            .collect()
    }
}

/// A learner's answer to one task presentation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub task_id: String,
    pub item_id: String,
    pub correct: bool,
    /// Partial credit per component, when the evaluator produced it
    pub scores: ComponentScores,
    pub response_time_ms: u64,
    pub cue_level: CueLevel,
    pub timestamp: DateTime<Utc>,
}

impl Response {
    pub fn new(
        task_id: String,
        item_id: String,
        correct: bool,
        response_time_ms: u64,
        cue_level: CueLevel,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id,
            item_id,
            correct,
            scores: ComponentScores::default(),
            response_time_ms,
            cue_level,
            timestamp,
        }
    }
}

/// Compact entry kept in the per-learner response window for
/// bottleneck analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedResponse {
    pub component: ComponentKind,
    pub correct: bool,
    pub task_type: TaskType,
    pub timestamp: DateTime<Utc>,
    /// Session the response belongs to, for co-occurrence grouping
    pub session_id: Option<String>,
}
