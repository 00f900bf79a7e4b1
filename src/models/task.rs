//! Task specification model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GlossaError, Result};
use crate::models::item::ComponentKind;

/// Exercise type presented to the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    Recognition,
    DefinitionMatch,
    RecallCued,
    RecallFree,
    FillBlank,
    Production,
    Collocation,
    WordFormation,
    SentenceWriting,
    ErrorCorrection,
    Translation,
    Timed,
    RapidResponse,
    RegisterShift,
    ReadingComprehension,
    ListeningComprehension,
}

impl TaskType {
    /// Minimum mastery stage at which this task type is allowed.
    pub fn minimum_stage(&self) -> u8 {
        match self {
            Self::Recognition | Self::DefinitionMatch => 0,
            Self::RecallCued | Self::FillBlank => 1,
            Self::RecallFree | Self::Collocation | Self::WordFormation => 2,
            Self::Production
            | Self::SentenceWriting
            | Self::ErrorCorrection
            | Self::Translation
            | Self::Timed => 3,
            Self::RapidResponse
            | Self::RegisterShift
            | Self::ReadingComprehension
            | Self::ListeningComprehension => 4,
        }
    }

    /// Dominant cognitive process the task type exercises.
    pub fn cognitive_process(&self) -> CognitiveProcess {
        match self {
            Self::Recognition | Self::DefinitionMatch | Self::ReadingComprehension => {
                CognitiveProcess::Recognition
            }
            Self::RecallCued | Self::RecallFree | Self::FillBlank | Self::RapidResponse => {
                CognitiveProcess::Recall
            }
            Self::WordFormation
            | Self::ErrorCorrection
            | Self::Translation
            | Self::RegisterShift => CognitiveProcess::Transformation,
            Self::Production
            | Self::SentenceWriting
            | Self::Collocation
            | Self::Timed
            | Self::ListeningComprehension => CognitiveProcess::Synthesis,
        }
    }

    /// Whether the task is presented under time pressure.
    pub fn is_timed(&self) -> bool {
        matches!(self, Self::Timed | Self::RapidResponse)
    }
}

/// Presentation format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskFormat {
    Mcq,
    Matching,
    FillBlank,
    FreeResponse,
}

/// Input/output channel for the task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modality {
    Visual,
    Auditory,
    Mixed,
}

/// Cognitive process demanded by a task, with its difficulty multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CognitiveProcess {
    Recognition,
    Recall,
    Transformation,
    Synthesis,
}

impl CognitiveProcess {
    /// Multiplier applied to target difficulties when composing the
    /// task-level difficulty.
    pub fn difficulty_multiplier(&self) -> f64 {
        match self {
            Self::Recognition => 0.8,
            Self::Recall => 1.0,
            Self::Transformation => 1.2,
            Self::Synthesis => 1.4,
        }
    }
}

/// One target item inside a task, with its share of the evidence the
/// task provides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTarget {
    pub item_id: String,
    pub component: ComponentKind,
    /// Q-matrix weight; all target weights in a task sum to 1
    pub weight: f64,
    /// Primary targets jointly hold at least half of the total weight
    pub primary: bool,
    /// Expected answer for evaluation
    pub expected: String,
}

/// A fully specified exercise ready for rendering by a content
/// generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: String,
    pub task_type: TaskType,
    pub format: TaskFormat,
    pub modality: Modality,
    pub targets: Vec<TaskTarget>,
    /// Composite difficulty on the theta scale, derived from target
    /// difficulties and the cognitive-process multiplier
    pub composite_difficulty: f64,
}

impl TaskSpec {
    pub fn new(
        task_type: TaskType,
        format: TaskFormat,
        modality: Modality,
        targets: Vec<TaskTarget>,
        composite_difficulty: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_type,
            format,
            modality,
            targets,
            composite_difficulty,
        }
    }

    /// Check the Q-matrix weight invariants: at least one target,
    /// weights summing to 1 (within 1e-6), primaries holding at least
    /// half the total weight.
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(GlossaError::InvalidTask(
                "task must have at least one target".to_string(),
            ));
        }
        let total: f64 = self.targets.iter().map(|t| t.weight).sum();
        if (total - 1.0).abs() > 1e-6 {
            return Err(GlossaError::InvalidTask(format!(
                "target weights must sum to 1, got {}",
                total
            )));
        }
        let primary: f64 = self
            .targets
            .iter()
            .filter(|t| t.primary)
            .map(|t| t.weight)
            .sum();
        if primary < 0.5 - 1e-6 {
            return Err(GlossaError::InvalidTask(format!(
                "primary targets must hold at least half the weight, got {}",
                primary
            )));
        }
        Ok(())
    }
}
