//! Q-matrix: baseline component involvement per task type
//!
//! Each task type has a fixed row describing how much evidence a
//! response carries about each linguistic component. Rows sum to 1 and
//! are read-only; weight allocation starts from these baselines and
//! redistributes over the actual targets.

use serde::{Deserialize, Serialize};

use crate::models::{ComponentKind, TaskType};

/// One Q-matrix row
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ComponentWeights {
    pub phonological: f64,
    pub morphological: f64,
    pub lexical: f64,
    pub syntactic: f64,
    pub pragmatic: f64,
}

impl ComponentWeights {
    pub fn get(&self, component: ComponentKind) -> f64 {
        match component {
            ComponentKind::Phonological => self.phonological,
            ComponentKind::Morphological => self.morphological,
            ComponentKind::Lexical => self.lexical,
            ComponentKind::Syntactic => self.syntactic,
            ComponentKind::Pragmatic => self.pragmatic,
        }
    }

    pub fn total(&self) -> f64 {
        self.phonological + self.morphological + self.lexical + self.syntactic + self.pragmatic
    }
}

const fn row(
    phonological: f64,
    morphological: f64,
    lexical: f64,
    syntactic: f64,
    pragmatic: f64,
) -> ComponentWeights {
    ComponentWeights {
        phonological,
        morphological,
        lexical,
        syntactic,
        pragmatic,
    }
}

/// Baseline component weights for a task type.
pub fn baseline_weights(task_type: TaskType) -> ComponentWeights {
    match task_type {
        TaskType::Recognition => row(0.10, 0.10, 0.70, 0.05, 0.05),
        TaskType::DefinitionMatch => row(0.00, 0.10, 0.80, 0.05, 0.05),
        TaskType::RecallCued => row(0.20, 0.20, 0.60, 0.00, 0.00),
        TaskType::RecallFree => row(0.30, 0.10, 0.60, 0.00, 0.00),
        TaskType::FillBlank => row(0.00, 0.20, 0.40, 0.40, 0.00),
        TaskType::Production => row(0.30, 0.10, 0.30, 0.20, 0.10),
        TaskType::Collocation => row(0.00, 0.00, 0.60, 0.30, 0.10),
        TaskType::WordFormation => row(0.00, 0.70, 0.20, 0.10, 0.00),
        TaskType::SentenceWriting => row(0.00, 0.10, 0.30, 0.50, 0.10),
        TaskType::ErrorCorrection => row(0.00, 0.30, 0.20, 0.50, 0.00),
        TaskType::Translation => row(0.00, 0.15, 0.40, 0.30, 0.15),
        TaskType::Timed => row(0.20, 0.10, 0.50, 0.20, 0.00),
        TaskType::RapidResponse => row(0.30, 0.10, 0.60, 0.00, 0.00),
        TaskType::RegisterShift => row(0.00, 0.00, 0.20, 0.20, 0.60),
        TaskType::ReadingComprehension => row(0.00, 0.10, 0.40, 0.30, 0.20),
        TaskType::ListeningComprehension => row(0.50, 0.00, 0.30, 0.10, 0.10),
    }
}
