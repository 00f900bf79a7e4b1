//! Task selection
//!
//! Picks what kind of exercise to present next: task type gated by
//! mastery stage, scored by feature-vector affinity, with a variety
//! window so the same exercise never repeats back to back; then format
//! and modality, and a contextual difficulty for display.

use crate::linguistics::phonology::l1_interference_adjustment;
use crate::models::{
    ComponentKind, FeatureVector, LanguageFamily, LearnableItem, MasteryRecord, Modality,
    TaskFormat, TaskSpec, TaskTarget, TaskType,
};
use crate::tasks::calibration::composite_difficulty;

/// A type that appeared in the last this-many selections is skipped
/// unless nothing else remains.
pub const VARIETY_WINDOW: usize = 2;

/// All task types in canonical order; scanning this fixed order keeps
/// tie-breaking deterministic.
const ALL_TYPES: [TaskType; 16] = [
    TaskType::Recognition,
    TaskType::DefinitionMatch,
    TaskType::RecallCued,
    TaskType::FillBlank,
    TaskType::RecallFree,
    TaskType::Collocation,
    TaskType::WordFormation,
    TaskType::Production,
    TaskType::SentenceWriting,
    TaskType::ErrorCorrection,
    TaskType::Translation,
    TaskType::Timed,
    TaskType::RapidResponse,
    TaskType::RegisterShift,
    TaskType::ReadingComprehension,
    TaskType::ListeningComprehension,
];

/// Task types allowed at a mastery stage. The gate is strict: nothing
/// above the learner's stage ever leaks through.
pub fn allowed_task_types(stage: u8) -> Vec<TaskType> {
    ALL_TYPES
        .iter()
        .copied()
        .filter(|t| t.minimum_stage() <= stage)
        .collect()
}

/// Task family favored by the item's dominant feature component.
fn preferred_type(dominant: &str) -> Option<TaskType> {
    match dominant {
        "morphological" => Some(TaskType::WordFormation),
        "relational" => Some(TaskType::Collocation),
        "pragmatic" => Some(TaskType::RegisterShift),
        "frequency" => Some(TaskType::RapidResponse),
        "phonological" => Some(TaskType::ListeningComprehension),
        _ => None,
    }
}

/// Affinity of one candidate type for the item's feature profile.
fn affinity(candidate: TaskType, features: &FeatureVector) -> f64 {
    let (dominant, value) = features.dominant();
    if preferred_type(dominant) == Some(candidate) {
        0.3 + value * 0.7
    } else {
        0.4 + features.frequency * 0.3
    }
}

/// Select the next task type for an item.
///
/// Candidates are the stage-allowed types minus anything in the recent
/// history window; if the window excludes everything, the exclusion is
/// lifted rather than returning nothing.
pub fn select_task_type(stage: u8, features: &FeatureVector, history: &[TaskType]) -> TaskType {
    let allowed = allowed_task_types(stage);
    let recent: Vec<TaskType> = history
        .iter()
        .rev()
        .take(VARIETY_WINDOW)
        .copied()
        .collect();

    let candidates: Vec<TaskType> = allowed
        .iter()
        .copied()
        .filter(|t| !recent.contains(t))
        .collect();
    let candidates = if candidates.is_empty() { allowed } else { candidates };

    let mut best = candidates[0];
    let mut best_score = affinity(best, features);
    for &candidate in &candidates[1..] {
        let score = affinity(candidate, features);
        if score > best_score {
            best = candidate;
            best_score = score;
        }
    }
    best
}

/// Format by stage: early stages stay receptive (choice among given
/// options), later stages produce.
pub fn select_format(stage: u8, task_type: TaskType) -> TaskFormat {
    match stage {
        0 | 1 => match task_type {
            TaskType::DefinitionMatch => TaskFormat::Matching,
            TaskType::FillBlank => TaskFormat::FillBlank,
            _ => TaskFormat::Mcq,
        },
        2 => match task_type {
            TaskType::Recognition | TaskType::DefinitionMatch => TaskFormat::Mcq,
            TaskType::Collocation => TaskFormat::Matching,
            TaskType::FillBlank | TaskType::RecallCued => TaskFormat::FillBlank,
            _ => TaskFormat::FreeResponse,
        },
        _ => match task_type {
            TaskType::FillBlank | TaskType::RecallCued => TaskFormat::FillBlank,
            _ => TaskFormat::FreeResponse,
        },
    }
}

/// Modality from the feature profile: strongly phonological items are
/// presented aurally, strongly pragmatic ones mix channels.
pub fn select_modality(features: &FeatureVector) -> Modality {
    if features.phonological > 0.7 {
        Modality::Auditory
    } else if features.pragmatic > 0.6 {
        Modality::Mixed
    } else {
        Modality::Visual
    }
}

/// Production skill channel a task exercises, with its difficulty
/// adjustment.
fn channel_adjustment(task_type: TaskType, modality: Modality) -> f64 {
    match task_type {
        TaskType::Production => 0.3, // speaking
        TaskType::SentenceWriting | TaskType::ErrorCorrection | TaskType::Translation => 0.2,
        TaskType::ListeningComprehension => 0.1,
        _ => match modality {
            Modality::Auditory => 0.1,
            _ => 0.0, // reading
        },
    }
}

/// Unit size of the item's content.
fn target_layer_adjustment(content: &str) -> f64 {
    let chars = content.chars().count();
    if chars <= 1 {
        -0.5 // single grapheme
    } else if chars <= 3 && !content.contains(' ') {
        0.0 // syllable-sized
    } else {
        0.3 // full word or phrase
    }
}

/// Contextual difficulty of presenting an item in a given task
/// configuration: the base IRT difficulty plus additive adjustments
/// for channel, task type, timing, unit size and L1 interference.
pub fn contextual_difficulty(
    item: &LearnableItem,
    task_type: TaskType,
    modality: Modality,
    l1: Option<LanguageFamily>,
) -> f64 {
    let mut difficulty = item.irt.difficulty;
    difficulty += channel_adjustment(task_type, modality);
    difficulty += match task_type {
        TaskType::Recognition | TaskType::DefinitionMatch => -0.2,
        TaskType::Production => 0.3,
        _ => 0.0,
    };
    if task_type.is_timed() {
        difficulty += 0.15;
    }
    difficulty += target_layer_adjustment(&item.content);
    if let Some(family) = l1 {
        if item.component == ComponentKind::Phonological || modality == Modality::Auditory {
            difficulty += l1_interference_adjustment(family, &item.content);
        }
    }
    difficulty.clamp(-4.0, 4.0)
}

/// Build a single-target task for an item: type, format and modality
/// selected from the mastery stage and feature profile.
pub fn build_task(
    item: &LearnableItem,
    record: Option<&MasteryRecord>,
    history: &[TaskType],
) -> TaskSpec {
    let stage = record.map(|r| r.stage).unwrap_or(0);
    let task_type = select_task_type(stage, &item.features, history);
    let format = select_format(stage, task_type);
    let modality = select_modality(&item.features);
    let target = TaskTarget {
        item_id: item.id.clone(),
        component: item.component,
        weight: 1.0,
        primary: true,
        expected: item.content.clone(),
    };
    let difficulty = composite_difficulty(
        &[(1.0, item.irt.difficulty)],
        task_type.cognitive_process(),
    );
    TaskSpec::new(task_type, format, modality, vec![target], difficulty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IrtParams;
    use chrono::Utc;

    fn features() -> FeatureVector {
        FeatureVector {
            frequency: 0.5,
            ..Default::default()
        }
    }

    fn item_with(component: ComponentKind, content: &str, features: FeatureVector) -> LearnableItem {
        LearnableItem::new(
            content.to_string(),
            component,
            IrtParams::new(1.0, 0.0),
            features,
            Utc::now(),
        )
    }

    #[test]
    fn test_stage_zero_allows_only_receptive_types() {
        let allowed = allowed_task_types(0);
        assert_eq!(allowed, vec![TaskType::Recognition, TaskType::DefinitionMatch]);
    }

    #[test]
    fn test_stage_four_allows_everything() {
        assert_eq!(allowed_task_types(4).len(), 16);
    }

    #[test]
    fn test_gate_is_strict() {
        for stage in 0..=4u8 {
            for task_type in allowed_task_types(stage) {
                assert!(task_type.minimum_stage() <= stage);
            }
        }
    }

    #[test]
    fn test_morphological_items_get_word_formation() {
        let features = FeatureVector {
            frequency: 0.3,
            morphological: 0.9,
            ..Default::default()
        };
        assert_eq!(select_task_type(2, &features, &[]), TaskType::WordFormation);
    }

    #[test]
    fn test_pragmatic_items_get_register_shift_at_stage_four() {
        let features = FeatureVector {
            frequency: 0.3,
            pragmatic: 0.95,
            ..Default::default()
        };
        assert_eq!(select_task_type(4, &features, &[]), TaskType::RegisterShift);
    }

    #[test]
    fn test_dominant_type_unavailable_below_its_stage() {
        let features = FeatureVector {
            frequency: 0.3,
            pragmatic: 0.95,
            ..Default::default()
        };
        let chosen = select_task_type(1, &features, &[]);
        assert!(chosen.minimum_stage() <= 1);
    }

    #[test]
    fn test_variety_window_blocks_recent_type() {
        let features = FeatureVector {
            frequency: 0.3,
            morphological: 0.9,
            ..Default::default()
        };
        let history = vec![TaskType::WordFormation];
        let chosen = select_task_type(2, &features, &history);
        assert_ne!(chosen, TaskType::WordFormation);
    }

    #[test]
    fn test_variety_window_lifts_when_no_alternative() {
        // Stage 0 allows two types; block both and selection must
        // still return one of them.
        let history = vec![TaskType::Recognition, TaskType::DefinitionMatch];
        let chosen = select_task_type(0, &features(), &history);
        assert!(matches!(
            chosen,
            TaskType::Recognition | TaskType::DefinitionMatch
        ));
    }

    #[test]
    fn test_format_by_stage() {
        assert_eq!(select_format(0, TaskType::Recognition), TaskFormat::Mcq);
        assert_eq!(select_format(1, TaskType::DefinitionMatch), TaskFormat::Matching);
        assert_eq!(
            select_format(4, TaskType::SentenceWriting),
            TaskFormat::FreeResponse
        );
        assert_eq!(select_format(3, TaskType::FillBlank), TaskFormat::FillBlank);
    }

    #[test]
    fn test_modality_rules() {
        let phon = FeatureVector {
            phonological: 0.8,
            ..Default::default()
        };
        assert_eq!(select_modality(&phon), Modality::Auditory);
        let prag = FeatureVector {
            pragmatic: 0.7,
            ..Default::default()
        };
        assert_eq!(select_modality(&prag), Modality::Mixed);
        assert_eq!(select_modality(&FeatureVector::default()), Modality::Visual);
    }

    #[test]
    fn test_contextual_difficulty_adjustments() {
        let item = item_with(ComponentKind::Lexical, "negotiate", features());
        let recognition =
            contextual_difficulty(&item, TaskType::Recognition, Modality::Visual, None);
        let production =
            contextual_difficulty(&item, TaskType::Production, Modality::Visual, None);
        // recognition: -0.2 + word layer 0.3; production: +0.3 channel +0.3 type +0.3 layer
        assert!(production > recognition);
        assert!((recognition - 0.1).abs() < 1e-9);
        assert!((production - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_timed_tasks_are_harder() {
        let item = item_with(ComponentKind::Lexical, "negotiate", features());
        let timed = contextual_difficulty(&item, TaskType::Timed, Modality::Visual, None);
        let untimed = contextual_difficulty(&item, TaskType::RecallFree, Modality::Visual, None);
        assert!(timed > untimed);
    }

    #[test]
    fn test_l1_interference_raises_phonological_difficulty() {
        let item = item_with(ComponentKind::Phonological, "parallel", features());
        let with_l1 = contextual_difficulty(
            &item,
            TaskType::RecallFree,
            Modality::Auditory,
            Some(LanguageFamily::Japonic),
        );
        let without = contextual_difficulty(&item, TaskType::RecallFree, Modality::Auditory, None);
        assert!(with_l1 > without);
    }

    #[test]
    fn test_build_task_produces_valid_spec() {
        let item = item_with(ComponentKind::Lexical, "negotiate", features());
        let task = build_task(&item, None, &[]);
        assert!(task.validate().is_ok());
        assert_eq!(task.targets.len(), 1);
        assert_eq!(task.task_type.minimum_stage(), 0);
    }
}
