//! Mastery stage machine
//!
//! Five stages from first exposure (0) to durable mastery (4), driven
//! by cue-free vs cue-assisted accuracy and FSRS stability. Stage
//! recomputation is a pure function of the mastery snapshot; actual
//! transitions are additionally gated by answer streaks so a single
//! lucky or unlucky response never moves a learner.

use crate::config::{StageConfig, StageThreshold};
use crate::models::{CueLevel, MasteryRecord};

/// Number of exposures before cue-free presentation is offered.
const MIN_EXPOSURES_FOR_NO_CUES: u32 = 5;

/// The highest stage whose entry thresholds the record currently
/// satisfies, ignoring streak gating. Idempotent on a snapshot.
pub fn qualified_stage(record: &MasteryRecord, config: &StageConfig) -> u8 {
    let mut stage = 0;
    for (index, threshold) in config.thresholds.iter().enumerate() {
        if meets(record, threshold, index) {
            stage = (index + 1) as u8;
        } else {
            break;
        }
    }
    stage
}

/// Stage 2 uses an inclusive stability bound (memories lasting a full
/// day); stages 3 and 4 require strictly more than their threshold.
fn meets(record: &MasteryRecord, threshold: &StageThreshold, index: usize) -> bool {
    if let Some(min) = threshold.cue_assisted {
        if record.cue_assisted_accuracy < min {
            return false;
        }
    }
    if let Some(min) = threshold.cue_free {
        if record.cue_free_accuracy < min {
            return false;
        }
    }
    if let Some(min) = threshold.stability {
        let ok = if index <= 1 {
            record.card.stability >= min
        } else {
            record.card.stability > min
        };
        if !ok {
            return false;
        }
    }
    if let Some(max_gap) = threshold.max_gap {
        if record.cue_assisted_accuracy - record.cue_free_accuracy >= max_gap {
            return false;
        }
    }
    true
}

/// Streak-gated stage transition: at most one stage per response, and
/// only once the matching streak requirement is met.
pub fn next_stage(record: &MasteryRecord, config: &StageConfig) -> u8 {
    let qualified = qualified_stage(record, config);
    let current = record.stage;
    if qualified > current && record.consecutive_correct >= config.advance_streak {
        current + 1
    } else if qualified < current && record.consecutive_incorrect >= config.regress_streak {
        current - 1
    } else {
        current
    }
}

/// Scaffolding level for the next presentation, from the gap between
/// cue-assisted and cue-free accuracy.
pub fn recommended_cue_level(record: &MasteryRecord) -> CueLevel {
    let gap = record.scaffolding_gap();
    if gap > 0.3 {
        CueLevel::Full
    } else if gap > 0.15 {
        CueLevel::Moderate
    } else if gap > 0.05 {
        CueLevel::Light
    } else if record.exposures >= MIN_EXPOSURES_FOR_NO_CUES {
        CueLevel::None
    } else {
        CueLevel::Light
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MasteryRecord {
        MasteryRecord::new("learner".to_string(), "item".to_string())
    }

    fn qualified(record: &MasteryRecord) -> u8 {
        qualified_stage(record, &StageConfig::default())
    }

    #[test]
    fn test_fresh_record_is_stage_zero() {
        assert_eq!(qualified(&record()), 0);
    }

    #[test]
    fn test_stage_one_needs_cued_accuracy() {
        let mut r = record();
        r.cue_assisted_accuracy = 0.55;
        assert_eq!(qualified(&r), 1);
        r.cue_assisted_accuracy = 0.4;
        assert_eq!(qualified(&r), 0);
    }

    #[test]
    fn test_stage_two_needs_stability_day() {
        let mut r = record();
        r.cue_assisted_accuracy = 0.8;
        r.cue_free_accuracy = 0.65;
        r.card.stability = 0.5;
        assert_eq!(qualified(&r), 1);
        r.card.stability = 1.0;
        assert_eq!(qualified(&r), 2);
    }

    #[test]
    fn test_stage_three_stability_is_exclusive() {
        let mut r = record();
        r.cue_assisted_accuracy = 0.8;
        r.cue_free_accuracy = 0.8;
        r.card.stability = 7.0;
        assert_eq!(qualified(&r), 2);
        r.card.stability = 7.1;
        assert_eq!(qualified(&r), 3);
    }

    #[test]
    fn test_stage_four_requires_closed_gap() {
        let mut r = record();
        r.cue_assisted_accuracy = 1.0;
        r.cue_free_accuracy = 0.9;
        r.card.stability = 45.0;
        // Accuracy and stability qualify but the scaffolding gap is 0.1
        assert_eq!(qualified(&r), 3);
        r.cue_assisted_accuracy = 0.98;
        assert_eq!(qualified(&r), 4);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut r = record();
        r.cue_assisted_accuracy = 0.8;
        r.cue_free_accuracy = 0.7;
        r.card.stability = 3.0;
        let first = qualified(&r);
        let second = qualified(&r);
        assert_eq!(first, second);
    }

    #[test]
    fn test_advance_requires_streak() {
        let config = StageConfig::default();
        let mut r = record();
        r.cue_assisted_accuracy = 0.9;
        r.consecutive_correct = 2;
        assert_eq!(next_stage(&r, &config), 0);
        r.consecutive_correct = 3;
        assert_eq!(next_stage(&r, &config), 1);
    }

    #[test]
    fn test_regress_requires_streak() {
        let config = StageConfig::default();
        let mut r = record();
        r.stage = 3;
        r.cue_assisted_accuracy = 0.8;
        r.cue_free_accuracy = 0.7;
        r.card.stability = 3.0; // only qualifies for stage 2 now
        r.consecutive_incorrect = 2;
        assert_eq!(next_stage(&r, &config), 3);
        r.consecutive_incorrect = 3;
        assert_eq!(next_stage(&r, &config), 2);
    }

    #[test]
    fn test_advance_is_single_step() {
        let config = StageConfig::default();
        let mut r = record();
        r.cue_assisted_accuracy = 1.0;
        r.cue_free_accuracy = 0.95;
        r.card.stability = 60.0;
        r.consecutive_correct = 10;
        // Qualifies for stage 4 outright but still climbs one at a time
        assert_eq!(next_stage(&r, &config), 1);
    }

    #[test]
    fn test_cue_level_from_gap() {
        let mut r = record();
        r.cue_assisted_accuracy = 0.9;
        r.cue_free_accuracy = 0.4;
        assert_eq!(recommended_cue_level(&r), CueLevel::Full);
        r.cue_free_accuracy = 0.7;
        assert_eq!(recommended_cue_level(&r), CueLevel::Moderate);
        r.cue_free_accuracy = 0.8;
        assert_eq!(recommended_cue_level(&r), CueLevel::Light);
    }

    #[test]
    fn test_no_cues_only_after_enough_exposures() {
        let mut r = record();
        r.cue_assisted_accuracy = 0.9;
        r.cue_free_accuracy = 0.88;
        r.exposures = 3;
        assert_eq!(recommended_cue_level(&r), CueLevel::Light);
        r.exposures = 6;
        assert_eq!(recommended_cue_level(&r), CueLevel::None);
    }
}
