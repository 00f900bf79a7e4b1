//! Effective priority scoring
//!
//! Combines the linguistic feature vector, an inverted-U mastery
//! factor, L1 transfer adjustment, review urgency and the bottleneck
//! boost into a single score in [0, 1]:
//!
//!   S_eff = clamp(S_base * g(m) * (1 + T) + U + B, 0, 1)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{PriorityConfig, PriorityWeights};
use crate::models::{
    ComponentKind, FeatureVector, LearnableItem, LearnerLevel, MasteryRecord,
};

/// Priority weights tuned per proficiency band. Each variant keeps the
/// 0.72 total so urgency and bottleneck boosts retain their headroom.
pub fn weights_for_level(base: &PriorityWeights, level: LearnerLevel) -> PriorityWeights {
    match level {
        // Beginners live off frequent, pronounceable vocabulary
        LearnerLevel::Beginner => PriorityWeights {
            frequency: 0.24,
            relational: 0.10,
            domain: 0.10,
            morphological: 0.08,
            phonological: 0.12,
            syntactic: 0.05,
            pragmatic: 0.03,
        },
        LearnerLevel::Intermediate => *base,
        // Advanced learners shift toward domain fit and pragmatics
        LearnerLevel::Advanced => PriorityWeights {
            frequency: 0.10,
            relational: 0.14,
            domain: 0.16,
            morphological: 0.08,
            phonological: 0.05,
            syntactic: 0.09,
            pragmatic: 0.10,
        },
    }
}

/// Weighted linear combination of the seven feature components.
pub fn base_priority(features: &FeatureVector, weights: &PriorityWeights) -> f64 {
    weights.frequency * features.frequency
        + weights.relational * features.relational
        + weights.domain * features.domain
        + weights.morphological * features.morphological
        + weights.phonological * features.phonological
        + weights.syntactic * features.syntactic
        + weights.pragmatic * features.pragmatic
}

/// Combined mastery position in [0, 1]: average of stage progress and
/// cue-free accuracy.
pub fn combined_mastery(record: &MasteryRecord) -> f64 {
    (record.stage as f64 / 4.0 + record.cue_free_accuracy) / 2.0
}

/// Inverted-U mastery factor. Items in the productive middle band
/// (peak at m = 0.45) earn the most study time; untouched and
/// already-mastered items both fall away.
pub fn mastery_factor(m: f64) -> f64 {
    if m < 0.2 {
        0.5
    } else if m <= 0.45 {
        // Rising limb: 0.5 at 0.2 up to 1.0 at 0.45
        0.5 + (m - 0.2) / 0.25 * 0.5
    } else if m <= 0.7 {
        // Falling limb: 1.0 at 0.45 down to 0.8 at 0.7
        1.0 - (m - 0.45) / 0.25 * 0.2
    } else if m <= 0.9 {
        // Steeper descent: 0.8 at 0.7 down to 0.3 at 0.9
        0.8 - (m - 0.7) / 0.2 * 0.5
    } else {
        0.3
    }
}

/// Transfer adjustment: positive transfer (gain above 0.5) lowers
/// priority, interference raises it.
pub fn transfer_adjustment(transfer_gain: f64) -> f64 {
    -(transfer_gain - 0.5) * 0.25
}

/// Raw urgency from the review schedule, clamped to [0, 3]. New items
/// rate 1.5 so they outrank not-yet-due reviews but stay behind
/// heavily overdue ones.
pub fn urgency(record: Option<&MasteryRecord>, now: DateTime<Utc>) -> f64 {
    let record = match record {
        Some(r) => r,
        None => return 1.5,
    };
    let next_review = match record.next_review {
        Some(due) => due,
        None => return 1.5,
    };
    if next_review > now {
        return 0.0;
    }
    let days_overdue = (now - next_review).num_days();
    if days_overdue == 0 {
        1.0
    } else {
        (1.0 + days_overdue as f64 / 7.0).min(3.0)
    }
}

/// Full breakdown of one item's effective priority
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub base: f64,
    pub mastery_factor: f64,
    pub transfer_adjustment: f64,
    /// Raw urgency in [0, 3], before the urgency weight is applied
    pub urgency: f64,
    pub bottleneck_boost: f64,
    /// Final effective priority in [0, 1]
    pub score: f64,
}

/// Compute the effective priority of an item for a learner.
///
/// `transfer_gain` is the learner's expected transfer for the item's
/// component (0.5 = neutral when the L1 is unknown); `bottleneck` is
/// the currently flagged cascade component, if any.
pub fn effective_priority(
    item: &LearnableItem,
    record: Option<&MasteryRecord>,
    level: LearnerLevel,
    transfer_gain: f64,
    bottleneck: Option<ComponentKind>,
    now: DateTime<Utc>,
    config: &PriorityConfig,
) -> PriorityBreakdown {
    let weights = weights_for_level(&config.weights, level);
    let base = base_priority(&item.features, &weights);

    let (g, gap) = match record {
        Some(r) => (mastery_factor(combined_mastery(r)), r.scaffolding_gap()),
        None => (mastery_factor(0.0), 0.0),
    };
    let g = g * (1.0 + gap * 0.5);

    let t = transfer_adjustment(transfer_gain);
    let u = urgency(record, now);
    let b = if bottleneck == Some(item.component) {
        config.bottleneck_boost
    } else {
        0.0
    };

    let score = (base * g * (1.0 + t) + u * config.urgency_weight + b).clamp(0.0, 1.0);
    PriorityBreakdown {
        base,
        mastery_factor: g,
        transfer_adjustment: t,
        urgency: u,
        bottleneck_boost: b,
        score,
    }
}

/// Acquisition cost estimate used for bandwidth planning: harder and
/// less transferable items cost more, items far above the learner's
/// ability add exposure need.
pub fn acquisition_cost(item: &LearnableItem, theta: f64, transfer_gain: f64) -> f64 {
    let base_difficulty = (item.irt.difficulty + 3.0) / 6.0;
    let exposure_need = (item.irt.difficulty - theta).max(0.0) / 4.0;
    (base_difficulty - transfer_gain + exposure_need).max(0.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn item_with_features(features: FeatureVector) -> LearnableItem {
        LearnableItem::new(
            "word".to_string(),
            ComponentKind::Lexical,
            crate::models::IrtParams::new(1.0, 0.0),
            features,
            now(),
        )
    }

    fn due_record(days_overdue: i64) -> MasteryRecord {
        let mut r = MasteryRecord::new("l".to_string(), "i".to_string());
        r.card.last_review = Some(now() - Duration::days(days_overdue + 10));
        r.card.reps = 1;
        r.next_review = Some(now() - Duration::days(days_overdue));
        r
    }

    #[test]
    fn test_mastery_factor_shape() {
        assert_eq!(mastery_factor(0.1), 0.5);
        assert!((mastery_factor(0.45) - 1.0).abs() < 1e-12);
        assert!((mastery_factor(0.7) - 0.8).abs() < 1e-12);
        assert!((mastery_factor(0.9) - 0.3).abs() < 1e-12);
        assert_eq!(mastery_factor(0.95), 0.3);
    }

    #[test]
    fn test_mastery_factor_peaks_at_midpoint() {
        let peak = mastery_factor(0.45);
        for m in [0.0, 0.2, 0.3, 0.43, 0.47, 0.6, 0.8, 1.0] {
            assert!(mastery_factor(m) <= peak);
        }
    }

    #[test]
    fn test_base_priority_tracks_frequency_weight() {
        let weights = PriorityWeights::default();
        let mut high = FeatureVector::default();
        high.frequency = 0.9;
        let mut low = FeatureVector::default();
        low.frequency = 0.1;
        assert!(base_priority(&high, &weights) > base_priority(&low, &weights));
    }

    #[test]
    fn test_level_weights_keep_total() {
        let base = PriorityWeights::default();
        for level in [LearnerLevel::Beginner, LearnerLevel::Intermediate, LearnerLevel::Advanced] {
            let w = weights_for_level(&base, level);
            let sum = w.frequency + w.relational + w.domain + w.morphological
                + w.phonological + w.syntactic + w.pragmatic;
            assert!((sum - 0.72).abs() < 1e-9, "{:?}: {}", level, sum);
        }
    }

    #[test]
    fn test_urgency_tiers() {
        assert_eq!(urgency(None, now()), 1.5);
        let fresh = MasteryRecord::new("l".to_string(), "i".to_string());
        assert_eq!(urgency(Some(&fresh), now()), 1.5);
        let mut future = due_record(0);
        future.next_review = Some(now() + Duration::days(3));
        assert_eq!(urgency(Some(&future), now()), 0.0);
        assert_eq!(urgency(Some(&due_record(0)), now()), 1.0);
        let overdue = urgency(Some(&due_record(14)), now());
        assert!((overdue - 3.0).abs() < 1e-12);
        let week = urgency(Some(&due_record(7)), now());
        assert!((week - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_transfer_direction() {
        // Positive transfer lowers priority, interference raises it
        assert!(transfer_adjustment(0.9) < 0.0);
        assert!(transfer_adjustment(0.1) > 0.0);
        assert_eq!(transfer_adjustment(0.5), 0.0);
    }

    #[test]
    fn test_effective_priority_clamped() {
        let mut features = FeatureVector::default();
        features.frequency = 1.0;
        features.relational = 1.0;
        features.domain = 1.0;
        let item = item_with_features(features);
        let breakdown = effective_priority(
            &item,
            None,
            LearnerLevel::Intermediate,
            0.0,
            Some(ComponentKind::Lexical),
            now(),
            &PriorityConfig::default(),
        );
        assert!(breakdown.score >= 0.0 && breakdown.score <= 1.0);
    }

    #[test]
    fn test_priority_monotone_in_frequency() {
        let mut high = FeatureVector::default();
        high.frequency = 0.9;
        let mut low = FeatureVector::default();
        low.frequency = 0.1;
        let config = PriorityConfig::default();
        let a = effective_priority(
            &item_with_features(high),
            None,
            LearnerLevel::Intermediate,
            0.5,
            None,
            now(),
            &config,
        );
        let b = effective_priority(
            &item_with_features(low),
            None,
            LearnerLevel::Intermediate,
            0.5,
            None,
            now(),
            &config,
        );
        assert!(a.score > b.score);
    }

    #[test]
    fn test_bottleneck_boost_applies_to_matching_component() {
        let item = item_with_features(FeatureVector::default());
        let config = PriorityConfig::default();
        let boosted = effective_priority(
            &item,
            None,
            LearnerLevel::Intermediate,
            0.5,
            Some(ComponentKind::Lexical),
            now(),
            &config,
        );
        let plain = effective_priority(
            &item,
            None,
            LearnerLevel::Intermediate,
            0.5,
            Some(ComponentKind::Syntactic),
            now(),
            &config,
        );
        assert!((boosted.score - plain.score - config.bottleneck_boost).abs() < 1e-9);
    }

    #[test]
    fn test_acquisition_cost_floor() {
        let item = item_with_features(FeatureVector::default());
        // Easy item, strong transfer: cost bottoms out at the floor
        assert_eq!(acquisition_cost(&item, 3.0, 1.0), 0.1);
    }

    #[test]
    fn test_acquisition_cost_grows_above_ability() {
        let mut hard = item_with_features(FeatureVector::default());
        hard.irt.difficulty = 2.0;
        let mut easy = item_with_features(FeatureVector::default());
        easy.irt.difficulty = -1.0;
        assert!(acquisition_cost(&hard, 0.0, 0.5) > acquisition_cost(&easy, 0.0, 0.5));
    }
}
