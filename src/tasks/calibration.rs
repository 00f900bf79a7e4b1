//! Multi-component calibration
//!
//! When one task exercises several components at once, the evidence is
//! split by Q-matrix weights, success probability follows a
//! compensatory, conjunctive or disjunctive MIRT model, and every
//! involved component theta receives a bounded update.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithms::irt::{probability_2pl, THETA_MAX, THETA_MIN};
use crate::models::{CognitiveProcess, ComponentKind, LearnerProfile, TaskType};
use crate::tasks::qmatrix::baseline_weights;

/// Step size for per-response theta updates.
pub const LEARNING_RATE: f64 = 0.4;
/// Hard bound on any single component update.
pub const MAX_THETA_DELTA: f64 = 0.5;
/// Floor on recall probability in the conjunctive model.
const SLIP: f64 = 0.05;
/// Guessing floor in the disjunctive model.
const GUESS: f64 = 0.15;
/// Standard error floor once many responses have accumulated.
const MIN_SE: f64 = 0.25;
const INITIAL_SE: f64 = 1.5;

/// How multiple component abilities combine into task success
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MirtModel {
    /// Strong components offset weak ones (default)
    Compensatory,
    /// Every component must succeed
    Conjunctive,
    /// Any component can carry the task
    Disjunctive,
}

impl MirtModel {
    /// Model used for a task type: production-like tasks demand all
    /// components, pure recognition can succeed through any route.
    pub fn for_task_type(task_type: TaskType) -> Self {
        match task_type {
            TaskType::Production
            | TaskType::SentenceWriting
            | TaskType::Translation
            | TaskType::Timed => Self::Conjunctive,
            TaskType::Recognition | TaskType::DefinitionMatch => Self::Disjunctive,
            _ => Self::Compensatory,
        }
    }
}

/// Distribute the Q-matrix row of a task type over its actual targets.
///
/// Raw shares are the row entry for each target's component times a
/// primary factor (1.0 primary, 0.5 secondary), normalized to sum to
/// 1. If the primary targets end up below half the total weight they
/// are rescaled up to exactly half.
pub fn allocate_weights(task_type: TaskType, targets: &[(ComponentKind, bool)]) -> Vec<f64> {
    if targets.is_empty() {
        return Vec::new();
    }
    let row = baseline_weights(task_type);
    let mut weights: Vec<f64> = targets
        .iter()
        .map(|(component, primary)| {
            row.get(*component) * if *primary { 1.0 } else { 0.5 }
        })
        .collect();

    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        // The row carries no mass for any target component
        let uniform = 1.0 / targets.len() as f64;
        return vec![uniform; targets.len()];
    }
    for w in weights.iter_mut() {
        *w /= total;
    }

    let primary_total: f64 = weights
        .iter()
        .zip(targets.iter())
        .filter(|(_, (_, primary))| *primary)
        .map(|(w, _)| *w)
        .sum();
    let has_secondary = targets.iter().any(|(_, primary)| !primary);
    if primary_total > 0.0 && primary_total < 0.5 && has_secondary {
        let primary_scale = 0.5 / primary_total;
        let secondary_scale = 0.5 / (1.0 - primary_total);
        for (w, (_, primary)) in weights.iter_mut().zip(targets.iter()) {
            *w *= if *primary { primary_scale } else { secondary_scale };
        }
    }
    weights
}

/// Composite task difficulty from weighted target difficulties and the
/// cognitive-process multiplier, clamped to the working theta range.
pub fn composite_difficulty(weighted: &[(f64, f64)], process: CognitiveProcess) -> f64 {
    let sum: f64 = weighted.iter().map(|(w, b)| w * b).sum();
    (sum * process.difficulty_multiplier()).clamp(-3.0, 3.0)
}

/// One component's contribution to a multi-component task
#[derive(Debug, Clone, Copy)]
pub struct ComponentTerm {
    pub component: ComponentKind,
    pub weight: f64,
    pub discrimination: f64,
    pub difficulty: f64,
    pub theta: f64,
}

/// Predicted success probability for a multi-component task.
pub fn success_probability(model: MirtModel, terms: &[ComponentTerm]) -> f64 {
    if terms.is_empty() {
        return 0.5;
    }
    match model {
        MirtModel::Compensatory => {
            let logit: f64 = terms
                .iter()
                .map(|t| t.weight * t.discrimination * (t.theta - t.difficulty))
                .sum();
            1.0 / (1.0 + (-logit).exp())
        }
        MirtModel::Conjunctive => {
            let product: f64 = terms
                .iter()
                .map(|t| probability_2pl(t.theta, t.discrimination, t.difficulty))
                .product();
            SLIP + (1.0 - SLIP) * product
        }
        MirtModel::Disjunctive => {
            let all_fail: f64 = terms
                .iter()
                .map(|t| 1.0 - probability_2pl(t.theta, t.discrimination, t.difficulty))
                .product();
            GUESS + (1.0 - SLIP - GUESS) * (1.0 - all_fail)
        }
    }
}

/// Updates shrink quadratically toward the edges of the theta scale.
fn boundary_decay(theta: f64) -> f64 {
    1.0 - (theta.abs() / 4.0).powi(2)
}

/// One graded target feeding a calibration pass
#[derive(Debug, Clone, Copy)]
pub struct CalibrationTarget {
    pub component: ComponentKind,
    pub weight: f64,
    pub discrimination: f64,
    pub difficulty: f64,
    /// Observed partial credit in [0, 1]
    pub credit: f64,
}

/// Result of one calibration pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationUpdate {
    /// Applied delta per component, in cascade order
    pub component_deltas: Vec<(ComponentKind, f64)>,
    pub global_delta: f64,
}

/// Update the profile's component thetas from one graded response.
///
/// Each involved component moves by
/// `learning_rate * (observed - expected) * a * weight * boundary_decay`,
/// clamped to +-0.5; the global theta moves by the weight-averaged
/// component delta.
pub fn update_abilities(
    profile: &mut LearnerProfile,
    targets: &[CalibrationTarget],
) -> CalibrationUpdate {
    // Accumulate per component so several targets of the same
    // component produce one bounded update
    let mut accumulated: Vec<(ComponentKind, f64, f64)> = Vec::new();
    for target in targets {
        let ability = profile.abilities.get(target.component);
        let expected = probability_2pl(ability.theta, target.discrimination, target.difficulty);
        let delta = LEARNING_RATE
            * (target.credit - expected)
            * target.discrimination
            * target.weight
            * boundary_decay(ability.theta);
        match accumulated
            .iter_mut()
            .find(|(c, _, _)| *c == target.component)
        {
            Some((_, acc_delta, acc_weight)) => {
                *acc_delta += delta;
                *acc_weight += target.weight;
            }
            None => accumulated.push((target.component, delta, target.weight)),
        }
    }

    let mut component_deltas = Vec::with_capacity(accumulated.len());
    let mut weighted_delta = 0.0;
    let mut weight_total = 0.0;
    for (component, delta, weight) in accumulated {
        let delta = delta.clamp(-MAX_THETA_DELTA, MAX_THETA_DELTA);
        let ability = profile.abilities.get_mut(component);
        ability.theta = (ability.theta + delta).clamp(THETA_MIN, THETA_MAX);
        ability.responses += 1;
        ability.se = (INITIAL_SE / (1.0 + ability.responses as f64 / 4.0).sqrt()).max(MIN_SE);
        component_deltas.push((component, delta));
        weighted_delta += weight * delta;
        weight_total += weight;
    }

    let global_delta = if weight_total > 0.0 {
        weighted_delta / weight_total
    } else {
        0.0
    };
    profile.theta_global = (profile.theta_global + global_delta).clamp(THETA_MIN, THETA_MAX);
    debug!(
        global_delta,
        theta_global = profile.theta_global,
        "calibration pass applied"
    );

    CalibrationUpdate {
        component_deltas,
        global_delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocated_weights_sum_to_one() {
        let targets = vec![
            (ComponentKind::Lexical, true),
            (ComponentKind::Syntactic, false),
            (ComponentKind::Morphological, false),
        ];
        let weights = allocate_weights(TaskType::FillBlank, &targets);
        let total: f64 = weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_primary_holds_half_weight() {
        // Lexical is weak in the error-correction row, so the primary
        // share must be rescaled up to half
        let targets = vec![
            (ComponentKind::Lexical, true),
            (ComponentKind::Syntactic, false),
            (ComponentKind::Morphological, false),
        ];
        let weights = allocate_weights(TaskType::ErrorCorrection, &targets);
        assert!(weights[0] >= 0.5 - 1e-9);
        let total: f64 = weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_mass_row_falls_back_to_uniform() {
        // RecallCued has no syntactic or pragmatic mass
        let targets = vec![
            (ComponentKind::Syntactic, true),
            (ComponentKind::Pragmatic, false),
        ];
        let weights = allocate_weights(TaskType::RecallCued, &targets);
        assert_eq!(weights, vec![0.5, 0.5]);
    }

    #[test]
    fn test_composite_difficulty_applies_multiplier() {
        let weighted = vec![(0.5, 1.0), (0.5, 2.0)];
        let recall = composite_difficulty(&weighted, CognitiveProcess::Recall);
        let synthesis = composite_difficulty(&weighted, CognitiveProcess::Synthesis);
        assert!((recall - 1.5).abs() < 1e-9);
        assert!((synthesis - 2.1).abs() < 1e-9);
    }

    #[test]
    fn test_composite_difficulty_clamped() {
        let weighted = vec![(1.0, 3.0)];
        assert_eq!(
            composite_difficulty(&weighted, CognitiveProcess::Synthesis),
            3.0
        );
    }

    fn term(component: ComponentKind, theta: f64) -> ComponentTerm {
        ComponentTerm {
            component,
            weight: 0.5,
            discrimination: 1.0,
            difficulty: 0.0,
            theta,
        }
    }

    #[test]
    fn test_compensatory_offsets_weak_component() {
        let balanced = vec![
            term(ComponentKind::Lexical, 2.0),
            term(ComponentKind::Syntactic, -2.0),
        ];
        let p = success_probability(MirtModel::Compensatory, &balanced);
        assert!((p - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_conjunctive_punishes_weak_component() {
        let terms = vec![
            term(ComponentKind::Lexical, 2.0),
            term(ComponentKind::Syntactic, -2.0),
        ];
        let conjunctive = success_probability(MirtModel::Conjunctive, &terms);
        let compensatory = success_probability(MirtModel::Compensatory, &terms);
        assert!(conjunctive < compensatory);
        assert!(conjunctive >= SLIP);
    }

    #[test]
    fn test_disjunctive_rewards_strong_component() {
        let terms = vec![
            term(ComponentKind::Lexical, 2.0),
            term(ComponentKind::Syntactic, -2.0),
        ];
        let disjunctive = success_probability(MirtModel::Disjunctive, &terms);
        assert!(disjunctive > 0.5);
        assert!(disjunctive <= 1.0 - SLIP);
    }

    #[test]
    fn test_model_assignment() {
        assert_eq!(
            MirtModel::for_task_type(TaskType::Production),
            MirtModel::Conjunctive
        );
        assert_eq!(
            MirtModel::for_task_type(TaskType::Recognition),
            MirtModel::Disjunctive
        );
        assert_eq!(
            MirtModel::for_task_type(TaskType::Collocation),
            MirtModel::Compensatory
        );
    }

    fn calibration_target(component: ComponentKind, credit: f64) -> CalibrationTarget {
        CalibrationTarget {
            component,
            weight: 1.0,
            discrimination: 1.0,
            difficulty: 0.0,
            credit,
        }
    }

    #[test]
    fn test_correct_response_raises_theta() {
        let mut profile = LearnerProfile::new(None, None);
        let update = update_abilities(
            &mut profile,
            &[calibration_target(ComponentKind::Lexical, 1.0)],
        );
        assert!(update.global_delta > 0.0);
        assert!(update.global_delta <= MAX_THETA_DELTA);
        assert!(profile.abilities.lexical.theta > 0.0);
        assert_eq!(profile.abilities.lexical.responses, 1);
    }

    #[test]
    fn test_incorrect_response_lowers_theta() {
        let mut profile = LearnerProfile::new(None, None);
        let update = update_abilities(
            &mut profile,
            &[calibration_target(ComponentKind::Syntactic, 0.0)],
        );
        assert!(update.global_delta < 0.0);
        assert!(profile.abilities.syntactic.theta < 0.0);
    }

    #[test]
    fn test_updates_shrink_near_scale_edge() {
        let mut centered = LearnerProfile::new(None, None);
        let mut extreme = LearnerProfile::new(None, None);
        extreme.abilities.lexical.theta = 3.8;
        let center_update = update_abilities(
            &mut centered,
            &[calibration_target(ComponentKind::Lexical, 0.0)],
        );
        let edge_update = update_abilities(
            &mut extreme,
            &[calibration_target(ComponentKind::Lexical, 0.0)],
        );
        // Same miss, but the near-boundary profile moves far less per
        // unit of surprise; boundary decay at 3.8 is under 0.1
        let center_surprise = center_update.global_delta.abs() / 0.5;
        let edge_surprise = edge_update.global_delta.abs() / 0.98;
        assert!(edge_surprise < center_surprise);
    }

    #[test]
    fn test_se_shrinks_with_responses() {
        let mut profile = LearnerProfile::new(None, None);
        let initial_se = profile.abilities.lexical.se;
        for _ in 0..10 {
            update_abilities(
                &mut profile,
                &[calibration_target(ComponentKind::Lexical, 1.0)],
            );
        }
        assert!(profile.abilities.lexical.se < initial_se);
        assert!(profile.abilities.lexical.se >= MIN_SE);
    }

    #[test]
    fn test_theta_stays_clamped() {
        let mut profile = LearnerProfile::new(None, None);
        for _ in 0..100 {
            update_abilities(
                &mut profile,
                &[calibration_target(ComponentKind::Lexical, 1.0)],
            );
        }
        assert!(profile.abilities.lexical.theta <= THETA_MAX);
        assert!(profile.theta_global <= THETA_MAX);
    }
}
