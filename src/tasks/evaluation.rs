//! Response evaluation
//!
//! Grades free-text answers against expected forms: normalized exact
//! match earns full credit, near misses earn edit-distance partial
//! credit, and wrong answers are classified into a closed set of error
//! kinds for the bottleneck analyzer.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::linguistics::morphology::shares_stem;
use crate::linguistics::pragmatics::{detect_register, register_match_score};
use crate::models::{ComponentScores, TaskSpec, TaskType};

/// Credit at or above this threshold counts as correct.
pub const CORRECT_THRESHOLD: f64 = 0.9;

/// Kind of production error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Part of the expected form is missing
    Omission,
    /// A different form of similar shape was produced
    Substitution,
    /// Right stem, wrong affixation
    Form,
    Other,
}

/// NFC-normalize, casefold and collapse whitespace.
pub fn normalize_answer(text: &str) -> String {
    text.nfc()
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Levenshtein distance over characters.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Partial credit in [0, 1] for an answer against the expected form.
pub fn partial_credit(expected: &str, answer: &str) -> f64 {
    let expected = normalize_answer(expected);
    let answer = normalize_answer(answer);
    if expected == answer {
        return 1.0;
    }
    let max_len = expected.chars().count().max(answer.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = edit_distance(&expected, &answer);
    (1.0 - distance as f64 / max_len as f64).max(0.0)
}

/// Classify what went wrong with an incorrect answer.
pub fn classify_error(expected: &str, answer: &str) -> ErrorKind {
    let expected_norm = normalize_answer(expected);
    let answer_norm = normalize_answer(answer);
    if answer_norm.is_empty() {
        return ErrorKind::Omission;
    }
    if expected_norm.contains(&answer_norm) && answer_norm.len() < expected_norm.len() {
        return ErrorKind::Omission;
    }
    if shares_stem(&expected_norm, &answer_norm) {
        return ErrorKind::Form;
    }
    let distance = edit_distance(&expected_norm, &answer_norm);
    if distance <= 2 || expected_norm.chars().count() == answer_norm.chars().count() {
        return ErrorKind::Substitution;
    }
    ErrorKind::Other
}

/// Evaluation of one task target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetEvaluation {
    pub item_id: String,
    pub credit: f64,
    pub correct: bool,
    pub error: Option<ErrorKind>,
}

/// Evaluation of a whole task response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentEvaluations {
    pub targets: Vec<TargetEvaluation>,
    /// Weight-averaged credit per involved component
    pub scores: ComponentScores,
    /// Weight-averaged credit across all targets
    pub overall_credit: f64,
    pub correct: bool,
}

/// Grade a learner's answers against a task's targets, by position.
/// Missing answers grade as empty strings (omissions).
pub fn evaluate_task(task: &TaskSpec, answers: &[String]) -> ComponentEvaluations {
    let empty = String::new();
    let mut targets = Vec::with_capacity(task.targets.len());
    let mut overall_credit = 0.0;

    // Per-component weighted accumulation
    let mut component_weight: Vec<(crate::models::ComponentKind, f64, f64)> = Vec::new();

    for (index, target) in task.targets.iter().enumerate() {
        let answer = answers.get(index).unwrap_or(&empty);
        let mut credit = partial_credit(&target.expected, answer);
        if task.task_type == TaskType::RegisterShift && !normalize_answer(answer).is_empty() {
            // Register tasks grade tone as much as wording
            let register = register_match_score(
                detect_register(&target.expected),
                detect_register(answer),
            );
            credit = 0.5 * credit + 0.5 * register;
        }
        let correct = credit >= CORRECT_THRESHOLD;
        let error = if correct {
            None
        } else {
            Some(classify_error(&target.expected, answer))
        };
        overall_credit += target.weight * credit;

        match component_weight
            .iter_mut()
            .find(|(c, _, _)| *c == target.component)
        {
            Some((_, weight_sum, credit_sum)) => {
                *weight_sum += target.weight;
                *credit_sum += target.weight * credit;
            }
            None => component_weight.push((target.component, target.weight, target.weight * credit)),
        }

        targets.push(TargetEvaluation {
            item_id: target.item_id.clone(),
            credit,
            correct,
            error,
        });
    }

    let mut scores = ComponentScores::default();
    for (component, weight_sum, credit_sum) in component_weight {
        if weight_sum > 0.0 {
            scores.set(component, credit_sum / weight_sum);
        }
    }

    ComponentEvaluations {
        targets,
        scores,
        overall_credit,
        correct: overall_credit >= CORRECT_THRESHOLD,
    }
}
