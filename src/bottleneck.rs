//! Bottleneck analysis
//!
//! Finds the root cause of a learner's struggles by walking the fixed
//! acquisition cascade PHON -> MORPH -> LEX -> SYNT -> PRAG. A
//! component is the primary bottleneck when its own error rate is
//! high, at least one downstream component is also failing with
//! co-occurring errors in the same sessions, and nothing earlier in
//! the cascade is in the same state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BottleneckConfig;
use crate::models::item::CASCADE;
use crate::models::{ComponentKind, GradedResponse, TaskType};

/// Aggregated evidence for one component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentEvidence {
    pub component: ComponentKind,
    pub attempts: usize,
    pub failures: usize,
    /// failures / attempts
    pub error_rate: f64,
    /// Accuracy of the second half of attempts minus the first half;
    /// positive means the learner is improving
    pub trend: f64,
    /// Sessions in which this component failed together with a
    /// downstream component
    pub cooccurring_failures: usize,
    /// Task types the failures occurred under, deduplicated in
    /// first-seen order
    pub failure_patterns: Vec<TaskType>,
    /// Error rate at or above the configured threshold
    pub struggling: bool,
}

/// Result of one bottleneck analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BottleneckReport {
    /// Earliest cascade component satisfying the full bottleneck rule
    pub primary: Option<ComponentKind>,
    /// Evidence per component, in cascade order
    pub evidence: Vec<ComponentEvidence>,
    /// Grows with sample size toward 1.0
    pub confidence: f64,
    pub recommendation: Option<String>,
    pub sample_size: usize,
}

/// Analyze a window of recent responses. Pure and deterministic: the
/// same batch always yields the same report.
pub fn analyze_bottleneck(
    responses: &[GradedResponse],
    config: &BottleneckConfig,
) -> BottleneckReport {
    let sample_size = responses.len();
    let confidence =
        (sample_size as f64 / (config.min_responses as f64 * 2.0)).clamp(0.0, 1.0);

    // Failures per session, per component, for co-occurrence checks
    let mut session_failures: HashMap<&str, Vec<ComponentKind>> = HashMap::new();
    for response in responses {
        if !response.correct {
            let session = response.session_id.as_deref().unwrap_or("");
            session_failures
                .entry(session)
                .or_default()
                .push(response.component);
        }
    }

    let mut evidence = Vec::with_capacity(CASCADE.len());
    for &component in CASCADE.iter() {
        let of_component: Vec<&GradedResponse> = responses
            .iter()
            .filter(|r| r.component == component)
            .collect();
        let attempts = of_component.len();
        let failures = of_component.iter().filter(|r| !r.correct).count();
        let error_rate = if attempts > 0 {
            failures as f64 / attempts as f64
        } else {
            0.0
        };

        let half = attempts / 2;
        let trend = if half > 0 {
            let first: f64 = of_component[..half]
                .iter()
                .map(|r| if r.correct { 1.0 } else { 0.0 })
                .sum::<f64>()
                / half as f64;
            let second: f64 = of_component[half..]
                .iter()
                .map(|r| if r.correct { 1.0 } else { 0.0 })
                .sum::<f64>()
                / (attempts - half) as f64;
            second - first
        } else {
            0.0
        };

        let mut failure_patterns: Vec<TaskType> = Vec::new();
        for response in of_component.iter().filter(|r| !r.correct) {
            if !failure_patterns.contains(&response.task_type) {
                failure_patterns.push(response.task_type);
            }
        }

        let downstream = component.downstream();
        let cooccurring_failures = session_failures
            .values()
            .filter(|failed| {
                failed.contains(&component) && failed.iter().any(|f| downstream.contains(f))
            })
            .count();

        evidence.push(ComponentEvidence {
            component,
            attempts,
            failures,
            error_rate,
            trend,
            cooccurring_failures,
            failure_patterns,
            struggling: attempts > 0 && error_rate >= config.error_rate_threshold,
        });
    }

    let primary = if sample_size < config.min_responses {
        debug!(
            sample_size,
            min = config.min_responses,
            "too few responses for bottleneck detection"
        );
        None
    } else {
        find_primary(&evidence)
    };

    let recommendation = primary.map(recommendation_for);
    BottleneckReport {
        primary,
        evidence,
        confidence,
        recommendation,
        sample_size,
    }
}

/// Root-cause rule: the earliest struggling component that has a
/// struggling downstream component and co-occurring session failures.
fn find_primary(evidence: &[ComponentEvidence]) -> Option<ComponentKind> {
    for (index, candidate) in evidence.iter().enumerate() {
        if !candidate.struggling || candidate.cooccurring_failures == 0 {
            continue;
        }
        let downstream_struggling = evidence[index + 1..].iter().any(|e| e.struggling);
        if downstream_struggling {
            return Some(candidate.component);
        }
    }
    None
}

fn recommendation_for(component: ComponentKind) -> String {
    match component {
        ComponentKind::Phonological => {
            "Phonology is holding back downstream skills: add sound discrimination and \
             pronunciation drills before expanding vocabulary"
                .to_string()
        }
        ComponentKind::Morphological => {
            "Word formation is the root blocker: practice affix patterns and word families"
                .to_string()
        }
        ComponentKind::Lexical => {
            "Vocabulary gaps are limiting progress: slow new grammar and consolidate \
             high-frequency words"
                .to_string()
        }
        ComponentKind::Syntactic => {
            "Sentence structure is the bottleneck: drill word order and clause patterns in \
             isolation"
                .to_string()
        }
        ComponentKind::Pragmatic => {
            "Usage in context is lagging: practice register and politeness in realistic \
             scenarios"
                .to_string()
        }
    }
}
