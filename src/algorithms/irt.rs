//! Item response theory core
//!
//! Probability models (1PL/2PL/3PL), Fisher information, and the two
//! ability estimators: maximum likelihood via Newton-Raphson and
//! expected a posteriori via Gauss-Hermite quadrature.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithms::quadrature::QuadratureTable;
use crate::error::{GlossaError, Result};
use crate::models::IrtParams;

/// Theta values are kept inside this range everywhere in the engine.
pub const THETA_MIN: f64 = -4.0;
pub const THETA_MAX: f64 = 4.0;

const MAX_MLE_ITERATIONS: u32 = 30;
const MLE_CONVERGENCE: f64 = 1e-4;
const MAX_NEWTON_STEP: f64 = 1.0;

/// Logistic function
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// 1PL (Rasch) probability of a correct response.
pub fn probability_1pl(theta: f64, difficulty: f64) -> f64 {
    sigmoid(theta - difficulty)
}

/// 2PL probability of a correct response.
pub fn probability_2pl(theta: f64, discrimination: f64, difficulty: f64) -> f64 {
    sigmoid(discrimination * (theta - difficulty))
}

/// 3PL probability of a correct response; asymptotes at the guessing
/// floor c as theta falls.
pub fn probability_3pl(theta: f64, discrimination: f64, difficulty: f64, guessing: f64) -> f64 {
    guessing + (1.0 - guessing) * sigmoid(discrimination * (theta - difficulty))
}

/// Probability of a correct response under an item's parameter set.
pub fn probability(theta: f64, params: &IrtParams) -> f64 {
    match params.guessing {
        Some(c) if c > 0.0 => probability_3pl(theta, params.discrimination, params.difficulty, c),
        _ => probability_2pl(theta, params.discrimination, params.difficulty),
    }
}

/// Fisher information an item carries about theta:
///
///   I = a^2 * (P - c)^2 * (1 - P) / ((1 - c)^2 * P)
///
/// For c = 0 this reduces to the familiar a^2 * P * (1 - P).
pub fn fisher_information(theta: f64, params: &IrtParams) -> f64 {
    let c = params.guessing.unwrap_or(0.0);
    let p = probability(theta, params);
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }
    let a = params.discrimination;
    a * a * (p - c).powi(2) * (1.0 - p) / ((1.0 - c).powi(2) * p)
}

/// Map an internal priority in [0, 1] onto the IRT difficulty scale.
pub fn priority_to_difficulty(priority: f64) -> f64 {
    6.0 * priority.clamp(0.0, 1.0) - 3.0
}

/// Inverse of [`priority_to_difficulty`].
pub fn difficulty_to_priority(difficulty: f64) -> f64 {
    ((difficulty + 3.0) / 6.0).clamp(0.0, 1.0)
}

/// One scored observation used for ability estimation
#[derive(Debug, Clone, Copy)]
pub struct Observation {
    pub params: IrtParams,
    pub correct: bool,
}

/// An ability estimate with its uncertainty
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThetaEstimate {
    pub theta: f64,
    pub se: f64,
}

/// Maximum likelihood theta estimate via Newton-Raphson (Fisher
/// scoring).
///
/// Steps are clamped to +-1.0 on the theta scale and iteration stops
/// after 30 rounds or when the update falls below 1e-4. All-correct
/// and all-incorrect response patterns have no finite maximum, so they
/// return [`GlossaError::MleNonconvergence`]; callers fall back to EAP.
pub fn estimate_theta_mle(observations: &[Observation], start: f64) -> Result<ThetaEstimate> {
    if observations.is_empty() {
        return Err(GlossaError::EmptyCandidateSet(
            "no observations for ability estimation".to_string(),
        ));
    }
    let all_same = observations.iter().all(|o| o.correct)
        || observations.iter().all(|o| !o.correct);
    if all_same {
        return Err(GlossaError::MleNonconvergence { iterations: 0 });
    }

    let mut theta = start.clamp(THETA_MIN, THETA_MAX);
    for iteration in 0..MAX_MLE_ITERATIONS {
        let mut score = 0.0;
        let mut information = 0.0;
        for obs in observations {
            let c = obs.params.guessing.unwrap_or(0.0);
            let p = probability(theta, &obs.params).clamp(1e-9, 1.0 - 1e-9);
            let u = if obs.correct { 1.0 } else { 0.0 };
            // d lnL / d theta for the 3PL likelihood
            score += obs.params.discrimination * (u - p) * (p - c) / (p * (1.0 - c));
            information += fisher_information(theta, &obs.params);
        }
        if information <= 0.0 {
            return Err(GlossaError::MleNonconvergence { iterations: iteration });
        }
        let step = (score / information).clamp(-MAX_NEWTON_STEP, MAX_NEWTON_STEP);
        theta = (theta + step).clamp(THETA_MIN, THETA_MAX);
        if step.abs() < MLE_CONVERGENCE {
            let se = 1.0 / total_information(theta, observations).sqrt();
            return Ok(ThetaEstimate { theta, se });
        }
    }
    debug!(theta, "MLE hit the iteration cap without converging");
    Err(GlossaError::MleNonconvergence {
        iterations: MAX_MLE_ITERATIONS,
    })
}

fn total_information(theta: f64, observations: &[Observation]) -> f64 {
    observations
        .iter()
        .map(|o| fisher_information(theta, &o.params))
        .sum::<f64>()
        .max(1e-9)
}

/// Expected a posteriori theta estimate under a Normal(mean, sd) prior,
/// integrated with the given Gauss-Hermite rule.
///
/// Unlike MLE this is total: extreme response patterns pull the
/// posterior toward the prior rather than diverging, and a likelihood
/// that underflows to zero everywhere returns the prior itself.
pub fn estimate_theta_eap(
    observations: &[Observation],
    prior_mean: f64,
    prior_sd: f64,
    table: &QuadratureTable,
) -> ThetaEstimate {
    let scale = std::f64::consts::SQRT_2 * prior_sd;
    let mut normalizer = 0.0;
    let mut mean_acc = 0.0;

    // Posterior weights at each transformed node
    let mut posterior = Vec::with_capacity(table.len());
    for (&x, &w) in table.nodes.iter().zip(table.weights.iter()) {
        let theta = prior_mean + scale * x;
        let mut likelihood = 1.0;
        for obs in observations {
            let p = probability(theta, &obs.params).clamp(1e-12, 1.0 - 1e-12);
            likelihood *= if obs.correct { p } else { 1.0 - p };
        }
        let weight = w * likelihood;
        posterior.push((theta, weight));
        normalizer += weight;
        mean_acc += weight * theta;
    }

    if normalizer <= f64::MIN_POSITIVE {
        debug!("likelihood underflowed everywhere; returning the prior");
        return ThetaEstimate {
            theta: prior_mean.clamp(THETA_MIN, THETA_MAX),
            se: prior_sd,
        };
    }

    let mean = mean_acc / normalizer;
    let variance = posterior
        .iter()
        .map(|(theta, weight)| weight * (theta - mean).powi(2))
        .sum::<f64>()
        / normalizer;

    ThetaEstimate {
        theta: mean.clamp(THETA_MIN, THETA_MAX),
        se: variance.sqrt().max(1e-6),
    }
}
