//! Psychometric and scheduling algorithms
//!
//! This module provides the algorithmic layers of the engine:
//! - IRT probability models, Fisher information and theta estimation
//! - FSRS spaced repetition scheduling
//! - Mastery stage machine
//! - Effective priority scoring and queue building
//! - Next-item selection strategies

pub mod fsrs;
pub mod irt;
pub mod mastery;
pub mod priority;
pub mod quadrature;
pub mod queue;
pub mod selection;

// Re-exports
pub use fsrs::{FsrsParams, FsrsScheduler, Rating, ReviewOutcome};
pub use irt::{
    difficulty_to_priority, estimate_theta_eap, estimate_theta_mle, fisher_information,
    priority_to_difficulty, probability_1pl, probability_2pl, probability_3pl, Observation,
    ThetaEstimate, THETA_MAX, THETA_MIN,
};
pub use mastery::{next_stage, qualified_stage, recommended_cue_level};
pub use priority::{
    acquisition_cost, base_priority, combined_mastery, effective_priority, mastery_factor,
    transfer_adjustment, urgency, weights_for_level, PriorityBreakdown,
};
pub use quadrature::QuadratureTable;
pub use queue::{build_queue, compose_session, QueueEntry, SessionPicker};
pub use selection::{select_kl_information, select_max_information};
