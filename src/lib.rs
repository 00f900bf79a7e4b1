//! # Glossa
//!
//! Adaptive language-learning engine: decides what to present next,
//! how hard it should be, when to review it, and what has become a
//! bottleneck.
//!
//! - **IRT core**: 1PL/2PL/3PL probabilities, MLE and EAP ability
//!   estimation, Fisher-information item selection
//! - **FSRS scheduling**: per-item stability/difficulty state and
//!   review intervals
//! - **Mastery stages**: 0-4 progression driven by cue-free accuracy
//!   and memory stability
//! - **Priority engine**: feature-vector scoring with an inverted-U
//!   mastery factor, urgency and bottleneck boosts
//! - **Multi-component calibration**: Q-matrix weight allocation and
//!   compensatory/conjunctive/disjunctive MIRT models
//! - **Bottleneck analysis** over the PHON -> MORPH -> LEX -> SYNT ->
//!   PRAG cascade
//! - **L1 transfer** coefficients and **PMI/NPMI/LLR** lexical
//!   statistics
//!
//! The crate is a pure, deterministic library: no I/O, no global
//! clock. Every operation that reads time takes `now` explicitly.

mod error;

pub mod algorithms;
pub mod bottleneck;
pub mod config;
pub mod engine;
pub mod linguistics;
pub mod models;
pub mod pmi;
pub mod tasks;
pub mod transfer;

// Re-exports
pub use algorithms::{
    FsrsParams, FsrsScheduler, QuadratureTable, QueueEntry, Rating, ReviewOutcome,
    SessionPicker, ThetaEstimate,
};
pub use bottleneck::{analyze_bottleneck, BottleneckReport, ComponentEvidence};
pub use config::{
    BottleneckConfig, EngineConfig, PriorityConfig, PriorityWeights, QueueConfig,
    SchedulerConfig, StageConfig, StageThreshold,
};
pub use engine::{ApplyOutcome, Engine};
pub use error::{GlossaError, Result};
pub use models::{
    CardState, CognitiveProcess, ComponentAbilities, ComponentAbility, ComponentKind,
    ComponentScores, CueLevel, FeatureVector, FsrsCard, GradedResponse, IrtParams,
    LanguageFamily, LearnableItem, LearnerLevel, LearnerProfile, MasteryRecord, Modality,
    Response, TaskFormat, TaskSpec, TaskTarget, TaskType,
};
pub use pmi::{Collocation, PmiCalculator};
pub use tasks::{CalibrationUpdate, ComponentEvaluations, ErrorKind, MirtModel, TargetEvaluation};
pub use transfer::{TransferCoefficients, TransferProfile, TransferSummary};
