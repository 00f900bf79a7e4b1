//! Data models for Glossa

pub mod item;
pub mod mastery;
pub mod profile;
pub mod response;
pub mod task;

pub use item::{ComponentKind, FeatureVector, IrtParams, LearnableItem};
pub use mastery::{CardState, FsrsCard, MasteryRecord};
pub use profile::{ComponentAbilities, ComponentAbility, LanguageFamily, LearnerLevel, LearnerProfile};
pub use response::{ComponentScores, CueLevel, GradedResponse, Response};
pub use task::{CognitiveProcess, Modality, TaskFormat, TaskSpec, TaskTarget, TaskType};
