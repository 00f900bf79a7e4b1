//! Error types for Glossa
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlossaError {
    #[error("Invalid item {id}: {reason}")]
    InvalidItem { id: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Ability estimate did not converge after {iterations} iterations")]
    MleNonconvergence { iterations: u32 },

    #[error("Empty candidate set: {0}")]
    EmptyCandidateSet(String),

    #[error("Unknown learner: {0}")]
    UnknownLearner(String),

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Implement From<String> for GlossaError
impl From<String> for GlossaError {
    fn from(s: String) -> Self {
        GlossaError::Internal(s)
    }
}

impl serde::Serialize for GlossaError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GlossaError>;
