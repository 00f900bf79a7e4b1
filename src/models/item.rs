//! Learnable item model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GlossaError, Result};

/// Linguistic component a learnable item primarily exercises.
///
/// Components form a fixed cascade from foundational to advanced:
/// phonology feeds morphology, which feeds the lexicon, and so on up
/// to pragmatics. Bottleneck analysis relies on this ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Phonological,
    Morphological,
    Lexical,
    Syntactic,
    Pragmatic,
}

/// Cascade order, earliest (most foundational) first.
pub static CASCADE: [ComponentKind; 5] = [
    ComponentKind::Phonological,
    ComponentKind::Morphological,
    ComponentKind::Lexical,
    ComponentKind::Syntactic,
    ComponentKind::Pragmatic,
];

impl ComponentKind {
    /// Position in the acquisition cascade (0 = phonology).
    pub fn cascade_position(&self) -> usize {
        CASCADE.iter().position(|c| c == self).unwrap_or(0)
    }

    /// Components downstream of this one in the cascade.
    pub fn downstream(&self) -> &'static [ComponentKind] {
        &CASCADE[self.cascade_position() + 1..]
    }

    /// Parse a component tag. Accepts the canonical names plus the
    /// aliases used by item catalogs ("g2p" for phonology, "mwe" for
    /// multi-word lexical entries).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "phon" | "phonological" | "phonology" | "g2p" => Some(Self::Phonological),
            "morph" | "morphological" | "morphology" => Some(Self::Morphological),
            "lex" | "lexical" | "lexicon" | "mwe" => Some(Self::Lexical),
            "synt" | "syntactic" | "syntax" => Some(Self::Syntactic),
            "prag" | "pragmatic" | "pragmatics" => Some(Self::Pragmatic),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Phonological => "phonological",
            Self::Morphological => "morphological",
            Self::Lexical => "lexical",
            Self::Syntactic => "syntactic",
            Self::Pragmatic => "pragmatic",
        }
    }
}

/// Item response theory parameters for a single item
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IrtParams {
    /// Discrimination (a), must be positive
    pub discrimination: f64,
    /// Difficulty (b) on the theta scale, -4.0 to 4.0
    pub difficulty: f64,
    /// Pseudo-guessing floor (c), 0.0 to 0.5; None means no guessing floor
    pub guessing: Option<f64>,
}

impl IrtParams {
    pub fn new(discrimination: f64, difficulty: f64) -> Self {
        Self {
            discrimination,
            difficulty,
            guessing: None,
        }
    }

    pub fn with_guessing(discrimination: f64, difficulty: f64, guessing: f64) -> Self {
        Self {
            discrimination,
            difficulty,
            guessing: Some(guessing),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.discrimination <= 0.0 {
            return Err(format!(
                "discrimination must be positive, got {}",
                self.discrimination
            ));
        }
        if !(-4.0..=4.0).contains(&self.difficulty) {
            return Err(format!(
                "difficulty must be in [-4, 4], got {}",
                self.difficulty
            ));
        }
        if let Some(c) = self.guessing {
            if !(0.0..=0.5).contains(&c) {
                return Err(format!("guessing must be in [0, 0.5], got {}", c));
            }
        }
        Ok(())
    }
}

/// Seven-component linguistic feature vector, all values in [0, 1]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Corpus frequency
    pub frequency: f64,
    /// Relational density (collocations, derivational family size)
    pub relational: f64,
    /// Relevance to the learner's target domains
    pub domain: f64,
    pub morphological: f64,
    pub phonological: f64,
    pub syntactic: f64,
    pub pragmatic: f64,
}

impl FeatureVector {
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (name, value) in self.entries() {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("feature '{}' must be in [0, 1], got {}", name, value));
            }
        }
        Ok(())
    }

    /// All components as (name, value) pairs, in canonical order.
    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("frequency", self.frequency),
            ("relational", self.relational),
            ("domain", self.domain),
            ("morphological", self.morphological),
            ("phonological", self.phonological),
            ("syntactic", self.syntactic),
            ("pragmatic", self.pragmatic),
        ]
    }

    /// The strongest feature and its value. Earlier entries win ties so
    /// the result is deterministic.
    pub fn dominant(&self) -> (&'static str, f64) {
        let mut best = ("frequency", self.frequency);
        for (name, value) in self.entries() {
            if value > best.1 {
                best = (name, value);
            }
        }
        best
    }
}

/// A vocabulary or grammar item in the catalog.
///
/// Items are immutable once ingested; calibration passes produce new
/// IRT parameters rather than mutating in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnableItem {
    pub id: String,
    /// Surface form presented to the learner
    pub content: String,
    pub component: ComponentKind,
    pub irt: IrtParams,
    pub features: FeatureVector,
    /// Optional domain tags (e.g. "business", "travel")
    pub domains: Vec<String>,
    /// Ids of collocationally related items
    pub collocations: Vec<String>,
    pub date_created: DateTime<Utc>,
}

impl LearnableItem {
    pub fn new(
        content: String,
        component: ComponentKind,
        irt: IrtParams,
        features: FeatureVector,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content,
            component,
            irt,
            features,
            domains: Vec::new(),
            collocations: Vec::new(),
            date_created: now,
        }
    }

    /// Validate IRT parameters and feature ranges for catalog ingestion.
    pub fn validate(&self) -> Result<()> {
        if let Err(reason) = self.irt.validate() {
            return Err(GlossaError::InvalidItem {
                id: self.id.clone(),
                reason,
            });
        }
        if let Err(reason) = self.features.validate() {
            return Err(GlossaError::InvalidItem {
                id: self.id.clone(),
                reason,
            });
        }
        Ok(())
    }
}
