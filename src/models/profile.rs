//! Learner profile model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PriorityWeights;
use crate::models::item::ComponentKind;

/// Language family of a learner's native language, used by the
/// transfer model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageFamily {
    Germanic,
    Romance,
    Slavic,
    SinoTibetan,
    Japonic,
    Koreanic,
    Semitic,
    Other,
}

impl LanguageFamily {
    /// Classify a BCP-47-ish language tag into a family. Unknown tags
    /// map to `Other`.
    pub fn from_language_tag(tag: &str) -> Self {
        let code = tag
            .split(['-', '_'])
            .next()
            .unwrap_or(tag)
            .to_ascii_lowercase();
        match code.as_str() {
            "en" | "de" | "nl" | "sv" | "no" | "da" | "is" | "af" => Self::Germanic,
            "es" | "fr" | "it" | "pt" | "ro" | "ca" => Self::Romance,
            "ru" | "pl" | "cs" | "sk" | "uk" | "bg" | "sr" | "hr" => Self::Slavic,
            "zh" | "yue" | "bo" | "my" => Self::SinoTibetan,
            "ja" => Self::Japonic,
            "ko" => Self::Koreanic,
            "ar" | "he" | "am" | "mt" => Self::Semitic,
            _ => Self::Other,
        }
    }
}

/// Coarse proficiency band inferred from global theta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LearnerLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// Ability estimate for one component
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ComponentAbility {
    /// Latent ability on the logit scale, clamped to [-4, 4]
    pub theta: f64,
    /// Standard error of the estimate, strictly positive
    pub se: f64,
    /// Responses observed for this component
    pub responses: u32,
}

impl Default for ComponentAbility {
    fn default() -> Self {
        Self {
            theta: 0.0,
            se: 1.5,
            responses: 0,
        }
    }
}

/// Per-component ability estimates as a fixed record, one field per
/// linguistic component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentAbilities {
    pub phonological: ComponentAbility,
    pub morphological: ComponentAbility,
    pub lexical: ComponentAbility,
    pub syntactic: ComponentAbility,
    pub pragmatic: ComponentAbility,
}

impl ComponentAbilities {
    pub fn get(&self, component: ComponentKind) -> &ComponentAbility {
        match component {
            ComponentKind::Phonological => &self.phonological,
            ComponentKind::Morphological => &self.morphological,
            ComponentKind::Lexical => &self.lexical,
            ComponentKind::Syntactic => &self.syntactic,
            ComponentKind::Pragmatic => &self.pragmatic,
        }
    }

    pub fn get_mut(&mut self, component: ComponentKind) -> &mut ComponentAbility {
        match component {
            ComponentKind::Phonological => &mut self.phonological,
            ComponentKind::Morphological => &mut self.morphological,
            ComponentKind::Lexical => &mut self.lexical,
            ComponentKind::Syntactic => &mut self.syntactic,
            ComponentKind::Pragmatic => &mut self.pragmatic,
        }
    }
}

/// Learner proficiency profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub learner_id: String,
    /// Global ability across components
    pub theta_global: f64,
    pub abilities: ComponentAbilities,
    /// Native language family, if known
    pub l1: Option<LanguageFamily>,
    pub priority_weights: PriorityWeights,
}

impl LearnerProfile {
    pub fn new(learner_id: Option<String>, l1: Option<LanguageFamily>) -> Self {
        Self {
            learner_id: learner_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            theta_global: 0.0,
            abilities: ComponentAbilities::default(),
            l1,
            priority_weights: PriorityWeights::default(),
        }
    }

    /// Proficiency band with thresholds at theta = -1 and +1.
    pub fn level(&self) -> LearnerLevel {
        if self.theta_global < -1.0 {
            LearnerLevel::Beginner
        } else if self.theta_global > 1.0 {
            LearnerLevel::Advanced
        } else {
            LearnerLevel::Intermediate
        }
    }
}
