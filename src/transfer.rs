//! L1 -> L2 transfer model
//!
//! Static coefficient table describing how much a learner's native
//! language family helps (positive) or interferes (negative) with each
//! linguistic component of the target language. Coefficients live in
//! [-1, 1]; transfer gain rescales them to [0, 1] with 0.5 as the
//! neutral point.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{ComponentKind, LanguageFamily};

/// Transfer coefficients for one (L1, L2) family pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransferCoefficients {
    pub lexical: f64,
    pub morphological: f64,
    pub phonological: f64,
    pub syntactic: f64,
    pub pragmatic: f64,
    pub orthographic: f64,
}

impl TransferCoefficients {
    pub const NEUTRAL: TransferCoefficients = TransferCoefficients {
        lexical: 0.0,
        morphological: 0.0,
        phonological: 0.0,
        syntactic: 0.0,
        pragmatic: 0.0,
        orthographic: 0.0,
    };

    pub fn get(&self, component: ComponentKind) -> f64 {
        match component {
            ComponentKind::Lexical => self.lexical,
            ComponentKind::Morphological => self.morphological,
            ComponentKind::Phonological => self.phonological,
            ComponentKind::Syntactic => self.syntactic,
            ComponentKind::Pragmatic => self.pragmatic,
        }
    }

    /// All six coefficients with display names.
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("lexical", self.lexical),
            ("morphological", self.morphological),
            ("phonological", self.phonological),
            ("syntactic", self.syntactic),
            ("pragmatic", self.pragmatic),
            ("orthographic", self.orthographic),
        ]
    }
}

fn coefficients(
    lexical: f64,
    morphological: f64,
    phonological: f64,
    syntactic: f64,
    pragmatic: f64,
    orthographic: f64,
) -> TransferCoefficients {
    TransferCoefficients {
        lexical,
        morphological,
        phonological,
        syntactic,
        pragmatic,
        orthographic,
    }
}

/// Coefficient table for the family pairs with well-documented
/// transfer effects. Pairs not listed fall back to same-family
/// similarity or to neutral.
static TRANSFER_TABLE: Lazy<HashMap<(LanguageFamily, LanguageFamily), TransferCoefficients>> =
    Lazy::new(|| {
        use LanguageFamily::*;
        let mut table = HashMap::new();
        // Into Germanic targets (e.g. English)
        table.insert((Germanic, Germanic), coefficients(0.6, 0.5, 0.4, 0.5, 0.3, 0.5));
        table.insert((Romance, Germanic), coefficients(0.5, 0.2, -0.2, 0.1, 0.1, 0.2));
        table.insert((Slavic, Germanic), coefficients(0.1, 0.1, -0.1, -0.2, 0.0, -0.1));
        table.insert((SinoTibetan, Germanic), coefficients(-0.2, -0.3, -0.5, -0.3, -0.2, -0.6));
        table.insert((Japonic, Germanic), coefficients(-0.1, -0.2, -0.5, -0.4, -0.3, -0.5));
        table.insert((Koreanic, Germanic), coefficients(-0.2, -0.2, -0.4, -0.4, -0.3, -0.4));
        table.insert((Semitic, Germanic), coefficients(-0.1, -0.3, -0.2, -0.1, 0.0, -0.5));
        // Into Romance targets
        table.insert((Romance, Romance), coefficients(0.7, 0.6, 0.5, 0.6, 0.4, 0.6));
        table.insert((Germanic, Romance), coefficients(0.4, 0.1, -0.1, 0.0, 0.1, 0.2));
        table.insert((Slavic, Romance), coefficients(0.2, 0.3, 0.1, 0.1, 0.1, 0.0));
        table.insert((Japonic, Romance), coefficients(-0.1, -0.3, -0.3, -0.4, -0.2, -0.4));
        // Into East Asian targets
        table.insert((Japonic, Koreanic), coefficients(0.2, 0.4, 0.1, 0.6, 0.4, -0.2));
        table.insert((Koreanic, Japonic), coefficients(0.2, 0.4, 0.1, 0.6, 0.4, -0.2));
        table.insert((SinoTibetan, Japonic), coefficients(0.4, -0.1, -0.2, -0.3, 0.0, 0.5));
        table.insert((SinoTibetan, Koreanic), coefficients(0.4, -0.1, -0.2, -0.3, 0.0, 0.1));
        table
    });

/// Look up the coefficient set for an (L1, L2) pair. Same-family pairs
/// not in the table share a generic within-family profile; everything
/// else is neutral.
pub fn coefficients_for(l1: LanguageFamily, l2: LanguageFamily) -> TransferCoefficients {
    if let Some(c) = TRANSFER_TABLE.get(&(l1, l2)) {
        return *c;
    }
    if l1 == l2 {
        return coefficients(0.5, 0.4, 0.3, 0.4, 0.3, 0.4);
    }
    TransferCoefficients::NEUTRAL
}

/// Rescale a coefficient in [-1, 1] to a gain in [0, 1].
pub fn gain_from_coefficient(coefficient: f64) -> f64 {
    (coefficient.clamp(-1.0, 1.0) + 1.0) / 2.0
}

/// Resolved transfer relationship between a learner's L1 and the
/// target language.
#[derive(Debug, Clone)]
pub struct TransferProfile {
    pub l1: Option<LanguageFamily>,
    pub l2: LanguageFamily,
    coefficients: Option<TransferCoefficients>,
}

impl TransferProfile {
    pub fn new(l1: Option<LanguageFamily>, l2: LanguageFamily) -> Self {
        Self {
            l1,
            l2,
            coefficients: l1.map(|family| coefficients_for(family, l2)),
        }
    }

    /// Transfer gain for one component; 0.5 when the L1 is unknown.
    pub fn gain(&self, component: ComponentKind) -> f64 {
        match &self.coefficients {
            Some(c) => gain_from_coefficient(c.get(component)),
            None => 0.5,
        }
    }

    /// Orthographic gain is not tied to a cascade component but still
    /// informs the narrative summary and G2P scoring.
    pub fn orthographic_gain(&self) -> f64 {
        match &self.coefficients {
            Some(c) => gain_from_coefficient(c.orthographic),
            None => 0.5,
        }
    }

    /// Human-readable summary for UX collaborators.
    pub fn summary(&self) -> TransferSummary {
        let coefficients = match &self.coefficients {
            Some(c) => c,
            None => {
                return TransferSummary {
                    strengths: Vec::new(),
                    challenges: Vec::new(),
                    recommendations: vec![
                        "No native language on record; defaults assume neutral transfer"
                            .to_string(),
                    ],
                }
            }
        };

        let mut strengths = Vec::new();
        let mut challenges = Vec::new();
        let mut recommendations = Vec::new();
        for (name, value) in coefficients.entries() {
            if value >= 0.3 {
                strengths.push(format!("{} transfer is favorable", name));
            } else if value <= -0.3 {
                challenges.push(format!("{} interference is likely", name));
                recommendations.push(recommendation_for(name));
            }
        }
        if recommendations.is_empty() {
            recommendations
                .push("Transfer profile is mild; follow the standard progression".to_string());
        }
        TransferSummary {
            strengths,
            challenges,
            recommendations,
        }
    }
}

fn recommendation_for(component: &str) -> String {
    match component {
        "phonological" => {
            "Schedule extra listening and minimal-pair discrimination work".to_string()
        }
        "morphological" => "Drill affixation and word-family patterns explicitly".to_string(),
        "syntactic" => "Contrast word-order patterns early and often".to_string(),
        "pragmatic" => "Practice register shifts in context rather than in isolation".to_string(),
        "orthographic" => "Add dedicated spelling and decoding practice".to_string(),
        _ => "Lean on cognate-aware vocabulary sequencing".to_string(),
    }
}

/// Narrative transfer summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSummary {
    pub strengths: Vec<String>,
    pub challenges: Vec<String>,
    pub recommendations: Vec<String>,
}
