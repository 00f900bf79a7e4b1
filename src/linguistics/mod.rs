//! Linguistic scoring helpers
//!
//! Static English affix inventories, a grapheme-to-phoneme opacity
//! model with L1 interference patterns, and register/politeness
//! scoring for pragmatic tasks.

pub mod morphology;
pub mod phonology;
pub mod pragmatics;

pub use morphology::{morphological_complexity, shares_stem, strip_affixes, AffixAnalysis};
pub use phonology::{g2p_opacity, l1_interference_adjustment};
pub use pragmatics::{
    detect_register, register_match_score, PolitenessStrategy, RegisterLevel,
};

/// Feature-vector entries suggested by the static linguistic models,
/// for catalogs that lack hand-assigned scores.
#[derive(Debug, Clone, Copy)]
pub struct FeatureHints {
    /// From affix structure
    pub morphological: f64,
    /// From spelling opacity
    pub phonological: f64,
}

/// Score a surface form with the affix and grapheme models.
pub fn feature_hints(content: &str) -> FeatureHints {
    FeatureHints {
        morphological: morphological_complexity(content),
        phonological: g2p_opacity(content),
    }
}
