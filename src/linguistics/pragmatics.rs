//! Register and politeness scoring for pragmatic tasks

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Politeness strategy, after Brown and Levinson's taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolitenessStrategy {
    Direct,
    PositivePoliteness,
    NegativePoliteness,
    OffRecord,
}

impl PolitenessStrategy {
    /// Register a strategy is most at home in, used to seed register
    /// expectations for politeness-focused tasks.
    pub fn typical_register(&self) -> RegisterLevel {
        match self {
            Self::Direct => RegisterLevel::Casual,
            Self::PositivePoliteness => RegisterLevel::Consultative,
            Self::NegativePoliteness => RegisterLevel::Formal,
            Self::OffRecord => RegisterLevel::Consultative,
        }
    }
}

/// Register level on Joos's five-point formality scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegisterLevel {
    Intimate = 0,
    Casual = 1,
    Consultative = 2,
    Formal = 3,
    Frozen = 4,
}

impl RegisterLevel {
    /// How many levels apart two registers sit.
    pub fn distance(&self, other: RegisterLevel) -> u8 {
        (*self as i8 - other as i8).unsigned_abs()
    }
}

/// Lexical markers signalling casual register.
static CASUAL_MARKERS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "gonna", "wanna", "gotta", "kinda", "sorta", "yeah", "hey", "ok", "okay",
        "cool", "stuff", "guys", "dude", "lol",
    ]
});

/// Lexical markers signalling formal register.
static FORMAL_MARKERS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "moreover", "nevertheless", "furthermore", "consequently", "hereby",
        "pursuant", "notwithstanding", "kindly", "regarding", "sincerely",
        "respectfully", "shall",
    ]
});

/// Detect the register of a short text from its lexical markers.
/// Marker-free text defaults to consultative, the neutral midpoint.
pub fn detect_register(text: &str) -> RegisterLevel {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    let casual = words
        .iter()
        .filter(|w| CASUAL_MARKERS.contains(&w.trim_matches(|c: char| !c.is_alphanumeric())))
        .count();
    let formal = words
        .iter()
        .filter(|w| FORMAL_MARKERS.contains(&w.trim_matches(|c: char| !c.is_alphanumeric())))
        .count();
    let contractions = lower.matches('\'').count();

    if formal > casual && formal > 0 {
        RegisterLevel::Formal
    } else if casual > formal || contractions >= 2 {
        RegisterLevel::Casual
    } else {
        RegisterLevel::Consultative
    }
}

/// Partial credit for producing text in the expected register: full
/// credit for a match, fading by distance on the formality scale.
pub fn register_match_score(expected: RegisterLevel, produced: RegisterLevel) -> f64 {
    1.0 - expected.distance(produced) as f64 / 4.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_distance() {
        assert_eq!(RegisterLevel::Casual.distance(RegisterLevel::Formal), 2);
        assert_eq!(RegisterLevel::Frozen.distance(RegisterLevel::Intimate), 4);
        assert_eq!(RegisterLevel::Formal.distance(RegisterLevel::Formal), 0);
    }

    #[test]
    fn test_detect_casual() {
        assert_eq!(detect_register("hey guys, wanna grab lunch?"), RegisterLevel::Casual);
    }

    #[test]
    fn test_detect_formal() {
        assert_eq!(
            detect_register("Moreover, the committee shall convene on Tuesday."),
            RegisterLevel::Formal
        );
    }

    #[test]
    fn test_neutral_defaults_to_consultative() {
        assert_eq!(
            detect_register("The meeting is at three."),
            RegisterLevel::Consultative
        );
    }

    #[test]
    fn test_match_score_fades_with_distance() {
        assert_eq!(register_match_score(RegisterLevel::Formal, RegisterLevel::Formal), 1.0);
        assert!(
            register_match_score(RegisterLevel::Formal, RegisterLevel::Consultative)
                > register_match_score(RegisterLevel::Formal, RegisterLevel::Intimate)
        );
        assert_eq!(
            register_match_score(RegisterLevel::Frozen, RegisterLevel::Intimate),
            0.0
        );
    }
}
