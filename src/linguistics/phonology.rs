//! Grapheme-to-phoneme opacity and L1 interference patterns
//!
//! English spelling hides pronunciation behind a set of notoriously
//! opaque grapheme patterns. Each pattern carries a difficulty
//! contribution; a word's opacity is the capped sum of its matches.
//! L1 interference patterns add family-specific difficulty on top.

use once_cell::sync::Lazy;

use crate::models::LanguageFamily;

/// Opaque grapheme patterns with their difficulty contributions.
static OPAQUE_PATTERNS: Lazy<Vec<(&'static str, f64)>> = Lazy::new(|| {
    vec![
        ("ough", 0.5),
        ("augh", 0.4),
        ("eigh", 0.4),
        ("tion", 0.15),
        ("sion", 0.2),
        ("ture", 0.15),
        ("gue", 0.3),
        ("que", 0.3),
        ("psy", 0.35),
        ("pneu", 0.4),
        ("kn", 0.3),
        ("gn", 0.3),
        ("wr", 0.25),
        ("mb", 0.25),
        ("mn", 0.3),
        ("ph", 0.15),
        ("gh", 0.3),
        ("th", 0.1),
        ("ch", 0.1),
        ("ea", 0.15),
        ("ei", 0.15),
        ("ie", 0.1),
        ("oo", 0.1),
        ("ou", 0.15),
    ]
});

/// Interference patterns per L1 family: substrings of the target word
/// that are known trouble spots, with the difficulty they add.
static INTERFERENCE_PATTERNS: Lazy<Vec<(LanguageFamily, Vec<(&'static str, f64)>)>> =
    Lazy::new(|| {
        use LanguageFamily::*;
        vec![
            // r/l and b/v contrasts, final consonants
            (Japonic, vec![("l", 0.2), ("r", 0.2), ("v", 0.15), ("th", 0.2), ("si", 0.1)]),
            // th, final clusters, l/r in codas
            (Koreanic, vec![("th", 0.2), ("f", 0.15), ("v", 0.15), ("z", 0.15), ("rl", 0.2)]),
            // th, consonant clusters, final voicing
            (SinoTibetan, vec![("th", 0.2), ("v", 0.1), ("str", 0.2), ("spr", 0.2), ("ld", 0.15)]),
            // h-dropping, short/long vowel contrast
            (Romance, vec![("h", 0.15), ("th", 0.15), ("ee", 0.1), ("ea", 0.1)]),
            // w/v confusion, th
            (Slavic, vec![("th", 0.2), ("w", 0.15), ("ng", 0.1)]),
            // p/b contrast, vowel breadth
            (Semitic, vec![("p", 0.15), ("v", 0.1), ("ou", 0.1)]),
        ]
    });

/// Cap on total interference adjustment for one word.
const MAX_INTERFERENCE: f64 = 0.5;

/// Grapheme-to-phoneme opacity of a word, in [0, 1]. Zero means the
/// spelling is fully transparent.
pub fn g2p_opacity(word: &str) -> f64 {
    let lower = word.to_ascii_lowercase();
    let mut opacity: f64 = 0.0;
    for (pattern, contribution) in OPAQUE_PATTERNS.iter() {
        if lower.contains(pattern) {
            opacity += contribution;
        }
    }
    // Long words hide more stress and schwa ambiguity
    if lower.len() > 8 {
        opacity += 0.1;
    }
    opacity.min(1.0)
}

/// Extra difficulty a learner with the given L1 faces pronouncing the
/// word, in [0, 0.5] on the theta scale.
pub fn l1_interference_adjustment(family: LanguageFamily, word: &str) -> f64 {
    let lower = word.to_ascii_lowercase();
    let patterns = INTERFERENCE_PATTERNS
        .iter()
        .find(|(f, _)| *f == family)
        .map(|(_, p)| p.as_slice())
        .unwrap_or(&[]);

    let mut adjustment: f64 = 0.0;
    for (pattern, difficulty) in patterns {
        if lower.contains(pattern) {
            adjustment += difficulty;
        }
    }
    adjustment.min(MAX_INTERFERENCE)
}
