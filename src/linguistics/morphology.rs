//! English affix inventories and word-formation scoring

use once_cell::sync::Lazy;

/// Productive English prefixes, longest first so stripping is greedy.
static PREFIXES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut prefixes = vec![
        "anti", "counter", "inter", "micro", "multi", "over", "post", "pre", "semi",
        "sub", "super", "trans", "ultra", "under", "out", "mis", "non", "dis", "un",
        "re", "in", "im", "ir", "il", "de", "en",
    ];
    prefixes.sort_by_key(|p| std::cmp::Reverse(p.len()));
    prefixes
});

/// Productive English suffixes, longest first.
static SUFFIXES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut suffixes = vec![
        "ization", "ability", "fulness", "ation", "ement", "iness", "ingly", "ously",
        "tion", "sion", "ment", "ness", "able", "ible", "less", "ward", "wise", "ship",
        "hood", "ful", "ous", "ive", "ity", "ize", "ise", "ist", "ism", "ing", "ion",
        "est", "ate", "al", "er", "or", "ed", "ly", "en", "y",
    ];
    suffixes.sort_by_key(|s| std::cmp::Reverse(s.len()));
    suffixes
});

/// Minimum stem length left behind by affix stripping.
const MIN_STEM: usize = 3;

/// Result of affix stripping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffixAnalysis {
    pub stem: String,
    pub prefixes: Vec<&'static str>,
    pub suffixes: Vec<&'static str>,
}

impl AffixAnalysis {
    pub fn affix_count(&self) -> usize {
        self.prefixes.len() + self.suffixes.len()
    }
}

/// Greedy longest-match affix stripping. At most two prefixes and two
/// suffixes are peeled, and stripping never leaves a stem shorter than
/// three characters.
pub fn strip_affixes(word: &str) -> AffixAnalysis {
    let mut stem = word.to_ascii_lowercase();
    let mut prefixes = Vec::new();
    let mut suffixes = Vec::new();

    for _ in 0..2 {
        let found = PREFIXES
            .iter()
            .find(|p| stem.starts_with(**p) && stem.len() - p.len() >= MIN_STEM);
        match found {
            Some(prefix) => {
                stem = stem[prefix.len()..].to_string();
                prefixes.push(*prefix);
            }
            None => break,
        }
    }
    for _ in 0..2 {
        let found = SUFFIXES
            .iter()
            .find(|s| stem.ends_with(**s) && stem.len() - s.len() >= MIN_STEM);
        match found {
            Some(suffix) => {
                stem = stem[..stem.len() - suffix.len()].to_string();
                suffixes.push(*suffix);
            }
            None => break,
        }
    }

    AffixAnalysis {
        stem,
        prefixes,
        suffixes,
    }
}

/// Whether two words reduce to the same stem after affix stripping.
/// A final silent-e difference ("create" / "creation") still counts.
pub fn shares_stem(a: &str, b: &str) -> bool {
    let stem_a = strip_affixes(a).stem;
    let stem_b = strip_affixes(b).stem;
    if stem_a == stem_b {
        return true;
    }
    let (short, long) = if stem_a.len() <= stem_b.len() {
        (&stem_a, &stem_b)
    } else {
        (&stem_b, &stem_a)
    };
    long.len() - short.len() == 1 && long.starts_with(short.as_str()) && long.ends_with('e')
}

/// Morphological complexity in [0, 1], from the number of affixes a
/// word carries.
pub fn morphological_complexity(word: &str) -> f64 {
    match strip_affixes(word).affix_count() {
        0 => 0.0,
        1 => 0.4,
        2 => 0.7,
        _ => 1.0,
    }
}
