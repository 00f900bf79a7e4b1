//! Lexical association statistics
//!
//! Sliding-window co-occurrence index with PMI, normalized PMI and
//! Dunning log-likelihood ratio queries. Indexing mutates the
//! calculator; every query borrows it immutably. Lookups for unknown
//! words or pairs that never co-occur return None rather than failing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// LLR significance threshold (chi-squared, one degree of freedom,
/// p = 0.05) used to filter collocation candidates.
pub const LLR_SIGNIFICANCE: f64 = 3.84;

/// Default co-occurrence window in tokens.
pub const DEFAULT_WINDOW: usize = 5;

/// A scored collocation candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collocation {
    pub word: String,
    pub pmi: f64,
    pub llr: f64,
    pub count: u64,
}

/// Sliding-window corpus index
#[derive(Debug, Clone)]
pub struct PmiCalculator {
    window: usize,
    word_counts: HashMap<String, u64>,
    pair_counts: HashMap<(String, String), u64>,
    total_tokens: u64,
}

impl Default for PmiCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl PmiCalculator {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(2),
            word_counts: HashMap::new(),
            pair_counts: HashMap::new(),
            total_tokens: 0,
        }
    }

    /// NFC + lowercase normalization applied to every token and query.
    fn normalize(word: &str) -> String {
        word.nfc().collect::<String>().to_lowercase()
    }

    /// Pairs are stored under a canonical ordering so co-occurrence is
    /// symmetric by construction.
    fn pair_key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }

    /// Index a token sequence, accumulating word and windowed pair
    /// counts. May be called repeatedly; windows do not span calls.
    pub fn index<S: AsRef<str>>(&mut self, tokens: &[S]) {
        let normalized: Vec<String> = tokens
            .iter()
            .map(|t| Self::normalize(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();

        for token in &normalized {
            *self.word_counts.entry(token.clone()).or_insert(0) += 1;
        }
        self.total_tokens += normalized.len() as u64;

        for i in 0..normalized.len() {
            let end = (i + self.window).min(normalized.len());
            for j in (i + 1)..end {
                let key = Self::pair_key(&normalized[i], &normalized[j]);
                *self.pair_counts.entry(key).or_insert(0) += 1;
            }
        }
    }

    pub fn word_count(&self, word: &str) -> u64 {
        self.word_counts
            .get(&Self::normalize(word))
            .copied()
            .unwrap_or(0)
    }

    pub fn cooccurrence_count(&self, a: &str, b: &str) -> u64 {
        let key = Self::pair_key(&Self::normalize(a), &Self::normalize(b));
        self.pair_counts.get(&key).copied().unwrap_or(0)
    }

    /// Pointwise mutual information in bits. None when either word is
    /// absent or the pair never co-occurred.
    pub fn pmi(&self, a: &str, b: &str) -> Option<f64> {
        let (_, p_a, p_b, p_ab) = self.probabilities(a, b)?;
        Some((p_ab / (p_a * p_b)).log2())
    }

    /// Normalized PMI in [-1, 1].
    pub fn npmi(&self, a: &str, b: &str) -> Option<f64> {
        let (_, p_a, p_b, p_ab) = self.probabilities(a, b)?;
        let pmi = (p_ab / (p_a * p_b)).log2();
        let denominator = -p_ab.log2();
        if denominator <= 0.0 {
            return Some(1.0);
        }
        Some(pmi / denominator)
    }

    /// Dunning log-likelihood ratio for the pair.
    pub fn llr(&self, a: &str, b: &str) -> Option<f64> {
        let count_a = self.word_count(a);
        let count_b = self.word_count(b);
        let count_ab = self.cooccurrence_count(a, b);
        if count_a == 0 || count_b == 0 || count_ab == 0 || self.total_tokens == 0 {
            return None;
        }
        let n = self.total_tokens as f64;
        let k11 = count_ab as f64;
        let k12 = (count_a - count_ab.min(count_a)) as f64;
        let k21 = (count_b - count_ab.min(count_b)) as f64;
        let k22 = (n - k11 - k12 - k21).max(0.0);

        let llr = 2.0
            * (xlx(k11) + xlx(k12) + xlx(k21) + xlx(k22) + xlx(n)
                - xlx(k11 + k12)
                - xlx(k11 + k21)
                - xlx(k12 + k22)
                - xlx(k21 + k22));
        Some(llr.max(0.0))
    }

    /// Top-k collocates of a word: pairs passing the LLR significance
    /// filter, sorted by PMI descending with LLR and then the partner
    /// word as tie-breaks.
    pub fn collocations(&self, word: &str, top_k: usize) -> Vec<Collocation> {
        let target = Self::normalize(word);
        if !self.word_counts.contains_key(&target) {
            return Vec::new();
        }

        let mut candidates: Vec<Collocation> = self
            .pair_counts
            .iter()
            .filter_map(|((a, b), &count)| {
                let partner = if *a == target {
                    b
                } else if *b == target {
                    a
                } else {
                    return None;
                };
                let llr = self.llr(&target, partner)?;
                if llr < LLR_SIGNIFICANCE {
                    return None;
                }
                let pmi = self.pmi(&target, partner)?;
                Some(Collocation {
                    word: partner.clone(),
                    pmi,
                    llr,
                    count,
                })
            })
            .collect();

        candidates.sort_by(|x, y| {
            y.pmi
                .partial_cmp(&x.pmi)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    y.llr
                        .partial_cmp(&x.llr)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| x.word.cmp(&y.word))
        });
        candidates.truncate(top_k);
        candidates
    }

    fn probabilities(&self, a: &str, b: &str) -> Option<(f64, f64, f64, f64)> {
        if self.total_tokens == 0 {
            return None;
        }
        let count_a = self.word_count(a);
        let count_b = self.word_count(b);
        let count_ab = self.cooccurrence_count(a, b);
        if count_a == 0 || count_b == 0 || count_ab == 0 {
            return None;
        }
        let n = self.total_tokens as f64;
        Some((
            n,
            count_a as f64 / n,
            count_b as f64 / n,
            count_ab as f64 / n,
        ))
    }
}

fn xlx(x: f64) -> f64 {
    if x <= 0.0 {
        0.0
    } else {
        x * x.ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_phrase_corpus() -> Vec<&'static str> {
        vec![
            "new", "york", "city", "the", "big", "the", "hums", "softly", "at", "night",
            "new", "york", "skyline", "the", "towers", "rise", "above", "rivers", "new",
            "york", "subway", "the", "trains", "rattle", "under", "streets", "new", "york",
        ]
    }

    #[test]
    fn test_unknown_word_returns_none() {
        let mut calculator = PmiCalculator::default();
        calculator.index(&["alpha", "beta"]);
        assert!(calculator.pmi("alpha", "gamma").is_none());
        assert!(calculator.npmi("gamma", "beta").is_none());
        assert!(calculator.llr("gamma", "delta").is_none());
    }

    #[test]
    fn test_zero_cooccurrence_returns_none() {
        let mut calculator = PmiCalculator::new(2);
        calculator.index(&["alpha", "beta", "x", "y", "z", "q", "gamma", "delta"]);
        assert_eq!(calculator.cooccurrence_count("alpha", "delta"), 0);
        assert!(calculator.pmi("alpha", "delta").is_none());
    }

    #[test]
    fn test_fixed_phrase_has_positive_pmi() {
        let mut calculator = PmiCalculator::new(5);
        calculator.index(&fixed_phrase_corpus());
        let phrase = calculator.pmi("new", "york").unwrap();
        assert!(phrase > 0.0);
        let weak = calculator.pmi("new", "the").unwrap();
        assert!(phrase > weak);
    }

    #[test]
    fn test_pmi_is_symmetric() {
        let mut calculator = PmiCalculator::new(5);
        calculator.index(&fixed_phrase_corpus());
        let forward = calculator.pmi("new", "york").unwrap();
        let backward = calculator.pmi("york", "new").unwrap();
        assert!((forward - backward).abs() < 1e-12);
    }

    #[test]
    fn test_lookups_are_case_insensitive() {
        let mut calculator = PmiCalculator::new(5);
        calculator.index(&["New", "York", "NEW", "york"]);
        assert_eq!(calculator.word_count("new"), 2);
        assert!(calculator.pmi("NEW", "York").is_some());
    }

    #[test]
    fn test_npmi_bounded() {
        let mut calculator = PmiCalculator::new(5);
        calculator.index(&fixed_phrase_corpus());
        let npmi = calculator.npmi("new", "york").unwrap();
        assert!(npmi > 0.0 && npmi <= 1.0);
    }

    #[test]
    fn test_llr_flags_fixed_phrase_as_significant() {
        let mut calculator = PmiCalculator::new(5);
        calculator.index(&fixed_phrase_corpus());
        let llr = calculator.llr("new", "york").unwrap();
        assert!(llr > LLR_SIGNIFICANCE);
    }

    #[test]
    fn test_collocations_ranked_by_pmi() {
        let mut calculator = PmiCalculator::new(5);
        calculator.index(&fixed_phrase_corpus());
        let collocations = calculator.collocations("new", 3);
        assert!(!collocations.is_empty());
        assert_eq!(collocations[0].word, "york");
        for pair in collocations.windows(2) {
            assert!(pair[0].pmi >= pair[1].pmi);
        }
    }

    #[test]
    fn test_collocations_of_unknown_word_empty() {
        let mut calculator = PmiCalculator::default();
        calculator.index(&["alpha", "beta"]);
        assert!(calculator.collocations("missing", 5).is_empty());
    }

    #[test]
    fn test_incremental_indexing_accumulates() {
        let mut whole = PmiCalculator::new(5);
        whole.index(&fixed_phrase_corpus());

        let mut chunked = PmiCalculator::new(5);
        let corpus = fixed_phrase_corpus();
        // Split at a window boundary so no pair spans the seam
        chunked.index(&corpus[..10]);
        chunked.index(&corpus[10..]);
        assert_eq!(whole.word_count("new"), chunked.word_count("new"));
    }

    #[test]
    fn test_queries_do_not_mutate() {
        let mut calculator = PmiCalculator::new(5);
        calculator.index(&fixed_phrase_corpus());
        let before = calculator.cooccurrence_count("new", "york");
        let _ = calculator.pmi("new", "york");
        let _ = calculator.collocations("new", 5);
        assert_eq!(calculator.cooccurrence_count("new", "york"), before);
    }
}
