//! Next-item selection strategies
//!
//! Both strategies scan a candidate slice, skip items already used in
//! the session, and return None on an empty field rather than failing.

use std::collections::HashSet;

use crate::algorithms::irt::{fisher_information, probability};
use crate::models::LearnableItem;

/// Pick the candidate with maximum Fisher information at the current
/// ability estimate. Ties are broken by higher discrimination so the
/// result is deterministic.
pub fn select_max_information<'a>(
    theta: f64,
    candidates: &'a [LearnableItem],
    used: &HashSet<String>,
) -> Option<&'a LearnableItem> {
    let mut best: Option<(&LearnableItem, f64)> = None;
    for item in candidates {
        if used.contains(&item.id) {
            continue;
        }
        let info = fisher_information(theta, &item.irt);
        let better = match best {
            None => true,
            Some((current, best_info)) => {
                info > best_info
                    || (info == best_info
                        && item.irt.discrimination > current.irt.discrimination)
            }
        };
        if better {
            best = Some((item, info));
        }
    }
    best.map(|(item, _)| item)
}

/// KL-divergence selection: score each candidate by how well it
/// separates the plausible ability range `theta_hat +- se`, weighting
/// wide posteriors more heavily. Useful early in a session when the
/// ability estimate is still loose.
pub fn select_kl_information<'a>(
    theta: f64,
    se: f64,
    candidates: &'a [LearnableItem],
    used: &HashSet<String>,
) -> Option<&'a LearnableItem> {
    let spread = se.max(0.1);
    let low = theta - spread;
    let high = theta + spread;

    let mut best: Option<(&LearnableItem, f64)> = None;
    for item in candidates {
        if used.contains(&item.id) {
            continue;
        }
        let p_low = probability(low, &item.irt).clamp(1e-9, 1.0 - 1e-9);
        let p_high = probability(high, &item.irt).clamp(1e-9, 1.0 - 1e-9);
        // Symmetrized KL between the response distributions at the two
        // ends of the plausible range, scaled by posterior variance.
        let kl = bernoulli_kl(p_high, p_low) + bernoulli_kl(p_low, p_high);
        let score = kl * spread * spread;
        let better = match best {
            None => true,
            Some((current, best_score)) => {
                score > best_score
                    || (score == best_score
                        && item.irt.discrimination > current.irt.discrimination)
            }
        };
        if better {
            best = Some((item, score));
        }
    }
    best.map(|(item, _)| item)
}

fn bernoulli_kl(p: f64, q: f64) -> f64 {
    p * (p / q).ln() + (1.0 - p) * ((1.0 - p) / (1.0 - q)).ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComponentKind, FeatureVector, IrtParams};
    use chrono::Utc;

    fn item(id: &str, a: f64, b: f64) -> LearnableItem {
        let mut item = LearnableItem::new(
            id.to_string(),
            ComponentKind::Lexical,
            IrtParams::new(a, b),
            FeatureVector::default(),
            Utc::now(),
        );
        item.id = id.to_string();
        item
    }

    #[test]
    fn test_max_information_prefers_matched_difficulty() {
        let candidates = vec![
            item("far", 1.0, 2.5),
            item("near", 1.0, 0.1),
            item("way_off", 1.0, -3.0),
        ];
        let chosen = select_max_information(0.0, &candidates, &HashSet::new()).unwrap();
        assert_eq!(chosen.id, "near");
    }

    #[test]
    fn test_used_items_are_excluded() {
        let candidates = vec![item("a", 1.0, 0.0), item("b", 1.0, 0.5)];
        let used: HashSet<String> = ["a".to_string()].into_iter().collect();
        let chosen = select_max_information(0.0, &candidates, &used).unwrap();
        assert_eq!(chosen.id, "b");
    }

    #[test]
    fn test_empty_candidate_set_returns_none() {
        assert!(select_max_information(0.0, &[], &HashSet::new()).is_none());
        let candidates = vec![item("a", 1.0, 0.0)];
        let used: HashSet<String> = ["a".to_string()].into_iter().collect();
        assert!(select_max_information(0.0, &candidates, &used).is_none());
    }

    #[test]
    fn test_tie_broken_by_discrimination() {
        // Same difficulty offset on both sides: identical information
        // for equal a, so the higher-a item must win.
        let candidates = vec![item("low_a", 0.9, 0.0), item("high_a", 1.4, 0.0)];
        let chosen = select_max_information(0.0, &candidates, &HashSet::new()).unwrap();
        assert_eq!(chosen.id, "high_a");
    }

    #[test]
    fn test_kl_selection_returns_discriminating_item() {
        let candidates = vec![item("flat", 0.4, 0.0), item("steep", 2.0, 0.0)];
        let chosen = select_kl_information(0.0, 1.5, &candidates, &HashSet::new()).unwrap();
        assert_eq!(chosen.id, "steep");
    }
}
