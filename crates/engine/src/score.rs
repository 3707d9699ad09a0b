use std::collections::HashSet;

use strsim::normalized_levenshtein;

use crate::config::WeightConfig;
use crate::normalize::NormalizedName;

// ---------------------------------------------------------------------------
// Composite scorer
// ---------------------------------------------------------------------------

/// Blends four similarity signals into one confidence value in [0, 1].
pub struct NameScorer {
    weights: WeightConfig,
    token_cap: usize,
}

impl NameScorer {
    pub fn new(weights: WeightConfig, token_cap: usize) -> Self {
        Self { weights, token_cap }
    }

    /// Composite confidence for a pair of names.
    ///
    /// Pairs that differ only in spacing and punctuation score exactly 1.0;
    /// everything else is the weighted blend of the individual signals.
    pub fn composite(&self, a: &NormalizedName, b: &NormalizedName) -> f64 {
        if is_spacing_punct_equal(a, b) {
            return 1.0;
        }

        let w = &self.weights;
        let total = w.sequence + w.token_jaccard + w.letters_only + w.initials;
        let blended = (w.sequence * sequence_similarity(a, b)
            + w.token_jaccard * token_jaccard(a, b)
            + w.letters_only * letters_similarity(a, b)
            + w.initials * initials_bonus(a, b))
            / total;
        blended.clamp(0.0, 1.0)
    }

    /// True when the two names denote the same person beyond doubt:
    /// equal normalized forms, equal letters-only forms, equal token
    /// multisets, or one side's tokens permute into the other's
    /// letters-only form (up to `token_cap` tokens). Checked both ways.
    ///
    /// Absolute matches jump the candidate ranking but never auto-accept;
    /// only spacing/punctuation equality does that.
    pub fn is_absolute_match(&self, a: &NormalizedName, b: &NormalizedName) -> bool {
        if a.is_empty() || b.is_empty() {
            return false;
        }
        if a.lower == b.lower || is_spacing_punct_equal(a, b) {
            return true;
        }
        if a.sorted_tokens() == b.sorted_tokens() {
            return true;
        }
        self.permutes_into(a, b) || self.permutes_into(b, a)
    }

    fn permutes_into(&self, a: &NormalizedName, b: &NormalizedName) -> bool {
        let n = a.tokens.len();
        if !(2..=self.token_cap).contains(&n) || b.letters_only.is_empty() {
            return false;
        }
        any_permutation_concats_to(&a.tokens, &b.letters_only)
    }
}

/// Whether the two names differ only in spacing, punctuation, and case.
/// Character order matters: "O'Brien, Mary" vs "Mary OBrien" is false.
pub fn is_spacing_punct_equal(a: &NormalizedName, b: &NormalizedName) -> bool {
    !a.letters_only.is_empty() && a.letters_only == b.letters_only
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

fn sequence_similarity(a: &NormalizedName, b: &NormalizedName) -> f64 {
    if a.lower.is_empty() || b.lower.is_empty() {
        return 0.0;
    }
    normalized_levenshtein(&a.lower, &b.lower)
}

fn token_jaccard(a: &NormalizedName, b: &NormalizedName) -> f64 {
    let sa: HashSet<&str> = a.tokens.iter().map(String::as_str).collect();
    let sb: HashSet<&str> = b.tokens.iter().map(String::as_str).collect();
    if sa.is_empty() || sb.is_empty() {
        return 0.0;
    }
    let intersection = sa.intersection(&sb).count() as f64;
    let union = sa.union(&sb).count() as f64;
    intersection / union
}

fn letters_similarity(a: &NormalizedName, b: &NormalizedName) -> f64 {
    if a.letters_only.is_empty() || b.letters_only.is_empty() {
        return 0.0;
    }
    normalized_levenshtein(&a.letters_only, &b.letters_only)
}

fn initials_bonus(a: &NormalizedName, b: &NormalizedName) -> f64 {
    let ia = a.sorted_initials();
    if ia.is_empty() {
        return 0.0;
    }
    if ia == b.sorted_initials() {
        1.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Token permutation search
// ---------------------------------------------------------------------------

/// Does some ordering of `tokens` concatenate to exactly `target`?
/// Prefix pruning keeps this cheap well below the factorial bound.
fn any_permutation_concats_to(tokens: &[String], target: &str) -> bool {
    let total: usize = tokens.iter().map(String::len).sum();
    if total != target.len() {
        return false;
    }
    let mut used = vec![false; tokens.len()];
    let mut acc = String::with_capacity(total);
    permute_step(tokens, target, &mut used, &mut acc)
}

fn permute_step(tokens: &[String], target: &str, used: &mut [bool], acc: &mut String) -> bool {
    if acc.len() == target.len() {
        return acc == target;
    }
    for i in 0..tokens.len() {
        if used[i] || !target[acc.len()..].starts_with(tokens[i].as_str()) {
            continue;
        }
        used[i] = true;
        acc.push_str(&tokens[i]);
        if permute_step(tokens, target, used, acc) {
            return true;
        }
        acc.truncate(acc.len() - tokens[i].len());
        used[i] = false;
    }
    false
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MatchConfig, WeightConfig};
    use crate::normalize::{NameNormalizer, NormalizedName};

    fn norm(name: &str) -> NormalizedName {
        NameNormalizer::new(MatchConfig::default().nickname_table()).normalize(name)
    }

    fn scorer() -> NameScorer {
        NameScorer::new(WeightConfig::default(), 4)
    }

    #[test]
    fn spacing_punct_equal_scores_exactly_one() {
        let a = norm("John Smith");
        let b = norm("john  smith.");
        assert!(is_spacing_punct_equal(&a, &b));
        assert_eq!(scorer().composite(&a, &b), 1.0);
    }

    #[test]
    fn reordered_tokens_are_not_spacing_punct_equal() {
        let a = norm("O'Brien, Mary");
        let b = norm("Mary OBrien");
        assert!(!is_spacing_punct_equal(&a, &b));
        // same tokens in a different order is still an absolute match
        assert!(scorer().is_absolute_match(&a, &b));
    }

    #[test]
    fn identical_names_match_absolutely() {
        assert!(scorer().is_absolute_match(&norm("Jane Doe"), &norm("jane doe")));
        assert!(scorer().is_absolute_match(&norm("JaneDoe"), &norm("Jane Doe")));
    }

    #[test]
    fn permuted_concatenation_matches_up_to_cap() {
        let s = scorer();
        assert!(s.is_absolute_match(&norm("Mary Jane Watson"), &norm("WatsonMaryJane")));
        // five tokens exceed the default cap of four
        let long = norm("Anna Belle Claire Diana Eve");
        assert!(!s.is_absolute_match(&long, &norm("evedianaclairebelleanna")));
    }

    #[test]
    fn empty_names_never_match() {
        let s = scorer();
        assert!(!s.is_absolute_match(&norm(""), &norm("")));
        assert!(!is_spacing_punct_equal(&norm(""), &norm("")));
        assert_eq!(s.composite(&norm(""), &norm("")), 0.0);
    }

    #[test]
    fn nickname_variants_score_high_but_below_one() {
        // "Jon Smith" normalizes to "john smith"; against "Jonathan Smith"
        // everything agrees except the first-name spelling.
        let score = scorer().composite(&norm("Jon Smith"), &norm("Jonathan Smith"));
        assert!(score > 0.5, "got {score}");
        assert!(score < 0.85, "got {score}");
    }

    #[test]
    fn unrelated_names_score_low() {
        let score = scorer().composite(&norm("Mary Watson"), &norm("Carlos Ruiz"));
        assert!(score < 0.4, "got {score}");
    }

    #[test]
    fn jaccard_counts_shared_tokens() {
        assert_eq!(token_jaccard(&norm("Ana Lee Park"), &norm("Lee Park")), 2.0 / 3.0);
        assert_eq!(token_jaccard(&norm("Ana Lee"), &norm("Ana Lee")), 1.0);
        assert_eq!(token_jaccard(&norm("Ana"), &norm("Lee")), 0.0);
    }

    #[test]
    fn initials_bonus_is_order_insensitive_but_counted() {
        assert_eq!(initials_bonus(&norm("John Smith"), &norm("Smith John")), 1.0);
        assert_eq!(initials_bonus(&norm("John Smith"), &norm("John S Smith")), 0.0);
        assert_eq!(initials_bonus(&norm(""), &norm("John")), 0.0);
    }

    #[test]
    fn custom_weights_shift_the_blend() {
        // All weight on the jaccard signal: shared-token pairs score 1.0.
        let heavy_jaccard = NameScorer::new(
            WeightConfig {
                sequence: 0.0,
                token_jaccard: 1.0,
                letters_only: 0.0,
                initials: 0.0,
            },
            4,
        );
        assert_eq!(
            heavy_jaccard.composite(&norm("Smith John"), &norm("John Smith")),
            1.0
        );
    }

    #[test]
    fn permutation_search_requires_exact_cover() {
        let tokens = vec!["ab".to_string(), "cd".to_string()];
        assert!(any_permutation_concats_to(&tokens, "cdab"));
        assert!(any_permutation_concats_to(&tokens, "abcd"));
        assert!(!any_permutation_concats_to(&tokens, "abce"));
        assert!(!any_permutation_concats_to(&tokens, "abc"));
    }
}
