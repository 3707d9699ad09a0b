use std::collections::HashSet;

use ordered_float::OrderedFloat;

use crate::model::{AttendanceRecord, CandidateSlot, MatchCandidate, Proposal, RosterEntry};
use crate::normalize::{NameNormalizer, NormalizedName};
use crate::score::{is_spacing_punct_equal, NameScorer};

/// Candidate slots per review row.
pub const TOP_K: usize = 3;

// ---------------------------------------------------------------------------
// Candidate ranking
// ---------------------------------------------------------------------------

/// Best `k` roster candidates for one attendance name, highest score first.
///
/// An absolute match takes rank 1 with score 1.0, ahead of anything the
/// blended scorer produces. When several roster rows match absolutely, an
/// exact-up-to-spacing hit beats a reordered one, a row carrying an email
/// beats one without, and ties go to the lowest roster index.
pub fn top_k_matches(
    source: &NormalizedName,
    source_name: &str,
    roster: &[RosterEntry],
    roster_norms: &[NormalizedName],
    scorer: &NameScorer,
    k: usize,
    min_score: f64,
) -> Vec<MatchCandidate> {
    if source.is_empty() || k == 0 {
        return Vec::new();
    }

    // Absolute hits are tiered: an exact-up-to-spacing hit outranks a
    // reordered one, and within each kind a row carrying an email wins.
    let mut best: Option<(usize, u8)> = None;
    for (i, norm) in roster_norms.iter().enumerate() {
        if !scorer.is_absolute_match(source, norm) {
            continue;
        }
        let has_email = !roster[i].email.trim().is_empty();
        let tier = match (is_spacing_punct_equal(source, norm), has_email) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        };
        if best.map_or(true, |(_, t)| tier < t) {
            best = Some((i, tier));
            if tier == 0 {
                break;
            }
        }
    }
    let absolute = best.map(|(i, _)| i);

    let mut scored: Vec<MatchCandidate> = roster_norms
        .iter()
        .enumerate()
        .filter(|(i, norm)| Some(*i) != absolute && !norm.is_empty())
        .map(|(i, norm)| candidate(source_name, roster, i, scorer.composite(source, norm)))
        .filter(|c| c.score >= min_score)
        .collect();
    scored.sort_by(|a, b| {
        OrderedFloat(b.score)
            .cmp(&OrderedFloat(a.score))
            .then_with(|| a.roster_index.cmp(&b.roster_index))
    });

    let mut out = Vec::with_capacity(k);
    if let Some(i) = absolute {
        out.push(candidate(source_name, roster, i, 1.0));
    }
    out.extend(scored);
    out.truncate(k);
    out
}

fn candidate(source_name: &str, roster: &[RosterEntry], i: usize, score: f64) -> MatchCandidate {
    MatchCandidate {
        source_name: source_name.to_string(),
        candidate_name: roster[i].full_name.clone(),
        candidate_email: roster[i].email.clone(),
        score,
        roster_index: i,
    }
}

// ---------------------------------------------------------------------------
// Proposal sheet
// ---------------------------------------------------------------------------

/// One review row per distinct attendance name, in review-friendly order:
/// rows still needing a human first, weakest top score first.
///
/// A row is certain when the top candidate equals the attendance name up to
/// spacing and punctuation and carries an email. Certain rows arrive
/// pre-accepted with pick 1 and no alternates.
pub fn build_proposals(
    attendance: &[AttendanceRecord],
    roster: &[RosterEntry],
    roster_norms: &[NormalizedName],
    normalizer: &NameNormalizer,
    scorer: &NameScorer,
    min_score: f64,
) -> Vec<Proposal> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut proposals = Vec::new();

    for record in attendance {
        if !seen.insert(record.full_name.as_str()) {
            continue;
        }
        let norm = normalizer.normalize(&record.full_name);
        let candidates = top_k_matches(
            &norm,
            &record.full_name,
            roster,
            roster_norms,
            scorer,
            TOP_K,
            min_score,
        );

        let certain = candidates.first().is_some_and(|top| {
            is_spacing_punct_equal(&norm, &roster_norms[top.roster_index])
                && !top.candidate_email.trim().is_empty()
        });
        let suggested_email = candidates
            .first()
            .map(|c| c.candidate_email.clone())
            .unwrap_or_default();

        let slot = |c: &MatchCandidate| CandidateSlot {
            name: c.candidate_name.clone(),
            email: c.candidate_email.clone(),
            score: c.score,
        };
        proposals.push(Proposal {
            full_name_a: record.full_name.clone(),
            top1: candidates.first().map(slot),
            top2: if certain { None } else { candidates.get(1).map(slot) },
            top3: if certain { None } else { candidates.get(2).map(slot) },
            suggested_email,
            certain,
            decision: if certain { "ACCEPT".to_string() } else { String::new() },
            pick: if certain { "1".to_string() } else { String::new() },
            chosen_email: String::new(),
        });
    }

    proposals.sort_by(|a, b| {
        a.certain
            .cmp(&b.certain)
            .then_with(|| top_score(a).cmp(&top_score(b)))
            .then_with(|| a.full_name_a.cmp(&b.full_name_a))
    });
    proposals
}

fn top_score(p: &Proposal) -> OrderedFloat<f64> {
    OrderedFloat(p.top1.as_ref().map_or(-1.0, |s| s.score))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MatchConfig, WeightConfig};

    fn entry(name: &str, email: &str) -> RosterEntry {
        RosterEntry {
            category: String::new(),
            subcategory: String::new(),
            full_name: name.to_string(),
            country: String::new(),
            email: email.to_string(),
            cc_email: String::new(),
            first_conference: false,
        }
    }

    fn setup(roster: &[RosterEntry]) -> (NameNormalizer, Vec<NormalizedName>, NameScorer) {
        let normalizer = NameNormalizer::new(MatchConfig::default().nickname_table());
        let norms = roster
            .iter()
            .map(|e| normalizer.normalize(&e.full_name))
            .collect();
        (normalizer, norms, NameScorer::new(WeightConfig::default(), 4))
    }

    fn rank(source: &str, roster: &[RosterEntry], min_score: f64) -> Vec<MatchCandidate> {
        let (normalizer, norms, scorer) = setup(roster);
        top_k_matches(
            &normalizer.normalize(source),
            source,
            roster,
            &norms,
            &scorer,
            TOP_K,
            min_score,
        )
    }

    #[test]
    fn absolute_match_takes_rank_one_at_full_score() {
        let roster = vec![entry("Watson Marya", "wm@example.com"), entry("Mary Watson", "mary@example.com")];
        let got = rank("Watson, Mary", &roster, 0.5);
        assert_eq!(got[0].candidate_name, "Mary Watson");
        assert_eq!(got[0].score, 1.0);
        assert_eq!(got[0].roster_index, 1);
    }

    #[test]
    fn absolute_match_prefers_a_row_with_an_email() {
        let roster = vec![entry("Mary Watson", ""), entry("mary watson", "mary@example.com")];
        let got = rank("Mary Watson", &roster, 0.85);
        assert_eq!(got[0].roster_index, 1);
        assert_eq!(got[0].candidate_email, "mary@example.com");
    }

    #[test]
    fn min_score_filters_weak_candidates() {
        let roster = vec![entry("Jonathan Smith", "jsmith@example.com")];
        assert!(rank("Jon Smith", &roster, 0.85).is_empty());
        let relaxed = rank("Jon Smith", &roster, 0.5);
        assert_eq!(relaxed.len(), 1);
        assert!(relaxed[0].score < 0.85);
    }

    #[test]
    fn candidates_come_back_sorted_and_truncated() {
        let roster = vec![
            entry("Maria Watson", "a@example.com"),
            entry("Mary Watson", "b@example.com"),
            entry("Marie Watson", "c@example.com"),
            entry("Mary Watkins", "d@example.com"),
        ];
        let got = rank("Mary Watson", &roster, 0.1);
        assert_eq!(got.len(), TOP_K);
        assert_eq!(got[0].candidate_name, "Mary Watson");
        assert_eq!(got[0].score, 1.0);
        assert!(got[1].score >= got[2].score);
    }

    #[test]
    fn empty_source_yields_no_candidates() {
        let roster = vec![entry("Mary Watson", "mary@example.com")];
        assert!(rank("  ", &roster, 0.0).is_empty());
    }

    fn record(name: &str) -> AttendanceRecord {
        AttendanceRecord {
            full_name: name.to_string(),
            credit_hours: 1.0,
            event_name: "Opening".to_string(),
        }
    }

    fn proposals_for(names: &[&str], roster: &[RosterEntry], min_score: f64) -> Vec<Proposal> {
        let (normalizer, norms, scorer) = setup(roster);
        let attendance: Vec<AttendanceRecord> = names.iter().map(|n| record(n)).collect();
        build_proposals(&attendance, roster, &norms, &normalizer, &scorer, min_score)
    }

    #[test]
    fn certain_rows_are_preaccepted_without_alternates() {
        let roster = vec![entry("John Smith", "jsmith@example.com"), entry("John Smyth", "x@example.com")];
        let got = proposals_for(&["John  Smith."], &roster, 0.5);
        assert_eq!(got.len(), 1);
        let p = &got[0];
        assert!(p.certain);
        assert_eq!(p.decision, "ACCEPT");
        assert_eq!(p.pick, "1");
        assert_eq!(p.suggested_email, "jsmith@example.com");
        assert!(p.top2.is_none() && p.top3.is_none());
    }

    #[test]
    fn reordered_absolute_match_still_needs_review() {
        let roster = vec![entry("Mary Watson", "mary@example.com")];
        let got = proposals_for(&["Watson, Mary"], &roster, 0.85);
        let p = &got[0];
        assert!(!p.certain);
        assert_eq!(p.decision, "");
        assert_eq!(p.top1.as_ref().map(|s| s.score), Some(1.0));
    }

    #[test]
    fn exact_hit_outranks_an_earlier_reordered_one() {
        let roster = vec![
            entry("Watson Mary", "flip@example.com"),
            entry("Mary Watson", "mary@example.com"),
        ];
        let got = proposals_for(&["Mary Watson"], &roster, 0.85);
        let p = &got[0];
        assert_eq!(
            p.top1.as_ref().map(|s| s.email.as_str()),
            Some("mary@example.com")
        );
        assert!(p.certain);
    }

    #[test]
    fn exact_match_without_email_is_not_certain() {
        let roster = vec![entry("Mary Watson", "")];
        let got = proposals_for(&["Mary Watson"], &roster, 0.85);
        assert!(!got[0].certain);
    }

    #[test]
    fn review_rows_sort_before_certain_ones_weakest_first() {
        let roster = vec![
            entry("John Smith", "jsmith@example.com"),
            entry("Jonathan Smith", "jon@example.com"),
            entry("Mary Watson", "mary@example.com"),
        ];
        let got = proposals_for(&["John Smith", "Jon Smith", "Zz Qq"], &roster, 0.3);
        let order: Vec<&str> = got.iter().map(|p| p.full_name_a.as_str()).collect();
        // no-candidate row first, then the nickname hit, certain row last
        assert_eq!(order, vec!["Zz Qq", "Jon Smith", "John Smith"]);
        assert!(got[2].certain);
        // the nickname hit ranks first for review but is not auto-accepted
        assert_eq!(got[1].top1.as_ref().map(|s| s.score), Some(1.0));
        assert!(!got[1].certain);
    }

    #[test]
    fn repeated_attendance_names_collapse_to_one_row() {
        let roster = vec![entry("Mary Watson", "mary@example.com")];
        let got = proposals_for(&["Mary Watson", "Mary Watson", "Mary Watson"], &roster, 0.85);
        assert_eq!(got.len(), 1);
    }
}
