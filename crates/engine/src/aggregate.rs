use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::{
    email_key, AttendanceRecord, JoinedEvent, MasterRecord, MatchOutcome, ResolvedIdentity,
    UnmatchedEvent,
};
use crate::resolve::RosterIndex;

// ---------------------------------------------------------------------------
// Event join
// ---------------------------------------------------------------------------

/// Attach each attendance row to the outcome resolved for its name.
/// Rows whose name rejected, stayed unresolved, or never got a proposal
/// land in the unmatched list with a reason.
pub fn join_events(
    attendance: &[AttendanceRecord],
    resolutions: &[ResolvedIdentity],
) -> (Vec<JoinedEvent>, Vec<UnmatchedEvent>) {
    let by_name: HashMap<&str, &ResolvedIdentity> = resolutions
        .iter()
        .map(|r| (r.full_name_a.as_str(), r))
        .collect();

    let mut joined = Vec::new();
    let mut unmatched = Vec::new();
    for row in attendance {
        let Some(res) = by_name.get(row.full_name.as_str()) else {
            unmatched.push(unmatched_row(row, "no proposal row"));
            continue;
        };
        match &res.outcome {
            MatchOutcome::Resolved {
                email,
                matched_name_b,
                source,
                confidence,
                ..
            } => joined.push(JoinedEvent {
                full_name_a: row.full_name.clone(),
                matched_name_b: matched_name_b.clone(),
                email: email.clone(),
                event_name: row.event_name.clone(),
                credit_hours: row.credit_hours,
                match_score: *confidence,
                source: *source,
            }),
            MatchOutcome::Rejected => unmatched.push(unmatched_row(row, "rejected")),
            MatchOutcome::Unresolved => {
                let reason = res.flags.first().map_or("unresolved", |f| f.as_str());
                unmatched.push(unmatched_row(row, reason));
            }
        }
    }
    (joined, unmatched)
}

fn unmatched_row(row: &AttendanceRecord, reason: &str) -> UnmatchedEvent {
    UnmatchedEvent {
        full_name_a: row.full_name.clone(),
        event_name: row.event_name.clone(),
        credit_hours: row.credit_hours,
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Double-count removal
// ---------------------------------------------------------------------------

/// Collapse repeats of the same (email, event) pair so one person cannot
/// earn the same event twice through name variants. The highest match
/// score wins; the earlier row wins ties. Kept rows stay in input order.
pub fn dedup_events(events: &[JoinedEvent]) -> (Vec<JoinedEvent>, Vec<JoinedEvent>) {
    let mut best: BTreeMap<(String, String), usize> = BTreeMap::new();
    for (i, ev) in events.iter().enumerate() {
        let key = (email_key(&ev.email), ev.event_name.trim().to_lowercase());
        match best.get(&key) {
            Some(&j) if events[j].match_score >= ev.match_score => {}
            _ => {
                best.insert(key, i);
            }
        }
    }
    let keep: HashSet<usize> = best.into_values().collect();

    let mut kept = Vec::new();
    let mut removed = Vec::new();
    for (i, ev) in events.iter().enumerate() {
        if keep.contains(&i) {
            kept.push(ev.clone());
        } else {
            removed.push(ev.clone());
        }
    }
    (kept, removed)
}

// ---------------------------------------------------------------------------
// Master roll-up
// ---------------------------------------------------------------------------

/// Sum credit hours per email address. Roster detail rides along when the
/// email is known there; otherwise the joined row's names fill in.
/// Output is ordered by email key.
pub fn build_master(events: &[JoinedEvent], index: &RosterIndex<'_>) -> Vec<MasterRecord> {
    let mut by_email: BTreeMap<String, MasterRecord> = BTreeMap::new();
    for ev in events {
        let rec = by_email
            .entry(email_key(&ev.email))
            .or_insert_with(|| match index.by_email(&ev.email) {
                Some(entry) => MasterRecord {
                    display_name: entry.full_name.clone(),
                    email: entry.email.clone(),
                    total_credit_hours: 0.0,
                    category: entry.category.clone(),
                    subcategory: entry.subcategory.clone(),
                    country: entry.country.clone(),
                    cc_email: entry.cc_email.clone(),
                    first_conference: entry.first_conference,
                },
                None => MasterRecord {
                    display_name: if ev.matched_name_b.is_empty() {
                        ev.full_name_a.clone()
                    } else {
                        ev.matched_name_b.clone()
                    },
                    email: ev.email.clone(),
                    total_credit_hours: 0.0,
                    category: String::new(),
                    subcategory: String::new(),
                    country: String::new(),
                    cc_email: String::new(),
                    first_conference: false,
                },
            });
        rec.total_credit_hours += ev.credit_hours;
    }
    by_email.into_values().collect()
}

/// Split the master list on roster category, case-insensitively.
/// No category, or a blank one, keeps everything.
pub fn filter_by_category(
    master: Vec<MasterRecord>,
    category: Option<&str>,
) -> (Vec<MasterRecord>, Vec<MasterRecord>) {
    let Some(wanted) = category.map(str::trim).filter(|c| !c.is_empty()) else {
        return (master, Vec::new());
    };
    let mut kept = Vec::new();
    let mut excluded = Vec::new();
    for rec in master {
        if rec.category.trim().eq_ignore_ascii_case(wanted) {
            kept.push(rec);
        } else {
            excluded.push(rec);
        }
    }
    (kept, excluded)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
