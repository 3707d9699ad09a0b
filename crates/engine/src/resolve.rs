use std::collections::HashMap;

use crate::model::{
    email_key, MatchOutcome, MatchSource, Override, Proposal, ResolutionFlag, ResolvedIdentity,
    RosterEntry,
};

// ---------------------------------------------------------------------------
// Roster lookups
// ---------------------------------------------------------------------------

/// Email- and name-keyed views over the collapsed roster. The first entry
/// wins for a duplicated key, matching the collapse order.
pub struct RosterIndex<'a> {
    by_email: HashMap<String, &'a RosterEntry>,
    by_name: HashMap<String, &'a RosterEntry>,
}

impl<'a> RosterIndex<'a> {
    pub fn new(roster: &'a [RosterEntry]) -> Self {
        let mut by_email: HashMap<String, &'a RosterEntry> = HashMap::new();
        let mut by_name: HashMap<String, &'a RosterEntry> = HashMap::new();
        for entry in roster {
            let ek = email_key(&entry.email);
            if !ek.is_empty() {
                by_email.entry(ek).or_insert(entry);
            }
            let nk = name_key(&entry.full_name);
            if !nk.is_empty() {
                by_name.entry(nk).or_insert(entry);
            }
        }
        Self { by_email, by_name }
    }

    pub fn by_email(&self, email: &str) -> Option<&'a RosterEntry> {
        self.by_email.get(&email_key(email)).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&'a RosterEntry> {
        self.by_name.get(&name_key(name)).copied()
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Decision merge
// ---------------------------------------------------------------------------

struct Selection {
    email: String,
    matched_name_b: String,
    source: MatchSource,
    confidence: f64,
}

/// Merge reviewer decisions and overrides into one outcome per name.
///
/// Overrides are keyed by the exact FullName_A string; when a name repeats,
/// the last row wins. An override applies even when the proposal row was
/// left untouched, but never to a rejected row.
pub fn resolve_all(
    proposals: &[Proposal],
    overrides: &[Override],
    index: &RosterIndex<'_>,
) -> Vec<ResolvedIdentity> {
    let by_name: HashMap<&str, &Override> = overrides
        .iter()
        .map(|o| (o.full_name_a.as_str(), o))
        .collect();
    proposals
        .iter()
        .map(|p| resolve_one(p, by_name.get(p.full_name_a.as_str()).copied(), index))
        .collect()
}

pub fn resolve_one(
    proposal: &Proposal,
    override_row: Option<&Override>,
    index: &RosterIndex<'_>,
) -> ResolvedIdentity {
    let mut flags = Vec::new();

    let decision = proposal.decision.trim().to_ascii_uppercase();
    if decision == "REJECT" {
        return ResolvedIdentity {
            full_name_a: proposal.full_name_a.clone(),
            outcome: MatchOutcome::Rejected,
            flags,
        };
    }

    let selection = match select(proposal, &decision, override_row, index, &mut flags) {
        Some(sel) => sel,
        None => {
            return ResolvedIdentity {
                full_name_a: proposal.full_name_a.clone(),
                outcome: MatchOutcome::Unresolved,
                flags,
            }
        }
    };

    if selection.email.trim().is_empty() {
        flags.push(ResolutionFlag::NoEmail);
        return ResolvedIdentity {
            full_name_a: proposal.full_name_a.clone(),
            outcome: MatchOutcome::Unresolved,
            flags,
        };
    }

    // Attach the roster's display forms when the email is known there.
    let (email, matched_name_b, roster_found) = match index.by_email(&selection.email) {
        Some(entry) => (entry.email.clone(), entry.full_name.clone(), true),
        None => {
            flags.push(ResolutionFlag::EmailNotInRoster);
            (
                selection.email.trim().to_string(),
                selection.matched_name_b,
                false,
            )
        }
    };

    ResolvedIdentity {
        full_name_a: proposal.full_name_a.clone(),
        outcome: MatchOutcome::Resolved {
            email,
            matched_name_b,
            source: selection.source,
            confidence: selection.confidence,
            roster_found,
        },
        flags,
    }
}

/// Pull one email out of the row, in precedence order: override email,
/// override name, pick, chosen email, suggestion. Returns None when the
/// row stays unresolved; the reason is pushed onto `flags`.
fn select(
    proposal: &Proposal,
    decision: &str,
    override_row: Option<&Override>,
    index: &RosterIndex<'_>,
    flags: &mut Vec<ResolutionFlag>,
) -> Option<Selection> {
    if let Some(o) = override_row {
        let target = o.override_full_name_b.trim();
        let email = o.override_email.trim();
        if !email.is_empty() {
            if !target.is_empty() {
                flags.push(ResolutionFlag::OverrideConflict);
            }
            return Some(Selection {
                email: email.to_string(),
                matched_name_b: target.to_string(),
                source: MatchSource::OverrideEmail,
                confidence: 1.0,
            });
        }
        if !target.is_empty() {
            return match index.by_name(target) {
                Some(entry) => Some(Selection {
                    email: entry.email.clone(),
                    matched_name_b: entry.full_name.clone(),
                    source: MatchSource::OverrideName,
                    confidence: 1.0,
                }),
                None => {
                    flags.push(ResolutionFlag::OverrideNameNotFound);
                    None
                }
            };
        }
        // both fields blank: nothing to apply
    }

    let pick = proposal.pick.trim();
    let accepted = decision == "ACCEPT" || (decision.is_empty() && !pick.is_empty());
    if !accepted {
        flags.push(if decision.is_empty() {
            ResolutionFlag::NoDecision
        } else {
            ResolutionFlag::InvalidDecision
        });
        return None;
    }

    let picked_rank = match pick {
        "1" => Some((1, MatchSource::Pick1)),
        "2" => Some((2, MatchSource::Pick2)),
        "3" => Some((3, MatchSource::Pick3)),
        _ => None,
    };
    if let Some((rank, source)) = picked_rank {
        return match proposal.slot(rank) {
            Some(slot) if !slot.email.trim().is_empty() => Some(Selection {
                email: slot.email.clone(),
                matched_name_b: slot.name.clone(),
                source,
                confidence: slot.score,
            }),
            _ => {
                flags.push(ResolutionFlag::PickOutOfRange);
                None
            }
        };
    }
    if !pick.is_empty() {
        // any other pick text is a literal email address
        return Some(Selection {
            email: pick.to_string(),
            matched_name_b: String::new(),
            source: MatchSource::PickEmail,
            confidence: 1.0,
        });
    }

    let chosen = proposal.chosen_email.trim();
    if !chosen.is_empty() {
        return Some(Selection {
            email: chosen.to_string(),
            matched_name_b: String::new(),
            source: MatchSource::ChosenEmail,
            confidence: 1.0,
        });
    }

    match &proposal.top1 {
        Some(slot) if !slot.email.trim().is_empty() => Some(Selection {
            email: slot.email.clone(),
            matched_name_b: slot.name.clone(),
            source: MatchSource::Suggested,
            confidence: slot.score,
        }),
        _ => {
            flags.push(ResolutionFlag::NoSuggestion);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
