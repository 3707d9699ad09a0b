//! The two pipeline entry points. `propose` turns the raw tables into a
//! review sheet; `apply` folds the reviewed sheet and any overrides back
//! in and produces the final credit totals.

use crate::aggregate;
use crate::clean::{collapse_roster, dedup_attendance};
use crate::config::MatchConfig;
use crate::error::EngineError;
use crate::model::{
    ApplyResult, ApplySummary, AttendanceRecord, MatchOutcome, Override, Proposal, ProposeResult,
    ProposeSummary, RosterEntry, RunMeta,
};
use crate::normalize::NameNormalizer;
use crate::rank::build_proposals;
use crate::resolve::{resolve_all, RosterIndex};
use crate::score::NameScorer;

pub fn propose(
    attendance: Vec<AttendanceRecord>,
    roster: Vec<RosterEntry>,
    config: &MatchConfig,
) -> Result<ProposeResult, EngineError> {
    config.validate()?;

    let attendance_rows = attendance.len();
    let (attendance, attendance_duplicates_removed) = dedup_attendance(attendance);
    let roster_rows = roster.len();
    let (roster, roster_collisions) = collapse_roster(roster);
    let roster_duplicates_removed: usize = roster_collisions.iter().map(|c| c.count - 1).sum();

    let normalizer = NameNormalizer::new(config.nickname_table());
    let scorer = NameScorer::new(config.weights.clone(), config.matching.absolute_token_cap);
    let roster_norms: Vec<_> = roster
        .iter()
        .map(|e| normalizer.normalize(&e.full_name))
        .collect();

    let proposals = build_proposals(
        &attendance,
        &roster,
        &roster_norms,
        &normalizer,
        &scorer,
        config.matching.min_score,
    );

    let certain = proposals.iter().filter(|p| p.certain).count();
    let summary = ProposeSummary {
        attendance_rows,
        attendance_duplicates_removed,
        roster_rows,
        roster_duplicates_removed,
        unique_names: proposals.len(),
        certain,
        needs_review: proposals.len() - certain,
        no_candidates: proposals.iter().filter(|p| p.top1.is_none()).count(),
    };

    Ok(ProposeResult {
        meta: RunMeta::new(config),
        summary,
        proposals,
        roster_collisions,
    })
}

pub fn apply(
    attendance: Vec<AttendanceRecord>,
    roster: Vec<RosterEntry>,
    proposals: Vec<Proposal>,
    overrides: Vec<Override>,
    config: &MatchConfig,
) -> Result<ApplyResult, EngineError> {
    config.validate()?;

    let (attendance, _) = dedup_attendance(attendance);
    let (roster, roster_collisions) = collapse_roster(roster);
    let index = RosterIndex::new(&roster);

    // The join as the auto matcher left it: certain rows keep their
    // pre-filled acceptance, every other review cell is cleared.
    let machine_sheet: Vec<Proposal> = proposals
        .iter()
        .map(|p| {
            let mut auto = p.clone();
            if auto.certain {
                auto.decision = "ACCEPT".to_string();
                auto.pick = "1".to_string();
            } else {
                auto.decision = String::new();
                auto.pick = String::new();
            }
            auto.chosen_email = String::new();
            auto
        })
        .collect();
    let auto_resolutions = resolve_all(&machine_sheet, &[], &index);
    let joined_events_pre_overrides = aggregate::join_events(&attendance, &auto_resolutions).0;

    let resolutions = resolve_all(&proposals, &overrides, &index);
    let (joined_raw, unmatched) = aggregate::join_events(&attendance, &resolutions);
    let (joined_events, duplicates_removed) = aggregate::dedup_events(&joined_raw);
    let master_all = aggregate::build_master(&joined_events, &index);
    let (master, excluded_by_category) =
        aggregate::filter_by_category(master_all, config.matching.category.as_deref());

    let summary = ApplySummary {
        unique_names: resolutions.len(),
        resolved: resolutions.iter().filter(|r| r.is_resolved()).count(),
        rejected: resolutions
            .iter()
            .filter(|r| r.outcome == MatchOutcome::Rejected)
            .count(),
        unresolved: resolutions
            .iter()
            .filter(|r| r.outcome == MatchOutcome::Unresolved)
            .count(),
        flagged: resolutions.iter().filter(|r| !r.flags.is_empty()).count(),
        joined_events: joined_events.len(),
        duplicate_events_removed: duplicates_removed.len(),
        unmatched_events: unmatched.len(),
        excluded_by_category: excluded_by_category.len(),
        master_records: master.len(),
        total_credit_hours: master.iter().map(|r| r.total_credit_hours).sum(),
    };

    Ok(ApplyResult {
        meta: RunMeta::new(config),
        summary,
        master,
        resolutions,
        joined_events,
        joined_events_pre_overrides,
        duplicates_removed,
        unmatched,
        excluded_by_category,
        roster_collisions,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
