use serde::Serialize;

use crate::config::MatchConfig;

// ---------------------------------------------------------------------------
// Input tables
// ---------------------------------------------------------------------------

/// One attendance row (File A, first three columns).
#[derive(Debug, Clone)]
pub struct AttendanceRecord {
    pub full_name: String,
    pub credit_hours: f64,
    pub event_name: String,
}

/// One registration row (File B, first seven columns).
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub category: String,
    pub subcategory: String,
    pub full_name: String,
    pub country: String,
    pub email: String,
    pub cc_email: String,
    pub first_conference: bool,
}

/// Canonical identity key for an email address. Two addresses with the
/// same key are the same person; display casing is preserved elsewhere.
pub fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Candidates + proposals
// ---------------------------------------------------------------------------

/// One scored roster candidate for a File-A name.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub source_name: String,
    pub candidate_name: String,
    pub candidate_email: String,
    pub score: f64,
    pub roster_index: usize,
}

/// A ranked candidate as it appears in a review row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSlot {
    pub name: String,
    pub email: String,
    pub score: f64,
}

/// One review row: a File-A name, its ranked candidates, and the columns
/// a reviewer fills in (`decision`, `pick`, `chosen_email`). Certain rows
/// come back pre-accepted with the lower slots blanked.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Proposal {
    pub full_name_a: String,
    pub top1: Option<CandidateSlot>,
    pub top2: Option<CandidateSlot>,
    pub top3: Option<CandidateSlot>,
    pub suggested_email: String,
    pub certain: bool,
    pub decision: String,
    pub pick: String,
    pub chosen_email: String,
}

impl Proposal {
    /// Candidate slot by 1-based rank.
    pub fn slot(&self, rank: usize) -> Option<&CandidateSlot> {
        match rank {
            1 => self.top1.as_ref(),
            2 => self.top2.as_ref(),
            3 => self.top3.as_ref(),
            _ => None,
        }
    }
}

/// One manual override row. Empty fields mean "not specified";
/// `override_email` outranks `override_full_name_b`.
#[derive(Debug, Clone, Default)]
pub struct Override {
    pub full_name_a: String,
    pub override_full_name_b: String,
    pub override_email: String,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Which rule produced a resolved identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchSource {
    #[serde(rename = "PICK_1")]
    Pick1,
    #[serde(rename = "PICK_2")]
    Pick2,
    #[serde(rename = "PICK_3")]
    Pick3,
    #[serde(rename = "PICK_EMAIL")]
    PickEmail,
    #[serde(rename = "CHOSEN_EMAIL")]
    ChosenEmail,
    #[serde(rename = "SUGGESTED")]
    Suggested,
    #[serde(rename = "OVERRIDE_EMAIL")]
    OverrideEmail,
    #[serde(rename = "OVERRIDE_NAME")]
    OverrideName,
}

impl MatchSource {
    /// Source for a numeric pick (1-based rank).
    pub fn pick(rank: usize) -> Option<MatchSource> {
        match rank {
            1 => Some(Self::Pick1),
            2 => Some(Self::Pick2),
            3 => Some(Self::Pick3),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pick1 => "PICK_1",
            Self::Pick2 => "PICK_2",
            Self::Pick3 => "PICK_3",
            Self::PickEmail => "PICK_EMAIL",
            Self::ChosenEmail => "CHOSEN_EMAIL",
            Self::Suggested => "SUGGESTED",
            Self::OverrideEmail => "OVERRIDE_EMAIL",
            Self::OverrideName => "OVERRIDE_NAME",
        }
    }
}

impl std::fmt::Display for MatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-row anomaly markers. None of these abort a run; they surface in
/// diagnostics and summary counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionFlag {
    /// Both override fields were present; the email was used.
    OverrideConflict,
    /// Override named a person not found in the roster.
    OverrideNameNotFound,
    /// Pick referenced an empty or missing candidate slot.
    PickOutOfRange,
    /// Accepted but no candidate email to fall back on.
    NoSuggestion,
    /// The selected identity has no email address.
    NoEmail,
    /// Neither a decision nor a pick was provided.
    NoDecision,
    /// Decision was something other than ACCEPT or REJECT.
    InvalidDecision,
    /// The selected email does not appear in the roster.
    EmailNotInRoster,
}

impl ResolutionFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OverrideConflict => "OVERRIDE_CONFLICT",
            Self::OverrideNameNotFound => "OVERRIDE_NAME_NOT_FOUND",
            Self::PickOutOfRange => "PICK_OUT_OF_RANGE",
            Self::NoSuggestion => "NO_SUGGESTION",
            Self::NoEmail => "NO_EMAIL",
            Self::NoDecision => "NO_DECISION",
            Self::InvalidDecision => "INVALID_DECISION",
            Self::EmailNotInRoster => "EMAIL_NOT_IN_ROSTER",
        }
    }
}

/// Final state of one File-A name after decisions and overrides merge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    Resolved {
        email: String,
        matched_name_b: String,
        source: MatchSource,
        confidence: f64,
        roster_found: bool,
    },
    Rejected,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedIdentity {
    pub full_name_a: String,
    #[serde(flatten)]
    pub outcome: MatchOutcome,
    pub flags: Vec<ResolutionFlag>,
}

impl ResolvedIdentity {
    pub fn is_resolved(&self) -> bool {
        matches!(self.outcome, MatchOutcome::Resolved { .. })
    }
}

// ---------------------------------------------------------------------------
// Merge outputs
// ---------------------------------------------------------------------------

/// One attendance event joined to its resolved identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedEvent {
    pub full_name_a: String,
    pub matched_name_b: String,
    pub email: String,
    pub event_name: String,
    pub credit_hours: f64,
    pub match_score: f64,
    pub source: MatchSource,
}

/// An attendance event that could not be credited to anyone.
#[derive(Debug, Clone, Serialize)]
pub struct UnmatchedEvent {
    pub full_name_a: String,
    pub event_name: String,
    pub credit_hours: f64,
    pub reason: String,
}

/// Final per-person record, keyed by email.
#[derive(Debug, Clone, Serialize)]
pub struct MasterRecord {
    pub display_name: String,
    pub email: String,
    pub total_credit_hours: f64,
    pub category: String,
    pub subcategory: String,
    pub country: String,
    pub cc_email: String,
    pub first_conference: bool,
}

/// A roster email that appeared on more than one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterCollision {
    pub email: String,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Summary + results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ProposeSummary {
    pub attendance_rows: usize,
    pub attendance_duplicates_removed: usize,
    pub roster_rows: usize,
    pub roster_duplicates_removed: usize,
    pub unique_names: usize,
    pub certain: usize,
    pub needs_review: usize,
    pub no_candidates: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplySummary {
    pub unique_names: usize,
    pub resolved: usize,
    pub rejected: usize,
    pub unresolved: usize,
    pub flagged: usize,
    pub joined_events: usize,
    pub duplicate_events_removed: usize,
    pub unmatched_events: usize,
    pub excluded_by_category: usize,
    pub master_records: usize,
    pub total_credit_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub engine_version: String,
    pub run_at: String,
    pub min_score: f64,
    pub category: Option<String>,
}

impl RunMeta {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            min_score: config.matching.min_score,
            category: config.matching.category.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProposeResult {
    pub meta: RunMeta,
    pub summary: ProposeSummary,
    pub proposals: Vec<Proposal>,
    pub roster_collisions: Vec<RosterCollision>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplyResult {
    pub meta: RunMeta,
    pub summary: ApplySummary,
    pub master: Vec<MasterRecord>,
    pub resolutions: Vec<ResolvedIdentity>,
    pub joined_events: Vec<JoinedEvent>,
    pub joined_events_pre_overrides: Vec<JoinedEvent>,
    pub duplicates_removed: Vec<JoinedEvent>,
    pub unmatched: Vec<UnmatchedEvent>,
    pub excluded_by_category: Vec<MasterRecord>,
    pub roster_collisions: Vec<RosterCollision>,
}
