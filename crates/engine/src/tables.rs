//! CSV codecs for every table the pipeline reads or writes. All of them
//! operate on strings; file handling stays with the caller.

use std::collections::HashSet;

use crate::error::EngineError;
use crate::model::{
    AttendanceRecord, CandidateSlot, JoinedEvent, MasterRecord, Override, Proposal,
    RosterCollision, RosterEntry, UnmatchedEvent,
};

/// Column order of the review sheet. The apply side accepts this exact
/// shape back, headers matched case-insensitively.
pub const PROPOSAL_HEADERS: [&str; 15] = [
    "FullName_A",
    "Top1_Name_B",
    "Top1_Email",
    "Top1_Score",
    "Top2_Name_B",
    "Top2_Email",
    "Top2_Score",
    "Top3_Name_B",
    "Top3_Email",
    "Top3_Score",
    "Suggested_Email",
    "Certain",
    "Decision",
    "Pick",
    "Chosen_Email",
];

pub const MASTER_HEADERS: [&str; 8] = [
    "DisplayName",
    "Email",
    "TotalCreditHours",
    "Category",
    "Subcategory",
    "Country",
    "CC_Email",
    "First_Conference",
];

fn csv_err(table: &str, e: impl std::fmt::Display) -> EngineError {
    EngineError::Csv {
        table: table.to_string(),
        detail: e.to_string(),
    }
}

fn truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1"
    )
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

fn reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes())
}

/// Attendance log: FullName, CreditHours, EventName by position. Rows with
/// a blank name or an unusable hours value are skipped and counted, never
/// fatal; a header with fewer than three columns is.
pub fn parse_attendance(text: &str) -> Result<(Vec<AttendanceRecord>, usize), EngineError> {
    let mut reader = reader(text);
    let width = reader.headers().map_err(|e| csv_err("attendance", e))?.len();
    if width < 3 {
        return Err(EngineError::MalformedInput {
            table: "attendance".to_string(),
            detail: format!("expected at least 3 columns, found {width}"),
        });
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| csv_err("attendance", e))?;
        if record.len() < 3 {
            skipped += 1;
            continue;
        }
        let full_name = record.get(0).unwrap_or("").trim().to_string();
        if full_name.is_empty() {
            skipped += 1;
            continue;
        }
        let credit_hours = match record.get(1).unwrap_or("").trim().parse::<f64>() {
            Ok(h) if h.is_finite() && h >= 0.0 => h,
            _ => {
                skipped += 1;
                continue;
            }
        };
        rows.push(AttendanceRecord {
            full_name,
            credit_hours,
            event_name: record.get(2).unwrap_or("").trim().to_string(),
        });
    }
    Ok((rows, skipped))
}

/// Registration roster: Category, Subcategory, FullName, Country, Email,
/// CCEmail, FirstConference by position. A row is skipped only when both
/// the name and the email are blank.
pub fn parse_roster(text: &str) -> Result<(Vec<RosterEntry>, usize), EngineError> {
    let mut reader = reader(text);
    let width = reader.headers().map_err(|e| csv_err("roster", e))?.len();
    if width < 7 {
        return Err(EngineError::MalformedInput {
            table: "roster".to_string(),
            detail: format!("expected at least 7 columns, found {width}"),
        });
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| csv_err("roster", e))?;
        let field = |i: usize| record.get(i).unwrap_or("").trim().to_string();
        let full_name = field(2);
        let email = field(4);
        if full_name.is_empty() && email.is_empty() {
            skipped += 1;
            continue;
        }
        rows.push(RosterEntry {
            category: field(0),
            subcategory: field(1),
            full_name,
            country: field(3),
            email,
            cc_email: field(5),
            first_conference: truthy(record.get(6).unwrap_or("")),
        });
    }
    Ok((rows, skipped))
}

/// Manual overrides, matched by header name: FullName_A plus
/// Override_FullName_B and/or Override_Email. Rows carrying neither
/// override value are skipped.
pub fn parse_overrides(text: &str) -> Result<(Vec<Override>, usize), EngineError> {
    let mut reader = reader(text);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_err("overrides", e))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let find = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));

    let name_idx = find(&["fullname_a", "full_name_a"]).ok_or_else(|| EngineError::SchemaMismatch {
        table: "overrides".to_string(),
        missing: vec!["FullName_A".to_string()],
    })?;
    let target_idx = find(&["override_fullname_b", "override_full_name_b"]);
    let email_idx = find(&["override_email"]);

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| csv_err("overrides", e))?;
        let get = |i: Option<usize>| {
            i.and_then(|i| record.get(i))
                .unwrap_or("")
                .trim()
                .to_string()
        };
        let full_name_a = record.get(name_idx).unwrap_or("").trim().to_string();
        let override_full_name_b = get(target_idx);
        let override_email = get(email_idx);
        if full_name_a.is_empty() || (override_full_name_b.is_empty() && override_email.is_empty())
        {
            skipped += 1;
            continue;
        }
        rows.push(Override {
            full_name_a,
            override_full_name_b,
            override_email,
        });
    }
    Ok((rows, skipped))
}

/// The edited review sheet coming back from a human. All fifteen columns
/// must be present; extra columns and any column order are tolerated.
/// Repeated FullName_A rows keep the first occurrence.
pub fn parse_proposals(text: &str) -> Result<(Vec<Proposal>, usize), EngineError> {
    let mut reader = reader(text);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_err("proposals", e))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut idx = [0usize; PROPOSAL_HEADERS.len()];
    let mut missing: Vec<String> = Vec::new();
    for (slot, name) in PROPOSAL_HEADERS.iter().enumerate() {
        match headers.iter().position(|h| h == &name.to_lowercase()) {
            Some(i) => idx[slot] = i,
            None => missing.push((*name).to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(EngineError::SchemaMismatch {
            table: "proposals".to_string(),
            missing,
        });
    }

    let mut rows = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| csv_err("proposals", e))?;
        let get = |slot: usize| record.get(idx[slot]).unwrap_or("").trim().to_string();
        let slot_at = |name_slot: usize| -> Option<CandidateSlot> {
            let name = get(name_slot);
            let email = get(name_slot + 1);
            let score_raw = get(name_slot + 2);
            if name.is_empty() && email.is_empty() && score_raw.is_empty() {
                return None;
            }
            Some(CandidateSlot {
                name,
                email,
                score: score_raw.parse().unwrap_or(0.0),
            })
        };

        let full_name_a = get(0);
        if full_name_a.is_empty() || !seen.insert(full_name_a.clone()) {
            skipped += 1;
            continue;
        }
        rows.push(Proposal {
            full_name_a,
            top1: slot_at(1),
            top2: slot_at(4),
            top3: slot_at(7),
            suggested_email: get(10),
            certain: truthy(&get(11)),
            decision: get(12),
            pick: get(13),
            chosen_email: get(14),
        });
    }
    Ok((rows, skipped))
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn finish(wtr: csv::Writer<Vec<u8>>, table: &str) -> Result<String, EngineError> {
    let bytes = wtr.into_inner().map_err(|e| csv_err(table, e))?;
    String::from_utf8(bytes).map_err(|e| csv_err(table, e))
}

pub fn write_proposals(proposals: &[Proposal]) -> Result<String, EngineError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(PROPOSAL_HEADERS)
        .map_err(|e| csv_err("proposals", e))?;
    for p in proposals {
        let slot = |s: &Option<CandidateSlot>| match s {
            Some(c) => (c.name.clone(), c.email.clone(), format!("{:.3}", c.score)),
            None => (String::new(), String::new(), String::new()),
        };
        let (n1, e1, s1) = slot(&p.top1);
        let (n2, e2, s2) = slot(&p.top2);
        let (n3, e3, s3) = slot(&p.top3);
        wtr.write_record([
            p.full_name_a.as_str(),
            &n1,
            &e1,
            &s1,
            &n2,
            &e2,
            &s2,
            &n3,
            &e3,
            &s3,
            &p.suggested_email,
            if p.certain { "true" } else { "false" },
            &p.decision,
            &p.pick,
            &p.chosen_email,
        ])
        .map_err(|e| csv_err("proposals", e))?;
    }
    finish(wtr, "proposals")
}

pub fn write_master(records: &[MasterRecord]) -> Result<String, EngineError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(MASTER_HEADERS)
        .map_err(|e| csv_err("master", e))?;
    for r in records {
        wtr.write_record([
            r.display_name.as_str(),
            &r.email,
            &format!("{:.2}", r.total_credit_hours),
            &r.category,
            &r.subcategory,
            &r.country,
            &r.cc_email,
            if r.first_conference { "true" } else { "false" },
        ])
        .map_err(|e| csv_err("master", e))?;
    }
    finish(wtr, "master")
}

pub fn write_joined_events(events: &[JoinedEvent]) -> Result<String, EngineError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "FullName_A",
        "MatchedName_B",
        "Email",
        "EventName",
        "CreditHours",
        "MatchScore",
        "MatchSource",
    ])
    .map_err(|e| csv_err("joined events", e))?;
    for ev in events {
        wtr.write_record([
            ev.full_name_a.as_str(),
            &ev.matched_name_b,
            &ev.email,
            &ev.event_name,
            &format!("{:.2}", ev.credit_hours),
            &format!("{:.3}", ev.match_score),
            ev.source.as_str(),
        ])
        .map_err(|e| csv_err("joined events", e))?;
    }
    finish(wtr, "joined events")
}

pub fn write_unmatched(events: &[UnmatchedEvent]) -> Result<String, EngineError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["FullName_A", "EventName", "CreditHours", "Reason"])
        .map_err(|e| csv_err("unmatched", e))?;
    for ev in events {
        wtr.write_record([
            ev.full_name_a.as_str(),
            &ev.event_name,
            &format!("{:.2}", ev.credit_hours),
            &ev.reason,
        ])
        .map_err(|e| csv_err("unmatched", e))?;
    }
    finish(wtr, "unmatched")
}

pub fn write_collisions(collisions: &[RosterCollision]) -> Result<String, EngineError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["Email", "Count"])
        .map_err(|e| csv_err("roster collisions", e))?;
    for c in collisions {
        wtr.write_record([c.email.as_str(), &c.count.to_string()])
            .map_err(|e| csv_err("roster collisions", e))?;
    }
    finish(wtr, "roster collisions")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
