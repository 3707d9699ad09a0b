use std::collections::{HashMap, HashSet};

use crate::model::{email_key, AttendanceRecord, RosterCollision, RosterEntry};

/// Drop exact repeats of (name, hours, event); the text fields compare
/// trimmed and case-insensitively. Kept rows stay in input order.
pub fn dedup_attendance(rows: Vec<AttendanceRecord>) -> (Vec<AttendanceRecord>, usize) {
    let mut seen: HashSet<(String, u64, String)> = HashSet::new();
    let mut kept = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;
    for row in rows {
        let key = (
            row.full_name.trim().to_lowercase(),
            row.credit_hours.to_bits(),
            row.event_name.trim().to_lowercase(),
        );
        if seen.insert(key) {
            kept.push(row);
        } else {
            dropped += 1;
        }
    }
    (kept, dropped)
}

/// Keep the first roster row per email address and report the addresses
/// that appeared more than once. Rows without an email pass through.
pub fn collapse_roster(rows: Vec<RosterEntry>) -> (Vec<RosterEntry>, Vec<RosterCollision>) {
    let mut counts: HashMap<String, (String, usize)> = HashMap::new();
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        let key = email_key(&row.email);
        if key.is_empty() {
            kept.push(row);
            continue;
        }
        match counts.get_mut(&key) {
            Some((_, n)) => *n += 1,
            None => {
                counts.insert(key, (row.email.trim().to_string(), 1));
                kept.push(row);
            }
        }
    }
    let mut collisions: Vec<RosterCollision> = counts
        .into_values()
        .filter(|(_, n)| *n > 1)
        .map(|(email, count)| RosterCollision { email, count })
        .collect();
    collisions.sort_by(|a, b| a.email.cmp(&b.email));
    (kept, collisions)
}
