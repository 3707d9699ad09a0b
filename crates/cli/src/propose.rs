//! `rollcall propose`: score attendance names against the roster and
//! write the review sheet.

use std::path::PathBuf;

use rollcall_engine::tables;

use crate::files::{load_config, read_file_as_utf8, write_text};
use crate::CliError;

pub fn cmd_propose(
    file_a: PathBuf,
    file_b: PathBuf,
    out_dir: PathBuf,
    config: Option<PathBuf>,
    min_score: Option<f64>,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let config = load_config(config.as_deref(), min_score, None)?;

    let attendance_text = read_file_as_utf8(&file_a)?;
    let roster_text = read_file_as_utf8(&file_b)?;
    let (attendance, skipped_a) =
        tables::parse_attendance(&attendance_text).map_err(CliError::engine)?;
    let (roster, skipped_b) = tables::parse_roster(&roster_text).map_err(CliError::engine)?;

    let result = rollcall_engine::propose(attendance, roster, &config).map_err(CliError::engine)?;

    std::fs::create_dir_all(&out_dir)
        .map_err(|e| CliError::io(format!("cannot create {}: {e}", out_dir.display())))?;

    let sheet_path = out_dir.join("proposed_matches.csv");
    let sheet = tables::write_proposals(&result.proposals).map_err(CliError::engine)?;
    write_text(&sheet_path, &sheet)?;
    if !quiet {
        eprintln!("wrote {}", sheet_path.display());
    }

    if !result.roster_collisions.is_empty() {
        let path = out_dir.join("roster_email_duplicates.csv");
        let report = tables::write_collisions(&result.roster_collisions).map_err(CliError::engine)?;
        write_text(&path, &report)?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if json {
        let rendered = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::error(format!("JSON serialization error: {e}")))?;
        println!("{rendered}");
    }

    if !quiet {
        if skipped_a > 0 || skipped_b > 0 {
            eprintln!("note: skipped {skipped_a} attendance row(s), {skipped_b} roster row(s)");
        }
        let s = &result.summary;
        eprintln!(
            "propose: {} unique name(s) from {} attendance row(s): {} certain, {} need review, {} without candidates",
            s.unique_names, s.attendance_rows, s.certain, s.needs_review, s.no_candidates,
        );
    }

    Ok(())
}
