//! `rollcall apply`: fold the reviewed sheet and any overrides back in,
//! join events, and write the final credit totals.

use std::path::PathBuf;

use rollcall_engine::tables;

use crate::exit_codes::EXIT_REVIEW_INCOMPLETE;
use crate::files::{load_config, read_file_as_utf8, write_text};
use crate::CliError;

#[allow(clippy::too_many_arguments)]
pub fn cmd_apply(
    file_a: PathBuf,
    file_b: PathBuf,
    decisions: Option<PathBuf>,
    overrides: Option<PathBuf>,
    out_dir: PathBuf,
    config: Option<PathBuf>,
    min_score: Option<f64>,
    category: Option<String>,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let config = load_config(config.as_deref(), min_score, category)?;

    let attendance_text = read_file_as_utf8(&file_a)?;
    let roster_text = read_file_as_utf8(&file_b)?;
    let (attendance, skipped_a) =
        tables::parse_attendance(&attendance_text).map_err(CliError::engine)?;
    let (roster, skipped_b) = tables::parse_roster(&roster_text).map_err(CliError::engine)?;

    let decisions_path = decisions.unwrap_or_else(|| out_dir.join("proposed_matches.csv"));
    if !decisions_path.exists() {
        return Err(CliError::args(format!(
            "decisions file not found: {}",
            decisions_path.display()
        ))
        .with_hint("run `rollcall propose` first, or point --decisions at the reviewed sheet"));
    }
    let decisions_text = read_file_as_utf8(&decisions_path)?;
    let (proposals, skipped_d) =
        tables::parse_proposals(&decisions_text).map_err(CliError::engine)?;

    let (override_rows, skipped_o) = match &overrides {
        Some(path) => {
            let text = read_file_as_utf8(path)?;
            tables::parse_overrides(&text).map_err(CliError::engine)?
        }
        None => (Vec::new(), 0),
    };

    let result = rollcall_engine::apply(attendance, roster, proposals, override_rows, &config)
        .map_err(CliError::engine)?;

    // Every output lands on disk before the exit-code gate so a failed
    // gate still leaves the diagnostics behind.
    std::fs::create_dir_all(&out_dir)
        .map_err(|e| CliError::io(format!("cannot create {}: {e}", out_dir.display())))?;
    let write_csv = |name: &str, text: String| -> Result<(), CliError> {
        let path = out_dir.join(name);
        write_text(&path, &text)?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
        Ok(())
    };

    write_csv(
        "master_list.csv",
        tables::write_master(&result.master).map_err(CliError::engine)?,
    )?;
    write_csv(
        "joined_events.csv",
        tables::write_joined_events(&result.joined_events).map_err(CliError::engine)?,
    )?;
    write_csv(
        "joined_events_pre_overrides.csv",
        tables::write_joined_events(&result.joined_events_pre_overrides)
            .map_err(CliError::engine)?,
    )?;
    write_csv(
        "unmatched_needs_email.csv",
        tables::write_unmatched(&result.unmatched).map_err(CliError::engine)?,
    )?;
    if !result.duplicates_removed.is_empty() {
        write_csv(
            "duplicates_removed_same_email_event.csv",
            tables::write_joined_events(&result.duplicates_removed).map_err(CliError::engine)?,
        )?;
    }
    if !result.excluded_by_category.is_empty() {
        write_csv(
            "excluded_by_category.csv",
            tables::write_master(&result.excluded_by_category).map_err(CliError::engine)?,
        )?;
    }
    if !result.roster_collisions.is_empty() {
        write_csv(
            "roster_email_duplicates.csv",
            tables::write_collisions(&result.roster_collisions).map_err(CliError::engine)?,
        )?;
    }
    if json {
        let rendered = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::error(format!("JSON serialization error: {e}")))?;
        println!("{rendered}");
    }

    if !quiet {
        let skipped = skipped_a + skipped_b + skipped_d + skipped_o;
        if skipped > 0 {
            eprintln!(
                "note: skipped {skipped_a} attendance, {skipped_b} roster, {skipped_d} decision, {skipped_o} override row(s)"
            );
        }
        let s = &result.summary;
        eprintln!(
            "apply: {} name(s): {} resolved, {} rejected, {} unresolved; {} event(s) credited, {} duplicate(s) removed, {} unmatched",
            s.unique_names,
            s.resolved,
            s.rejected,
            s.unresolved,
            s.joined_events,
            s.duplicate_events_removed,
            s.unmatched_events,
        );
        eprintln!(
            "master: {} person(s), {:.2} credit hour(s) total",
            s.master_records, s.total_credit_hours
        );
    }

    if result.summary.unresolved > 0 {
        return Err(CliError {
            code: EXIT_REVIEW_INCOMPLETE,
            message: format!("{} name(s) still unresolved", result.summary.unresolved),
            hint: Some(
                "fill Decision/Pick in the proposals sheet or add an override, then re-run"
                    .to_string(),
            ),
        });
    }

    Ok(())
}
