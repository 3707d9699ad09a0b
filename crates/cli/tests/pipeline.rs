//! End-to-end tests for the `rollcall` binary.
//!
//! Each test drives the compiled binary against CSV fixtures in a temp
//! directory and checks the files and exit codes that come back.

use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

fn rollcall() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rollcall"))
}

fn write(path: &Path, text: &str) {
    std::fs::write(path, text).unwrap();
}

fn read(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).unwrap()
}

const ATTENDANCE: &str = "\
FullName,CreditHours,EventName
Mary Watson,1.5,Opening Keynote
Mary Watson,2.0,Ethics Workshop
Carlos Ruiz,1.0,Opening Keynote
";

const ROSTER: &str = "\
Category,Subcategory,FullName,Country,Email,CCEmail,FirstConference
Member,Chapter A,Mary Watson,US,mary@example.com,,no
Member,Chapter B,Carlos Ruiz,BR,carlos@example.com,,yes
";

#[test]
fn propose_then_apply_totals_exact_matches() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("attendance.csv");
    let b = dir.path().join("roster.csv");
    write(&a, ATTENDANCE);
    write(&b, ROSTER);

    let status = rollcall()
        .arg("propose")
        .arg(&a)
        .arg(&b)
        .arg("--out-dir")
        .arg(dir.path())
        .status()
        .unwrap();
    assert!(status.success());

    let sheet = read(dir.path(), "proposed_matches.csv");
    assert!(sheet.contains("Mary Watson,Mary Watson,mary@example.com,1.000"));
    assert!(sheet.contains("ACCEPT"));

    let output = rollcall()
        .arg("apply")
        .arg(&a)
        .arg(&b)
        .arg("--out-dir")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let master = read(dir.path(), "master_list.csv");
    assert!(master.contains("Mary Watson,mary@example.com,3.50,Member,Chapter A,US,,false"));
    assert!(master.contains("Carlos Ruiz,carlos@example.com,1.00,Member,Chapter B,BR,,true"));
}

#[test]
fn apply_exits_six_while_names_are_unresolved() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("attendance.csv");
    let b = dir.path().join("roster.csv");
    write(&a, "FullName,CreditHours,EventName\nJ Q Smithers,1.0,Opening Keynote\n");
    write(&b, ROSTER);

    let status = rollcall()
        .arg("propose")
        .arg(&a)
        .arg(&b)
        .arg("--out-dir")
        .arg(dir.path())
        .status()
        .unwrap();
    assert!(status.success());

    let output = rollcall()
        .arg("apply")
        .arg(&a)
        .arg(&b)
        .arg("--out-dir")
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unresolved"));

    // the gate fires after the outputs land
    assert!(dir.path().join("master_list.csv").exists());
    assert!(read(dir.path(), "unmatched_needs_email.csv").contains("J Q Smithers"));
}

#[test]
fn apply_without_a_sheet_is_a_usage_error() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("attendance.csv");
    let b = dir.path().join("roster.csv");
    write(&a, ATTENDANCE);
    write(&b, ROSTER);

    let output = rollcall()
        .arg("apply")
        .arg(&a)
        .arg(&b)
        .arg("--out-dir")
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("decisions file not found"));
}

#[test]
fn validate_checks_a_settings_file() {
    let dir = tempdir().unwrap();
    let bad = dir.path().join("bad.toml");
    write(&bad, "[match]\nmin_score = 1.5\n");
    let output = rollcall().arg("validate").arg(&bad).output().unwrap();
    assert_eq!(output.status.code(), Some(4));

    let good = dir.path().join("good.toml");
    write(&good, "[match]\nmin_score = 0.9\n");
    let output = rollcall().arg("validate").arg(&good).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("valid:"));
}

#[test]
fn overrides_rescue_a_name_the_roster_cannot_match() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("attendance.csv");
    let b = dir.path().join("roster.csv");
    write(
        &a,
        "FullName,CreditHours,EventName\nMary Watson,1.5,Opening Keynote\nZz Qq,2.0,Opening Keynote\n",
    );
    write(&b, ROSTER);

    let status = rollcall()
        .arg("propose")
        .arg(&a)
        .arg(&b)
        .arg("--out-dir")
        .arg(dir.path())
        .status()
        .unwrap();
    assert!(status.success());

    let fixes = dir.path().join("fixes.csv");
    write(
        &fixes,
        "FullName_A,Override_FullName_B,Override_Email\nZz Qq,,zz@example.com\n",
    );

    let output = rollcall()
        .arg("apply")
        .arg(&a)
        .arg(&b)
        .arg("--overrides")
        .arg(&fixes)
        .arg("--out-dir")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let master = read(dir.path(), "master_list.csv");
    assert!(master.contains("mary@example.com,1.50"));
    assert!(master.contains("zz@example.com,2.00"));

    // the audit join shows what the run looked like before overrides
    let before = read(dir.path(), "joined_events_pre_overrides.csv");
    assert!(before.contains("mary@example.com"));
    assert!(!before.contains("zz@example.com"));
}

#[test]
fn json_flag_prints_the_full_result_on_stdout() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("attendance.csv");
    let b = dir.path().join("roster.csv");
    write(&a, ATTENDANCE);
    write(&b, ROSTER);

    let output = rollcall()
        .arg("propose")
        .arg(&a)
        .arg(&b)
        .arg("--out-dir")
        .arg(dir.path())
        .arg("--json")
        .arg("-q")
        .output()
        .unwrap();
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["summary"]["unique_names"].as_u64(), Some(2));
    assert_eq!(v["proposals"].as_array().unwrap().len(), 2);
}

#[test]
fn min_score_flag_surfaces_weaker_candidates() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("attendance.csv");
    let b = dir.path().join("roster.csv");
    write(
        &a,
        "FullName,CreditHours,EventName\nJon Smith,1.0,Opening Keynote\nJon Smith,2.0,Ethics Workshop\n",
    );
    write(
        &b,
        "Category,Subcategory,FullName,Country,Email,CCEmail,FirstConference\nMember,,Jonathan Smith,US,jon@example.com,,no\n",
    );

    let status = rollcall()
        .arg("propose")
        .arg(&a)
        .arg(&b)
        .arg("--out-dir")
        .arg(dir.path())
        .args(["--min-score", "0.5"])
        .status()
        .unwrap();
    assert!(status.success());

    let sheet = read(dir.path(), "proposed_matches.csv");
    assert!(sheet.contains("Jon Smith,Jonathan Smith,jon@example.com"));

    // accept the first candidate the way a reviewer would
    let reviewed = dir.path().join("reviewed.csv");
    write(&reviewed, &sheet.replace(",false,,,", ",false,ACCEPT,1,"));

    let output = rollcall()
        .arg("apply")
        .arg(&a)
        .arg(&b)
        .arg("--decisions")
        .arg(&reviewed)
        .arg("--out-dir")
        .arg(dir.path())
        .args(["--min-score", "0.5"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(read(dir.path(), "master_list.csv").contains("jon@example.com,3.00"));
}

#[test]
fn windows_1252_exports_are_decoded() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("attendance.csv");
    let b = dir.path().join("roster.csv");
    std::fs::write(
        &a,
        b"FullName,CreditHours,EventName\nJos\xE9 Nu\xF1ez,1.0,Opening Keynote\n",
    )
    .unwrap();
    write(
        &b,
        "Category,Subcategory,FullName,Country,Email,CCEmail,FirstConference\nMember,,Jos\u{e9} Nu\u{f1}ez,MX,jose@example.com,,no\n",
    );

    let status = rollcall()
        .arg("propose")
        .arg(&a)
        .arg(&b)
        .arg("--out-dir")
        .arg(dir.path())
        .status()
        .unwrap();
    assert!(status.success());

    let sheet = read(dir.path(), "proposed_matches.csv");
    assert!(sheet.contains("Jos\u{e9} Nu\u{f1}ez"));
    assert!(sheet.contains("ACCEPT"));
}

#[test]
fn category_flag_splits_the_master_list() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("attendance.csv");
    let b = dir.path().join("roster.csv");
    write(&a, ATTENDANCE);
    write(
        &b,
        "Category,Subcategory,FullName,Country,Email,CCEmail,FirstConference\n\
         Member,,Mary Watson,US,mary@example.com,,no\n\
         Guest,,Carlos Ruiz,BR,carlos@example.com,,no\n",
    );

    let status = rollcall()
        .arg("propose")
        .arg(&a)
        .arg(&b)
        .arg("--out-dir")
        .arg(dir.path())
        .status()
        .unwrap();
    assert!(status.success());

    let output = rollcall()
        .arg("apply")
        .arg(&a)
        .arg(&b)
        .arg("--out-dir")
        .arg(dir.path())
        .args(["--category", "Member"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let master = read(dir.path(), "master_list.csv");
    assert!(master.contains("mary@example.com"));
    assert!(!master.contains("carlos@example.com"));
    assert!(read(dir.path(), "excluded_by_category.csv").contains("carlos@example.com"));
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = tempdir().unwrap();
    let b = dir.path().join("roster.csv");
    write(&b, ROSTER);

    let output = rollcall()
        .arg("propose")
        .arg(dir.path().join("nope.csv"))
        .arg(&b)
        .arg("--out-dir")
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot read"));
}
