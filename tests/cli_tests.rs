#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env_remove("ATTENDANCE_ROSTER");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_greets_and_lists_the_team() {
    run_cli("roster\nquit\n")
        .success()
        .stdout(str_contains("Attendance Tool (CLI)"))
        .stdout(str_contains("Saurabh"))
        .stdout(str_contains("Raja"));
}

#[test]
fn cli_help_lists_commands() {
    run_cli("help\nquit\n")
        .success()
        .stdout(str_contains("mark <member> <YYYY-MM-DD> <status>"))
        .stdout(str_contains("report [path]"))
        .stdout(str_contains("work-from-home | in-office"));
}

#[test]
fn cli_marks_a_past_weekday() {
    run_cli("mark Saurabh 2024-03-14 in-office\nquit\n")
        .success()
        .stdout(str_contains("Marked Saurabh on 2024-03-14 as In Office."))
        .stdout(str_contains("Calendar for Saurabh"));
}

#[test]
fn cli_rejects_weekend_dates() {
    run_cli("mark Saurabh 2024-03-16 leave\nquit\n")
        .success()
        .stdout(str_contains("Error: date 2024-03-16 is not selectable"));
}

#[test]
fn cli_rejects_unknown_members() {
    run_cli("mark Nobody 2024-03-14 leave\nquit\n")
        .success()
        .stdout(str_contains("Error: unknown member 'Nobody'"));
}

#[test]
fn cli_rejects_unknown_statuses() {
    run_cli("mark Saurabh 2024-03-14 vacation\nquit\n")
        .success()
        .stdout(str_contains("Unknown status 'vacation'"));
}

#[test]
fn cli_clear_removes_a_mark() {
    run_cli("mark Dhruv 2024-03-14 leave\nclear Dhruv 2024-03-14\nhistory Dhruv\nquit\n")
        .success()
        .stdout(str_contains("Cleared Dhruv on 2024-03-14."))
        .stdout(str_contains("No attendance records for Dhruv."));
}

#[test]
fn cli_history_is_newest_first_and_filters_by_month() {
    let assert = run_cli(
        "mark Saurabh 2024-02-14 leave\nmark Saurabh 2024-03-14 in-office\nhistory Saurabh\nquit\n",
    )
    .success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let march = output.rfind("2024-03-14  In Office").expect("march entry");
    let february = output.rfind("2024-02-14  Leave").expect("february entry");
    assert!(march < february, "expected newest entry first:\n{output}");

    run_cli("mark Saurabh 2024-02-14 leave\nhistory Saurabh 2\nquit\n")
        .success()
        .stdout(str_contains("2024-02-14  Leave"));
    run_cli("mark Saurabh 2024-02-14 leave\nhistory Saurabh 3\nquit\n")
        .success()
        .stdout(str_contains("No attendance records for Saurabh."));
}

#[test]
fn cli_overview_shows_every_member() {
    run_cli("overview\nquit\n")
        .success()
        .stdout(str_contains("Divyansh"))
        .stdout(str_contains("Not Marked"));
}

#[test]
fn cli_stats_prints_year_to_date_counts() {
    run_cli("stats Saurabh\nquit\n")
        .success()
        .stdout(str_contains("Year-to-date counts for Saurabh:"))
        .stdout(str_contains("Work From Home"))
        .stdout(str_contains("Not Marked"));
}

#[test]
fn cli_navigation_redraws_the_calendar() {
    run_cli("nav Saurabh back\nquit\n")
        .success()
        .stdout(str_contains("Calendar for Saurabh"));
    run_cli("nav Saurabh sideways\nquit\n")
        .success()
        .stdout(str_contains("Invalid direction (back|forward)"));
}

#[test]
fn cli_eligible_lists_dates_heading() {
    run_cli("eligible Saurabh\nquit\n")
        .success()
        .stdout(str_contains("Eligible dates for Saurabh:"));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().to_string();
    let script = format!(
        "mark Saurabh 2024-03-14 in-office\nsave json {}\nclear Saurabh 2024-03-14\nload json {}\nhistory Saurabh\nquit\n",
        path, path
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(
        output.contains("Attendance saved to"),
        "expected save confirmation:\n{output}"
    );
    assert!(
        output.contains("Attendance loaded from"),
        "expected load confirmation:\n{output}"
    );
    let after_reload = output
        .split("Attendance loaded from")
        .last()
        .unwrap_or_default();
    assert!(
        after_reload.contains("2024-03-14  In Office"),
        "expected reloaded mark in history:\n{after_reload}"
    );
}

#[test]
fn cli_report_needs_data() {
    run_cli("report\nquit\n")
        .success()
        .stdout(str_contains("No attendance data to download."));
}

#[test]
fn cli_report_writes_the_team_csv() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().to_string();
    let script = format!(
        "mark Saurabh 2024-03-14 work-from-home\nreport {}\nquit\n",
        path
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Report saved to"));
    let csv = std::fs::read_to_string(tmp.path()).expect("report file");
    assert!(csv.contains("Year To Date"));
    assert!(csv.contains("Saurabh"));
}

#[test]
fn cli_export_writes_a_member_csv() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().to_string();
    let script = format!("mark Raja 2024-03-14 leave\nexport Raja {}\nquit\n", path);
    run_cli(&script)
        .success()
        .stdout(str_contains("Report saved to"));
    let csv = std::fs::read_to_string(tmp.path()).expect("export file");
    assert!(csv.starts_with("Date,Status"));
    assert!(csv.contains("2024-03-14,Leave"));

    run_cli("export Raja\nquit\n")
        .success()
        .stdout(str_contains("No attendance data to download."));
}

#[test]
fn cli_unknown_commands_point_at_help() {
    run_cli("frobnicate\nquit\n")
        .success()
        .stdout(str_contains("Unknown command. Type 'help'."));
}
