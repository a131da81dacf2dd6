//! Basic CLI E2E tests.
//!
//! Tests invoke the compiled binary against a scratch home directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

const EXAM_DATE: &str = "2099-06-01";

/// Run a CLI command with HOME pointed at `home` and return output.
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_studyplan-cli"))
        .args(args)
        .env("HOME", home)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command and expect success.
fn run_cli_success(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\nstderr: {stderr}");
    stdout
}

/// Create Math+Physics plans and return (id, subject) pairs.
fn create_plans(home: &Path) -> Vec<(String, String)> {
    let stdout = run_cli_success(
        home,
        &[
            "plan",
            "create",
            "Math,Physics",
            "--exam-date",
            EXAM_DATE,
            "--daily-hours",
            "4",
            "--json",
        ],
    );
    let out: serde_json::Value = serde_json::from_str(&stdout).expect("Failed to parse JSON output");
    out["plans"]
        .as_array()
        .expect("plans array")
        .iter()
        .map(|p| {
            (
                p["id"].as_str().unwrap().to_string(),
                p["subject"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

/// Fetch a plan's schedule entries as JSON.
fn schedule_entries(home: &Path, plan_id: &str) -> Vec<serde_json::Value> {
    let stdout = run_cli_success(home, &["schedule", "show", plan_id, "--json"]);
    let entries: serde_json::Value = serde_json::from_str(&stdout).expect("Failed to parse JSON output");
    entries.as_array().expect("entries array").clone()
}

#[test]
fn plan_create_prints_summary() {
    let home = TempDir::new().unwrap();
    let stdout = run_cli_success(
        home.path(),
        &[
            "plan",
            "create",
            "Math,Physics",
            "--exam-date",
            EXAM_DATE,
            "--daily-hours",
            "4",
        ],
    );
    assert!(stdout.contains("Created 2 plan(s)"), "got: {stdout}");
    assert!(stdout.contains("Math"));
    assert!(stdout.contains("Physics"));
}

#[test]
fn plan_create_json_lists_both_plans() {
    let home = TempDir::new().unwrap();
    let plans = create_plans(home.path());
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].1, "Math");
    assert_eq!(plans[1].1, "Physics");
}

#[test]
fn plan_create_scales_infeasible_targets() {
    let home = TempDir::new().unwrap();
    let exam = (chrono::Utc::now().date_naive() + chrono::Duration::days(5)).to_string();
    let stdout = run_cli_success(
        home.path(),
        &[
            "plan",
            "create",
            "Bio",
            "--exam-date",
            &exam,
            "--daily-hours",
            "2",
            "--difficulty",
            "Bio=hard",
        ],
    );
    assert!(stdout.contains("note: targets scaled down"), "got: {stdout}");

    let list = run_cli_success(home.path(), &["plan", "list", "--json"]);
    let plans: serde_json::Value = serde_json::from_str(&list).unwrap();
    let target = plans[0]["total_hours"].as_f64().unwrap();
    assert!(target > 0.0 && target < 30.0, "target not scaled: {target}");
}

#[test]
fn plan_create_with_past_exam_plans_a_single_day() {
    let home = TempDir::new().unwrap();
    let stdout = run_cli_success(
        home.path(),
        &[
            "plan",
            "create",
            "History",
            "--exam-date",
            "2020-01-01",
            "--daily-hours",
            "3",
        ],
    );
    assert!(stdout.contains("over 1 day(s)"), "got: {stdout}");
}

#[test]
fn plan_create_rejects_empty_subjects() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(
        home.path(),
        &[
            "plan",
            "create",
            "",
            "--exam-date",
            EXAM_DATE,
            "--daily-hours",
            "4",
        ],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"), "got: {stderr}");
}

#[test]
fn plan_list_shows_created_subjects() {
    let home = TempDir::new().unwrap();
    create_plans(home.path());
    let stdout = run_cli_success(home.path(), &["plan", "list"]);
    assert!(stdout.contains("Math"));
    assert!(stdout.contains("Physics"));
}

#[test]
fn plan_show_reports_entry_counts() {
    let home = TempDir::new().unwrap();
    let plans = create_plans(home.path());
    let stdout = run_cli_success(home.path(), &["plan", "show", &plans[0].0]);
    assert!(stdout.contains("Subject:     Math"), "got: {stdout}");
    assert!(stdout.contains("pending"));

    let stdout = run_cli_success(home.path(), &["plan", "show", &plans[0].0, "--json"]);
    let out: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(out["plan"]["subject"], "Math");
    assert!(!out["entries"].as_array().unwrap().is_empty());
}

#[test]
fn plan_archive_hides_plan_from_listing() {
    let home = TempDir::new().unwrap();
    let plans = create_plans(home.path());
    let stdout = run_cli_success(home.path(), &["plan", "archive", &plans[0].0]);
    assert!(stdout.contains("Plan archived"));

    let list = run_cli_success(home.path(), &["plan", "list", "--json"]);
    let remaining: serde_json::Value = serde_json::from_str(&list).unwrap();
    let remaining = remaining.as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["subject"], "Physics");
}

#[test]
fn plan_show_unknown_id_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["plan", "show", "no-such-plan"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"), "got: {stderr}");
}

#[test]
fn schedule_show_filters_by_date() {
    let home = TempDir::new().unwrap();
    let plans = create_plans(home.path());
    let entries = schedule_entries(home.path(), &plans[0].0);
    let first_date = entries[0]["study_date"].as_str().unwrap();

    let stdout = run_cli_success(
        home.path(),
        &["schedule", "show", &plans[0].0, "--date", first_date, "--json"],
    );
    let filtered: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(filtered.as_array().unwrap().len(), 1);
}

#[test]
fn schedule_today_lists_all_active_plans() {
    let home = TempDir::new().unwrap();
    create_plans(home.path());
    let stdout = run_cli_success(home.path(), &["schedule", "today"]);
    assert!(stdout.contains("Math"), "got: {stdout}");
    assert!(stdout.contains("Physics"), "got: {stdout}");
}

#[test]
fn schedule_miss_rebalances_then_reports_not_found() {
    let home = TempDir::new().unwrap();
    let plans = create_plans(home.path());
    let entries = schedule_entries(home.path(), &plans[0].0);
    let first_date = entries[0]["study_date"].as_str().unwrap().to_string();

    let stdout = run_cli_success(home.path(), &["schedule", "miss", &plans[0].0, &first_date]);
    assert!(stdout.contains("entries rebalanced"), "got: {stdout}");

    let stdout = run_cli_success(home.path(), &["schedule", "miss", &plans[0].0, &first_date]);
    assert!(stdout.contains("no pending entry"), "got: {stdout}");
}

#[test]
fn schedule_complete_logs_progress_and_rejects_repeats() {
    let home = TempDir::new().unwrap();
    let plans = create_plans(home.path());
    let entries = schedule_entries(home.path(), &plans[0].0);
    let entry_id = entries[0]["id"].as_str().unwrap().to_string();

    let stdout = run_cli_success(
        home.path(),
        &["schedule", "complete", &entry_id, "1.5", "--notes", "first session"],
    );
    assert!(stdout.contains("logged 1.50h"), "got: {stdout}");

    let report = run_cli_success(home.path(), &["progress", &plans[0].0, "--json"]);
    let report: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert!((report["completed_hours"].as_f64().unwrap() - 1.5).abs() < 1e-9);
    assert!((report["percent_complete"].as_f64().unwrap() - 7.5).abs() < 0.01);

    let (_, stderr, code) = run_cli(home.path(), &["schedule", "complete", &entry_id, "1.0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"), "got: {stderr}");
}

#[test]
fn progress_prints_summary() {
    let home = TempDir::new().unwrap();
    let plans = create_plans(home.path());
    let stdout = run_cli_success(home.path(), &["progress", &plans[0].0]);
    assert!(stdout.contains("Subject:    Math"), "got: {stdout}");
    assert!(stdout.contains("Completed:  0.0h of 20.0h"), "got: {stdout}");
}

#[test]
fn advice_tip_answers_with_advisor_disabled() {
    let home = TempDir::new().unwrap();
    let plans = create_plans(home.path());
    run_cli_success(home.path(), &["config", "set", "advisor.enabled", "false"]);
    let stdout = run_cli_success(home.path(), &["advice", "tip", &plans[0].0]);
    assert!(!stdout.trim().is_empty());
}

#[test]
fn advice_subject_answers_with_advisor_disabled() {
    let home = TempDir::new().unwrap();
    let plans = create_plans(home.path());
    run_cli_success(home.path(), &["config", "set", "advisor.enabled", "false"]);
    let stdout = run_cli_success(home.path(), &["advice", "subject", &plans[1].0]);
    assert!(stdout.contains("Physics"), "got: {stdout}");
}

#[test]
fn auth_status_reads_environment() {
    let home = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_studyplan-cli"))
        .args(["auth", "openrouter", "status"])
        .env("HOME", home.path())
        .env("STUDYPLAN_OPENROUTER_API_KEY", "test-key")
        .output()
        .expect("Failed to execute CLI command");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("configured via"), "got: {stdout}");
}

#[test]
fn config_get_set_roundtrip() {
    let home = TempDir::new().unwrap();
    let stdout = run_cli_success(home.path(), &["config", "get", "advisor.model"]);
    assert_eq!(stdout.trim(), "qwen/qwen3-coder:free");

    run_cli_success(home.path(), &["config", "set", "advisor.timeout_secs", "10"]);
    let stdout = run_cli_success(home.path(), &["config", "get", "advisor.timeout_secs"]);
    assert_eq!(stdout.trim(), "10");

    let stdout = run_cli_success(home.path(), &["config", "list"]);
    let listed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(listed["advisor"].is_object());

    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "bogus.key"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"), "got: {stderr}");
}

#[test]
fn config_set_rebalance_scope() {
    let home = TempDir::new().unwrap();
    run_cli_success(
        home.path(),
        &["config", "set", "planner.rebalance_scope", "all_future"],
    );
    let stdout = run_cli_success(home.path(), &["config", "get", "planner.rebalance_scope"]);
    assert_eq!(stdout.trim(), "all_future");
}

#[test]
fn completions_generate_for_bash() {
    let home = TempDir::new().unwrap();
    let stdout = run_cli_success(home.path(), &["completions", "bash"]);
    assert!(stdout.contains("studyplan-cli"), "got: {stdout}");
}
