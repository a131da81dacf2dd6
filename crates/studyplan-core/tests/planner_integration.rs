//! Integration tests for the planner facade over a real database file.

use chrono::NaiveDate;
use studyplan_core::{
    AdjustOutcome, Difficulty, PlanRequest, PlannerDb, StudyPlanner,
};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn two_subject_request() -> PlanRequest {
    // Math hard (30h) + History medium (20h) against 5 days x 4h: scaled
    // to 12h and 8h, giving 2.4h/1.6h per day.
    let mut request = PlanRequest::new(
        vec!["Math".to_string(), "History".to_string()],
        date(2025, 6, 6),
        4.0,
    );
    request
        .difficulties
        .insert("Math".to_string(), Difficulty::Hard);
    request
}

#[test]
fn full_plan_lifecycle() {
    let dir = TempDir::new().unwrap();
    let db = PlannerDb::open_at(dir.path().join("studyplan.db")).unwrap();
    let planner = StudyPlanner::new(db);
    let user_id = planner.default_user().unwrap();

    // Create: one plan row per subject, five entries each
    let created = planner
        .create_plan_on(user_id, &two_subject_request(), date(2025, 6, 1))
        .unwrap();
    assert_eq!(created.plans.len(), 2);
    assert_eq!(created.computed.available_days, 5);

    let math = created
        .plans
        .iter()
        .find(|p| p.subject == "Math")
        .unwrap();
    let history = created
        .plans
        .iter()
        .find(|p| p.subject == "History")
        .unwrap();
    assert_eq!(math.total_hours, 12.0);
    assert_eq!(history.total_hours, 8.0);

    let math_entries = planner.schedule(&math.id, None).unwrap();
    assert_eq!(math_entries.len(), 5);
    assert!(math_entries.iter().all(|e| e.planned_hours == 2.4));
    let history_entries = planner.schedule(&history.id, None).unwrap();
    assert!(history_entries.iter().all(|e| e.planned_hours == 1.6));

    // Complete day one for Math and check the report
    let outcome = planner
        .complete_entry(&math_entries[0].id, 2.0, Some("limits and continuity".into()))
        .unwrap();
    assert_eq!(outcome.total_completed_hours, 2.0);

    let report = planner.progress_as_of(&math.id, date(2025, 6, 2)).unwrap();
    assert_eq!(report.completed_hours, 2.0);
    assert_eq!(report.total_hours, 12.0);
    assert!((report.percent_complete - 16.67).abs() < 0.01);
    assert_eq!(report.remaining_days, 4);
    assert_eq!(report.hours_left, 10.0);
    assert_eq!(report.series.len(), 1);
    assert_eq!(report.series[0].cumulative_hours, 2.0);

    // Miss day two for Math: three pending entries remain, rebalanced flat
    let outcome = planner.mark_day_missed(&math.id, date(2025, 6, 2)).unwrap();
    let adjustments = match outcome {
        AdjustOutcome::Rebalanced { adjustments, .. } => adjustments,
        other => panic!("expected rebalance, got {other:?}"),
    };
    assert_eq!(adjustments.len(), 3);
    assert!(adjustments.iter().all(|a| a.new_hours == 2.4));

    let math_entries = planner.schedule(&math.id, None).unwrap();
    assert!(math_entries[0].completed);
    assert!(math_entries[1].missed);
    assert!(math_entries[2..].iter().all(|e| e.is_pending()));

    // A second miss on the same date is a no-op outcome
    let again = planner.mark_day_missed(&math.id, date(2025, 6, 2)).unwrap();
    assert!(matches!(again, AdjustOutcome::NotFound));

    // History's schedule is untouched by Math's adjustment
    let history_entries = planner.schedule(&history.id, None).unwrap();
    assert!(history_entries.iter().all(|e| e.is_pending()));
}

#[test]
fn reopening_the_database_preserves_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("studyplan.db");

    let plan_id = {
        let planner = StudyPlanner::new(PlannerDb::open_at(&path).unwrap());
        let user_id = planner.default_user().unwrap();
        let created = planner
            .create_plan_on(user_id, &two_subject_request(), date(2025, 6, 1))
            .unwrap();
        let entries = planner.schedule(&created.plans[0].id, None).unwrap();
        planner.complete_entry(&entries[0].id, 2.5, None).unwrap();
        created.plans[0].id.clone()
    };

    let planner = StudyPlanner::new(PlannerDb::open_at(&path).unwrap());
    let plan = planner.plan(&plan_id).unwrap();
    assert_eq!(plan.completed_hours, 2.5);

    let entries = planner.schedule(&plan_id, None).unwrap();
    assert!(entries[0].completed);
    assert_eq!(entries[0].actual_hours, 2.5);

    // The kv-backed default user survives reopen too
    let user_id = planner.default_user().unwrap();
    assert_eq!(user_id, plan.user_id);
}

#[test]
fn archived_plans_stay_out_of_listings_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("studyplan.db");

    let planner = StudyPlanner::new(PlannerDb::open_at(&path).unwrap());
    let user_id = planner.default_user().unwrap();
    let created = planner
        .create_plan_on(user_id, &two_subject_request(), date(2025, 6, 1))
        .unwrap();
    planner.archive_plan(&created.plans[0].id).unwrap();
    drop(planner);

    let planner = StudyPlanner::new(PlannerDb::open_at(&path).unwrap());
    let listed = planner.list_plans(user_id).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.plans[1].id);
}
