use studyplan_core::storage::PlannerDb;
use studyplan_core::StudyPlanner;

pub fn run(plan_id: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlannerDb::open()?;
    let planner = StudyPlanner::new(db);
    let report = planner.progress(plan_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Subject:    {}", report.subject);
    println!(
        "Exam date:  {} ({} day(s) left)",
        report.exam_date, report.remaining_days
    );
    println!(
        "Completed:  {:.1}h of {:.1}h ({:.1}%)",
        report.completed_hours, report.total_hours, report.percent_complete
    );
    println!("Remaining:  {:.1}h", report.hours_left);

    if !report.series.is_empty() {
        println!();
        println!(
            "{:<10}  {:<14} {:>6}  {:>10}",
            "DATE", "SUBJECT", "HOURS", "CUMULATIVE"
        );
        for point in &report.series {
            println!(
                "{}  {:<14} {:>5.2}h  {:>9.2}h",
                point.date, point.subject, point.hours, point.cumulative_hours
            );
        }
    }
    Ok(())
}
