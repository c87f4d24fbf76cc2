//! crates/studyspark_core/src/dashboard.rs
//!
//! Selection rules for the dashboard projection, shared by every storage backend.

use chrono::{NaiveDate, Utc};

use crate::domain::{StudyPlan, Summary, UpcomingTask};

/// How many recent summaries and upcoming tasks the dashboard shows.
pub const DASHBOARD_LIMIT: usize = 5;

/// Date format used for plan and task dates. Lexicographic order equals date order.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Today's UTC date as a `YYYY-MM-DD` string.
pub fn today() -> String {
    format_date(Utc::now().date_naive())
}

/// Incomplete tasks dated `today` or later across all plans, earliest first.
pub fn upcoming_tasks(plans: &[StudyPlan], today: &str) -> Vec<UpcomingTask> {
    let mut upcoming: Vec<UpcomingTask> = plans
        .iter()
        .flat_map(move |plan| {
            plan.tasks
                .iter()
                .filter(move |task| !task.completed && task.date.as_str() >= today)
                .map(move |task| UpcomingTask {
                    plan_id: plan.id,
                    plan_title: plan.title.clone(),
                    task: task.clone(),
                })
        })
        .collect();

    upcoming.sort_by(|a, b| a.task.date.cmp(&b.task.date));
    upcoming.truncate(DASHBOARD_LIMIT);
    upcoming
}

/// The newest summaries by creation time.
pub fn recent_summaries(mut summaries: Vec<Summary>) -> Vec<Summary> {
    summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    summaries.truncate(DASHBOARD_LIMIT);
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewStudyPlan, Priority, StudyTask};
    use chrono::Duration;
    use uuid::Uuid;

    fn task(date: &str, completed: bool) -> StudyTask {
        StudyTask {
            id: Uuid::new_v4(),
            topic: format!("Topic for {date}"),
            subject: "Chemistry".to_string(),
            duration: 30,
            priority: Priority::Medium,
            completed,
            date: date.to_string(),
            time_slot: None,
        }
    }

    fn plan(tasks: Vec<StudyTask>) -> StudyPlan {
        StudyPlan::new(NewStudyPlan {
            title: "Exam prep".to_string(),
            description: String::new(),
            start_date: "2026-03-01".to_string(),
            end_date: "2026-03-31".to_string(),
            tasks,
        })
    }

    #[test]
    fn upcoming_skips_completed_and_past_tasks() {
        let plans = vec![
            plan(vec![
                task("2026-03-09", false),
                task("2026-03-10", true),
                task("2026-03-10", false),
            ]),
            plan(vec![task("2026-03-12", false), task("2026-03-11", false)]),
        ];

        let upcoming = upcoming_tasks(&plans, "2026-03-10");
        let dates: Vec<&str> = upcoming.iter().map(|u| u.task.date.as_str()).collect();

        assert_eq!(dates, vec!["2026-03-10", "2026-03-11", "2026-03-12"]);
        assert!(upcoming.iter().all(|u| !u.task.completed));
        assert_eq!(upcoming[1].plan_id, plans[1].id);
    }

    #[test]
    fn upcoming_is_capped() {
        let tasks = (10..20).map(|day| task(&format!("2026-04-{day}"), false)).collect();
        let upcoming = upcoming_tasks(&[plan(tasks)], "2026-04-01");

        assert_eq!(upcoming.len(), DASHBOARD_LIMIT);
        assert_eq!(upcoming[0].task.date, "2026-04-10");
        assert_eq!(upcoming[4].task.date, "2026-04-14");
    }

    #[test]
    fn recent_summaries_are_newest_first() {
        let base = Utc::now();
        let summaries: Vec<Summary> = (0..7)
            .map(|i| Summary {
                id: Uuid::new_v4(),
                note_id: Uuid::new_v4(),
                subject_id: Uuid::new_v4(),
                title: format!("Summary {i}"),
                key_points: vec![],
                definitions: vec![],
                formulas: vec![],
                main_concepts: vec![],
                full_summary: "text".to_string(),
                created_at: base + Duration::minutes(i),
            })
            .collect();

        let recent = recent_summaries(summaries);
        let titles: Vec<&str> = recent.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Summary 6", "Summary 5", "Summary 4", "Summary 3", "Summary 2"]
        );
    }

    #[test]
    fn formatted_dates_sort_like_dates() {
        let jan = format_date(NaiveDate::from_ymd_opt(2026, 1, 9).unwrap());
        let oct = format_date(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        assert_eq!(jan, "2026-01-09");
        assert!(jan < oct);
    }
}
