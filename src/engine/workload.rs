use std::sync::Arc;

use chrono::NaiveDate;

use crate::utils::date_utils;

use super::store::{QueryError, TaskQuery, WorkItem};

/// Ratio of a requester's open, due-in-window work effort to the nominal
/// hours available in the leave window. Unbounded above: a requester whose
/// due work exceeds the window yields a score past 1.0.
pub struct WorkloadModel {
    tasks: Arc<dyn TaskQuery>,
    workday_hours: u32,
}

impl WorkloadModel {
    pub fn new(tasks: Arc<dyn TaskQuery>, workday_hours: u32) -> Self {
        Self { tasks, workday_hours }
    }

    /// Requires a valid range (`end >= start`); the evaluator checks the
    /// range before calling.
    pub async fn compute_impact(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, QueryError> {
        let items = self.tasks.open_work_items(user_id, start, end).await?;
        let leave_days = date_utils::inclusive_day_count(start, end);
        Ok(impact_score(&items, leave_days, self.workday_hours))
    }
}

pub fn impact_score(items: &[WorkItem], leave_days: i64, workday_hours: u32) -> f64 {
    let total_hours: f64 = items.iter().filter_map(|item| item.estimated_hours).sum();
    let available_hours = leave_days as f64 * f64::from(workday_hours);

    if available_hours > 0.0 {
        total_hours / available_hours
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{impact_score, WorkItem};

    fn items(hours: &[f64]) -> Vec<WorkItem> {
        hours.iter().map(|h| WorkItem { estimated_hours: Some(*h) }).collect()
    }

    #[test]
    fn idle_user_scores_exactly_zero() {
        assert_eq!(impact_score(&[], 3, 8), 0.0);
    }

    #[test]
    fn score_is_hours_over_available_hours() {
        // 16h due inside a 3-day window of 24 available hours.
        let score = impact_score(&items(&[16.0]), 3, 8);
        assert!((score - 16.0 / 24.0).abs() < 1e-9);
    }

    #[test]
    fn missing_estimates_count_as_zero_hours() {
        let mut work = items(&[4.0]);
        work.push(WorkItem { estimated_hours: None });
        assert!((impact_score(&work, 1, 8) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn overloaded_user_scores_past_one() {
        assert!(impact_score(&items(&[40.0]), 2, 8) > 1.0);
    }

    #[test]
    fn zero_available_hours_guard() {
        assert_eq!(impact_score(&items(&[8.0]), 0, 8), 0.0);
    }
}
