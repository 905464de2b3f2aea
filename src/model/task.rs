use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use utoipa::ToSchema;

/// A task is "open" while its status is anything other than DONE; only open
/// tasks due inside a leave window feed the impact score.
pub const TASK_DONE: &str = "DONE";

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Task {
    #[schema(example = 42)]
    pub id: u64,
    #[schema(example = "Migrate billing cron")]
    pub title: String,
    #[schema(example = "Move the nightly job to the new scheduler", nullable = true)]
    pub description: Option<String>,
    #[schema(example = "IN_PROGRESS")]
    pub status: String,
    #[schema(example = 12.0, nullable = true)]
    pub estimated_hours: Option<f64>,
    #[schema(example = "2026-04-02", format = "date", value_type = String, nullable = true)]
    pub due_date: Option<NaiveDate>,
}
