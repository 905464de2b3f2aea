use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// A collaborator read failed. The evaluator must surface this instead of
/// substituting defaults: a missing snapshot must never decide leave.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("data store unavailable: {0}")]
    Unavailable(String),
}

/// Team head count and how many distinct members are already committed to
/// being away somewhere inside the queried window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamSnapshot {
    pub total_members: u64,
    pub committed_on_leave: u64,
}

/// One open work item due inside a leave window. Items with no estimate
/// count as zero hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkItem {
    pub estimated_hours: Option<f64>,
}

#[async_trait]
pub trait TeamQuery: Send + Sync {
    async fn team_snapshot(
        &self,
        team_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TeamSnapshot, QueryError>;
}

#[async_trait]
pub trait TaskQuery: Send + Sync {
    /// Open (non-completed) work items owned by `user_id` with a due date in
    /// `[start, end]` inclusive.
    async fn open_work_items(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WorkItem>, QueryError>;
}
