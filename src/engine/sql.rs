use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::model::task::TASK_DONE;

use super::capacity::committed_member_count;
use super::store::{QueryError, TaskQuery, TeamQuery, TeamSnapshot, WorkItem};

/// MySQL-backed team snapshot. Overlap is the standard inclusive interval
/// intersection: `start_date <= window_end AND end_date >= window_start`.
pub struct SqlTeamQuery {
    pool: MySqlPool,
}

impl SqlTeamQuery {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamQuery for SqlTeamQuery {
    async fn team_snapshot(
        &self,
        team_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TeamSnapshot, QueryError> {
        let total_members =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE team_id = ?")
                .bind(team_id)
                .fetch_one(&self.pool)
                .await?;

        // Status filtering and distinct-member counting live in
        // `committed_member_count`, where they are unit-tested.
        let rows = sqlx::query_as::<_, (u64, String)>(
            r#"
            SELECT user_id, status
            FROM leaves
            WHERE team_id = ?
            AND start_date <= ?
            AND end_date >= ?
            "#,
        )
        .bind(team_id)
        .bind(end)
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(TeamSnapshot {
            total_members: total_members.max(0) as u64,
            committed_on_leave: committed_member_count(&rows),
        })
    }
}

/// MySQL-backed open-work-item lookup for the impact model.
pub struct SqlTaskQuery {
    pool: MySqlPool,
}

impl SqlTaskQuery {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskQuery for SqlTaskQuery {
    async fn open_work_items(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WorkItem>, QueryError> {
        let rows = sqlx::query_as::<_, (Option<f64>,)>(
            r#"
            SELECT estimated_hours
            FROM tasks
            WHERE assigned_to = ?
            AND status != ?
            AND due_date BETWEEN ? AND ?
            "#,
        )
        .bind(user_id)
        .bind(TASK_DONE)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(estimated_hours,)| WorkItem { estimated_hours })
            .collect())
    }
}
