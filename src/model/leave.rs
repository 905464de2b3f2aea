use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Lifecycle of a leave record. The first three states are produced by the
/// rule evaluator; `Approved`/`Rejected` are terminal states a manager sets
/// on a pending record.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    AutoApproved,
    AutoRejected,
    PendingManagerReview,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// Statuses that count toward team absence: the member is definitely
    /// going to be away. Pending and rejected records do not commit capacity.
    pub fn is_committed(self) -> bool {
        matches!(self, LeaveStatus::AutoApproved | LeaveStatus::Approved)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Leave {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "2026-04-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-04-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "AUTO_APPROVED", value_type = String)]
    pub status: String,
    #[schema(example = "Family trip")]
    pub reason: String,
    #[schema(example = "Covered by on-call rotation", nullable = true)]
    pub manager_note: Option<String>,
    #[schema(example = "2026-03-20T10:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::LeaveStatus;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_screaming_snake_case() {
        assert_eq!(LeaveStatus::PendingManagerReview.to_string(), "PENDING_MANAGER_REVIEW");
        assert_eq!(
            LeaveStatus::from_str("AUTO_APPROVED").unwrap(),
            LeaveStatus::AutoApproved
        );
        assert!(LeaveStatus::from_str("ON_HOLD").is_err());
    }

    #[test]
    fn only_approved_states_commit_capacity() {
        assert!(LeaveStatus::AutoApproved.is_committed());
        assert!(LeaveStatus::Approved.is_committed());
        assert!(!LeaveStatus::PendingManagerReview.is_committed());
        assert!(!LeaveStatus::AutoRejected.is_committed());
        assert!(!LeaveStatus::Rejected.is_committed());
    }
}
