use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::model::leave::LeaveStatus;

use super::store::{QueryError, TeamQuery};

/// Share of a team simultaneously on committed leave during a window.
pub struct TeamCapacity {
    teams: Arc<dyn TeamQuery>,
}

impl TeamCapacity {
    pub fn new(teams: Arc<dyn TeamQuery>) -> Self {
        Self { teams }
    }

    pub async fn absence_percent(
        &self,
        team_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, QueryError> {
        let snapshot = self.teams.team_snapshot(team_id, start, end).await?;
        Ok(percent(snapshot.committed_on_leave, snapshot.total_members))
    }
}

/// A team with no members cannot be overloaded.
pub fn percent(committed_on_leave: u64, total_members: u64) -> f64 {
    if total_members == 0 {
        0.0
    } else {
        committed_on_leave as f64 / total_members as f64 * 100.0
    }
}

/// Count distinct members holding a committed leave record, given
/// `(user_id, status)` rows already filtered to the window by the store.
/// A member who re-applied after a rejection counts at most once, and only
/// for the committed record.
pub fn committed_member_count(rows: &[(u64, String)]) -> u64 {
    let mut members = HashSet::new();
    for (user_id, status) in rows {
        let committed = LeaveStatus::from_str(status)
            .map(LeaveStatus::is_committed)
            .unwrap_or(false);
        if committed {
            members.insert(*user_id);
        }
    }
    members.len() as u64
}

#[cfg(test)]
mod tests {
    use super::{committed_member_count, percent};

    #[test]
    fn zero_member_team_is_zero_percent() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(3, 0), 0.0);
    }

    #[test]
    fn percent_of_committed_members() {
        assert_eq!(percent(2, 10), 20.0);
        assert_eq!(percent(5, 10), 50.0);
        assert!(percent(7, 10) > 50.0);
    }

    #[test]
    fn pending_and_rejected_records_do_not_commit_capacity() {
        let rows = vec![
            (1, "PENDING_MANAGER_REVIEW".to_string()),
            (2, "AUTO_REJECTED".to_string()),
            (3, "REJECTED".to_string()),
            (4, "AUTO_APPROVED".to_string()),
            (5, "APPROVED".to_string()),
        ];
        assert_eq!(committed_member_count(&rows), 2);
    }

    #[test]
    fn member_rejected_then_reapproved_counts_once() {
        // Two overlapping records for the same member: the rejected original
        // and the approved re-application. One head, one count.
        let rows = vec![
            (9, "REJECTED".to_string()),
            (9, "APPROVED".to_string()),
            (9, "AUTO_APPROVED".to_string()),
        ];
        assert_eq!(committed_member_count(&rows), 1);
    }

    #[test]
    fn unknown_status_is_ignored() {
        let rows = vec![(1, "ARCHIVED".to_string())];
        assert_eq!(committed_member_count(&rows), 0);
    }
}
