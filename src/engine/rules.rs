use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::model::leave::LeaveStatus;
use crate::utils::date_utils;

use super::capacity::TeamCapacity;
use super::store::{QueryError, TaskQuery, TeamQuery};
use super::workload::WorkloadModel;

/// Business thresholds of the rule evaluator. Hard policy today, but kept
/// out of the evaluation logic so ops can tune them via configuration.
#[derive(Debug, Clone, Copy)]
pub struct LeavePolicy {
    pub max_leave_days: i64,
    pub workday_hours: u32,
    pub team_absence_reject_pct: f64,
    pub fast_track_max_days: i64,
    pub fast_track_absence_pct: f64,
    pub fast_track_impact: f64,
    pub high_impact: f64,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            max_leave_days: 15,
            workday_hours: 8,
            team_absence_reject_pct: 50.0,
            fast_track_max_days: 2,
            fast_track_absence_pct: 30.0,
            fast_track_impact: 0.3,
            high_impact: 0.6,
        }
    }
}

/// Categorical outcome of evaluating one leave request. Metrics are rounded
/// to two decimals; rejections carry a reason and no metrics.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status")]
pub enum Decision {
    #[serde(rename = "AUTO_APPROVED")]
    AutoApproved {
        #[serde(rename = "impactScore")]
        impact_score: f64,
        #[serde(rename = "teamAbsence")]
        team_absence: f64,
    },
    #[serde(rename = "AUTO_REJECTED")]
    AutoRejected { reason: String },
    #[serde(rename = "PENDING_MANAGER_REVIEW")]
    PendingManagerReview {
        #[serde(rename = "impactScore")]
        impact_score: f64,
        #[serde(rename = "teamAbsence")]
        team_absence: f64,
    },
}

impl Decision {
    pub fn status(&self) -> LeaveStatus {
        match self {
            Decision::AutoApproved { .. } => LeaveStatus::AutoApproved,
            Decision::AutoRejected { .. } => LeaveStatus::AutoRejected,
            Decision::PendingManagerReview { .. } => LeaveStatus::PendingManagerReview,
        }
    }
}

/// Failures of the evaluation itself. Business outcomes are never errors:
/// every well-formed request maps to exactly one `Decision`.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("leave evaluation data unavailable: {0}")]
    DataUnavailable(#[from] QueryError),
}

/// Metrics for the pre-application preview endpoint; nothing is persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactPreview {
    pub impact_score: f64,
    pub team_absence: f64,
    pub leave_days: i64,
}

/// The rule evaluator. Classifies a leave request by running a fixed
/// sequence of gates over calendar arithmetic, team capacity and the
/// requester's workload impact.
pub struct LeaveEvaluator {
    policy: LeavePolicy,
    capacity: TeamCapacity,
    workload: WorkloadModel,
}

impl LeaveEvaluator {
    pub fn new(policy: LeavePolicy, teams: Arc<dyn TeamQuery>, tasks: Arc<dyn TaskQuery>) -> Self {
        let workload = WorkloadModel::new(tasks, policy.workday_hours);
        Self {
            policy,
            capacity: TeamCapacity::new(teams),
            workload,
        }
    }

    pub async fn evaluate(
        &self,
        requester_id: u64,
        team_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Decision, EvaluationError> {
        self.evaluate_as_of(requester_id, team_id, start, end, date_utils::today())
            .await
    }

    /// Same as `evaluate`, with the evaluation day injected. Gate order is
    /// fixed: range, past date, duration cap, team overload, fast track,
    /// high impact, manager review. The first failing gate decides.
    pub async fn evaluate_as_of(
        &self,
        requester_id: u64,
        team_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Result<Decision, EvaluationError> {
        if date_utils::is_invalid_range(start, end) {
            return Ok(Decision::AutoRejected {
                reason: "End date cannot be before start date".to_string(),
            });
        }

        if date_utils::is_past(start, today) {
            return Ok(Decision::AutoRejected {
                reason: "Cannot apply for leave in the past".to_string(),
            });
        }

        let leave_days = date_utils::inclusive_day_count(start, end);

        if leave_days > self.policy.max_leave_days {
            return Ok(Decision::AutoRejected {
                reason: format!(
                    "Leave duration exceeds maximum limit of {} days",
                    self.policy.max_leave_days
                ),
            });
        }

        // The two reads have no ordering dependency; fetch them together.
        // The gates below still apply in their fixed order.
        let (team_absence, impact_score) = futures::try_join!(
            self.capacity.absence_percent(team_id, start, end),
            self.workload.compute_impact(requester_id, start, end),
        )?;

        if team_absence > self.policy.team_absence_reject_pct {
            return Ok(Decision::AutoRejected {
                reason: format!("Team overload: {:.1}% already on leave", team_absence),
            });
        }

        if leave_days <= self.policy.fast_track_max_days
            && team_absence <= self.policy.fast_track_absence_pct
            && impact_score < self.policy.fast_track_impact
        {
            return Ok(Decision::AutoApproved {
                impact_score: round2(impact_score),
                team_absence: round2(team_absence),
            });
        }

        if impact_score > self.policy.high_impact {
            return Ok(Decision::AutoRejected {
                reason: format!("High workload impact: {:.2}", impact_score),
            });
        }

        Ok(Decision::PendingManagerReview {
            impact_score: round2(impact_score),
            team_absence: round2(team_absence),
        })
    }

    /// Metrics a requester sees before applying. Requires a valid range;
    /// the caller rejects `end < start` up front.
    pub async fn preview(
        &self,
        requester_id: u64,
        team_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ImpactPreview, EvaluationError> {
        let (team_absence, impact_score) = futures::try_join!(
            self.capacity.absence_percent(team_id, start, end),
            self.workload.compute_impact(requester_id, start, end),
        )?;

        Ok(ImpactPreview {
            impact_score: round2(impact_score),
            team_absence: round2(team_absence),
            leave_days: date_utils::inclusive_day_count(start, end),
        })
    }
}

/// Metrics attached to a decision are rounded; the gates above always
/// compare unrounded values.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use crate::engine::store::{QueryError, TaskQuery, TeamQuery, TeamSnapshot, WorkItem};

    use super::{Decision, EvaluationError, ImpactPreview, LeaveEvaluator, LeavePolicy};

    struct FakeTeams {
        snapshot: TeamSnapshot,
    }

    #[async_trait]
    impl TeamQuery for FakeTeams {
        async fn team_snapshot(
            &self,
            _team_id: u64,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<TeamSnapshot, QueryError> {
            Ok(self.snapshot)
        }
    }

    struct FakeTasks {
        items: Vec<WorkItem>,
    }

    #[async_trait]
    impl TaskQuery for FakeTasks {
        async fn open_work_items(
            &self,
            _user_id: u64,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<WorkItem>, QueryError> {
            Ok(self.items.clone())
        }
    }

    struct UnavailableTeams;

    #[async_trait]
    impl TeamQuery for UnavailableTeams {
        async fn team_snapshot(
            &self,
            _team_id: u64,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<TeamSnapshot, QueryError> {
            Err(QueryError::Unavailable("team snapshot timed out".to_string()))
        }
    }

    struct UnavailableTasks;

    #[async_trait]
    impl TaskQuery for UnavailableTasks {
        async fn open_work_items(
            &self,
            _user_id: u64,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<WorkItem>, QueryError> {
            Err(QueryError::Unavailable("task store timed out".to_string()))
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn today() -> NaiveDate {
        d("2026-05-04")
    }

    fn items(hours: &[f64]) -> Vec<WorkItem> {
        hours.iter().map(|h| WorkItem { estimated_hours: Some(*h) }).collect()
    }

    fn evaluator(total: u64, committed: u64, hours: &[f64]) -> LeaveEvaluator {
        LeaveEvaluator::new(
            LeavePolicy::default(),
            Arc::new(FakeTeams {
                snapshot: TeamSnapshot {
                    total_members: total,
                    committed_on_leave: committed,
                },
            }),
            Arc::new(FakeTasks { items: items(hours) }),
        )
    }

    async fn decide(
        evaluator: &LeaveEvaluator,
        start: &str,
        end: &str,
    ) -> Result<Decision, EvaluationError> {
        evaluator.evaluate_as_of(1, 1, d(start), d(end), today()).await
    }

    fn rejected_with(decision: &Decision, expected: &str) -> bool {
        matches!(decision, Decision::AutoRejected { reason } if reason == expected)
    }

    #[tokio::test]
    async fn identical_inputs_decide_identically() {
        let eval = evaluator(10, 2, &[4.0]);
        let first = decide(&eval, "2026-05-10", "2026-05-12").await.unwrap();
        let second = decide(&eval, "2026-05-10", "2026-05-12").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn end_before_start_rejects_before_anything_else() {
        // Absurd collaborator data must not matter: the range gate is first.
        let eval = evaluator(0, 99, &[1000.0]);
        let decision = decide(&eval, "2026-05-10", "2026-05-09").await.unwrap();
        assert!(rejected_with(&decision, "End date cannot be before start date"));
    }

    #[tokio::test]
    async fn past_start_rejects_even_a_fast_track_candidate() {
        let eval = evaluator(10, 0, &[]);
        let decision = decide(&eval, "2026-05-03", "2026-05-03").await.unwrap();
        assert!(rejected_with(&decision, "Cannot apply for leave in the past"));
    }

    #[tokio::test]
    async fn leave_starting_today_is_not_past() {
        let eval = evaluator(10, 0, &[]);
        let decision = decide(&eval, "2026-05-04", "2026-05-04").await.unwrap();
        assert!(matches!(decision, Decision::AutoApproved { .. }));
    }

    #[tokio::test]
    async fn fifteen_days_pass_the_duration_gate() {
        let eval = evaluator(10, 0, &[]);
        let decision = decide(&eval, "2026-05-10", "2026-05-24").await.unwrap();
        // Proceeds past the cap and lands in manager review (too long to
        // fast track, zero impact).
        assert!(matches!(decision, Decision::PendingManagerReview { .. }));
    }

    #[tokio::test]
    async fn sixteen_days_reject_for_duration_first() {
        // Even with an overloaded team and a crushing workload, the duration
        // gate runs first and its reason is the one returned.
        let eval = evaluator(10, 9, &[1000.0]);
        let decision = decide(&eval, "2026-05-10", "2026-05-25").await.unwrap();
        assert!(rejected_with(
            &decision,
            "Leave duration exceeds maximum limit of 15 days"
        ));
    }

    #[tokio::test]
    async fn team_overload_is_checked_before_impact() {
        let eval = evaluator(10, 6, &[1000.0]);
        let decision = decide(&eval, "2026-05-10", "2026-05-14").await.unwrap();
        assert!(rejected_with(&decision, "Team overload: 60.0% already on leave"));
    }

    #[tokio::test]
    async fn exactly_half_the_team_away_does_not_overload() {
        let eval = evaluator(10, 5, &[]);
        let decision = decide(&eval, "2026-05-10", "2026-05-14").await.unwrap();
        assert!(matches!(
            decision,
            Decision::PendingManagerReview { team_absence, .. } if team_absence == 50.0
        ));
    }

    #[tokio::test]
    async fn just_past_half_the_team_away_overloads() {
        let eval = evaluator(10_000, 5_001, &[]);
        let decision = decide(&eval, "2026-05-10", "2026-05-14").await.unwrap();
        assert!(matches!(decision, Decision::AutoRejected { .. }));
    }

    #[tokio::test]
    async fn short_quiet_low_impact_leave_fast_tracks() {
        // 2 days, 30.00% absence, 4h against 16 available hours = 0.25.
        let eval = evaluator(10, 3, &[4.0]);
        let decision = decide(&eval, "2026-05-11", "2026-05-12").await.unwrap();
        assert_eq!(
            decision,
            Decision::AutoApproved {
                impact_score: 0.25,
                team_absence: 30.0
            }
        );
    }

    #[tokio::test]
    async fn a_third_day_breaks_fast_track() {
        let eval = evaluator(10, 3, &[4.0]);
        let decision = decide(&eval, "2026-05-11", "2026-05-13").await.unwrap();
        assert!(matches!(decision, Decision::PendingManagerReview { .. }));
    }

    #[tokio::test]
    async fn a_hundredth_over_thirty_percent_breaks_fast_track() {
        let eval = evaluator(10_000, 3_001, &[4.0]);
        let decision = decide(&eval, "2026-05-11", "2026-05-12").await.unwrap();
        assert!(matches!(
            decision,
            Decision::PendingManagerReview { team_absence, .. } if team_absence == 30.01
        ));
    }

    #[tokio::test]
    async fn impact_at_the_fast_track_threshold_breaks_fast_track() {
        // 4.8h over 16 available hours is exactly 0.30; fast track needs
        // strictly less, and 0.30 is below the rejection bar, so the band
        // falls through to manager review.
        let eval = evaluator(10, 3, &[4.8]);
        let decision = decide(&eval, "2026-05-11", "2026-05-12").await.unwrap();
        assert_eq!(
            decision,
            Decision::PendingManagerReview {
                impact_score: 0.3,
                team_absence: 30.0
            }
        );
    }

    #[tokio::test]
    async fn high_impact_rejects_a_longer_leave() {
        // 5 days, quiet team, 24.4h against 40 available hours = 0.61.
        let eval = evaluator(10, 1, &[24.4]);
        let decision = decide(&eval, "2026-05-11", "2026-05-15").await.unwrap();
        assert!(rejected_with(&decision, "High workload impact: 0.61"));
    }

    #[tokio::test]
    async fn mid_band_impact_goes_to_manager_review() {
        // 20h over 40 available hours = 0.50: too much to fast track, not
        // enough to reject.
        let eval = evaluator(10, 1, &[20.0]);
        let decision = decide(&eval, "2026-05-11", "2026-05-15").await.unwrap();
        assert_eq!(
            decision,
            Decision::PendingManagerReview {
                impact_score: 0.5,
                team_absence: 10.0
            }
        );
    }

    #[tokio::test]
    async fn zero_member_team_never_divides_by_zero() {
        let eval = evaluator(0, 0, &[]);
        let decision = decide(&eval, "2026-05-11", "2026-05-11").await.unwrap();
        assert_eq!(
            decision,
            Decision::AutoApproved {
                impact_score: 0.0,
                team_absence: 0.0
            }
        );
    }

    #[tokio::test]
    async fn idle_requester_scores_exactly_zero() {
        let eval = evaluator(10, 2, &[]);
        let decision = decide(&eval, "2026-05-11", "2026-05-15").await.unwrap();
        assert!(matches!(
            decision,
            Decision::PendingManagerReview { impact_score, .. } if impact_score == 0.0
        ));
    }

    #[tokio::test]
    async fn worked_example_rejects_for_high_impact() {
        // Ten members, two away (20%), one open 16h task due in a 3-day
        // window of 24 available hours: 0.67 impact, past the 0.6 bar.
        let eval = evaluator(10, 2, &[16.0]);
        let decision = decide(&eval, "2026-05-11", "2026-05-13").await.unwrap();
        assert!(rejected_with(&decision, "High workload impact: 0.67"));
    }

    #[tokio::test]
    async fn team_store_failure_is_fatal_not_a_decision() {
        let eval = LeaveEvaluator::new(
            LeavePolicy::default(),
            Arc::new(UnavailableTeams),
            Arc::new(FakeTasks { items: vec![] }),
        );
        let result = eval
            .evaluate_as_of(1, 1, d("2026-05-11"), d("2026-05-12"), today())
            .await;
        assert!(matches!(result, Err(EvaluationError::DataUnavailable(_))));
    }

    #[tokio::test]
    async fn task_store_failure_is_fatal_not_a_decision() {
        let eval = LeaveEvaluator::new(
            LeavePolicy::default(),
            Arc::new(FakeTeams {
                snapshot: TeamSnapshot {
                    total_members: 10,
                    committed_on_leave: 0,
                },
            }),
            Arc::new(UnavailableTasks),
        );
        let result = eval
            .evaluate_as_of(1, 1, d("2026-05-11"), d("2026-05-12"), today())
            .await;
        assert!(matches!(result, Err(EvaluationError::DataUnavailable(_))));
    }

    #[tokio::test]
    async fn preview_reports_rounded_metrics_and_day_count() {
        let eval = evaluator(10, 2, &[16.0]);
        let preview = eval.preview(1, 1, d("2026-05-11"), d("2026-05-13")).await.unwrap();
        assert_eq!(
            preview,
            ImpactPreview {
                impact_score: 0.67,
                team_absence: 20.0,
                leave_days: 3
            }
        );
    }

    #[test]
    fn decisions_serialize_to_the_wire_shapes() {
        let rejected = serde_json::to_value(Decision::AutoRejected {
            reason: "Cannot apply for leave in the past".to_string(),
        })
        .unwrap();
        assert_eq!(
            rejected,
            serde_json::json!({
                "status": "AUTO_REJECTED",
                "reason": "Cannot apply for leave in the past"
            })
        );

        let approved = serde_json::to_value(Decision::AutoApproved {
            impact_score: 0.25,
            team_absence: 30.0,
        })
        .unwrap();
        assert_eq!(
            approved,
            serde_json::json!({
                "status": "AUTO_APPROVED",
                "impactScore": 0.25,
                "teamAbsence": 30.0
            })
        );

        let pending = serde_json::to_value(Decision::PendingManagerReview {
            impact_score: 0.5,
            team_absence: 10.0,
        })
        .unwrap();
        assert_eq!(pending["status"], "PENDING_MANAGER_REVIEW");
    }
}
