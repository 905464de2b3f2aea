use std::str::FromStr;

use crate::auth::auth::AuthUser;
use crate::engine::{EvaluationError, LeaveEvaluator};
use crate::model::leave::{Leave, LeaveStatus};
use crate::utils::date_utils;
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ApplyLeave {
    #[schema(example = "2026-04-01", format = "date")]
    pub start_date: String,
    #[schema(example = "2026-04-03", format = "date")]
    pub end_date: String,
    #[schema(example = "Family trip")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct PreviewLeave {
    #[schema(example = "2026-04-01", format = "date")]
    pub start_date: String,
    #[schema(example = "2026-04-03", format = "date")]
    pub end_date: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeaveStatus {
    #[schema(example = "APPROVED")]
    pub status: String,
    #[schema(example = "Covered by on-call rotation", nullable = true)]
    pub manager_note: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveHistoryResponse {
    pub leaves: Vec<Leave>,
    #[schema(example = 1)]
    pub count: usize,
}

/// Parse both window dates or answer 400 before the evaluator runs.
fn parse_window(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), HttpResponse> {
    let start = date_utils::parse_date(start).map_err(|e| {
        HttpResponse::BadRequest().json(serde_json::json!({ "message": e.to_string() }))
    })?;
    let end = date_utils::parse_date(end).map_err(|e| {
        HttpResponse::BadRequest().json(serde_json::json!({ "message": e.to_string() }))
    })?;
    Ok((start, end))
}

fn evaluation_failed(e: EvaluationError) -> actix_web::Error {
    tracing::error!(error = %e, "Leave evaluation failed");
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

/* =========================
Apply for leave
========================= */
/// Swagger doc for apply_leave endpoint
#[utoipa::path(
    post,
    path = "/api/leaves/apply",
    request_body(
        content = ApplyLeave,
        description = "Leave application payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request evaluated and stored",
         body = Object,
         example = json!({
            "status": "AUTO_APPROVED",
            "impactScore": 0.25,
            "teamAbsence": 20.0,
            "leaveId": 17,
            "message": "Leave request submitted successfully"
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No team assigned")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn apply_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    evaluator: web::Data<LeaveEvaluator>,
    payload: web::Json<ApplyLeave>,
) -> actix_web::Result<impl Responder> {
    let team_id = auth.require_team()?;

    if payload.reason.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "start_date, end_date and reason are required"
        })));
    }

    // 1️⃣ validate dates
    let (start, end) = match parse_window(&payload.start_date, &payload.end_date) {
        Ok(window) => window,
        Err(resp) => return Ok(resp),
    };

    // 2️⃣ reject a second request over the same period
    let overlap = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM leaves
            WHERE user_id = ?
            AND status IN ('PENDING_MANAGER_REVIEW','AUTO_APPROVED','APPROVED')
            AND start_date <= ? AND end_date >= ?
        )
        "#,
    )
    .bind(auth.user_id)
    .bind(end)
    .bind(start)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Overlap check failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if overlap {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "You already have an approved or pending leave request in this period"
        })));
    }

    // 3️⃣ run the rule evaluator
    let decision = evaluator
        .evaluate(auth.user_id, team_id, start, end)
        .await
        .map_err(evaluation_failed)?;

    // 4️⃣ persist the leave with the decided status
    let result = sqlx::query(
        r#"
        INSERT INTO leaves
            (user_id, team_id, start_date, end_date, reason, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, NOW())
        "#,
    )
    .bind(auth.user_id)
    .bind(team_id)
    .bind(start)
    .bind(end)
    .bind(payload.reason.trim())
    .bind(decision.status().to_string())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to store leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let mut body = serde_json::to_value(&decision)
        .map_err(|_| actix_web::error::ErrorInternalServerError("Internal Server Error"))?;
    body["leaveId"] = serde_json::json!(result.last_insert_id());
    body["message"] = serde_json::json!("Leave request submitted successfully");

    Ok(HttpResponse::Created().json(body))
}

/* =========================
Preview impact before applying
========================= */
/// Swagger doc for preview_impact endpoint
#[utoipa::path(
    post,
    path = "/api/leaves/preview",
    request_body(
        content = PreviewLeave,
        description = "Window to preview",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Impact preview calculated",
         body = Object,
         example = json!({
            "impactScore": 0.67,
            "leaveDays": 3,
            "teamAbsence": 20.0,
            "message": "Impact preview calculated"
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No team assigned")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn preview_impact(
    auth: AuthUser,
    evaluator: web::Data<LeaveEvaluator>,
    payload: web::Json<PreviewLeave>,
) -> actix_web::Result<impl Responder> {
    let team_id = auth.require_team()?;

    let (start, end) = match parse_window(&payload.start_date, &payload.end_date) {
        Ok(window) => window,
        Err(resp) => return Ok(resp),
    };

    if date_utils::is_invalid_range(start, end) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    let preview = evaluator
        .preview(auth.user_id, team_id, start, end)
        .await
        .map_err(evaluation_failed)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "impactScore": preview.impact_score,
        "leaveDays": preview.leave_days,
        "teamAbsence": preview.team_absence,
        "message": "Impact preview calculated"
    })))
}

/* =========================
My leave history
========================= */
/// Swagger doc for my_leaves endpoint
#[utoipa::path(
    get,
    path = "/api/leaves/my",
    responses(
        (status = 200, description = "Requester's leave history", body = LeaveHistoryResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let leaves = sqlx::query_as::<_, Leave>(
        r#"
        SELECT id, start_date, end_date, status, reason, manager_note, created_at
        FROM leaves
        WHERE user_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch leave history");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let count = leaves.len();

    Ok(HttpResponse::Ok().json(LeaveHistoryResponse { leaves, count }))
}

/* =========================
Manager approve/reject (overwrites a pending decision)
========================= */
/// Swagger doc for update_leave_status endpoint
#[utoipa::path(
    patch,
    path = "/api/leaves/{leave_id}/status",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to decide")
    ),
    request_body(
        content = UpdateLeaveStatus,
        description = "Terminal status plus optional note",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave decided", body = Object, example = json!({
            "message": "Leave approved successfully",
            "leaveId": 17,
            "status": "APPROVED"
        })),
        (status = 400, description = "Invalid status or leave already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn update_leave_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeaveStatus>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let leave_id = path.into_inner();

    let status = LeaveStatus::from_str(&payload.status).ok();
    let status = match status {
        Some(s @ (LeaveStatus::Approved | LeaveStatus::Rejected)) => s,
        _ => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "status must be 'APPROVED' or 'REJECTED'"
            })));
        }
    };

    // Leave must exist, and a manager only decides for their own team.
    let leave_team = sqlx::query_as::<_, (Option<u64>,)>(
        r#"
        SELECT u.team_id
        FROM leaves l
        JOIN users u ON l.user_id = u.id
        WHERE l.id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let leave_team = match leave_team {
        Some((team_id,)) => team_id,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Leave request not found"
            })));
        }
    };

    if leave_team != auth.team_id {
        return Ok(HttpResponse::Forbidden().json(serde_json::json!({
            "message": "You can only manage leaves from your own team"
        })));
    }

    // Only a pending decision may be overwritten; auto decisions and
    // already-decided records stay as they are.
    let result = sqlx::query(
        r#"
        UPDATE leaves
        SET status = ?, manager_id = ?, manager_note = ?, updated_at = NOW()
        WHERE id = ?
        AND status = 'PENDING_MANAGER_REVIEW'
        "#,
    )
    .bind(status.to_string())
    .bind(auth.user_id)
    .bind(payload.manager_note.as_deref())
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Leave status update failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    let verb = if status == LeaveStatus::Approved {
        "approved"
    } else {
        "rejected"
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Leave {} successfully", verb),
        "leaveId": leave_id,
        "status": status.to_string()
    })))
}
