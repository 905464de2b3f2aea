use crate::auth::auth::AuthUser;
use crate::model::team::Team;
use crate::model::user::TeamMember;
use actix_web::{web, HttpResponse, Responder};
use sqlx::MySqlPool;

async fn fetch_team(pool: &MySqlPool, team_id: u64) -> Result<Option<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>(
        r#"
        SELECT id, name, description, created_at
        FROM teams
        WHERE id = ?
        "#,
    )
    .bind(team_id)
    .fetch_optional(pool)
    .await
}

/* =========================
My team card
========================= */
/// Swagger doc for my_team endpoint
#[utoipa::path(
    get,
    path = "/api/team/my-team",
    responses(
        (status = 200, description = "Caller's team with member count", body = Object, example = json!({
            "team": { "id": 2, "name": "Platform", "description": null, "created_at": null },
            "memberCount": 10,
            "myUserId": 7
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No team assigned"),
        (status = 404, description = "Team not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Team"
)]
pub async fn my_team(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let team_id = auth.require_team()?;

    let team = fetch_team(pool.get_ref(), team_id).await.map_err(|e| {
        tracing::error!(error = %e, team_id, "Failed to fetch team");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let team = match team {
        Some(t) => t,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Team not found"
            })));
        }
    };

    let member_count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE team_id = ?")
            .bind(team_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, team_id, "Failed to count team members");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "team": team,
        "memberCount": member_count,
        "myUserId": auth.user_id
    })))
}

/* =========================
Team roster
========================= */
/// Swagger doc for team_members endpoint
#[utoipa::path(
    get,
    path = "/api/team/members",
    responses(
        (status = 200, description = "All members of the caller's team", body = Object, example = json!({
            "members": [],
            "count": 0,
            "teamId": 2
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No team assigned")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Team"
)]
pub async fn team_members(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let team_id = auth.require_team()?;

    let members = sqlx::query_as::<_, TeamMember>(
        r#"
        SELECT id, name, email, role_id, team_id, created_at
        FROM users
        WHERE team_id = ?
        ORDER BY name ASC
        "#,
    )
    .bind(team_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, team_id, "Failed to fetch team members");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let count = members.len();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "members": members,
        "count": count,
        "teamId": team_id
    })))
}

/* =========================
Team info with leave statistics
========================= */
/// Swagger doc for team_info endpoint
#[utoipa::path(
    get,
    path = "/api/team/info",
    responses(
        (status = 200, description = "Team info plus absence statistics", body = Object, example = json!({
            "team": { "id": 2, "name": "Platform", "description": null, "created_at": null },
            "statistics": { "totalMembers": 10, "activeLeaves": 2 }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No team assigned"),
        (status = 404, description = "Team not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Team"
)]
pub async fn team_info(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let team_id = auth.require_team()?;

    let team = fetch_team(pool.get_ref(), team_id).await.map_err(|e| {
        tracing::error!(error = %e, team_id, "Failed to fetch team");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let team = match team {
        Some(t) => t,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Team not found"
            })));
        }
    };

    // Active leaves today under the committed status set.
    let (total_members, active_leaves) = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT
            COUNT(DISTINCT u.id),
            COUNT(DISTINCT CASE
                WHEN l.status IN ('APPROVED','AUTO_APPROVED')
                AND CURDATE() BETWEEN l.start_date AND l.end_date
                THEN l.id
            END)
        FROM users u
        LEFT JOIN leaves l ON u.id = l.user_id
        WHERE u.team_id = ?
        "#,
    )
    .bind(team_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, team_id, "Failed to compute team statistics");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "team": team,
        "statistics": {
            "totalMembers": total_members,
            "activeLeaves": active_leaves
        }
    })))
}
