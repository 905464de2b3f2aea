use std::collections::HashMap;

use crate::auth::auth::AuthUser;
use crate::model::project::Project;
use crate::model::task::{Task, TASK_DONE};
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use sqlx::prelude::FromRow;
use sqlx::MySqlPool;

#[derive(FromRow)]
struct TaskStatsRow {
    project_id: u64,
    total_tasks: i64,
    pending_tasks: i64,
    pending_hours: Option<f64>,
}

#[derive(FromRow)]
struct DeadlineRow {
    project_id: u64,
    project_name: String,
    deadline: NaiveDate,
    my_task_count: i64,
    pending_hours: Option<f64>,
}

fn internal_error(e: sqlx::Error, what: &str) -> actix_web::Error {
    tracing::error!(error = %e, "{}", what);
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

/* =========================
Projects the caller is enrolled in
========================= */
/// Swagger doc for my_projects endpoint
#[utoipa::path(
    get,
    path = "/api/projects/my-projects",
    responses(
        (status = 200, description = "Projects of the caller's team or with tasks assigned to the caller",
         body = Object,
         example = json!({ "projects": [], "count": 0 })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No team assigned")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Project"
)]
pub async fn my_projects(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let team_id = auth.require_team()?;

    let projects = sqlx::query_as::<_, Project>(
        r#"
        SELECT DISTINCT
            p.id,
            p.name,
            p.description,
            p.deadline,
            p.status,
            p.created_at
        FROM projects p
        LEFT JOIN tasks t
            ON p.id = t.project_id AND t.assigned_to = ?
        WHERE p.team_id = ? OR t.assigned_to = ?
        ORDER BY p.deadline ASC
        "#,
    )
    .bind(auth.user_id)
    .bind(team_id)
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| internal_error(e, "Failed to fetch projects"))?;

    // Task statistics for all projects in ONE query (avoids N+1)
    let mut stats: HashMap<u64, TaskStatsRow> = HashMap::new();

    if !projects.is_empty() {
        let placeholders = vec!["?"; projects.len()].join(",");
        let stats_sql = format!(
            r#"
            SELECT
                project_id,
                COUNT(*) AS total_tasks,
                COUNT(CASE WHEN status != '{done}' THEN 1 END) AS pending_tasks,
                SUM(CASE WHEN status != '{done}' THEN estimated_hours ELSE 0 END) AS pending_hours
            FROM tasks
            WHERE assigned_to = ?
            AND project_id IN ({placeholders})
            GROUP BY project_id
            "#,
            done = TASK_DONE,
            placeholders = placeholders
        );

        let mut stats_q = sqlx::query_as::<_, TaskStatsRow>(&stats_sql).bind(auth.user_id);
        for project in &projects {
            stats_q = stats_q.bind(project.id);
        }

        let rows = stats_q
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| internal_error(e, "Failed to fetch task statistics"))?;

        for row in rows {
            stats.insert(row.project_id, row);
        }
    }

    let projects_with_tasks: Vec<serde_json::Value> = projects
        .iter()
        .map(|project| {
            let my_tasks = match stats.get(&project.id) {
                Some(row) => serde_json::json!({
                    "total": row.total_tasks,
                    "pending": row.pending_tasks,
                    "pendingHours": row.pending_hours.unwrap_or(0.0)
                }),
                None => serde_json::json!({
                    "total": 0,
                    "pending": 0,
                    "pendingHours": 0.0
                }),
            };

            let mut value = serde_json::to_value(project).unwrap_or_default();
            value["myTasks"] = my_tasks;
            value
        })
        .collect();

    let count = projects_with_tasks.len();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "projects": projects_with_tasks,
        "count": count
    })))
}

/* =========================
Upcoming deadlines
========================= */
/// Swagger doc for deadlines endpoint
#[utoipa::path(
    get,
    path = "/api/projects/deadlines",
    responses(
        (status = 200, description = "Next project deadlines with the caller's pending hours",
         body = Object,
         example = json!({ "deadlines": [], "count": 0 })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No team assigned")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Project"
)]
pub async fn deadlines(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let team_id = auth.require_team()?;

    let sql = format!(
        r#"
        SELECT
            p.id AS project_id,
            p.name AS project_name,
            p.deadline,
            COUNT(t.id) AS my_task_count,
            SUM(CASE WHEN t.status != '{done}' THEN t.estimated_hours ELSE 0 END) AS pending_hours
        FROM projects p
        LEFT JOIN tasks t
            ON p.id = t.project_id AND t.assigned_to = ?
        WHERE (p.team_id = ? OR t.assigned_to = ?)
        AND p.deadline IS NOT NULL
        AND p.deadline >= CURDATE()
        GROUP BY p.id, p.name, p.deadline
        ORDER BY p.deadline ASC
        LIMIT 10
        "#,
        done = TASK_DONE
    );

    let rows = sqlx::query_as::<_, DeadlineRow>(&sql)
        .bind(auth.user_id)
        .bind(team_id)
        .bind(auth.user_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "Failed to fetch deadlines"))?;

    let deadlines: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            serde_json::json!({
                "projectId": row.project_id,
                "projectName": row.project_name,
                "deadline": row.deadline,
                "myTaskCount": row.my_task_count,
                "pendingHours": row.pending_hours.unwrap_or(0.0)
            })
        })
        .collect();

    let count = deadlines.len();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "deadlines": deadlines,
        "count": count
    })))
}

/* =========================
Project details
========================= */
/// Swagger doc for get_project endpoint
#[utoipa::path(
    get,
    path = "/api/projects/{project_id}",
    params(
        ("project_id" = u64, Path, description = "ID of the project to fetch")
    ),
    responses(
        (status = 200, description = "Project details with the caller's tasks", body = Object),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Project belongs to another team"),
        (status = 404, description = "Project not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Project"
)]
pub async fn get_project(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let team_id = auth.require_team()?;
    let project_id = path.into_inner();

    // team_id rides along for the access check below
    let row = sqlx::query_as::<_, (u64, String, Option<String>, Option<NaiveDate>, Option<String>, Option<chrono::DateTime<chrono::Utc>>, u64)>(
        r#"
        SELECT id, name, description, deadline, status, created_at, team_id
        FROM projects
        WHERE id = ?
        "#,
    )
    .bind(project_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| internal_error(e, "Failed to fetch project"))?;

    let (id, name, description, deadline, status, created_at, project_team) = match row {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Project not found"
            })));
        }
    };

    if project_team != team_id {
        return Ok(HttpResponse::Forbidden().json(serde_json::json!({
            "message": "Access denied: You are not part of this project"
        })));
    }

    let tasks = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, title, description, status, estimated_hours, due_date
        FROM tasks
        WHERE project_id = ? AND assigned_to = ?
        ORDER BY due_date ASC
        "#,
    )
    .bind(project_id)
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| internal_error(e, "Failed to fetch project tasks"))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "project": {
            "id": id,
            "name": name,
            "description": description,
            "deadline": deadline,
            "status": status,
            "created_at": created_at,
            "myTasks": tasks
        }
    })))
}
