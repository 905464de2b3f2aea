use crate::api::leave::{
    ApplyLeave, LeaveHistoryResponse, PreviewLeave, UpdateLeaveStatus,
};
use crate::engine::Decision;
use crate::model::leave::{Leave, LeaveStatus};
use crate::model::project::Project;
use crate::model::task::Task;
use crate::model::team::Team;
use crate::model::user::TeamMember;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::Modify;
use utoipa::{openapi, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management API",
        version = "1.0.0",
        description = r#"
## Leave-Request Approval Backend

This API powers a workplace leave management system whose applications are
decided automatically by a rule evaluator.

### 🔹 Key Features
- **Leave Management**
  - Apply for leave and get an instant decision: auto-approved,
    auto-rejected, or escalated to a manager
  - Preview the workload impact of a window before applying
  - Managers approve or reject escalated requests for their own team
- **Team Visibility**
  - Team card, roster, and absence statistics
- **Project Visibility**
  - Enrolled projects, per-project open-task load, and upcoming deadlines

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Manager-only operations require a **Manager** or **Admin** role.

### 📦 Response Format
- JSON-based RESTful responses

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave::apply_leave,
        crate::api::leave::preview_impact,
        crate::api::leave::my_leaves,
        crate::api::leave::update_leave_status,

        crate::api::team::my_team,
        crate::api::team::team_members,
        crate::api::team::team_info,

        crate::api::project::my_projects,
        crate::api::project::deadlines,
        crate::api::project::get_project
    ),
    components(
        schemas(
            ApplyLeave,
            PreviewLeave,
            UpdateLeaveStatus,
            LeaveHistoryResponse,
            Leave,
            LeaveStatus,
            Decision,
            Team,
            TeamMember,
            Task,
            Project
        )
    ),
    tags(
        (name = "Leave", description = "Leave application and decision APIs"),
        (name = "Team", description = "Team visibility APIs"),
        (name = "Project", description = "Project and workload visibility APIs"),
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
