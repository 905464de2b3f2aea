use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamMember {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = "Ayesha Rahman")]
    pub name: String,
    #[schema(example = "ayesha@company.com")]
    pub email: String,
    #[schema(example = 3)]
    pub role_id: u8,
    #[schema(example = 2, nullable = true)]
    pub team_id: Option<u64>,
    #[schema(example = "2025-11-01T09:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
