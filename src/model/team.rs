use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Team {
    #[schema(example = 2)]
    pub id: u64,
    #[schema(example = "Platform")]
    pub name: String,
    #[schema(example = "Owns the deployment pipeline", nullable = true)]
    pub description: Option<String>,
    #[schema(example = "2025-01-15T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
