use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Project {
    #[schema(example = 5)]
    pub id: u64,
    #[schema(example = "Q2 Billing Revamp")]
    pub name: String,
    #[schema(example = "Replace the legacy invoicing flow", nullable = true)]
    pub description: Option<String>,
    #[schema(example = "2026-06-30", format = "date", value_type = String, nullable = true)]
    pub deadline: Option<NaiveDate>,
    #[schema(example = "ACTIVE", nullable = true)]
    pub status: Option<String>,
    #[schema(example = "2026-01-10T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
