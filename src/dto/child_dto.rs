use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateChildRequest {
    pub name: Option<String>,
    pub level_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateChildRequest {
    pub name: Option<String>,
    pub level_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChildSummary {
    pub id: Uuid,
    pub name: String,
    pub level_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChildUpdated {
    pub id: Uuid,
    pub name: String,
    pub level_code: Option<String>,
}
