use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Child {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub name: String,
    pub current_level_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
