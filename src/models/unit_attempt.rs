use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One submission event for one unit by one child. Several attempts may
/// exist per (child, unit); grading only ever looks at the one with the
/// most recent `started_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UnitAttempt {
    pub id: Uuid,
    pub child_id: Uuid,
    pub unit_id: i64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub correct_count: Option<i32>,
    pub total_count: Option<i32>,
}
