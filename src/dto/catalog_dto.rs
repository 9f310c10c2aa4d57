use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

use crate::models::question::Question;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LevelDoc {
    pub code: String,
    pub ordinal: i32,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillDoc {
    pub code: String,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BooksQuery {
    pub level: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i64,
    pub level_code: Option<String>,
    pub skill_code: Option<String>,
    pub title: String,
    pub order_index: i32,
    pub total_units: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookSummary {
    pub id: String,
    pub level_code: Option<String>,
    pub skill_code: Option<String>,
    pub title: String,
    pub order_index: i32,
    pub total_units: i32,
}

impl From<BookRow> for BookSummary {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id.to_string(),
            level_code: row.level_code,
            skill_code: row.skill_code,
            title: row.title,
            order_index: row.order_index,
            total_units: row.total_units,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookDoc {
    pub id: String,
    pub level_code: Option<String>,
    pub skill_code: Option<String>,
    pub title: String,
    pub total_units: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProgressDoc {
    pub status: String,
    pub score: Option<f64>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookDetailResponse {
    pub book: BookDoc,
    pub progress: Option<ProgressDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitsQuery {
    pub book_id: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct UnitRow {
    pub id: i64,
    pub unit_index: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitDoc {
    pub id: String,
    pub unit_index: i32,
}

impl From<UnitRow> for UnitDoc {
    fn from(row: UnitRow) -> Self {
        Self {
            id: row.id.to_string(),
            unit_index: row.unit_index,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionsQuery {
    pub unit_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionDoc {
    pub id: String,
    pub question_index: Option<i32>,
    #[serde(rename = "type")]
    pub question_type: String,
    pub prompt: JsonValue,
    pub options: Option<JsonValue>,
}

impl From<Question> for QuestionDoc {
    fn from(q: Question) -> Self {
        Self {
            id: q.id.to_string(),
            question_index: q.effective_index(),
            question_type: q.effective_type().to_string(),
            prompt: q.prompt.unwrap_or_else(|| serde_json::json!({})),
            options: q.options.filter(|v| !v.is_null()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitQuestionsResponse {
    pub unit: UnitDoc,
    pub questions: Vec<QuestionDoc>,
}
