use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct ChildHeader {
    pub id: Uuid,
    pub name: String,
    pub level_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookProgressEntry {
    pub book_id: String,
    pub skill_code: Option<String>,
    pub status: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelProgress {
    pub code: Option<String>,
    pub books: Vec<BookProgressEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChildProgressResponse {
    pub child: ChildHeader,
    pub levels: Vec<LevelProgress>,
}
