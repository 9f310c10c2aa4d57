use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::dto::progress_dto::{
    BookProgressEntry, ChildHeader, ChildProgressResponse, LevelProgress,
};
use crate::error::{Error, Result};
use crate::models::child::Child;

/// Read-only progress report. Status and score come from `book_progress` as
/// last written by the grading engine; nothing is recomputed here.
#[derive(Clone)]
pub struct ProgressService {
    pool: PgPool,
}

impl ProgressService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn child_report(&self, child_id: Uuid) -> Result<ChildProgressResponse> {
        let child = sqlx::query_as::<_, Child>(
            "SELECT id, parent_id, name, current_level_id, created_at FROM children WHERE id = $1",
        )
        .bind(child_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Child not found".to_string()))?;

        let level_code = match child.current_level_id {
            Some(level_id) => {
                sqlx::query_scalar::<_, String>("SELECT code FROM levels WHERE id = $1")
                    .bind(level_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };

        let books = match child.current_level_id {
            Some(level_id) => {
                sqlx::query_as::<_, (i64, Option<String>)>(
                    r#"
                    SELECT b.id, s.code
                    FROM books b
                    LEFT JOIN skills s ON s.id = b.skill_id
                    WHERE b.level_id = $1
                    ORDER BY b.order_index
                    "#,
                )
                .bind(level_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => Vec::new(),
        };

        let book_ids: Vec<i64> = books.iter().map(|(id, _)| *id).collect();
        let progress_rows = sqlx::query_as::<_, (i64, String, Option<f64>)>(
            "SELECT book_id, status, score FROM book_progress WHERE child_id = $1 AND book_id = ANY($2)",
        )
        .bind(child_id)
        .bind(&book_ids)
        .fetch_all(&self.pool)
        .await?;
        let by_book: HashMap<i64, (String, Option<f64>)> = progress_rows
            .into_iter()
            .map(|(book_id, status, score)| (book_id, (status, score)))
            .collect();

        let entries = books
            .into_iter()
            .map(|(book_id, skill_code)| {
                let (status, score) = by_book
                    .get(&book_id)
                    .cloned()
                    .unwrap_or(("not_started".to_string(), None));
                BookProgressEntry {
                    book_id: book_id.to_string(),
                    skill_code,
                    status,
                    score,
                }
            })
            .collect();

        Ok(ChildProgressResponse {
            child: ChildHeader {
                id: child.id,
                name: child.name,
                level_code: level_code.clone(),
            },
            levels: vec![LevelProgress {
                code: level_code,
                books: entries,
            }],
        })
    }
}
