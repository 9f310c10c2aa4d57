use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::catalog_dto::{
    BookDetailResponse, BookDoc, BookRow, BookSummary, LevelDoc, ProgressDoc, QuestionDoc,
    SkillDoc, UnitDoc, UnitQuestionsResponse, UnitRow,
};
use crate::error::{Error, Result};
use crate::models::question::Question;

#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_levels(&self) -> Result<Vec<LevelDoc>> {
        let levels = sqlx::query_as::<_, LevelDoc>(
            "SELECT code, ordinal, label FROM levels ORDER BY ordinal",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(levels)
    }

    pub async fn list_skills(&self) -> Result<Vec<SkillDoc>> {
        let skills =
            sqlx::query_as::<_, SkillDoc>("SELECT code, label FROM skills ORDER BY code")
                .fetch_all(&self.pool)
                .await?;
        Ok(skills)
    }

    /// Books for a level code. An unknown code is not an error, just an
    /// empty list.
    pub async fn books_by_level(&self, level_code: &str) -> Result<Vec<BookSummary>> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT b.id, l.code AS level_code, s.code AS skill_code, b.title,
                   b.order_index, COALESCE(b.total_units, 0) AS total_units
            FROM books b
            JOIN levels l ON l.id = b.level_id
            LEFT JOIN skills s ON s.id = b.skill_id
            WHERE l.code = $1
            ORDER BY b.order_index
            "#,
        )
        .bind(level_code)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BookSummary::from).collect())
    }

    pub async fn book_detail(
        &self,
        book_id: i64,
        child_id: Option<Uuid>,
    ) -> Result<BookDetailResponse> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT b.id, l.code AS level_code, s.code AS skill_code, b.title,
                   b.order_index, COALESCE(b.total_units, 0) AS total_units
            FROM books b
            LEFT JOIN levels l ON l.id = b.level_id
            LEFT JOIN skills s ON s.id = b.skill_id
            WHERE b.id = $1
            "#,
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Book not found".to_string()))?;

        let progress = match child_id {
            Some(child_id) => {
                sqlx::query_as::<_, ProgressDoc>(
                    r#"
                    SELECT status, score, started_at, completed_at
                    FROM book_progress
                    WHERE child_id = $1 AND book_id = $2
                    "#,
                )
                .bind(child_id)
                .bind(book_id)
                .fetch_optional(&self.pool)
                .await?
            }
            None => None,
        };

        Ok(BookDetailResponse {
            book: BookDoc {
                id: row.id.to_string(),
                level_code: row.level_code,
                skill_code: row.skill_code,
                title: row.title,
                total_units: row.total_units,
            },
            progress,
        })
    }

    pub async fn units_by_book(&self, book_id: i64) -> Result<Vec<UnitDoc>> {
        let units = sqlx::query_as::<_, UnitRow>(
            "SELECT id, unit_index FROM units WHERE book_id = $1 ORDER BY unit_index",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(units.into_iter().map(UnitDoc::from).collect())
    }

    pub async fn unit_questions(&self, unit_id: i64) -> Result<UnitQuestionsResponse> {
        let unit = sqlx::query_as::<_, UnitRow>(
            "SELECT id, unit_index FROM units WHERE id = $1",
        )
        .bind(unit_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Unit not found".to_string()))?;

        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, unit_id, question_index, question_number, type, prompt, options,
                   answer_key, correct_answer
            FROM questions
            WHERE unit_id = $1
            ORDER BY question_index, question_number
            "#,
        )
        .bind(unit_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(UnitQuestionsResponse {
            unit: UnitDoc::from(unit),
            questions: questions.into_iter().map(QuestionDoc::from).collect(),
        })
    }
}
