use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::dto::response_dto::{
    AnswerResult, IncomingAnswer, RedoItem, SubmissionSummary, SubmitResponsesResponse,
};
use crate::error::Result;
use crate::models::question::Question;
use crate::services::grading_service::{grade_answer, GradingService};

#[derive(Clone)]
pub struct AttemptService {
    pool: PgPool,
    grading: GradingService,
}

impl AttemptService {
    pub fn new(pool: PgPool) -> Self {
        let grading = GradingService::new(pool.clone());
        Self { pool, grading }
    }

    /// Record one submission for one unit: create a fresh attempt (every
    /// call creates a new one), grade each answer against the stored keys,
    /// upsert the per-question responses, complete the attempt, then
    /// re-grade the owning book.
    pub async fn submit_responses(
        &self,
        child_id: Uuid,
        unit_id: i64,
        answers: Vec<IncomingAnswer>,
    ) -> Result<SubmitResponsesResponse> {
        let attempt_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO unit_attempts (child_id, unit_id, started_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(child_id)
        .bind(unit_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        // Keys for every question in the unit, not just the submitted ones.
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, unit_id, question_index, question_number, type, prompt, options,
                   answer_key, correct_answer
            FROM questions
            WHERE unit_id = $1
            "#,
        )
        .bind(unit_id)
        .fetch_all(&self.pool)
        .await?;
        let by_id: HashMap<i64, &Question> = questions.iter().map(|q| (q.id, q)).collect();

        let mut results = Vec::with_capacity(answers.len());
        let mut correct = 0i32;
        for answer in &answers {
            let expected = by_id
                .get(&answer.question_id)
                .and_then(|q| q.effective_key());
            let is_correct = grade_answer(expected, &answer.answer);
            if is_correct {
                correct += 1;
            }

            sqlx::query(
                r#"
                INSERT INTO responses (attempt_id, question_id, answer, correct)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (attempt_id, question_id) DO UPDATE
                SET answer = EXCLUDED.answer, correct = EXCLUDED.correct
                "#,
            )
            .bind(attempt_id)
            .bind(answer.question_id)
            .bind(&answer.answer)
            .bind(is_correct)
            .execute(&self.pool)
            .await?;

            results.push(AnswerResult {
                question_id: answer.question_id.to_string(),
                correct: is_correct,
            });
        }

        let total = answers.len() as i32;
        // Unit scores report 0 when nothing was scored; only the book-level
        // score uses null for "no data".
        let score = if total > 0 {
            f64::from(correct) / f64::from(total)
        } else {
            0.0
        };

        sqlx::query(
            r#"
            UPDATE unit_attempts
            SET correct_count = $1, total_count = $2, completed_at = $3
            WHERE id = $4
            "#,
        )
        .bind(correct)
        .bind(total)
        .bind(Utc::now())
        .bind(attempt_id)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "Attempt {} graded for child {}: {}/{} correct",
            attempt_id,
            child_id,
            correct,
            total
        );

        let redo = results
            .iter()
            .filter(|r| !r.correct)
            .map(|r| RedoItem {
                question_id: r.question_id.clone(),
            })
            .collect();

        let book_id: Option<i64> = sqlx::query_scalar("SELECT book_id FROM units WHERE id = $1")
            .bind(unit_id)
            .fetch_optional(&self.pool)
            .await?;
        let book_status = match book_id {
            Some(book_id) => Some(self.grading.regrade_after_submission(child_id, book_id).await?),
            None => None,
        };

        Ok(SubmitResponsesResponse {
            attempt_id,
            summary: SubmissionSummary {
                correct,
                total,
                score,
            },
            results,
            redo,
            book_status,
        })
    }
}
