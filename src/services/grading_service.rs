use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::dto::response_dto::BookStatusReport;
use crate::error::Result;
use crate::models::unit_attempt::UnitAttempt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    NotStarted,
    InProgress,
    Redo,
    Completed,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::NotStarted => "not_started",
            BookStatus::InProgress => "in_progress",
            BookStatus::Redo => "redo",
            BookStatus::Completed => "completed",
        }
    }
}

/// Reduce raw attempt history to the most recent attempt per unit. Older
/// attempts for a unit are superseded and never influence grading.
pub fn latest_attempts_per_unit(attempts: &[UnitAttempt]) -> Vec<UnitAttempt> {
    let mut latest: HashMap<i64, &UnitAttempt> = HashMap::new();
    for attempt in attempts {
        let newer = latest
            .get(&attempt.unit_id)
            .map_or(true, |current| attempt.started_at > current.started_at);
        if newer {
            latest.insert(attempt.unit_id, attempt);
        }
    }
    let mut out: Vec<UnitAttempt> = latest.into_values().cloned().collect();
    out.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    out
}

/// Book status and score as a pure function of the latest attempt per unit.
/// Both grading triggers (direct book grade and response submission) go
/// through here, so they cannot drift apart.
///
/// A latest attempt with a zero total counts as incorrect: the child touched
/// the unit but nothing was scored, so the book needs a redo rather than
/// sitting in `in_progress` forever.
pub fn compute_book_status(latest: &[UnitAttempt]) -> (BookStatus, Option<f64>) {
    if latest.is_empty() {
        return (BookStatus::NotStarted, None);
    }

    let mut any_incorrect = false;
    let mut all_complete_and_correct = true;
    let mut sum = 0.0;
    let mut denom = 0u32;

    for attempt in latest {
        let total = attempt.total_count.unwrap_or(0);
        let correct = attempt.correct_count.unwrap_or(0);
        if total > 0 {
            sum += f64::from(correct) / f64::from(total);
            denom += 1;
            if correct < total {
                any_incorrect = true;
            }
            // Completion requires exact equality; a corrupt row with
            // correct > total must not read as complete-and-correct.
            if correct != total {
                all_complete_and_correct = false;
            }
        } else {
            any_incorrect = true;
            all_complete_and_correct = false;
        }
    }

    let status = if all_complete_and_correct {
        BookStatus::Completed
    } else if any_incorrect {
        BookStatus::Redo
    } else {
        BookStatus::InProgress
    };
    let score = (denom > 0).then(|| sum / f64::from(denom));
    (status, score)
}

/// Grade one submitted answer against the stored key.
pub fn grade_answer(expected: Option<&JsonValue>, submitted: &JsonValue) -> bool {
    match expected {
        // A missing key can never be satisfied.
        None => false,
        Some(JsonValue::Bool(key)) => truthy(submitted) == *key,
        Some(JsonValue::String(key)) => submitted
            .as_str()
            .map_or(false, |answer| normalize(answer) == normalize(key)),
        // Structured keys compare by deep equality; object key order is
        // insignificant.
        Some(other) => submitted == other,
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

#[derive(Clone)]
pub struct GradingService {
    pool: PgPool,
}

impl GradingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Direct book grade (`POST /books/:id/grade`). Recomputes status and
    /// score from attempt history and rewrites the whole progress row,
    /// including `started_at` and `completed_at`. `completed_at` reflects
    /// "currently completed": it is cleared again whenever a re-grade lands
    /// on any other status.
    pub async fn grade_book(&self, child_id: Uuid, book_id: i64) -> Result<BookStatusReport> {
        let unit_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM units WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;
        if unit_count == 0 {
            // Empty book: nothing to grade, and no progress row is written.
            return Ok(BookStatusReport {
                book_id: book_id.to_string(),
                status: BookStatus::NotStarted,
                score: None,
            });
        }

        let attempts = self.attempt_history(child_id, book_id).await?;
        let latest = latest_attempts_per_unit(&attempts);
        let (status, score) = compute_book_status(&latest);

        let started_at = latest.iter().map(|a| a.started_at).min();
        let completed_at = (status == BookStatus::Completed).then(Utc::now);
        tracing::debug!(
            "Book {} graded for child {}: status={}, score={:?}",
            book_id,
            child_id,
            status.as_str(),
            score
        );

        sqlx::query(
            r#"
            INSERT INTO book_progress (child_id, book_id, status, score, started_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (child_id, book_id) DO UPDATE
            SET status = EXCLUDED.status,
                score = EXCLUDED.score,
                started_at = EXCLUDED.started_at,
                completed_at = EXCLUDED.completed_at
            "#,
        )
        .bind(child_id)
        .bind(book_id)
        .bind(status.as_str())
        .bind(score)
        .bind(started_at)
        .bind(completed_at)
        .execute(&self.pool)
        .await?;

        Ok(BookStatusReport {
            book_id: book_id.to_string(),
            status,
            score,
        })
    }

    /// Re-grade triggered by a response submission. Only status and score
    /// are touched; timestamps set by a direct grade are preserved.
    pub async fn regrade_after_submission(
        &self,
        child_id: Uuid,
        book_id: i64,
    ) -> Result<BookStatusReport> {
        let attempts = self.attempt_history(child_id, book_id).await?;
        let latest = latest_attempts_per_unit(&attempts);
        let (status, score) = compute_book_status(&latest);

        sqlx::query(
            r#"
            INSERT INTO book_progress (child_id, book_id, status, score)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (child_id, book_id) DO UPDATE
            SET status = EXCLUDED.status,
                score = EXCLUDED.score
            "#,
        )
        .bind(child_id)
        .bind(book_id)
        .bind(status.as_str())
        .bind(score)
        .execute(&self.pool)
        .await?;

        Ok(BookStatusReport {
            book_id: book_id.to_string(),
            status,
            score,
        })
    }

    async fn attempt_history(&self, child_id: Uuid, book_id: i64) -> Result<Vec<UnitAttempt>> {
        let attempts = sqlx::query_as::<_, UnitAttempt>(
            r#"
            SELECT ua.id, ua.child_id, ua.unit_id, ua.started_at, ua.completed_at,
                   ua.correct_count, ua.total_count
            FROM unit_attempts ua
            JOIN units u ON u.id = ua.unit_id
            WHERE ua.child_id = $1 AND u.book_id = $2
            ORDER BY ua.started_at DESC
            "#,
        )
        .bind(child_id)
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    fn attempt(unit_id: i64, correct: i32, total: i32, minutes_ago: i64) -> UnitAttempt {
        let started_at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
            - Duration::minutes(minutes_ago);
        UnitAttempt {
            id: Uuid::new_v4(),
            child_id: Uuid::new_v4(),
            unit_id,
            started_at,
            completed_at: Some(started_at),
            correct_count: Some(correct),
            total_count: Some(total),
        }
    }

    #[test]
    fn not_started_without_attempts() {
        assert_eq!(compute_book_status(&[]), (BookStatus::NotStarted, None));
    }

    #[test]
    fn completed_when_every_latest_attempt_is_fully_correct() {
        let latest = vec![attempt(1, 3, 3, 10), attempt(2, 2, 2, 5)];
        assert_eq!(
            compute_book_status(&latest),
            (BookStatus::Completed, Some(1.0))
        );
    }

    #[test]
    fn redo_when_any_latest_attempt_is_incorrect() {
        // Unit 1: 3/3, unit 2: 1/2 -> redo, score (1 + 0.5) / 2.
        let latest = vec![attempt(1, 3, 3, 10), attempt(2, 1, 2, 5)];
        assert_eq!(compute_book_status(&latest), (BookStatus::Redo, Some(0.75)));
    }

    #[test]
    fn zero_total_attempt_counts_as_incorrect() {
        let latest = vec![attempt(1, 0, 0, 10)];
        assert_eq!(compute_book_status(&latest), (BookStatus::Redo, None));
    }

    #[test]
    fn zero_total_never_reaches_completed() {
        let latest = vec![attempt(1, 2, 2, 10), attempt(2, 0, 0, 5)];
        let (status, score) = compute_book_status(&latest);
        assert_eq!(status, BookStatus::Redo);
        assert_eq!(score, Some(1.0));
    }

    #[test]
    fn over_counted_attempt_is_not_completed() {
        // correct_count > total_count is corrupt data, never "completed".
        let latest = vec![attempt(1, 3, 2, 10)];
        let (status, _) = compute_book_status(&latest);
        assert_eq!(status, BookStatus::InProgress);

        let latest = vec![attempt(1, 2, 2, 10), attempt(2, 3, 2, 5)];
        let (status, _) = compute_book_status(&latest);
        assert_ne!(status, BookStatus::Completed);
    }

    #[test]
    fn grading_is_deterministic_for_a_fixed_attempt_set() {
        let latest = vec![attempt(1, 3, 3, 10), attempt(2, 1, 2, 5)];
        assert_eq!(compute_book_status(&latest), compute_book_status(&latest));
    }

    #[test]
    fn latest_attempt_wins_regardless_of_input_order() {
        let old = attempt(2, 1, 2, 60);
        let new = attempt(2, 2, 2, 5);
        let history = vec![old.clone(), new.clone(), attempt(1, 3, 3, 90)];
        let latest = latest_attempts_per_unit(&history);
        assert_eq!(latest.len(), 2);
        let unit2 = latest.iter().find(|a| a.unit_id == 2).unwrap();
        assert_eq!(unit2.id, new.id);

        // Insertion order must not matter.
        let reversed: Vec<UnitAttempt> = history.iter().rev().cloned().collect();
        let latest_rev = latest_attempts_per_unit(&reversed);
        let unit2_rev = latest_rev.iter().find(|a| a.unit_id == 2).unwrap();
        assert_eq!(unit2_rev.id, new.id);
    }

    #[test]
    fn resubmission_flips_redo_to_completed() {
        // First pass: unit 1 3/3, unit 2 1/2 -> redo at 0.75.
        let mut history = vec![attempt(1, 3, 3, 60), attempt(2, 1, 2, 50)];
        let (status, score) = compute_book_status(&latest_attempts_per_unit(&history));
        assert_eq!((status, score), (BookStatus::Redo, Some(0.75)));

        // Later, unit 2 is redone with 2/2 -> both latest attempts correct.
        history.push(attempt(2, 2, 2, 5));
        let (status, score) = compute_book_status(&latest_attempts_per_unit(&history));
        assert_eq!((status, score), (BookStatus::Completed, Some(1.0)));
    }

    #[test]
    fn missing_key_marks_answer_incorrect() {
        assert!(!grade_answer(None, &json!("anything")));
        assert!(!grade_answer(None, &JsonValue::Null));
    }

    #[test]
    fn boolean_key_compares_against_truthiness() {
        assert!(grade_answer(Some(&json!(true)), &json!(true)));
        assert!(grade_answer(Some(&json!(true)), &json!("yes")));
        assert!(grade_answer(Some(&json!(true)), &json!(1)));
        assert!(grade_answer(Some(&json!(false)), &json!("")));
        assert!(grade_answer(Some(&json!(false)), &json!(0)));
        assert!(!grade_answer(Some(&json!(true)), &JsonValue::Null));
    }

    #[test]
    fn string_key_is_normalized_before_comparison() {
        assert!(grade_answer(Some(&json!("Paris")), &json!(" paris ")));
        assert!(grade_answer(Some(&json!("  PARIS")), &json!("paris")));
        assert!(!grade_answer(Some(&json!("Paris")), &json!("london")));
    }

    #[test]
    fn non_string_answers_never_match_a_string_key() {
        assert!(!grade_answer(Some(&json!("4")), &json!(4)));
        assert!(!grade_answer(Some(&json!("true")), &json!(true)));
    }

    #[test]
    fn structured_key_uses_deep_equality() {
        let key = json!({"a": 1, "b": [1, 2]});
        assert!(grade_answer(Some(&key), &json!({"b": [1, 2], "a": 1})));
        assert!(!grade_answer(Some(&key), &json!({"a": 1, "b": [2, 1]})));
        assert!(grade_answer(Some(&json!([1, 2, 3])), &json!([1, 2, 3])));
        assert!(!grade_answer(Some(&json!([1, 2, 3])), &json!([3, 2, 1])));
    }
}
