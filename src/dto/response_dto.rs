use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::services::grading_service::BookStatus;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitResponsesRequest {
    pub unit_id: Option<i64>,
    #[serde(default)]
    #[validate(length(min = 1, message = "unit_id and answers required"))]
    pub answers: Vec<IncomingAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingAnswer {
    #[serde(deserialize_with = "de_question_id")]
    pub question_id: i64,
    #[serde(default)]
    pub answer: JsonValue,
}

// Clients send question ids as either numbers or numeric strings.
fn de_question_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    match &value {
        JsonValue::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom("question_id must be an integer")),
        JsonValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom("question_id must be an integer")),
        _ => Err(serde::de::Error::custom("question_id must be an integer")),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerResult {
    pub question_id: String,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedoItem {
    pub question_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionSummary {
    pub correct: i32,
    pub total: i32,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookStatusReport {
    pub book_id: String,
    pub status: BookStatus,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponsesResponse {
    pub attempt_id: Uuid,
    pub summary: SubmissionSummary,
    pub results: Vec<AnswerResult>,
    pub redo: Vec<RedoItem>,
    pub book_status: Option<BookStatusReport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn question_id_accepts_number_or_numeric_string() {
        let a: IncomingAnswer =
            serde_json::from_value(json!({"question_id": 7, "answer": "x"})).unwrap();
        assert_eq!(a.question_id, 7);

        let a: IncomingAnswer =
            serde_json::from_value(json!({"question_id": "12", "answer": "x"})).unwrap();
        assert_eq!(a.question_id, 12);

        assert!(serde_json::from_value::<IncomingAnswer>(
            json!({"question_id": "seven", "answer": "x"})
        )
        .is_err());
    }

    #[test]
    fn empty_answers_fail_validation() {
        let req = SubmitResponsesRequest {
            unit_id: Some(1),
            answers: vec![],
        };
        assert!(req.validate().is_err());

        let req: SubmitResponsesRequest = serde_json::from_value(
            json!({"unit_id": 1, "answers": [{"question_id": 1, "answer": "x"}]}),
        )
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn missing_answer_defaults_to_null() {
        let a: IncomingAnswer = serde_json::from_value(json!({"question_id": 1})).unwrap();
        assert!(a.answer.is_null());
    }
}
