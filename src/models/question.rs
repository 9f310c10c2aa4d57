use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// A question row as stored. Older content populates `question_number` and
/// `correct_answer` where newer content uses `question_index` and
/// `answer_key`; the accessors below coalesce the pairs so the rest of the
/// code never re-derives the rule.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub unit_id: i64,
    pub question_index: Option<i32>,
    pub question_number: Option<i32>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub question_type: Option<String>,
    pub prompt: Option<JsonValue>,
    pub options: Option<JsonValue>,
    pub answer_key: Option<JsonValue>,
    pub correct_answer: Option<JsonValue>,
}

impl Question {
    /// `answer_key` wins over `correct_answer`; a JSON null counts as absent.
    pub fn effective_key(&self) -> Option<&JsonValue> {
        non_null(self.answer_key.as_ref()).or_else(|| non_null(self.correct_answer.as_ref()))
    }

    pub fn effective_index(&self) -> Option<i32> {
        self.question_index.or(self.question_number)
    }

    pub fn effective_type(&self) -> &str {
        self.question_type.as_deref().unwrap_or("short_answer")
    }
}

fn non_null(v: Option<&JsonValue>) -> Option<&JsonValue> {
    v.filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question() -> Question {
        Question {
            id: 1,
            unit_id: 1,
            question_index: None,
            question_number: None,
            question_type: None,
            prompt: None,
            options: None,
            answer_key: None,
            correct_answer: None,
        }
    }

    #[test]
    fn answer_key_takes_precedence_over_correct_answer() {
        let mut q = question();
        q.answer_key = Some(json!("a"));
        q.correct_answer = Some(json!("b"));
        assert_eq!(q.effective_key(), Some(&json!("a")));
    }

    #[test]
    fn falls_back_to_correct_answer() {
        let mut q = question();
        q.correct_answer = Some(json!("b"));
        assert_eq!(q.effective_key(), Some(&json!("b")));
    }

    #[test]
    fn json_null_key_counts_as_absent() {
        let mut q = question();
        q.answer_key = Some(JsonValue::Null);
        q.correct_answer = Some(json!("b"));
        assert_eq!(q.effective_key(), Some(&json!("b")));

        q.correct_answer = Some(JsonValue::Null);
        assert_eq!(q.effective_key(), None);
    }

    #[test]
    fn index_falls_back_to_number_and_type_defaults() {
        let mut q = question();
        assert_eq!(q.effective_index(), None);
        q.question_number = Some(4);
        assert_eq!(q.effective_index(), Some(4));
        q.question_index = Some(2);
        assert_eq!(q.effective_index(), Some(2));
        assert_eq!(q.effective_type(), "short_answer");
        q.question_type = Some("multiple_choice".to_string());
        assert_eq!(q.effective_type(), "multiple_choice");
    }
}
