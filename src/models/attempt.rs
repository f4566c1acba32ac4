// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

/// One stored answer inside an attempt's serialized answer list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
    /// Weak reference: the question may have been deleted since.
    pub question_id: String,
    /// Selected option index; -1 marks an unanswered question.
    pub selected_answer: i64,
    pub is_correct: bool,
}

/// Represents the 'quiz_attempts' table in the database.
/// Immutable once inserted; there is no update or delete path.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: String,

    pub user_id: String,

    /// Captured from the caller's token claims at submit time, not
    /// re-joined against the users table later.
    pub user_name: String,
    pub user_email: String,

    /// Stored as a JSON array in a single column.
    pub answers: Json<Vec<UserAnswer>>,

    pub score: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub wrong_answers: i64,
    /// round(correct/total*100, 2); 0 when total is 0.
    pub percentage: f64,
    /// Seconds, as reported by the client.
    pub time_taken: i64,

    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for submitting a quiz.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    pub answers: Vec<SubmittedAnswer>,
    #[serde(default)]
    pub time_taken: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub selected_answer: i64,
}

/// Review entry: a stored answer joined with the current question record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    pub question_id: String,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: i64,
    pub selected_answer: i64,
    pub is_correct: bool,
}

/// Full scored payload returned by submit and by the result endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: String,
    pub score: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub wrong_answers: i64,
    pub percentage: f64,
    pub time_taken: i64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    pub answer_results: Vec<AnswerResult>,
}

/// History entry: aggregates only, no per-answer detail.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSummary {
    pub id: String,
    pub score: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub wrong_answers: i64,
    pub percentage: f64,
    pub time_taken: i64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}
