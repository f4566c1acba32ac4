// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'questions' table in the database.
///
/// The full record, correct answer included, is what the question-list
/// endpoint returns to authenticated users.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,

    /// The text of the question.
    pub question_text: String,

    /// Ordered option strings.
    /// Stored as a JSON array in a single column.
    pub options: Json<Vec<String>>,

    /// 0-based index into `options`.
    pub correct_answer: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating or fully replacing a question.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Question text length must be between 1 and 1000 characters."
    ))]
    pub question_text: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    pub correct_answer: i64,
}

impl QuestionRequest {
    /// The correct-answer index must point into the option list.
    /// `validate()` cannot see across fields, so handlers call this after it.
    pub fn check_answer_index(&self) -> bool {
        self.correct_answer >= 0 && (self.correct_answer as usize) < self.options.len()
    }
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.is_empty() {
        return Err(validator::ValidationError::new("options_cannot_be_empty"));
    }
    for opt in options {
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}
