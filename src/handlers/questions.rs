// src/handlers/questions.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{Question, QuestionRequest},
};

/// Lists the whole question bank.
///
/// Open to every authenticated user and returns the stored record as-is,
/// correct-answer index included.
pub async fn list_questions(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        "SELECT id, question_text, options, correct_answer, created_at FROM questions",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(questions))
}

/// Retrieves a single question by ID.
/// Admin only.
pub async fn get_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let question = sqlx::query_as::<_, Question>(
        "SELECT id, question_text, options, correct_answer, created_at \
         FROM questions WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(question))
}

/// Creates a new quiz question.
/// Admin only.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Json(payload): Json<QuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    if !payload.check_answer_index() {
        return Err(AppError::BadRequest(
            "correctAnswer must be a valid index into options".to_string(),
        ));
    }

    let question = Question {
        id: Uuid::new_v4().to_string(),
        question_text: payload.question_text,
        options: sqlx::types::Json(payload.options),
        correct_answer: payload.correct_answer,
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO questions (id, question_text, options, correct_answer, created_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&question.id)
    .bind(&question.question_text)
    .bind(&question.options)
    .bind(question.correct_answer)
    .bind(question.created_at)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Fully replaces a question's text, options and correct-answer index.
/// Admin only.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    if !payload.check_answer_index() {
        return Err(AppError::BadRequest(
            "correctAnswer must be a valid index into options".to_string(),
        ));
    }

    let result = sqlx::query(
        "UPDATE questions SET question_text = ?, options = ?, correct_answer = ? WHERE id = ?",
    )
    .bind(&payload.question_text)
    .bind(sqlx::types::Json(&payload.options))
    .bind(payload.correct_answer)
    .bind(id.to_string())
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Deletes a quiz question by ID.
///
/// Hard delete, no cascade: attempts that reference the question keep their
/// stored score and the readers drop the dangling answer from review detail.
/// Admin only.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id.to_string())
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
