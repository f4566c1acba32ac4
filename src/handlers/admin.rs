// src/handlers/admin.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        attempt::QuizAttempt,
        user::{Role, UserSummary},
    },
};

use super::quiz::round2;

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_questions: i64,
    pub total_attempts: i64,
    /// Mean of all stored attempt percentages, rounded to 2 decimals.
    pub average_score: f64,
}

/// Returns every stored attempt across all users, newest first.
/// Full rows, answers included, no redaction.
/// Admin only.
pub async fn get_reports(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let attempts = sqlx::query_as::<_, QuizAttempt>(
        "SELECT id, user_id, user_name, user_email, answers, score, total_questions, \
         correct_answers, wrong_answers, percentage, time_taken, completed_at \
         FROM quiz_attempts ORDER BY completed_at DESC",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch reports: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(attempts))
}

/// Aggregate statistics over the whole system.
/// Admin only.
pub async fn get_stats(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
        .bind(Role::User)
        .fetch_one(&pool)
        .await?;

    let total_questions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(&pool)
        .await?;

    let total_attempts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_attempts")
        .fetch_one(&pool)
        .await?;

    // AVG over zero rows yields NULL, which maps to "no attempts yet".
    let average: Option<f64> = sqlx::query_scalar("SELECT AVG(percentage) FROM quiz_attempts")
        .fetch_one(&pool)
        .await?;

    Ok(Json(StatsResponse {
        total_users,
        total_questions,
        total_attempts,
        average_score: round2(average.unwrap_or(0.0)),
    }))
}

/// Lists all regular-user accounts.
/// Admin only.
pub async fn list_users(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, UserSummary>(
        "SELECT id, email, name, created_at FROM users WHERE role = ? ORDER BY created_at DESC",
    )
    .bind(Role::User)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}
