// src/handlers/quiz.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        attempt::{
            AnswerResult, AttemptSummary, QuizAttempt, QuizResult, SubmitQuizRequest,
            SubmittedAnswer, UserAnswer,
        },
        question::Question,
        user::Role,
    },
    utils::jwt::Claims,
};

/// Rounds to two decimal places, the precision stored and reported for
/// every percentage in the system.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percentage(correct: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(correct as f64 / total as f64 * 100.0)
}

/// Scores a submission against the question snapshot.
///
/// Answers whose question reference does not resolve are dropped silently.
/// The -1 "unanswered" sentinel never equals a stored index, so it is
/// always marked incorrect. Returns the retained answers in submission
/// order along with the correct count.
fn score_answers(
    submitted: &[SubmittedAnswer],
    questions: &HashMap<String, Question>,
) -> (Vec<UserAnswer>, i64) {
    let mut answers = Vec::new();
    let mut correct = 0;

    for answer in submitted {
        if let Some(question) = questions.get(&answer.question_id) {
            let is_correct = answer.selected_answer == question.correct_answer;
            if is_correct {
                correct += 1;
            }
            answers.push(UserAnswer {
                question_id: answer.question_id.clone(),
                selected_answer: answer.selected_answer,
                is_correct,
            });
        }
    }

    (answers, correct)
}

/// Joins stored answers against the current question set for review.
/// Answers referencing a since-deleted question are omitted; the stored
/// aggregates are not recomputed.
fn review_answers(
    stored: &[UserAnswer],
    questions: &HashMap<String, Question>,
) -> Vec<AnswerResult> {
    stored
        .iter()
        .filter_map(|answer| {
            questions.get(&answer.question_id).map(|q| AnswerResult {
                question_id: answer.question_id.clone(),
                question_text: q.question_text.clone(),
                options: q.options.0.clone(),
                correct_answer: q.correct_answer,
                selected_answer: answer.selected_answer,
                is_correct: answer.is_correct,
            })
        })
        .collect()
}

async fn load_question_snapshot(
    pool: &SqlitePool,
) -> Result<HashMap<String, Question>, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        "SELECT id, question_text, options, correct_answer, created_at FROM questions",
    )
    .fetch_all(pool)
    .await?;

    Ok(questions.into_iter().map(|q| (q.id.clone(), q)).collect())
}

/// Submits a user's quiz answers, scores them and persists the attempt.
///
/// * total = size of the current question snapshot, NOT the number of
///   submitted answers; unanswered questions count as wrong.
/// * Identity fields are denormalized from the verified token claims.
/// * An empty answer list is a valid submission and scores 0.
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let questions = load_question_snapshot(&pool).await?;

    let (answers, correct) = score_answers(&req.answers, &questions);
    let total = questions.len() as i64;

    let attempt = QuizAttempt {
        id: Uuid::new_v4().to_string(),
        user_id: claims.sub,
        user_name: claims.name,
        user_email: claims.email,
        answers: sqlx::types::Json(answers),
        score: correct,
        total_questions: total,
        correct_answers: correct,
        wrong_answers: total - correct,
        percentage: percentage(correct, total),
        time_taken: req.time_taken,
        completed_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO quiz_attempts \
         (id, user_id, user_name, user_email, answers, score, total_questions, \
          correct_answers, wrong_answers, percentage, time_taken, completed_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&attempt.id)
    .bind(&attempt.user_id)
    .bind(&attempt.user_name)
    .bind(&attempt.user_email)
    .bind(&attempt.answers)
    .bind(attempt.score)
    .bind(attempt.total_questions)
    .bind(attempt.correct_answers)
    .bind(attempt.wrong_answers)
    .bind(attempt.percentage)
    .bind(attempt.time_taken)
    .bind(attempt.completed_at)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert quiz attempt: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let answer_results = review_answers(&attempt.answers, &questions);

    Ok(Json(QuizResult {
        id: attempt.id,
        score: attempt.score,
        total_questions: attempt.total_questions,
        correct_answers: attempt.correct_answers,
        wrong_answers: attempt.wrong_answers,
        percentage: attempt.percentage,
        time_taken: attempt.time_taken,
        completed_at: attempt.completed_at,
        answer_results,
    }))
}

/// Lists the caller's attempts as summaries, newest first.
pub async fn get_history(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = sqlx::query_as::<_, AttemptSummary>(
        "SELECT id, score, total_questions, correct_answers, wrong_answers, percentage, \
         time_taken, completed_at \
         FROM quiz_attempts WHERE user_id = ? ORDER BY completed_at DESC",
    )
    .bind(&claims.sub)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch quiz history: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(attempts))
}

/// Retrieves one attempt with full review detail.
///
/// Only the attempt's owner or an admin may read it; everyone else gets a
/// 403 with no attempt content.
pub async fn get_result(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = sqlx::query_as::<_, QuizAttempt>(
        "SELECT id, user_id, user_name, user_email, answers, score, total_questions, \
         correct_answers, wrong_answers, percentage, time_taken, completed_at \
         FROM quiz_attempts WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz attempt not found".to_string()))?;

    if attempt.user_id != claims.sub && claims.role != Role::Admin {
        return Err(AppError::Forbidden(
            "You are not authorized to view this attempt".to_string(),
        ));
    }

    let questions = load_question_snapshot(&pool).await?;
    let answer_results = review_answers(&attempt.answers, &questions);

    Ok(Json(QuizResult {
        id: attempt.id,
        score: attempt.score,
        total_questions: attempt.total_questions,
        correct_answers: attempt.correct_answers,
        wrong_answers: attempt.wrong_answers,
        percentage: attempt.percentage,
        time_taken: attempt.time_taken,
        completed_at: attempt.completed_at,
        answer_results,
    }))
}
