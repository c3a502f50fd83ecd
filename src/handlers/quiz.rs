// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::attempt::SubmitQuizRequest,
    scoring::{AttemptLedger, leaderboard},
    utils::jwt::Claims,
};

/// Submits a student's answers for a quiz and scores them.
///
/// * Extracts the student id from the token.
/// * Rejects the submission once the attempt cap is reached.
/// * Records the attempt with one answer row per submitted pair.
pub async fn take_quiz(
    State(ledger): State<AttemptLedger>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    let student_id = claims.user_id()?;

    let result = ledger.submit(student_id, quiz_id, &req.answers).await?;

    Ok(Json(serde_json::json!({
        "message": "Quiz attempt recorded.",
        "attempt_id": result.attempt_id,
        "score": result.score,
        "correct_answers_count": result.correct_answers_count,
        "total_questions": result.total_questions,
        "passed": result.passed,
    })))
}

/// Tells the quiz form whether another attempt is allowed.
pub async fn can_submit_quiz(
    State(ledger): State<AttemptLedger>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let eligibility = ledger.eligibility(claims.user_id()?, quiz_id).await?;
    let can_submit = eligibility.can_submit();

    Ok(Json(serde_json::json!({
        "can_submit": can_submit,
        "attempts_used": eligibility.attempts_used,
        "attempts_remaining": eligibility.attempts_remaining(),
        "max_attempts": eligibility.max_attempts,
        "message": if can_submit {
            "You can submit the quiz."
        } else {
            "You have reached the maximum number of attempts for this quiz."
        },
    })))
}

/// The caller's attempts, newest first.
pub async fn attempts_by_student(
    State(ledger): State<AttemptLedger>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = ledger
        .store()
        .attempts_by_student(claims.user_id()?)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch quiz attempts: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(attempts))
}

/// One of the caller's attempts with the recorded answers.
pub async fn attempt_by_id(
    State(ledger): State<AttemptLedger>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let detail = ledger.attempt_detail(claims.user_id()?, attempt_id).await?;
    Ok(Json(detail))
}

/// Highest score of every attempted quiz.
pub async fn get_leaderboard(
    State(ledger): State<AttemptLedger>,
) -> Result<impl IntoResponse, AppError> {
    let board = leaderboard::leaderboard(ledger.store()).await?;
    Ok(Json(board))
}
