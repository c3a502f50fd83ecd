// src/models/attempt.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'quiz_attempts' table in the database.
/// One scored submission of a quiz by a student. Attempts are history and are
/// never updated after their score is finalized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub student_id: i64,
    pub quiz_id: i64,
    /// Percentage in [0, 100] with two decimals.
    pub score: Decimal,
    pub passed: bool,
    pub attempt_time: DateTime<Utc>,
}

/// Represents the 'student_answers' table.
/// Correctness is not stored here; it is derived from the selected answer.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentAnswer {
    pub id: i64,
    pub quiz_attempt_id: i64,
    pub question_id: i64,
    pub selected_answer_id: i64,
}

/// A recorded answer joined with the question and the selected option.
/// `is_correct` reflects the option's flag at read time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentAnswerView {
    pub id: i64,
    pub question_id: i64,
    pub question_text: String,
    pub selected_answer: i64,
    pub text: String,
    pub is_correct: bool,
}

/// Attempt row joined with its quiz title, used for history listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizAttemptSummary {
    pub id: i64,
    pub quiz_id: i64,
    pub quiz_title: String,
    pub score: Decimal,
    pub passed: bool,
    pub attempt_time: DateTime<Utc>,
}

/// Full attempt with its recorded answers.
#[derive(Debug, Serialize)]
pub struct QuizAttemptDetail {
    #[serde(flatten)]
    pub attempt: QuizAttemptSummary,
    pub student_answers: Vec<StudentAnswerView>,
}

/// One (question, selected option) pair of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnswerSubmission {
    pub question_id: i64,
    pub answer_id: i64,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitQuizRequest {
    #[validate(length(max = 500))]
    pub answers: Vec<AnswerSubmission>,
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptResult {
    pub attempt_id: i64,
    pub score: Decimal,
    pub correct_answers_count: i64,
    pub total_questions: i64,
    pub passed: bool,
}

/// Pre-flight answer for the quiz form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eligibility {
    pub attempts_used: i64,
    pub max_attempts: i64,
}

impl Eligibility {
    pub fn can_submit(&self) -> bool {
        self.attempts_used < self.max_attempts
    }

    pub fn attempts_remaining(&self) -> i64 {
        (self.max_attempts - self.attempts_used).max(0)
    }
}

/// One attempt joined with the quiz title and its owner's identity.
/// Input to the leaderboard aggregation.
#[derive(Debug, Clone, FromRow)]
pub struct LeaderboardRow {
    pub quiz_id: i64,
    pub quiz_title: String,
    pub attempt_id: i64,
    pub score: Decimal,
    pub attempt_time: DateTime<Utc>,
    pub student_email: String,
    pub student_first_name: String,
    pub student_last_name: String,
}

/// Aggregated struct for displaying the leaderboard.
/// Highest score per quiz and who achieved it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    #[serde(rename = "id")]
    pub quiz_id: i64,
    pub title: String,
    pub highest_score: Decimal,
    pub student_email: String,
    pub student_first_name: String,
    pub student_last_name: String,
}
