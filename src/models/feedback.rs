// src/models/feedback.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'question_feedbacks' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuestionFeedback {
    pub id: i64,
    pub question_id: i64,
    pub student_id: i64,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for a student's remark about a question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFeedbackRequest {
    pub question: i64,
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
}
