// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub topic_id: Option<i64>,
    pub title: String,
    pub is_active: bool,
}

/// Represents the 'questions' table. Each question belongs to exactly one quiz.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,
}

/// Represents the 'answers' table. One option of a multiple-choice question.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

/// Short quiz listing entry.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub is_active: bool,
}

/// DTO for sending an answer option to the client (excludes `is_correct`).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PublicAnswer {
    pub id: i64,
    pub text: String,
}

/// A question together with its options, as shown on the quiz form.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    pub answers: Vec<PublicAnswer>,
}
