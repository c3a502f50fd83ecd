// src/repository/mod.rs

//! Storage seam for the scoring core.
//!
//! The ledger only talks to a `QuizStore`; Postgres backs it in production and
//! `MemoryStore` backs the unit tests. Account queries used by the identity
//! handlers live in `users`.

pub mod memory;
pub mod postgres;
pub mod users;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::{
    attempt::{LeaderboardRow, QuizAttempt, QuizAttemptSummary, StudentAnswerView},
    quiz::{Answer, Question, Quiz},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A fully validated submission, ready to be written.
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub student_id: i64,
    pub quiz_id: i64,
    pub score: Decimal,
    pub passed: bool,
    /// (question_id, selected_answer_id) in submission order.
    pub answers: Vec<(i64, i64)>,
}

#[derive(Debug, Clone)]
pub enum RecordOutcome {
    Recorded(QuizAttempt),
    /// The cap was already reached when the write lock was taken.
    LimitReached,
}

#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn get_quiz(&self, id: i64) -> Result<Option<Quiz>, sqlx::Error>;

    async fn get_question(&self, id: i64) -> Result<Option<Question>, sqlx::Error>;

    async fn get_answer(&self, id: i64) -> Result<Option<Answer>, sqlx::Error>;

    async fn count_questions(&self, quiz_id: i64) -> Result<i64, sqlx::Error>;

    async fn count_attempts(&self, student_id: i64, quiz_id: i64) -> Result<i64, sqlx::Error>;

    /// Writes the attempt and its answers as one unit.
    ///
    /// Implementations must re-count the (student, quiz) attempts while holding
    /// whatever serializes concurrent submissions, and return `LimitReached`
    /// without writing anything when `max_attempts` is already used up.
    async fn record_attempt(
        &self,
        attempt: NewAttempt,
        max_attempts: i64,
    ) -> Result<RecordOutcome, sqlx::Error>;

    async fn attempts_by_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<QuizAttemptSummary>, sqlx::Error>;

    async fn attempt_for_student(
        &self,
        attempt_id: i64,
        student_id: i64,
    ) -> Result<Option<QuizAttemptSummary>, sqlx::Error>;

    async fn attempt_answers(&self, attempt_id: i64) -> Result<Vec<StudentAnswerView>, sqlx::Error>;

    async fn leaderboard_rows(&self) -> Result<Vec<LeaderboardRow>, sqlx::Error>;
}
