// src/repository/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::{
    attempt::{LeaderboardRow, QuizAttempt, QuizAttemptSummary, StudentAnswerView},
    quiz::{Answer, Question, Quiz},
};

use super::{NewAttempt, QuizStore, RecordOutcome};

const ATTEMPT_SUMMARY_SELECT: &str = "\
    SELECT a.id, a.quiz_id, q.title AS quiz_title, a.score, a.passed, a.attempt_time
    FROM quiz_attempts a
    JOIN quizzes q ON q.id = a.quiz_id";

/// `QuizStore` backed by the Postgres pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizStore for PgStore {
    async fn get_quiz(&self, id: i64) -> Result<Option<Quiz>, sqlx::Error> {
        sqlx::query_as::<_, Quiz>("SELECT id, topic_id, title, is_active FROM quizzes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_question(&self, id: i64) -> Result<Option<Question>, sqlx::Error> {
        sqlx::query_as::<_, Question>("SELECT id, quiz_id, text FROM questions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_answer(&self, id: i64) -> Result<Option<Answer>, sqlx::Error> {
        sqlx::query_as::<_, Answer>(
            "SELECT id, question_id, text, is_correct FROM answers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn count_questions(&self, quiz_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE quiz_id = $1")
            .bind(quiz_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn count_attempts(&self, student_id: i64, quiz_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM quiz_attempts WHERE student_id = $1 AND quiz_id = $2",
        )
        .bind(student_id)
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn record_attempt(
        &self,
        attempt: NewAttempt,
        max_attempts: i64,
    ) -> Result<RecordOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the student serializes their concurrent submissions, so
        // the count below cannot be raced.
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(attempt.student_id)
            .fetch_optional(&mut *tx)
            .await?;

        let used = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM quiz_attempts WHERE student_id = $1 AND quiz_id = $2",
        )
        .bind(attempt.student_id)
        .bind(attempt.quiz_id)
        .fetch_one(&mut *tx)
        .await?;

        if used >= max_attempts {
            tx.rollback().await?;
            return Ok(RecordOutcome::LimitReached);
        }

        let attempt_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO quiz_attempts (student_id, quiz_id, score, passed)
            VALUES ($1, $2, 0, FALSE)
            RETURNING id
            "#,
        )
        .bind(attempt.student_id)
        .bind(attempt.quiz_id)
        .fetch_one(&mut *tx)
        .await?;

        if !attempt.answers.is_empty() {
            let mut query_builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO student_answers (quiz_attempt_id, question_id, selected_answer_id) ",
            );
            query_builder.push_values(attempt.answers.iter(), |mut row, (question_id, answer_id)| {
                row.push_bind(attempt_id)
                    .push_bind(*question_id)
                    .push_bind(*answer_id);
            });
            query_builder.build().execute(&mut *tx).await?;
        }

        let recorded = sqlx::query_as::<_, QuizAttempt>(
            r#"
            UPDATE quiz_attempts
            SET score = $1, passed = $2
            WHERE id = $3
            RETURNING id, student_id, quiz_id, score, passed, attempt_time
            "#,
        )
        .bind(attempt.score)
        .bind(attempt.passed)
        .bind(attempt_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RecordOutcome::Recorded(recorded))
    }

    async fn attempts_by_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<QuizAttemptSummary>, sqlx::Error> {
        sqlx::query_as::<_, QuizAttemptSummary>(&format!(
            "{ATTEMPT_SUMMARY_SELECT}
             WHERE a.student_id = $1
             ORDER BY a.attempt_time DESC, a.id DESC"
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn attempt_for_student(
        &self,
        attempt_id: i64,
        student_id: i64,
    ) -> Result<Option<QuizAttemptSummary>, sqlx::Error> {
        sqlx::query_as::<_, QuizAttemptSummary>(&format!(
            "{ATTEMPT_SUMMARY_SELECT}
             WHERE a.id = $1 AND a.student_id = $2"
        ))
        .bind(attempt_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn attempt_answers(&self, attempt_id: i64) -> Result<Vec<StudentAnswerView>, sqlx::Error> {
        // is_correct is read from the answer row, not from the attempt.
        sqlx::query_as::<_, StudentAnswerView>(
            r#"
            SELECT
                sa.id,
                sa.question_id,
                q.text AS question_text,
                sa.selected_answer_id AS selected_answer,
                an.text,
                an.is_correct
            FROM student_answers sa
            JOIN questions q ON q.id = sa.question_id
            JOIN answers an ON an.id = sa.selected_answer_id
            WHERE sa.quiz_attempt_id = $1
            ORDER BY sa.id
            "#,
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn leaderboard_rows(&self) -> Result<Vec<LeaderboardRow>, sqlx::Error> {
        sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT
                a.quiz_id,
                q.title AS quiz_title,
                a.id AS attempt_id,
                a.score,
                a.attempt_time,
                u.email AS student_email,
                u.first_name AS student_first_name,
                u.last_name AS student_last_name
            FROM quiz_attempts a
            JOIN quizzes q ON q.id = a.quiz_id
            JOIN users u ON u.id = a.student_id
            ORDER BY a.quiz_id, a.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
