// src/repository/memory.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::models::{
    attempt::{LeaderboardRow, QuizAttempt, QuizAttemptSummary, StudentAnswer, StudentAnswerView},
    quiz::{Answer, Question, Quiz},
};

use super::{NewAttempt, QuizStore, RecordOutcome};

#[derive(Debug, Clone)]
struct Student {
    email: String,
    first_name: String,
    last_name: String,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    students: BTreeMap<i64, Student>,
    quizzes: BTreeMap<i64, Quiz>,
    questions: BTreeMap<i64, Question>,
    answers: BTreeMap<i64, Answer>,
    attempts: BTreeMap<i64, QuizAttempt>,
    student_answers: Vec<StudentAnswer>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn summary(&self, attempt: &QuizAttempt) -> QuizAttemptSummary {
        QuizAttemptSummary {
            id: attempt.id,
            quiz_id: attempt.quiz_id,
            quiz_title: self
                .quizzes
                .get(&attempt.quiz_id)
                .map(|q| q.title.clone())
                .unwrap_or_default(),
            score: attempt.score,
            passed: attempt.passed,
            attempt_time: attempt.attempt_time,
        }
    }
}

/// In-process `QuizStore`.
///
/// The whole state sits behind one async mutex, which makes `record_attempt`
/// trivially atomic. Ids are shared across all entity kinds.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_student(&self, email: &str, first_name: &str, last_name: &str) -> i64 {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id();
        inner.students.insert(
            id,
            Student {
                email: email.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            },
        );
        id
    }

    pub async fn add_quiz(&self, title: &str) -> i64 {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id();
        inner.quizzes.insert(
            id,
            Quiz {
                id,
                topic_id: None,
                title: title.to_string(),
                is_active: true,
            },
        );
        id
    }

    pub async fn add_question(&self, quiz_id: i64, text: &str) -> i64 {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id();
        inner.questions.insert(
            id,
            Question {
                id,
                quiz_id,
                text: text.to_string(),
            },
        );
        id
    }

    pub async fn add_answer(&self, question_id: i64, text: &str, is_correct: bool) -> i64 {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id();
        inner.answers.insert(
            id,
            Answer {
                id,
                question_id,
                text: text.to_string(),
                is_correct,
            },
        );
        id
    }

    /// Flips an option's correctness after the fact, as an author editing the
    /// quiz would.
    pub async fn set_answer_correct(&self, answer_id: i64, is_correct: bool) {
        let mut inner = self.inner.lock().await;
        if let Some(answer) = inner.answers.get_mut(&answer_id) {
            answer.is_correct = is_correct;
        }
    }

    pub async fn attempt_count(&self) -> usize {
        self.inner.lock().await.attempts.len()
    }

    pub async fn student_answer_count(&self) -> usize {
        self.inner.lock().await.student_answers.len()
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn get_quiz(&self, id: i64) -> Result<Option<Quiz>, sqlx::Error> {
        Ok(self.inner.lock().await.quizzes.get(&id).cloned())
    }

    async fn get_question(&self, id: i64) -> Result<Option<Question>, sqlx::Error> {
        Ok(self.inner.lock().await.questions.get(&id).cloned())
    }

    async fn get_answer(&self, id: i64) -> Result<Option<Answer>, sqlx::Error> {
        Ok(self.inner.lock().await.answers.get(&id).cloned())
    }

    async fn count_questions(&self, quiz_id: i64) -> Result<i64, sqlx::Error> {
        let inner = self.inner.lock().await;
        Ok(inner.questions.values().filter(|q| q.quiz_id == quiz_id).count() as i64)
    }

    async fn count_attempts(&self, student_id: i64, quiz_id: i64) -> Result<i64, sqlx::Error> {
        let inner = self.inner.lock().await;
        Ok(inner
            .attempts
            .values()
            .filter(|a| a.student_id == student_id && a.quiz_id == quiz_id)
            .count() as i64)
    }

    async fn record_attempt(
        &self,
        attempt: NewAttempt,
        max_attempts: i64,
    ) -> Result<RecordOutcome, sqlx::Error> {
        let mut inner = self.inner.lock().await;

        let used = inner
            .attempts
            .values()
            .filter(|a| a.student_id == attempt.student_id && a.quiz_id == attempt.quiz_id)
            .count() as i64;
        if used >= max_attempts {
            return Ok(RecordOutcome::LimitReached);
        }

        let attempt_id = inner.next_id();
        let mut recorded = QuizAttempt {
            id: attempt_id,
            student_id: attempt.student_id,
            quiz_id: attempt.quiz_id,
            score: Decimal::ZERO,
            passed: false,
            attempt_time: Utc::now(),
        };

        for (question_id, selected_answer_id) in attempt.answers {
            let id = inner.next_id();
            inner.student_answers.push(StudentAnswer {
                id,
                quiz_attempt_id: attempt_id,
                question_id,
                selected_answer_id,
            });
        }

        recorded.score = attempt.score;
        recorded.passed = attempt.passed;
        inner.attempts.insert(attempt_id, recorded.clone());

        Ok(RecordOutcome::Recorded(recorded))
    }

    async fn attempts_by_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<QuizAttemptSummary>, sqlx::Error> {
        let inner = self.inner.lock().await;
        Ok(inner
            .attempts
            .values()
            .rev()
            .filter(|a| a.student_id == student_id)
            .map(|a| inner.summary(a))
            .collect())
    }

    async fn attempt_for_student(
        &self,
        attempt_id: i64,
        student_id: i64,
    ) -> Result<Option<QuizAttemptSummary>, sqlx::Error> {
        let inner = self.inner.lock().await;
        Ok(inner
            .attempts
            .get(&attempt_id)
            .filter(|a| a.student_id == student_id)
            .map(|a| inner.summary(a)))
    }

    async fn attempt_answers(&self, attempt_id: i64) -> Result<Vec<StudentAnswerView>, sqlx::Error> {
        let inner = self.inner.lock().await;
        let views = inner
            .student_answers
            .iter()
            .filter(|sa| sa.quiz_attempt_id == attempt_id)
            .filter_map(|sa| {
                let question = inner.questions.get(&sa.question_id)?;
                let answer = inner.answers.get(&sa.selected_answer_id)?;
                Some(StudentAnswerView {
                    id: sa.id,
                    question_id: question.id,
                    question_text: question.text.clone(),
                    selected_answer: answer.id,
                    text: answer.text.clone(),
                    is_correct: answer.is_correct,
                })
            })
            .collect();
        Ok(views)
    }

    async fn leaderboard_rows(&self) -> Result<Vec<LeaderboardRow>, sqlx::Error> {
        let inner = self.inner.lock().await;
        let rows = inner
            .attempts
            .values()
            .filter_map(|a| {
                let quiz = inner.quizzes.get(&a.quiz_id)?;
                let student = inner.students.get(&a.student_id)?;
                Some(LeaderboardRow {
                    quiz_id: quiz.id,
                    quiz_title: quiz.title.clone(),
                    attempt_id: a.id,
                    score: a.score,
                    attempt_time: a.attempt_time,
                    student_email: student.email.clone(),
                    student_first_name: student.first_name.clone(),
                    student_last_name: student.last_name.clone(),
                })
            })
            .collect();
        Ok(rows)
    }
}
