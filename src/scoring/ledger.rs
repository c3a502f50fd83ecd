// src/scoring/ledger.rs

use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    models::attempt::{AnswerSubmission, AttemptResult, Eligibility, QuizAttemptDetail},
    repository::{NewAttempt, QuizStore, RecordOutcome},
};

use super::{ScoringError, scorer};

/// Owns attempt creation and enforces the per-student attempt cap.
#[derive(Clone)]
pub struct AttemptLedger {
    store: Arc<dyn QuizStore>,
    max_attempts: i64,
    passing_score: i64,
}

impl AttemptLedger {
    pub fn new(store: Arc<dyn QuizStore>, max_attempts: i64, passing_score: i64) -> Self {
        Self {
            store,
            max_attempts,
            passing_score,
        }
    }

    pub fn store(&self) -> &dyn QuizStore {
        self.store.as_ref()
    }

    /// Scores and records one submission.
    ///
    /// Every reference is resolved and the score computed before anything is
    /// written; the write itself is a single atomic store call that re-checks
    /// the cap, so a concurrent submission cannot push the count past it.
    pub async fn submit(
        &self,
        student_id: i64,
        quiz_id: i64,
        answers: &[AnswerSubmission],
    ) -> Result<AttemptResult, ScoringError> {
        let quiz = self
            .store
            .get_quiz(quiz_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound(format!("Quiz {}", quiz_id)))?;

        if !self.can_submit(student_id, quiz.id).await? {
            tracing::info!(
                "Student {} rejected on quiz {}: attempt cap {} reached",
                student_id,
                quiz.id,
                self.max_attempts
            );
            return Err(ScoringError::AttemptLimitExceeded {
                max_attempts: self.max_attempts,
            });
        }

        let mut seen = HashSet::with_capacity(answers.len());
        let mut outcomes = Vec::with_capacity(answers.len());
        for submitted in answers {
            if !seen.insert(submitted.question_id) {
                return Err(ScoringError::InvalidArgument(format!(
                    "Question {} answered more than once",
                    submitted.question_id
                )));
            }
            outcomes.push(self.resolve(quiz.id, submitted).await?);
        }

        let total_questions = self.store.count_questions(quiz.id).await?;
        if total_questions == 0 {
            return Err(ScoringError::InvalidState(format!(
                "Quiz {} has no questions",
                quiz.id
            )));
        }
        let tally = scorer::tally(outcomes, total_questions)?;
        let passed = scorer::is_passing(tally.percentage, self.passing_score);

        let attempt = NewAttempt {
            student_id,
            quiz_id: quiz.id,
            score: tally.percentage,
            passed,
            answers: answers
                .iter()
                .map(|a| (a.question_id, a.answer_id))
                .collect(),
        };

        let recorded = match self.store.record_attempt(attempt, self.max_attempts).await? {
            RecordOutcome::Recorded(recorded) => recorded,
            RecordOutcome::LimitReached => {
                tracing::warn!(
                    "Concurrent submission by student {} on quiz {} hit the attempt cap",
                    student_id,
                    quiz.id
                );
                return Err(ScoringError::AttemptLimitExceeded {
                    max_attempts: self.max_attempts,
                });
            }
        };

        tracing::info!(
            "Attempt {} recorded: student {} quiz {} score {} ({}/{})",
            recorded.id,
            student_id,
            quiz.id,
            recorded.score,
            tally.correct_count,
            tally.total_questions
        );

        Ok(AttemptResult {
            attempt_id: recorded.id,
            score: recorded.score,
            correct_answers_count: tally.correct_count,
            total_questions: tally.total_questions,
            passed: recorded.passed,
        })
    }

    /// Checks that the pair belongs to the quiz and returns whether the
    /// selected option is correct.
    async fn resolve(&self, quiz_id: i64, submitted: &AnswerSubmission) -> Result<bool, ScoringError> {
        let question = self
            .store
            .get_question(submitted.question_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound(format!("Question {}", submitted.question_id)))?;
        if question.quiz_id != quiz_id {
            return Err(ScoringError::InvalidReference(format!(
                "question {} does not belong to quiz {}",
                question.id, quiz_id
            )));
        }

        let answer = self
            .store
            .get_answer(submitted.answer_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound(format!("Answer {}", submitted.answer_id)))?;
        if answer.question_id != question.id {
            return Err(ScoringError::InvalidReference(format!(
                "answer {} does not belong to question {}",
                answer.id, question.id
            )));
        }

        Ok(answer.is_correct)
    }

    /// Side-effect free pre-flight: true while the student has attempts left.
    pub async fn can_submit(&self, student_id: i64, quiz_id: i64) -> Result<bool, ScoringError> {
        let used = self.store.count_attempts(student_id, quiz_id).await?;
        Ok(used < self.max_attempts)
    }

    /// Like `can_submit`, but checks the quiz exists and reports the counts.
    pub async fn eligibility(&self, student_id: i64, quiz_id: i64) -> Result<Eligibility, ScoringError> {
        self.store
            .get_quiz(quiz_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound(format!("Quiz {}", quiz_id)))?;

        let attempts_used = self.store.count_attempts(student_id, quiz_id).await?;
        Ok(Eligibility {
            attempts_used,
            max_attempts: self.max_attempts,
        })
    }

    /// One of the student's attempts with its answers. Other students'
    /// attempts are reported as missing.
    pub async fn attempt_detail(
        &self,
        student_id: i64,
        attempt_id: i64,
    ) -> Result<QuizAttemptDetail, ScoringError> {
        let attempt = self
            .store
            .attempt_for_student(attempt_id, student_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound(format!("Quiz attempt {}", attempt_id)))?;
        let student_answers = self.store.attempt_answers(attempt.id).await?;

        Ok(QuizAttemptDetail {
            attempt,
            student_answers,
        })
    }
}
