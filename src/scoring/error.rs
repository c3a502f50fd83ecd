// src/scoring/error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("You have reached the maximum number of attempts for this quiz ({max_attempts}).")]
    AttemptLimitExceeded { max_attempts: i64 },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("storage error: {0}")]
    Store(#[from] sqlx::Error),
}
