// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

/// Default number of attempts a student gets per quiz.
pub const DEFAULT_MAX_QUIZ_ATTEMPTS: i64 = 3;

/// Default passing threshold (percentage).
pub const DEFAULT_PASSING_SCORE: i64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub app_port: u16,

    pub max_quiz_attempts: i64,
    pub passing_score: i64,

    /// Failed logins before the account gets locked.
    pub login_max_failures: i32,
    pub lockout_minutes: i64,

    /// Password reset token lifetime in seconds.
    pub password_reset_expiration: u64,
    /// Base URL of the frontend, used to build password reset links.
    pub frontend_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let frontend_url = env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration: parse_or("JWT_EXPIRATION", 86_400),
            rust_log,
            app_port: parse_or("APP_PORT", 3000),
            max_quiz_attempts: parse_or("MAX_QUIZ_ATTEMPTS", DEFAULT_MAX_QUIZ_ATTEMPTS),
            passing_score: parse_or("PASSING_SCORE", DEFAULT_PASSING_SCORE),
            login_max_failures: parse_or("LOGIN_MAX_FAILURES", 3),
            lockout_minutes: parse_or("LOCKOUT_MINUTES", 60),
            password_reset_expiration: parse_or("PASSWORD_RESET_EXPIRATION", 3600),
            frontend_url,
        }
    }
}

/// Reads an optional numeric variable, falling back to `default` when it is
/// missing or unparsable.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}
