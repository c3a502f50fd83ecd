// src/repository/users.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    models::user::{USER_COLUMNS, UpdateProfileRequest, User},
    services::lockout::FailedLogin,
};

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub group_id: Option<i64>,
}

pub async fn insert(pool: &PgPool, user: NewUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (email, password, first_name, last_name, group_id)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.group_id)
    .fetch_one(pool)
    .await
}

/// Counts one failed login in a single statement, so concurrent failures
/// never overwrite each other. The account is locked until `lock_until` once
/// the counter reaches `max_failures`.
pub async fn record_login_failure(
    pool: &PgPool,
    id: i64,
    max_failures: i32,
    lock_until: DateTime<Utc>,
) -> Result<FailedLogin, sqlx::Error> {
    sqlx::query_as::<_, FailedLogin>(
        "UPDATE users
         SET failed_login_attempts = failed_login_attempts + 1,
             lockout_until = CASE
                 WHEN failed_login_attempts + 1 >= $2 THEN $3
                 ELSE lockout_until
             END
         WHERE id = $1
         RETURNING failed_login_attempts, lockout_until",
    )
    .bind(id)
    .bind(max_failures)
    .bind(lock_until)
    .fetch_one(pool)
    .await
}

pub async fn set_login_failures(
    pool: &PgPool,
    id: i64,
    failed_login_attempts: i32,
    lockout_until: Option<DateTime<Utc>>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET failed_login_attempts = $1, lockout_until = $2 WHERE id = $3")
        .bind(failed_login_attempts)
        .bind(lockout_until)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Stores a new password hash and lifts any lockout.
pub async fn set_password(pool: &PgPool, id: i64, password_hash: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users
         SET password = $1, failed_login_attempts = 0, lockout_until = NULL
         WHERE id = $2",
    )
    .bind(password_hash)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Applies a partial profile update; `None` fields keep their value and a
/// `Some(None)` group clears the membership.
pub async fn update_profile(
    pool: &PgPool,
    id: i64,
    changes: &UpdateProfileRequest,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users
         SET first_name = COALESCE($1, first_name),
             last_name = COALESCE($2, last_name),
             group_id = CASE WHEN $3 THEN $4 ELSE group_id END
         WHERE id = $5
         RETURNING {USER_COLUMNS}"
    ))
    .bind(changes.first_name.as_deref())
    .bind(changes.last_name.as_deref())
    .bind(changes.group.is_some())
    .bind(changes.group.flatten())
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}
