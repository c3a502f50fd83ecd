// src/handlers/auth.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use url::Url;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{
        CreateUserRequest, LoginRequest, PasswordResetConfirmRequest, PasswordResetRequest,
        UserProfile,
    },
    repository::users::{self, NewUser},
    services::{lockout::LockoutPolicy, mailer::Mailer},
    utils::{
        hash::{hash_password, verify_password},
        jwt::{sign_jwt, sign_reset_token, verify_reset_token},
    },
};

const INCORRECT_CREDENTIALS: &str = "Incorrect Credentials";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registers a new student.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created with the profile and an access token.
pub async fn register(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let email = normalize_email(&payload.email);
    let hashed_password = hash_password(&payload.password)?;

    let user = users::insert(
        &pool,
        NewUser {
            email: &email,
            password_hash: &hashed_password,
            first_name: payload.first_name.trim(),
            last_name: payload.last_name.trim(),
            group_id: payload.group,
        },
    )
    .await
    .map_err(|e| {
        if users::is_unique_violation(&e) {
            AppError::Conflict(format!("User with email '{}' already exists", email))
        } else if users::is_foreign_key_violation(&e) {
            AppError::BadRequest("Unknown student group".to_string())
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!("Registered user {}", user.id);

    let token = sign_jwt(user.id, &user.email, &config.jwt_secret, config.jwt_expiration)?;
    let profile = UserProfile::from(user);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": profile.id,
            "email": profile.email,
            "first_name": profile.first_name,
            "last_name": profile.last_name,
            "group": profile.group,
            "token": token,
            "type": "Bearer",
        })),
    ))
}

/// Authenticates a user and returns a JWT token.
///
/// Locked accounts are refused before the password is checked. Every failed
/// password bumps the failure counter; reaching the limit locks the account.
/// A successful login clears both.
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let policy = LockoutPolicy::new(config.login_max_failures, config.lockout_minutes);
    let now = chrono::Utc::now();

    let user = users::find_by_email(&pool, &normalize_email(&payload.email))
        .await
        .map_err(|e| {
            tracing::error!("Login DB error: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?
        .ok_or(AppError::AuthError(INCORRECT_CREDENTIALS.to_string()))?;

    if policy.is_locked(user.lockout_until, now) {
        tracing::warn!("Login refused for locked user {}", user.id);
        return Err(AppError::AuthError("This account is locked.".to_string()));
    }

    let is_valid = verify_password(&payload.password, &user.password)? && user.is_active;

    if !is_valid {
        let failure = users::record_login_failure(
            &pool,
            user.id,
            policy.max_failures,
            policy.lock_deadline(now),
        )
        .await?;
        if policy.locks_after(failure.failed_login_attempts) {
            tracing::warn!(
                "User {} locked out after {} failed logins",
                user.id,
                failure.failed_login_attempts
            );
        }
        return Err(AppError::AuthError(INCORRECT_CREDENTIALS.to_string()));
    }

    if user.failed_login_attempts != 0 || user.lockout_until.is_some() {
        users::set_login_failures(&pool, user.id, 0, None).await?;
    }

    let token = sign_jwt(user.id, &user.email, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
    })))
}

/// Builds `<frontend>/password-reset-confirm/<uid>/<token>/`.
pub fn reset_link(frontend_url: &str, uid: i64, token: &str) -> Result<Url, AppError> {
    let mut base = Url::parse(frontend_url)
        .map_err(|e| AppError::InternalServerError(format!("Invalid FRONTEND_URL: {}", e)))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(&format!("password-reset-confirm/{}/{}/", uid, token))
        .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Mails a password reset link to a registered address.
pub async fn request_password_reset(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    State(mailer): State<Arc<dyn Mailer>>,
    Json(payload): Json<PasswordResetRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = users::find_by_email(&pool, &normalize_email(&payload.email))
        .await?
        .ok_or(AppError::BadRequest(
            "User with this email does not exist".to_string(),
        ))?;

    let token = sign_reset_token(
        user.id,
        &user.password,
        &config.jwt_secret,
        config.password_reset_expiration,
    )?;
    let link = reset_link(&config.frontend_url, user.id, &token)?;

    mailer
        .send(
            &user.email,
            "Password Reset for Your Account",
            &format!("Please click the link below to reset your password:\n{}", link),
        )
        .await?;

    tracing::info!("Password reset requested for user {}", user.id);

    Ok(Json(json!({ "message": "Password reset e-mail has been sent." })))
}

/// Sets a new password from a reset link.
pub async fn confirm_password_reset(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<PasswordResetConfirmRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = users::find_by_id(&pool, payload.uid)
        .await?
        .ok_or(AppError::BadRequest(
            "Invalid token - user not found".to_string(),
        ))?;

    verify_reset_token(&payload.token, user.id, &user.password, &config.jwt_secret)?;

    let hashed_password = hash_password(&payload.new_password)?;
    users::set_password(&pool, user.id, &hashed_password).await?;

    tracing::info!("Password reset completed for user {}", user.id);

    Ok(Json(json!({ "message": "Password has been reset successfully." })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_link_keeps_frontend_path() {
        let link = reset_link("https://school.example.com/app", 5, "abc.def").unwrap();
        assert_eq!(
            link.as_str(),
            "https://school.example.com/app/password-reset-confirm/5/abc.def/"
        );

        let link = reset_link("http://localhost:3000", 5, "t").unwrap();
        assert_eq!(link.as_str(), "http://localhost:3000/password-reset-confirm/5/t/");
    }

    #[test]
    fn test_email_is_normalized() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }
}
