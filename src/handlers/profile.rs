use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{UpdateProfileRequest, UserProfile},
    repository::users,
    utils::jwt::Claims,
};

/// Get current user's profile.
pub async fn get_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = users::find_by_id(&pool, claims.user_id()?)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile::from(user)))
}

/// Partially update the current user's name and group.
pub async fn update_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = users::update_profile(&pool, claims.user_id()?, &payload)
        .await
        .map_err(|e| {
            if users::is_foreign_key_violation(&e) {
                AppError::BadRequest("Unknown student group".to_string())
            } else {
                tracing::error!("Failed to update profile: {:?}", e);
                AppError::from(e)
            }
        })?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile::from(user)))
}
