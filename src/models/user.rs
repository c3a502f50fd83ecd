// src/models/user.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

static ALL_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique email, doubles as the login name.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub first_name: String,
    pub last_name: String,

    /// Optional student group membership.
    pub group_id: Option<i64>,

    pub is_active: bool,
    pub is_teacher: bool,

    /// Consecutive failed logins since the last successful one.
    #[serde(skip)]
    pub failed_login_attempts: i32,

    /// Set while the account is locked out.
    #[serde(skip)]
    pub lockout_until: Option<chrono::DateTime<chrono::Utc>>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub(crate) const USER_COLUMNS: &str = "\
    id, email, password, first_name, last_name, group_id, is_active, is_teacher, \
    failed_login_attempts, lockout_until, created_at";

/// Public view of a user.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub group: Option<i64>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            group: user.group_id,
        }
    }
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Enter a valid email address."), length(max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 150))]
    pub first_name: String,
    #[validate(length(min = 1, max = 150))]
    pub last_name: String,
    #[validate(custom(function = validate_password_strength))]
    pub password: String,
    pub group: Option<i64>,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 150))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub last_name: Option<String>,
    /// `None` keeps the group, `Some(None)` (an explicit `null`) clears it.
    #[serde(default, deserialize_with = "present")]
    pub group: Option<Option<i64>>,
}

/// Marks a field as present, so `null` is told apart from a missing key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetConfirmRequest {
    pub uid: i64,
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(custom(function = validate_password_strength))]
    pub new_password: String,
}

/// Password policy: 8 to 128 characters and not entirely numeric.
pub fn validate_password_strength(password: &str) -> Result<(), validator::ValidationError> {
    let len = password.chars().count();
    if len < 8 {
        return Err(validator::ValidationError::new("password_too_short")
            .with_message("This password is too short. It must contain at least 8 characters.".into()));
    }
    if len > 128 {
        return Err(validator::ValidationError::new("password_too_long"));
    }
    if ALL_DIGITS.is_match(password) {
        return Err(validator::ValidationError::new("password_entirely_numeric")
            .with_message("This password is entirely numeric.".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy() {
        assert!(validate_password_strength("short1").is_err());
        assert!(validate_password_strength("1234567890").is_err());
        assert!(validate_password_strength("correct horse").is_ok());
        assert!(validate_password_strength(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let ok = CreateUserRequest {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: "analytical-engine".to_string(),
            group: None,
        };
        assert!(ok.validate().is_ok());

        let bad_email = CreateUserRequest {
            email: "not-an-email".to_string(),
            ..ok
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_profile_update_tells_null_group_from_missing() {
        let missing: UpdateProfileRequest = serde_json::from_str(r#"{"first_name": "Ada"}"#).unwrap();
        assert_eq!(missing.group, None);

        let cleared: UpdateProfileRequest = serde_json::from_str(r#"{"group": null}"#).unwrap();
        assert_eq!(cleared.group, Some(None));

        let set: UpdateProfileRequest = serde_json::from_str(r#"{"group": 4}"#).unwrap();
        assert_eq!(set.group, Some(Some(4)));
    }
}
