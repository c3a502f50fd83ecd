// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

const PASSWORD_RESET_PURPOSE: &str = "password_reset";

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    /// User's email at signing time.
    pub email: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    /// The authenticated user's id.
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))
    }
}

/// Claims of a password reset token.
#[derive(Debug, Deserialize, Serialize, Clone)]
struct ResetClaims {
    sub: String,
    purpose: String,
    exp: usize,
}

fn expires_in(seconds: u64) -> Result<usize, AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs();
    Ok((now + seconds) as usize)
}

/// Signs a new access token for the user.
pub fn sign_jwt(
    id: i64,
    email: &str,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let claims = Claims {
        sub: id.to_string(), // Store User ID in 'sub' claim
        email: email.to_owned(),
        exp: expires_in(expiration_seconds)?,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Returns the `Claims` if valid, otherwise returns an `AppError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Key for reset tokens: the server secret plus the user's current password
/// hash. Changing the password invalidates every outstanding token.
fn reset_key(secret: &str, password_hash: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(secret.len() + password_hash.len());
    key.extend_from_slice(secret.as_bytes());
    key.extend_from_slice(password_hash.as_bytes());
    key
}

pub fn sign_reset_token(
    user_id: i64,
    password_hash: &str,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let claims = ResetClaims {
        sub: user_id.to_string(),
        purpose: PASSWORD_RESET_PURPOSE.to_string(),
        exp: expires_in(expiration_seconds)?,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(&reset_key(secret, password_hash)),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Checks a reset token against the user it is presented for.
pub fn verify_reset_token(
    token: &str,
    user_id: i64,
    password_hash: &str,
    secret: &str,
) -> Result<(), AppError> {
    let invalid = || AppError::BadRequest("Invalid token".to_string());

    let token_data = decode::<ResetClaims>(
        token,
        &DecodingKey::from_secret(&reset_key(secret, password_hash)),
        &Validation::default(),
    )
    .map_err(|_| invalid())?;

    let claims = token_data.claims;
    if claims.purpose != PASSWORD_RESET_PURPOSE || claims.sub != user_id.to_string() {
        return Err(invalid());
    }
    Ok(())
}

/// Axum Middleware: Authentication.
///
/// Intercepts requests, validates the 'Authorization: Bearer <token>' header.
/// If valid, injects `Claims` into the request extensions for handlers to use.
/// If invalid, returns 401 Unauthorized.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => return Err(StatusCode::UNAUTHORIZED),
    };

    match verify_jwt(token, &config.jwt_secret) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(_) => Err(StatusCode::UNAUTHORIZED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_round_trip() {
        let token = sign_jwt(42, "ada@example.com", "secret", 60).unwrap();
        let claims = verify_jwt(&token, "secret").unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.email, "ada@example.com");

        assert!(verify_jwt(&token, "other-secret").is_err());
    }

    #[test]
    fn test_reset_token_dies_with_password_change() {
        let token = sign_reset_token(7, "$argon2id$old", "secret", 600).unwrap();

        assert!(verify_reset_token(&token, 7, "$argon2id$old", "secret").is_ok());
        assert!(verify_reset_token(&token, 7, "$argon2id$new", "secret").is_err());
        assert!(verify_reset_token(&token, 8, "$argon2id$old", "secret").is_err());
    }

    #[test]
    fn test_access_token_is_not_a_reset_token() {
        let token = sign_jwt(7, "ada@example.com", "secret", 60).unwrap();
        assert!(verify_reset_token(&token, 7, "", "secret").is_err());
    }
}
