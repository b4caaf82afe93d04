//! # Authentication Module
//!
//! This module provides authentication utilities for the OMMS API:
//! Argon2 password hashing and verification, HS256 access token issue
//! and decoding, and the [`AuthUser`] extractor that protected handlers
//! take as an argument.
//!
//! Tokens carry the user id as `sub`, the username and role id, and an
//! `exp` expiry claim. An absent, malformed, or expired token yields a
//! 401 through the uniform envelope.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use eyre::Result;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use omms_core::{errors::OmmsError, models::auth::USER_ENABLED};
use omms_db::models::DbUser;

use crate::{middleware::error_handling::AppError, ApiState};

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a string
    pub sub: String,
    pub username: String,
    #[serde(rename = "roleId")]
    pub role_id: Option<i64>,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

/// Hashes a password using the Argon2 algorithm
///
/// Generates a random salt per password and returns the PHC string
/// (algorithm, version, parameters, salt, and hash).
pub fn hash_password(password: &str) -> Result<String> {
    // Generate a fresh, random salt
    let salt = SaltString::generate(&mut OsRng);

    // Create default Argon2 instance
    let argon2 = Argon2::default();

    // Hash the password with salt
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Verifies a plain password against a stored PHC hash string.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| eyre::eyre!("Invalid password hash: {}", e))?;
    let is_valid = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();

    Ok(is_valid)
}

/// Issues a signed access token for the user.
pub fn create_access_token(secret: &str, user: &DbUser, expire_minutes: i64) -> Result<String> {
    let exp = Utc::now().timestamp() + expire_minutes * 60;
    let claims = Claims {
        sub: user.user_id.to_string(),
        username: user.username.clone(),
        role_id: user.role_id,
        exp,
    };

    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| eyre::eyre!("Error signing token: {}", e))?;

    Ok(token)
}

/// Decodes and validates a token, including its expiry claim.
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, OmmsError> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| OmmsError::Authentication("令牌解析失败".to_string()))?;

    Ok(data.claims)
}

/// The authenticated user, resolved from the bearer token.
///
/// Handlers that require authentication take this as an extractor
/// argument; resolution failures short-circuit into a 401 envelope.
pub struct AuthUser {
    pub user: DbUser,
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| OmmsError::Authentication("未认证".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or_else(|| OmmsError::Authentication("未认证".to_string()))?;

        let claims = decode_token(&state.jwt_secret, token)?;

        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| OmmsError::Authentication("无效令牌".to_string()))?;

        let user = omms_db::repositories::user::get_user_by_id(&state.db_pool, user_id)
            .await
            .map_err(OmmsError::Database)?
            .filter(|u| u.status == USER_ENABLED)
            .ok_or_else(|| OmmsError::Authentication("用户不可用".to_string()))?;

        Ok(AuthUser { user })
    }
}

/// Guards a handler behind a set of role names, e.g. `["ADMIN"]`.
pub async fn require_role_in(
    state: &ApiState,
    user: &DbUser,
    roles: &[&str],
) -> Result<(), OmmsError> {
    let role_name = match user.role_id {
        Some(role_id) => omms_db::repositories::user::get_role_name(&state.db_pool, role_id)
            .await
            .map_err(OmmsError::Database)?
            .unwrap_or_default(),
        None => String::new(),
    };

    if !roles.contains(&role_name.as_str()) {
        return Err(OmmsError::Authorization("权限不足".to_string()));
    }

    Ok(())
}
