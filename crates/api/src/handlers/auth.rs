use axum::{extract::State, Json};
use chrono::Local;
use std::sync::Arc;

use omms_core::{
    errors::OmmsError,
    models::auth::{LoginData, LoginRequest, RegisterRequest, UserOut, ROLE_PATIENT, USER_ENABLED},
    response::Envelope,
};
use omms_db::models::DbUser;

use crate::{
    middleware::{auth, error_handling::AppError},
    ApiState,
};

fn user_out(user: &DbUser) -> UserOut {
    UserOut {
        user_id: user.user_id,
        username: user.username.clone(),
        email: user.email.clone(),
        phone: user.phone.clone(),
        real_name: user.real_name.clone(),
        role_id: user.role_id,
    }
}

/// Creates a basic account with the patient role.
#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<Envelope<UserOut>>, AppError> {
    let existing =
        omms_db::repositories::user::get_user_by_username(&state.db_pool, &payload.username)
            .await
            .map_err(OmmsError::Database)?;
    if existing.is_some() {
        return Err(AppError(OmmsError::Validation("用户名已存在".to_string())));
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let now = Local::now().naive_local();

    let user = omms_db::repositories::user::create_user(
        &state.db_pool,
        &payload.username,
        &password_hash,
        payload.email.as_deref(),
        payload.phone.as_deref(),
        payload.real_name.as_deref(),
        ROLE_PATIENT,
        now,
    )
    .await
    .map_err(OmmsError::Database)?;

    Ok(Json(Envelope::ok(user_out(&user))))
}

/// Logs in by username or email and issues an access token.
#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Envelope<LoginData>>, AppError> {
    let user = omms_db::repositories::user::get_user_by_username_or_email(
        &state.db_pool,
        &payload.username,
    )
    .await
    .map_err(OmmsError::Database)?
    .ok_or_else(|| OmmsError::Authentication("用户名或密码错误".to_string()))?;

    if user.status != USER_ENABLED {
        return Err(AppError(OmmsError::Authorization("用户已禁用".to_string())));
    }

    if !auth::verify_password(&payload.password, &user.password)? {
        return Err(AppError(OmmsError::Authentication(
            "用户名或密码错误".to_string(),
        )));
    }

    let now = Local::now().naive_local();
    omms_db::repositories::user::touch_last_login(&state.db_pool, user.user_id, now)
        .await
        .map_err(OmmsError::Database)?;

    let expires_in = state.token_expire_minutes * 60;
    let token = auth::create_access_token(&state.jwt_secret, &user, state.token_expire_minutes)?;

    let response = LoginData {
        access_token: token,
        token_type: "bearer".to_string(),
        expires_in,
        user: user_out(&user),
    };

    Ok(Json(Envelope::ok(response)))
}

/// Returns the authenticated user's profile.
#[axum::debug_handler]
pub async fn me(
    State(_state): State<Arc<ApiState>>,
    current: auth::AuthUser,
) -> Result<Json<Envelope<UserOut>>, AppError> {
    Ok(Json(Envelope::ok(user_out(&current.user))))
}
