use crate::models::DbUser;
use chrono::NaiveDateTime;
use eyre::Result;
use sqlx::{Pool, Postgres};

const USER_COLUMNS: &str = "user_id, username, password, email, phone, real_name, status, \
     created_at, updated_at, last_login_at, role_id";

pub async fn create_user(
    pool: &Pool<Postgres>,
    username: &str,
    password_hash: &str,
    email: Option<&str>,
    phone: Option<&str>,
    real_name: Option<&str>,
    role_id: i64,
    now: NaiveDateTime,
) -> Result<DbUser> {
    tracing::debug!("Creating user: username={}, role_id={}", username, role_id);

    let user = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        INSERT INTO users (username, password, email, phone, real_name, status, created_at, updated_at, role_id)
        VALUES ($1, $2, $3, $4, $5, 1, $6, $6, $7)
        RETURNING {USER_COLUMNS}
        "#,
    ))
    .bind(username)
    .bind(password_hash)
    .bind(email)
    .bind(phone)
    .bind(real_name)
    .bind(now)
    .bind(role_id)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, user_id: i64) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE user_id = $1
        "#,
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_username(pool: &Pool<Postgres>, username: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE username = $1
        "#,
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Login lookup: the identifier may be a username or an email address.
pub async fn get_user_by_username_or_email(
    pool: &Pool<Postgres>,
    identifier: &str,
) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE username = $1 OR email = $1
        "#,
    ))
    .bind(identifier)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn touch_last_login(
    pool: &Pool<Postgres>,
    user_id: i64,
    now: NaiveDateTime,
) -> Result<()> {
    sqlx::query("UPDATE users SET last_login_at = $2 WHERE user_id = $1")
        .bind(user_id)
        .bind(now)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn get_role_name(pool: &Pool<Postgres>, role_id: i64) -> Result<Option<String>> {
    let name = sqlx::query_scalar::<_, String>("SELECT role_name FROM roles WHERE role_id = $1")
        .bind(role_id)
        .fetch_optional(pool)
        .await?;

    Ok(name)
}
