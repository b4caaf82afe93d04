use crate::models::DbDepartment;
use chrono::NaiveDateTime;
use eyre::Result;
use sqlx::{Pool, Postgres};

const DEPT_COLUMNS: &str =
    "dept_id, dept_name, description, parent_id, sort_order, created_at, updated_at";

pub async fn list_departments(
    pool: &Pool<Postgres>,
    offset: i64,
    limit: i64,
) -> Result<Vec<DbDepartment>> {
    let departments = sqlx::query_as::<_, DbDepartment>(&format!(
        r#"
        SELECT {DEPT_COLUMNS}
        FROM departments
        ORDER BY sort_order, dept_id
        OFFSET $1 LIMIT $2
        "#,
    ))
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(departments)
}

pub async fn count_departments(pool: &Pool<Postgres>) -> Result<i64> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM departments")
        .fetch_one(pool)
        .await?;

    Ok(total)
}

pub async fn get_department_by_id(pool: &Pool<Postgres>, dept_id: i64) -> Result<Option<DbDepartment>> {
    let department = sqlx::query_as::<_, DbDepartment>(&format!(
        r#"
        SELECT {DEPT_COLUMNS}
        FROM departments
        WHERE dept_id = $1
        "#,
    ))
    .bind(dept_id)
    .fetch_optional(pool)
    .await?;

    Ok(department)
}

/// Uniqueness probe for creating/renaming; `exclude_id` skips the row
/// being updated.
pub async fn name_exists(
    pool: &Pool<Postgres>,
    dept_name: &str,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM departments
            WHERE dept_name = $1 AND ($2::BIGINT IS NULL OR dept_id <> $2)
        )
        "#,
    )
    .bind(dept_name)
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

pub async fn create_department(
    pool: &Pool<Postgres>,
    dept_name: &str,
    description: Option<&str>,
    parent_id: Option<i64>,
    sort_order: i32,
    now: NaiveDateTime,
) -> Result<DbDepartment> {
    let department = sqlx::query_as::<_, DbDepartment>(&format!(
        r#"
        INSERT INTO departments (dept_name, description, parent_id, sort_order, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING {DEPT_COLUMNS}
        "#,
    ))
    .bind(dept_name)
    .bind(description)
    .bind(parent_id)
    .bind(sort_order)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(department)
}

pub async fn update_department(
    pool: &Pool<Postgres>,
    dept_id: i64,
    dept_name: Option<&str>,
    description: Option<&str>,
    parent_id: Option<i64>,
    sort_order: Option<i32>,
    now: NaiveDateTime,
) -> Result<DbDepartment> {
    let department = sqlx::query_as::<_, DbDepartment>(&format!(
        r#"
        UPDATE departments
        SET dept_name = COALESCE($2, dept_name),
            description = COALESCE($3, description),
            parent_id = COALESCE($4, parent_id),
            sort_order = COALESCE($5, sort_order),
            updated_at = $6
        WHERE dept_id = $1
        RETURNING {DEPT_COLUMNS}
        "#,
    ))
    .bind(dept_id)
    .bind(dept_name)
    .bind(description)
    .bind(parent_id)
    .bind(sort_order)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(department)
}

pub async fn delete_department(pool: &Pool<Postgres>, dept_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM departments WHERE dept_id = $1")
        .bind(dept_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn has_children(pool: &Pool<Postgres>, dept_id: i64) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM departments WHERE parent_id = $1)",
    )
    .bind(dept_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

pub async fn has_doctors(pool: &Pool<Postgres>, dept_id: i64) -> Result<bool> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM doctors WHERE dept_id = $1)")
            .bind(dept_id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}
