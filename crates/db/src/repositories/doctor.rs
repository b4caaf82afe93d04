use crate::models::{DbDoctor, DbDoctorDetail};
use chrono::NaiveDateTime;
use eyre::Result;
use sqlx::{Pool, Postgres};

const DOCTOR_COLUMNS: &str = "doctor_id, user_id, doctor_name, dept_id, title, specialty, \
     introduction, available_status, created_at, updated_at";

const DETAIL_SELECT: &str = r#"
    SELECT d.doctor_id, d.user_id, d.doctor_name, d.dept_id, dep.dept_name,
           d.title, d.specialty, d.introduction, d.created_at, d.updated_at
    FROM doctors d
    JOIN departments dep ON d.dept_id = dep.dept_id
"#;

pub async fn list_doctors(
    pool: &Pool<Postgres>,
    dept_id: Option<i64>,
    offset: i64,
    limit: i64,
) -> Result<Vec<DbDoctorDetail>> {
    let doctors = sqlx::query_as::<_, DbDoctorDetail>(&format!(
        r#"
        {DETAIL_SELECT}
        WHERE ($1::BIGINT IS NULL OR d.dept_id = $1)
        ORDER BY d.doctor_id
        OFFSET $2 LIMIT $3
        "#,
    ))
    .bind(dept_id)
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(doctors)
}

pub async fn count_doctors(pool: &Pool<Postgres>, dept_id: Option<i64>) -> Result<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM doctors WHERE ($1::BIGINT IS NULL OR dept_id = $1)",
    )
    .bind(dept_id)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

pub async fn get_doctor_by_id(pool: &Pool<Postgres>, doctor_id: i64) -> Result<Option<DbDoctor>> {
    let doctor = sqlx::query_as::<_, DbDoctor>(&format!(
        r#"
        SELECT {DOCTOR_COLUMNS}
        FROM doctors
        WHERE doctor_id = $1
        "#,
    ))
    .bind(doctor_id)
    .fetch_optional(pool)
    .await?;

    Ok(doctor)
}

pub async fn get_doctor_detail_by_id(
    pool: &Pool<Postgres>,
    doctor_id: i64,
) -> Result<Option<DbDoctorDetail>> {
    let doctor = sqlx::query_as::<_, DbDoctorDetail>(&format!(
        r#"
        {DETAIL_SELECT}
        WHERE d.doctor_id = $1
        "#,
    ))
    .bind(doctor_id)
    .fetch_optional(pool)
    .await?;

    Ok(doctor)
}

pub async fn create_doctor(
    pool: &Pool<Postgres>,
    user_id: i64,
    doctor_name: &str,
    dept_id: i64,
    title: Option<&str>,
    specialty: Option<&str>,
    introduction: Option<&str>,
    now: NaiveDateTime,
) -> Result<DbDoctor> {
    tracing::debug!("Creating doctor: name={}, dept_id={}", doctor_name, dept_id);

    let doctor = sqlx::query_as::<_, DbDoctor>(&format!(
        r#"
        INSERT INTO doctors (user_id, doctor_name, dept_id, title, specialty, introduction, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING {DOCTOR_COLUMNS}
        "#,
    ))
    .bind(user_id)
    .bind(doctor_name)
    .bind(dept_id)
    .bind(title)
    .bind(specialty)
    .bind(introduction)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(doctor)
}

pub async fn update_doctor(
    pool: &Pool<Postgres>,
    doctor_id: i64,
    doctor_name: Option<&str>,
    dept_id: Option<i64>,
    title: Option<&str>,
    specialty: Option<&str>,
    introduction: Option<&str>,
    now: NaiveDateTime,
) -> Result<DbDoctor> {
    let doctor = sqlx::query_as::<_, DbDoctor>(&format!(
        r#"
        UPDATE doctors
        SET doctor_name = COALESCE($2, doctor_name),
            dept_id = COALESCE($3, dept_id),
            title = COALESCE($4, title),
            specialty = COALESCE($5, specialty),
            introduction = COALESCE($6, introduction),
            updated_at = $7
        WHERE doctor_id = $1
        RETURNING {DOCTOR_COLUMNS}
        "#,
    ))
    .bind(doctor_id)
    .bind(doctor_name)
    .bind(dept_id)
    .bind(title)
    .bind(specialty)
    .bind(introduction)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(doctor)
}

pub async fn delete_doctor(pool: &Pool<Postgres>, doctor_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM doctors WHERE doctor_id = $1")
        .bind(doctor_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn has_schedules(pool: &Pool<Postgres>, doctor_id: i64) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM doctor_schedules WHERE doctor_id = $1)",
    )
    .bind(doctor_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

pub async fn has_appointments(pool: &Pool<Postgres>, doctor_id: i64) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM appointments WHERE doctor_id = $1)",
    )
    .bind(doctor_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}
