use crate::models::{DbSchedule, DbScheduleDetail};
use chrono::NaiveDate;
use eyre::Result;
use sqlx::{Pool, Postgres, Transaction};

const SCHEDULE_COLUMNS: &str = "schedule_id, doctor_id, work_date, start_time, end_time, \
     max_appointments, status, created_at, updated_at";

pub async fn list_schedules(
    pool: &Pool<Postgres>,
    dept_id: Option<i64>,
    doctor_id: Option<i64>,
    work_date: Option<NaiveDate>,
    offset: i64,
    limit: i64,
) -> Result<Vec<DbScheduleDetail>> {
    let schedules = sqlx::query_as::<_, DbScheduleDetail>(
        r#"
        SELECT s.schedule_id, s.doctor_id, d.doctor_name, d.dept_id, dep.dept_name,
               s.work_date, s.start_time, s.end_time, s.max_appointments, s.status
        FROM doctor_schedules s
        JOIN doctors d ON s.doctor_id = d.doctor_id
        JOIN departments dep ON d.dept_id = dep.dept_id
        WHERE ($1::BIGINT IS NULL OR d.dept_id = $1)
          AND ($2::BIGINT IS NULL OR s.doctor_id = $2)
          AND ($3::DATE IS NULL OR s.work_date = $3)
        ORDER BY s.work_date, s.schedule_id
        OFFSET $4 LIMIT $5
        "#,
    )
    .bind(dept_id)
    .bind(doctor_id)
    .bind(work_date)
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(schedules)
}

pub async fn count_schedules(
    pool: &Pool<Postgres>,
    dept_id: Option<i64>,
    doctor_id: Option<i64>,
    work_date: Option<NaiveDate>,
) -> Result<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM doctor_schedules s
        JOIN doctors d ON s.doctor_id = d.doctor_id
        WHERE ($1::BIGINT IS NULL OR d.dept_id = $1)
          AND ($2::BIGINT IS NULL OR s.doctor_id = $2)
          AND ($3::DATE IS NULL OR s.work_date = $3)
        "#,
    )
    .bind(dept_id)
    .bind(doctor_id)
    .bind(work_date)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

pub async fn get_schedule_by_id(
    pool: &Pool<Postgres>,
    schedule_id: i64,
) -> Result<Option<DbSchedule>> {
    let schedule = sqlx::query_as::<_, DbSchedule>(&format!(
        r#"
        SELECT {SCHEDULE_COLUMNS}
        FROM doctor_schedules
        WHERE schedule_id = $1
        "#,
    ))
    .bind(schedule_id)
    .fetch_optional(pool)
    .await?;

    Ok(schedule)
}

/// Locks the schedule row for the duration of the booking transaction.
/// Serializes concurrent quota checks against the same slot.
pub async fn lock_schedule(
    tx: &mut Transaction<'_, Postgres>,
    schedule_id: i64,
) -> Result<Option<DbSchedule>> {
    let schedule = sqlx::query_as::<_, DbSchedule>(&format!(
        r#"
        SELECT {SCHEDULE_COLUMNS}
        FROM doctor_schedules
        WHERE schedule_id = $1
        FOR UPDATE
        "#,
    ))
    .bind(schedule_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(schedule)
}
