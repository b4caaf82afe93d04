use crate::models::{DbAppointment, DbAppointmentDetail};
use chrono::NaiveDateTime;
use eyre::Result;
use omms_core::models::appointment::STATUS_CANCELLED;
use sqlx::{Executor, Pool, Postgres, Transaction};

const APPT_COLUMNS: &str = "appt_id, patient_id, doctor_id, schedule_id, appt_time, status, \
     symptom_desc, created_at, updated_at";

const DETAIL_SELECT: &str = r#"
    SELECT a.appt_id, a.patient_id, p.name AS patient_name,
           a.doctor_id, d.doctor_name, d.dept_id, dep.dept_name,
           a.schedule_id, a.appt_time, a.status, a.symptom_desc,
           a.created_at, a.updated_at
    FROM appointments a
    JOIN patients p ON a.patient_id = p.patient_id
    JOIN doctors d ON a.doctor_id = d.doctor_id
    JOIN departments dep ON d.dept_id = dep.dept_id
"#;

pub async fn list_appointments(
    pool: &Pool<Postgres>,
    patient_id: Option<i64>,
    doctor_id: Option<i64>,
    status: Option<i16>,
    offset: i64,
    limit: i64,
) -> Result<Vec<DbAppointmentDetail>> {
    let appointments = sqlx::query_as::<_, DbAppointmentDetail>(&format!(
        r#"
        {DETAIL_SELECT}
        WHERE ($1::BIGINT IS NULL OR a.patient_id = $1)
          AND ($2::BIGINT IS NULL OR a.doctor_id = $2)
          AND ($3::SMALLINT IS NULL OR a.status = $3)
        ORDER BY a.appt_time DESC
        OFFSET $4 LIMIT $5
        "#,
    ))
    .bind(patient_id)
    .bind(doctor_id)
    .bind(status)
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn count_appointments(
    pool: &Pool<Postgres>,
    patient_id: Option<i64>,
    doctor_id: Option<i64>,
    status: Option<i16>,
) -> Result<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM appointments
        WHERE ($1::BIGINT IS NULL OR patient_id = $1)
          AND ($2::BIGINT IS NULL OR doctor_id = $2)
          AND ($3::SMALLINT IS NULL OR status = $3)
        "#,
    )
    .bind(patient_id)
    .bind(doctor_id)
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

pub async fn get_appointment_by_id(
    pool: &Pool<Postgres>,
    appt_id: i64,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPT_COLUMNS}
        FROM appointments
        WHERE appt_id = $1
        "#,
    ))
    .bind(appt_id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn get_appointment_detail_by_id(
    pool: &Pool<Postgres>,
    appt_id: i64,
) -> Result<Option<DbAppointmentDetail>> {
    let appointment = sqlx::query_as::<_, DbAppointmentDetail>(&format!(
        r#"
        {DETAIL_SELECT}
        WHERE a.appt_id = $1
        "#,
    ))
    .bind(appt_id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

/// Number of non-cancelled appointments held against a schedule. This is
/// the authoritative capacity figure; cancelled rows free their slot by
/// dropping out of the count.
pub async fn count_active_for_schedule<'e, E>(executor: E, schedule_id: i64) -> Result<i64>
where
    E: Executor<'e, Database = Postgres>,
{
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM appointments WHERE schedule_id = $1 AND status <> $2",
    )
    .bind(schedule_id)
    .bind(STATUS_CANCELLED)
    .fetch_one(executor)
    .await?;

    Ok(count)
}

/// Whether the patient already holds a non-cancelled appointment at the
/// exact timestamp.
pub async fn exists_active_at<'e, E>(
    executor: E,
    patient_id: i64,
    appt_time: NaiveDateTime,
) -> Result<bool>
where
    E: Executor<'e, Database = Postgres>,
{
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM appointments
            WHERE patient_id = $1 AND appt_time = $2 AND status <> $3
        )
        "#,
    )
    .bind(patient_id)
    .bind(appt_time)
    .bind(STATUS_CANCELLED)
    .fetch_one(executor)
    .await?;

    Ok(exists)
}

/// The booking insert; runs inside the transaction holding the schedule
/// row lock.
pub async fn insert_appointment(
    tx: &mut Transaction<'_, Postgres>,
    patient_id: i64,
    doctor_id: i64,
    schedule_id: i64,
    appt_time: NaiveDateTime,
    symptom_desc: Option<&str>,
    now: NaiveDateTime,
) -> Result<DbAppointment> {
    tracing::debug!(
        "Inserting appointment: patient_id={}, schedule_id={}, appt_time={}",
        patient_id,
        schedule_id,
        appt_time
    );

    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments (patient_id, doctor_id, schedule_id, appt_time, status, symptom_desc, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 0, $5, $6, $6)
        RETURNING {APPT_COLUMNS}
        "#,
    ))
    .bind(patient_id)
    .bind(doctor_id)
    .bind(schedule_id)
    .bind(appt_time)
    .bind(symptom_desc)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;

    Ok(appointment)
}

pub async fn update_appointment(
    pool: &Pool<Postgres>,
    appt_id: i64,
    status: Option<i16>,
    symptom_desc: Option<&str>,
    now: NaiveDateTime,
) -> Result<DbAppointment> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET status = COALESCE($2, status),
            symptom_desc = COALESCE($3, symptom_desc),
            updated_at = $4
        WHERE appt_id = $1
        RETURNING {APPT_COLUMNS}
        "#,
    ))
    .bind(appt_id)
    .bind(status)
    .bind(symptom_desc)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(appointment)
}

pub async fn set_status(
    pool: &Pool<Postgres>,
    appt_id: i64,
    status: i16,
    now: NaiveDateTime,
) -> Result<DbAppointment> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET status = $2, updated_at = $3
        WHERE appt_id = $1
        RETURNING {APPT_COLUMNS}
        "#,
    ))
    .bind(appt_id)
    .bind(status)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(appointment)
}
