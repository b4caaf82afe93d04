use crate::models::DbRecord;
use chrono::{NaiveDate, NaiveDateTime};
use eyre::Result;
use sqlx::{Pool, Postgres};

const RECORD_COLUMNS: &str = "id, dept_id, doctor_id, patient_id, patient_name, created_at, \
     status, template_id, chief_complaint, diagnosis, prescriptions_json, labs_json, imaging_json";

/// Lists records matching the database-side filters. The lab/imaging
/// presence filters and pagination are applied by the handler after the
/// JSON columns are decoded.
pub async fn list_records(
    pool: &Pool<Postgres>,
    status: Option<&str>,
    date: Option<NaiveDate>,
    dept_id: Option<i64>,
    doctor_id: Option<i64>,
) -> Result<Vec<DbRecord>> {
    let records = sqlx::query_as::<_, DbRecord>(&format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM records
        WHERE ($1::VARCHAR IS NULL OR status = $1)
          AND ($2::DATE IS NULL OR created_at::date = $2)
          AND ($3::BIGINT IS NULL OR dept_id = $3)
          AND ($4::BIGINT IS NULL OR doctor_id = $4)
        ORDER BY created_at DESC
        "#,
    ))
    .bind(status)
    .bind(date)
    .bind(dept_id)
    .bind(doctor_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

pub async fn get_record_by_id(pool: &Pool<Postgres>, id: &str) -> Result<Option<DbRecord>> {
    let record = sqlx::query_as::<_, DbRecord>(&format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM records
        WHERE id = $1
        "#,
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_record(
    pool: &Pool<Postgres>,
    id: &str,
    dept_id: i64,
    doctor_id: i64,
    patient_id: Option<i64>,
    patient_name: Option<&str>,
    created_at: NaiveDateTime,
    template_id: Option<i64>,
    chief_complaint: &str,
    diagnosis: &str,
    prescriptions_json: Option<&str>,
    labs_json: Option<&str>,
    imaging_json: Option<&str>,
) -> Result<DbRecord> {
    tracing::debug!("Creating record: id={}, dept_id={}", id, dept_id);

    let record = sqlx::query_as::<_, DbRecord>(&format!(
        r#"
        INSERT INTO records (id, dept_id, doctor_id, patient_id, patient_name, created_at,
                             status, template_id, chief_complaint, diagnosis,
                             prescriptions_json, labs_json, imaging_json)
        VALUES ($1, $2, $3, $4, $5, $6, 'draft', $7, $8, $9, $10, $11, $12)
        RETURNING {RECORD_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(dept_id)
    .bind(doctor_id)
    .bind(patient_id)
    .bind(patient_name)
    .bind(created_at)
    .bind(template_id)
    .bind(chief_complaint)
    .bind(diagnosis)
    .bind(prescriptions_json)
    .bind(labs_json)
    .bind(imaging_json)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

pub struct RecordChanges<'a> {
    pub patient_id: Option<i64>,
    pub patient_name: Option<&'a str>,
    pub chief_complaint: Option<&'a str>,
    pub diagnosis: Option<&'a str>,
    /// `Some(None)` clears the column, `Some(Some(_))` replaces it.
    pub prescriptions_json: Option<Option<&'a str>>,
    pub labs_json: Option<Option<&'a str>>,
    pub imaging_json: Option<Option<&'a str>>,
    pub created_at: Option<NaiveDateTime>,
    pub dept_id: Option<i64>,
    pub doctor_id: Option<i64>,
}

pub async fn update_record(
    pool: &Pool<Postgres>,
    id: &str,
    changes: RecordChanges<'_>,
) -> Result<DbRecord> {
    let record = sqlx::query_as::<_, DbRecord>(&format!(
        r#"
        UPDATE records
        SET patient_id = COALESCE($2, patient_id),
            patient_name = COALESCE($3, patient_name),
            chief_complaint = COALESCE($4, chief_complaint),
            diagnosis = COALESCE($5, diagnosis),
            prescriptions_json = CASE WHEN $6 THEN $7 ELSE prescriptions_json END,
            labs_json = CASE WHEN $8 THEN $9 ELSE labs_json END,
            imaging_json = CASE WHEN $10 THEN $11 ELSE imaging_json END,
            created_at = COALESCE($12, created_at),
            dept_id = COALESCE($13, dept_id),
            doctor_id = COALESCE($14, doctor_id)
        WHERE id = $1
        RETURNING {RECORD_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(changes.patient_id)
    .bind(changes.patient_name)
    .bind(changes.chief_complaint)
    .bind(changes.diagnosis)
    .bind(changes.prescriptions_json.is_some())
    .bind(changes.prescriptions_json.flatten())
    .bind(changes.labs_json.is_some())
    .bind(changes.labs_json.flatten())
    .bind(changes.imaging_json.is_some())
    .bind(changes.imaging_json.flatten())
    .bind(changes.created_at)
    .bind(changes.dept_id)
    .bind(changes.doctor_id)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

pub async fn set_status(pool: &Pool<Postgres>, id: &str, status: &str) -> Result<DbRecord> {
    let record = sqlx::query_as::<_, DbRecord>(&format!(
        r#"
        UPDATE records
        SET status = $2
        WHERE id = $1
        RETURNING {RECORD_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

pub async fn count_by_template(pool: &Pool<Postgres>, template_id: i64) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM records WHERE template_id = $1")
        .bind(template_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}
