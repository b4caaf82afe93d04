use crate::models::{DbPrescription, DbVisitRow};
use chrono::NaiveDateTime;
use eyre::Result;
use sqlx::{FromRow, Pool, Postgres};

/// Appointments joined with names inside a half-open time range,
/// optionally narrowed to one department and/or doctor by name.
pub async fn visits_between(
    pool: &Pool<Postgres>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    dept_name: Option<&str>,
    doctor_name: Option<&str>,
) -> Result<Vec<DbVisitRow>> {
    let rows = sqlx::query_as::<_, DbVisitRow>(
        r#"
        SELECT a.appt_id, a.appt_time, a.status,
               p.name AS patient_name, d.doctor_name, dep.dept_name
        FROM appointments a
        JOIN patients p ON a.patient_id = p.patient_id
        JOIN doctors d ON a.doctor_id = d.doctor_id
        JOIN departments dep ON d.dept_id = dep.dept_id
        WHERE ($1::TIMESTAMP IS NULL OR a.appt_time >= $1)
          AND ($2::TIMESTAMP IS NULL OR a.appt_time < $2)
          AND ($3::VARCHAR IS NULL OR dep.dept_name = $3)
          AND ($4::VARCHAR IS NULL OR d.doctor_name = $4)
        ORDER BY a.appt_time ASC
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(dept_name)
    .bind(doctor_name)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[derive(Debug, Clone, FromRow)]
pub struct DayCount {
    pub day: String,
    pub count: i64,
}

/// Per-day appointment counts inside a half-open time range.
pub async fn visit_counts_by_day(
    pool: &Pool<Postgres>,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<DayCount>> {
    let rows = sqlx::query_as::<_, DayCount>(
        r#"
        SELECT to_char(appt_time, 'YYYY-MM-DD') AS day, COUNT(*) AS count
        FROM appointments
        WHERE appt_time >= $1 AND appt_time < $2
        GROUP BY day
        ORDER BY day
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn prescriptions_between(
    pool: &Pool<Postgres>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<Vec<DbPrescription>> {
    let prescriptions = sqlx::query_as::<_, DbPrescription>(
        r#"
        SELECT id, patient, department, doctor, created_at, status
        FROM pharmacy_prescriptions
        WHERE ($1::TIMESTAMP IS NULL OR created_at >= $1)
          AND ($2::TIMESTAMP IS NULL OR created_at < $2)
        ORDER BY created_at ASC
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(prescriptions)
}

#[derive(Debug, Clone, FromRow)]
pub struct PrescriptionItemCount {
    pub prescription_id: String,
    pub count: i64,
}

/// Line-item counts per prescription id.
pub async fn item_counts_by_prescription(
    pool: &Pool<Postgres>,
    prescription_ids: &[String],
) -> Result<Vec<PrescriptionItemCount>> {
    let rows = sqlx::query_as::<_, PrescriptionItemCount>(
        r#"
        SELECT prescription_id, COUNT(*) AS count
        FROM prescription_items
        WHERE prescription_id = ANY($1)
        GROUP BY prescription_id
        "#,
    )
    .bind(prescription_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
