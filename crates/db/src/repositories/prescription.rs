use crate::models::{DbPrescription, DbPrescriptionItem};
use eyre::Result;
use sqlx::{Pool, Postgres, Transaction};

const PRESCRIPTION_COLUMNS: &str = "id, patient, department, doctor, created_at, status";

const ITEM_COLUMNS: &str = "id, prescription_id, medicine_id, name, qty, unit, price";

pub async fn list_prescriptions(
    pool: &Pool<Postgres>,
    status: Option<&str>,
) -> Result<Vec<DbPrescription>> {
    let prescriptions = sqlx::query_as::<_, DbPrescription>(&format!(
        r#"
        SELECT {PRESCRIPTION_COLUMNS}
        FROM pharmacy_prescriptions
        WHERE ($1::VARCHAR IS NULL OR status = $1)
        ORDER BY created_at DESC
        "#,
    ))
    .bind(status)
    .fetch_all(pool)
    .await?;

    Ok(prescriptions)
}

pub async fn get_items_for_prescriptions(
    pool: &Pool<Postgres>,
    prescription_ids: &[String],
) -> Result<Vec<DbPrescriptionItem>> {
    let items = sqlx::query_as::<_, DbPrescriptionItem>(&format!(
        r#"
        SELECT {ITEM_COLUMNS}
        FROM prescription_items
        WHERE prescription_id = ANY($1)
        ORDER BY id
        "#,
    ))
    .bind(prescription_ids)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Locks the prescription row so concurrent status changes serialize.
pub async fn lock_prescription(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
) -> Result<Option<DbPrescription>> {
    let prescription = sqlx::query_as::<_, DbPrescription>(&format!(
        r#"
        SELECT {PRESCRIPTION_COLUMNS}
        FROM pharmacy_prescriptions
        WHERE id = $1
        FOR UPDATE
        "#,
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(prescription)
}

pub async fn get_items(
    tx: &mut Transaction<'_, Postgres>,
    prescription_id: &str,
) -> Result<Vec<DbPrescriptionItem>> {
    let items = sqlx::query_as::<_, DbPrescriptionItem>(&format!(
        r#"
        SELECT {ITEM_COLUMNS}
        FROM prescription_items
        WHERE prescription_id = $1
        ORDER BY id
        "#,
    ))
    .bind(prescription_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(items)
}

pub async fn set_status(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
    status: &str,
) -> Result<DbPrescription> {
    let prescription = sqlx::query_as::<_, DbPrescription>(&format!(
        r#"
        UPDATE pharmacy_prescriptions
        SET status = $2
        WHERE id = $1
        RETURNING {PRESCRIPTION_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(status)
    .fetch_one(&mut **tx)
    .await?;

    Ok(prescription)
}
