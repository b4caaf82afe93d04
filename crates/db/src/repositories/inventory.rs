//! The stock ledger: append-only movement logs, batch rows, and the
//! running per-medicine total.
//!
//! Every mutation here runs inside a caller-owned transaction. Debits
//! must lock the stock row first ([`lock_stock`]) so the sufficiency
//! check and the decrement are serialized against concurrent movements
//! of the same medicine.

use crate::models::{DbInventoryBatch, DbInventoryLog, DbMedicineStock};
use chrono::{NaiveDate, NaiveDateTime};
use eyre::Result;
use sqlx::{Pool, Postgres, Transaction};

const LOG_COLUMNS: &str = "id, type, medicine_id, quantity, time, note, batch_no, created_at";

const STOCK_COLUMNS: &str = "stock_id, medicine_id, current_stock, last_stock_in_time, \
     last_stock_out_time, created_at, updated_at";

pub async fn list_batches(
    pool: &Pool<Postgres>,
    expiring_from: Option<NaiveDate>,
    expiring_to: Option<NaiveDate>,
) -> Result<Vec<DbInventoryBatch>> {
    let batches = sqlx::query_as::<_, DbInventoryBatch>(
        r#"
        SELECT id, medicine_id, batch_no, quantity, received_at, expiry_date, created_at
        FROM inventory_batches
        WHERE ($1::DATE IS NULL OR (expiry_date >= $1 AND expiry_date <= $2))
        ORDER BY id
        "#,
    )
    .bind(expiring_from)
    .bind(expiring_to)
    .fetch_all(pool)
    .await?;

    Ok(batches)
}

pub async fn list_logs(pool: &Pool<Postgres>, log_type: Option<&str>) -> Result<Vec<DbInventoryLog>> {
    let logs = sqlx::query_as::<_, DbInventoryLog>(&format!(
        r#"
        SELECT {LOG_COLUMNS}
        FROM inventory_logs
        WHERE ($1::VARCHAR IS NULL OR type = $1)
        ORDER BY id DESC
        "#,
    ))
    .bind(log_type)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

pub async fn insert_batch(
    tx: &mut Transaction<'_, Postgres>,
    medicine_id: i64,
    batch_no: &str,
    quantity: i32,
    received_at: NaiveDate,
    expiry_date: Option<NaiveDate>,
    now: NaiveDateTime,
) -> Result<DbInventoryBatch> {
    let batch = sqlx::query_as::<_, DbInventoryBatch>(
        r#"
        INSERT INTO inventory_batches (medicine_id, batch_no, quantity, received_at, expiry_date, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, medicine_id, batch_no, quantity, received_at, expiry_date, created_at
        "#,
    )
    .bind(medicine_id)
    .bind(batch_no)
    .bind(quantity)
    .bind(received_at)
    .bind(expiry_date)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;

    Ok(batch)
}

pub async fn insert_log(
    tx: &mut Transaction<'_, Postgres>,
    log_type: &str,
    medicine_id: i64,
    quantity: i32,
    time: NaiveDateTime,
    note: Option<&str>,
    batch_no: Option<&str>,
) -> Result<DbInventoryLog> {
    let log = sqlx::query_as::<_, DbInventoryLog>(&format!(
        r#"
        INSERT INTO inventory_logs (type, medicine_id, quantity, time, note, batch_no, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $4)
        RETURNING {LOG_COLUMNS}
        "#,
    ))
    .bind(log_type)
    .bind(medicine_id)
    .bind(quantity)
    .bind(time)
    .bind(note)
    .bind(batch_no)
    .fetch_one(&mut **tx)
    .await?;

    Ok(log)
}

/// Creates the running-total row on first movement of a medicine.
pub async fn ensure_stock_row(
    tx: &mut Transaction<'_, Postgres>,
    medicine_id: i64,
    now: NaiveDateTime,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO medicine_stocks (medicine_id, current_stock, created_at, updated_at)
        VALUES ($1, 0, $2, $2)
        ON CONFLICT (medicine_id) DO NOTHING
        "#,
    )
    .bind(medicine_id)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Locks the stock row for the duration of the transaction. Allocation
/// decisions (sufficiency check + debit) must hold this lock.
pub async fn lock_stock(
    tx: &mut Transaction<'_, Postgres>,
    medicine_id: i64,
) -> Result<Option<DbMedicineStock>> {
    let stock = sqlx::query_as::<_, DbMedicineStock>(&format!(
        r#"
        SELECT {STOCK_COLUMNS}
        FROM medicine_stocks
        WHERE medicine_id = $1
        FOR UPDATE
        "#,
    ))
    .bind(medicine_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(stock)
}

pub async fn add_stock(
    tx: &mut Transaction<'_, Postgres>,
    medicine_id: i64,
    quantity: i32,
    now: NaiveDateTime,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE medicine_stocks
        SET current_stock = current_stock + $2,
            last_stock_in_time = $3,
            updated_at = $3
        WHERE medicine_id = $1
        "#,
    )
    .bind(medicine_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn deduct_stock(
    tx: &mut Transaction<'_, Postgres>,
    medicine_id: i64,
    quantity: i32,
    now: NaiveDateTime,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE medicine_stocks
        SET current_stock = current_stock - $2,
            last_stock_out_time = $3,
            updated_at = $3
        WHERE medicine_id = $1
        "#,
    )
    .bind(medicine_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
