use crate::models::{DbMedicine, DbMedicineStock};
use eyre::Result;
use sqlx::{Pool, Postgres};

const MEDICINE_COLUMNS: &str = "medicine_id, medicine_name, specification, dosage_form, \
     manufacturer, unit, price, warning_stock, created_at, updated_at";

pub async fn list_medicines(
    pool: &Pool<Postgres>,
    offset: i64,
    limit: i64,
) -> Result<Vec<DbMedicine>> {
    let medicines = sqlx::query_as::<_, DbMedicine>(&format!(
        r#"
        SELECT {MEDICINE_COLUMNS}
        FROM medicines
        ORDER BY medicine_id
        OFFSET $1 LIMIT $2
        "#,
    ))
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(medicines)
}

pub async fn count_medicines(pool: &Pool<Postgres>) -> Result<i64> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM medicines")
        .fetch_one(pool)
        .await?;

    Ok(total)
}

pub async fn get_medicine_by_id(
    pool: &Pool<Postgres>,
    medicine_id: i64,
) -> Result<Option<DbMedicine>> {
    let medicine = sqlx::query_as::<_, DbMedicine>(&format!(
        r#"
        SELECT {MEDICINE_COLUMNS}
        FROM medicines
        WHERE medicine_id = $1
        "#,
    ))
    .bind(medicine_id)
    .fetch_optional(pool)
    .await?;

    Ok(medicine)
}

pub async fn get_medicines_by_ids(
    pool: &Pool<Postgres>,
    medicine_ids: &[i64],
) -> Result<Vec<DbMedicine>> {
    let medicines = sqlx::query_as::<_, DbMedicine>(&format!(
        r#"
        SELECT {MEDICINE_COLUMNS}
        FROM medicines
        WHERE medicine_id = ANY($1)
        "#,
    ))
    .bind(medicine_ids)
    .fetch_all(pool)
    .await?;

    Ok(medicines)
}

pub async fn get_stocks_by_medicine_ids(
    pool: &Pool<Postgres>,
    medicine_ids: &[i64],
) -> Result<Vec<DbMedicineStock>> {
    let stocks = sqlx::query_as::<_, DbMedicineStock>(
        r#"
        SELECT stock_id, medicine_id, current_stock, last_stock_in_time, last_stock_out_time,
               created_at, updated_at
        FROM medicine_stocks
        WHERE medicine_id = ANY($1)
        "#,
    )
    .bind(medicine_ids)
    .fetch_all(pool)
    .await?;

    Ok(stocks)
}
