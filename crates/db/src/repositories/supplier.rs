use crate::models::{DbSupplier, DbSupplierOrder, DbSupplierOrderItem};
use chrono::NaiveDateTime;
use eyre::Result;
use sqlx::{Pool, Postgres, Transaction};

const SUPPLIER_COLUMNS: &str = "id, name, contact, phone, address, created_at, updated_at";

const ORDER_COLUMNS: &str = "id, supplier_id, created_at, status, amount";

const ORDER_ITEM_COLUMNS: &str = "id, order_id, medicine_id, name, qty, unit, price";

pub async fn list_suppliers(pool: &Pool<Postgres>) -> Result<Vec<DbSupplier>> {
    let suppliers = sqlx::query_as::<_, DbSupplier>(&format!(
        r#"
        SELECT {SUPPLIER_COLUMNS}
        FROM suppliers
        ORDER BY id
        "#,
    ))
    .fetch_all(pool)
    .await?;

    Ok(suppliers)
}

pub async fn get_supplier_by_id(pool: &Pool<Postgres>, id: i64) -> Result<Option<DbSupplier>> {
    let supplier = sqlx::query_as::<_, DbSupplier>(&format!(
        r#"
        SELECT {SUPPLIER_COLUMNS}
        FROM suppliers
        WHERE id = $1
        "#,
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(supplier)
}

pub async fn create_supplier(
    pool: &Pool<Postgres>,
    name: &str,
    contact: Option<&str>,
    phone: Option<&str>,
    address: Option<&str>,
    now: NaiveDateTime,
) -> Result<DbSupplier> {
    let supplier = sqlx::query_as::<_, DbSupplier>(&format!(
        r#"
        INSERT INTO suppliers (name, contact, phone, address, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING {SUPPLIER_COLUMNS}
        "#,
    ))
    .bind(name)
    .bind(contact)
    .bind(phone)
    .bind(address)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(supplier)
}

pub async fn list_orders(
    pool: &Pool<Postgres>,
    status: Option<&str>,
) -> Result<Vec<DbSupplierOrder>> {
    let orders = sqlx::query_as::<_, DbSupplierOrder>(&format!(
        r#"
        SELECT {ORDER_COLUMNS}
        FROM supplier_orders
        WHERE ($1::VARCHAR IS NULL OR status = $1)
        ORDER BY created_at DESC
        "#,
    ))
    .bind(status)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

pub async fn get_items_for_orders(
    pool: &Pool<Postgres>,
    order_ids: &[String],
) -> Result<Vec<DbSupplierOrderItem>> {
    let items = sqlx::query_as::<_, DbSupplierOrderItem>(&format!(
        r#"
        SELECT {ORDER_ITEM_COLUMNS}
        FROM supplier_order_items
        WHERE order_id = ANY($1)
        ORDER BY id
        "#,
    ))
    .bind(order_ids)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

pub async fn insert_order(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
    supplier_id: i64,
    now: NaiveDateTime,
) -> Result<DbSupplierOrder> {
    let order = sqlx::query_as::<_, DbSupplierOrder>(&format!(
        r#"
        INSERT INTO supplier_orders (id, supplier_id, created_at, status, amount)
        VALUES ($1, $2, $3, 'pending', 0)
        RETURNING {ORDER_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(supplier_id)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;

    Ok(order)
}

pub async fn insert_order_item(
    tx: &mut Transaction<'_, Postgres>,
    order_id: &str,
    medicine_id: i64,
    name: Option<&str>,
    qty: i32,
    unit: Option<&str>,
    price: f64,
) -> Result<DbSupplierOrderItem> {
    let item = sqlx::query_as::<_, DbSupplierOrderItem>(&format!(
        r#"
        INSERT INTO supplier_order_items (order_id, medicine_id, name, qty, unit, price)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {ORDER_ITEM_COLUMNS}
        "#,
    ))
    .bind(order_id)
    .bind(medicine_id)
    .bind(name)
    .bind(qty)
    .bind(unit)
    .bind(price)
    .fetch_one(&mut **tx)
    .await?;

    Ok(item)
}

pub async fn set_order_amount(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
    amount: f64,
) -> Result<()> {
    sqlx::query("UPDATE supplier_orders SET amount = $2 WHERE id = $1")
        .bind(id)
        .bind(amount)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Locks the order row so concurrent status changes serialize.
pub async fn lock_order(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
) -> Result<Option<DbSupplierOrder>> {
    let order = sqlx::query_as::<_, DbSupplierOrder>(&format!(
        r#"
        SELECT {ORDER_COLUMNS}
        FROM supplier_orders
        WHERE id = $1
        FOR UPDATE
        "#,
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(order)
}

pub async fn get_order_items(
    tx: &mut Transaction<'_, Postgres>,
    order_id: &str,
) -> Result<Vec<DbSupplierOrderItem>> {
    let items = sqlx::query_as::<_, DbSupplierOrderItem>(&format!(
        r#"
        SELECT {ORDER_ITEM_COLUMNS}
        FROM supplier_order_items
        WHERE order_id = $1
        ORDER BY id
        "#,
    ))
    .bind(order_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(items)
}

pub async fn set_order_status(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
    status: &str,
) -> Result<DbSupplierOrder> {
    let order = sqlx::query_as::<_, DbSupplierOrder>(&format!(
        r#"
        UPDATE supplier_orders
        SET status = $2
        WHERE id = $1
        RETURNING {ORDER_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(status)
    .fetch_one(&mut **tx)
    .await?;

    Ok(order)
}
