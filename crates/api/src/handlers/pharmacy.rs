//! Pharmacy handlers: medicines, the stock ledger, prescriptions,
//! suppliers and purchase orders.
//!
//! Every stock mutation follows the same shape: one transaction, the
//! stock row locked `FOR UPDATE` before the sufficiency check, debit or
//! credit plus an append-only log row inside the same scope. A rejection
//! anywhere rolls the whole movement back, so `current_stock` can never
//! go negative and the ledger never records a movement that did not
//! happen.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, Local};
use std::collections::HashMap;
use std::sync::Arc;

use omms_core::{
    errors::OmmsError,
    models::page::{Page, PageQuery},
    models::pharmacy::{
        validate_prescription_transition, BatchListQuery, CreateOrderOut, CreateOrderPayload,
        CreateSupplierPayload, InventoryBatchOut, InventoryInOut, InventoryInPayload,
        InventoryLogOut, InventoryOutOut, InventoryOutPayload, LogListQuery, MedicineListQuery,
        MedicineOut, OrderStatusOut, OrderStatusPayload, PrescriptionItemOut, PrescriptionOut,
        PrescriptionStatusOut, PrescriptionStatusPayload, SupplierOrderItemOut, SupplierOrderOut,
        SupplierOut, LOG_TYPE_IN, LOG_TYPE_OUT, ORDER_CANCELLED, ORDER_COMPLETED, ORDER_PENDING,
        PRESCRIPTION_APPROVED, PRESCRIPTION_DISPENSED, PRESCRIPTION_PENDING,
    },
    response::Envelope,
    time_fmt,
};
use omms_db::models::DbMedicine;
use omms_db::repositories::{inventory, medicine, prescription, supplier};

use crate::{
    middleware::{auth::AuthUser, error_handling::AppError},
    ApiState,
};

async fn medicine_map(
    state: &ApiState,
    medicine_ids: Vec<i64>,
) -> Result<HashMap<i64, DbMedicine>, AppError> {
    if medicine_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let medicines = medicine::get_medicines_by_ids(&state.db_pool, &medicine_ids)
        .await
        .map_err(OmmsError::Database)?;
    Ok(medicines.into_iter().map(|m| (m.medicine_id, m)).collect())
}

#[axum::debug_handler]
pub async fn list_medicines(
    State(state): State<Arc<ApiState>>,
    _current: AuthUser,
    Query(query): Query<MedicineListQuery>,
) -> Result<Json<Envelope<Page<MedicineOut>>>, AppError> {
    let (page, page_size, offset) = PageQuery {
        page: query.page,
        page_size: query.page_size,
    }
    .normalize(100, 500);

    let total = medicine::count_medicines(&state.db_pool)
        .await
        .map_err(OmmsError::Database)?;

    let rows = medicine::list_medicines(&state.db_pool, offset, page_size)
        .await
        .map_err(OmmsError::Database)?;

    let ids: Vec<i64> = rows.iter().map(|m| m.medicine_id).collect();
    let stocks = if ids.is_empty() {
        Vec::new()
    } else {
        medicine::get_stocks_by_medicine_ids(&state.db_pool, &ids)
            .await
            .map_err(OmmsError::Database)?
    };
    let stock_map: HashMap<i64, i32> = stocks
        .into_iter()
        .map(|s| (s.medicine_id, s.current_stock))
        .collect();

    let mut list: Vec<MedicineOut> = rows
        .into_iter()
        .map(|m| MedicineOut {
            id: m.medicine_id,
            name: m.medicine_name,
            specification: m.specification,
            unit: m.unit,
            price: m.price,
            warning_stock: m.warning_stock,
            current_stock: stock_map.get(&m.medicine_id).copied().unwrap_or(0),
        })
        .collect();

    if query.low_stock_only.unwrap_or(false) {
        list.retain(|m| m.current_stock <= m.warning_stock);
    }

    Ok(Json(Envelope::ok(Page {
        list,
        total,
        page,
        page_size,
    })))
}

#[axum::debug_handler]
pub async fn list_batches(
    State(state): State<Arc<ApiState>>,
    _current: AuthUser,
    Query(query): Query<BatchListQuery>,
) -> Result<Json<Envelope<Vec<InventoryBatchOut>>>, AppError> {
    let (expiring_from, expiring_to) = match query.expiring_in_days {
        Some(days) if days >= 0 => {
            let today = Local::now().date_naive();
            (Some(today), Some(today + Duration::days(days)))
        }
        _ => (None, None),
    };

    let batches = inventory::list_batches(&state.db_pool, expiring_from, expiring_to)
        .await
        .map_err(OmmsError::Database)?;

    let ids: Vec<i64> = batches.iter().map(|b| b.medicine_id).collect();
    let med_map = medicine_map(&state, ids).await?;

    let list = batches
        .into_iter()
        .map(|b| InventoryBatchOut {
            id: b.id,
            batch_no: b.batch_no,
            medicine_id: b.medicine_id,
            medicine: med_map.get(&b.medicine_id).map(|m| m.medicine_name.clone()),
            specification: med_map.get(&b.medicine_id).map(|m| m.specification.clone()),
            quantity: b.quantity,
            received_at: Some(time_fmt::fmt_date(b.received_at)),
            expiry_date: b.expiry_date.map(time_fmt::fmt_date),
        })
        .collect();

    Ok(Json(Envelope::ok(list)))
}

#[axum::debug_handler]
pub async fn list_logs(
    State(state): State<Arc<ApiState>>,
    _current: AuthUser,
    Query(query): Query<LogListQuery>,
) -> Result<Json<Envelope<Vec<InventoryLogOut>>>, AppError> {
    let log_type = query
        .log_type
        .as_deref()
        .filter(|t| matches!(*t, LOG_TYPE_IN | LOG_TYPE_OUT));

    let logs = inventory::list_logs(&state.db_pool, log_type)
        .await
        .map_err(OmmsError::Database)?;

    let ids: Vec<i64> = logs.iter().map(|l| l.medicine_id).collect();
    let med_map = medicine_map(&state, ids).await?;

    let list = logs
        .into_iter()
        .map(|l| InventoryLogOut {
            id: l.id,
            log_type: l.log_type,
            medicine_id: l.medicine_id,
            medicine: med_map.get(&l.medicine_id).map(|m| m.medicine_name.clone()),
            specification: med_map.get(&l.medicine_id).map(|m| m.specification.clone()),
            quantity: l.quantity,
            time: l.time.map(time_fmt::fmt_datetime),
            note: l.note,
        })
        .collect();

    Ok(Json(Envelope::ok(list)))
}

/// Inbound movement: batch row + "in" log + stock credit, one transaction.
#[axum::debug_handler]
pub async fn inventory_in(
    State(state): State<Arc<ApiState>>,
    _current: AuthUser,
    Json(payload): Json<InventoryInPayload>,
) -> Result<Json<Envelope<InventoryInOut>>, AppError> {
    let med = medicine::get_medicine_by_id(&state.db_pool, payload.medicine_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("药品不存在".to_string()))?;

    let received_at = time_fmt::parse_date(&payload.received_at)?;
    let expiry_date = match &payload.expiry_date {
        Some(raw) => Some(time_fmt::parse_date(raw)?),
        None => None,
    };

    let now = Local::now().naive_local();
    let mut tx = state
        .db_pool
        .begin()
        .await
        .map_err(|e| OmmsError::Database(e.into()))?;

    inventory::ensure_stock_row(&mut tx, payload.medicine_id, now)
        .await
        .map_err(OmmsError::Database)?;
    inventory::lock_stock(&mut tx, payload.medicine_id)
        .await
        .map_err(OmmsError::Database)?;

    let batch = inventory::insert_batch(
        &mut tx,
        payload.medicine_id,
        &payload.batch_no,
        payload.quantity,
        received_at,
        expiry_date,
        now,
    )
    .await
    .map_err(OmmsError::Database)?;

    let log = inventory::insert_log(
        &mut tx,
        LOG_TYPE_IN,
        payload.medicine_id,
        payload.quantity,
        now,
        payload.note.as_deref(),
        Some(&payload.batch_no),
    )
    .await
    .map_err(OmmsError::Database)?;

    inventory::add_stock(&mut tx, payload.medicine_id, payload.quantity, now)
        .await
        .map_err(OmmsError::Database)?;

    tx.commit()
        .await
        .map_err(|e| OmmsError::Database(e.into()))?;

    Ok(Json(Envelope::ok(InventoryInOut {
        batch: batch.id,
        log: log.id,
        medicine: med.medicine_id,
    })))
}

/// Outbound movement: sufficiency check under the row lock, then debit
/// plus "out" log. An insufficient balance rejects and leaves stock
/// untouched.
#[axum::debug_handler]
pub async fn inventory_out(
    State(state): State<Arc<ApiState>>,
    _current: AuthUser,
    Json(payload): Json<InventoryOutPayload>,
) -> Result<Json<Envelope<InventoryOutOut>>, AppError> {
    let med = medicine::get_medicine_by_id(&state.db_pool, payload.medicine_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("药品不存在".to_string()))?;

    if payload.quantity <= 0 {
        return Err(AppError(OmmsError::Validation("数量必须大于0".to_string())));
    }

    let when = match &payload.time {
        Some(raw) => time_fmt::parse_datetime(raw)?,
        None => Local::now().naive_local(),
    };

    let mut tx = state
        .db_pool
        .begin()
        .await
        .map_err(|e| OmmsError::Database(e.into()))?;

    let stock = inventory::lock_stock(&mut tx, payload.medicine_id)
        .await
        .map_err(OmmsError::Database)?;

    let sufficient = stock
        .as_ref()
        .is_some_and(|s| s.current_stock >= payload.quantity);
    if !sufficient {
        return Err(AppError(OmmsError::Validation("库存不足".to_string())));
    }

    inventory::deduct_stock(&mut tx, payload.medicine_id, payload.quantity, when)
        .await
        .map_err(OmmsError::Database)?;

    let log = inventory::insert_log(
        &mut tx,
        LOG_TYPE_OUT,
        payload.medicine_id,
        payload.quantity,
        when,
        payload.note.as_deref(),
        None,
    )
    .await
    .map_err(OmmsError::Database)?;

    tx.commit()
        .await
        .map_err(|e| OmmsError::Database(e.into()))?;

    Ok(Json(Envelope::ok(InventoryOutOut {
        log: log.id,
        medicine: med.medicine_id,
    })))
}

#[axum::debug_handler]
pub async fn list_prescriptions(
    State(state): State<Arc<ApiState>>,
    _current: AuthUser,
    Query(query): Query<PrescriptionStatusQuery>,
) -> Result<Json<Envelope<Vec<PrescriptionOut>>>, AppError> {
    let status = query.status.as_deref().filter(|s| {
        matches!(
            *s,
            PRESCRIPTION_PENDING | PRESCRIPTION_APPROVED | PRESCRIPTION_DISPENSED
        )
    });

    let prescriptions = prescription::list_prescriptions(&state.db_pool, status)
        .await
        .map_err(OmmsError::Database)?;

    let ids: Vec<String> = prescriptions.iter().map(|p| p.id.clone()).collect();
    let items = if ids.is_empty() {
        Vec::new()
    } else {
        prescription::get_items_for_prescriptions(&state.db_pool, &ids)
            .await
            .map_err(OmmsError::Database)?
    };

    let mut items_by_pid: HashMap<String, Vec<PrescriptionItemOut>> = HashMap::new();
    for item in items {
        items_by_pid
            .entry(item.prescription_id.clone())
            .or_default()
            .push(PrescriptionItemOut {
                medicine_id: item.medicine_id,
                name: item.name,
                qty: item.qty,
                unit: item.unit,
                price: item.price,
            });
    }

    let list = prescriptions
        .into_iter()
        .map(|p| {
            let items = items_by_pid.remove(&p.id).unwrap_or_default();
            PrescriptionOut {
                id: p.id,
                patient: p.patient,
                department: p.department,
                doctor: p.doctor,
                created_at: p.created_at.map(time_fmt::fmt_datetime),
                status: p.status,
                items,
            }
        })
        .collect();

    Ok(Json(Envelope::ok(list)))
}

#[derive(Debug, serde::Deserialize)]
pub struct PrescriptionStatusQuery {
    pub status: Option<String>,
}

/// Prescription status transition. Dispensing debits stock per line item
/// inside the same transaction; the first insufficiency aborts the whole
/// movement.
#[axum::debug_handler]
pub async fn update_prescription_status(
    State(state): State<Arc<ApiState>>,
    _current: AuthUser,
    Path(pid): Path<String>,
    Json(payload): Json<PrescriptionStatusPayload>,
) -> Result<Json<Envelope<PrescriptionStatusOut>>, AppError> {
    let mut tx = state
        .db_pool
        .begin()
        .await
        .map_err(|e| OmmsError::Database(e.into()))?;

    let current = prescription::lock_prescription(&mut tx, &pid)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("处方不存在".to_string()))?;

    validate_prescription_transition(&current.status, &payload.status)?;

    let updated = prescription::set_status(&mut tx, &pid, &payload.status)
        .await
        .map_err(OmmsError::Database)?;

    if payload.status == PRESCRIPTION_DISPENSED {
        let items = prescription::get_items(&mut tx, &pid)
            .await
            .map_err(OmmsError::Database)?;
        let now = Local::now().naive_local();

        for item in items {
            let med = medicine::get_medicine_by_id(&state.db_pool, item.medicine_id)
                .await
                .map_err(OmmsError::Database)?
                .ok_or_else(|| {
                    OmmsError::NotFound(format!("药品不存在: {}", item.medicine_id))
                })?;

            let stock = inventory::lock_stock(&mut tx, item.medicine_id)
                .await
                .map_err(OmmsError::Database)?;
            let sufficient = stock.as_ref().is_some_and(|s| s.current_stock >= item.qty);
            if !sufficient {
                return Err(AppError(OmmsError::Validation(format!(
                    "库存不足: {}",
                    med.medicine_name
                ))));
            }

            inventory::deduct_stock(&mut tx, item.medicine_id, item.qty, now)
                .await
                .map_err(OmmsError::Database)?;
            inventory::insert_log(
                &mut tx,
                LOG_TYPE_OUT,
                item.medicine_id,
                item.qty,
                now,
                Some(&format!("处方发药 {pid}")),
                None,
            )
            .await
            .map_err(OmmsError::Database)?;
        }
    }

    tx.commit()
        .await
        .map_err(|e| OmmsError::Database(e.into()))?;

    Ok(Json(Envelope::ok(PrescriptionStatusOut {
        id: updated.id,
        status: updated.status,
    })))
}

#[axum::debug_handler]
pub async fn list_suppliers(
    State(state): State<Arc<ApiState>>,
    _current: AuthUser,
) -> Result<Json<Envelope<Vec<SupplierOut>>>, AppError> {
    let suppliers = supplier::list_suppliers(&state.db_pool)
        .await
        .map_err(OmmsError::Database)?;

    let list = suppliers
        .into_iter()
        .map(|s| SupplierOut {
            id: s.id,
            name: s.name,
            contact: s.contact,
            phone: s.phone,
            address: s.address,
        })
        .collect();

    Ok(Json(Envelope::ok(list)))
}

#[axum::debug_handler]
pub async fn create_supplier(
    State(state): State<Arc<ApiState>>,
    _current: AuthUser,
    Json(payload): Json<CreateSupplierPayload>,
) -> Result<Json<Envelope<SupplierOut>>, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError(OmmsError::Validation(
            "供应商名称不能为空".to_string(),
        )));
    }

    let now = Local::now().naive_local();
    let created = supplier::create_supplier(
        &state.db_pool,
        name,
        payload
            .contact
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty()),
        payload
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty()),
        payload
            .address
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty()),
        now,
    )
    .await
    .map_err(OmmsError::Database)?;

    Ok(Json(Envelope::ok_with(
        SupplierOut {
            id: created.id,
            name: created.name,
            contact: created.contact,
            phone: created.phone,
            address: created.address,
        },
        "供应商创建成功",
    )))
}

#[derive(Debug, serde::Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
}

#[axum::debug_handler]
pub async fn list_orders(
    State(state): State<Arc<ApiState>>,
    _current: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Envelope<Vec<SupplierOrderOut>>>, AppError> {
    let status = query
        .status
        .as_deref()
        .filter(|s| matches!(*s, ORDER_PENDING | ORDER_COMPLETED | ORDER_CANCELLED));

    let orders = supplier::list_orders(&state.db_pool, status)
        .await
        .map_err(OmmsError::Database)?;

    let ids: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();
    let items = if ids.is_empty() {
        Vec::new()
    } else {
        supplier::get_items_for_orders(&state.db_pool, &ids)
            .await
            .map_err(OmmsError::Database)?
    };

    let mut items_by_oid: HashMap<String, Vec<SupplierOrderItemOut>> = HashMap::new();
    for item in items {
        items_by_oid
            .entry(item.order_id.clone())
            .or_default()
            .push(SupplierOrderItemOut {
                medicine_id: item.medicine_id,
                name: item.name,
                qty: item.qty,
                unit: item.unit,
                price: item.price,
            });
    }

    let list = orders
        .into_iter()
        .map(|o| {
            let items = items_by_oid.remove(&o.id).unwrap_or_default();
            SupplierOrderOut {
                id: o.id,
                supplier_id: o.supplier_id,
                created_at: time_fmt::fmt_datetime(o.created_at),
                status: o.status,
                amount: o.amount,
                items,
            }
        })
        .collect();

    Ok(Json(Envelope::ok(list)))
}

#[axum::debug_handler]
pub async fn create_order(
    State(state): State<Arc<ApiState>>,
    _current: AuthUser,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<Json<Envelope<CreateOrderOut>>, AppError> {
    let db_supplier = supplier::get_supplier_by_id(&state.db_pool, payload.supplier_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("供应商不存在".to_string()))?;

    let now = Local::now();
    let seq = now.timestamp() % 10000;
    let oid = format!("PO-{}-{:04}", now.format("%Y%m%d"), seq);

    let mut tx = state
        .db_pool
        .begin()
        .await
        .map_err(|e| OmmsError::Database(e.into()))?;

    let order = supplier::insert_order(&mut tx, &oid, db_supplier.id, now.naive_local())
        .await
        .map_err(OmmsError::Database)?;

    let mut amount = 0.0;
    for it in &payload.items {
        let med = medicine::get_medicine_by_id(&state.db_pool, it.medicine_id)
            .await
            .map_err(OmmsError::Database)?
            .ok_or_else(|| OmmsError::NotFound(format!("药品不存在: {}", it.medicine_id)))?;

        let price = it.price.unwrap_or(med.price);
        supplier::insert_order_item(
            &mut tx,
            &order.id,
            it.medicine_id,
            Some(&med.medicine_name),
            it.qty,
            it.unit.as_deref().or(Some(&med.unit)),
            price,
        )
        .await
        .map_err(OmmsError::Database)?;
        amount += price * f64::from(it.qty);
    }

    supplier::set_order_amount(&mut tx, &order.id, amount)
        .await
        .map_err(OmmsError::Database)?;

    tx.commit()
        .await
        .map_err(|e| OmmsError::Database(e.into()))?;

    Ok(Json(Envelope::ok(CreateOrderOut { id: oid, amount })))
}

/// Order status transition: only `pending` orders may change, and
/// completing an order runs the inbound stock flow per item.
#[axum::debug_handler]
pub async fn update_order_status(
    State(state): State<Arc<ApiState>>,
    _current: AuthUser,
    Path(oid): Path<String>,
    Json(payload): Json<OrderStatusPayload>,
) -> Result<Json<Envelope<OrderStatusOut>>, AppError> {
    if !matches!(payload.status.as_str(), ORDER_COMPLETED | ORDER_CANCELLED) {
        return Err(AppError(OmmsError::Validation("非法状态".to_string())));
    }

    let mut tx = state
        .db_pool
        .begin()
        .await
        .map_err(|e| OmmsError::Database(e.into()))?;

    let order = supplier::lock_order(&mut tx, &oid)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("订单不存在".to_string()))?;

    if order.status != ORDER_PENDING {
        return Err(AppError(OmmsError::Validation("订单不可更新".to_string())));
    }

    let updated = supplier::set_order_status(&mut tx, &oid, &payload.status)
        .await
        .map_err(OmmsError::Database)?;

    if payload.status == ORDER_COMPLETED {
        let items = supplier::get_order_items(&mut tx, &oid)
            .await
            .map_err(OmmsError::Database)?;
        let now = Local::now().naive_local();
        let today = now.date();

        for item in items {
            medicine::get_medicine_by_id(&state.db_pool, item.medicine_id)
                .await
                .map_err(OmmsError::Database)?
                .ok_or_else(|| {
                    OmmsError::NotFound(format!("药品不存在: {}", item.medicine_id))
                })?;

            let batch_no = format!("B-{oid}-{}", item.medicine_id);
            inventory::insert_batch(
                &mut tx,
                item.medicine_id,
                &batch_no,
                item.qty,
                today,
                None,
                now,
            )
            .await
            .map_err(OmmsError::Database)?;
            inventory::insert_log(
                &mut tx,
                LOG_TYPE_IN,
                item.medicine_id,
                item.qty,
                now,
                Some(&format!("订单入库 {oid}")),
                Some(&batch_no),
            )
            .await
            .map_err(OmmsError::Database)?;
            inventory::ensure_stock_row(&mut tx, item.medicine_id, now)
                .await
                .map_err(OmmsError::Database)?;
            inventory::add_stock(&mut tx, item.medicine_id, item.qty, now)
                .await
                .map_err(OmmsError::Database)?;
        }
    }

    tx.commit()
        .await
        .map_err(|e| OmmsError::Database(e.into()))?;

    Ok(Json(Envelope::ok(OrderStatusOut {
        id: updated.id,
        status: updated.status,
    })))
}
