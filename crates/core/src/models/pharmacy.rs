//! Pharmacy DTOs: medicines, the stock ledger, prescriptions, suppliers
//! and purchase orders.

use serde::{Deserialize, Serialize};

use crate::errors::{OmmsError, OmmsResult};

pub const PRESCRIPTION_PENDING: &str = "pending";
pub const PRESCRIPTION_APPROVED: &str = "approved";
pub const PRESCRIPTION_DISPENSED: &str = "dispensed";

pub const ORDER_PENDING: &str = "pending";
pub const ORDER_COMPLETED: &str = "completed";
pub const ORDER_CANCELLED: &str = "cancelled";

pub const LOG_TYPE_IN: &str = "in";
pub const LOG_TYPE_OUT: &str = "out";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineOut {
    pub id: i64,
    pub name: String,
    pub specification: String,
    pub unit: String,
    pub price: f64,
    pub warning_stock: i32,
    pub current_stock: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineListQuery {
    pub low_stock_only: Option<bool>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryBatchOut {
    pub id: i64,
    pub batch_no: String,
    pub medicine_id: i64,
    pub medicine: Option<String>,
    pub specification: Option<String>,
    pub quantity: i32,
    pub received_at: Option<String>,
    pub expiry_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchListQuery {
    pub expiring_in_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLogOut {
    pub id: i64,
    #[serde(rename = "type")]
    pub log_type: String,
    pub medicine_id: i64,
    pub medicine: Option<String>,
    pub specification: Option<String>,
    pub quantity: i32,
    pub time: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogListQuery {
    #[serde(rename = "type")]
    pub log_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryInPayload {
    pub medicine_id: i64,
    pub batch_no: String,
    pub quantity: i32,
    pub received_at: String,
    pub expiry_date: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryOutPayload {
    pub medicine_id: i64,
    pub quantity: i32,
    pub time: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryInOut {
    pub batch: i64,
    pub log: i64,
    pub medicine: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryOutOut {
    pub log: i64,
    pub medicine: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionItemOut {
    pub medicine_id: i64,
    pub name: Option<String>,
    pub qty: i32,
    pub unit: Option<String>,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionOut {
    pub id: String,
    pub patient: String,
    pub department: String,
    pub doctor: String,
    pub created_at: Option<String>,
    pub status: String,
    pub items: Vec<PrescriptionItemOut>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrescriptionStatusPayload {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionStatusOut {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierOut {
    pub id: i64,
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierPayload {
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierOrderItemOut {
    pub medicine_id: i64,
    pub name: Option<String>,
    pub qty: i32,
    pub unit: Option<String>,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierOrderOut {
    pub id: String,
    pub supplier_id: i64,
    pub created_at: String,
    pub status: String,
    pub amount: f64,
    pub items: Vec<SupplierOrderItemOut>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem {
    pub medicine_id: i64,
    pub qty: i32,
    pub unit: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub supplier_id: i64,
    pub items: Vec<CreateOrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderOut {
    pub id: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusPayload {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusOut {
    pub id: String,
    pub status: String,
}

/// Prescriptions advance monotonically: pending → approved → dispensed.
pub fn prescription_transition_allowed(current: &str, target: &str) -> bool {
    matches!(
        (current, target),
        (PRESCRIPTION_PENDING, PRESCRIPTION_APPROVED)
            | (PRESCRIPTION_APPROVED, PRESCRIPTION_DISPENSED)
    )
}

/// Validates a prescription status change.
pub fn validate_prescription_transition(current: &str, target: &str) -> OmmsResult<()> {
    if !prescription_transition_allowed(current, target) {
        return Err(OmmsError::Validation("非法状态流转".to_string()));
    }
    Ok(())
}

/// Subtracts a debit from the running stock total; an insufficient
/// balance leaves the total untouched and reports the shortfall.
pub fn debit_stock(current: i32, quantity: i32) -> Option<i32> {
    if current < quantity {
        return None;
    }
    Some(current - quantity)
}
