//! Medical record DTOs and the record status machine.
//!
//! States are `draft`, `finalized`, `cancelled`. Finalizing requires at
//! least one of chief complaint or diagnosis; once a record leaves
//! `draft` it can never return. Every path that changes a record's
//! status, the PATCH endpoint and the DELETE (void) endpoint alike,
//! goes through [`validate_transition`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::{OmmsError, OmmsResult};

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_FINALIZED: &str = "finalized";
pub const STATUS_CANCELLED: &str = "cancelled";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCreate {
    pub dept_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub patient_id: Option<i64>,
    pub patient_name: Option<String>,
    /// "HH:MM" within today; defaults to 10:00.
    pub time: Option<String>,
    pub template_id: Option<i64>,
    pub chief_complaint: Option<String>,
    pub diagnosis: Option<String>,
    pub prescriptions: Option<Vec<String>>,
    pub labs: Option<Vec<String>>,
    pub imaging: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordUpdate {
    pub patient_id: Option<i64>,
    pub patient_name: Option<String>,
    pub chief_complaint: Option<String>,
    pub diagnosis: Option<String>,
    pub prescriptions: Option<Vec<String>>,
    pub labs: Option<Vec<String>>,
    pub imaging: Option<Vec<String>>,
    pub created_at: Option<String>,
    pub dept_id: Option<i64>,
    pub doctor_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOut {
    pub id: String,
    pub patient: String,
    pub department: String,
    pub doctor: String,
    pub created_at: String,
    pub status: String,
    pub has_lab: bool,
    pub has_imaging: bool,
    pub chief_complaint: String,
    pub diagnosis: String,
    pub prescriptions: Vec<String>,
    pub labs: Vec<String>,
    pub imaging: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordStatusPayload {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordStatusOut {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordListQuery {
    pub status: Option<String>,
    pub date: Option<String>,
    pub dept_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub has_lab: Option<bool>,
    pub has_imaging: Option<bool>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCreate {
    pub name: Option<String>,
    pub scope: Option<String>,
    pub fields: Option<Vec<String>>,
    pub defaults: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub scope: Option<String>,
    pub fields: Option<Vec<String>>,
    pub defaults: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOut {
    pub id: i64,
    pub name: String,
    pub scope: String,
    pub fields: Vec<String>,
    pub defaults: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDeleteOut {
    pub id: i64,
}

/// Checks one status change. `has_content` is whether the record carries
/// a non-empty chief complaint or diagnosis at decision time.
pub fn validate_transition(current: &str, target: &str, has_content: bool) -> OmmsResult<()> {
    if !matches!(target, STATUS_DRAFT | STATUS_FINALIZED | STATUS_CANCELLED) {
        return Err(OmmsError::Validation("非法状态值".to_string()));
    }
    if matches!(current, STATUS_FINALIZED | STATUS_CANCELLED) && target == STATUS_DRAFT {
        return Err(OmmsError::Validation("状态不可回退".to_string()));
    }
    if target == STATUS_FINALIZED && !has_content {
        return Err(OmmsError::Validation(
            "最终签署前至少填写主诉或诊断".to_string(),
        ));
    }
    Ok(())
}

/// Record ids look like `MR-20240115-0042`.
pub fn gen_record_id(date: NaiveDate, n: u32) -> String {
    format!("MR-{}-{:04}", date.format("%Y%m%d"), n % 10000)
}

/// Decodes a JSON text column into a list of strings; anything that is
/// not a JSON array yields an empty list.
pub fn parse_string_list(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Encodes a list for a JSON text column, dropping blank entries.
/// Empty input stores NULL.
pub fn to_json_string(values: Option<&[String]>) -> Option<String> {
    let values = values?;
    if values.is_empty() {
        return None;
    }
    let cleaned: Vec<&String> = values.iter().filter(|v| !v.trim().is_empty()).collect();
    serde_json::to_string(&cleaned).ok()
}

/// Default template field values for newly created templates.
pub fn default_template_defaults() -> Value {
    json!({
        "chiefComplaint": "",
        "diagnosis": "",
        "prescriptions": [],
        "labs": [],
        "imaging": [],
    })
}
