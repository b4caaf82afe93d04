use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::appointment::{STATUS_CANCELLED, STATUS_COMPLETED};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowsOut<T> {
    pub list: Vec<T>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaysOut<T> {
    pub list: Vec<T>,
    pub total_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyVisitRow {
    pub id: String,
    pub patient: String,
    pub department: String,
    pub doctor: String,
    pub time: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyDrugRow {
    pub id: String,
    pub medicine: String,
    pub specification: Option<String>,
    pub quantity: i32,
    pub unit: Option<String>,
    pub patient: String,
    pub department: String,
    pub doctor: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyVisitRow {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyDrugRow {
    pub date: String,
    pub items: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomReportRow {
    pub id: String,
    pub patient: String,
    pub department: String,
    pub doctor: String,
    pub time: Option<String>,
    pub status: String,
    pub drug_items: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomReportQuery {
    pub dept_name: Option<String>,
    pub doctor_name: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
}

pub fn status_str(status: i16) -> &'static str {
    match status {
        s if s == STATUS_COMPLETED => "completed",
        s if s == STATUS_CANCELLED => "cancelled",
        _ => "pending",
    }
}

/// Synthetic report row ids look like `R-20240115-0042`: the last four
/// digits of the appointment id, zero-padded.
pub fn report_row_id(appt_id: i64, date: NaiveDate) -> String {
    let num = appt_id.to_string();
    let padded = if num.len() >= 4 {
        num[num.len() - 4..].to_string()
    } else {
        format!("{:0>4}", num)
    };
    format!("R-{}-{}", date.format("%Y%m%d"), padded)
}
