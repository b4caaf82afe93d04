use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOut {
    pub schedule_id: i64,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub dept_id: i64,
    pub dept_name: String,
    pub work_date: String,
    /// "HH:MM - HH:MM", derived from the start/end boundaries.
    pub work_period: String,
    pub start_time: String,
    pub end_time: String,
    pub total_quota: i32,
    pub booked_count: i64,
    pub available_quota: i64,
    pub status: i16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleListQuery {
    pub dept_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub work_date: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}
