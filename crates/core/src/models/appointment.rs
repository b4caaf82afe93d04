//! Appointment DTOs and the booking rule set.
//!
//! Booking is a chain of hard preconditions: the first failure
//! short-circuits and the caller maps it straight into the response
//! envelope. The quota and double-booking checks run against counts the
//! caller gathered inside the booking transaction, so the decision here
//! is pure and the race handling lives entirely at the locking layer.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::{OmmsError, OmmsResult};
use crate::time_fmt;

pub const STATUS_PENDING: i16 = 0;
pub const STATUS_COMPLETED: i16 = 1;
pub const STATUS_CANCELLED: i16 = 2;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentCreate {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub schedule_id: i64,
    pub appt_time: String,
    pub symptom_desc: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentUpdate {
    pub status: Option<i16>,
    pub symptom_desc: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentOut {
    pub appt_id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub dept_id: i64,
    pub dept_name: String,
    pub schedule_id: i64,
    pub appt_time: Option<String>,
    pub status: i16,
    pub symptom_desc: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentListQuery {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub status: Option<i16>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOut {
    pub appt_id: i64,
}

/// True if `appt_time` lies within `[work_date+start, work_date+end]`,
/// boundaries included.
pub fn within_schedule_window(
    appt_time: NaiveDateTime,
    work_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> bool {
    let window_start = time_fmt::compose(work_date, start_time);
    let window_end = time_fmt::compose(work_date, end_time);
    window_start <= appt_time && appt_time <= window_end
}

/// Forward-only status machine: pending may complete or cancel;
/// completed and cancelled are terminal.
pub fn transition_allowed(from: i16, to: i16) -> bool {
    matches!(
        (from, to),
        (STATUS_PENDING, STATUS_COMPLETED) | (STATUS_PENDING, STATUS_CANCELLED)
    )
}

/// The booking precondition chain, steps 3-6 of the validator. The
/// caller resolves patient and doctor first and collects the two counts
/// under the schedule row lock.
#[allow(clippy::too_many_arguments)]
pub fn validate_booking(
    schedule_doctor_id: i64,
    requested_doctor_id: i64,
    appt_time: NaiveDateTime,
    work_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    booked_count: i64,
    max_appointments: i32,
    patient_booked_same_time: bool,
) -> OmmsResult<()> {
    if schedule_doctor_id != requested_doctor_id {
        return Err(OmmsError::Validation("排班不属于该医生".to_string()));
    }
    if !within_schedule_window(appt_time, work_date, start_time, end_time) {
        return Err(OmmsError::Validation("预约时间不在排班时间内".to_string()));
    }
    if booked_count >= i64::from(max_appointments) {
        return Err(OmmsError::Validation("该时段预约已满".to_string()));
    }
    if patient_booked_same_time {
        return Err(OmmsError::Validation("该时间段已有预约".to_string()));
    }
    Ok(())
}
