//! Appointment handlers, including the booking validator.
//!
//! Booking runs as a chain of hard preconditions inside a single
//! transaction. The schedule row is locked `FOR UPDATE` before the quota
//! and double-booking counts, so two concurrent requests for the same
//! slot serialize: the second sees the first one's insert and fails the
//! quota check instead of racing past it. Capacity is always derived by
//! counting non-cancelled rows; there is no persisted booked counter.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Local;
use std::sync::Arc;

use omms_core::{
    errors::OmmsError,
    models::appointment::{
        transition_allowed, validate_booking, AppointmentCreate, AppointmentListQuery,
        AppointmentOut, AppointmentUpdate, CancelOut, STATUS_CANCELLED,
    },
    models::page::{Page, PageQuery},
    response::Envelope,
    time_fmt,
};
use omms_db::models::{DbAppointment, DbAppointmentDetail, DbPatient};
use omms_db::repositories::{appointment, department, doctor, patient, schedule};

use crate::{
    middleware::{auth::AuthUser, error_handling::AppError},
    ApiState,
};

fn detail_out(row: DbAppointmentDetail) -> AppointmentOut {
    AppointmentOut {
        appt_id: row.appt_id,
        patient_id: row.patient_id,
        patient_name: row.patient_name,
        doctor_id: row.doctor_id,
        doctor_name: row.doctor_name,
        dept_id: row.dept_id,
        dept_name: row.dept_name,
        schedule_id: row.schedule_id,
        appt_time: Some(time_fmt::fmt_datetime(row.appt_time)),
        status: row.status,
        symptom_desc: row.symptom_desc,
        created_at: row.created_at.map(time_fmt::fmt_datetime),
        updated_at: row.updated_at.map(time_fmt::fmt_datetime),
    }
}

/// Resolves the booking's patient: the payload id as a patient key,
/// then as a user reference, then the caller's own patient profile.
async fn resolve_patient(
    state: &ApiState,
    payload_patient_id: i64,
    current_user_id: i64,
) -> Result<DbPatient, AppError> {
    if let Some(p) = patient::get_patient_by_id(&state.db_pool, payload_patient_id)
        .await
        .map_err(OmmsError::Database)?
    {
        return Ok(p);
    }
    if let Some(p) = patient::get_patient_by_user_id(&state.db_pool, payload_patient_id)
        .await
        .map_err(OmmsError::Database)?
    {
        return Ok(p);
    }
    patient::get_patient_by_user_id(&state.db_pool, current_user_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| AppError(OmmsError::Validation("患者不存在".to_string())))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Envelope<Page<AppointmentOut>>>, AppError> {
    let (page, page_size, offset) = PageQuery {
        page: query.page,
        page_size: query.page_size,
    }
    .normalize(20, 100);

    let total = appointment::count_appointments(
        &state.db_pool,
        query.patient_id,
        query.doctor_id,
        query.status,
    )
    .await
    .map_err(OmmsError::Database)?;

    let rows = appointment::list_appointments(
        &state.db_pool,
        query.patient_id,
        query.doctor_id,
        query.status,
        offset,
        page_size,
    )
    .await
    .map_err(OmmsError::Database)?;

    let response = Page {
        list: rows.into_iter().map(detail_out).collect(),
        total,
        page,
        page_size,
    };

    Ok(Json(Envelope::ok(response)))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    current: AuthUser,
    Json(payload): Json<AppointmentCreate>,
) -> Result<Json<Envelope<AppointmentOut>>, AppError> {
    // Step 1: resolve the patient
    let patient = resolve_patient(&state, payload.patient_id, current.user.user_id).await?;

    // Step 2: the doctor must exist
    let doctor = doctor::get_doctor_by_id(&state.db_pool, payload.doctor_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::Validation("医生不存在".to_string()))?;

    let appt_time = time_fmt::parse_datetime(&payload.appt_time)?;

    // Steps 3-7 share one transaction; the schedule row lock serializes
    // concurrent bookings against the same slot.
    let mut tx = state
        .db_pool
        .begin()
        .await
        .map_err(|e| OmmsError::Database(e.into()))?;

    let db_schedule = schedule::lock_schedule(&mut tx, payload.schedule_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::Validation("排班不存在".to_string()))?;

    let booked_count = appointment::count_active_for_schedule(&mut *tx, payload.schedule_id)
        .await
        .map_err(OmmsError::Database)?;

    let duplicate = appointment::exists_active_at(&mut *tx, patient.patient_id, appt_time)
        .await
        .map_err(OmmsError::Database)?;

    validate_booking(
        db_schedule.doctor_id,
        payload.doctor_id,
        appt_time,
        db_schedule.work_date,
        db_schedule.start_time,
        db_schedule.end_time,
        booked_count,
        db_schedule.max_appointments,
        duplicate,
    )?;

    let now = Local::now().naive_local();
    let created = appointment::insert_appointment(
        &mut tx,
        patient.patient_id,
        payload.doctor_id,
        payload.schedule_id,
        appt_time,
        payload.symptom_desc.as_deref(),
        now,
    )
    .await
    .map_err(OmmsError::Database)?;

    tx.commit()
        .await
        .map_err(|e| OmmsError::Database(e.into()))?;

    let dept_name = department::get_department_by_id(&state.db_pool, doctor.dept_id)
        .await
        .map_err(OmmsError::Database)?
        .map(|d| d.dept_name)
        .unwrap_or_default();

    let response = AppointmentOut {
        appt_id: created.appt_id,
        patient_id: created.patient_id,
        patient_name: patient.name,
        doctor_id: created.doctor_id,
        doctor_name: doctor.doctor_name,
        dept_id: doctor.dept_id,
        dept_name,
        schedule_id: created.schedule_id,
        appt_time: Some(time_fmt::fmt_datetime(created.appt_time)),
        status: created.status,
        symptom_desc: created.symptom_desc,
        created_at: created.created_at.map(time_fmt::fmt_datetime),
        updated_at: created.updated_at.map(time_fmt::fmt_datetime),
    };

    Ok(Json(Envelope::ok_with(response, "预约创建成功")))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<ApiState>>,
    Path(appt_id): Path<i64>,
) -> Result<Json<Envelope<AppointmentOut>>, AppError> {
    let row = appointment::get_appointment_detail_by_id(&state.db_pool, appt_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("预约不存在".to_string()))?;

    Ok(Json(Envelope::ok(detail_out(row))))
}

/// Checks a requested status change against the forward-only machine.
fn check_transition(current: &DbAppointment, target: i16) -> Result<(), AppError> {
    if !transition_allowed(current.status, target) {
        return Err(AppError(OmmsError::Validation("非法状态流转".to_string())));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<ApiState>>,
    Path(appt_id): Path<i64>,
    Json(payload): Json<AppointmentUpdate>,
) -> Result<Json<Envelope<AppointmentOut>>, AppError> {
    let existing = appointment::get_appointment_by_id(&state.db_pool, appt_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("预约不存在".to_string()))?;

    if let Some(status) = payload.status {
        check_transition(&existing, status)?;
    }

    let now = Local::now().naive_local();
    appointment::update_appointment(
        &state.db_pool,
        appt_id,
        payload.status,
        payload.symptom_desc.as_deref(),
        now,
    )
    .await
    .map_err(OmmsError::Database)?;

    let row = appointment::get_appointment_detail_by_id(&state.db_pool, appt_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("预约详情获取失败".to_string()))?;

    Ok(Json(Envelope::ok_with(detail_out(row), "预约更新成功")))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<ApiState>>,
    Path(appt_id): Path<i64>,
    Json(payload): Json<AppointmentUpdate>,
) -> Result<Json<Envelope<AppointmentOut>>, AppError> {
    let existing = appointment::get_appointment_by_id(&state.db_pool, appt_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("预约不存在".to_string()))?;

    let Some(status) = payload.status else {
        return Err(AppError(OmmsError::Validation(
            "必须提供状态字段".to_string(),
        )));
    };

    check_transition(&existing, status)?;

    let now = Local::now().naive_local();
    appointment::set_status(&state.db_pool, appt_id, status, now)
        .await
        .map_err(OmmsError::Database)?;

    let row = appointment::get_appointment_detail_by_id(&state.db_pool, appt_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("预约详情获取失败".to_string()))?;

    Ok(Json(Envelope::ok_with(detail_out(row), "预约状态更新成功")))
}

/// Cancelling never deletes the row; the slot frees itself by the
/// cancelled row dropping out of the capacity count.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<ApiState>>,
    Path(appt_id): Path<i64>,
) -> Result<Json<Envelope<CancelOut>>, AppError> {
    let existing = appointment::get_appointment_by_id(&state.db_pool, appt_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("预约不存在".to_string()))?;

    check_transition(&existing, STATUS_CANCELLED)?;

    let now = Local::now().naive_local();
    appointment::set_status(&state.db_pool, appt_id, STATUS_CANCELLED, now)
        .await
        .map_err(OmmsError::Database)?;

    Ok(Json(Envelope::ok_with(CancelOut { appt_id }, "预约已取消")))
}
