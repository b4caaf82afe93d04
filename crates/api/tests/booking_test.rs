//! Booking validator tests driven through mock repositories, mirroring
//! the handler's decision sequence: lock the schedule, gather the two
//! counts, run the precondition chain, insert.

use chrono::{NaiveDate, NaiveDateTime};
use mockall::predicate;

use omms_api::middleware::error_handling::AppError;
use omms_core::errors::OmmsError;
use omms_core::models::appointment::validate_booking;
use omms_db::mock::repositories::{MockAppointmentRepo, MockScheduleRepo};
use omms_db::models::{DbAppointment, DbSchedule};

fn schedule(schedule_id: i64, doctor_id: i64, max_appointments: i32) -> DbSchedule {
    DbSchedule {
        schedule_id,
        doctor_id,
        work_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        start_time: chrono::NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        end_time: chrono::NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        max_appointments,
        status: 1,
        created_at: None,
        updated_at: None,
    }
}

fn slot_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

/// The handler's booking sequence against mock repositories.
async fn validate_and_book(
    schedule_repo: &MockScheduleRepo,
    appointment_repo: &MockAppointmentRepo,
    patient_id: i64,
    doctor_id: i64,
    schedule_id: i64,
    appt_time: NaiveDateTime,
) -> Result<DbAppointment, AppError> {
    let db_schedule = schedule_repo
        .lock_schedule(schedule_id)
        .await?
        .ok_or_else(|| AppError(OmmsError::Validation("排班不存在".to_string())))?;

    let booked_count = appointment_repo
        .count_active_for_schedule(schedule_id)
        .await?;
    let duplicate = appointment_repo
        .exists_active_at(patient_id, appt_time)
        .await?;

    validate_booking(
        db_schedule.doctor_id,
        doctor_id,
        appt_time,
        db_schedule.work_date,
        db_schedule.start_time,
        db_schedule.end_time,
        booked_count,
        db_schedule.max_appointments,
        duplicate,
    )?;

    let created = appointment_repo
        .insert_appointment(patient_id, doctor_id, schedule_id, appt_time, None)
        .await?;

    Ok(created)
}

#[tokio::test]
async fn test_booking_success_creates_pending_appointment() {
    let mut schedule_repo = MockScheduleRepo::new();
    let mut appointment_repo = MockAppointmentRepo::new();
    let appt_time = slot_time();

    schedule_repo
        .expect_lock_schedule()
        .with(predicate::eq(10))
        .returning(|id| Ok(Some(schedule(id, 2, 20))));

    appointment_repo
        .expect_count_active_for_schedule()
        .with(predicate::eq(10))
        .returning(|_| Ok(0));

    appointment_repo
        .expect_exists_active_at()
        .with(predicate::eq(1), predicate::eq(appt_time))
        .returning(|_, _| Ok(false));

    appointment_repo
        .expect_insert_appointment()
        .times(1)
        .returning(|patient_id, doctor_id, schedule_id, appt_time, _| {
            Ok(DbAppointment {
                appt_id: 99,
                patient_id,
                doctor_id,
                schedule_id,
                appt_time,
                status: 0,
                symptom_desc: None,
                created_at: None,
                updated_at: None,
            })
        });

    let result =
        validate_and_book(&schedule_repo, &appointment_repo, 1, 2, 10, appt_time).await;

    let created = result.expect("booking should succeed");
    assert_eq!(created.appt_id, 99);
    assert_eq!(created.status, 0);
}

#[tokio::test]
async fn test_booking_rejects_missing_schedule() {
    let mut schedule_repo = MockScheduleRepo::new();
    let mut appointment_repo = MockAppointmentRepo::new();

    schedule_repo
        .expect_lock_schedule()
        .returning(|_| Ok(None));
    appointment_repo.expect_insert_appointment().times(0);

    let result =
        validate_and_book(&schedule_repo, &appointment_repo, 1, 2, 10, slot_time()).await;

    match result.unwrap_err().0 {
        OmmsError::Validation(m) => assert_eq!(m, "排班不存在"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_booking_rejects_full_slot_without_insert() {
    let mut schedule_repo = MockScheduleRepo::new();
    let mut appointment_repo = MockAppointmentRepo::new();

    // max_appointments = 1 with one active booking already held
    schedule_repo
        .expect_lock_schedule()
        .returning(|id| Ok(Some(schedule(id, 2, 1))));
    appointment_repo
        .expect_count_active_for_schedule()
        .returning(|_| Ok(1));
    appointment_repo
        .expect_exists_active_at()
        .returning(|_, _| Ok(false));
    appointment_repo.expect_insert_appointment().times(0);

    let result =
        validate_and_book(&schedule_repo, &appointment_repo, 1, 2, 10, slot_time()).await;

    match result.unwrap_err().0 {
        OmmsError::Validation(m) => assert_eq!(m, "该时段预约已满"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_booking_rejects_time_outside_window() {
    let mut schedule_repo = MockScheduleRepo::new();
    let mut appointment_repo = MockAppointmentRepo::new();

    schedule_repo
        .expect_lock_schedule()
        .returning(|id| Ok(Some(schedule(id, 2, 20))));
    appointment_repo
        .expect_count_active_for_schedule()
        .returning(|_| Ok(0));
    appointment_repo
        .expect_exists_active_at()
        .returning(|_, _| Ok(false));
    appointment_repo.expect_insert_appointment().times(0);

    let outside = NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(14, 0, 0)
        .unwrap();

    let result = validate_and_book(&schedule_repo, &appointment_repo, 1, 2, 10, outside).await;

    match result.unwrap_err().0 {
        OmmsError::Validation(m) => assert_eq!(m, "预约时间不在排班时间内"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_booking_rejects_double_booked_patient() {
    let mut schedule_repo = MockScheduleRepo::new();
    let mut appointment_repo = MockAppointmentRepo::new();
    let appt_time = slot_time();

    schedule_repo
        .expect_lock_schedule()
        .returning(|id| Ok(Some(schedule(id, 2, 20))));
    appointment_repo
        .expect_count_active_for_schedule()
        .returning(|_| Ok(0));
    appointment_repo
        .expect_exists_active_at()
        .with(predicate::eq(1), predicate::eq(appt_time))
        .returning(|_, _| Ok(true));
    appointment_repo.expect_insert_appointment().times(0);

    let result =
        validate_and_book(&schedule_repo, &appointment_repo, 1, 2, 10, appt_time).await;

    match result.unwrap_err().0 {
        OmmsError::Validation(m) => assert_eq!(m, "该时间段已有预约"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_booking_rejects_schedule_doctor_mismatch() {
    let mut schedule_repo = MockScheduleRepo::new();
    let mut appointment_repo = MockAppointmentRepo::new();

    // Schedule belongs to doctor 7, request names doctor 2
    schedule_repo
        .expect_lock_schedule()
        .returning(|id| Ok(Some(schedule(id, 7, 20))));
    appointment_repo
        .expect_count_active_for_schedule()
        .returning(|_| Ok(0));
    appointment_repo
        .expect_exists_active_at()
        .returning(|_, _| Ok(false));
    appointment_repo.expect_insert_appointment().times(0);

    let result =
        validate_and_book(&schedule_repo, &appointment_repo, 1, 2, 10, slot_time()).await;

    match result.unwrap_err().0 {
        OmmsError::Validation(m) => assert_eq!(m, "排班不属于该医生"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}
