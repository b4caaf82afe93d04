use chrono::{NaiveDate, NaiveTime};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{from_str, to_string};

use omms_core::errors::OmmsError;
use omms_core::models::appointment::{
    transition_allowed, validate_booking, within_schedule_window, AppointmentOut, STATUS_CANCELLED,
    STATUS_COMPLETED, STATUS_PENDING,
};
use omms_core::models::pharmacy::{
    debit_stock, prescription_transition_allowed, validate_prescription_transition, MedicineOut,
};
use omms_core::models::record::{
    gen_record_id, parse_string_list, to_json_string, validate_transition, STATUS_CANCELLED as REC_CANCELLED,
    STATUS_DRAFT, STATUS_FINALIZED,
};
use omms_core::models::report::{report_row_id, status_str};

fn schedule_window() -> (NaiveDate, NaiveTime, NaiveTime) {
    (
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
    )
}

fn at(h: u32, m: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

#[test]
fn test_appointment_out_serialization_is_camel_case() {
    let out = AppointmentOut {
        appt_id: 7,
        patient_id: 1,
        patient_name: "张三".to_string(),
        doctor_id: 2,
        doctor_name: "李四".to_string(),
        dept_id: 3,
        dept_name: "内科".to_string(),
        schedule_id: 4,
        appt_time: Some("2024-01-15 09:00:00".to_string()),
        status: STATUS_PENDING,
        symptom_desc: None,
        created_at: None,
        updated_at: None,
    };

    let json = to_string(&out).expect("Failed to serialize appointment");
    assert!(json.contains("\"apptId\":7"));
    assert!(json.contains("\"apptTime\":\"2024-01-15 09:00:00\""));
    assert!(json.contains("\"symptomDesc\":null"));

    let deserialized: AppointmentOut = from_str(&json).expect("Failed to deserialize appointment");
    assert_eq!(deserialized.appt_id, out.appt_id);
    assert_eq!(deserialized.patient_name, out.patient_name);
}

#[test]
fn test_medicine_out_serialization() {
    let out = MedicineOut {
        id: 1,
        name: "对乙酰氨基酚".to_string(),
        specification: "0.5g*20片".to_string(),
        unit: "盒".to_string(),
        price: 12.5,
        warning_stock: 50,
        current_stock: 10,
    };

    let json = to_string(&out).expect("Failed to serialize medicine");
    assert!(json.contains("\"warningStock\":50"));
    assert!(json.contains("\"currentStock\":10"));
}

#[test]
fn test_within_schedule_window_boundaries_inclusive() {
    let (work_date, start, end) = schedule_window();

    assert!(within_schedule_window(at(8, 30), work_date, start, end));
    assert!(within_schedule_window(at(12, 0), work_date, start, end));
    assert!(within_schedule_window(at(9, 0), work_date, start, end));
    assert!(!within_schedule_window(at(8, 29), work_date, start, end));
    assert!(!within_schedule_window(at(12, 1), work_date, start, end));
}

#[test]
fn test_booking_rejects_schedule_of_another_doctor() {
    let (work_date, start, end) = schedule_window();

    let err = validate_booking(2, 9, at(9, 0), work_date, start, end, 0, 20, false).unwrap_err();
    match err {
        OmmsError::Validation(m) => assert_eq!(m, "排班不属于该医生"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[test]
fn test_booking_rejects_time_outside_window() {
    let (work_date, start, end) = schedule_window();

    let err = validate_booking(2, 2, at(13, 0), work_date, start, end, 0, 20, false).unwrap_err();
    match err {
        OmmsError::Validation(m) => assert_eq!(m, "预约时间不在排班时间内"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[test]
fn test_booking_rejects_full_slot() {
    let (work_date, start, end) = schedule_window();

    // max_appointments = 1 and one active booking already held
    let err = validate_booking(2, 2, at(9, 0), work_date, start, end, 1, 1, false).unwrap_err();
    match err {
        OmmsError::Validation(m) => assert_eq!(m, "该时段预约已满"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[test]
fn test_booking_rejects_double_booked_patient() {
    let (work_date, start, end) = schedule_window();

    let err = validate_booking(2, 2, at(9, 0), work_date, start, end, 0, 20, true).unwrap_err();
    match err {
        OmmsError::Validation(m) => assert_eq!(m, "该时间段已有预约"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[test]
fn test_booking_accepts_valid_request() {
    let (work_date, start, end) = schedule_window();

    assert!(validate_booking(2, 2, at(9, 0), work_date, start, end, 0, 1, false).is_ok());
}

#[rstest]
#[case(STATUS_PENDING, STATUS_COMPLETED, true)]
#[case(STATUS_PENDING, STATUS_CANCELLED, true)]
#[case(STATUS_COMPLETED, STATUS_CANCELLED, false)]
#[case(STATUS_CANCELLED, STATUS_PENDING, false)]
#[case(STATUS_COMPLETED, STATUS_PENDING, false)]
#[case(STATUS_CANCELLED, STATUS_CANCELLED, false)]
fn test_appointment_transitions(#[case] from: i16, #[case] to: i16, #[case] allowed: bool) {
    assert_eq!(transition_allowed(from, to), allowed);
}

#[test]
fn test_record_finalize_requires_content() {
    let err = validate_transition(STATUS_DRAFT, STATUS_FINALIZED, false).unwrap_err();
    match err {
        OmmsError::Validation(m) => assert_eq!(m, "最终签署前至少填写主诉或诊断"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }

    assert!(validate_transition(STATUS_DRAFT, STATUS_FINALIZED, true).is_ok());
}

#[rstest]
#[case(STATUS_FINALIZED)]
#[case(REC_CANCELLED)]
fn test_record_never_regresses_to_draft(#[case] current: &str) {
    let err = validate_transition(current, STATUS_DRAFT, true).unwrap_err();
    match err {
        OmmsError::Validation(m) => assert_eq!(m, "状态不可回退"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[test]
fn test_record_rejects_unknown_status() {
    let err = validate_transition(STATUS_DRAFT, "archived", true).unwrap_err();
    match err {
        OmmsError::Validation(m) => assert_eq!(m, "非法状态值"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[test]
fn test_record_void_allowed_from_draft_and_finalized() {
    assert!(validate_transition(STATUS_DRAFT, REC_CANCELLED, false).is_ok());
    assert!(validate_transition(STATUS_FINALIZED, REC_CANCELLED, true).is_ok());
}

#[test]
fn test_refinalizing_a_finalized_record_is_accepted() {
    // Not a regression; the record necessarily carries content already.
    assert!(validate_transition(STATUS_FINALIZED, STATUS_FINALIZED, true).is_ok());
}

#[test]
fn test_record_id_format() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    assert_eq!(gen_record_id(date, 42), "MR-20240115-0042");
    assert_eq!(gen_record_id(date, 12345), "MR-20240115-2345");
}

#[test]
fn test_string_list_round_trip() {
    let values = vec!["血常规".to_string(), "尿常规".to_string()];
    let encoded = to_json_string(Some(&values)).expect("Should encode non-empty list");
    assert_eq!(parse_string_list(Some(&encoded)), values);

    assert_eq!(to_json_string(Some(&[])), None);
    assert_eq!(parse_string_list(None), Vec::<String>::new());
    assert_eq!(parse_string_list(Some("not json")), Vec::<String>::new());
    assert_eq!(parse_string_list(Some("{\"a\":1}")), Vec::<String>::new());
}

#[test]
fn test_json_string_drops_blank_entries() {
    let values = vec!["血常规".to_string(), "  ".to_string()];
    let encoded = to_json_string(Some(&values)).unwrap();
    assert_eq!(parse_string_list(Some(&encoded)), vec!["血常规".to_string()]);
}

#[rstest]
#[case("pending", "approved", true)]
#[case("approved", "dispensed", true)]
#[case("pending", "dispensed", false)]
#[case("dispensed", "approved", false)]
#[case("dispensed", "pending", false)]
#[case("approved", "pending", false)]
fn test_prescription_transitions(#[case] from: &str, #[case] to: &str, #[case] allowed: bool) {
    assert_eq!(prescription_transition_allowed(from, to), allowed);
}

#[test]
fn test_prescription_transition_error_message() {
    let err = validate_prescription_transition("pending", "dispensed").unwrap_err();
    match err {
        OmmsError::Validation(m) => assert_eq!(m, "非法状态流转"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[test]
fn test_debit_stock() {
    assert_eq!(debit_stock(10, 5), Some(5));
    assert_eq!(debit_stock(10, 10), Some(0));
    assert_eq!(debit_stock(10, 15), None);
}

#[test]
fn test_report_status_and_row_id() {
    assert_eq!(status_str(0), "pending");
    assert_eq!(status_str(1), "completed");
    assert_eq!(status_str(2), "cancelled");

    let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    assert_eq!(report_row_id(7, date), "R-20240115-0007");
    assert_eq!(report_row_id(123456, date), "R-20240115-3456");
}
