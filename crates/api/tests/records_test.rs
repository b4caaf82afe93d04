//! Record status machine tests driven through a mock repository: every
//! status path, PATCH and DELETE alike, runs the same guarded
//! transition before touching the row.

use chrono::NaiveDate;
use mockall::predicate;

use omms_api::middleware::error_handling::AppError;
use omms_core::errors::OmmsError;
use omms_core::models::record::{validate_transition, STATUS_CANCELLED, STATUS_FINALIZED};
use omms_db::mock::repositories::MockRecordRepo;
use omms_db::models::DbRecord;

fn record(id: &str, status: &str, chief_complaint: &str, diagnosis: &str) -> DbRecord {
    DbRecord {
        id: id.to_string(),
        dept_id: 1,
        doctor_id: 2,
        patient_id: Some(3),
        patient_name: Some("张三".to_string()),
        created_at: NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap(),
        status: status.to_string(),
        template_id: None,
        chief_complaint: Some(chief_complaint.to_string()),
        diagnosis: Some(diagnosis.to_string()),
        prescriptions_json: None,
        labs_json: None,
        imaging_json: None,
    }
}

/// The handler's status-change sequence against the mock repository.
async fn change_status(
    repo: &MockRecordRepo,
    id: &str,
    target: &str,
) -> Result<DbRecord, AppError> {
    let rec = repo
        .get_record_by_id(id.to_string())
        .await?
        .ok_or_else(|| AppError(OmmsError::NotFound("Record not found".to_string())))?;

    let has_content = rec.chief_complaint.as_deref().is_some_and(|s| !s.is_empty())
        || rec.diagnosis.as_deref().is_some_and(|s| !s.is_empty());
    validate_transition(&rec.status, target, has_content)?;

    Ok(repo.set_status(id.to_string(), target.to_string()).await?)
}

#[tokio::test]
async fn test_finalize_draft_with_content() {
    let mut repo = MockRecordRepo::new();

    repo.expect_get_record_by_id()
        .with(predicate::eq("MR-20240115-0001".to_string()))
        .returning(|id| Ok(Some(record(&id, "draft", "头痛三天", ""))));
    repo.expect_set_status()
        .with(
            predicate::eq("MR-20240115-0001".to_string()),
            predicate::eq("finalized".to_string()),
        )
        .times(1)
        .returning(|id, status| {
            let mut rec = record(&id, "draft", "头痛三天", "");
            rec.status = status;
            Ok(rec)
        });

    let updated = change_status(&repo, "MR-20240115-0001", STATUS_FINALIZED)
        .await
        .expect("finalize should succeed");
    assert_eq!(updated.status, "finalized");
}

#[tokio::test]
async fn test_finalize_empty_draft_rejected() {
    let mut repo = MockRecordRepo::new();

    repo.expect_get_record_by_id()
        .returning(|id| Ok(Some(record(&id, "draft", "", ""))));
    repo.expect_set_status().times(0);

    let result = change_status(&repo, "MR-20240115-0002", STATUS_FINALIZED).await;

    match result.unwrap_err().0 {
        OmmsError::Validation(m) => assert_eq!(m, "最终签署前至少填写主诉或诊断"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_finalized_record_cannot_return_to_draft() {
    let mut repo = MockRecordRepo::new();

    repo.expect_get_record_by_id()
        .returning(|id| Ok(Some(record(&id, "finalized", "头痛三天", "偏头痛"))));
    repo.expect_set_status().times(0);

    let result = change_status(&repo, "MR-20240115-0003", "draft").await;

    match result.unwrap_err().0 {
        OmmsError::Validation(m) => assert_eq!(m, "状态不可回退"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_cancelled_record_cannot_return_to_draft() {
    let mut repo = MockRecordRepo::new();

    repo.expect_get_record_by_id()
        .returning(|id| Ok(Some(record(&id, "cancelled", "", ""))));
    repo.expect_set_status().times(0);

    let result = change_status(&repo, "MR-20240115-0004", "draft").await;

    match result.unwrap_err().0 {
        OmmsError::Validation(m) => assert_eq!(m, "状态不可回退"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_void_goes_through_guarded_transition() {
    let mut repo = MockRecordRepo::new();

    repo.expect_get_record_by_id()
        .returning(|id| Ok(Some(record(&id, "draft", "", ""))));
    repo.expect_set_status()
        .with(
            predicate::always(),
            predicate::eq("cancelled".to_string()),
        )
        .times(1)
        .returning(|id, status| {
            let mut rec = record(&id, "draft", "", "");
            rec.status = status;
            Ok(rec)
        });

    let updated = change_status(&repo, "MR-20240115-0005", STATUS_CANCELLED)
        .await
        .expect("void should succeed");
    assert_eq!(updated.status, "cancelled");
}

#[tokio::test]
async fn test_unknown_status_value_rejected() {
    let mut repo = MockRecordRepo::new();

    repo.expect_get_record_by_id()
        .returning(|id| Ok(Some(record(&id, "draft", "头痛三天", ""))));
    repo.expect_set_status().times(0);

    let result = change_status(&repo, "MR-20240115-0006", "archived").await;

    match result.unwrap_err().0 {
        OmmsError::Validation(m) => assert_eq!(m, "非法状态值"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let mut repo = MockRecordRepo::new();

    repo.expect_get_record_by_id().returning(|_| Ok(None));
    repo.expect_set_status().times(0);

    let result = change_status(&repo, "MR-20240115-9999", STATUS_FINALIZED).await;

    match result.unwrap_err().0 {
        OmmsError::NotFound(_) => {}
        e => panic!("Expected NotFound error, got: {:?}", e),
    }
}
