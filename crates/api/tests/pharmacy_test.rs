//! Stock ledger tests driven through mock repositories: the sufficiency
//! check always precedes the debit, and a shortfall leaves the running
//! total untouched.

use mockall::predicate;

use omms_api::middleware::error_handling::AppError;
use omms_core::errors::OmmsError;
use omms_core::models::pharmacy::validate_prescription_transition;
use omms_db::mock::repositories::{MockPrescriptionRepo, MockStockRepo};
use omms_db::models::{DbMedicineStock, DbPrescription, DbPrescriptionItem};

fn stock(medicine_id: i64, current_stock: i32) -> DbMedicineStock {
    DbMedicineStock {
        stock_id: 1,
        medicine_id,
        current_stock,
        last_stock_in_time: None,
        last_stock_out_time: None,
        created_at: None,
        updated_at: None,
    }
}

fn prescription(id: &str, status: &str) -> DbPrescription {
    DbPrescription {
        id: id.to_string(),
        patient: "张三".to_string(),
        department: "内科".to_string(),
        doctor: "李四".to_string(),
        created_at: None,
        status: status.to_string(),
    }
}

fn item(prescription_id: &str, medicine_id: i64, qty: i32) -> DbPrescriptionItem {
    DbPrescriptionItem {
        id: 1,
        prescription_id: prescription_id.to_string(),
        medicine_id,
        name: Some("对乙酰氨基酚".to_string()),
        qty,
        unit: Some("盒".to_string()),
        price: 12.5,
    }
}

/// The outbound-movement decision sequence against the mock repository.
async fn dispatch(
    repo: &MockStockRepo,
    medicine_id: i64,
    quantity: i32,
) -> Result<(), AppError> {
    if quantity <= 0 {
        return Err(AppError(OmmsError::Validation("数量必须大于0".to_string())));
    }

    let stock = repo.lock_stock(medicine_id).await?;
    let sufficient = stock.as_ref().is_some_and(|s| s.current_stock >= quantity);
    if !sufficient {
        return Err(AppError(OmmsError::Validation("库存不足".to_string())));
    }

    repo.deduct_stock(medicine_id, quantity).await?;
    Ok(())
}

#[tokio::test]
async fn test_dispatch_rejects_insufficient_stock_without_debit() {
    let mut repo = MockStockRepo::new();

    // current_stock = 10, requested 15
    repo.expect_lock_stock()
        .with(predicate::eq(1))
        .returning(|id| Ok(Some(stock(id, 10))));
    repo.expect_deduct_stock().times(0);

    let result = dispatch(&repo, 1, 15).await;

    match result.unwrap_err().0 {
        OmmsError::Validation(m) => assert_eq!(m, "库存不足"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_dispatch_debits_exact_quantity() {
    let mut repo = MockStockRepo::new();

    repo.expect_lock_stock()
        .with(predicate::eq(1))
        .returning(|id| Ok(Some(stock(id, 10))));
    repo.expect_deduct_stock()
        .with(predicate::eq(1), predicate::eq(5))
        .times(1)
        .returning(|_, _| Ok(()));

    dispatch(&repo, 1, 5).await.expect("dispatch should succeed");
}

#[tokio::test]
async fn test_dispatch_rejects_non_positive_quantity() {
    let mut repo = MockStockRepo::new();
    repo.expect_lock_stock().times(0);
    repo.expect_deduct_stock().times(0);

    let result = dispatch(&repo, 1, 0).await;

    match result.unwrap_err().0 {
        OmmsError::Validation(m) => assert_eq!(m, "数量必须大于0"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_dispatch_rejects_medicine_without_stock_row() {
    let mut repo = MockStockRepo::new();

    repo.expect_lock_stock().returning(|_| Ok(None));
    repo.expect_deduct_stock().times(0);

    let result = dispatch(&repo, 9, 1).await;

    match result.unwrap_err().0 {
        OmmsError::Validation(m) => assert_eq!(m, "库存不足"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

/// The dispense decision sequence: a locked prescription, the transition
/// guard, then per-item sufficiency checks stopping at the first
/// shortfall.
async fn dispense(
    prescriptions: &MockPrescriptionRepo,
    stocks: &MockStockRepo,
    pid: &str,
) -> Result<DbPrescription, AppError> {
    let current = prescriptions
        .lock_prescription(pid.to_string())
        .await?
        .ok_or_else(|| AppError(OmmsError::NotFound("处方不存在".to_string())))?;

    validate_prescription_transition(&current.status, "dispensed")?;

    let updated = prescriptions
        .set_status(pid.to_string(), "dispensed".to_string())
        .await?;

    for item in prescriptions.get_items(pid.to_string()).await? {
        let stock = stocks.lock_stock(item.medicine_id).await?;
        let sufficient = stock.as_ref().is_some_and(|s| s.current_stock >= item.qty);
        if !sufficient {
            return Err(AppError(OmmsError::Validation(format!(
                "库存不足: {}",
                item.name.unwrap_or_default()
            ))));
        }
        stocks.deduct_stock(item.medicine_id, item.qty).await?;
    }

    Ok(updated)
}

#[tokio::test]
async fn test_dispense_debits_each_line_item() {
    let mut prescriptions = MockPrescriptionRepo::new();
    let mut stocks = MockStockRepo::new();

    prescriptions
        .expect_lock_prescription()
        .returning(|id| Ok(Some(prescription(&id, "approved"))));
    prescriptions
        .expect_set_status()
        .times(1)
        .returning(|id, status| {
            let mut p = prescription(&id, "approved");
            p.status = status;
            Ok(p)
        });
    prescriptions
        .expect_get_items()
        .returning(|pid| Ok(vec![item(&pid, 1, 2), item(&pid, 2, 1)]));

    stocks
        .expect_lock_stock()
        .returning(|id| Ok(Some(stock(id, 10))));
    stocks
        .expect_deduct_stock()
        .times(2)
        .returning(|_, _| Ok(()));

    let updated = dispense(&prescriptions, &stocks, "P-1001")
        .await
        .expect("dispense should succeed");
    assert_eq!(updated.status, "dispensed");
}

#[tokio::test]
async fn test_dispense_stops_at_first_insufficient_item() {
    let mut prescriptions = MockPrescriptionRepo::new();
    let mut stocks = MockStockRepo::new();

    prescriptions
        .expect_lock_prescription()
        .returning(|id| Ok(Some(prescription(&id, "approved"))));
    prescriptions
        .expect_set_status()
        .returning(|id, status| {
            let mut p = prescription(&id, "approved");
            p.status = status;
            Ok(p)
        });
    prescriptions
        .expect_get_items()
        .returning(|pid| Ok(vec![item(&pid, 1, 20)]));

    stocks
        .expect_lock_stock()
        .returning(|id| Ok(Some(stock(id, 10))));
    stocks.expect_deduct_stock().times(0);

    let result = dispense(&prescriptions, &stocks, "P-1002").await;

    match result.unwrap_err().0 {
        OmmsError::Validation(m) => assert_eq!(m, "库存不足: 对乙酰氨基酚"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_dispense_rejects_pending_prescription() {
    let mut prescriptions = MockPrescriptionRepo::new();
    let stocks = MockStockRepo::new();

    // pending may not skip straight to dispensed
    prescriptions
        .expect_lock_prescription()
        .returning(|id| Ok(Some(prescription(&id, "pending"))));
    prescriptions.expect_set_status().times(0);

    let result = dispense(&prescriptions, &stocks, "P-1003").await;

    match result.unwrap_err().0 {
        OmmsError::Validation(m) => assert_eq!(m, "非法状态流转"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_dispense_missing_prescription_is_not_found() {
    let mut prescriptions = MockPrescriptionRepo::new();
    let stocks = MockStockRepo::new();

    prescriptions
        .expect_lock_prescription()
        .returning(|_| Ok(None));

    let result = dispense(&prescriptions, &stocks, "P-9999").await;

    match result.unwrap_err().0 {
        OmmsError::NotFound(m) => assert_eq!(m, "处方不存在"),
        e => panic!("Expected NotFound error, got: {:?}", e),
    }
}
